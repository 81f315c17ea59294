//! Terminal rendering of view models

use shared::DashboardSummary;
use thunder_client::notify::{Notifier, ToastKind};
use thunder_client::orders::OrderPage;
use thunder_client::view::{
    self, EMPTY_TABLE_MESSAGE, RowView, render_metrics, render_page_info, render_results_count,
};
use thunder_client::RowState;

/// Toasts to stdout, alerts to stderr, both logged
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn toast(&self, kind: ToastKind) {
        tracing::debug!(toast = ?kind, "Toast");
        println!("✔ {}", kind.text());
    }

    fn alert(&self, message: &str) {
        tracing::warn!(alert = message, "Operator alert");
        eprintln!("✖ {message}");
    }
}

const HEADERS: [&str; 9] = [
    "ID", "Data", "Nome", "Telefone", "Operadora", "Recarga", "Senha", "Status", "Comentário",
];

fn cells(row: &RowView) -> [String; 9] {
    let status = row
        .selected_status()
        .map(|o| o.label.to_string())
        .unwrap_or_else(|| view::MISSING.to_string());
    [
        row.id.clone(),
        row.submitted_at.clone(),
        row.name.clone(),
        row.phone.clone(),
        row.carrier.label.clone(),
        row.plan.clone(),
        row.app_password.clone(),
        status,
        row.comment.clone(),
    ]
}

fn pad_line<'a>(values: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let padded: Vec<String> = values
        .zip(widths)
        .map(|(v, w)| format!("{:<width$}", v, width = *w))
        .collect();
    padded.join("  ").trim_end().to_string()
}

/// Orders table followed by the pagination footer
pub fn render_orders(page: &OrderPage) -> String {
    let mut out = String::new();
    if page.orders.is_empty() {
        out.push_str(EMPTY_TABLE_MESSAGE);
        out.push('\n');
    } else {
        let rows: Vec<[String; 9]> = page
            .orders
            .iter()
            .map(|o| cells(&view::render_row(o, RowState::View)))
            .collect();

        let mut widths = HEADERS.map(|h| h.chars().count());
        for row in &rows {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.chars().count());
            }
        }

        out.push_str(&pad_line(HEADERS.iter().copied(), &widths));
        out.push('\n');
        for row in &rows {
            out.push_str(&pad_line(row.iter().map(String::as_str), &widths));
            out.push('\n');
        }
    }

    let info = render_page_info(&page.state);
    out.push_str(&format!(
        "{}  |  {}\n",
        render_results_count(page.orders.len(), page.state.total),
        info.label
    ));
    out
}

/// Metric cards and chart series
pub fn render_dashboard(summary: &DashboardSummary) -> String {
    let metrics = render_metrics(summary);
    let mut out = String::new();
    for card in &metrics.cards {
        match card.change {
            Some(change) => out.push_str(&format!(
                "{:<18} {:>6}  {}\n",
                card.label,
                card.value,
                change.text()
            )),
            None => out.push_str(&format!("{:<18} {:>6}\n", card.label, card.value)),
        }
    }
    out.push('\n');
    for (label, count) in metrics.status_chart.iter().chain(&metrics.carrier_chart) {
        out.push_str(&format!("{:<18} {:>6}\n", label, count));
    }
    out
}
