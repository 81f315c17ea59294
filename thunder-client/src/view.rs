//! View models
//!
//! Pure functions turning orders, pagination and the dashboard aggregate
//! into display-ready values. Nothing here touches the network or the edit
//! state machine; a rendering layer (the CLI table, a web front end)
//! consumes the output as-is.

use shared::{Carrier, DashboardSummary, EditableField, OrderStatus, Recharge};

use crate::edit::{RowEditor, RowState};
use crate::orders::PageState;

/// Placeholder for absent text fields
pub const MISSING: &str = "N/A";

/// Shown instead of rows when the page is empty
pub const EMPTY_TABLE_MESSAGE: &str = "Nenhum pedido encontrado.";

/// pt-BR date/time layout
const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

// ============================================================================
// Rows
// ============================================================================

/// Carrier badge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarrierBadge {
    pub label: String,
    /// e.g. `operator operator-tim`
    pub class: String,
    pub icon: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// Action buttons of a row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowControls {
    pub edit_visible: bool,
    pub save_visible: bool,
    pub save_enabled: bool,
    pub save_label: &'static str,
    pub delete_enabled: bool,
}

/// One table row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    pub id: String,
    pub state: RowState,
    pub submitted_at: String,
    pub name: String,
    pub phone: String,
    pub carrier: CarrierBadge,
    pub plan: String,
    pub app_password: String,
    pub status: Vec<StatusOption>,
    pub comment: String,
    /// Text fields are editable in place
    pub fields_editable: bool,
    pub controls: RowControls,
}

impl RowView {
    pub fn selected_status(&self) -> Option<&StatusOption> {
        self.status.iter().find(|o| o.selected)
    }
}

fn or_missing(value: String) -> String {
    if value.trim().is_empty() {
        MISSING.to_string()
    } else {
        value
    }
}

/// Submission time in pt-BR layout, kept in the record's own offset
pub fn format_timestamp(order: &Recharge) -> String {
    order
        .submitted_at()
        .map(|dt| dt.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_else(|| MISSING.to_string())
}

pub fn carrier_badge(carrier: Option<&Carrier>) -> CarrierBadge {
    let label = carrier
        .map(|c| c.as_str().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| MISSING.to_string());
    let icon = match carrier {
        Some(c) if c.is_known() => "fas fa-sim-card",
        _ => "fas fa-question-circle",
    };
    CarrierBadge {
        class: format!("operator operator-{}", label.to_lowercase()),
        label,
        icon,
    }
}

/// The known statuses, plus the current one when the backend stored
/// something else
fn status_options(current: &str) -> Vec<StatusOption> {
    let current = OrderStatus::from(Some(current.to_string()));
    let mut options: Vec<StatusOption> = OrderStatus::ALL
        .iter()
        .map(|s| StatusOption {
            value: s.as_str().to_string(),
            label: s.label().to_string(),
            selected: *s == current,
        })
        .collect();
    if !current.is_known() {
        options.push(StatusOption {
            value: current.as_str().to_string(),
            label: current.label().to_string(),
            selected: true,
        });
    }
    options
}

fn controls(state: RowState) -> RowControls {
    RowControls {
        edit_visible: state == RowState::View,
        save_visible: state != RowState::View,
        save_enabled: state == RowState::Editing,
        save_label: if state == RowState::Saving {
            "Salvando..."
        } else {
            "Salvar"
        },
        delete_enabled: state != RowState::Saving,
    }
}

fn build_row(order: &Recharge, state: RowState, value: impl Fn(EditableField) -> String) -> RowView {
    RowView {
        id: order.id.to_string(),
        state,
        submitted_at: format_timestamp(order),
        name: or_missing(value(EditableField::Name)),
        phone: or_missing(value(EditableField::Phone)),
        carrier: carrier_badge(order.carrier.as_ref()),
        plan: or_missing(value(EditableField::Plan)),
        app_password: or_missing(value(EditableField::AppPassword)),
        status: status_options(&value(EditableField::Status)),
        comment: value(EditableField::AdminComment),
        fields_editable: state == RowState::Editing,
        controls: controls(state),
    }
}

/// Render an order's persisted values in the given state
pub fn render_row(order: &Recharge, state: RowState) -> RowView {
    build_row(order, state, |field| order.field_value(field))
}

/// Render a row being edited, showing its draft values
pub fn render_editor(editor: &RowEditor) -> RowView {
    build_row(editor.order(), editor.state(), |field| editor.value(field))
}

// ============================================================================
// Pagination
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageInfo {
    pub label: String,
    pub prev_enabled: bool,
    pub next_enabled: bool,
}

pub fn render_page_info(state: &PageState) -> PageInfo {
    PageInfo {
        label: format!("Página {} de {}", state.page, state.total_pages),
        prev_enabled: state.has_prev(),
        next_enabled: state.has_next(),
    }
}

/// "Mostrando X de Y resultados"
pub fn render_results_count(shown: usize, total: u64) -> String {
    let shown = (shown as u64).min(total);
    format!("Mostrando {} de {} resultados", shown, total)
}

// ============================================================================
// Dashboard
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Period-over-period change marker
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariationIndicator {
    pub direction: Direction,
    /// Absolute percentage
    pub percent: f64,
}

impl VariationIndicator {
    pub fn new(variation: f64) -> Self {
        Self {
            direction: if variation >= 0.0 {
                Direction::Up
            } else {
                Direction::Down
            },
            percent: variation.abs(),
        }
    }

    pub fn class(&self) -> &'static str {
        match self.direction {
            Direction::Up => "metric-change positive",
            Direction::Down => "metric-change negative",
        }
    }

    pub fn text(&self) -> String {
        let arrow = match self.direction {
            Direction::Up => '↑',
            Direction::Down => '↓',
        };
        format!("{} {}%", arrow, self.percent)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricCard {
    pub label: &'static str,
    pub value: u64,
    pub change: Option<VariationIndicator>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricsView {
    /// Total, completed, pending, errors
    pub cards: [MetricCard; 4],
    /// Status chart, in [`OrderStatus::ALL`] order
    pub status_chart: Vec<(String, u64)>,
    /// Carrier chart: Tim, Vivo, Claro
    pub carrier_chart: Vec<(String, u64)>,
}

pub fn render_metrics(summary: &DashboardSummary) -> MetricsView {
    let change = |pick: fn(&shared::Variations) -> f64| {
        summary.variations.as_ref().map(|v| VariationIndicator::new(pick(v)))
    };

    let cards = [
        MetricCard {
            label: "Total de Pedidos",
            value: summary.total,
            change: change(|v| v.total),
        },
        MetricCard {
            label: "Concluídos",
            value: summary.completed(),
            change: change(|v| v.completed),
        },
        MetricCard {
            label: "Pendentes",
            value: summary.pending(),
            change: change(|v| v.pending),
        },
        MetricCard {
            label: "Com Erro",
            value: summary.errors(),
            change: change(|v| v.error),
        },
    ];

    let status_chart = OrderStatus::ALL
        .iter()
        .map(|s| s.label().to_string())
        .zip(summary.status_series())
        .collect();
    let carrier_chart = Carrier::KNOWN
        .iter()
        .map(|c| c.as_str().to_string())
        .zip(summary.carrier_series())
        .collect();

    MetricsView {
        cards,
        status_chart,
        carrier_chart,
    }
}
