//! Scriptable in-memory [`AdminApi`] for unit tests

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use shared::{
    ApiMessage, DashboardSummary, FieldUpdate, NewRecharge, OrderFilter, OrderId,
    PaginatedResponse, Recharge, SiteConfig,
};

use crate::error::{ClientError, ClientResult};
use crate::http::AdminApi;
use crate::orders::ExportFormat;

/// A recorded privileged call
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    List { credential: String, page: u32, limit: u32 },
    Update { credential: String, id: OrderId, update: FieldUpdate },
    Create { credential: String, order: NewRecharge },
    Delete { credential: String, id: OrderId },
    Dashboard { credential: String },
    Export { credential: String, format: ExportFormat },
    SaveConfig { credential: String, config: SiteConfig },
}

#[derive(Default)]
pub struct MockApi {
    health_failures: AtomicU32,
    health_calls: AtomicU32,
    calls: Mutex<Vec<Call>>,
    list_results: Mutex<VecDeque<(Duration, ClientResult<PaginatedResponse<Recharge>>)>>,
    update_results: Mutex<VecDeque<ClientResult<()>>>,
    delete_results: Mutex<VecDeque<ClientResult<()>>>,
    dashboard_results: Mutex<VecDeque<ClientResult<DashboardSummary>>>,
    save_config_results: Mutex<VecDeque<ClientResult<()>>>,
    config: Mutex<SiteConfig>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_health_times(&self, n: u32) {
        self.health_failures.store(n, Ordering::SeqCst);
    }

    pub fn health_calls(&self) -> u32 {
        self.health_calls.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn dashboard_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Dashboard { .. }))
            .count()
    }

    pub fn updates(&self) -> Vec<FieldUpdate> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Update { update, .. } => Some(update),
                _ => None,
            })
            .collect()
    }

    pub fn push_list(&self, delay: Duration, result: ClientResult<PaginatedResponse<Recharge>>) {
        self.list_results.lock().unwrap().push_back((delay, result));
    }

    pub fn push_update(&self, result: ClientResult<()>) {
        self.update_results.lock().unwrap().push_back(result);
    }

    pub fn push_delete(&self, result: ClientResult<()>) {
        self.delete_results.lock().unwrap().push_back(result);
    }

    pub fn push_dashboard(&self, result: ClientResult<DashboardSummary>) {
        self.dashboard_results.lock().unwrap().push_back(result);
    }

    pub fn push_save_config(&self, result: ClientResult<()>) {
        self.save_config_results.lock().unwrap().push_back(result);
    }

    pub fn set_config(&self, config: SiteConfig) {
        *self.config.lock().unwrap() = config;
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

pub fn page_of(orders: Vec<Recharge>, total: u64, page: u32) -> PaginatedResponse<Recharge> {
    PaginatedResponse {
        data: orders,
        total: Some(total),
        page: Some(page),
        limit: Some(10),
        total_pages: None,
    }
}

pub fn order(id: &str) -> Recharge {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "timestamp": "2025-05-10T14:03:00+00:00",
        "nome": "Maria",
        "telefone": "82999990000",
        "operadora": "Tim",
        "recarga_selecionada": "R$20,00 PAGA R$15,00",
        "senha_app": "1234",
        "status": "na-fila",
        "admin_comment": ""
    }))
    .unwrap()
}

#[async_trait]
impl AdminApi for MockApi {
    async fn health(&self) -> ClientResult<()> {
        self.health_calls.fetch_add(1, Ordering::SeqCst);
        let remaining = self.health_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.health_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(ClientError::ServiceUnavailable("asleep".into()));
        }
        Ok(())
    }

    async fn list_orders(
        &self,
        credential: &str,
        page: u32,
        limit: u32,
        _filter: &OrderFilter,
    ) -> ClientResult<PaginatedResponse<Recharge>> {
        self.record(Call::List {
            credential: credential.into(),
            page,
            limit,
        });
        let scripted = self.list_results.lock().unwrap().pop_front();
        match scripted {
            Some((delay, result)) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                result
            }
            None => Ok(page_of(Vec::new(), 0, page)),
        }
    }

    async fn update_order(
        &self,
        credential: &str,
        id: &OrderId,
        update: &FieldUpdate,
    ) -> ClientResult<()> {
        self.record(Call::Update {
            credential: credential.into(),
            id: id.clone(),
            update: update.clone(),
        });
        self.update_results.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }

    async fn create_order(
        &self,
        credential: &str,
        order: &NewRecharge,
    ) -> ClientResult<ApiMessage> {
        self.record(Call::Create {
            credential: credential.into(),
            order: order.clone(),
        });
        Ok(ApiMessage::new("Pedido criado com sucesso!"))
    }

    async fn delete_order(&self, credential: &str, id: &OrderId) -> ClientResult<()> {
        self.record(Call::Delete {
            credential: credential.into(),
            id: id.clone(),
        });
        self.delete_results.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }

    async fn dashboard(&self, credential: &str) -> ClientResult<DashboardSummary> {
        self.record(Call::Dashboard {
            credential: credential.into(),
        });
        self.dashboard_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(DashboardSummary::default()))
    }

    async fn export(
        &self,
        credential: &str,
        format: ExportFormat,
        _filter: &OrderFilter,
    ) -> ClientResult<Vec<u8>> {
        self.record(Call::Export {
            credential: credential.into(),
            format,
        });
        Ok(b"id,nome\n1,Maria\n".to_vec())
    }

    async fn load_config(&self) -> ClientResult<SiteConfig> {
        Ok(self.config.lock().unwrap().clone())
    }

    async fn save_config(&self, credential: &str, config: &SiteConfig) -> ClientResult<()> {
        self.record(Call::SaveConfig {
            credential: credential.into(),
            config: config.clone(),
        });
        let result = self
            .save_config_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(()));
        if result.is_ok() {
            self.set_config(config.clone());
        }
        result
    }
}
