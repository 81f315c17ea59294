// thunder-client/src/http.rs
// HTTP client - network access to the recharge backend

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, header};
use serde::de::DeserializeOwned;
use shared::{
    ApiMessage, DashboardSummary, FieldUpdate, NewRecharge, OrderFilter, OrderId,
    PaginatedResponse, Recharge, SiteConfig,
};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::orders::ExportFormat;

/// Shown when a 503 carries no message of its own
pub const SERVICE_WARMING_UP: &str =
    "Servidor em processo de ativação. Tente novamente em alguns segundos.";

/// Backend operations used by the admin client.
///
/// Privileged calls take the raw credential, which is sent verbatim as the
/// `Authorization` header.
#[async_trait]
pub trait AdminApi: Send + Sync {
    /// `GET /health`
    async fn health(&self) -> ClientResult<()>;

    /// `GET /api/admin/recargas`
    async fn list_orders(
        &self,
        credential: &str,
        page: u32,
        limit: u32,
        filter: &OrderFilter,
    ) -> ClientResult<PaginatedResponse<Recharge>>;

    /// `PUT /api/admin/recargas/{id}`
    async fn update_order(
        &self,
        credential: &str,
        id: &OrderId,
        update: &FieldUpdate,
    ) -> ClientResult<()>;

    /// `POST /api/admin/recargas`
    async fn create_order(&self, credential: &str, order: &NewRecharge)
    -> ClientResult<ApiMessage>;

    /// `DELETE /api/admin/recargas/{id}`
    async fn delete_order(&self, credential: &str, id: &OrderId) -> ClientResult<()>;

    /// `GET /api/admin/dashboard`
    async fn dashboard(&self, credential: &str) -> ClientResult<DashboardSummary>;

    /// `GET /api/admin/export`
    async fn export(
        &self,
        credential: &str,
        format: ExportFormat,
        filter: &OrderFilter,
    ) -> ClientResult<Vec<u8>>;

    /// `GET /api/config` (unauthenticated)
    async fn load_config(&self) -> ClientResult<SiteConfig>;

    /// `PUT /api/admin/config`
    async fn save_config(&self, credential: &str, config: &SiteConfig) -> ClientResult<()>;
}

/// reqwest-backed [`AdminApi`]
#[derive(Debug, Clone)]
pub struct NetworkHttpClient {
    client: Client,
    base_url: String,
    probe_timeout: Duration,
}

impl NetworkHttpClient {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            probe_timeout: config.probe_timeout,
        })
    }

    /// Base URL without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorized(req: RequestBuilder, credential: &str) -> RequestBuilder {
        req.header(header::AUTHORIZATION, credential)
    }

    /// Map non-2xx responses onto the error taxonomy
    async fn check_status(response: reqwest::Response) -> ClientResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = ApiMessage::extract(&body);
        tracing::debug!(status = status.as_u16(), message = ?message, "Backend returned error");

        Err(match status {
            StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
            StatusCode::SERVICE_UNAVAILABLE => ClientError::ServiceUnavailable(
                message.unwrap_or_else(|| SERVICE_WARMING_UP.to_string()),
            ),
            _ => ClientError::RequestFailed {
                status: status.as_u16(),
                message,
            },
        })
    }

    async fn handle_json<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let response = Self::check_status(response).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(Into::into)
    }

    /// Success responses whose body is irrelevant
    async fn handle_ack(response: reqwest::Response) -> ClientResult<()> {
        Self::check_status(response).await.map(|_| ())
    }
}

#[async_trait]
impl AdminApi for NetworkHttpClient {
    async fn health(&self) -> ClientResult<()> {
        let response = self
            .client
            .get(self.url("health"))
            .header(header::CACHE_CONTROL, "no-cache")
            .timeout(self.probe_timeout)
            .send()
            .await?;
        Self::handle_ack(response).await
    }

    async fn list_orders(
        &self,
        credential: &str,
        page: u32,
        limit: u32,
        filter: &OrderFilter,
    ) -> ClientResult<PaginatedResponse<Recharge>> {
        let mut query = vec![("page", page.to_string()), ("limit", limit.to_string())];
        query.extend(filter.to_query());

        let req = self.client.get(self.url("api/admin/recargas")).query(&query);
        let response = Self::authorized(req, credential).send().await?;
        Self::handle_json(response).await
    }

    async fn update_order(
        &self,
        credential: &str,
        id: &OrderId,
        update: &FieldUpdate,
    ) -> ClientResult<()> {
        let url = self.url(&format!("api/admin/recargas/{}", id));
        let req = self.client.put(url).json(update);
        let response = Self::authorized(req, credential).send().await?;
        Self::handle_ack(response).await
    }

    async fn create_order(
        &self,
        credential: &str,
        order: &NewRecharge,
    ) -> ClientResult<ApiMessage> {
        let req = self.client.post(self.url("api/admin/recargas")).json(order);
        let response = Self::authorized(req, credential).send().await?;
        let response = Self::check_status(response).await?;
        // Some backend versions echo the record instead of a message
        let body = response.text().await?;
        Ok(serde_json::from_str(&body).unwrap_or_default())
    }

    async fn delete_order(&self, credential: &str, id: &OrderId) -> ClientResult<()> {
        let url = self.url(&format!("api/admin/recargas/{}", id));
        let response = Self::authorized(self.client.delete(url), credential)
            .send()
            .await?;
        Self::handle_ack(response).await
    }

    async fn dashboard(&self, credential: &str) -> ClientResult<DashboardSummary> {
        let req = self.client.get(self.url("api/admin/dashboard"));
        let response = Self::authorized(req, credential).send().await?;
        Self::handle_json(response).await
    }

    async fn export(
        &self,
        credential: &str,
        format: ExportFormat,
        filter: &OrderFilter,
    ) -> ClientResult<Vec<u8>> {
        let mut query = vec![("format", format.as_param().to_string())];
        query.extend(filter.to_query());

        let req = self.client.get(self.url("api/admin/export")).query(&query);
        let response = Self::authorized(req, credential).send().await?;
        let response = Self::check_status(response).await?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn load_config(&self) -> ClientResult<SiteConfig> {
        let response = self.client.get(self.url("api/config")).send().await?;
        Self::handle_json(response).await
    }

    async fn save_config(&self, credential: &str, config: &SiteConfig) -> ClientResult<()> {
        let req = self.client.put(self.url("api/admin/config")).json(config);
        let response = Self::authorized(req, credential).send().await?;
        Self::handle_ack(response).await
    }
}
