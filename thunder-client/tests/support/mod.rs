// thunder-client/tests/support/mod.rs
// Stub recharge backend served on an ephemeral port

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, put},
};
use serde_json::{Value, json};

pub const PASSWORD: &str = "segredo";

/// One request as the stub saw it
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: HashMap<String, String>,
    pub authorization: Option<String>,
    pub cache_control: Option<String>,
    pub body: Option<Value>,
}

#[derive(Default)]
pub struct StubState {
    pub health_failures: AtomicU32,
    pub unavailable: AtomicBool,
    pub requests: Mutex<Vec<Recorded>>,
    pub orders: Mutex<Vec<Value>>,
    pub config: Mutex<Value>,
}

impl StubState {
    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last(&self, method: Method, path: &str) -> Option<Recorded> {
        self.requests()
            .into_iter()
            .rev()
            .find(|r| r.method == method && r.path == path)
    }

    fn record(
        &self,
        method: Method,
        path: String,
        query: HashMap<String, String>,
        headers: &HeaderMap,
        body: Option<Value>,
    ) {
        let value_of = |name: header::HeaderName| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        self.requests.lock().unwrap().push(Recorded {
            method,
            path,
            query,
            authorization: value_of(header::AUTHORIZATION),
            cache_control: value_of(header::CACHE_CONTROL),
            body,
        });
    }
}

type Shared = Arc<StubState>;

fn message(status: StatusCode, text: &str) -> Response {
    (status, Json(json!({ "message": text }))).into_response()
}

/// Auth and availability gate shared by every admin route
fn gate(state: &StubState, headers: &HeaderMap) -> Option<Response> {
    if state.unavailable.load(Ordering::SeqCst) {
        return Some(message(
            StatusCode::SERVICE_UNAVAILABLE,
            "Servidor reiniciando.",
        ));
    }
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some(PASSWORD);
    (!authorized).then(|| message(StatusCode::UNAUTHORIZED, "Acesso negado."))
}

async fn health(State(state): State<Shared>, headers: HeaderMap) -> Response {
    state.record(Method::GET, "/health".into(), HashMap::new(), &headers, None);
    let remaining = state.health_failures.load(Ordering::SeqCst);
    if remaining > 0 {
        state.health_failures.store(remaining - 1, Ordering::SeqCst);
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }
    Json(json!({ "status": "ok" })).into_response()
}

async fn list_orders(
    State(state): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    state.record(
        Method::GET,
        "/api/admin/recargas".into(),
        query.clone(),
        &headers,
        None,
    );
    if let Some(denied) = gate(&state, &headers) {
        return denied;
    }

    let page: usize = query.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let limit: usize = query.get("limit").and_then(|l| l.parse().ok()).unwrap_or(10);
    let orders = state.orders.lock().unwrap().clone();
    let data: Vec<Value> = orders
        .iter()
        .skip((page - 1) * limit)
        .take(limit)
        .cloned()
        .collect();
    // No total_pages: the client derives it
    Json(json!({
        "data": data,
        "total": orders.len(),
        "page": page,
        "limit": limit,
    }))
    .into_response()
}

async fn create_order(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record(
        Method::POST,
        "/api/admin/recargas".into(),
        HashMap::new(),
        &headers,
        Some(body.clone()),
    );
    if let Some(denied) = gate(&state, &headers) {
        return denied;
    }
    let mut order = body;
    let mut orders = state.orders.lock().unwrap();
    order["id"] = json!(orders.len() + 100);
    order["status"] = json!("na-fila");
    orders.push(order);
    message(StatusCode::CREATED, "Pedido criado com sucesso!")
}

async fn update_order(
    State(state): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record(
        Method::PUT,
        format!("/api/admin/recargas/{id}"),
        HashMap::new(),
        &headers,
        Some(body.clone()),
    );
    if let Some(denied) = gate(&state, &headers) {
        return denied;
    }
    let mut orders = state.orders.lock().unwrap();
    let Some(order) = orders.iter_mut().find(|o| o["id"].to_string().trim_matches('"') == id)
    else {
        return message(StatusCode::NOT_FOUND, "Pedido não encontrado.");
    };
    if let (Some(target), Some(changes)) = (order.as_object_mut(), body.as_object()) {
        for (k, v) in changes {
            target.insert(k.clone(), v.clone());
        }
    }
    message(StatusCode::OK, "Pedido atualizado.")
}

async fn delete_order(
    State(state): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    state.record(
        Method::DELETE,
        format!("/api/admin/recargas/{id}"),
        HashMap::new(),
        &headers,
        None,
    );
    if let Some(denied) = gate(&state, &headers) {
        return denied;
    }
    let mut orders = state.orders.lock().unwrap();
    let before = orders.len();
    orders.retain(|o| o["id"].to_string().trim_matches('"') != id);
    if orders.len() == before {
        return message(StatusCode::NOT_FOUND, "Pedido não encontrado.");
    }
    message(StatusCode::OK, "Pedido excluído.")
}

async fn dashboard(State(state): State<Shared>, headers: HeaderMap) -> Response {
    state.record(
        Method::GET,
        "/api/admin/dashboard".into(),
        HashMap::new(),
        &headers,
        None,
    );
    if let Some(denied) = gate(&state, &headers) {
        return denied;
    }
    let orders = state.orders.lock().unwrap();
    let mut status_counts: HashMap<String, u64> = HashMap::new();
    let mut operator_counts: HashMap<String, u64> = HashMap::new();
    for order in orders.iter() {
        if let Some(s) = order["status"].as_str() {
            *status_counts.entry(s.to_string()).or_default() += 1;
        }
        if let Some(c) = order["operadora"].as_str() {
            *operator_counts.entry(c.to_string()).or_default() += 1;
        }
    }
    Json(json!({
        "total": orders.len(),
        "statusCounts": status_counts,
        "operatorCounts": operator_counts,
        "variations": { "total": 12.5, "completed": -3.0, "pending": 0, "error": 1 }
    }))
    .into_response()
}

async fn export(
    State(state): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    state.record(
        Method::GET,
        "/api/admin/export".into(),
        query.clone(),
        &headers,
        None,
    );
    if let Some(denied) = gate(&state, &headers) {
        return denied;
    }
    match query.get("format").map(String::as_str) {
        Some("csv") => (StatusCode::OK, b"id,nome\n1,Maria\n".to_vec()).into_response(),
        _ => message(StatusCode::BAD_REQUEST, "Formato inválido."),
    }
}

async fn load_config(State(state): State<Shared>, headers: HeaderMap) -> Response {
    state.record(Method::GET, "/api/config".into(), HashMap::new(), &headers, None);
    Json(state.config.lock().unwrap().clone()).into_response()
}

async fn save_config(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record(
        Method::PUT,
        "/api/admin/config".into(),
        HashMap::new(),
        &headers,
        Some(body.clone()),
    );
    if let Some(denied) = gate(&state, &headers) {
        return denied;
    }
    *state.config.lock().unwrap() = body;
    message(StatusCode::OK, "Configurações salvas.")
}

pub fn sample_order(id: u64, name: &str, carrier: &str, status: &str) -> Value {
    json!({
        "id": id,
        "timestamp": "2025-05-10T14:03:00-03:00",
        "nome": name,
        "telefone": "82999990000",
        "operadora": carrier,
        "recarga_selecionada": "R$20,00 PAGA R$15,00",
        "senha_app": "1234",
        "status": status,
        "admin_comment": ""
    })
}

pub fn sample_config() -> Value {
    json!({
        "pageTitle": "Thunder Recargas",
        "headerTitle": "Thunder Recargas",
        "headerSubtitle": "Recargas com desconto",
        "footerWarning": "Confira o número antes de pagar.",
        "footerCopyright": "© 2025 Thunder",
        "pixKey": "chave@pix.com",
        "pixName": "Thunder LTDA",
        "pixCity": "Maceió",
        "rechargeOptions": {
            "Tim": ["R$20,00 PAGA R$15,00"],
            "Vivo": ["R$25,00 PAGA R$18,00"],
            "Claro": []
        }
    })
}

/// Running stub; the server task lives as long as the test runtime
pub struct StubBackend {
    pub url: String,
    pub state: Shared,
}

impl StubBackend {
    pub async fn start() -> Self {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("thunder_client=debug")
            .with_test_writer()
            .try_init();

        let state: Shared = Arc::new(StubState::default());
        *state.config.lock().unwrap() = sample_config();

        let app = Router::new()
            .route("/health", get(health))
            .route("/api/admin/recargas", get(list_orders).post(create_order))
            .route(
                "/api/admin/recargas/{id}",
                put(update_order).delete(delete_order),
            )
            .route("/api/admin/dashboard", get(dashboard))
            .route("/api/admin/export", get(export))
            .route("/api/config", get(load_config))
            .route("/api/admin/config", put(save_config))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{addr}"),
            state,
        }
    }

    pub fn seed(&self, orders: Vec<Value>) {
        *self.state.orders.lock().unwrap() = orders;
    }
}
