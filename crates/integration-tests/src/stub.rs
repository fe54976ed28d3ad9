//! Stub of the storefront REST API.
//!
//! Serves a small fixed catalog, issues one JWT pair for `ana` / `secret`,
//! and accepts cart deltas from authenticated callers. Product 13 is out of
//! stock and every add for it is refused.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;

use shopeasy_storefront::config::StorefrontConfig;

pub const USERNAME: &str = "ana";
pub const PASSWORD: &str = "secret";
const ACCESS: &str = "access-1";
const REFRESH: &str = "refresh-1";
const REFRESHED_ACCESS: &str = "access-2";

/// Product the stub always refuses to add.
pub const OUT_OF_STOCK: i64 = 13;

/// A cart delta received by the stub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedDelta {
    pub method: Method,
    pub produto: i64,
    pub quantidade: u32,
}

#[derive(Debug, Deserialize)]
struct CartItemBody {
    produto: i64,
    quantidade: u32,
}

#[derive(Debug, Deserialize)]
struct TokenBody {
    username: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct RefreshBody {
    refresh: String,
}

#[derive(Debug, Deserialize)]
struct ProductQuery {
    #[serde(rename = "categoria__nome")]
    category: Option<String>,
    page: Option<usize>,
}

struct StubState {
    base_url: String,
    deltas: Mutex<Vec<RecordedDelta>>,
    product_requests: Mutex<usize>,
    cart_delay: Mutex<Option<Duration>>,
}

/// A running stub backend.
pub struct StubBackend {
    base_url: String,
    state: Arc<StubState>,
}

impl StubBackend {
    /// Bind a loopback port and serve in the background.
    ///
    /// # Panics
    ///
    /// Panics if the port cannot be bound.
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub backend");
        let addr: SocketAddr = listener.local_addr().expect("Failed to read stub address");
        let base_url = format!("http://{addr}/api/v1/");

        let state = Arc::new(StubState {
            base_url: base_url.clone(),
            deltas: Mutex::default(),
            product_requests: Mutex::default(),
            cart_delay: Mutex::default(),
        });

        let app = Router::new()
            .route("/api/v1/token/", post(token))
            .route("/api/v1/token/refresh/", post(refresh))
            .route("/api/v1/me/", get(me))
            .route("/api/v1/produtos/", get(products))
            .route("/api/v1/produtos/{id}/", get(product))
            .route("/api/v1/categorias/", get(categories))
            .route("/api/v1/carrinhos/adicionar-item/", post(cart_delta))
            .route(
                "/api/v1/carrinhos/remover-item/",
                axum::routing::delete(cart_delta),
            )
            .with_state(Arc::clone(&state));

        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { base_url, state }
    }

    /// Base URL including the `/api/v1/` prefix.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Client configuration pointing at this stub.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is rejected.
    #[must_use]
    pub fn config(&self, with_credentials: bool, timeout_secs: u64) -> StorefrontConfig {
        let mut vars = HashMap::from([
            ("SHOPEASY_API_URL".to_string(), self.base_url.clone()),
            (
                "SHOPEASY_REQUEST_TIMEOUT_SECS".to_string(),
                timeout_secs.to_string(),
            ),
        ]);
        if with_credentials {
            vars.insert("SHOPEASY_USERNAME".to_string(), USERNAME.to_string());
            vars.insert("SHOPEASY_PASSWORD".to_string(), PASSWORD.to_string());
        }
        StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
            .expect("stub configuration is valid")
    }

    /// Cart deltas accepted or refused so far, in arrival order.
    #[must_use]
    pub fn deltas(&self) -> Vec<RecordedDelta> {
        lock(&self.state.deltas).clone()
    }

    /// Number of single-product requests served.
    #[must_use]
    pub fn product_requests(&self) -> usize {
        *lock(&self.state.product_requests)
    }

    /// Delay every cart response by `delay`.
    pub fn delay_cart(&self, delay: Duration) {
        *lock(&self.state.cart_delay) = Some(delay);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

fn authorized(headers: &HeaderMap) -> bool {
    matches!(bearer(headers), Some(ACCESS | REFRESHED_ACCESS))
}

fn catalog() -> Vec<Value> {
    vec![
        json!({"id": 1, "nome": "blusa de linho", "preco": "49.90", "categoria": 1,
               "imagem_url_final": "http://cdn.test/blusa.jpg", "em_promocao": false}),
        json!({"id": 2, "nome": "saia midi", "preco": "79.90", "categoria": 2,
               "em_promocao": true, "descricao": "Saia de cintura alta"}),
        json!({"id": 3, "nome": "vestido floral", "preco": "99.90", "categoria": 3,
               "em_promocao": true}),
        json!({"id": OUT_OF_STOCK, "nome": "vestido longo", "preco": "189.00", "categoria": 3,
               "estoque": 0}),
    ]
}

const CATEGORIES: [(i64, &str); 3] = [(1, "blusas"), (2, "saias"), (3, "vestidos")];

async fn token(Json(body): Json<TokenBody>) -> Response {
    if body.username == USERNAME && body.password == PASSWORD {
        Json(json!({ "access": ACCESS, "refresh": REFRESH })).into_response()
    } else {
        detail(
            StatusCode::UNAUTHORIZED,
            "No active account found with the given credentials",
        )
    }
}

async fn refresh(Json(body): Json<RefreshBody>) -> Response {
    if body.refresh == REFRESH {
        Json(json!({ "access": REFRESHED_ACCESS })).into_response()
    } else {
        detail(StatusCode::UNAUTHORIZED, "Token is invalid or expired")
    }
}

async fn me(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return detail(
            StatusCode::UNAUTHORIZED,
            "Authentication credentials were not provided.",
        );
    }
    Json(json!({
        "id": 7,
        "username": USERNAME,
        "email": "ana@example.com",
        "first_name": "Ana",
        "last_name": "Souza",
        "is_staff": false,
        "is_superuser": false
    }))
    .into_response()
}

/// Two products per page, filtered by category name.
async fn products(
    State(state): State<Arc<StubState>>,
    Query(query): Query<ProductQuery>,
) -> Response {
    let category_id = match query.category.as_deref() {
        Some(name) => match CATEGORIES.iter().find(|(_, n)| *n == name) {
            Some((id, _)) => Some(*id),
            None => {
                return Json(json!({"count": 0, "next": null, "previous": null, "results": []}))
                    .into_response();
            }
        },
        None => None,
    };

    let matching: Vec<Value> = catalog()
        .into_iter()
        .filter(|p| category_id.is_none_or(|id| p["categoria"] == id))
        .collect();

    let page = query.page.unwrap_or(1);
    let results: Vec<Value> = matching.iter().skip((page - 1) * 2).take(2).cloned().collect();
    let next = (page * 2 < matching.len()).then(|| {
        let mut url = format!("{}produtos/?page={}", state.base_url, page + 1);
        if let Some(name) = &query.category {
            url.push_str("&categoria__nome=");
            url.push_str(name);
        }
        url
    });

    Json(json!({
        "count": matching.len(),
        "next": next,
        "previous": null,
        "results": results
    }))
    .into_response()
}

async fn product(State(state): State<Arc<StubState>>, Path(id): Path<i64>) -> Response {
    *lock(&state.product_requests) += 1;
    catalog()
        .into_iter()
        .find(|p| p["id"] == id)
        .map_or_else(
            || detail(StatusCode::NOT_FOUND, "No Produto matches the given query."),
            |p| Json(p).into_response(),
        )
}

async fn categories() -> Response {
    let list: Vec<Value> = CATEGORIES
        .iter()
        .map(|(id, nome)| json!({ "id": id, "nome": nome }))
        .collect();
    Json(list).into_response()
}

async fn cart_delta(
    State(state): State<Arc<StubState>>,
    method: Method,
    headers: HeaderMap,
    Json(body): Json<CartItemBody>,
) -> Response {
    if !authorized(&headers) {
        return detail(
            StatusCode::UNAUTHORIZED,
            "Authentication credentials were not provided.",
        );
    }

    let delay = *lock(&state.cart_delay);
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    lock(&state.deltas).push(RecordedDelta {
        method: method.clone(),
        produto: body.produto,
        quantidade: body.quantidade,
    });

    if method == Method::POST && body.produto == OUT_OF_STOCK {
        return detail(StatusCode::BAD_REQUEST, "Produto sem estoque");
    }
    (StatusCode::OK, Json(json!({ "status": "ok" }))).into_response()
}
