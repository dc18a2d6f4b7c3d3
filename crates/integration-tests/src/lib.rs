//! Integration tests for the EV Market client.
//!
//! Each test starts [`MockBackend`], an in-process axum server speaking the
//! marketplace REST API on an ephemeral port, and drives the real
//! [`ApiClient`] against it over HTTP.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p ev-market-integration-tests
//! ```
//!
//! The mock deliberately mixes record casings and list wrappers
//! (`PascalCase`, `snake_case`, `data`, `$values`) the way the real
//! backend's endpoints do.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Multipart, Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use ev_market_client::{ApiClient, ClientConfig, MemoryStorage};
use serde_json::{Value, json};
use url::Url;

/// Password every mock user signs in with.
pub const PASSWORD: &str = "secret";
/// The buyer account.
pub const BUYER_ID: i64 = 1;
/// The seller owning every seeded listing.
pub const SELLER_ID: i64 = 2;

/// Mutable backend state and fault switches.
pub struct MockState {
    pub users: Mutex<Vec<Value>>,
    pub products: Mutex<Vec<Value>>,
    pub favorites: Mutex<Vec<Value>>,
    pub notifications: Mutex<Vec<Value>>,
    pub payments: Mutex<Vec<Value>>,
    /// `METHOD path` of every request received.
    pub requests: Mutex<Vec<String>>,
    /// Serve `GET /api/Product/search`; 404 otherwise.
    pub search_available: AtomicBool,
    /// Answer image uploads with 500.
    pub fail_uploads: AtomicBool,
    /// Answer favorite deletion with 500.
    pub fail_favorite_delete: AtomicBool,
    /// Delay before answering `GET /api/User/{id}`.
    pub user_delay_ms: AtomicU64,
    next_id: AtomicI64,
}

impl MockState {
    fn seeded() -> Self {
        let users = vec![
            json!({"userId": BUYER_ID, "email": "buyer@example.com", "fullName": "Nguyễn Văn A", "role": "Member"}),
            json!({"userId": SELLER_ID, "email": "seller@example.com", "fullName": "Trần Thị B", "role": "Member"}),
        ];
        let products = vec![
            json!({"ProductId": 1, "SellerId": SELLER_ID, "Title": "Tesla Model 3", "Price": 400_000_000,
                   "Status": "Approved", "Brand": "Tesla", "Year": 2020, "Mileage": 30_000}),
            json!({"productId": 2, "sellerId": SELLER_ID, "title": "Tesla Model Y", "price": 600_000_000,
                   "status": "active", "brand": "Tesla", "productType": "Vehicle", "year": 2022, "mileage": 10_000}),
            json!({"id": 3, "seller_id": SELLER_ID, "name": "VinFast VF8", "price": "500000000",
                   "status": "verified", "brand": "VinFast", "licensePlate": "30A-123.45"}),
            json!({"id": 4, "sellerId": SELLER_ID, "title": "Pin LFP 48V", "price": 12_000_000,
                   "status": "Approved", "capacity": 100, "voltage": 48, "cycleCount": 350, "batteryHealth": 92}),
            json!({"id": 5, "sellerId": SELLER_ID, "title": "Tesla Roadster", "price": 900_000_000,
                   "status": "Sold", "brand": "Tesla"}),
        ];
        let notifications = vec![
            json!({"notificationId": 1, "userId": BUYER_ID, "title": "Đặt cọc thành công",
                   "content": "Đơn hàng #7", "isRead": false, "createdAt": "2025-03-01T08:00:00Z"}),
            json!({"notificationId": 2, "userId": BUYER_ID, "title": "Chào mừng",
                   "isRead": true, "createdAt": "2025-02-01T08:00:00Z"}),
        ];

        Self {
            users: Mutex::new(users),
            products: Mutex::new(products),
            favorites: Mutex::new(Vec::new()),
            notifications: Mutex::new(notifications),
            payments: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
            search_available: AtomicBool::new(true),
            fail_uploads: AtomicBool::new(false),
            fail_favorite_delete: AtomicBool::new(false),
            user_delay_ms: AtomicU64::new(0),
            next_id: AtomicI64::new(100),
        }
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    fn record(&self, method: &str, path: &str) {
        self.requests.lock().unwrap().push(format!("{method} {path}"));
    }

    /// Whether a request with `method` and `path` was received.
    pub fn received(&self, method: &str, path: &str) -> bool {
        let wanted = format!("{method} {path}");
        self.requests.lock().unwrap().iter().any(|r| *r == wanted)
    }
}

/// A running mock backend.
pub struct MockBackend {
    pub url: Url,
    pub state: Arc<MockState>,
}

impl MockBackend {
    /// Start a seeded backend on an ephemeral port.
    pub async fn start() -> Self {
        let state = Arc::new(MockState::seeded());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let app = router(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: Url::parse(&format!("http://{addr}")).unwrap(),
            state,
        }
    }

    /// Client configuration pointing at this backend.
    #[must_use]
    pub fn config(&self) -> ClientConfig {
        let mut config = ClientConfig::new(self.url.clone());
        config.request_timeout = Duration::from_secs(5);
        config
    }

    /// A signed-out client with fresh in-memory storage.
    #[must_use]
    pub fn client(&self) -> (ApiClient, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        let client = ApiClient::new(&self.config(), storage.clone()).unwrap();
        (client, storage)
    }
}

/// Bearer token issued to a user.
#[must_use]
pub fn token_for(user_id: i64) -> String {
    format!("mock-token-{user_id}")
}

fn problem(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({"message": message, "status": status.as_u16()}))).into_response()
}

fn authorized_user(headers: &HeaderMap) -> Result<i64, Response> {
    let unauthorized = || problem(StatusCode::UNAUTHORIZED, "Phiên đăng nhập không hợp lệ");
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(unauthorized)?;
    token
        .strip_prefix("mock-token-")
        .and_then(|id| id.parse().ok())
        .ok_or_else(unauthorized)
}

fn id_of(record: &Value, keys: &[&str]) -> Option<i64> {
    let object = record.as_object()?;
    keys.iter().find_map(|key| {
        object
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key) || k.replace('_', "").eq_ignore_ascii_case(key))
            .and_then(|(_, v)| v.as_i64())
    })
}

fn text_of(record: &Value, key: &str) -> String {
    record
        .as_object()
        .and_then(|o| o.iter().find(|(k, _)| k.eq_ignore_ascii_case(key)))
        .and_then(|(_, v)| v.as_str())
        .unwrap_or_default()
        .to_string()
}

fn router(state: Arc<MockState>) -> Router {
    Router::new()
        .route("/api/User/login", post(login))
        .route("/api/User/{id}", get(get_user))
        .route("/api/Product", get(list_products).post(create_product))
        .route("/api/Product/search", get(search_products))
        .route("/api/Product/seller/{id}", get(seller_products))
        .route("/api/Product/{id}", get(get_product))
        .route("/api/ProductImage/multiple", post(upload_images))
        .route("/api/Favorite", post(add_favorite))
        .route("/api/Favorite/user/{id}", get(list_favorites))
        .route("/api/Favorite/{id}", delete(delete_favorite))
        .route("/api/Notification/user/{id}", get(list_notifications))
        .route("/api/Notification/{id}/read", put(read_notification))
        .route("/api/Order", post(create_order))
        .route("/api/Payment", post(create_payment))
        .route("/api/Payment/{id}", get(get_payment))
        .with_state(state)
}

async fn login(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    state.record("POST", "/api/User/login");
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    let user = state
        .users
        .lock()
        .unwrap()
        .iter()
        .find(|u| u["email"] == email)
        .cloned();

    match user {
        Some(user) if password == PASSWORD => {
            let id = user["userId"].as_i64().unwrap_or_default();
            Json(json!({"token": token_for(id), "user": user})).into_response()
        }
        _ => problem(StatusCode::UNAUTHORIZED, "Email hoặc mật khẩu không đúng"),
    }
}

async fn get_user(State(state): State<Arc<MockState>>, Path(id): Path<i64>) -> Response {
    state.record("GET", &format!("/api/User/{id}"));
    let delay = state.user_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }
    let user = state
        .users
        .lock()
        .unwrap()
        .iter()
        .find(|u| u["userId"] == id)
        .cloned();
    user.map_or_else(
        || problem(StatusCode::NOT_FOUND, "Không tìm thấy người dùng"),
        |u| Json(u).into_response(),
    )
}

async fn list_products(State(state): State<Arc<MockState>>) -> Json<Value> {
    state.record("GET", "/api/Product");
    let products = state.products.lock().unwrap().clone();
    Json(json!({"data": products}))
}

/// Server search only honours `brand`; status gating is left to the client.
async fn search_products(
    State(state): State<Arc<MockState>>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    state.record("GET", "/api/Product/search");
    if !state.search_available.load(Ordering::SeqCst) {
        return StatusCode::NOT_FOUND.into_response();
    }
    let brand = query.get("brand").map(|b| b.to_lowercase()).unwrap_or_default();
    let products: Vec<Value> = state
        .products
        .lock()
        .unwrap()
        .iter()
        .filter(|p| text_of(p, "brand").to_lowercase().contains(&brand))
        .cloned()
        .collect();
    Json(json!({"$values": products})).into_response()
}

async fn seller_products(State(state): State<Arc<MockState>>, Path(id): Path<i64>) -> Json<Value> {
    state.record("GET", &format!("/api/Product/seller/{id}"));
    let products: Vec<Value> = state
        .products
        .lock()
        .unwrap()
        .iter()
        .filter(|p| id_of(p, &["sellerId"]) == Some(id))
        .cloned()
        .collect();
    Json(Value::Array(products))
}

async fn get_product(State(state): State<Arc<MockState>>, Path(id): Path<i64>) -> Response {
    state.record("GET", &format!("/api/Product/{id}"));
    let product = state
        .products
        .lock()
        .unwrap()
        .iter()
        .find(|p| id_of(p, &["productId", "id"]) == Some(id))
        .cloned();
    product.map_or_else(
        || problem(StatusCode::NOT_FOUND, "Không tìm thấy sản phẩm"),
        |p| Json(p).into_response(),
    )
}

async fn create_product(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Response {
    state.record("POST", "/api/Product");
    let user_id = match authorized_user(&headers) {
        Ok(id) => id,
        Err(response) => return response,
    };
    if body["title"].as_str().is_none_or(|t| t.trim().is_empty()) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "title": "One or more validation errors occurred.",
                "status": 400,
                "errors": {"Title": ["Tiêu đề là bắt buộc"]}
            })),
        )
            .into_response();
    }

    let id = state.next_id();
    body["productId"] = json!(id);
    body["sellerId"] = json!(user_id);
    body["status"] = json!("Pending");
    state.products.lock().unwrap().push(body.clone());
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn upload_images(State(state): State<Arc<MockState>>, mut multipart: Multipart) -> Response {
    state.record("POST", "/api/ProductImage/multiple");
    if state.fail_uploads.load(Ordering::SeqCst) {
        return problem(StatusCode::INTERNAL_SERVER_ERROR, "Lưu trữ ảnh không khả dụng");
    }

    let mut product_id = String::new();
    let mut files = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        match field.name() {
            Some("productId") => product_id = field.text().await.unwrap_or_default(),
            Some("images") => files.push(field.file_name().unwrap_or("image").to_string()),
            _ => {}
        }
    }

    let urls: Vec<Value> = files
        .iter()
        .map(|name| json!({"imageUrl": format!("https://cdn.test/{product_id}/{name}")}))
        .collect();
    Json(Value::Array(urls)).into_response()
}

async fn list_favorites(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    state.record("GET", &format!("/api/Favorite/user/{id}"));
    if let Err(response) = authorized_user(&headers) {
        return response;
    }
    let favorites: Vec<Value> = state
        .favorites
        .lock()
        .unwrap()
        .iter()
        .filter(|f| f["userId"] == id)
        .cloned()
        .collect();
    Json(json!({"$values": favorites})).into_response()
}

async fn add_favorite(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record("POST", "/api/Favorite");
    if let Err(response) = authorized_user(&headers) {
        return response;
    }
    let favorite = json!({
        "favoriteId": state.next_id(),
        "userId": body["userId"],
        "productId": body["productId"],
        "createdAt": "2025-03-02T10:00:00Z",
    });
    state.favorites.lock().unwrap().push(favorite.clone());
    (StatusCode::CREATED, Json(favorite)).into_response()
}

async fn delete_favorite(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    state.record("DELETE", &format!("/api/Favorite/{id}"));
    if let Err(response) = authorized_user(&headers) {
        return response;
    }
    if state.fail_favorite_delete.load(Ordering::SeqCst) {
        return problem(StatusCode::INTERNAL_SERVER_ERROR, "Lỗi máy chủ");
    }
    state
        .favorites
        .lock()
        .unwrap()
        .retain(|f| f["favoriteId"] != id);
    StatusCode::NO_CONTENT.into_response()
}

async fn list_notifications(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    state.record("GET", &format!("/api/Notification/user/{id}"));
    if let Err(response) = authorized_user(&headers) {
        return response;
    }
    let notifications: Vec<Value> = state
        .notifications
        .lock()
        .unwrap()
        .iter()
        .filter(|n| n["userId"] == id)
        .cloned()
        .collect();
    Json(json!({"$values": notifications})).into_response()
}

async fn read_notification(State(state): State<Arc<MockState>>, Path(id): Path<i64>) -> StatusCode {
    state.record("PUT", &format!("/api/Notification/{id}/read"));
    for n in state.notifications.lock().unwrap().iter_mut() {
        if n["notificationId"] == id {
            n["isRead"] = json!(true);
        }
    }
    StatusCode::NO_CONTENT
}

async fn create_order(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record("POST", "/api/Order");
    if let Err(response) = authorized_user(&headers) {
        return response;
    }
    Json(json!({
        "orderId": state.next_id(),
        "buyerId": body["buyerId"],
        "sellerId": body["sellerId"],
        "productId": body["productId"],
        "totalAmount": body["totalAmount"],
        "status": "Pending",
    }))
    .into_response()
}

async fn create_payment(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record("POST", "/api/Payment");
    if let Err(response) = authorized_user(&headers) {
        return response;
    }
    let id = state.next_id();
    let payment = json!({
        "paymentId": id,
        "orderId": body["orderId"],
        "productId": body["productId"],
        "amount": body["amount"],
        "paymentType": body["paymentType"],
        "status": "Pending",
        "paymentUrl": format!("https://sandbox.vnpayment.vn/paymentv2/vpcpay.html?vnp_TxnRef={id}"),
    });
    state.payments.lock().unwrap().push(payment.clone());
    Json(json!({"data": payment})).into_response()
}

async fn get_payment(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    state.record("GET", &format!("/api/Payment/{id}"));
    if let Err(response) = authorized_user(&headers) {
        return response;
    }
    let payment = state
        .payments
        .lock()
        .unwrap()
        .iter()
        .find(|p| p["paymentId"] == id)
        .cloned();
    payment.map_or_else(
        || problem(StatusCode::NOT_FOUND, "Không tìm thấy giao dịch"),
        |mut p| {
            p["status"] = json!("Success");
            Json(p).into_response()
        },
    )
}
