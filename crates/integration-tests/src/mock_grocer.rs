//! A minimal in-memory stand-in for the grocer backend.
//!
//! Speaks just enough of the backend's REST surface for the storefront:
//! bearer-token auth, a seeded catalog, one cart per account, and a
//! checkout that folds the cart into an order. Every request is recorded
//! so tests can assert on the traffic the storefront produced, and the
//! shopper's token can be revoked mid-test to exercise the expired-session
//! paths.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::{Path, Query, Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

/// Credentials the mock accepts for the seeded shopper account.
pub const SHOPPER_EMAIL: &str = "shopper@greengrocer.test";
pub const SHOPPER_PASSWORD: &str = "rutabaga-9-kettle";

/// Credentials the mock accepts for the seeded admin account.
pub const ADMIN_EMAIL: &str = "manager@greengrocer.test";
pub const ADMIN_PASSWORD: &str = "parsnip-4-lantern";

const SHOPPER_ID: i64 = 1;
const ADMIN_ID: i64 = 2;
const SHOPPER_TOKEN: &str = "token-shopper-53a1";
const ADMIN_TOKEN: &str = "token-admin-90df";

/// Timestamp stamped on every mock order; renders as "Mar 7, 2026".
const ORDER_TIMESTAMP: &str = "2026-03-07T14:30:05.123456";

// =============================================================================
// State
// =============================================================================

#[derive(Clone)]
struct Account {
    id: i64,
    email: String,
    password: String,
    token: String,
    is_admin: bool,
}

#[derive(Clone, Serialize)]
struct Department {
    id: i64,
    name: String,
}

#[derive(Clone, Serialize)]
struct Product {
    id: i64,
    name: String,
    price: f64,
    image_url: Option<String>,
    department_id: i64,
}

#[derive(Clone, Serialize)]
struct CartLine {
    id: i64,
    product_id: i64,
    product_name: String,
    price: f64,
    image_url: Option<String>,
    quantity: u32,
    subtotal: f64,
}

#[derive(Clone, Serialize)]
struct OrderLine {
    product_name: String,
    quantity: u32,
    price_at_purchase: f64,
    subtotal: f64,
}

#[derive(Clone)]
struct Order {
    id: i64,
    timestamp: String,
    unique_code: String,
    total_price: f64,
    items: Vec<OrderLine>,
}

struct MockData {
    accounts: Vec<Account>,
    revoked: HashSet<String>,
    departments: Vec<Department>,
    products: Vec<Product>,
    carts: HashMap<i64, Vec<CartLine>>,
    orders: HashMap<i64, Vec<Order>>,
    hits: Vec<String>,
    checkout_unavailable: bool,
    next_id: i64,
}

impl MockData {
    fn seeded() -> Self {
        let accounts = vec![
            Account {
                id: SHOPPER_ID,
                email: SHOPPER_EMAIL.to_owned(),
                password: SHOPPER_PASSWORD.to_owned(),
                token: SHOPPER_TOKEN.to_owned(),
                is_admin: false,
            },
            Account {
                id: ADMIN_ID,
                email: ADMIN_EMAIL.to_owned(),
                password: ADMIN_PASSWORD.to_owned(),
                token: ADMIN_TOKEN.to_owned(),
                is_admin: true,
            },
        ];

        let departments = vec![
            Department {
                id: 1,
                name: "Fruits & Vegs".to_owned(),
            },
            Department {
                id: 2,
                name: "Dairy".to_owned(),
            },
            Department {
                id: 3,
                name: "Bakery".to_owned(),
            },
        ];

        // Quarter-dollar prices stay exact through the float wire format.
        let products = vec![
            Product {
                id: 1,
                name: "Braeburn Apples".to_owned(),
                price: 3.5,
                image_url: None,
                department_id: 1,
            },
            Product {
                id: 2,
                name: "Bananas".to_owned(),
                price: 1.25,
                image_url: Some("https://img.greengrocer.test/bananas.jpg".to_owned()),
                department_id: 1,
            },
            Product {
                id: 3,
                name: "Whole Milk".to_owned(),
                price: 2.5,
                image_url: None,
                department_id: 2,
            },
            Product {
                id: 4,
                name: "Mature Cheddar".to_owned(),
                price: 4.75,
                image_url: None,
                department_id: 2,
            },
            Product {
                id: 5,
                name: "Sourdough Loaf".to_owned(),
                price: 4.0,
                image_url: None,
                department_id: 3,
            },
        ];

        Self {
            accounts,
            revoked: HashSet::new(),
            departments,
            products,
            carts: HashMap::new(),
            orders: HashMap::new(),
            hits: Vec::new(),
            checkout_unavailable: false,
            next_id: 100,
        }
    }

    fn take_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Clone)]
struct Backend {
    data: Arc<Mutex<MockData>>,
}

impl Backend {
    fn lock(&self) -> MutexGuard<'_, MockData> {
        self.data.lock().expect("mock state poisoned")
    }
}

// =============================================================================
// Auth Helpers
// =============================================================================

/// The backend's uniform error payload.
fn failure(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

fn authenticate(data: &MockData, headers: &HeaderMap) -> Result<Account, Response> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| failure(StatusCode::UNAUTHORIZED, "Missing token"))?;

    if data.revoked.contains(token) {
        return Err(failure(StatusCode::UNAUTHORIZED, "Invalid token"));
    }

    data.accounts
        .iter()
        .find(|account| account.token == token)
        .cloned()
        .ok_or_else(|| failure(StatusCode::UNAUTHORIZED, "Invalid token"))
}

fn authenticate_admin(data: &MockData, headers: &HeaderMap) -> Result<Account, Response> {
    let account = authenticate(data, headers)?;
    if !account.is_admin {
        return Err(failure(StatusCode::FORBIDDEN, "Admin access required"));
    }
    Ok(account)
}

// =============================================================================
// Handlers
// =============================================================================

async fn record(State(backend): State<Backend>, request: Request, next: Next) -> Response {
    let line = format!("{} {}", request.method(), request.uri().path());
    backend.lock().hits.push(line);
    next.run(request).await
}

async fn health() -> StatusCode {
    StatusCode::OK
}

#[derive(Deserialize)]
struct Credentials {
    email: String,
    password: String,
}

async fn login(State(backend): State<Backend>, Json(creds): Json<Credentials>) -> Response {
    let data = backend.lock();
    data.accounts
        .iter()
        .find(|account| account.email == creds.email && account.password == creds.password)
        .map_or_else(
            || failure(StatusCode::UNAUTHORIZED, "Invalid email or password"),
            |account| {
                Json(json!({
                    "access_token": account.token,
                    "is_admin": account.is_admin,
                    "email": account.email,
                }))
                .into_response()
            },
        )
}

async fn register(State(backend): State<Backend>, Json(creds): Json<Credentials>) -> Response {
    let mut data = backend.lock();
    if data
        .accounts
        .iter()
        .any(|account| account.email == creds.email)
    {
        return failure(StatusCode::BAD_REQUEST, "Email already registered");
    }

    let id = data.take_id();
    data.accounts.push(Account {
        id,
        email: creds.email,
        password: creds.password,
        token: format!("token-user-{id}"),
        is_admin: false,
    });

    (
        StatusCode::CREATED,
        Json(json!({ "message": "Account created" })),
    )
        .into_response()
}

async fn me(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    let data = backend.lock();
    let account = match authenticate(&data, &headers) {
        Ok(account) => account,
        Err(resp) => return resp,
    };

    Json(json!({
        "id": account.id,
        "email": account.email,
        "is_admin": account.is_admin,
    }))
    .into_response()
}

async fn list_departments(State(backend): State<Backend>) -> Response {
    Json(backend.lock().departments.clone()).into_response()
}

#[derive(Deserialize)]
struct ProductsQuery {
    department_id: Option<i64>,
}

async fn list_products(
    State(backend): State<Backend>,
    Query(query): Query<ProductsQuery>,
) -> Response {
    let data = backend.lock();
    let products: Vec<Product> = data
        .products
        .iter()
        .filter(|product| {
            query
                .department_id
                .is_none_or(|id| product.department_id == id)
        })
        .cloned()
        .collect();

    Json(products).into_response()
}

async fn fetch_product(State(backend): State<Backend>, Path(id): Path<i64>) -> Response {
    let data = backend.lock();
    data.products
        .iter()
        .find(|product| product.id == id)
        .map_or_else(
            || failure(StatusCode::NOT_FOUND, "Product not found"),
            |product| Json(product.clone()).into_response(),
        )
}

async fn fetch_cart(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    let data = backend.lock();
    let account = match authenticate(&data, &headers) {
        Ok(account) => account,
        Err(resp) => return resp,
    };

    let lines = data.carts.get(&account.id).cloned().unwrap_or_default();
    Json(lines).into_response()
}

#[derive(Deserialize)]
struct AddLinePayload {
    product_id: i64,
    quantity: u32,
}

async fn add_line(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Json(payload): Json<AddLinePayload>,
) -> Response {
    let mut data = backend.lock();
    let account = match authenticate(&data, &headers) {
        Ok(account) => account,
        Err(resp) => return resp,
    };

    let Some(product) = data
        .products
        .iter()
        .find(|product| product.id == payload.product_id)
        .cloned()
    else {
        return failure(StatusCode::NOT_FOUND, "Product not found");
    };

    let line_id = data.take_id();
    let cart = data.carts.entry(account.id).or_default();
    if let Some(line) = cart.iter_mut().find(|line| line.product_id == product.id) {
        line.quantity += payload.quantity;
        line.subtotal = line.price * f64::from(line.quantity);
    } else {
        cart.push(CartLine {
            id: line_id,
            product_id: product.id,
            product_name: product.name,
            price: product.price,
            image_url: product.image_url,
            quantity: payload.quantity,
            subtotal: product.price * f64::from(payload.quantity),
        });
    }

    (
        StatusCode::CREATED,
        Json(json!({ "message": "Added to cart" })),
    )
        .into_response()
}

#[derive(Deserialize)]
struct QuantityUpdate {
    quantity: u32,
}

async fn update_line(
    State(backend): State<Backend>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(payload): Json<QuantityUpdate>,
) -> Response {
    let mut data = backend.lock();
    let account = match authenticate(&data, &headers) {
        Ok(account) => account,
        Err(resp) => return resp,
    };

    let Some(line) = data
        .carts
        .entry(account.id)
        .or_default()
        .iter_mut()
        .find(|line| line.id == id)
    else {
        return failure(StatusCode::NOT_FOUND, "Cart item not found");
    };

    line.quantity = payload.quantity;
    line.subtotal = line.price * f64::from(line.quantity);
    Json(json!({ "message": "Quantity updated" })).into_response()
}

async fn remove_line(
    State(backend): State<Backend>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    let mut data = backend.lock();
    let account = match authenticate(&data, &headers) {
        Ok(account) => account,
        Err(resp) => return resp,
    };

    let cart = data.carts.entry(account.id).or_default();
    let before = cart.len();
    cart.retain(|line| line.id != id);
    if cart.len() == before {
        return failure(StatusCode::NOT_FOUND, "Cart item not found");
    }

    Json(json!({ "message": "Item removed" })).into_response()
}

async fn clear_cart(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    let mut data = backend.lock();
    let account = match authenticate(&data, &headers) {
        Ok(account) => account,
        Err(resp) => return resp,
    };

    data.carts.insert(account.id, Vec::new());
    Json(json!({ "message": "Cart cleared" })).into_response()
}

async fn checkout(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    let mut data = backend.lock();
    let account = match authenticate(&data, &headers) {
        Ok(account) => account,
        Err(resp) => return resp,
    };

    if data.checkout_unavailable {
        return failure(
            StatusCode::SERVICE_UNAVAILABLE,
            "Checkout is temporarily unavailable",
        );
    }

    let cart = data.carts.entry(account.id).or_default();
    if cart.is_empty() {
        return failure(StatusCode::BAD_REQUEST, "Cart is empty");
    }

    let items: Vec<OrderLine> = cart
        .iter()
        .map(|line| OrderLine {
            product_name: line.product_name.clone(),
            quantity: line.quantity,
            price_at_purchase: line.price,
            subtotal: line.subtotal,
        })
        .collect();
    let total: f64 = items.iter().map(|line| line.subtotal).sum();
    cart.clear();

    let id = data.take_id();
    let code = Uuid::new_v4().to_string();
    data.orders.entry(account.id).or_default().insert(
        0,
        Order {
            id,
            timestamp: ORDER_TIMESTAMP.to_owned(),
            unique_code: code.clone(),
            total_price: total,
            items,
        },
    );

    Json(json!({ "order_code": code, "total_price": total })).into_response()
}

fn summarize(order: &Order) -> serde_json::Value {
    json!({
        "id": order.id,
        "timestamp": order.timestamp,
        "unique_code": order.unique_code,
        "total_price": order.total_price,
        "item_count": order.items.iter().map(|line| line.quantity).sum::<u32>(),
    })
}

async fn list_orders(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    let data = backend.lock();
    let account = match authenticate(&data, &headers) {
        Ok(account) => account,
        Err(resp) => return resp,
    };

    let summaries: Vec<_> = data
        .orders
        .get(&account.id)
        .map(Vec::as_slice)
        .unwrap_or_default()
        .iter()
        .map(summarize)
        .collect();

    Json(summaries).into_response()
}

async fn fetch_order(
    State(backend): State<Backend>,
    Path(code): Path<String>,
    headers: HeaderMap,
) -> Response {
    let data = backend.lock();
    let account = match authenticate(&data, &headers) {
        Ok(account) => account,
        Err(resp) => return resp,
    };

    data.orders
        .get(&account.id)
        .and_then(|orders| orders.iter().find(|order| order.unique_code == code))
        .map_or_else(
            || failure(StatusCode::NOT_FOUND, "Order not found"),
            |order| {
                Json(json!({
                    "id": order.id,
                    "timestamp": order.timestamp,
                    "unique_code": order.unique_code,
                    "total_price": order.total_price,
                    "items": order.items,
                }))
                .into_response()
            },
        )
}

#[derive(Deserialize)]
struct ProductPayload {
    name: String,
    price: f64,
    department_id: i64,
    image_url: Option<String>,
}

async fn create_product(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Json(payload): Json<ProductPayload>,
) -> Response {
    let mut data = backend.lock();
    if let Err(resp) = authenticate_admin(&data, &headers) {
        return resp;
    }

    let id = data.take_id();
    data.products.push(Product {
        id,
        name: payload.name,
        price: payload.price,
        image_url: payload.image_url,
        department_id: payload.department_id,
    });

    (
        StatusCode::CREATED,
        Json(json!({ "message": "Product created" })),
    )
        .into_response()
}

async fn update_product(
    State(backend): State<Backend>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(payload): Json<ProductPayload>,
) -> Response {
    let mut data = backend.lock();
    if let Err(resp) = authenticate_admin(&data, &headers) {
        return resp;
    }

    let Some(product) = data.products.iter_mut().find(|product| product.id == id) else {
        return failure(StatusCode::NOT_FOUND, "Product not found");
    };
    product.name = payload.name;
    product.price = payload.price;
    product.image_url = payload.image_url;
    product.department_id = payload.department_id;

    Json(json!({ "message": "Product updated" })).into_response()
}

async fn delete_product(
    State(backend): State<Backend>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    let mut data = backend.lock();
    if let Err(resp) = authenticate_admin(&data, &headers) {
        return resp;
    }

    data.products.retain(|product| product.id != id);
    Json(json!({ "message": "Product deleted" })).into_response()
}

#[derive(Deserialize)]
struct DepartmentPayload {
    name: String,
}

async fn create_department(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Json(payload): Json<DepartmentPayload>,
) -> Response {
    let mut data = backend.lock();
    if let Err(resp) = authenticate_admin(&data, &headers) {
        return resp;
    }

    let id = data.take_id();
    data.departments.push(Department {
        id,
        name: payload.name,
    });

    (
        StatusCode::CREATED,
        Json(json!({ "message": "Department created" })),
    )
        .into_response()
}

async fn update_department(
    State(backend): State<Backend>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(payload): Json<DepartmentPayload>,
) -> Response {
    let mut data = backend.lock();
    if let Err(resp) = authenticate_admin(&data, &headers) {
        return resp;
    }

    let Some(department) = data
        .departments
        .iter_mut()
        .find(|department| department.id == id)
    else {
        return failure(StatusCode::NOT_FOUND, "Department not found");
    };
    department.name = payload.name;

    Json(json!({ "message": "Department updated" })).into_response()
}

async fn delete_department(
    State(backend): State<Backend>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    let mut data = backend.lock();
    if let Err(resp) = authenticate_admin(&data, &headers) {
        return resp;
    }

    if data
        .products
        .iter()
        .any(|product| product.department_id == id)
    {
        return failure(
            StatusCode::BAD_REQUEST,
            "Cannot delete department with products",
        );
    }

    data.departments.retain(|department| department.id != id);
    Json(json!({ "message": "Department deleted" })).into_response()
}

fn router(backend: Backend) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/me", get(me))
        .route("/departments", get(list_departments))
        .route("/products", get(list_products))
        .route("/products/{id}", get(fetch_product))
        .route("/cart", get(fetch_cart).post(add_line).delete(clear_cart))
        .route("/cart/{id}", put(update_line).delete(remove_line))
        .route("/orders/checkout", post(checkout))
        .route("/orders", get(list_orders))
        .route("/orders/{code}", get(fetch_order))
        .route("/admin/products", post(create_product))
        .route(
            "/admin/products/{id}",
            put(update_product).delete(delete_product),
        )
        .route("/admin/departments", post(create_department))
        .route(
            "/admin/departments/{id}",
            put(update_department).delete(delete_department),
        )
        .layer(middleware::from_fn_with_state(backend.clone(), record))
        .with_state(backend)
}

// =============================================================================
// Test Handle
// =============================================================================

/// Handle on a running mock backend.
pub struct MockGrocer {
    url: String,
    data: Arc<Mutex<MockData>>,
}

impl MockGrocer {
    /// Boot the mock on an ephemeral port.
    pub async fn start() -> Self {
        let data = Arc::new(Mutex::new(MockData::seeded()));
        let app = router(Backend {
            data: Arc::clone(&data),
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock grocer listener");
        let addr = listener.local_addr().expect("mock grocer listener address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve mock grocer");
        });

        Self {
            url: format!("http://{addr}"),
            data,
        }
    }

    /// Base URL of the running mock.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    fn lock(&self) -> MutexGuard<'_, MockData> {
        self.data.lock().expect("mock state poisoned")
    }

    /// How many recorded requests match `line` exactly, e.g. `"POST /cart"`.
    #[must_use]
    pub fn hits(&self, line: &str) -> usize {
        self.lock()
            .hits
            .iter()
            .filter(|hit| hit.as_str() == line)
            .count()
    }

    /// The shopper's cart as `(line_id, product_id, quantity)` rows.
    #[must_use]
    pub fn shopper_cart(&self) -> Vec<(i64, i64, u32)> {
        self.lock()
            .carts
            .get(&SHOPPER_ID)
            .map(|cart| {
                cart.iter()
                    .map(|line| (line.id, line.product_id, line.quantity))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Full code of the shopper's most recent order.
    #[must_use]
    pub fn latest_order_code(&self) -> Option<String> {
        self.lock()
            .orders
            .get(&SHOPPER_ID)
            .and_then(|orders| orders.first())
            .map(|order| order.unique_code.clone())
    }

    /// Look up a product id by exact name.
    #[must_use]
    pub fn product_id(&self, name: &str) -> Option<i64> {
        self.lock()
            .products
            .iter()
            .find(|product| product.name == name)
            .map(|product| product.id)
    }

    /// Look up a department id by exact name.
    #[must_use]
    pub fn department_id(&self, name: &str) -> Option<i64> {
        self.lock()
            .departments
            .iter()
            .find(|department| department.name == name)
            .map(|department| department.id)
    }

    /// Stop honoring the shopper's bearer token, as the real backend does
    /// once a token expires.
    pub fn revoke_shopper_token(&self) {
        self.lock().revoked.insert(SHOPPER_TOKEN.to_owned());
    }

    /// Make `POST /orders/checkout` answer 503 until switched back.
    pub fn set_checkout_unavailable(&self, unavailable: bool) {
        self.lock().checkout_unavailable = unavailable;
    }
}
