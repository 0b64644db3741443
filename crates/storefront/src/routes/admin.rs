//! Admin dashboard route handlers.
//!
//! One page, two tabs (products and departments), one modal. Tab switches
//! and every mutation re-render the `#admin-panel` fragment from backend
//! data, and the panel answer carries an out-of-band empty `#admin-modal`
//! so a successful save closes the form it came from. Validation failures
//! re-render the form inside the modal instead.

use askama::Template;
use askama_web::WebTemplate;
use axum::Form;
use axum::extract::{Path, State};
use axum::response::{AppendHeaders, IntoResponse, Response};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use greengrocer_core::{DepartmentId, Money, ProductId};

use crate::filters;
use crate::grocer::types::{Department, Product, ProductPayload};
use crate::middleware::RequireAdmin;
use crate::routes::cart::{error_toast, toast_error};
use crate::routes::{Shell, expired_session};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Product create/update form data. The price arrives as text and is
/// parsed here so a bad entry can be reported next to the field.
#[derive(Debug, Deserialize)]
pub struct ProductForm {
    pub name: String,
    pub price: String,
    pub department_id: DepartmentId,
    #[serde(default)]
    pub image_url: String,
}

/// Department create/update form data.
#[derive(Debug, Deserialize)]
pub struct DepartmentForm {
    pub name: String,
}

// =============================================================================
// Views
// =============================================================================

/// Which admin tab is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminTab {
    Products,
    Departments,
}

impl AdminTab {
    /// Template helper for tab styling and conditional tables.
    #[must_use]
    pub const fn is_products(self) -> bool {
        matches!(self, Self::Products)
    }
}

/// One row of the products table, with the department name resolved.
pub struct AdminProductRow {
    pub product: Product,
    pub department_name: String,
}

/// Everything the admin panel fragment renders.
pub struct AdminPanelView {
    pub tab: AdminTab,
    /// Populated on the products tab, empty otherwise.
    pub products: Vec<AdminProductRow>,
    pub departments: Vec<Department>,
}

/// State of the product modal form.
pub struct ProductFormView {
    /// `None` for the create form.
    pub id: Option<ProductId>,
    pub name: String,
    /// Raw text so a rejected entry round-trips back into the field.
    pub price: String,
    pub department_id: Option<DepartmentId>,
    pub image_url: String,
    /// Options for the department select.
    pub departments: Vec<Department>,
    pub error: Option<String>,
}

impl ProductFormView {
    fn blank(departments: Vec<Department>) -> Self {
        Self {
            id: None,
            name: String::new(),
            price: String::new(),
            department_id: None,
            image_url: String::new(),
            departments,
            error: None,
        }
    }

    fn edit(product: Product, departments: Vec<Department>) -> Self {
        Self {
            id: Some(product.id),
            name: product.name,
            price: product.price.to_string(),
            department_id: Some(product.department_id),
            image_url: product.image_url.unwrap_or_default(),
            departments,
            error: None,
        }
    }

    /// Re-fill the form from a rejected submission.
    fn rejected(
        id: Option<ProductId>,
        form: ProductForm,
        departments: Vec<Department>,
        error: String,
    ) -> Self {
        Self {
            id,
            name: form.name,
            price: form.price,
            department_id: Some(form.department_id),
            image_url: form.image_url,
            departments,
            error: Some(error),
        }
    }

    /// Template helper for the department select.
    #[must_use]
    pub fn is_department(&self, id: DepartmentId) -> bool {
        self.department_id == Some(id)
    }
}

/// State of the department modal form.
pub struct DepartmentFormView {
    /// `None` for the create form.
    pub id: Option<DepartmentId>,
    pub name: String,
    pub error: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Admin dashboard page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/index.html")]
pub struct AdminTemplate {
    pub shell: Shell,
    pub panel: AdminPanelView,
}

/// Panel fragment: tabs plus the active table. Also carries the
/// out-of-band modal reset.
#[derive(Template, WebTemplate)]
#[template(path = "admin/panel.html")]
pub struct AdminPanelTemplate {
    pub panel: AdminPanelView,
}

/// Product modal form fragment.
#[derive(Template, WebTemplate)]
#[template(path = "admin/product_form.html")]
pub struct ProductFormTemplate {
    pub form: ProductFormView,
}

/// Department modal form fragment.
#[derive(Template, WebTemplate)]
#[template(path = "admin/department_form.html")]
pub struct DepartmentFormTemplate {
    pub form: DepartmentFormView,
}

// =============================================================================
// Page and Panel Handlers
// =============================================================================

/// Display the admin dashboard, opening on the products tab.
#[instrument(skip(state, session))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
) -> impl IntoResponse {
    let panel = load_panel(&state, AdminTab::Products).await;
    let shell = Shell::load(&state, &session, Some(user)).await;

    AdminTemplate { shell, panel }
}

/// Products tab panel fragment (HTMX).
#[instrument(skip(state))]
pub async fn products_panel(
    State(state): State<AppState>,
    RequireAdmin(_user): RequireAdmin,
) -> impl IntoResponse {
    AdminPanelTemplate {
        panel: load_panel(&state, AdminTab::Products).await,
    }
}

/// Departments tab panel fragment (HTMX).
#[instrument(skip(state))]
pub async fn departments_panel(
    State(state): State<AppState>,
    RequireAdmin(_user): RequireAdmin,
) -> impl IntoResponse {
    AdminPanelTemplate {
        panel: load_panel(&state, AdminTab::Departments).await,
    }
}

/// Fetch whatever the requested tab shows, tolerating backend failures
/// with empty tables rather than failing the dashboard.
async fn load_panel(state: &AppState, tab: AdminTab) -> AdminPanelView {
    let departments = state.grocer().departments().await.unwrap_or_else(|e| {
        tracing::error!("Failed to fetch departments: {e}");
        Vec::new()
    });

    let products = if tab.is_products() {
        let products = state.grocer().products(None).await.unwrap_or_else(|e| {
            tracing::error!("Failed to fetch products: {e}");
            Vec::new()
        });
        products
            .into_iter()
            .map(|product| {
                let department_name = departments
                    .iter()
                    .find(|d| d.id == product.department_id)
                    .map_or_else(|| "Unknown".to_owned(), |d| d.name.clone());
                AdminProductRow {
                    product,
                    department_name,
                }
            })
            .collect()
    } else {
        Vec::new()
    };

    AdminPanelView {
        tab,
        products,
        departments,
    }
}

// =============================================================================
// Product Handlers
// =============================================================================

/// Blank product form fragment for the modal (HTMX).
#[instrument(skip(state))]
pub async fn new_product_form(
    State(state): State<AppState>,
    RequireAdmin(_user): RequireAdmin,
) -> impl IntoResponse {
    ProductFormTemplate {
        form: ProductFormView::blank(fetch_departments(&state).await),
    }
}

/// Pre-filled product form fragment for the modal (HTMX).
#[instrument(skip(state, session))]
pub async fn edit_product_form(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(_user): RequireAdmin,
    Path(id): Path<ProductId>,
) -> Response {
    match state.grocer().product(id).await {
        Ok(product) => ProductFormTemplate {
            form: ProductFormView::edit(product, fetch_departments(&state).await),
        }
        .into_response(),
        Err(err) if err.is_unauthorized() => expired_session(&session).await,
        Err(err) => toast_error("Failed to fetch product", &err),
    }
}

/// Create a product (HTMX).
#[instrument(skip(state, session))]
pub async fn create_product(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
    Form(form): Form<ProductForm>,
) -> Response {
    let payload = match parse_product_form(&form) {
        Ok(payload) => payload,
        Err(error) => return product_form_error(&state, None, form, error).await,
    };

    match state
        .grocer()
        .create_product(&user.access_token, &payload)
        .await
    {
        Ok(()) => {
            tracing::info!(name = %payload.name, "product created");
            panel_response(&state, AdminTab::Products).await
        }
        Err(err) if err.is_unauthorized() => expired_session(&session).await,
        Err(err) => product_form_error(&state, None, form, err.user_message()).await,
    }
}

/// Update a product (HTMX).
#[instrument(skip(state, session))]
pub async fn update_product(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<ProductId>,
    Form(form): Form<ProductForm>,
) -> Response {
    let payload = match parse_product_form(&form) {
        Ok(payload) => payload,
        Err(error) => return product_form_error(&state, Some(id), form, error).await,
    };

    match state
        .grocer()
        .update_product(&user.access_token, id, &payload)
        .await
    {
        Ok(()) => {
            tracing::info!(product_id = %id, "product updated");
            panel_response(&state, AdminTab::Products).await
        }
        Err(err) if err.is_unauthorized() => expired_session(&session).await,
        Err(err) => product_form_error(&state, Some(id), form, err.user_message()).await,
    }
}

/// Delete a product (HTMX).
#[instrument(skip(state, session))]
pub async fn delete_product(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<ProductId>,
) -> Response {
    match state.grocer().delete_product(&user.access_token, id).await {
        Ok(()) => {
            tracing::info!(product_id = %id, "product deleted");
            panel_response(&state, AdminTab::Products).await
        }
        Err(err) if err.is_unauthorized() => expired_session(&session).await,
        Err(err) => toast_error("Failed to delete product", &err),
    }
}

/// Check the submitted fields and assemble the backend payload.
fn parse_product_form(form: &ProductForm) -> Result<ProductPayload, String> {
    let name = form.name.trim();
    if name.is_empty() {
        return Err("Name is required".to_owned());
    }

    let price = form
        .price
        .parse::<Money>()
        .map_err(|_| "Enter a valid price, like 4.99".to_owned())?;
    if price < Money::ZERO {
        return Err("Price cannot be negative".to_owned());
    }

    let image_url = Some(form.image_url.trim())
        .filter(|url| !url.is_empty())
        .map(ToOwned::to_owned);

    Ok(ProductPayload {
        name: name.to_owned(),
        price,
        department_id: form.department_id,
        image_url,
    })
}

/// Re-render the product form inside the modal with an error line.
async fn product_form_error(
    state: &AppState,
    id: Option<ProductId>,
    form: ProductForm,
    error: String,
) -> Response {
    let departments = fetch_departments(state).await;

    (
        AppendHeaders([("HX-Retarget", "#admin-modal"), ("HX-Reswap", "innerHTML")]),
        ProductFormTemplate {
            form: ProductFormView::rejected(id, form, departments, error),
        },
    )
        .into_response()
}

// =============================================================================
// Department Handlers
// =============================================================================

/// Blank department form fragment for the modal (HTMX).
#[instrument]
pub async fn new_department_form(RequireAdmin(_user): RequireAdmin) -> impl IntoResponse {
    DepartmentFormTemplate {
        form: DepartmentFormView {
            id: None,
            name: String::new(),
            error: None,
        },
    }
}

/// Pre-filled department form fragment for the modal (HTMX).
///
/// The backend has no single-department endpoint, so the name comes from
/// the full list.
#[instrument(skip(state, session))]
pub async fn edit_department_form(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(_user): RequireAdmin,
    Path(id): Path<DepartmentId>,
) -> Response {
    match state.grocer().departments().await {
        Ok(departments) => departments.into_iter().find(|d| d.id == id).map_or_else(
            || error_toast("Department not found".to_owned()),
            |department| {
                DepartmentFormTemplate {
                    form: DepartmentFormView {
                        id: Some(department.id),
                        name: department.name,
                        error: None,
                    },
                }
                .into_response()
            },
        ),
        Err(err) if err.is_unauthorized() => expired_session(&session).await,
        Err(err) => toast_error("Failed to fetch departments", &err),
    }
}

/// Create a department (HTMX).
#[instrument(skip(state, session))]
pub async fn create_department(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
    Form(form): Form<DepartmentForm>,
) -> Response {
    let Some(name) = department_name(&form) else {
        return department_form_error(None, form, "Name is required".to_owned());
    };

    match state
        .grocer()
        .create_department(&user.access_token, &name)
        .await
    {
        Ok(()) => {
            tracing::info!(name = %name, "department created");
            panel_response(&state, AdminTab::Departments).await
        }
        Err(err) if err.is_unauthorized() => expired_session(&session).await,
        Err(err) => department_form_error(None, form, err.user_message()),
    }
}

/// Rename a department (HTMX).
#[instrument(skip(state, session))]
pub async fn update_department(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<DepartmentId>,
    Form(form): Form<DepartmentForm>,
) -> Response {
    let Some(name) = department_name(&form) else {
        return department_form_error(Some(id), form, "Name is required".to_owned());
    };

    match state
        .grocer()
        .update_department(&user.access_token, id, &name)
        .await
    {
        Ok(()) => {
            tracing::info!(department_id = %id, "department renamed");
            panel_response(&state, AdminTab::Departments).await
        }
        Err(err) if err.is_unauthorized() => expired_session(&session).await,
        Err(err) => department_form_error(Some(id), form, err.user_message()),
    }
}

/// Delete a department (HTMX).
///
/// The backend refuses while products still reference it; that message
/// surfaces as a toast over the unchanged table.
#[instrument(skip(state, session))]
pub async fn delete_department(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<DepartmentId>,
) -> Response {
    match state
        .grocer()
        .delete_department(&user.access_token, id)
        .await
    {
        Ok(()) => {
            tracing::info!(department_id = %id, "department deleted");
            panel_response(&state, AdminTab::Departments).await
        }
        Err(err) if err.is_unauthorized() => expired_session(&session).await,
        Err(err) => toast_error("Failed to delete department", &err),
    }
}

fn department_name(form: &DepartmentForm) -> Option<String> {
    Some(form.name.trim())
        .filter(|name| !name.is_empty())
        .map(ToOwned::to_owned)
}

/// Re-render the department form inside the modal with an error line.
fn department_form_error(id: Option<DepartmentId>, form: DepartmentForm, error: String) -> Response {
    (
        AppendHeaders([("HX-Retarget", "#admin-modal"), ("HX-Reswap", "innerHTML")]),
        DepartmentFormTemplate {
            form: DepartmentFormView {
                id,
                name: form.name,
                error: Some(error),
            },
        },
    )
        .into_response()
}

// =============================================================================
// Shared
// =============================================================================

/// The panel fragment every successful mutation answers with.
async fn panel_response(state: &AppState, tab: AdminTab) -> Response {
    AdminPanelTemplate {
        panel: load_panel(state, tab).await,
    }
    .into_response()
}

async fn fetch_departments(state: &AppState) -> Vec<Department> {
    state.grocer().departments().await.unwrap_or_else(|e| {
        tracing::error!("Failed to fetch departments: {e}");
        Vec::new()
    })
}
