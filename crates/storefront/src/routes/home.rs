//! Home page and catalog browsing route handlers.
//!
//! The home page is a hero banner plus the catalog section. Department
//! selection swaps the whole catalog section (pills, heading, grid) so the
//! active pill and heading stay in step; searching swaps only the grid so
//! the input keeps focus while the visitor types.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use greengrocer_core::{DepartmentId, Money, ProductId};

use crate::filters;
use crate::grocer::types::{Department, Product};
use crate::middleware::OptionalAuth;
use crate::routes::Shell;
use crate::state::AppState;

// =============================================================================
// Query Types
// =============================================================================

/// Query parameters for the catalog fragments.
#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    /// Department filter; absent means all departments.
    pub department_id: Option<DepartmentId>,
    /// Search term, matched case-insensitively against product names.
    #[serde(default)]
    pub q: String,
}

// =============================================================================
// Views
// =============================================================================

/// Placeholder shown for products without an image.
const PRODUCT_PLACEHOLDER: &str = "https://placehold.co/400x400?text=Product";

/// Product display data for catalog cards.
#[derive(Clone)]
pub struct ProductCardView {
    pub id: ProductId,
    pub name: String,
    pub price: Money,
    pub image_url: String,
    pub department_name: String,
}

/// Everything the catalog section renders: department pills, the active
/// filter, and the (possibly searched) product grid.
#[derive(Clone)]
pub struct CatalogView {
    pub departments: Vec<Department>,
    pub selected: Option<DepartmentId>,
    pub heading: String,
    pub products: Vec<ProductCardView>,
    pub query: String,
    pub signed_in: bool,
}

impl CatalogView {
    /// Assemble the catalog view from backend data.
    ///
    /// The search filter runs here rather than on the backend, which has
    /// no search parameter.
    fn build(
        departments: Vec<Department>,
        selected: Option<DepartmentId>,
        products: Vec<Product>,
        query: String,
        signed_in: bool,
    ) -> Self {
        let heading = selected
            .and_then(|id| departments.iter().find(|d| d.id == id))
            .map_or_else(|| "All Products".to_string(), |d| d.name.clone());

        let needle = query.trim().to_lowercase();
        let products = products
            .into_iter()
            .filter(|p| needle.is_empty() || p.name.to_lowercase().contains(&needle))
            .map(|p| {
                let department_name = departments
                    .iter()
                    .find(|d| d.id == p.department_id)
                    .map(|d| d.name.clone())
                    .unwrap_or_default();
                ProductCardView {
                    id: p.id,
                    name: p.name,
                    price: p.price,
                    image_url: p
                        .image_url
                        .unwrap_or_else(|| PRODUCT_PLACEHOLDER.to_owned()),
                    department_name,
                }
            })
            .collect();

        Self {
            departments,
            selected,
            heading,
            products,
            query,
            signed_in,
        }
    }

    /// Template helper for the active department pill.
    #[must_use]
    pub fn is_selected(&self, id: DepartmentId) -> bool {
        self.selected == Some(id)
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub shell: Shell,
    pub catalog: CatalogView,
}

/// Catalog section fragment (department pills + heading + grid).
#[derive(Template, WebTemplate)]
#[template(path = "catalog/section.html")]
pub struct CatalogTemplate {
    pub catalog: CatalogView,
}

/// Product grid fragment (search results).
#[derive(Template, WebTemplate)]
#[template(path = "catalog/grid.html")]
pub struct GridTemplate {
    pub catalog: CatalogView,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the home page.
#[instrument(skip(state, session))]
pub async fn home(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> impl IntoResponse {
    let catalog = load_catalog(&state, None, String::new(), user.is_some()).await;
    let shell = Shell::load(&state, &session, user).await;

    HomeTemplate { shell, catalog }
}

/// Catalog section fragment for department selection (HTMX).
#[instrument(skip(state))]
pub async fn catalog_section(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<CatalogQuery>,
) -> impl IntoResponse {
    // Picking a department clears the search box, so this fragment always
    // renders unsearched.
    let catalog = load_catalog(&state, query.department_id, String::new(), user.is_some()).await;

    CatalogTemplate { catalog }
}

/// Product grid fragment for live search (HTMX).
#[instrument(skip(state))]
pub async fn catalog_grid(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<CatalogQuery>,
) -> impl IntoResponse {
    let catalog = load_catalog(&state, query.department_id, query.q, user.is_some()).await;

    GridTemplate { catalog }
}

/// Fetch departments and products, tolerating backend failures with an
/// empty catalog rather than failing the whole page.
async fn load_catalog(
    state: &AppState,
    selected: Option<DepartmentId>,
    query: String,
    signed_in: bool,
) -> CatalogView {
    let departments = state.grocer().departments().await.unwrap_or_else(|e| {
        tracing::error!("Failed to fetch departments: {e}");
        Vec::new()
    });

    let products = state.grocer().products(selected).await.unwrap_or_else(|e| {
        tracing::error!("Failed to fetch products: {e}");
        Vec::new()
    });

    CatalogView::build(departments, selected, products, query, signed_in)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dept(id: i64, name: &str) -> Department {
        Department {
            id: DepartmentId::new(id),
            name: name.to_string(),
        }
    }

    fn product(id: i64, name: &str, dept_id: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            price: "$2.50".parse().unwrap(),
            image_url: None,
            department_id: DepartmentId::new(dept_id),
        }
    }

    #[test]
    fn search_matches_case_insensitively() {
        let catalog = CatalogView::build(
            vec![dept(1, "Dairy")],
            None,
            vec![product(1, "Whole Milk", 1), product(2, "Butter", 1)],
            "miLK".to_string(),
            true,
        );

        assert_eq!(catalog.products.len(), 1);
        assert_eq!(catalog.products[0].name, "Whole Milk");
    }

    #[test]
    fn blank_search_keeps_everything() {
        let catalog = CatalogView::build(
            vec![dept(1, "Dairy")],
            None,
            vec![product(1, "Whole Milk", 1), product(2, "Butter", 1)],
            "   ".to_string(),
            false,
        );

        assert_eq!(catalog.products.len(), 2);
    }

    #[test]
    fn heading_follows_the_selected_department() {
        let departments = vec![dept(1, "Dairy"), dept(2, "Bakery")];

        let all = CatalogView::build(departments.clone(), None, vec![], String::new(), true);
        assert_eq!(all.heading, "All Products");

        let filtered = CatalogView::build(
            departments,
            Some(DepartmentId::new(2)),
            vec![],
            String::new(),
            true,
        );
        assert_eq!(filtered.heading, "Bakery");
    }

    #[test]
    fn missing_images_get_the_placeholder() {
        let catalog = CatalogView::build(
            vec![dept(1, "Dairy")],
            None,
            vec![product(1, "Whole Milk", 1)],
            String::new(),
            true,
        );

        assert_eq!(catalog.products[0].image_url, PRODUCT_PLACEHOLDER);
    }

    #[test]
    fn only_the_chosen_pill_is_selected() {
        let catalog = CatalogView::build(
            vec![dept(1, "Dairy"), dept(2, "Bakery")],
            Some(DepartmentId::new(1)),
            vec![],
            String::new(),
            false,
        );

        assert!(catalog.is_selected(DepartmentId::new(1)));
        assert!(!catalog.is_selected(DepartmentId::new(2)));
    }

    #[test]
    fn cards_carry_their_department_name() {
        let catalog = CatalogView::build(
            vec![dept(1, "Dairy")],
            None,
            vec![product(1, "Whole Milk", 1), product(2, "Mystery", 9)],
            String::new(),
            true,
        );

        assert_eq!(catalog.products[0].department_name, "Dairy");
        assert_eq!(catalog.products[1].department_name, "");
    }
}
