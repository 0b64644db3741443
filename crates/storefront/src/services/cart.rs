//! Cart presentation logic.
//!
//! The navbar badge, the mini-cart, and the cart page all render from a
//! [`CartSummary`], and every one of them derives it through
//! [`CartSummary::refresh`]. Totals are computed in exactly one place.

use tower_sessions::Session;

use greengrocer_core::Money;

use crate::grocer::types::CartItem;
use crate::middleware::auth::clear_current_user;
use crate::models::CurrentUser;
use crate::state::AppState;

/// Everything the UI shows about the cart.
#[derive(Debug, Clone, Default)]
pub struct CartSummary {
    /// Line items as the backend returned them.
    pub items: Vec<CartItem>,
    /// Total units across all lines (the badge number).
    pub count: u32,
    /// Sum of the per-line subtotals.
    pub total: Money,
}

impl CartSummary {
    /// Lines the mini-cart shows before collapsing the rest.
    const PREVIEW_LINES: usize = 5;

    /// An empty cart, shown to guests and when the backend is unreachable.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Derive the summary from backend line items.
    ///
    /// The badge counts units rather than lines, so three bananas and one
    /// milk show as 4.
    #[must_use]
    pub fn from_items(items: Vec<CartItem>) -> Self {
        let count = items.iter().map(|item| item.quantity).sum();
        let total = items.iter().map(|item| item.subtotal).sum();
        Self {
            items,
            count,
            total,
        }
    }

    /// Whether there is anything in the cart.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Lines shown in the mini-cart dropdown.
    #[must_use]
    pub fn preview_items(&self) -> &[CartItem] {
        &self.items[..self.items.len().min(Self::PREVIEW_LINES)]
    }

    /// How many lines the mini-cart collapses into its "+N more" row.
    #[must_use]
    pub fn hidden_count(&self) -> usize {
        self.items.len().saturating_sub(Self::PREVIEW_LINES)
    }

    /// Fetch the signed-in user's cart and derive the summary.
    ///
    /// Guests get an empty summary without touching the backend. A
    /// rejected token signs the visitor out and also falls back to empty;
    /// other backend failures are logged and render as an empty cart
    /// rather than failing the page around it.
    pub async fn refresh(
        state: &AppState,
        session: &Session,
        user: Option<&CurrentUser>,
    ) -> Self {
        let Some(user) = user else {
            return Self::empty();
        };

        match state.grocer().cart(&user.access_token).await {
            Ok(items) => Self::from_items(items),
            Err(err) if err.is_unauthorized() => {
                // The backend no longer honors this token. Drop the stale
                // identity so the UI stops pretending to be signed in.
                if let Err(e) = clear_current_user(session).await {
                    tracing::warn!("failed to clear stale session: {e}");
                }
                tracing::info!(user_id = %user.id, "session token rejected by backend");
                Self::empty()
            }
            Err(err) => {
                tracing::error!("Failed to load cart: {err}");
                Self::empty()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use greengrocer_core::{CartItemId, ProductId};

    use super::*;

    fn item(id: i64, quantity: u32, unit: &str, subtotal: &str) -> CartItem {
        CartItem {
            id: CartItemId::new(id),
            product_id: ProductId::new(id * 10),
            product_name: format!("Product {id}"),
            price: unit.parse().unwrap(),
            image_url: None,
            quantity,
            subtotal: subtotal.parse().unwrap(),
        }
    }

    #[test]
    fn summary_counts_units_not_lines() {
        let summary =
            CartSummary::from_items(vec![item(1, 2, "$3.50", "$7.00"), item(2, 1, "$12.00", "$12.00")]);

        assert_eq!(summary.count, 3);
        assert_eq!(summary.total.display(), "$19.00");
        assert!(!summary.is_empty());
    }

    #[test]
    fn summary_of_no_items_is_zero() {
        let summary = CartSummary::from_items(vec![]);

        assert_eq!(summary.count, 0);
        assert!(summary.total.is_zero());
        assert!(summary.is_empty());
    }

    #[test]
    fn empty_matches_default() {
        let summary = CartSummary::empty();

        assert_eq!(summary.count, 0);
        assert!(summary.items.is_empty());
    }

    #[test]
    fn preview_collapses_beyond_five_lines() {
        let items: Vec<_> = (1..=7)
            .map(|id| item(id, 1, "$1.00", "$1.00"))
            .collect();
        let summary = CartSummary::from_items(items);

        assert_eq!(summary.preview_items().len(), 5);
        assert_eq!(summary.hidden_count(), 2);
    }

    #[test]
    fn small_carts_preview_in_full() {
        let summary = CartSummary::from_items(vec![item(1, 1, "$2.00", "$2.00")]);

        assert_eq!(summary.preview_items().len(), 1);
        assert_eq!(summary.hidden_count(), 0);
    }
}
