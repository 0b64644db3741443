//! Order confirmation codes.

use core::fmt;

use serde::{Deserialize, Serialize};

/// The opaque unique code the backend assigns to a completed order.
///
/// The full code appears in URLs and API paths; receipts and order history
/// show the [`short`](Self::short) form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderCode(String);

impl OrderCode {
    /// Number of characters shown in the display form.
    const SHORT_LEN: usize = 8;

    /// Wrap a code received from the backend.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// The full code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The display form: the first eight characters, uppercased.
    #[must_use]
    pub fn short(&self) -> String {
        self.0
            .chars()
            .take(Self::SHORT_LEN)
            .collect::<String>()
            .to_uppercase()
    }
}

impl fmt::Display for OrderCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for OrderCode {
    fn from(code: String) -> Self {
        Self(code)
    }
}

impl AsRef<str> for OrderCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_short_form() {
        let code = OrderCode::new("a3f8c2d1-77e4-4b09-9d35-0c612f6b1a55");
        assert_eq!(code.short(), "A3F8C2D1");
    }

    #[test]
    fn test_short_form_of_short_code() {
        assert_eq!(OrderCode::new("ab12").short(), "AB12");
    }

    #[test]
    fn test_serde_transparent() {
        let code = OrderCode::new("deadbeef");
        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, "\"deadbeef\"");

        let parsed: OrderCode = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, code);
    }
}
