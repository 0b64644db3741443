//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use chrono::NaiveDateTime;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Returns the content hash for main.css.
///
/// The hash is computed at build time from the CSS file content.
///
/// Usage in templates: `{{ ""|css_hash }}`
#[askama::filter_fn]
pub fn css_hash(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<&'static str> {
    Ok(env!("CSS_HASH"))
}

/// Formats a backend timestamp as a short date, e.g. "Mar 5, 2026".
///
/// Usage in templates: `{{ order.timestamp|short_date }}`
#[askama::filter_fn]
pub fn short_date(value: &NaiveDateTime, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(value.format("%b %-d, %Y").to_string())
}

/// Picks the storefront emoji for a department name.
///
/// Unknown departments get a generic package.
///
/// Usage in templates: `{{ dept.name|dept_emoji }}`
#[askama::filter_fn]
pub fn dept_emoji(name: impl Display, _env: &dyn askama::Values) -> askama::Result<&'static str> {
    Ok(match name.to_string().as_str() {
        "Dairy" => "\u{1f95b}",
        "Meats" => "\u{1f969}",
        "Fruits & Vegs" => "\u{1f957}",
        "Bakery" => "\u{1f950}",
        "Frozen Foods" => "\u{1f9ca}",
        _ => "\u{1f4e6}",
    })
}
