//! The "modern" recency rule shared by the aggregator and every catalog listing.

use crate::models::CatalogItem;

/// Earliest release or air year a suggestion may have
pub const MODERN_SINCE_YEAR: i32 = 1990;

/// Year prefix of a `YYYY-MM-DD` date, if it parses
pub fn year_of(date: &str) -> Option<i32> {
    date.split('-').next()?.trim().parse().ok()
}

/// `true` when the date's year is at least [`MODERN_SINCE_YEAR`].
///
/// Missing, empty or unparseable dates are not modern.
pub fn is_modern(date: Option<&str>) -> bool {
    date.and_then(year_of)
        .is_some_and(|year| year >= MODERN_SINCE_YEAR)
}

pub fn is_modern_item(item: &CatalogItem) -> bool {
    is_modern(item.date.as_deref())
}

/// Keeps only modern items, preserving order
pub fn retain_modern(items: Vec<CatalogItem>) -> Vec<CatalogItem> {
    items.into_iter().filter(is_modern_item).collect()
}
