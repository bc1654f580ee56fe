//! Maps resolved catalog items onto the card record the presentation layer renders.

use crate::models::{CatalogItem, DisplayItem, RecommendationBuckets};

pub const IMAGE_HOST: &str = "https://image.tmdb.org/t/p";
pub const IMAGE_WIDTH: &str = "w500";

const UNTITLED: &str = "Untitled";
const NO_YEAR: &str = "N/A";
const NO_GENRE: &str = "Unknown";

/// Builds the display record. Every field has a fallback, so this cannot fail.
pub fn normalize(item: &CatalogItem) -> DisplayItem {
    DisplayItem {
        id: item.id,
        title: item.title.clone().unwrap_or_else(|| UNTITLED.to_string()),
        year: display_year(item.date.as_deref()),
        genre_label: genre_label(item),
        rating_text: format!("{:.1}", item.vote_average.unwrap_or(0.0)),
        image_url: image_url(item),
        media_kind: item.kind,
    }
}

pub fn normalize_all(items: &[CatalogItem]) -> Vec<DisplayItem> {
    items.iter().map(normalize).collect()
}

pub fn normalize_buckets(buckets: &RecommendationBuckets) -> RecommendationBuckets<DisplayItem> {
    buckets.map(normalize)
}

fn display_year(date: Option<&str>) -> String {
    date.and_then(|d| d.get(..4))
        .filter(|prefix| prefix.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(NO_YEAR)
        .to_string()
}

fn genre_label(item: &CatalogItem) -> String {
    if !item.genres.is_empty() {
        return item
            .genres
            .iter()
            .map(|g| g.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
    }
    if !item.genre_ids.is_empty() {
        return item
            .genre_ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(", ");
    }
    NO_GENRE.to_string()
}

/// Backdrop first, then poster; empty string when neither exists
fn image_url(item: &CatalogItem) -> String {
    item.backdrop_path
        .as_deref()
        .or(item.poster_path.as_deref())
        .map(|path| format!("{}/{}{}", IMAGE_HOST, IMAGE_WIDTH, path))
        .unwrap_or_default()
}
