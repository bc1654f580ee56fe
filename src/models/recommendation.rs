use serde::{Deserialize, Serialize};

use super::{CatalogItem, MediaKind};

/// Display-ready card record produced by the normalizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayItem {
    pub id: u64,
    pub title: String,
    /// Four-digit year or `N/A`
    pub year: String,
    pub genre_label: String,
    /// Score with one decimal place
    pub rating_text: String,
    /// Empty when the item has no artwork
    pub image_url: String,
    pub media_kind: MediaKind,
}

/// The three named suggestion groups for a subject title
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationBuckets<T = CatalogItem> {
    pub from_cast: Vec<T>,
    pub from_genre: Vec<T>,
    pub others: Vec<T>,
}

impl<T> Default for RecommendationBuckets<T> {
    fn default() -> Self {
        Self {
            from_cast: Vec::new(),
            from_genre: Vec::new(),
            others: Vec::new(),
        }
    }
}

impl<T> RecommendationBuckets<T> {
    /// No suggestions at all; a valid outcome, not an error
    pub fn is_empty(&self) -> bool {
        self.from_cast.is_empty() && self.from_genre.is_empty() && self.others.is_empty()
    }

    pub fn total(&self) -> usize {
        self.from_cast.len() + self.from_genre.len() + self.others.len()
    }

    /// Applies `f` to every item, keeping bucket membership and order
    pub fn map<U>(&self, f: impl Fn(&T) -> U) -> RecommendationBuckets<U> {
        RecommendationBuckets {
            from_cast: self.from_cast.iter().map(&f).collect(),
            from_genre: self.from_genre.iter().map(&f).collect(),
            others: self.others.iter().map(&f).collect(),
        }
    }
}
