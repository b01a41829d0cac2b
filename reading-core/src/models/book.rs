use serde::{Deserialize, Serialize};

const COVER_BASE_URL: &str = "https://covers.openlibrary.org/b/id";

/// Catalog metadata for a book picked from search results.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Book {
    pub title: String,
    pub author: String,
    pub year: String,
    /// Open Library cover id. Empty when the catalog has no cover.
    pub cover_id: String,
}

impl Book {
    /// Large cover image URL, if the book has a cover.
    pub fn cover_url(&self) -> Option<String> {
        if self.cover_id.is_empty() {
            None
        } else {
            Some(format!("{COVER_BASE_URL}/{}-L.jpg", self.cover_id))
        }
    }
}
