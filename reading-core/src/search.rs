//! Catalog search contract.
//!
//! The catalog returns loosely populated documents; [`candidates_from_docs`]
//! turns the first few into [`Book`]s the user can pick from.

use std::collections::HashSet;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::Book;

/// At most this many result documents are offered.
pub const MAX_CANDIDATES: usize = 3;

const MISSING_TITLE: &str = "Title Unavailable";
const MISSING_AUTHOR: &str = "Unknown author";
const MISSING_YEAR: &str = "Year Unavailable";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SearchError {
    #[error("a title is required to search")]
    MissingTitle,

    #[error("search request failed: {0}")]
    Http(String),

    #[error("unexpected search response: {0}")]
    Decode(String),
}

/// A validated search: a non-blank title and an optional author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    title: String,
    author: Option<String>,
}

impl SearchQuery {
    /// Blank authors are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::MissingTitle`] for a blank title.
    pub fn new(
        title: &str,
        author: Option<&str>,
    ) -> Result<Self, SearchError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(SearchError::MissingTitle);
        }
        let author = author
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string);
        Ok(Self {
            title: title.to_string(),
            author,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }
}

/// One document of a catalog search response. Other fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SearchDoc {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author_name: Option<Vec<String>>,
    #[serde(default)]
    pub first_publish_year: Option<i32>,
    #[serde(default)]
    pub cover_i: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub docs: Vec<SearchDoc>,
}

impl SearchDoc {
    fn author_list(&self) -> String {
        match &self.author_name {
            Some(names) if !names.is_empty() => names.join(", "),
            _ => MISSING_AUTHOR.to_string(),
        }
    }

    pub fn to_book(&self) -> Book {
        Book {
            title: self
                .title
                .clone()
                .unwrap_or_else(|| MISSING_TITLE.to_string()),
            author: self.author_list(),
            year: self
                .first_publish_year
                .map(|y| y.to_string())
                .unwrap_or_else(|| MISSING_YEAR.to_string()),
            cover_id: self.cover_i.map(|c| c.to_string()).unwrap_or_default(),
        }
    }
}

/// Books from the first [`MAX_CANDIDATES`] documents, dropping repeats of
/// the same title and author list.
pub fn candidates_from_docs(docs: &[SearchDoc]) -> Vec<Book> {
    let mut seen = HashSet::new();
    let books: Vec<Book> = docs
        .iter()
        .take(MAX_CANDIDATES)
        .map(SearchDoc::to_book)
        .filter(|book| seen.insert((book.title.clone(), book.author.clone())))
        .collect();
    debug!(documents = docs.len(), candidates = books.len(), "Built search candidates");
    books
}

/// A book catalog.
#[async_trait]
pub trait BookSearch: Send + Sync {
    /// Up to [`MAX_CANDIDATES`] distinct books. No match is `Ok(vec![])`.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Book>, SearchError>;
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn doc(
        title: &str,
        authors: &[&str],
    ) -> SearchDoc {
        SearchDoc {
            title: Some(title.to_string()),
            author_name: Some(authors.iter().map(|a| a.to_string()).collect()),
            first_publish_year: Some(1965),
            cover_i: Some(11481354),
        }
    }

    // =========================================================================
    // SearchQuery tests
    // =========================================================================

    #[test]
    fn blank_title_is_rejected() {
        assert_eq!(SearchQuery::new("   ", Some("Herbert")), Err(SearchError::MissingTitle));
    }

    #[test]
    fn blank_author_is_dropped() {
        let query = SearchQuery::new(" Dune ", Some("  ")).unwrap();

        assert_eq!(query.title(), "Dune");
        assert_eq!(query.author(), None);
    }

    // =========================================================================
    // candidates_from_docs tests
    // =========================================================================

    #[test]
    fn missing_fields_use_placeholders() {
        let book = SearchDoc::default().to_book();

        assert_eq!(
            book,
            Book {
                title: "Title Unavailable".to_string(),
                author: "Unknown author".to_string(),
                year: "Year Unavailable".to_string(),
                cover_id: String::new(),
            }
        );
    }

    #[test]
    fn authors_are_joined() {
        let book = doc("Good Omens", &["Terry Pratchett", "Neil Gaiman"]).to_book();

        assert_eq!(book.author, "Terry Pratchett, Neil Gaiman");
        assert_eq!(book.cover_id, "11481354");
    }

    #[test]
    fn only_first_three_docs_are_considered() {
        let docs = vec![doc("A", &["x"]), doc("B", &["x"]), doc("C", &["x"]), doc("D", &["x"])];

        let titles: Vec<String> = candidates_from_docs(&docs).into_iter().map(|b| b.title).collect();

        assert_eq!(titles, vec!["A", "B", "C"]);
    }

    #[test]
    fn duplicates_by_title_and_authors_are_dropped() {
        let docs = vec![doc("Dune", &["Frank Herbert"]), doc("Dune", &["Frank Herbert"]), doc("Dune", &["Someone Else"])];

        let books = candidates_from_docs(&docs);

        assert_eq!(books.len(), 2);
        assert_eq!(books[1].author, "Someone Else");
    }

    #[test]
    fn response_ignores_unknown_fields() {
        let json = r#"{"numFound": 1, "docs": [{"title": "Dune", "key": "/works/OL1", "first_publish_year": 1965}]}"#;

        let response: SearchResponse = serde_json::from_str(json).unwrap();

        assert_eq!(response.docs.len(), 1);
        assert_eq!(response.docs[0].to_book().year, "1965");
    }
}
