//! Structured book lookup over the metadata table.

use serde::Serialize;

use super::metadata::{Attributes, MetadataTable};
use super::{UNKNOWN, predicates};

/// One book as returned by search and listing endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookRecord {
    pub id: String,
    pub title: String,
    pub author: String,
    pub theme: String,
    pub level: String,
}

impl BookRecord {
    pub fn from_attributes(id: &str, attrs: &Attributes) -> Self {
        let field = |key: &str| attrs.get(key).cloned().unwrap_or_else(|| UNKNOWN.to_string());
        Self {
            id: id.to_string(),
            title: attrs.get(predicates::TITLE).cloned().unwrap_or_else(|| id.to_string()),
            author: field(predicates::AUTHOR),
            theme: field(predicates::THEME),
            level: field(predicates::LEVEL),
        }
    }
}

/// Books whose theme and/or author equal the given values, ignoring case.
///
/// Blank criteria are wildcards, but with both blank nothing matches.
pub fn search_books(table: &MetadataTable, theme: &str, author: &str) -> Vec<BookRecord> {
    let theme = theme.trim();
    let author = author.trim();
    if theme.is_empty() && author.is_empty() {
        return Vec::new();
    }

    let matches = |attrs: &Attributes, key: &str, wanted: &str| {
        wanted.is_empty()
            || attrs
                .get(key)
                .is_some_and(|v| v.to_lowercase() == wanted.to_lowercase())
    };

    table
        .iter()
        .filter(|(_, attrs)| {
            matches(attrs, predicates::THEME, theme) && matches(attrs, predicates::AUTHOR, author)
        })
        .map(|(id, attrs)| BookRecord::from_attributes(id, attrs))
        .collect()
}

/// Every subject that looks like a book: typed `Book` or carrying a title.
pub fn list_books(table: &MetadataTable) -> Vec<BookRecord> {
    table
        .iter()
        .filter(|(_, attrs)| {
            attrs.get(predicates::TYPE).is_some_and(|t| t == "Book")
                || attrs.contains_key(predicates::TITLE)
        })
        .map(|(id, attrs)| BookRecord::from_attributes(id, attrs))
        .collect()
}

/// A single book by id, if the table knows the subject.
pub fn find_book(table: &MetadataTable, id: &str) -> Option<BookRecord> {
    table.get(id).map(|attrs| BookRecord::from_attributes(id, attrs))
}
