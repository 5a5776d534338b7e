//! Suggested opening questions for the chat widget.

use super::metadata::MetadataTable;
use super::{UNKNOWN, predicates};

/// Viewing context sent by a book's detail page.
pub const BOOK_DETAILS: &str = "book_details";

const DISCOVERY: [&str; 3] = [
    "Tell me about the books",
    "What genres are available?",
    "Recommend a book for me",
];

const UNKNOWN_BOOK: [&str; 3] = [
    "Tell me more about this book",
    "Who is the author?",
    "What genre is this book?",
];

/// Up to three suggestions for the given page context and book.
pub fn conversation_starters(
    context: &str,
    book_id: Option<&str>,
    table: &MetadataTable,
) -> Vec<String> {
    let book_id = book_id.filter(|id| !id.is_empty());
    match book_id {
        Some(id) if context == BOOK_DETAILS => match table.get(id) {
            Some(attrs) => {
                let title = attrs.get(predicates::TITLE).map_or(id, String::as_str);
                let author = attrs.get(predicates::AUTHOR).map_or(UNKNOWN, String::as_str);
                let theme = attrs.get(predicates::THEME).map_or(UNKNOWN, String::as_str);
                vec![
                    format!("Tell me more about \"{title}\""),
                    format!("What other books by {author} do you have?"),
                    format!("Can you recommend similar {theme} books?"),
                ]
            }
            None => UNKNOWN_BOOK.iter().map(|s| s.to_string()).collect(),
        },
        _ => DISCOVERY.iter().map(|s| s.to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> MetadataTable {
        let mut t = MetadataTable::new();
        t.insert("B1", "hasTitle", "Dune");
        t.insert("B1", "hasAuthor", "Frank Herbert");
        t.insert("B1", "hasTheme", "Science Fiction");
        t.insert("B2", "hasAuthor", "Jane Austen");
        t
    }

    #[test]
    fn known_book_interpolates_metadata() {
        let s = conversation_starters(BOOK_DETAILS, Some("B1"), &table());
        assert_eq!(s.len(), 3);
        assert!(s[0].contains("Dune"));
        assert!(s[1].contains("Frank Herbert"));
        assert!(s[2].contains("Science Fiction"));
    }

    #[test]
    fn missing_fields_use_defaults() {
        let s = conversation_starters(BOOK_DETAILS, Some("B2"), &table());
        assert!(s[0].contains("B2"));
        assert!(s[2].contains(UNKNOWN));
    }

    #[test]
    fn unknown_book_gets_generic_prompts() {
        let s = conversation_starters(BOOK_DETAILS, Some("B9"), &table());
        assert_eq!(s, UNKNOWN_BOOK.map(String::from).to_vec());
    }

    #[test]
    fn index_context_ignores_book_id() {
        let t = table();
        let expected = DISCOVERY.map(String::from).to_vec();
        assert_eq!(conversation_starters("index", None, &t), expected);
        assert_eq!(conversation_starters("index", Some("B1"), &t), expected);
        assert_eq!(conversation_starters("search", Some("B9"), &t), expected);
    }

    #[test]
    fn book_details_without_id_is_discovery() {
        let s = conversation_starters(BOOK_DETAILS, None, &table());
        assert_eq!(s, DISCOVERY.map(String::from).to_vec());
    }
}
