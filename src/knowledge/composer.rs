//! Prompt assembly for retrieval-augmented answers.
//!
//! The template carries three placeholders: `{{book_context}}`,
//! `{{context}}` and `{{question}}`. They are filled in a single scan of the
//! template; inserted text is never scanned again, so facts, book details
//! and user questions may contain `{{...}}` verbatim. Unknown markers are
//! copied through unchanged.

use std::fs;
use std::path::Path;

use crate::error::AppError;

use super::index::ScoredFact;
use super::metadata::Attributes;

const BUILTIN_TEMPLATE: &str = include_str!("../../config/prompts/book_qa.txt");

#[derive(Debug, Clone)]
pub struct AnswerComposer {
    template: String,
}

impl Default for AnswerComposer {
    fn default() -> Self {
        Self { template: BUILTIN_TEMPLATE.to_string() }
    }
}

impl AnswerComposer {
    pub fn new(template: impl Into<String>) -> Self {
        Self { template: template.into() }
    }

    /// Use the template at `path`, or the built-in one when `None`.
    pub fn from_path(path: Option<&Path>) -> Result<Self, AppError> {
        match path {
            None => Ok(Self::default()),
            Some(p) => {
                let text = fs::read_to_string(p).map_err(|e| {
                    AppError::Config(format!("cannot read prompt template {}: {e}", p.display()))
                })?;
                for key in ["{{context}}", "{{question}}"] {
                    if !text.contains(key) {
                        return Err(AppError::Config(format!(
                            "prompt template {} lacks {key}",
                            p.display()
                        )));
                    }
                }
                Ok(Self::new(text))
            }
        }
    }

    /// Build the final prompt.
    ///
    /// `hits` keep their retrieval rank, one fact per line. `book` is the
    /// book the user is viewing, when it is known to the metadata table.
    pub fn compose(
        &self,
        question: &str,
        book: Option<(&str, &Attributes)>,
        hits: &[ScoredFact],
    ) -> String {
        let context = hits
            .iter()
            .map(|h| h.document.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        let book_context = book_context(book);
        render(&self.template, |key| match key {
            "book_context" => Some(book_context.as_str()),
            "context" => Some(context.as_str()),
            "question" => Some(question),
            _ => None,
        })
    }
}

/// Replace each `{{key}}` in `template` with `lookup(key)`, left to right.
fn render<'a>(template: &str, lookup: impl Fn(&str) -> Option<&'a str>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];
        match after_open.find("}}") {
            Some(end) => match lookup(&after_open[..end]) {
                Some(value) => {
                    out.push_str(value);
                    rest = &after_open[end + 2..];
                }
                None => {
                    out.push('{');
                    rest = &rest[start + 1..];
                }
            },
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

fn book_context(book: Option<(&str, &Attributes)>) -> String {
    let Some((id, attrs)) = book else {
        return String::new();
    };
    let mut out = format!("\nThe user is viewing the book '{id}'. Its details:\n");
    for (predicate, value) in attrs {
        out.push_str(&format!("- {predicate}: {value}\n"));
    }
    out
}
