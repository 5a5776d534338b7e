//! RDF graph file I/O backed by oxigraph's parsers and serializers.
//!
//! The graph is kept as the parser's quad sequence so that downstream folds
//! see triples in file order. Only the default graph matters here; RDF/XML
//! has nothing else.

use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use oxigraph::io::{RdfFormat, RdfParser, RdfSerializer};
use oxigraph::model::{GraphName, Literal, NamedNode, Quad, Term};
use serde::Serialize;
use tracing::debug;

use crate::error::AppError;

use super::facts::{self, FactDocument};
use super::predicates;

const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

/// Parsed graph contents, in parser order.
#[derive(Debug, Clone, Default)]
pub struct RdfGraph {
    quads: Vec<Quad>,
    format: Option<RdfFormat>,
}

/// Raw term strings of one triple: IRIs in full, literals as their value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTriple {
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

impl RdfGraph {
    /// Parse the file at `path`. The format follows the file extension.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let format = format_for_path(path);
        let file = File::open(path)
            .map_err(|e| AppError::Graph(format!("cannot open {}: {e}", path.display())))?;
        let base = base_iri(path);
        let graph = Self::parse(BufReader::new(file), format, base.as_deref())
            .map_err(|e| AppError::Graph(format!("{}: {e}", path.display())))?;
        debug!(path = %path.display(), triples = graph.len(), "graph parsed");
        Ok(graph)
    }

    /// Parse `reader` as `format`. Relative IRIs resolve against `base_iri`
    /// when one is given.
    pub fn parse(
        reader: impl Read,
        format: RdfFormat,
        base_iri: Option<&str>,
    ) -> Result<Self, String> {
        let mut parser = RdfParser::from_format(format);
        if let Some(base) = base_iri {
            parser = parser.with_base_iri(base).map_err(|e| format!("invalid base IRI: {e}"))?;
        }

        let mut quads = Vec::new();
        for quad in parser.for_reader(reader) {
            quads.push(quad.map_err(|e| e.to_string())?);
        }
        Ok(Self { quads, format: Some(format) })
    }

    pub fn len(&self) -> usize {
        self.quads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }

    /// Triples as raw term strings, in parser order.
    pub fn triples(&self) -> impl Iterator<Item = RawTriple> + '_ {
        self.quads.iter().map(|q| RawTriple {
            subject: subject_text(q),
            predicate: q.predicate.as_str().to_string(),
            object: term_text(&q.object),
        })
    }

    /// Flatten every triple into a fact document.
    pub fn fact_documents(&self) -> Vec<FactDocument> {
        self.triples()
            .map(|t| facts::flatten(&t.subject, &t.predicate, &t.object))
            .collect()
    }

    /// Insert or update a book resource.
    ///
    /// Title, author and level replace any existing value; theme is added
    /// alongside existing themes. Blank fields are skipped.
    pub fn upsert_book(&mut self, namespace: &str, book: &NewBook) -> Result<String, AppError> {
        let id: String = book.id.chars().filter(|c| !c.is_whitespace()).collect();
        if id.is_empty() {
            return Err(AppError::BadRequest("Book ID is required.".into()));
        }

        let book_iri = format!("{namespace}{id}");
        let subject = named_node(&book_iri)?;
        let type_iri = format!("{namespace}Book");

        let has_type = self.quads.iter().any(|q| {
            subject_text(q) == book_iri
                && q.predicate.as_str() == RDF_TYPE
                && term_text(&q.object) == type_iri
        });
        if !has_type {
            self.push(&subject, RDF_TYPE, Term::from(named_node(&type_iri)?))?;
        }

        let replacing = [
            (predicates::TITLE, &book.title),
            (predicates::AUTHOR, &book.author),
            (predicates::LEVEL, &book.level),
        ];
        for (predicate, value) in replacing {
            if let Some(value) = non_blank(value) {
                let predicate_iri = format!("{namespace}{predicate}");
                self.quads
                    .retain(|q| !(subject_text(q) == book_iri && q.predicate.as_str() == predicate_iri));
                self.push(&subject, &predicate_iri, Term::from(Literal::new_simple_literal(value)))?;
            }
        }

        if let Some(theme) = non_blank(&book.theme) {
            let predicate_iri = format!("{namespace}{}", predicates::THEME);
            self.push(&subject, &predicate_iri, Term::from(Literal::new_simple_literal(theme)))?;
        }

        Ok(id)
    }

    fn push(&mut self, subject: &NamedNode, predicate: &str, object: Term) -> Result<(), AppError> {
        self.quads.push(Quad::new(
            subject.clone(),
            named_node(predicate)?,
            object,
            GraphName::DefaultGraph,
        ));
        Ok(())
    }

    /// Serialize in the format the graph was read from (RDF/XML by default).
    pub fn serialize(&self) -> Result<Vec<u8>, AppError> {
        let format = self.format.unwrap_or(RdfFormat::RdfXml);
        let mut serializer = RdfSerializer::from_format(format).for_writer(Vec::new());
        for quad in &self.quads {
            serializer
                .serialize_quad(quad)
                .map_err(|e| AppError::Graph(format!("serialization failed: {e}")))?;
        }
        serializer
            .finish()
            .map_err(|e| AppError::Graph(format!("serialization failed: {e}")))
    }

    /// Write the graph to `path` via a sibling temp file and rename, so a
    /// failed write never leaves a truncated graph behind.
    pub fn save(&self, path: &Path) -> Result<(), AppError> {
        let bytes = self.serialize()?;
        let tmp = tmp_path(path);
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, path)?;
        debug!(path = %path.display(), triples = self.len(), "graph written");
        Ok(())
    }

    /// Node/edge view for graph visualizers (vis.js shape).
    pub fn visualize(&self) -> GraphView {
        let mut view = GraphView::default();
        let mut seen = std::collections::HashSet::new();
        for t in self.triples() {
            if seen.insert(t.subject.clone()) {
                view.nodes.push(GraphNode::new(&t.subject, SUBJECT_COLOR));
            }
            if seen.insert(t.object.clone()) {
                view.nodes.push(GraphNode::new(&t.object, OBJECT_COLOR));
            }
            view.edges.push(GraphEdge {
                label: facts::local_name(&t.predicate).to_string(),
                from: t.subject,
                to: t.object,
                arrows: "to",
            });
        }
        view
    }
}

/// Fields accepted by `/add-book`.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct NewBook {
    #[serde(default)]
    pub id: String,
    pub title: Option<String>,
    pub author: Option<String>,
    pub theme: Option<String>,
    pub level: Option<String>,
}

const SUBJECT_COLOR: &str = "#97c2fc";
const OBJECT_COLOR: &str = "#ffff00";

#[derive(Debug, Default, Serialize)]
pub struct GraphView {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

#[derive(Debug, Serialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub color: &'static str,
}

impl GraphNode {
    fn new(id: &str, color: &'static str) -> Self {
        let label = match id.rfind('#') {
            Some(pos) => id[pos + 1..].to_string(),
            None => id.to_string(),
        };
        Self { id: id.to_string(), label, color }
    }
}

#[derive(Debug, Serialize)]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
    pub label: String,
    pub arrows: &'static str,
}

/// Pick a parser format from the file extension, defaulting to RDF/XML.
pub fn format_for_path(path: &Path) -> RdfFormat {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "rdf" | "xml" | "owl" | "" => RdfFormat::RdfXml,
        other => RdfFormat::from_extension(other).unwrap_or(RdfFormat::RdfXml),
    }
}

fn base_iri(path: &Path) -> Option<String> {
    let absolute = path.canonicalize().ok()?;
    let text = absolute.to_str()?;
    if text.contains(' ') {
        return None;
    }
    Some(format!("file://{text}"))
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn named_node(iri: &str) -> Result<NamedNode, AppError> {
    NamedNode::new(iri).map_err(|e| AppError::BadRequest(format!("invalid IRI '{iri}': {e}")))
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn subject_text(quad: &Quad) -> String {
    term_text(&Term::from(quad.subject.clone()))
}

fn term_text(term: &Term) -> String {
    match term {
        Term::NamedNode(n) => n.as_str().to_string(),
        Term::BlankNode(b) => b.as_str().to_string(),
        Term::Literal(l) => l.value().to_string(),
        #[allow(unreachable_patterns)]
        other => other.to_string(),
    }
}
