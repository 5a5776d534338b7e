//! End-to-end tests over the HTTP router with the offline providers
//! (dummy LLM, hashing embedder) and a temp-dir graph file.

use std::path::Path;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use bookgraph_rag::config::Config;
use bookgraph_rag::http::build_router;
use bookgraph_rag::state::AppState;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

const FIXTURE: &str = r#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:bs="http://example.org/bookstore#">
  <bs:Book rdf:about="http://example.org/bookstore#B1">
    <bs:hasTitle>Dune</bs:hasTitle>
    <bs:hasAuthor>Frank Herbert</bs:hasAuthor>
    <bs:hasTheme>Science Fiction</bs:hasTheme>
    <bs:suitableForLevel>Advanced</bs:suitableForLevel>
  </bs:Book>
  <bs:Book rdf:about="http://example.org/bookstore#B2">
    <bs:hasTitle>The Hobbit</bs:hasTitle>
    <bs:hasAuthor>J.R.R. Tolkien</bs:hasAuthor>
    <bs:hasTheme>Fantasy</bs:hasTheme>
  </bs:Book>
</rdf:RDF>
"#;

/// Mismatched end tag.
const BROKEN: &str =
    r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"><rdf:Description></rdf:RDF>"#;

struct Fixture {
    _dir: TempDir,
    path: std::path::PathBuf,
    state: AppState,
}

async fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("books_data.rdf");
    std::fs::write(&path, FIXTURE).unwrap();
    let state = AppState::init(&Config::offline(&path)).await.unwrap();
    Fixture { _dir: dir, path, state }
}

async fn post_json(state: &AppState, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(state, request).await
}

async fn get(state: &AppState, uri: &str) -> (StatusCode, Value) {
    send(state, Request::get(uri).body(Body::empty()).unwrap()).await
}

async fn send(state: &AppState, request: Request<Body>) -> (StatusCode, Value) {
    let response = build_router(state.clone()).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn ids(results: &Value) -> Vec<&str> {
    results
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["id"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn chat_prompt_carries_retrieved_science_fiction_fact() {
    let f = fixture().await;
    let (status, body) = post_json(
        &f.state,
        "/chat",
        json!({ "message": "What Science Fiction books do you have?" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let response = body["response"].as_str().unwrap();
    // The dummy model echoes the prompt back.
    assert!(response.contains("B1 hasTheme Science Fiction"));
    assert!(response.contains("User question: What Science Fiction books do you have?"));
}

#[tokio::test]
async fn chat_with_book_id_adds_book_details() {
    let f = fixture().await;
    let (status, body) = post_json(
        &f.state,
        "/chat",
        json!({ "message": "Is this for beginners?", "context": "book_details", "bookId": "B1" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let response = body["response"].as_str().unwrap();
    assert!(response.contains("The user is viewing the book 'B1'"));
    assert!(response.contains("- suitableForLevel: Advanced"));
}

#[tokio::test]
async fn chat_without_message_is_bad_request() {
    let f = fixture().await;
    let (status, body) = post_json(&f.state, "/chat", json!({ "context": "index" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
    assert!(body["message"].as_str().unwrap().contains("message required"));
}

#[tokio::test]
async fn malformed_json_bodies_are_bad_request() {
    let f = fixture().await;

    for uri in ["/chat", "/conversation-starters", "/search-books", "/add-book"] {
        let bare = Request::post(uri).body(Body::empty()).unwrap();
        let (status, body) = send(&f.state, bare).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri} without body");
        assert_eq!(body["error"], "bad_request", "{uri} without body");
        assert!(body["message"].as_str().unwrap().contains("Content-Type"), "{uri}");
    }

    let (status, body) = post_json(&f.state, "/chat", json!({ "message": 42 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");

    let garbled = Request::post("/search-books")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"theme\": "))
        .unwrap();
    let (status, body) = send(&f.state, garbled).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn starters_for_known_book_mention_title() {
    let f = fixture().await;
    let (status, body) = post_json(
        &f.state,
        "/conversation-starters",
        json!({ "context": "book_details", "bookId": "B1" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let starters = body["starters"].as_array().unwrap();
    assert_eq!(starters.len(), 3);
    assert!(starters[0].as_str().unwrap().contains("Dune"));
    assert!(starters[1].as_str().unwrap().contains("Frank Herbert"));
}

#[tokio::test]
async fn starters_for_index_ignore_book_id() {
    let f = fixture().await;
    let (_, plain) = post_json(&f.state, "/conversation-starters", json!({})).await;
    let (_, with_book) =
        post_json(&f.state, "/conversation-starters", json!({ "context": "index", "bookId": "B1" }))
            .await;
    assert_eq!(plain, with_book);
    assert_eq!(plain["starters"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn search_books_by_theme_and_author() {
    let f = fixture().await;

    let (_, body) = post_json(&f.state, "/search-books", json!({})).await;
    assert!(body["results"].as_array().unwrap().is_empty());

    let (_, body) =
        post_json(&f.state, "/search-books", json!({ "theme": "Science Fiction" })).await;
    assert_eq!(ids(&body["results"]), vec!["B1"]);
    assert_eq!(body["results"][0]["title"], "Dune");

    let (_, body) =
        post_json(&f.state, "/search-books", json!({ "author": "j.r.r. tolkien" })).await;
    assert_eq!(ids(&body["results"]), vec!["B2"]);
    assert_eq!(body["results"][0]["level"], "Unknown");
}

#[tokio::test]
async fn reload_picks_up_file_changes() {
    let f = fixture().await;
    std::fs::write(&f.path, FIXTURE.replace("Fantasy", "Adventure")).unwrap();

    let (status, body) = post_json(&f.state, "/reload", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");

    let (_, body) = post_json(&f.state, "/search-books", json!({ "theme": "Adventure" })).await;
    assert_eq!(ids(&body["results"]), vec!["B2"]);
}

#[tokio::test]
async fn failed_reload_keeps_previous_index() {
    let f = fixture().await;
    std::fs::write(&f.path, BROKEN).unwrap();

    let (status, body) = post_json(&f.state, "/reload", json!({})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], "error");
    assert!(!body["message"].as_str().unwrap().is_empty());

    let (status, body) = post_json(
        &f.state,
        "/chat",
        json!({ "message": "What Science Fiction books do you have?" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["response"].as_str().unwrap().contains("B1 hasTheme Science Fiction"));

    let (_, body) = post_json(&f.state, "/search-books", json!({ "theme": "Fantasy" })).await;
    assert_eq!(ids(&body["results"]), vec!["B2"]);
}

#[tokio::test]
async fn add_book_is_searchable_immediately() {
    let f = fixture().await;
    let (status, body) = post_json(
        &f.state,
        "/add-book",
        json!({
            "id": "B3",
            "title": "Foundation",
            "author": "Isaac Asimov",
            "theme": "Science Fiction",
            "level": "Intermediate"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");

    let (_, body) =
        post_json(&f.state, "/search-books", json!({ "theme": "Science Fiction" })).await;
    assert_eq!(ids(&body["results"]), vec!["B1", "B3"]);

    let (status, body) = get(&f.state, "/books/B3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["author"], "Isaac Asimov");

    let text = std::fs::read_to_string(Path::new(&f.path)).unwrap();
    assert!(text.contains("Foundation"));
}

#[tokio::test]
async fn add_book_without_id_is_rejected() {
    let f = fixture().await;
    let (status, body) = post_json(&f.state, "/add-book", json!({ "title": "Nameless" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("Book ID is required."));
}

#[tokio::test]
async fn books_listing_and_lookup() {
    let f = fixture().await;

    let (status, body) = get(&f.state, "/books").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec!["B1", "B2"]);

    let (status, body) = get(&f.state, "/books/B9").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn health_reports_counts() {
    let f = fixture().await;
    let (status, body) = get(&f.state, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["books"], 2);
    // 2 type triples + 4 + 3 attribute triples.
    assert_eq!(body["facts"], 9);
    assert_eq!(body["llm"], "dummy");
}

#[tokio::test]
async fn graph_view_and_upload_visualization() {
    let f = fixture().await;

    let (status, body) = get(&f.state, "/graph").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["edges"].as_array().unwrap().len(), 9);
    assert_eq!(body["nodes"][0]["label"], "B1");

    let upload = Request::post("/graph/visualize")
        .header(header::CONTENT_TYPE, "application/rdf+xml")
        .body(Body::from(FIXTURE))
        .unwrap();
    let (status, body) = send(&f.state, upload).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["edges"].as_array().unwrap().len(), 9);

    let broken = Request::post("/graph/visualize").body(Body::from(BROKEN)).unwrap();
    let (status, body) = send(&f.state, broken).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}
