//! Integration test: tool endpoints against mocked upstreams

use axum::body::Body;
use axum::http::{Request, StatusCode};
use research_assistant::{create_router, db::ToolCallLog, AppState, Config};
use serde_json::{json, Value};
use std::time::Duration;
use tower::ServiceExt;

const GEMINI_PATH: &str = "/models/gemini-2.0-flash:generateContent";

fn test_config() -> Config {
    let mut config = Config::default();
    config.retry.backoff_ms = 10;
    config.search.timeout_secs = 2;
    config.arxiv.timeout_secs = 2;
    config.llm.timeout_secs = 2;
    config
}

fn test_app(config: Config) -> axum::Router {
    let state = AppState::from_config(config, ToolCallLog::disabled())
        .unwrap()
        .with_retry_backoff(Duration::from_millis(10));
    create_router(state)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app(test_config());
    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(body_json(response).await, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_ask_ai_missing_question_skips_upstream() {
    let mut gemini = mockito::Server::new_async().await;
    let mock = gemini
        .mock("POST", GEMINI_PATH)
        .expect(0)
        .create_async()
        .await;

    let mut config = test_config();
    config.llm.gemini_api_key = Some("key".to_string());
    config.llm.gemini_base_url = gemini.url();

    let app = test_app(config);
    let response = app
        .oneshot(post_json("/tools/ask_ai", json!({"question": "", "context": "x"})))
        .await
        .unwrap();

    assert_eq!(body_json(response).await, json!({"error": "Missing question."}));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_ask_ai_missing_context() {
    let app = test_app(test_config());
    let response = app
        .oneshot(post_json("/tools/ask_ai", json!({"question": "What is it?"})))
        .await
        .unwrap();
    assert_eq!(body_json(response).await, json!({"error": "Missing context."}));
}

#[tokio::test]
async fn test_ask_ai_without_key() {
    let app = test_app(test_config());
    let response = app
        .oneshot(post_json("/tools/ask_ai", json!({"question": "q", "context": "c"})))
        .await
        .unwrap();
    assert_eq!(
        body_json(response).await,
        json!({"error": "AI assistant is not configured. Please add GEMINI_API_KEY."})
    );
}

#[tokio::test]
async fn test_ask_ai_null_question_counts_as_missing() {
    let app = test_app(test_config());
    let response = app
        .oneshot(post_json("/tools/ask_ai", json!({"question": null, "context": "c"})))
        .await
        .unwrap();
    assert_eq!(body_json(response).await, json!({"error": "Missing question."}));
}

#[tokio::test]
async fn test_ask_ai_malformed_body_is_json_error() {
    let app = test_app(test_config());
    let request = Request::builder()
        .method("POST")
        .uri("/tools/ask_ai")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(body_json(response).await, json!({"error": "Invalid request body."}));
}

#[tokio::test]
async fn test_ask_ai_missing_content_type_is_json_error() {
    let app = test_app(test_config());
    let request = Request::builder()
        .method("POST")
        .uri("/tools/ask_ai")
        .body(Body::from(r#"{"question":"q","context":"c"}"#))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(body_json(response).await, json!({"error": "Invalid request body."}));
}

#[tokio::test]
async fn test_ask_ai_skips_empty_text_field() {
    let mut gemini = mockito::Server::new_async().await;
    gemini
        .mock("POST", GEMINI_PATH)
        .with_status(200)
        .with_body(r#"{"text":"","candidates":[{"content":{"parts":[{"text":"real answer"}]}}]}"#)
        .create_async()
        .await;

    let mut config = test_config();
    config.llm.gemini_api_key = Some("key".to_string());
    config.llm.gemini_base_url = gemini.url();

    let app = test_app(config);
    let response = app
        .oneshot(post_json("/tools/ask_ai", json!({"question": "q", "context": "c"})))
        .await
        .unwrap();
    assert_eq!(body_json(response).await, json!({"answer": "real answer"}));
}

#[tokio::test]
async fn test_ask_ai_answers() {
    let mut gemini = mockito::Server::new_async().await;
    let mock = gemini
        .mock("POST", GEMINI_PATH)
        .match_header("x-goog-api-key", "key")
        .match_body(mockito::Matcher::Regex("Question:\\\\nWhat is Rust\\?".to_string()))
        .with_status(200)
        .with_body(r#"{"candidates":[{"content":{"parts":[{"text":"A language."}]}}]}"#)
        .expect(1)
        .create_async()
        .await;

    let mut config = test_config();
    config.llm.gemini_api_key = Some("key".to_string());
    config.llm.gemini_base_url = gemini.url();

    let app = test_app(config);
    let response = app
        .oneshot(post_json(
            "/tools/ask_ai",
            json!({"question": "  What is Rust?  ", "context": "Rust is a language."}),
        ))
        .await
        .unwrap();

    assert_eq!(body_json(response).await, json!({"answer": "A language."}));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_ask_ai_unparseable_response_is_not_retried() {
    let mut gemini = mockito::Server::new_async().await;
    let mock = gemini
        .mock("POST", GEMINI_PATH)
        .with_status(200)
        .with_body(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#)
        .expect(1)
        .create_async()
        .await;

    let mut config = test_config();
    config.llm.gemini_api_key = Some("key".to_string());
    config.llm.gemini_base_url = gemini.url();

    let app = test_app(config);
    let response = app
        .oneshot(post_json("/tools/ask_ai", json!({"question": "q", "context": "c"})))
        .await
        .unwrap();

    assert_eq!(
        body_json(response).await,
        json!({"error": "AI assistant is temporarily unavailable. Please try again later."})
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn test_ask_ai_network_failure() {
    let mut config = test_config();
    config.llm.gemini_api_key = Some("key".to_string());
    // Nothing listens on port 1
    config.llm.gemini_base_url = "http://127.0.0.1:1".to_string();

    let app = test_app(config);
    let response = app
        .oneshot(post_json("/tools/ask_ai", json!({"question": "q", "context": "c"})))
        .await
        .unwrap();

    assert_eq!(
        body_json(response).await,
        json!({"error": "AI assistant temporarily unavailable (network). Please try again."})
    );
}

#[tokio::test]
async fn test_search_web_without_key() {
    let app = test_app(test_config());
    let response = app.oneshot(get("/tools/search_web?query=rust")).await.unwrap();
    assert_eq!(
        body_json(response).await,
        json!({"error": "TAVILY_API_KEY missing in .env"})
    );
}

#[tokio::test]
async fn test_search_web_concurrent_requests_share_one_upstream_call() {
    let mut tavily = mockito::Server::new_async().await;
    let mock = tavily
        .mock("POST", "/search")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"results":[{"title":"Rust","content":"Fast and safe","url":"https://www.rust-lang.org/learn"}]}"#,
        )
        .expect(1)
        .create_async()
        .await;

    let mut config = test_config();
    config.search.tavily_api_key = Some("key".to_string());
    config.search.tavily_base_url = tavily.url();

    let app = test_app(config);
    let (first, second) = tokio::join!(
        app.clone().oneshot(get("/tools/search_web?query=rust%20lang")),
        app.clone().oneshot(get("/tools/search_web?query=rust%20lang")),
    );

    let first = body_json(first.unwrap()).await;
    let second = body_json(second.unwrap()).await;

    mock.assert_async().await;
    assert_eq!(first["results"], second["results"]);
    assert_eq!(first["results"][0]["source"], "www.rust-lang.org");
    assert_eq!(first["results"][0]["type"], "web");

    let cached: Vec<bool> = [&first, &second]
        .iter()
        .map(|body| body["cached"].as_bool().unwrap())
        .collect();
    assert_eq!(cached.iter().filter(|c| **c).count(), 1);
}

#[tokio::test]
async fn test_search_web_failures_are_not_cached() {
    let mut tavily = mockito::Server::new_async().await;
    let mock = tavily
        .mock("POST", "/search")
        .with_status(500)
        .with_body("internal error with secret detail")
        .expect(2)
        .create_async()
        .await;

    let mut config = test_config();
    config.search.tavily_api_key = Some("key".to_string());
    config.search.tavily_base_url = tavily.url();

    let app = test_app(config);
    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(get("/tools/search_web?query=rust"))
            .await
            .unwrap();
        assert_eq!(
            body_json(response).await,
            json!({"error": "Web search is temporarily unavailable. Please try again later."})
        );
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn test_search_web_missing_query() {
    let mut config = test_config();
    config.search.tavily_api_key = Some("key".to_string());

    let app = test_app(config);
    let response = app.oneshot(get("/tools/search_web")).await.unwrap();
    assert_eq!(body_json(response).await, json!({"error": "Missing query."}));
}

const ARXIV_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title type="html">ArXiv Query</title>
  <entry>
    <id>http://arxiv.org/abs/1706.03762v7</id>
    <published>2017-06-12T17:57:34Z</published>
    <title>Attention Is All You Need</title>
    <summary>The dominant sequence transduction models...</summary>
    <author><name>Ashish Vaswani</name></author>
    <author><name>Noam Shazeer</name></author>
    <link href="http://arxiv.org/abs/1706.03762v7" rel="alternate" type="text/html"/>
  </entry>
</feed>"#;

#[tokio::test]
async fn test_search_arxiv_uses_fallback_mirror() {
    let mut primary = mockito::Server::new_async().await;
    let mut secondary = mockito::Server::new_async().await;

    let down = primary
        .mock("GET", "/api/query")
        .match_query(mockito::Matcher::Any)
        .with_status(502)
        .expect(1)
        .create_async()
        .await;
    let up = secondary
        .mock("GET", "/api/query")
        .match_query(mockito::Matcher::AllOf(vec![
            mockito::Matcher::UrlEncoded("search_query".into(), "all:attention".into()),
            mockito::Matcher::UrlEncoded("max_results".into(), "10".into()),
        ]))
        .with_status(200)
        .with_body(ARXIV_FEED)
        .expect(1)
        .create_async()
        .await;

    let mut config = test_config();
    config.arxiv.endpoints = vec![
        format!("{}/api/query", primary.url()),
        format!("{}/api/query", secondary.url()),
    ];

    let app = test_app(config);
    let response = app
        .oneshot(get("/tools/search_arxiv?query=attention"))
        .await
        .unwrap();
    let body = body_json(response).await;

    down.assert_async().await;
    up.assert_async().await;

    let paper = &body["results"][0];
    assert_eq!(paper["title"], "Attention Is All You Need");
    assert_eq!(paper["url"], "http://arxiv.org/abs/1706.03762v7");
    assert_eq!(paper["source"], "arXiv");
    assert_eq!(paper["date"], "2017-06-12T17:57:34Z");
    assert_eq!(paper["authors"], json!(["Ashish Vaswani", "Noam Shazeer"]));
    assert_eq!(paper["citation"], "Ashish Vaswani, Noam Shazeer (2017-06-12).");
    assert!(body.get("cached").is_none());
}

#[tokio::test]
async fn test_search_arxiv_all_mirrors_unreachable() {
    let mut config = test_config();
    config.arxiv.endpoints = vec![
        "http://127.0.0.1:1/api/query".to_string(),
        "http://127.0.0.1:1/api/query".to_string(),
    ];

    let app = test_app(config);
    let response = app
        .oneshot(get("/tools/search_arxiv?query=attention"))
        .await
        .unwrap();

    assert_eq!(
        body_json(response).await,
        json!({"error": "arXiv search temporarily unavailable (network). Please try again."})
    );
}
