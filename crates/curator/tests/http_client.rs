//! HTTP client against a local axum backend.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use curator::client::{
    AskRequest, AssistantClient, QuickSummaryRequest, RecommendRequest, SearchClient,
    SearchRequest, SynthesisRequest,
};
use curator::config::{SearchConfig, ServiceConfig};
use curator::HttpClient;
use curator_common::{normalize, CuratorError, SynthesisKind, SynthesisSize};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

type Seen = Arc<Mutex<Vec<(String, Value)>>>;

fn record(seen: &Seen, path: &str, body: Value) {
    seen.lock().unwrap().push((path.to_string(), body));
}

async fn spawn_backend(seen: Seen) -> String {
    let app = Router::new()
        .route(
            "/search/articles",
            post(|State(seen): State<Seen>, Json(body): Json<Value>| async move {
                let query = body["query"].as_str().unwrap_or_default().to_string();
                record(&seen, "/search/articles", body);
                match query.as_str() {
                    "vazio" => Ok(Json(json!({"total": 0}))),
                    "quebrado" => Err(StatusCode::BAD_GATEWAY),
                    _ => Ok(Json(json!({"results": [{"title": "A"}, {"title": "B"}]}))),
                }
            }),
        )
        .route(
            "/llm/recommend-results",
            post(|State(seen): State<Seen>, Json(body): Json<Value>| async move {
                record(&seen, "/llm/recommend-results", body);
                Json(json!({"recommendations": [{"local_id": 1, "reason": "ok"}]}))
            }),
        )
        .route(
            "/llm/synthesize",
            post(|State(seen): State<Seen>, Json(body): Json<Value>| async move {
                record(&seen, "/llm/synthesize", body);
                Json(json!({"introducao": "Intro"}))
            }),
        )
        .route(
            "/llm/ask-article",
            post(|State(seen): State<Seen>, Json(body): Json<Value>| async move {
                record(&seen, "/llm/ask-article", body);
                "isto não é json"
            }),
        )
        .route(
            "/llm/quick-summary",
            post(|State(seen): State<Seen>, Json(body): Json<Value>| async move {
                record(&seen, "/llm/quick-summary", body);
                StatusCode::SERVICE_UNAVAILABLE
            }),
        )
        .with_state(seen);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/", addr)
}

async fn client() -> (HttpClient, Seen) {
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let base_url = spawn_backend(seen.clone()).await;
    let client = HttpClient::new(&ServiceConfig {
        base_url,
        timeout_secs: 5,
    });
    (client, seen)
}

#[tokio::test]
async fn search_posts_first_page_and_extracts_results() {
    let (client, seen) = client().await;
    assert!(!client.base_url().ends_with('/'));

    let found = client
        .search(&SearchRequest::first_page("psicomotricidade", &SearchConfig::default()))
        .await
        .unwrap();
    assert_eq!(found.len(), 2);

    let seen = seen.lock().unwrap();
    let (path, body) = &seen[0];
    assert_eq!(path, "/search/articles");
    assert_eq!(body["query"], "psicomotricidade");
    assert_eq!(body["limit"], 20);
    assert_eq!(body["offset"], 0);
    assert_eq!(body["sort_by"], "relevance");
    assert_eq!(
        body["filters"]["sources"],
        json!(["openalex", "pubmed", "crossref", "arxiv"])
    );
}

#[tokio::test]
async fn search_without_results_key_is_empty() {
    let (client, _) = client().await;
    let found = client
        .search(&SearchRequest::first_page("vazio", &SearchConfig::default()))
        .await
        .unwrap();
    assert!(found.is_empty());
}

#[tokio::test]
async fn non_success_status_is_reported() {
    let (client, _) = client().await;
    let err = client
        .search(&SearchRequest::first_page("quebrado", &SearchConfig::default()))
        .await
        .unwrap_err();
    assert!(matches!(err, CuratorError::Status(502)));
    assert!(err.is_transient());

    let article = normalize(&json!({"title": "A"}), 0).to_llm();
    let err = client
        .quick_summary(&QuickSummaryRequest {
            article,
            language: "pt-BR".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CuratorError::Status(503)));
}

#[tokio::test]
async fn invalid_json_is_a_decode_error() {
    let (client, _) = client().await;
    let article = normalize(&json!({"title": "A"}), 0).to_llm();
    let err = client
        .ask(&AskRequest {
            article,
            question: "Qual a amostra?".into(),
            language: "pt-BR".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CuratorError::Decode(_)));
}

#[tokio::test]
async fn assistant_bodies_follow_wire_names() {
    let (client, seen) = client().await;
    let articles = vec![
        normalize(&json!({"title": "A", "year": 2020}), 0).to_llm(),
        normalize(&json!({"title": "B", "year": 2021}), 1).to_llm(),
    ];

    let reply = client
        .recommend(&RecommendRequest {
            instruction: "estudos recentes".into(),
            language: "pt-BR".into(),
            articles: articles.clone(),
        })
        .await
        .unwrap();
    assert_eq!(reply["recommendations"][0]["local_id"], 1);

    let reply = client
        .synthesize(&SynthesisRequest {
            articles,
            synthesis_type: SynthesisKind::ClinicalApplication,
            size: SynthesisSize::Long,
            language: "pt-BR".into(),
        })
        .await
        .unwrap();
    assert_eq!(reply["introducao"], "Intro");

    let seen = seen.lock().unwrap();
    let (path, body) = &seen[0];
    assert_eq!(path, "/llm/recommend-results");
    assert_eq!(body["articles"][1]["local_id"], 2);
    assert!(body["articles"][0].get("abstract").is_some());

    let (path, body) = &seen[1];
    assert_eq!(path, "/llm/synthesize");
    assert_eq!(body["synthesis_type"], "Aplicacao clinica");
    assert_eq!(body["size"], "Longo");
}

#[tokio::test]
async fn unreachable_backend_is_a_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = HttpClient::new(&ServiceConfig {
        base_url: format!("http://{}", addr),
        timeout_secs: 2,
    });
    let err = client
        .search(&SearchRequest::first_page("x", &SearchConfig::default()))
        .await
        .unwrap_err();
    assert!(matches!(err, CuratorError::Network(_)));
}
