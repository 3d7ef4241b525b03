//! Test utilities for fintwin-core
//!
//! This module provides a mock advisor HTTP server speaking both the Gemini
//! `generateContent` API and the OpenAI chat completions API, for backend
//! tests and offline development.

use axum::{
    extract::{Json, Path},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::sync::oneshot;

use crate::advisor::canned_reply;

/// Mock advisor server for testing and development
pub struct MockAdvisorServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockAdvisorServer {
    /// Start the mock server on an available port
    pub async fn start() -> Self {
        let app = Router::new()
            .route("/v1beta/models", get(handle_gemini_models))
            .route("/v1beta/models/:model_action", post(handle_generate_content))
            .route("/v1/models", get(handle_openai_models))
            .route("/v1/chat/completions", post(handle_chat_completions));

        Self::serve(app).await
    }

    /// Start a server that answers every request with 503
    pub async fn start_failing() -> Self {
        let app = Router::new().fallback(handle_unavailable);
        Self::serve(app).await
    }

    async fn serve(app: Router) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockAdvisorServer {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn handle_unavailable() -> (StatusCode, &'static str) {
    (StatusCode::SERVICE_UNAVAILABLE, "model overloaded")
}

/// Gemini model list (health check)
async fn handle_gemini_models() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "models": [{"name": "models/gemini-3-flash-preview"}]
    }))
}

/// Gemini generateContent endpoint (`{model}:generateContent`)
async fn handle_generate_content(
    Path(model_action): Path<String>,
    Json(request): Json<GenerateContentRequest>,
) -> Result<Json<GenerateContentResponse>, StatusCode> {
    if !model_action.ends_with(":generateContent") {
        return Err(StatusCode::NOT_FOUND);
    }

    let prompt = request
        .contents
        .iter()
        .rev()
        .find(|c| c.role == "user")
        .and_then(|c| c.parts.first())
        .map(|p| p.text.as_str())
        .unwrap_or_default();

    Ok(Json(GenerateContentResponse {
        candidates: vec![Candidate {
            content: Content {
                role: "model".to_string(),
                parts: vec![Part {
                    text: canned_reply(prompt),
                }],
            },
        }],
    }))
}

/// OpenAI model list (health check)
async fn handle_openai_models() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "object": "list",
        "data": [{"id": "gpt-4o-mini", "object": "model"}]
    }))
}

/// OpenAI chat completions endpoint
async fn handle_chat_completions(
    Json(request): Json<ChatCompletionRequest>,
) -> Json<serde_json::Value> {
    let prompt = request
        .messages
        .iter()
        .rev()
        .find(|m| m.role == "user")
        .map(|m| m.content.as_str())
        .unwrap_or_default();

    Json(serde_json::json!({
        "id": "chatcmpl-mock",
        "object": "chat.completion",
        "model": request.model,
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": canned_reply(prompt)},
            "finish_reason": "stop"
        }]
    }))
}

#[derive(Debug, Deserialize)]
struct GenerateContentRequest {
    #[serde(default)]
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct GenerateContentResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Serialize)]
struct Candidate {
    content: Content,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_server_gemini_health() {
        let server = MockAdvisorServer::start().await;
        let resp = reqwest::get(format!("{}/v1beta/models", server.url()))
            .await
            .unwrap();
        assert!(resp.status().is_success());
    }

    #[tokio::test]
    async fn test_mock_server_generate_content() {
        let server = MockAdvisorServer::start().await;
        let client = reqwest::Client::new();
        let body: serde_json::Value = client
            .post(format!(
                "{}/v1beta/models/gemini-3-flash-preview:generateContent",
                server.url()
            ))
            .json(&serde_json::json!({
                "contents": [{"role": "user", "parts": [{"text": "How am I doing on my Laptop goal?"}]}]
            }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        let text = body["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .unwrap();
        assert!(text.contains("goal"));
    }

    #[tokio::test]
    async fn test_mock_server_unknown_action() {
        let server = MockAdvisorServer::start().await;
        let resp = reqwest::Client::new()
            .post(format!("{}/v1beta/models/gemini:countTokens", server.url()))
            .json(&serde_json::json!({"contents": []}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_failing_server_returns_503() {
        let server = MockAdvisorServer::start_failing().await;
        let resp = reqwest::get(format!("{}/v1/models", server.url()))
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::SERVICE_UNAVAILABLE);
    }
}
