use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;

use crate::error::ApiError;
use crate::grammar::{Correction, GrammarFixer};

pub struct AppState {
    pub fixer: GrammarFixer,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .route("/api/fix", post(fix))
        .with_state(state)
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "grammar-fixer-api",
    })
}

/// Static service-description document for the root endpoint.
async fn home() -> Json<Value> {
    Json(json!({
        "name": "Grammar Fixer API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "API for fixing grammar using a language model",
        "endpoints": {
            "/api/fix": {
                "method": "POST",
                "description": "Fix grammar in provided text",
                "body": { "text": "string (required)" },
                "response": {
                    "corrections": [{
                        "location": { "start": "int", "end": "int" },
                        "oldText": "string",
                        "newText": "string"
                    }],
                    "originalText": "string"
                }
            }
        }
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FixResponse {
    pub corrections: Vec<Correction>,
    pub original_text: String,
}

async fn fix(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> crate::error::Result<Json<FixResponse>> {
    let Json(data) = payload.map_err(|_| ApiError::MalformedRequest)?;
    let text = extract_text(&data)?;

    info!("fix request for {} bytes of text", text.len());
    let corrections = state.fixer.fix_grammar(text).await?;

    Ok(Json(FixResponse {
        corrections,
        original_text: text.to_string(),
    }))
}

/// Pulls the required `text` field out of a request payload.
///
/// Distinguishes a non-object body from a missing field from a wrong-typed
/// field; a present, string-typed value is returned unchanged with no
/// trimming. Emptiness is checked downstream in
/// [`GrammarFixer::fix_grammar`], not here.
fn extract_text(data: &Value) -> crate::error::Result<&str> {
    let body = data.as_object().ok_or(ApiError::MalformedRequest)?;

    let text = match body.get("text") {
        None | Some(Value::Null) => return Err(ApiError::MissingField("text")),
        Some(value) => value,
    };

    text.as_str().ok_or(ApiError::InvalidFieldType {
        field: "text",
        expected: "string",
    })
}
