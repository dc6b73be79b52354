use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{info, warn};

/// The external capability that proposes corrections for a piece of text.
///
/// Implementations return raw, loosely-shaped correction entries (JSON
/// objects that may carry `start`, `end`, `oldText`, `newText`); the
/// normalizer in [`crate::grammar`] completes whatever is missing. An empty
/// vector is a normal outcome, not a failure.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Detector: Send + Sync {
    async fn analyze(&self, text: &str) -> anyhow::Result<Vec<Value>>;
}

/// Placeholder detector used until a model backend is configured.
pub struct NoopDetector;

#[async_trait]
impl Detector for NoopDetector {
    async fn analyze(&self, text: &str) -> anyhow::Result<Vec<Value>> {
        info!("Analyzing text with placeholder detector ({} bytes)", text.len());
        Ok(Vec::new())
    }
}

/// Detector backed by a local Ollama server.
pub struct OllamaDetector {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaDetector {
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    fn prompt(text: &str) -> String {
        format!(
            "Fix the grammar in this text and respond with only a JSON array of \
             corrections, each shaped like \
             {{\"start\": int, \"end\": int, \"oldText\": string, \"newText\": string}} \
             where start/end are character offsets into the original text. \
             Respond with [] if the text is already correct. Text: {text:?}"
        )
    }

    /// Pulls the correction array out of a model reply. Models often wrap
    /// JSON in markdown fences, so those are stripped before parsing. A
    /// reply that cannot be parsed as a JSON array yields no corrections.
    fn parse_content(content: &str) -> Vec<Value> {
        let trimmed = content
            .trim()
            .trim_start_matches("```json")
            .trim_start_matches("```")
            .trim_end_matches("```")
            .trim();

        match serde_json::from_str::<Value>(trimmed) {
            Ok(Value::Array(entries)) => entries,
            Ok(other) => {
                warn!("model reply was valid JSON but not an array: {other}");
                Vec::new()
            }
            Err(err) => {
                warn!("model reply was not parseable as JSON: {err}");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl Detector for OllamaDetector {
    async fn analyze(&self, text: &str) -> anyhow::Result<Vec<Value>> {
        info!("Analyzing text with Ollama model '{}'", self.model);

        let body = json!({
            "model": self.model,
            "stream": false,
            "messages": [{ "role": "user", "content": Self::prompt(text) }],
        });

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let reply: Value = response.json().await?;
        let content = reply
            .pointer("/message/content")
            .and_then(Value::as_str)
            .unwrap_or("");

        Ok(Self::parse_content(content))
    }
}
