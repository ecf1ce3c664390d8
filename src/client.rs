use reqwest::{header::CONTENT_TYPE, Client};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::controller::RequestOutcome;

/// Path of the chat endpoint, relative to the server base URL
pub const CHATBOT_PATH: &str = "/chatbot";

#[derive(Serialize)]
struct ChatbotRequest<'a> {
    prompt: &'a str,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("could not reach the chatbot server: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server declared JSON but sent a malformed body: {0}")]
    MalformedJson(#[from] serde_json::Error),
    #[error("server sent a JSON null body")]
    NullBody,
}

#[derive(Clone)]
pub struct ChatbotClient {
    client: Client,
    base_url: String,
}

impl ChatbotClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, CHATBOT_PATH)
    }

    /// Post one prompt and return the reply text.
    ///
    /// The status code is not inspected: an error page or a 400 with a
    /// `{"response": ...}` body is interpreted like any other reply.
    pub async fn send(&self, prompt: &str) -> Result<String, ClientError> {
        let url = self.endpoint();
        tracing::info!(%url, prompt_chars = prompt.chars().count(), "sending prompt");

        let response = self
            .client
            .post(&url)
            .json(&ChatbotRequest { prompt })
            .send()
            .await?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = response.text().await?;

        tracing::info!(%status, %content_type, body_bytes = body.len(), "reply received");
        interpret_body(&content_type, &body)
    }
}

/// Extract the reply text from a response body.
///
/// JSON bodies (content type containing `application/json`) yield their
/// `response` field. A missing field or a falsy one (`null`, `false`, zero,
/// `""`) reads as the empty string; other values are shown as their JSON text.
/// A bare `null` body has no fields to read and is an error. Non-JSON bodies
/// are returned verbatim.
pub fn interpret_body(content_type: &str, body: &str) -> Result<String, ClientError> {
    if !content_type.to_ascii_lowercase().contains("application/json") {
        return Ok(body.to_string());
    }

    let data: Value = serde_json::from_str(body)?;
    if data.is_null() {
        return Err(ClientError::NullBody);
    }

    let text = match data.get("response") {
        Some(Value::String(text)) => text.clone(),
        Some(value) if is_falsy(value) => String::new(),
        Some(other) => other.to_string(),
        None => String::new(),
    };
    Ok(text)
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

impl From<Result<String, ClientError>> for RequestOutcome {
    fn from(result: Result<String, ClientError>) -> Self {
        match result {
            Ok(text) => RequestOutcome::Success(text),
            Err(e) => {
                tracing::warn!(error = %e, "chat request failed");
                RequestOutcome::Failure
            }
        }
    }
}
