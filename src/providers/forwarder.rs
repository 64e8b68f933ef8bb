use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use super::llm::{CompletionError, CompletionMessage, CompletionProvider};

/// Talks to the completion forwarder (see `api`), never to the model
/// provider directly, so no credential lives on this side.
#[derive(Debug, Clone)]
pub struct ForwarderClient {
    endpoint: String,
    model: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct ForwardRequest<'a> {
    model: &'a str,
    messages: Vec<CompletionMessage>,
}

impl ForwarderClient {
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            model: model.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Pulls `choices[0].message.content` out of a completion body. An `error`
/// field wins over any choices that may also be present.
pub fn extract_reply(body: &Value) -> Result<String, CompletionError> {
    if let Some(error) = body.get("error").filter(|e| !e.is_null()) {
        let detail = error["message"]
            .as_str()
            .or_else(|| error.as_str())
            .unwrap_or("unspecified error")
            .to_string();
        return Err(CompletionError::Upstream(detail));
    }

    body["choices"][0]["message"]["content"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| CompletionError::Malformed("missing choices[0].message.content".to_string()))
}

#[async_trait]
impl CompletionProvider for ForwarderClient {
    async fn complete(&self, messages: Vec<CompletionMessage>) -> Result<String, CompletionError> {
        let request = ForwardRequest {
            model: &self.model,
            messages,
        };

        let response = self.client.post(&self.endpoint).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Status { status, body });
        }

        let text = response.text().await?;
        let body: Value = serde_json::from_str(&text)
            .map_err(|e| CompletionError::Malformed(format!("invalid JSON: {}", e)))?;

        extract_reply(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_first_choice() {
        let body = json!({
            "choices": [
                { "message": { "content": "Hi there" } },
                { "message": { "content": "ignored" } }
            ]
        });
        assert_eq!(extract_reply(&body).unwrap(), "Hi there");
    }

    #[test]
    fn test_error_field_is_failure() {
        let body = json!({ "error": { "message": "quota exceeded" } });
        match extract_reply(&body) {
            Err(CompletionError::Upstream(detail)) => assert_eq!(detail, "quota exceeded"),
            other => panic!("Expected upstream error, got {:?}", other),
        }

        let body = json!({ "error": "OpenAI API error: 429" });
        assert!(matches!(extract_reply(&body), Err(CompletionError::Upstream(_))));
    }

    #[test]
    fn test_missing_content_is_malformed() {
        for body in [
            json!({}),
            json!({ "choices": [] }),
            json!({ "choices": [{ "message": {} }] }),
            json!({ "choices": [{ "message": { "content": 42 } }] }),
        ] {
            assert!(matches!(extract_reply(&body), Err(CompletionError::Malformed(_))));
        }
    }

    #[test]
    fn test_null_error_is_ignored() {
        let body = json!({ "error": null, "choices": [{ "message": { "content": "ok" } }] });
        assert_eq!(extract_reply(&body).unwrap(), "ok");
    }

    #[test]
    fn test_forwarder_client_creation() {
        let client = ForwarderClient::new("http://localhost:3000/api/chat", "gpt-4");
        assert_eq!(client.endpoint(), "http://localhost:3000/api/chat");
        assert_eq!(client.model, "gpt-4");
    }
}
