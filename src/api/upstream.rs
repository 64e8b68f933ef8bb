use axum::body::Bytes;
use axum::http::StatusCode;
use serde_json::{json, Value};

use crate::config::Config;

/// The model provider's completion endpoint, with the generation settings
/// the forwarder always applies.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    url: String,
    api_key: Option<String>,
    default_model: String,
    max_tokens: u32,
    temperature: f32,
    client: reqwest::Client,
}

impl UpstreamClient {
    pub fn from_config(config: &Config) -> Self {
        Self {
            url: config.upstream_url.clone(),
            api_key: config.openai_api_key.clone(),
            default_model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            client: reqwest::Client::new(),
        }
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn request_body(&self, model: Option<&str>, messages: Value) -> Value {
        json!({
            "model": model.unwrap_or(self.default_model.as_str()),
            "messages": messages,
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
        })
    }

    /// Returns the provider's status and raw body. A missing credential
    /// short-circuits to `None` without touching the network.
    pub async fn forward(
        &self,
        model: Option<&str>,
        messages: Value,
    ) -> Result<Option<(StatusCode, Bytes)>, reqwest::Error> {
        let Some(api_key) = &self.api_key else {
            return Ok(None);
        };

        let response = self
            .client
            .post(&self.url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&self.request_body(model, messages))
            .send()
            .await?;

        let status =
            StatusCode::from_u16(response.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
        let body = response.bytes().await?;

        Ok(Some((status, body)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_adds_generation_settings() {
        let upstream = UpstreamClient::from_config(&Config::default());
        let body = upstream.request_body(None, json!([{ "role": "user", "content": "hi" }]));

        assert_eq!(body["model"], "gpt-4");
        assert_eq!(body["max_tokens"], 1000);
        assert!((body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
        assert_eq!(body["messages"][0]["content"], "hi");
    }

    #[test]
    fn test_explicit_model_wins() {
        let upstream = UpstreamClient::from_config(&Config::default());
        let body = upstream.request_body(Some("gpt-4o-mini"), json!([]));
        assert_eq!(body["model"], "gpt-4o-mini");
    }

    #[tokio::test]
    async fn test_missing_credential_skips_network() {
        let upstream = UpstreamClient::from_config(&Config::default());
        assert!(!upstream.has_credential());
        assert!(upstream.forward(None, json!([])).await.unwrap().is_none());
    }
}
