use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const DEFAULT_UPSTREAM_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub openai_api_key: Option<String>,
    pub upstream_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub port: u16,
    pub forwarder_url: String,
    pub agent_poll_ms: u64,
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            openai_api_key: std::env::var("OPENAI_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            upstream_url: env_or("OPENAI_API_URL", DEFAULT_UPSTREAM_URL.to_string()),
            model: env_or("SWITCHBOARD_MODEL", DEFAULT_MODEL.to_string()),
            max_tokens: env_or("SWITCHBOARD_MAX_TOKENS", 1000),
            temperature: env_or("SWITCHBOARD_TEMPERATURE", 0.7),
            port: env_or("SWITCHBOARD_PORT", 3000),
            forwarder_url: env_or(
                "SWITCHBOARD_FORWARDER_URL",
                "http://localhost:3000/api/chat".to_string(),
            ),
            agent_poll_ms: env_or("SWITCHBOARD_AGENT_POLL_MS", 1000),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            upstream_url: DEFAULT_UPSTREAM_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 1000,
            temperature: 0.7,
            port: 3000,
            forwarder_url: "http://localhost:3000/api/chat".to_string(),
            agent_poll_ms: 1000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_forwarder_contract() {
        let config = Config::default();
        assert_eq!(config.model, "gpt-4");
        assert_eq!(config.max_tokens, 1000);
        assert!((config.temperature - 0.7).abs() < f32::EPSILON);
        assert!(config.openai_api_key.is_none());
    }

    #[test]
    fn test_unparseable_value_falls_back() {
        std::env::set_var("SWITCHBOARD_TEST_BAD_PORT", "not-a-port");
        assert_eq!(env_or("SWITCHBOARD_TEST_BAD_PORT", 3000u16), 3000);
        std::env::remove_var("SWITCHBOARD_TEST_BAD_PORT");
    }
}
