use serde::{Deserialize, Serialize};

use crate::paths;

fn default_api_base() -> String {
    "http://localhost:5000".to_string()
}

fn default_session_base() -> String {
    "http://localhost:3000".to_string()
}

/// Client configuration, loaded from ~/.zufan/config.json with environment
/// overrides. `user_id` present means the client runs authenticated and
/// mirrors state to the session service; absent means guest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the RAG backend
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Base URL of the session service
    #[serde(default = "default_session_base")]
    pub session_base: String,
    /// Authenticated user id, if any
    #[serde(default)]
    pub user_id: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            session_base: default_session_base(),
            user_id: None,
        }
    }
}

impl Config {
    /// Load config.json if present, then apply environment overrides
    /// (ZUFAN_API_BASE, ZUFAN_SESSION_BASE, ZUFAN_USER_ID).
    pub fn load() -> Self {
        let mut config = Config::default();

        let json_path = paths::config_json_path();
        if json_path.exists() {
            match std::fs::read_to_string(&json_path) {
                Ok(content) => match serde_json::from_str::<Config>(&content) {
                    Ok(file_config) => config = file_config,
                    Err(err) => log::warn!("Failed to parse {}: {}", json_path.display(), err),
                },
                Err(err) => log::warn!("Failed to read {}: {}", json_path.display(), err),
            }
        }

        if let Ok(api_base) = std::env::var("ZUFAN_API_BASE") {
            config.api_base = api_base;
        }
        if let Ok(session_base) = std::env::var("ZUFAN_SESSION_BASE") {
            config.session_base = session_base;
        }
        if let Ok(user_id) = std::env::var("ZUFAN_USER_ID") {
            if user_id.trim().is_empty() {
                config.user_id = None;
            } else {
                config.user_id = Some(user_id);
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api_base, "http://localhost:5000");
        assert_eq!(config.session_base, "http://localhost:3000");
        assert!(config.user_id.is_none());
    }

    #[test]
    fn test_partial_config_json_fills_defaults() {
        let config: Config = serde_json::from_str(r#"{"user_id": "u-1"}"#).unwrap();
        assert_eq!(config.api_base, "http://localhost:5000");
        assert_eq!(config.user_id.as_deref(), Some("u-1"));
    }
}
