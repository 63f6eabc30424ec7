// ABOUTME: Configuration loading for carelog.
// ABOUTME: Reads ~/.carelog/config.toml, the CARELOG_TOKEN env credential, and CLI overrides.

use std::path::PathBuf;

use serde::Deserialize;

/// Environment variable holding the caller's auth token.
pub const TOKEN_ENV: &str = "CARELOG_TOKEN";

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub chat: ChatConfig,
}

/// Remote service configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5001".to_string(),
        }
    }
}

/// Chat presentation configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Display name for the assistant in the REPL.
    pub assistant_name: String,
    /// Greeting seeded into every new session's transcript.
    pub greeting: String,
    /// Pacing delay before the synthetic "saved" confirmation entry.
    pub confirm_delay_ms: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            assistant_name: "koda".to_string(),
            greeting: "Hi! I'm here whenever you want to tell me how you're feeling.".to_string(),
            confirm_delay_ms: 900,
        }
    }
}

impl Config {
    /// Load config from ~/.carelog/config.toml, falling back to defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Path to the config file.
    pub fn config_path() -> PathBuf {
        Self::home_dir().join(".carelog").join("config.toml")
    }

    /// Path to the .env file with the auth token.
    pub fn secrets_env_path() -> PathBuf {
        Self::home_dir().join(".carelog").join(".env")
    }

    /// Directory where fetched synthesized audio is cached.
    pub fn audio_cache_dir() -> PathBuf {
        Self::home_dir().join(".carelog").join("audio")
    }

    fn home_dir() -> PathBuf {
        dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
    }

    /// The auth token from the environment, if set and non-empty.
    pub fn auth_token() -> Option<String> {
        std::env::var(TOKEN_ENV).ok().filter(|t| !t.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = Config::default();
        assert_eq!(config.server.base_url, "http://localhost:5001");
        assert_eq!(config.chat.assistant_name, "koda");
        assert_eq!(config.chat.confirm_delay_ms, 900);
        assert!(!config.chat.greeting.is_empty());
    }

    #[test]
    fn parse_config_toml() {
        let toml_str = r#"
[server]
base_url = "https://care.example.com"

[chat]
assistant_name = "barnaby"
greeting = "Hello!"
confirm_delay_ms = 250
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.base_url, "https://care.example.com");
        assert_eq!(config.chat.assistant_name, "barnaby");
        assert_eq!(config.chat.greeting, "Hello!");
        assert_eq!(config.chat.confirm_delay_ms, 250);
    }

    #[test]
    fn parse_partial_config_uses_defaults() {
        let toml_str = r#"
[server]
base_url = "http://10.0.0.2:5001"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.base_url, "http://10.0.0.2:5001");
        assert_eq!(config.chat.confirm_delay_ms, 900);
    }
}
