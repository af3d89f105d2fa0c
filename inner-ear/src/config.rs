use serde::Deserialize;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

/// Read an optional variable, treating an empty value as unset.
fn env_non_empty(var: &str) -> Option<String> {
    env::var(var)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub gemini: GeminiConfig,
    pub client: ClientConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding the built single-page app.
    pub static_dir: PathBuf,
    /// Optional file replacing the built-in persona instruction.
    pub persona_file: Option<PathBuf>,
    /// Largest accepted JSON request body. Chat requests carry the whole
    /// transcript, so this bounds the length of a session.
    pub max_body_bytes: usize,
}

/// Upstream generative-language API settings.
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

/// Settings for the terminal chat client.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    pub server_url: String,
    pub key_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("PORT", 3000),
                static_dir: env_non_empty("STATIC_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("dist")),
                persona_file: env_non_empty("PERSONA_FILE").map(PathBuf::from),
                max_body_bytes: parse_env_or("MAX_BODY_BYTES", DEFAULT_MAX_BODY_BYTES),
            },
            gemini: GeminiConfig {
                base_url: env_non_empty("GEMINI_BASE_URL")
                    .map(|url| url.trim_end_matches('/').to_string())
                    .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
                model: env_non_empty("GEMINI_MODEL")
                    .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
                timeout_secs: parse_env_or("GEMINI_TIMEOUT_SECS", 60),
            },
            client: ClientConfig {
                server_url: env_non_empty("INNER_EAR_SERVER")
                    .unwrap_or_else(|| "http://localhost:3000".to_string()),
                key_file: env_non_empty("INNER_EAR_KEY_FILE")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(".inner_ear_api_key")),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "HOST",
        "PORT",
        "STATIC_DIR",
        "PERSONA_FILE",
        "MAX_BODY_BYTES",
        "GEMINI_BASE_URL",
        "GEMINI_MODEL",
        "GEMINI_TIMEOUT_SECS",
        "INNER_EAR_SERVER",
        "INNER_EAR_KEY_FILE",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_config_defaults() {
        clear_env();

        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.static_dir, PathBuf::from("dist"));
        assert!(config.server.persona_file.is_none());
        assert_eq!(config.server.max_body_bytes, 64 * 1024 * 1024);
        assert_eq!(config.gemini.base_url, DEFAULT_GEMINI_BASE_URL);
        assert_eq!(config.gemini.model, "gemini-2.5-flash");
        assert_eq!(config.gemini.timeout_secs, 60);
        assert_eq!(config.client.server_url, "http://localhost:3000");
        assert_eq!(config.client.key_file, PathBuf::from(".inner_ear_api_key"));
    }

    #[test]
    #[serial]
    fn test_gemini_config_from_env() {
        clear_env();
        std::env::set_var("GEMINI_BASE_URL", "http://127.0.0.1:9000/");
        std::env::set_var("GEMINI_MODEL", "gemini-2.5-pro");
        std::env::set_var("GEMINI_TIMEOUT_SECS", "5");

        let config = Config::default();
        assert_eq!(config.gemini.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.gemini.model, "gemini-2.5-pro");
        assert_eq!(config.gemini.timeout_secs, 5);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_port_falls_back_to_default() {
        clear_env();
        std::env::set_var("PORT", "not-a-port");

        let config = Config::default();
        assert_eq!(config.server.port, 3000);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_max_body_bytes_from_env() {
        clear_env();
        std::env::set_var("MAX_BODY_BYTES", "1048576");

        let config = Config::default();
        assert_eq!(config.server.max_body_bytes, 1_048_576);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_empty_persona_file_is_ignored() {
        clear_env();
        std::env::set_var("PERSONA_FILE", "  ");

        let config = Config::default();
        assert!(config.server.persona_file.is_none());

        clear_env();
    }

    #[test]
    #[serial]
    fn test_parse_env_or_valid_value() {
        std::env::set_var("__TEST_PARSE_PORT", "8080");
        let result: u16 = parse_env_or("__TEST_PARSE_PORT", 3000);
        assert_eq!(result, 8080);
        std::env::remove_var("__TEST_PARSE_PORT");
    }
}
