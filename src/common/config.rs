// src/common/config.rs
//! Process configuration read from the environment (after `.env` is loaded)

use std::env;

use super::dev_mode::DevModeConfig;

const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://localhost:5173,http://localhost:8000";

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub session_ttl_hours: i64,
    pub google_client_id: Option<String>,
    /// Accept the legacy unsigned `google_<id>` / `<user id>` bearer tokens
    pub allow_unsigned_tokens: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "replace_with_strong_secret".to_string(),
            session_ttl_hours: 24 * 7,
            google_client_id: None,
            allow_unsigned_tokens: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub auth: AuthConfig,
    /// Serve rule-based recipes when no generation credential is configured
    pub mock_recipes: bool,
}

impl AppConfig {
    pub fn from_env(dev_mode: &DevModeConfig) -> Self {
        let defaults = AuthConfig::default();

        let auth = AuthConfig {
            jwt_secret: env::var("JWT_SECRET").unwrap_or(defaults.jwt_secret),
            session_ttl_hours: env::var("SESSION_TTL_HOURS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .filter(|h| *h > 0)
                .unwrap_or(defaults.session_ttl_hours),
            google_client_id: env::var("GOOGLE_CLIENT_ID")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            allow_unsigned_tokens: env_flag("ALLOW_UNSIGNED_TOKENS", dev_mode.is_enabled()),
        };

        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://chefbot.db".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse::<u16>().ok())
                .unwrap_or(8080),
            cors_origins: parse_origins(
                &env::var("CORS_ORIGINS").unwrap_or_else(|_| DEFAULT_CORS_ORIGINS.to_string()),
            ),
            auth,
            mock_recipes: env_flag("MOCK_RECIPES", true),
        }
    }
}

/// Reads a boolean env var ("true"/"1"/"yes"), falling back to `default`
pub fn env_flag(name: &str, default: bool) -> bool {
    match env::var(name) {
        Ok(v) => parse_flag(&v).unwrap_or(default),
        Err(_) => default,
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag(" 0 "), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins("http://a.test, ,http://b.test"),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
    }

    #[test]
    fn test_unsigned_tokens_off_by_default() {
        assert!(!AuthConfig::default().allow_unsigned_tokens);
    }
}
