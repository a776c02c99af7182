// src/common/dev_mode.rs
//! Development mode configuration
//! Lets unauthenticated requests act as a shared, stable development user

use std::env;
use uuid::Uuid;

/// Namespace string hashed into the development user's UUID
const DEV_IDENTITY_NAMESPACE: &str = "dev.chefbot.local";

#[derive(Debug, Clone)]
pub struct DevModeConfig {
    pub enabled: bool,
    pub user_email: String,
    pub user_name: String,
}

impl Default for DevModeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            user_email: "dev@chefbot.local".to_string(),
            user_name: "Dev User".to_string(),
        }
    }
}

impl DevModeConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let enabled = env::var("DEV_MODE")
            .unwrap_or_else(|_| "false".to_string())
            .to_lowercase()
            == "true";

        let user_email = env::var("DEV_USER_EMAIL").unwrap_or(defaults.user_email);
        let user_name = env::var("DEV_USER_NAME").unwrap_or(defaults.user_name);

        Self {
            enabled,
            user_email,
            user_name,
        }
    }

    /// Config with development mode switched on
    #[cfg(test)]
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Id of the shared development user.
    /// Derived from a constant namespace so it survives restarts.
    pub fn dev_user_id(&self) -> String {
        Uuid::new_v5(&Uuid::NAMESPACE_DNS, DEV_IDENTITY_NAMESPACE.as_bytes()).to_string()
    }
}

/// Print dev mode status on startup
pub fn print_dev_mode_status(config: &DevModeConfig) {
    if config.enabled {
        println!("⚠️  🔓 DEV MODE ENABLED 🔓 ⚠️");
        println!("   Unauthenticated requests act as the development user");
        println!("   Dev User: {} ({})", config.user_name, config.user_email);
        println!("   Dev User Id: {}", config.dev_user_id());
        println!("   ⚠️  DO NOT USE IN PRODUCTION ⚠️");
        println!();
    } else {
        println!("🔒 Production mode - Authentication required");
    }
}

/// CLI argument parsing for dev mode
pub fn parse_dev_mode_args<I>(args: I) -> Option<bool>
where
    I: IntoIterator<Item = String>,
{
    let mut result = None;
    for arg in args {
        match arg.as_str() {
            "--dev" | "--dev-mode" => result = Some(true),
            "--no-dev" | "--prod" | "--production" => result = Some(false),
            _ => {}
        }
    }
    result
}

/// Override dev mode from CLI args
pub fn apply_cli_override(mut config: DevModeConfig) -> DevModeConfig {
    if let Some(cli_dev_mode) = parse_dev_mode_args(env::args()) {
        println!("🔧 CLI override: DEV_MODE = {}", cli_dev_mode);
        config.enabled = cli_dev_mode;
    }

    config
}
