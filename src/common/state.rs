// Application state shared across all modules

use reqwest::Client;
use sqlx::SqlitePool;
use std::sync::Arc;

use super::config::AuthConfig;
use super::dev_mode::DevModeConfig;
use crate::services::TextGenerator;

/// Built once in `main` and handed to every handler through an
/// `Extension<Arc<AppState>>`. Nothing in it is mutated after startup.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub http: Client,
    pub auth: AuthConfig,
    pub dev_mode: DevModeConfig,
    /// None when no generation credential is configured
    pub generator: Option<Arc<dyn TextGenerator>>,
    pub mock_recipes: bool,
}
