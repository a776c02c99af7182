// Common module - shared types and utilities across all modules

pub mod config;
pub mod dev_mode;
pub mod error;
pub mod helpers;
pub mod id_generator;
pub mod migrations;
pub mod state;
pub mod validation;

#[cfg(test)]
pub mod test_support;

// Re-export commonly used types for convenience
pub use config::AppConfig;
pub use error::{is_unique_violation, ApiError};
pub use helpers::{
    decode_string_list, encode_string_list, ingredient_name_key, safe_email_log, safe_token_log,
};
pub use id_generator::*;
pub use state::AppState;
pub use validation::{ValidationResult, Validator};
