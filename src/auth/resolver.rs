//! Identity resolution: claimed identity to a persisted `User`
//!
//! Users are created lazily. Every creation path is an
//! `INSERT ... ON CONFLICT DO NOTHING` followed by a select, so two requests
//! racing on the same unseen identity end up with the same single row.

use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use super::models::{ExternalProfile, User};
use super::token::{IdentityProvider, TokenIdentity};
use crate::common::dev_mode::DevModeConfig;
use crate::common::{generate_user_id, parse_user_id, safe_email_log, ApiError};
use crate::ingredients::IngredientsService;

const SELECT_USER: &str = "SELECT id, email, name, picture, external_provider_id, is_active, created_at, updated_at FROM users";

/// Domain for placeholder addresses of users we only know by id
const PLACEHOLDER_EMAIL_DOMAIN: &str = "users.chefbot.local";

/// Pantry given to the development user the first time it is created
pub const DEV_PANTRY: &[(&str, f64, &str)] = &[
    ("Tomatoes", 4.0, "pieces"),
    ("Pasta", 500.0, "g"),
    ("Olive oil", 1.0, "bottle"),
    ("Garlic", 1.0, "bulb"),
    ("Onion", 2.0, "pieces"),
];

pub struct IdentityResolver {
    db: SqlitePool,
    dev_mode: DevModeConfig,
}

impl IdentityResolver {
    pub fn new(db: SqlitePool, dev_mode: DevModeConfig) -> Self {
        Self { db, dev_mode }
    }

    pub fn dev_mode_enabled(&self) -> bool {
        self.dev_mode.is_enabled()
    }

    /// Maps a claimed identity (or its absence) to an active user
    pub async fn resolve(&self, identity: Option<TokenIdentity>) -> Result<User, ApiError> {
        let user = match identity {
            Some(TokenIdentity::External {
                provider,
                provider_id,
            }) => self.ensure_external_user(provider, &provider_id, None).await?,
            Some(TokenIdentity::Internal(raw_id)) => self.ensure_internal_user(&raw_id).await?,
            None if self.dev_mode.is_enabled() => self.dev_user().await?,
            None => {
                return Err(ApiError::AuthenticationRequired(
                    "missing credentials".to_string(),
                ))
            }
        };

        require_active(user)
    }

    /// User behind a verified session token
    pub async fn session_user(&self, user_id: &str) -> Result<User, ApiError> {
        match self.find_by_id(user_id).await? {
            Some(user) => require_active(user),
            None => {
                warn!(user_id = %user_id, "Session token refers to an unknown user");
                Err(ApiError::InvalidToken("unknown session user".to_string()))
            }
        }
    }

    pub async fn find_by_id(&self, user_id: &str) -> Result<Option<User>, ApiError> {
        Ok(
            sqlx::query_as::<_, User>(&format!("{} WHERE id = ?", SELECT_USER))
                .bind(user_id)
                .fetch_optional(&self.db)
                .await?,
        )
    }

    /// Fetches or creates the user linked to an external provider id.
    ///
    /// Without a profile a placeholder email and name are stored. With one
    /// (sign-in through the provider) the stored profile is refreshed.
    pub async fn ensure_external_user(
        &self,
        provider: IdentityProvider,
        provider_id: &str,
        profile: Option<&ExternalProfile>,
    ) -> Result<User, ApiError> {
        let placeholder = ExternalProfile {
            email: format!(
                "{}_{}@{}",
                provider.as_str(),
                provider_id,
                PLACEHOLDER_EMAIL_DOMAIN
            ),
            name: format!("{} user {}", provider.label(), provider_id),
            picture: None,
        };

        let sql = if profile.is_some() {
            r#"
            INSERT INTO users (id, email, name, picture, external_provider_id)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(external_provider_id) DO UPDATE SET
                email = excluded.email,
                name = excluded.name,
                picture = COALESCE(excluded.picture, users.picture),
                updated_at = datetime('now')
            "#
        } else {
            r#"
            INSERT INTO users (id, email, name, picture, external_provider_id)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(external_provider_id) DO NOTHING
            "#
        };
        let fields = profile.unwrap_or(&placeholder);

        let result = sqlx::query(sql)
            .bind(generate_user_id())
            .bind(&fields.email)
            .bind(&fields.name)
            .bind(&fields.picture)
            .bind(provider_id)
            .execute(&self.db)
            .await?;

        let user = sqlx::query_as::<_, User>(&format!(
            "{} WHERE external_provider_id = ?",
            SELECT_USER
        ))
        .bind(provider_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| {
            ApiError::InternalServer("user vanished after upsert".to_string())
        })?;

        debug!(
            user_id = %user.id,
            provider = provider.as_str(),
            email = %safe_email_log(&user.email),
            rows_written = result.rows_affected(),
            "Resolved external identity"
        );

        Ok(user)
    }

    /// Fetches or creates the user with an internal id taken from a token.
    /// The id must be a UUID.
    pub async fn ensure_internal_user(&self, raw_id: &str) -> Result<User, ApiError> {
        let user_id = parse_user_id(raw_id)
            .ok_or_else(|| ApiError::InvalidToken("malformed user id".to_string()))?;

        let result = sqlx::query(
            r#"
            INSERT INTO users (id, email, name)
            VALUES (?, ?, ?)
            ON CONFLICT(id) DO NOTHING
            "#,
        )
        .bind(&user_id)
        .bind(format!("{}@{}", user_id, PLACEHOLDER_EMAIL_DOMAIN))
        .bind(format!("User {}", &user_id[..8]))
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 1 {
            info!(user_id = %user_id, "Created user for unseen internal id");
        }

        self.find_by_id(&user_id)
            .await?
            .ok_or_else(|| ApiError::InternalServer("user vanished after upsert".to_string()))
    }

    /// The shared development user. Seeded with an example pantry when the
    /// row is first created and owns no ingredients yet.
    pub async fn dev_user(&self) -> Result<User, ApiError> {
        let user_id = self.dev_mode.dev_user_id();

        let result = sqlx::query(
            r#"
            INSERT INTO users (id, email, name)
            VALUES (?, ?, ?)
            ON CONFLICT(id) DO NOTHING
            "#,
        )
        .bind(&user_id)
        .bind(&self.dev_mode.user_email)
        .bind(&self.dev_mode.user_name)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 1 {
            match IngredientsService::new(self.db.clone())
                .seed_if_empty(&user_id, DEV_PANTRY)
                .await
            {
                Ok(seeded) => info!(
                    user_id = %user_id,
                    seeded = seeded,
                    "Created development user"
                ),
                Err(e) => warn!(
                    error = %e,
                    user_id = %user_id,
                    "Created development user but could not seed its pantry"
                ),
            }
        }

        self.find_by_id(&user_id)
            .await?
            .ok_or_else(|| ApiError::InternalServer("development user missing".to_string()))
    }
}

fn require_active(user: User) -> Result<User, ApiError> {
    if user.is_active {
        Ok(user)
    } else {
        warn!(user_id = %user.id, "Rejected request from inactive user");
        Err(ApiError::AuthenticationRequired(
            "account is disabled".to_string(),
        ))
    }
}
