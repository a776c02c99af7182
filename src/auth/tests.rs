//! Tests for auth module
//!
//! These tests verify:
//! - lazy user creation for external and internal identities
//! - the development identity and its one-time pantry seed
//! - the order in which credentials are tried
//! - Google tokeninfo validation

#[cfg(test)]
mod tests {
    use super::super::extractors::authenticate;
    use super::super::google::{identity_from_tokeninfo, verify_id_token, verify_with_endpoint};
    use super::super::models::ExternalProfile;
    use super::super::resolver::{IdentityResolver, DEV_PANTRY};
    use super::super::token::{issue_session_token, IdentityProvider, TokenIdentity};
    use crate::common::config::AuthConfig;
    use crate::common::dev_mode::DevModeConfig;
    use crate::common::test_support::{concurrent_test_pool, insert_user, test_pool};
    use crate::common::ApiError;
    use crate::ingredients::IngredientsService;
    use axum::{extract::Query, http::StatusCode, routing::get, Json, Router};
    use futures::future::join_all;
    use serde_json::json;
    use sqlx::SqlitePool;
    use std::collections::HashMap;
    use tokio::net::TcpListener;

    const SECRET: &str = "test_secret_key";

    fn production(pool: &SqlitePool) -> IdentityResolver {
        IdentityResolver::new(pool.clone(), DevModeConfig::default())
    }

    fn development(pool: &SqlitePool) -> IdentityResolver {
        IdentityResolver::new(pool.clone(), DevModeConfig::enabled())
    }

    fn auth_config(allow_unsigned: bool) -> AuthConfig {
        AuthConfig {
            jwt_secret: SECRET.to_string(),
            allow_unsigned_tokens: allow_unsigned,
            ..AuthConfig::default()
        }
    }

    fn google(id: &str) -> Option<TokenIdentity> {
        Some(TokenIdentity::External {
            provider: IdentityProvider::Google,
            provider_id: id.to_string(),
        })
    }

    async fn user_count(pool: &SqlitePool) -> i64 {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await
            .unwrap();
        count
    }

    // ============================================================================
    // Identity Resolver
    // ============================================================================

    #[tokio::test]
    async fn test_external_identity_creates_placeholder_user() {
        let pool = test_pool().await;
        let resolver = production(&pool);

        let user = resolver.resolve(google("abc123")).await.unwrap();
        assert_eq!(user.external_provider_id.as_deref(), Some("abc123"));
        assert_eq!(user.email, "google_abc123@users.chefbot.local");
        assert_eq!(user.name, "Google user abc123");
        assert!(user.is_active);

        let again = resolver.resolve(google("abc123")).await.unwrap();
        assert_eq!(again.id, user.id);
        assert_eq!(user_count(&pool).await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_requests_create_one_user() {
        let (pool, _dir) = concurrent_test_pool(8).await;

        let tasks = (0..8).map(|_| {
            let resolver = production(&pool);
            tokio::spawn(async move { resolver.resolve(google("racer")).await })
        });
        let results = join_all(tasks).await;

        let ids: Vec<String> = results.into_iter().map(|r| r.unwrap().unwrap().id).collect();
        assert!(ids.iter().all(|id| id == &ids[0]));
        assert_eq!(user_count(&pool).await, 1);
    }

    #[tokio::test]
    async fn test_sign_in_profile_refreshes_placeholder() {
        let pool = test_pool().await;
        let resolver = production(&pool);

        let placeholder = resolver.resolve(google("abc123")).await.unwrap();
        let profile = ExternalProfile {
            email: "ada@example.com".to_string(),
            name: "Ada".to_string(),
            picture: Some("https://example.com/ada.png".to_string()),
        };

        let user = resolver
            .ensure_external_user(IdentityProvider::Google, "abc123", Some(&profile))
            .await
            .unwrap();
        assert_eq!(user.id, placeholder.id);
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.name, "Ada");
        assert_eq!(user.picture.as_deref(), Some("https://example.com/ada.png"));
    }

    #[tokio::test]
    async fn test_internal_identity_must_be_uuid() {
        let pool = test_pool().await;
        let resolver = production(&pool);

        let err = resolver
            .resolve(Some(TokenIdentity::Internal("rawid456".to_string())))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidToken(_)));
        assert_eq!(user_count(&pool).await, 0);
    }

    #[tokio::test]
    async fn test_internal_identity_is_normalized_and_reused() {
        let pool = test_pool().await;
        let resolver = production(&pool);

        let lower = "5f0c8a52-3c2e-4c8e-9a55-6f1f0d6b2a10";
        let user = resolver
            .resolve(Some(TokenIdentity::Internal(lower.to_uppercase())))
            .await
            .unwrap();
        assert_eq!(user.id, lower);

        let again = resolver
            .resolve(Some(TokenIdentity::Internal(lower.to_string())))
            .await
            .unwrap();
        assert_eq!(again.id, lower);
        assert_eq!(user_count(&pool).await, 1);
    }

    #[tokio::test]
    async fn test_no_identity_in_production_is_rejected() {
        let pool = test_pool().await;
        let err = production(&pool).resolve(None).await.unwrap_err();
        assert!(matches!(err, ApiError::AuthenticationRequired(_)));
    }

    #[tokio::test]
    async fn test_dev_identity_is_stable_and_seeds_once() {
        let pool = test_pool().await;
        let resolver = development(&pool);

        let first = resolver.resolve(None).await.unwrap();
        assert_eq!(first.id, DevModeConfig::enabled().dev_user_id());
        assert_eq!(first.email, "dev@chefbot.local");

        let pantry = IngredientsService::new(pool.clone());
        let seeded = pantry.list(&first.id).await.unwrap();
        assert_eq!(seeded.len(), DEV_PANTRY.len());

        // an emptied pantry is not refilled
        for item in seeded {
            pantry.delete(&first.id, &item.id).await.unwrap();
        }
        let second = resolver.resolve(None).await.unwrap();
        assert_eq!(second.id, first.id);
        assert!(pantry.list(&first.id).await.unwrap().is_empty());
        assert_eq!(user_count(&pool).await, 1);
    }

    #[tokio::test]
    async fn test_inactive_user_is_rejected() {
        let pool = test_pool().await;
        let resolver = production(&pool);

        let user = resolver.resolve(google("sleepy")).await.unwrap();
        sqlx::query("UPDATE users SET is_active = 0 WHERE id = ?")
            .bind(&user.id)
            .execute(&pool)
            .await
            .unwrap();

        let err = resolver.resolve(google("sleepy")).await.unwrap_err();
        assert!(matches!(err, ApiError::AuthenticationRequired(_)));
    }

    // ============================================================================
    // Credential order
    // ============================================================================

    #[tokio::test]
    async fn test_session_token_resolves_its_user() {
        let pool = test_pool().await;
        let user_id = insert_user(&pool, "session-user").await;
        let token = issue_session_token(&user_id, &auth_config(false)).unwrap();
        let header = format!("Bearer {}", token);

        let user = authenticate(&production(&pool), &auth_config(false), Some(&header))
            .await
            .unwrap();
        assert_eq!(user.id, user_id);
    }

    #[tokio::test]
    async fn test_session_token_for_unknown_user_is_invalid() {
        let pool = test_pool().await;
        let token = issue_session_token("ghost", &auth_config(false)).unwrap();
        let header = format!("Bearer {}", token);

        let err = authenticate(&production(&pool), &auth_config(false), Some(&header))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidToken(_)));
    }

    #[tokio::test]
    async fn test_foreign_signature_is_not_a_session() {
        let pool = test_pool().await;
        let user_id = insert_user(&pool, "session-user").await;
        let foreign = AuthConfig {
            jwt_secret: "wrong_secret_key".to_string(),
            ..AuthConfig::default()
        };
        let header = format!("Bearer {}", issue_session_token(&user_id, &foreign).unwrap());

        let err = authenticate(&production(&pool), &auth_config(false), Some(&header))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidToken(_)));
    }

    #[tokio::test]
    async fn test_missing_header_in_production() {
        let pool = test_pool().await;
        let err = authenticate(&production(&pool), &auth_config(true), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::AuthenticationRequired(_)));
    }

    #[tokio::test]
    async fn test_unsigned_tokens_need_opt_in() {
        let pool = test_pool().await;
        let header = Some("Bearer google_abc123");

        let err = authenticate(&production(&pool), &auth_config(false), header)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidToken(_)));
        assert_eq!(user_count(&pool).await, 0);

        let user = authenticate(&production(&pool), &auth_config(true), header)
            .await
            .unwrap();
        assert_eq!(user.external_provider_id.as_deref(), Some("abc123"));
    }

    #[tokio::test]
    async fn test_dev_mode_falls_back_to_dev_user() {
        let pool = test_pool().await;
        let resolver = development(&pool);
        let dev_id = DevModeConfig::enabled().dev_user_id();

        let user = authenticate(&resolver, &auth_config(false), None).await.unwrap();
        assert_eq!(user.id, dev_id);

        let user = authenticate(&resolver, &auth_config(false), Some("Basic xyz"))
            .await
            .unwrap();
        assert_eq!(user.id, dev_id);

        // unsigned tokens are on by default in development mode
        let user = authenticate(&resolver, &auth_config(true), Some("Bearer not-a-uuid"))
            .await
            .unwrap();
        assert_eq!(user.id, dev_id);
    }

    // ============================================================================
    // Google sign-in
    // ============================================================================

    fn tokeninfo(exp: serde_json::Value) -> serde_json::Value {
        json!({
            "sub": "1234567890",
            "email": "ada@example.com",
            "email_verified": "true",
            "name": "Ada Lovelace",
            "picture": "https://example.com/ada.png",
            "aud": "client-1",
            "exp": exp,
        })
    }

    #[test]
    fn test_tokeninfo_accepts_string_or_number_exp() {
        let now = 1_700_000_000;

        let identity = identity_from_tokeninfo(&tokeninfo(json!("1700003600")), Some("client-1"), now)
            .unwrap();
        assert_eq!(identity.sub, "1234567890");
        assert_eq!(identity.profile.email, "ada@example.com");
        assert_eq!(identity.profile.name, "Ada Lovelace");

        assert!(identity_from_tokeninfo(&tokeninfo(json!(1_700_003_600)), None, now).is_ok());
    }

    #[test]
    fn test_tokeninfo_rejections() {
        let now = 1_700_000_000;

        let expired = identity_from_tokeninfo(&tokeninfo(json!("1699999999")), None, now);
        assert!(matches!(expired, Err(ApiError::InvalidToken(_))));

        let wrong_aud =
            identity_from_tokeninfo(&tokeninfo(json!("1700003600")), Some("client-2"), now);
        assert!(matches!(wrong_aud, Err(ApiError::InvalidToken(_))));

        let mut unverified = tokeninfo(json!("1700003600"));
        unverified["email_verified"] = json!("false");
        assert!(matches!(
            identity_from_tokeninfo(&unverified, None, now),
            Err(ApiError::InvalidToken(_))
        ));

        let missing = json!({ "sub": "1234567890" });
        assert!(matches!(
            identity_from_tokeninfo(&missing, None, now),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_dev_mode_without_client_id_uses_mock_identity() {
        let identity = verify_id_token(
            &reqwest::Client::new(),
            "anything",
            &AuthConfig::default(),
            &DevModeConfig::enabled(),
        )
        .await
        .unwrap();
        assert_eq!(identity.sub, "mock-google-id-123456789");
        assert_eq!(identity.profile.email, "test@example.com");
    }

    #[tokio::test]
    async fn test_verify_against_tokeninfo_endpoint() {
        let router = Router::new().route(
            "/tokeninfo",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                if params.get("id_token").map(String::as_str) == Some("good-token") {
                    Ok(Json(json!({
                        "sub": "42",
                        "email": "grace@example.com",
                        "exp": "9999999999",
                        "aud": "client-1",
                    })))
                } else {
                    Err(StatusCode::BAD_REQUEST)
                }
            }),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}/tokeninfo", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, router.into_make_service()).await.unwrap();
        });

        let http = reqwest::Client::builder().no_proxy().build().unwrap();

        let identity = verify_with_endpoint(&http, &endpoint, "good-token", Some("client-1"))
            .await
            .unwrap();
        assert_eq!(identity.sub, "42");
        assert_eq!(identity.profile.name, "grace@example.com");

        let err = verify_with_endpoint(&http, &endpoint, "bad-token", Some("client-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidToken(_)));
    }
}
