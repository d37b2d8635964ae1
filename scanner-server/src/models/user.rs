//! User model

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use validator::Validate;

use crate::{AppError, AppResult};

/// Fresh usernames tried before a first login gives up
const USERNAME_ATTEMPTS: usize = 5;

/// Default wallet type for principals coming from the identity provider
pub const DEFAULT_WALLET_TYPE: &str = "icp";

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub wallet_address: String,
    pub wallet_type: String,
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct WalletLoginRequest {
    #[validate(length(min = 1, max = 255))]
    pub wallet_address: String,
    #[validate(length(min = 1, max = 50))]
    pub wallet_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WalletLoginResponse {
    pub token: String,
    pub user: UserInfo,
    pub is_new_user: bool,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfile {
    #[validate(length(min = 1, max = 100))]
    pub display_name: Option<String>,
    #[validate(length(min = 3, max = 50))]
    pub username: Option<String>,
    #[validate(length(max = 1000))]
    pub bio: Option<String>,
    #[validate(url)]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    pub id: Uuid,
    pub wallet_address: String,
    pub wallet_type: String,
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
}

impl User {
    /// Random public handle: `user_` + 8 hex chars
    pub fn generate_username() -> String {
        format!("user_{}", &Uuid::new_v4().simple().to_string()[..8])
    }

    /// Look up the principal's user, creating it on first login.
    /// The flag is `true` only when this call created the row.
    pub async fn find_or_create(pool: &PgPool, wallet_address: &str, wallet_type: &str) -> AppResult<(Self, bool)> {
        Self::find_or_create_with(pool, wallet_address, wallet_type, Self::generate_username).await
    }

    async fn find_or_create_with(
        pool: &PgPool,
        wallet_address: &str,
        wallet_type: &str,
        mut next_username: impl FnMut() -> String,
    ) -> AppResult<(Self, bool)> {
        for _ in 0..USERNAME_ATTEMPTS {
            if let Some(user) = Self::find_by_wallet(pool, wallet_address).await? {
                return Ok((user, false));
            }
            if let Some(user) = Self::try_insert(pool, wallet_address, wallet_type, &next_username()).await? {
                return Ok((user, true));
            }
            // Conflict: either a concurrent login created this wallet, or the
            // generated username is taken. The next lookup tells them apart.
        }

        Err(AppError::InternalError(format!(
            "No free username after {} attempts",
            USERNAME_ATTEMPTS
        )))
    }

    async fn try_insert(
        pool: &PgPool,
        wallet_address: &str,
        wallet_type: &str,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (wallet_address, wallet_type, username)
            VALUES ($1, $2, $3)
            ON CONFLICT DO NOTHING
            RETURNING *
            "#
        )
        .bind(wallet_address)
        .bind(wallet_type)
        .bind(username)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_wallet(pool: &PgPool, wallet_address: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE wallet_address = $1")
            .bind(wallet_address)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn username_taken(pool: &PgPool, username: &str, except: Uuid) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1 AND id <> $2)")
            .bind(username)
            .bind(except)
            .fetch_one(pool)
            .await
    }

    /// Only fields present in the request change
    pub async fn update_profile(pool: &PgPool, id: Uuid, data: &UpdateProfile) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                display_name = COALESCE($2, display_name),
                username = COALESCE($3, username),
                bio = COALESCE($4, bio),
                avatar_url = COALESCE($5, avatar_url),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#
        )
        .bind(id)
        .bind(&data.display_name)
        .bind(&data.username)
        .bind(&data.bio)
        .bind(&data.avatar_url)
        .fetch_optional(pool)
        .await
    }

    pub fn to_info(&self) -> UserInfo {
        UserInfo {
            id: self.id,
            wallet_address: self.wallet_address.clone(),
            wallet_type: self.wallet_type.clone(),
            username: self.username.clone(),
            display_name: self.display_name.clone(),
            avatar_url: self.avatar_url.clone(),
            bio: self.bio.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::test_pool;
    use std::sync::Arc;

    #[test]
    fn test_generated_username_shape() {
        let name = User::generate_username();
        assert_eq!(name.len(), 13);
        assert!(name.starts_with("user_"));
        assert!(name[5..].chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(name, User::generate_username());
    }

    #[test]
    fn test_profile_validation() {
        let ok = UpdateProfile {
            display_name: Some("Alice".into()),
            username: None,
            bio: None,
            avatar_url: Some("https://cdn.example.com/a.png".into()),
        };
        assert!(ok.validate().is_ok());

        let bad = UpdateProfile {
            display_name: None,
            username: Some("ab".into()),
            bio: None,
            avatar_url: Some("not a url".into()),
        };
        let errors = bad.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("avatar_url"));
    }

    #[test]
    fn test_login_request_camel_case() {
        let req: WalletLoginRequest =
            serde_json::from_str(r#"{"walletAddress":"aaaaa-aa"}"#).unwrap();
        assert_eq!(req.wallet_address, "aaaaa-aa");
        assert!(req.wallet_type.is_none());
        assert!(req.validate().is_ok());

        let empty: WalletLoginRequest =
            serde_json::from_str(r#"{"walletAddress":""}"#).unwrap();
        assert!(empty.validate().is_err());
    }

    #[tokio::test]
    async fn test_concurrent_first_logins_share_one_user() {
        let Some(pool) = test_pool().await else { return };
        let wallet = Arc::new(format!("principal-{}", Uuid::new_v4()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let pool = pool.clone();
                let wallet = wallet.clone();
                tokio::spawn(async move { User::find_or_create(&pool, &wallet, "icp").await })
            })
            .collect();

        let mut ids = Vec::new();
        let mut created = 0;
        for handle in handles {
            let (user, is_new) = handle.await.unwrap().unwrap();
            if is_new {
                created += 1;
            }
            ids.push(user.id);
        }

        assert_eq!(created, 1);
        assert!(ids.iter().all(|id| *id == ids[0]));

        let (again, is_new) = User::find_or_create(&pool, &wallet, "icp").await.unwrap();
        assert!(!is_new);
        assert_eq!(again.id, ids[0]);
    }

    #[tokio::test]
    async fn test_username_collision_retries_with_fresh_name() {
        let Some(pool) = test_pool().await else { return };
        let (first, _) = User::find_or_create(&pool, &format!("principal-{}", Uuid::new_v4()), "icp")
            .await
            .unwrap();
        let taken = first.username.clone().unwrap();
        let fresh = User::generate_username();

        let mut names = vec![fresh.clone(), taken].into_iter();
        let wallet = format!("principal-{}", Uuid::new_v4());
        let (second, is_new) = User::find_or_create_with(&pool, &wallet, "icp", || {
            names.next_back().unwrap_or_else(User::generate_username)
        })
        .await
        .unwrap();

        assert!(is_new);
        assert_eq!(second.wallet_address, wallet);
        assert_eq!(second.username.as_deref(), Some(fresh.as_str()));
    }
}
