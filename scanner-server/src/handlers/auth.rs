//! Authentication handlers
//!
//! Bridges the identity provider's principal to a `users` row and issues a
//! session JWT. The principal itself is trusted as delivered; verifying it
//! against the provider happens before this service.

use axum::{extract::State, http::{header::USER_AGENT, HeaderMap}, Json};
use jsonwebtoken::{encode, Header, EncodingKey};
use serde::{Deserialize, Serialize};
use chrono::{Utc, Duration};
use validator::Validate;

use crate::{AppState, AppError, AppResult};
use crate::middleware::auth::{client_ip, UserContext};
use crate::models::{User, UserInfo, WalletLoginRequest, WalletLoginResponse, WalletSession, DEFAULT_WALLET_TYPE};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,      // User ID
    pub wallet: String,   // Principal / wallet address
    pub exp: usize,       // Expiration timestamp
    pub iat: usize,       // Issued at
}

#[derive(Debug, Serialize)]
pub struct DisconnectResponse {
    pub closed_sessions: u64,
}

/// Wallet login: find-or-create the user, log a session, issue a JWT
pub async fn wallet_login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(mut req): Json<WalletLoginRequest>,
) -> AppResult<Json<WalletLoginResponse>> {
    req.wallet_address = req.wallet_address.trim().to_string();
    req.validate()?;

    let wallet_type = req.wallet_type.as_deref().unwrap_or(DEFAULT_WALLET_TYPE);

    let (user, is_new_user) = User::find_or_create(&state.pool, &req.wallet_address, wallet_type).await?;
    if is_new_user {
        tracing::info!("New user registered: {} ({})", user.id, wallet_type);
    }

    // Session log failures must not block login
    let ip = client_ip(&headers);
    let user_agent = headers.get(USER_AGENT).and_then(|v| v.to_str().ok());
    if let Err(e) = WalletSession::start(&state.pool, user.id, &user.wallet_address, ip.as_deref(), user_agent).await {
        tracing::warn!("Failed to record wallet session for {}: {}", user.id, e);
    }

    let token = generate_jwt(&user, &state.config.jwt_secret, state.config.jwt_expiration_hours)?;

    Ok(Json(WalletLoginResponse {
        token,
        user: user.to_info(),
        is_new_user,
    }))
}

/// Silent session restore
pub async fn session(
    State(state): State<AppState>,
    user: UserContext,
) -> AppResult<Json<UserInfo>> {
    let user = User::find_by_id(&state.pool, user.user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    Ok(Json(user.to_info()))
}

/// Explicit disconnect: close open session rows
pub async fn disconnect(
    State(state): State<AppState>,
    user: UserContext,
) -> AppResult<Json<DisconnectResponse>> {
    let closed_sessions = WalletSession::end_open(&state.pool, user.user_id).await?;

    tracing::info!("User {} disconnected ({} sessions closed)", user.user_id, closed_sessions);

    Ok(Json(DisconnectResponse { closed_sessions }))
}

/// Generate JWT token
pub fn generate_jwt(user: &User, secret: &str, expiration_hours: u64) -> AppResult<String> {
    let now = Utc::now();
    let exp = now + Duration::hours(expiration_hours as i64);

    let claims = Claims {
        sub: user.id.to_string(),
        wallet: user.wallet_address.clone(),
        exp: exp.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes())
    ).map_err(|e| AppError::InternalError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::auth::decode_user_context;
    use uuid::Uuid;

    fn user() -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            wallet_address: "rrkah-fqaaa-aaaaa-aaaaq-cai".to_string(),
            wallet_type: "icp".to_string(),
            username: Some("user_0badf00d".to_string()),
            display_name: None,
            avatar_url: None,
            bio: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_jwt_round_trip() {
        let user = user();
        let token = generate_jwt(&user, "secret", 1).unwrap();

        let ctx = decode_user_context(&token, "secret").unwrap();
        assert_eq!(ctx.user_id, user.id);
        assert_eq!(ctx.wallet_address, user.wallet_address);
    }

    #[test]
    fn test_jwt_wrong_secret_rejected() {
        let token = generate_jwt(&user(), "secret", 1).unwrap();
        assert!(matches!(decode_user_context(&token, "other"), Err(AppError::TokenInvalid)));
    }

    #[test]
    fn test_jwt_expired_rejected() {
        let user = user();
        let past = Utc::now() - Duration::hours(2);
        let claims = Claims {
            sub: user.id.to_string(),
            wallet: user.wallet_address.clone(),
            exp: past.timestamp() as usize,
            iat: (past - Duration::hours(1)).timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(b"secret")).unwrap();

        assert!(matches!(decode_user_context(&token, "secret"), Err(AppError::TokenExpired)));
    }
}
