//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for sign-up, sign-in and sign-out.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use chrono::{Duration, Utc};
use painting_order_core::{Identity, PortError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::web::middleware::session_context;
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[validate(length(min = 2, message = "name must be at least 2 characters"))]
    pub full_name: String,
    #[validate(email(message = "invalid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,
}

#[derive(Deserialize, Validate, ToSchema)]
pub struct SigninRequest {
    #[validate(email(message = "invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user_id: Uuid,
    pub email: String,
}

impl SignupRequest {
    fn normalized(self) -> Self {
        Self {
            full_name: self.full_name.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            password: self.password,
        }
    }
}

impl SigninRequest {
    fn normalized(self) -> Self {
        Self {
            email: self.email.trim().to_lowercase(),
            password: self.password,
        }
    }
}

fn validate(req: &impl Validate) -> ApiResult<()> {
    req.validate()
        .map_err(|e| ApiError::Validation(e.to_string()))
}

//=========================================================================================
// Session Cookie Helpers
//=========================================================================================

async fn open_auth_session(state: &AppState, user_id: Uuid) -> ApiResult<String> {
    let auth_session_id = Uuid::new_v4().to_string();
    let ttl = Duration::days(state.config.session_ttl_days);

    state
        .accounts
        .create_auth_session(&auth_session_id, user_id, Utc::now() + ttl)
        .await
        .map_err(|e| {
            error!("Failed to create auth session: {:?}", e);
            ApiError::from(e)
        })?;

    Ok(format!(
        "session={}; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age={}",
        auth_session_id,
        ttl.num_seconds()
    ))
}

const CLEARED_COOKIE: &str = "session=; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age=0";

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/signup - Create a new account and sign in
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid name, email or password"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignupRequest>,
) -> ApiResult<impl IntoResponse> {
    let req = req.normalized();
    validate(&req)?;

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| {
            error!("Failed to hash password: {:?}", e);
            ApiError::Internal("failed to hash password".to_string())
        })?
        .to_string();

    let identity = state
        .accounts
        .create_user(&req.full_name, &req.email, &password_hash)
        .await?;
    let cookie = open_auth_session(&state, identity.user_id).await?;
    info!("New account {} created.", identity.user_id);

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse {
            user_id: identity.user_id,
            email: identity.email.unwrap_or(req.email),
        }),
    ))
}

/// POST /auth/signin - Sign in with an existing account
#[utoipa::path(
    post,
    path = "/auth/signin",
    request_body = SigninRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 400, description = "Malformed email or missing password"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn signin_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SigninRequest>,
) -> ApiResult<impl IntoResponse> {
    let req = req.normalized();
    validate(&req)?;

    let credentials = state
        .accounts
        .get_credentials_by_email(&req.email)
        .await
        .map_err(|e| match e {
            PortError::NotFound(_) => ApiError::Port(PortError::Unauthorized),
            other => ApiError::Port(other),
        })?;

    let parsed_hash = PasswordHash::new(&credentials.hashed_password).map_err(|e| {
        error!("Failed to parse password hash: {:?}", e);
        ApiError::Internal("authentication error".to_string())
    })?;
    if Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(ApiError::Port(PortError::Unauthorized));
    }

    let cookie = open_auth_session(&state, credentials.user_id).await?;

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse {
            user_id: credentials.user_id,
            email: credentials.email,
        }),
    ))
}

/// POST /auth/signout - End the session
#[utoipa::path(
    post,
    path = "/auth/signout",
    responses(
        (status = 200, description = "Signed out"),
        (status = 401, description = "No active session")
    )
)]
pub async fn signout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    let context = session_context(&state, &headers);
    if context.current_user().await?.is_none() {
        return Err(ApiError::Port(PortError::Unauthorized));
    }
    context.sign_out().await?;

    Ok((StatusCode::OK, [(header::SET_COOKIE, CLEARED_COOKIE.to_string())]))
}

/// GET /auth/me - The signed-in identity
#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Current user", body = AuthResponse),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn me_handler(Extension(identity): Extension<Identity>) -> Json<AuthResponse> {
    Json(AuthResponse {
        user_id: identity.user_id,
        email: identity.email.unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signup_rules_apply_after_trimming() {
        let req = SignupRequest {
            full_name: "  A ".to_string(),
            email: " Sara@Example.com ".to_string(),
            password: "secret1".to_string(),
        }
        .normalized();
        assert_eq!(req.email, "sara@example.com");
        assert!(validate(&req).is_err(), "one-letter name must be rejected");

        let ok = SignupRequest {
            full_name: "Sara".to_string(),
            ..req
        };
        assert!(validate(&ok).is_ok());
    }

    #[test]
    fn short_password_and_bad_email_are_rejected() {
        let short = SignupRequest {
            full_name: "Sara".to_string(),
            email: "sara@example.com".to_string(),
            password: "12345".to_string(),
        };
        assert!(validate(&short).is_err());

        let bad_email = SigninRequest {
            email: "not-an-email".to_string(),
            password: "x".to_string(),
        };
        assert!(validate(&bad_email).is_err());

        let empty_password = SigninRequest {
            email: "sara@example.com".to_string(),
            password: String::new(),
        };
        assert!(validate(&empty_password).is_err());
    }
}
