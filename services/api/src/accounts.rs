//! services/api/src/accounts.rs
//!
//! The account and auth-session store behind cookie authentication, and the
//! cookie-backed `IdentityProvider` handed to the ordering core.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use painting_order_core::{Identity, IdentityProvider, PortResult};
use std::sync::Arc;
use uuid::Uuid;

/// Only used internally for sign-in; contains the password hash.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id: Uuid,
    pub email: String,
    pub hashed_password: String,
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Fails with `PortError::Conflict` when the email is already registered.
    async fn create_user(
        &self,
        full_name: &str,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<Identity>;

    async fn get_credentials_by_email(&self, email: &str) -> PortResult<UserCredentials>;

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    /// Returns the identity behind an unexpired session, if any.
    async fn identity_for_session(&self, session_id: &str) -> PortResult<Option<Identity>>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;
}

/// Identity taken from the `session` cookie of one request.
pub struct CookieSession {
    accounts: Arc<dyn AccountStore>,
    session_id: Option<String>,
}

impl CookieSession {
    pub fn new(accounts: Arc<dyn AccountStore>, session_id: Option<String>) -> Self {
        Self {
            accounts,
            session_id,
        }
    }
}

#[async_trait]
impl IdentityProvider for CookieSession {
    async fn current_user(&self) -> PortResult<Option<Identity>> {
        match &self.session_id {
            Some(id) => self.accounts.identity_for_session(id).await,
            None => Ok(None),
        }
    }

    async fn sign_out(&self) -> PortResult<()> {
        match &self.session_id {
            Some(id) => self.accounts.delete_auth_session(id).await,
            None => Ok(()),
        }
    }
}

/// Extracts the auth session id from a `Cookie` header value.
pub fn session_id_from_cookie(cookie_header: &str) -> Option<&str> {
    cookie_header
        .split(';')
        .find_map(|c| c.trim().strip_prefix("session="))
        .filter(|id| !id.is_empty())
}
