//! Sign-in sessions

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::core::user::User;

/// An issued session; `token` is what the cookie carries
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub token: Uuid,
    pub user_id: String,
    pub email: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session store lock poisoned")]
    Poisoned,

    #[error("session backend unavailable: {0}")]
    Backend(String),
}

/// Storage for sessions
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Issue a fresh session for `user`
    async fn issue(&self, user: &User) -> Result<Session, SessionError>;

    /// Look up a live session; expired sessions read as absent
    async fn get(&self, token: &Uuid) -> Result<Option<Session>, SessionError>;

    /// Revoke a session; revoking an unknown token is not an error
    async fn revoke(&self, token: &Uuid) -> Result<(), SessionError>;
}
