//! Credential sign-in
//!
//! Two layers:
//! - [`CredentialsProvider`] checks an email/password pair against the
//!   stored bcrypt digest. An unknown email and a wrong password give the
//!   same answer, `Ok(None)`.
//! - [`Authenticator`] turns a successful check into a [`Session`] and maps
//!   failure categories to the message the sign-in form shows.
//!
//! Storage faults are never reported as authentication failures; they
//! propagate as [`StorageError::FetchUser`].

use std::sync::{Arc, OnceLock};
use uuid::Uuid;

use crate::core::error::{AppError, AppResult, AuthError, StorageError};
use crate::core::session::{Session, SessionStore};
use crate::core::store::UserStore;
use crate::core::user::User;
use crate::core::validation::CredentialsForm;

pub const INVALID_CREDENTIALS_MESSAGE: &str = "invalid credentials";
pub const GENERIC_AUTH_MESSAGE: &str = "something went wrong";

const DUMMY_PASSWORD: &str = "invoicer-timing-equaliser";
const DUMMY_COST: u32 = 10;

/// Authorization context extracted from a request
#[derive(Debug, Clone, PartialEq)]
pub enum AuthContext {
    /// Signed-in user
    User { user_id: String, email: String },

    /// No valid session
    Anonymous,
}

impl AuthContext {
    pub fn is_authenticated(&self) -> bool {
        !matches!(self, AuthContext::Anonymous)
    }

    pub fn email(&self) -> Option<&str> {
        match self {
            AuthContext::User { email, .. } => Some(email),
            AuthContext::Anonymous => None,
        }
    }
}

impl From<&Session> for AuthContext {
    fn from(session: &Session) -> Self {
        AuthContext::User {
            user_id: session.user_id.clone(),
            email: session.email.clone(),
        }
    }
}

/// Checks submitted credentials against stored users
#[derive(Clone)]
pub struct CredentialsProvider {
    users: Arc<dyn UserStore>,
}

impl CredentialsProvider {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Return the user when the credentials match, `None` otherwise
    ///
    /// Malformed credentials (bad email, password under 6 characters) are
    /// rejected before any lookup.
    pub async fn authorize(&self, credentials: &CredentialsForm) -> AppResult<Option<User>> {
        if credentials.safe_parse().is_err() {
            return Ok(None);
        }

        let Some(user) = self.get_user(&credentials.email).await? else {
            // Spend the same bcrypt work as a real comparison
            if let Some(dummy) = dummy_hash() {
                password_matches(&credentials.password, dummy).await;
            }
            return Ok(None);
        };

        if password_matches(&credentials.password, &user.password).await {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    async fn get_user(&self, email: &str) -> Result<Option<User>, StorageError> {
        self.users.find_by_email(email).await.map_err(|e| {
            tracing::error!(error = %e, "failed to fetch user");
            StorageError::FetchUser {
                message: e.to_string(),
            }
        })
    }
}

/// bcrypt comparison on the blocking pool; any error counts as a mismatch
async fn password_matches(password: &str, hash: &str) -> bool {
    let password = password.to_string();
    let hash = hash.to_string();
    match tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await {
        Ok(Ok(matches)) => matches,
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "stored password hash could not be verified");
            false
        }
        Err(e) => {
            tracing::error!(error = %e, "password verification task failed");
            false
        }
    }
}

fn dummy_hash() -> Option<&'static str> {
    static DUMMY: OnceLock<Option<String>> = OnceLock::new();
    DUMMY
        .get_or_init(|| bcrypt::hash(DUMMY_PASSWORD, DUMMY_COST).ok())
        .as_deref()
}

/// Result of the sign-in form action
#[derive(Debug, Clone, PartialEq)]
pub enum AuthOutcome {
    /// Credentials accepted; the caller sets the session cookie and redirects
    SignedIn(Session),
    /// Credentials refused; the message is shown on the form
    Rejected(&'static str),
}

/// Sign-in, sign-out and session lookup
#[derive(Clone)]
pub struct Authenticator {
    provider: CredentialsProvider,
    sessions: Arc<dyn SessionStore>,
}

impl Authenticator {
    pub fn new(users: Arc<dyn UserStore>, sessions: Arc<dyn SessionStore>) -> Self {
        Self {
            provider: CredentialsProvider::new(users),
            sessions,
        }
    }

    /// Verify credentials and issue a session
    ///
    /// Errors are `AppError::Auth` for recognised authentication failures;
    /// anything else is a fault of another kind.
    pub async fn sign_in(&self, credentials: &CredentialsForm) -> AppResult<Session> {
        let user = self
            .provider
            .authorize(credentials)
            .await?
            .ok_or(AuthError::CredentialsSignin)?;

        let session = self
            .sessions
            .issue(&user)
            .await
            .map_err(|e| AuthError::SessionUnavailable {
                message: e.to_string(),
            })?;

        tracing::info!(user_id = %user.id, "user signed in");
        Ok(session)
    }

    /// The sign-in form action
    ///
    /// `_previous` is the message the form currently shows; it does not
    /// influence the result.
    pub async fn authenticate(
        &self,
        _previous: Option<&str>,
        credentials: &CredentialsForm,
    ) -> AppResult<AuthOutcome> {
        match self.sign_in(credentials).await {
            Ok(session) => Ok(AuthOutcome::SignedIn(session)),
            Err(AppError::Auth(AuthError::CredentialsSignin)) => {
                tracing::info!("sign-in refused");
                Ok(AuthOutcome::Rejected(INVALID_CREDENTIALS_MESSAGE))
            }
            Err(AppError::Auth(e)) => {
                tracing::warn!(error = %e, "sign-in failed");
                Ok(AuthOutcome::Rejected(GENERIC_AUTH_MESSAGE))
            }
            Err(other) => Err(other),
        }
    }

    /// Revoke the session behind `token`
    pub async fn sign_out(&self, token: &Uuid) -> AppResult<()> {
        self.sessions
            .revoke(token)
            .await
            .map_err(|e| AuthError::SessionUnavailable {
                message: e.to_string(),
            })?;
        Ok(())
    }

    /// Resolve the auth context for a session token, if any
    pub async fn context(&self, token: Option<Uuid>) -> AppResult<AuthContext> {
        let Some(token) = token else {
            return Ok(AuthContext::Anonymous);
        };
        let session = self
            .sessions
            .get(&token)
            .await
            .map_err(|e| AuthError::SessionUnavailable {
                message: e.to_string(),
            })?;
        Ok(session
            .as_ref()
            .map(AuthContext::from)
            .unwrap_or(AuthContext::Anonymous))
    }
}
