use anyhow::anyhow;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{Duration, SecondsFormat, Utc};
use rand_core::OsRng;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::commands::auth::SignUpCommand;
use super::error::{DomainError, DomainResult};
use super::models::now_timestamp;
use super::models::user::{Session, User};
use super::validation::{normalize_optional, Validator};
use crate::storage::UserStorage;

const MIN_PASSWORD_LEN: usize = 8;
const INVALID_CREDENTIALS: &str = "Invalid email or password.";

/// Console accounts and bearer-token sessions
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStorage>,
    session_ttl: Duration,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStorage>, session_ttl: Duration) -> Self {
        Self { users, session_ttl }
    }

    /// Create an account and open a session for it
    pub async fn sign_up(&self, command: SignUpCommand) -> DomainResult<(User, Session)> {
        let email = command.email.trim().to_lowercase();
        let mut v = Validator::new();
        if email.is_empty() {
            v.push("email", "Email is required.");
        } else {
            v.email("email", Some(&email));
        }
        if command.password.chars().count() < MIN_PASSWORD_LEN {
            v.push("password", format!("Password must be at least {} characters.", MIN_PASSWORD_LEN));
        }
        v.finish()?;

        let user = User {
            id: Uuid::new_v4().to_string(),
            email,
            display_name: normalize_optional(command.display_name),
            password_hash: hash_password(&command.password)?,
            created_at: now_timestamp(),
        };
        self.users.insert_user(&user).await?;
        info!("Created account {} ({})", user.id, user.email);

        let session = self.open_session(&user).await?;
        Ok((user, session))
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> DomainResult<(User, Session)> {
        let email = email.trim().to_lowercase();
        let Some(user) = self.users.find_user_by_email(&email).await? else {
            warn!("Sign-in failed for unknown account {}", email);
            return Err(DomainError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        };

        if !verify_password(password, &user.password_hash)? {
            warn!("Sign-in failed for {}: wrong password", email);
            return Err(DomainError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let session = self.open_session(&user).await?;
        Ok((user, session))
    }

    /// Drop a session. Unknown tokens are ignored.
    pub async fn sign_out(&self, token: &str) -> DomainResult<()> {
        if self.users.delete_session(token).await? {
            info!("Signed out session");
        }
        Ok(())
    }

    /// Resolve a bearer token to its user. Expired sessions resolve to none.
    pub async fn current_user(&self, token: &str) -> DomainResult<Option<User>> {
        let Some(session) = self.users.get_session(token).await? else {
            return Ok(None);
        };

        if session.expires_at <= now_timestamp() {
            let purged = self.users.delete_expired_sessions(&now_timestamp()).await?;
            info!("Session expired; purged {} stale sessions", purged);
            return Ok(None);
        }

        Ok(self.users.get_user(&session.user_id).await?)
    }

    /// Create the first account from configuration. Does nothing once any
    /// account exists.
    pub async fn bootstrap_admin(&self, email: &str, password: &str) -> DomainResult<Option<User>> {
        if self.users.count_users().await? > 0 {
            info!("Accounts already exist, skipping admin bootstrap");
            return Ok(None);
        }

        let (user, session) = self
            .sign_up(SignUpCommand {
                email: email.to_string(),
                password: password.to_string(),
                display_name: Some("Admin".to_string()),
            })
            .await?;
        self.users.delete_session(&session.token).await?;

        info!("👤 AUTH: Bootstrapped admin account {}", user.email);
        Ok(Some(user))
    }

    async fn open_session(&self, user: &User) -> DomainResult<Session> {
        let now = Utc::now();
        let session = Session {
            token: Uuid::new_v4().to_string(),
            user_id: user.id.clone(),
            expires_at: (now + self.session_ttl).to_rfc3339_opts(SecondsFormat::Millis, true),
            created_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        };
        self.users.insert_session(&session).await?;
        info!("👤 AUTH: Session opened for {} until {}", user.email, session.expires_at);
        Ok(session)
    }
}

fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| anyhow!("argon2 hash failed: {}", err))?
        .to_string();
    Ok(hash)
}

fn verify_password(password: &str, stored: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(stored).map_err(|err| anyhow!("stored password hash is invalid: {}", err))?;
    Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
}
