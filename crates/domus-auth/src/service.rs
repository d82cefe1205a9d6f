//! Authentication service — registration, login and session
//! verification.

use chrono::Duration;
use domus_core::clock::Clock;
use domus_core::error::{DomusError, DomusResult};
use domus_core::models::session::CreateSession;
use domus_core::models::user::{CreateUser, Principal, Role, UpdateUser, User};
use domus_core::repository::{SessionRepository, UserRepository};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;
use crate::token;

/// Input for the registration flow.
#[derive(Debug)]
pub struct RegisterInput {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Input for the login flow.
#[derive(Debug)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
    pub ip: Option<String>,
    pub device_info: Option<String>,
}

/// Successful login result.
#[derive(Debug)]
pub struct LoginOutput {
    /// Raw opaque session token (return to client, not stored).
    pub token: String,
    /// Session ID (can be used for logout).
    pub session_id: Uuid,
    /// Session lifetime in seconds.
    pub expires_in: u64,
}

/// Authentication service.
///
/// Generic over repository implementations so that the auth layer has
/// no dependency on the database crate. The clock is injected because
/// session expiry is time-driven.
pub struct AuthService<U: UserRepository, S: SessionRepository, K: Clock> {
    user_repo: U,
    session_repo: S,
    clock: K,
    config: AuthConfig,
}

impl<U: UserRepository, S: SessionRepository, K: Clock> AuthService<U, S, K> {
    pub fn new(user_repo: U, session_repo: S, clock: K, config: AuthConfig) -> Self {
        Self {
            user_repo,
            session_repo,
            clock,
            config,
        }
    }

    fn session_lifetime(&self) -> Duration {
        Duration::seconds(self.config.session_lifetime_secs as i64)
    }

    /// Register a new account.
    ///
    /// The email must be unused and the password must satisfy the
    /// minimum length policy. Only the Argon2id hash is persisted.
    pub async fn register(&self, input: RegisterInput) -> DomusResult<User> {
        if input.password.len() < self.config.min_password_length {
            return Err(AuthError::WeakPassword {
                min: self.config.min_password_length,
            }
            .into());
        }

        match self.user_repo.get_by_email(&input.email).await {
            Ok(_) => {
                return Err(DomusError::conflict(format!(
                    "email already registered: {}",
                    input.email
                )));
            }
            Err(DomusError::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }

        let password_hash =
            password::hash_password(&input.password, self.config.pepper.as_deref())?;

        let user = self
            .user_repo
            .create(CreateUser {
                name: input.name,
                surname: input.surname,
                email: input.email,
                password_hash,
                role: input.role,
            })
            .await?;

        info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Authenticate with email + password and open a session.
    pub async fn login(&self, input: LoginInput) -> DomusResult<LoginOutput> {
        let user = self
            .user_repo
            .get_by_email(&input.email)
            .await
            .map_err(|_| AuthError::InvalidCredentials)?;

        let valid = password::verify_password(
            &input.password,
            &user.password_hash,
            self.config.pepper.as_deref(),
        )?;
        if !valid {
            return Err(AuthError::InvalidCredentials.into());
        }

        let raw_token = token::generate_session_token();
        let token_hash = token::hash_session_token(&raw_token);
        let expires_at = self.clock.now() + self.session_lifetime();

        let session = self
            .session_repo
            .create(CreateSession {
                user_id: user.id,
                token_hash,
                ip: input.ip,
                device_info: input.device_info,
                expires_at,
            })
            .await?;

        info!(user_id = %user.id, session_id = %session.id, "login successful");
        Ok(LoginOutput {
            token: raw_token,
            session_id: session.id,
            expires_in: self.config.session_lifetime_secs,
        })
    }

    /// Resolve a raw bearer token into the acting principal.
    ///
    /// Expired sessions are deleted on sight. A live session has its
    /// expiry slid forward by the configured lifetime.
    pub async fn authenticate(&self, raw_token: &str) -> DomusResult<Principal> {
        let token_hash = token::hash_session_token(raw_token);
        let session = self
            .session_repo
            .get_by_token_hash(&token_hash)
            .await
            .map_err(|_| AuthError::TokenInvalid)?;

        let now = self.clock.now();
        if session.expires_at <= now {
            debug!(session_id = %session.id, "session expired, removing");
            self.session_repo.delete(session.id).await?;
            return Err(AuthError::SessionExpired.into());
        }

        self.session_repo
            .touch(session.id, now, now + self.session_lifetime())
            .await?;

        let user = self.user_repo.get_by_id(session.user_id).await?;
        Ok(Principal::from(&user))
    }

    /// Close the session behind a raw bearer token.
    pub async fn logout(&self, raw_token: &str) -> DomusResult<()> {
        let token_hash = token::hash_session_token(raw_token);
        let session = self
            .session_repo
            .get_by_token_hash(&token_hash)
            .await
            .map_err(|_| AuthError::TokenInvalid)?;
        self.session_repo.delete(session.id).await?;
        info!(session_id = %session.id, "logout");
        Ok(())
    }

    /// Close every session of a user. Returns the number closed.
    pub async fn logout_all(&self, user_id: Uuid) -> DomusResult<u64> {
        self.session_repo.delete_for_user(user_id).await
    }

    /// Change a password after verifying the current one. All existing
    /// sessions are invalidated.
    pub async fn change_password(
        &self,
        user_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> DomusResult<()> {
        if new_password.len() < self.config.min_password_length {
            return Err(AuthError::WeakPassword {
                min: self.config.min_password_length,
            }
            .into());
        }

        let user = self.user_repo.get_by_id(user_id).await?;
        let valid = password::verify_password(
            current_password,
            &user.password_hash,
            self.config.pepper.as_deref(),
        )?;
        if !valid {
            return Err(AuthError::InvalidCredentials.into());
        }

        let password_hash =
            password::hash_password(new_password, self.config.pepper.as_deref())?;
        self.user_repo
            .update(
                user_id,
                UpdateUser {
                    name: None,
                    surname: None,
                    password_hash: Some(password_hash),
                },
            )
            .await?;

        let closed = self.session_repo.delete_for_user(user_id).await?;
        info!(user_id = %user_id, closed, "password changed, sessions invalidated");
        Ok(())
    }

    /// Update the caller's own name and surname.
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        name: Option<String>,
        surname: Option<String>,
    ) -> DomusResult<User> {
        self.user_repo
            .update(
                user_id,
                UpdateUser {
                    name,
                    surname,
                    password_hash: None,
                },
            )
            .await
    }

    /// Remove sessions whose expiry has passed. Returns the number
    /// removed.
    pub async fn cleanup_expired(&self) -> DomusResult<u64> {
        self.session_repo.cleanup_expired(self.clock.now()).await
    }
}
