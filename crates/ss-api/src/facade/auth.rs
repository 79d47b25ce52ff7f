use super::{require, StyleSync};
use serde_json::json;
use ss_core::error::{AppError, Result};
use ss_core::models::{OAuthProvider, Session, SignUpOutcome, SignUpRequest};
use ss_core::query::Table;
use tracing::{info, warn};

pub const MIN_PASSWORD_LEN: usize = 6;

pub struct AuthApi<'a> {
    pub(super) app: &'a StyleSync,
}

impl AuthApi<'_> {
    /// The session behind `access_token`, `None` when it is unknown or expired.
    pub async fn session(&self, access_token: &str) -> Result<Option<Session>> {
        self.app
            .ports
            .auth
            .session(access_token)
            .await
            .map_err(|e| AppError::RemoteUnavailable(format!("{e:#}")))
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        require("email", email)?;
        require("password", password)?;
        let session = self
            .app
            .ports
            .auth
            .sign_in_with_password(email.trim(), password)
            .await
            .map_err(|e| AppError::Unauthorized(format!("{e:#}")))?;
        info!(user_id = %session.user.id, "Signed in");
        Ok(session)
    }

    /// Returns the provider URL the user must visit to finish signing in.
    pub async fn sign_in_with_provider(&self, provider: OAuthProvider, redirect_to: &str) -> Result<String> {
        self.app
            .ports
            .auth
            .sign_in_with_oauth(provider, redirect_to)
            .await
            .map_err(|e| AppError::Unauthorized(format!("{e:#}")))
    }

    /// Registers a user and, best effort, creates their profile row.
    pub async fn sign_up(&self, request: SignUpRequest) -> Result<SignUpOutcome> {
        validate_sign_up(&request)?;
        let email = request.email.trim();
        let full_name = request.full_name.trim();

        let outcome = self
            .app
            .ports
            .auth
            .sign_up(email, &request.password, full_name)
            .await
            .map_err(|e| AppError::Unauthorized(format!("{e:#}")))?;

        let profile = json!({ "id": outcome.user.id, "email": email, "full_name": full_name });
        if let Err(e) = self.app.ports.rows.insert(Table::Users, profile, &[]).await {
            warn!(user_id = %outcome.user.id, error = %format!("{e:#}"), "Profile row not created");
        }
        info!(user_id = %outcome.user.id, confirmed = outcome.session.is_some(), "Signed up");
        Ok(outcome)
    }

    pub async fn sign_out(&self, access_token: &str) -> Result<()> {
        self.app
            .ports
            .auth
            .sign_out(access_token)
            .await
            .map_err(|e| AppError::operation("sign out", e))
    }
}

pub fn validate_sign_up(request: &SignUpRequest) -> Result<()> {
    require("email", &request.email)?;
    require("password", &request.password)?;
    require("full name", &request.full_name)?;
    if request.password != request.confirm_password {
        return Err(AppError::validation("passwords do not match"));
    }
    if request.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}
