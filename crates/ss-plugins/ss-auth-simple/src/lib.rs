//! # ss-auth-simple
//!
//! Argon2-based implementation of `AuthProvider` for self-hosted setups.
//! Accounts and sessions live in memory; sign-up signs the user in
//! immediately since there is no mailer to confirm the address.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use ss_core::models::{AuthUser, OAuthProvider, Session, SignUpOutcome};
use ss_core::traits::AuthProvider;
use tracing::{debug, info};

struct Account {
    user: AuthUser,
    password_hash: String,
}

pub struct SimpleAuthProvider {
    /// Keyed by lower-cased email.
    accounts: DashMap<String, Account>,
    sessions: DashMap<String, Session>,
    session_ttl: Duration,
}

impl SimpleAuthProvider {
    pub fn new(session_ttl: Duration) -> Self {
        Self { accounts: DashMap::new(), sessions: DashMap::new(), session_ttl }
    }

    fn hash_password(password: &str) -> anyhow::Result<String> {
        let salt = SaltString::encode_b64(&rand::random::<[u8; 16]>())
            .map_err(|e| anyhow::anyhow!("salt generation failed: {e}"))?;
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("password hashing failed: {e}"))?;
        Ok(hash.to_string())
    }

    /// Verifies if a provided password matches a stored Argon2 hash.
    fn verify_password(password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(p) => p,
            Err(_) => return false,
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    fn open_session(&self, user: AuthUser) -> Session {
        let session = Session {
            access_token: hex::encode(rand::random::<[u8; 32]>()),
            user,
            expires_at: Some(Utc::now() + self.session_ttl),
        };
        self.sessions.insert(session.access_token.clone(), session.clone());
        session
    }
}

impl Default for SimpleAuthProvider {
    fn default() -> Self {
        Self::new(Duration::hours(24))
    }
}

#[async_trait]
impl AuthProvider for SimpleAuthProvider {
    async fn session(&self, access_token: &str) -> anyhow::Result<Option<Session>> {
        let Some(session) = self.sessions.get(access_token).map(|s| s.clone()) else {
            return Ok(None);
        };
        if session.expires_at.is_some_and(|at| at <= Utc::now()) {
            self.sessions.remove(access_token);
            debug!(user_id = %session.user.id, "Dropped expired session");
            return Ok(None);
        }
        Ok(Some(session))
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> anyhow::Result<Session> {
        let user = self
            .accounts
            .get(&email.to_lowercase())
            .filter(|account| Self::verify_password(password, &account.password_hash))
            .map(|account| account.user.clone())
            .ok_or_else(|| anyhow::anyhow!("Invalid login credentials"))?;
        info!(user_id = %user.id, "User signed in");
        Ok(self.open_session(user))
    }

    async fn sign_in_with_oauth(&self, provider: OAuthProvider, _redirect_to: &str) -> anyhow::Result<String> {
        anyhow::bail!("{} sign-in is not supported by the local auth provider", provider.as_str())
    }

    async fn sign_up(&self, email: &str, password: &str, full_name: &str) -> anyhow::Result<SignUpOutcome> {
        let key = email.to_lowercase();
        if self.accounts.contains_key(&key) {
            anyhow::bail!("User already registered");
        }
        let user = AuthUser {
            id: uuid::Uuid::new_v4().to_string(),
            email: email.to_string(),
            full_name: Some(full_name.to_string()).filter(|n| !n.is_empty()),
        };
        let password_hash = Self::hash_password(password)?;
        match self.accounts.entry(key) {
            Entry::Occupied(_) => anyhow::bail!("User already registered"),
            Entry::Vacant(slot) => {
                slot.insert(Account { user: user.clone(), password_hash });
            }
        }
        info!(user_id = %user.id, "Registered user");
        let session = self.open_session(user.clone());
        Ok(SignUpOutcome { user, session: Some(session) })
    }

    async fn sign_out(&self, access_token: &str) -> anyhow::Result<()> {
        self.sessions.remove(access_token);
        Ok(())
    }
}
