//! Sign-in sessions for the two consoles
//!
//! Credentials are a literal match against configuration. A successful
//! sign-in issues a random v4 UUID token; the token is all a request
//! carries. Each console keeps its token in its own cookie, so one browser
//! can hold a user and an admin session at the same time.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cashora_config::AuthConfig;

use crate::error::{CoreError, CoreResult, DefaultErrorLogger, ErrorContext, ErrorLogger};
use crate::types::Role;

/// A signed-in console
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub role: Role,
    pub email: String,
    pub started_at: DateTime<Utc>,
}

/// Issued sessions, keyed by token
#[derive(Debug)]
pub struct SessionStore {
    auth: AuthConfig,
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn new(auth: AuthConfig) -> Self {
        Self {
            auth,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Cookie carrying the token of a console: the configured prefix plus the role
    pub fn cookie_name(&self, role: Role) -> String {
        format!("{}_{}", self.auth.cookie_name, role)
    }

    /// Check the pair against the role's credentials and open a session
    pub fn sign_in(&self, role: Role, email: &str, password: &str) -> CoreResult<Session> {
        let credentials = match role {
            Role::User => &self.auth.user,
            Role::Admin => &self.auth.admin,
        };

        if !credentials.matches(email.trim(), password) {
            let error = CoreError::InvalidCredentials;
            let context = ErrorContext::new(format!("{} sign-in", role))
                .with_user_id(email.trim().to_string());
            DefaultErrorLogger.log_refusal(&error, &context);
            return Err(error);
        }

        let session = Session {
            token: Uuid::new_v4().to_string(),
            role,
            email: credentials.email.clone(),
            started_at: Utc::now(),
        };
        self.sessions
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(session.token.clone(), session.clone());

        log::info!("{} signed in to the {} console", session.email, role);
        Ok(session)
    }

    pub fn resolve(&self, token: &str) -> Option<Session> {
        self.sessions
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(token)
            .cloned()
    }

    /// Resolve a token and require the given role
    pub fn authorize(&self, token: Option<&str>, role: Role) -> CoreResult<Session> {
        token
            .and_then(|t| self.resolve(t))
            .filter(|s| s.role == role)
            .ok_or(CoreError::Unauthorized)
    }

    /// Drop the session; unknown tokens are ignored
    pub fn sign_out(&self, token: &str) -> bool {
        let removed = self
            .sessions
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(token);
        if let Some(ref session) = removed {
            log::info!("{} signed out of the {} console", session.email, session.role);
        }
        removed.is_some()
    }

    pub fn active_count(&self) -> usize {
        self.sessions.read().unwrap_or_else(|e| e.into_inner()).len()
    }
}
