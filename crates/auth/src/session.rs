//! Login outcome and the signed-in user snapshot.

use serde::{Deserialize, Serialize};

use realprint_core::UserId;

use crate::user::{RoleKind, User};

/// Message returned for every failed login, whatever the cause.
pub const INVALID_CREDENTIALS: &str = "Credenciales incorrectas";

/// What a session remembers about the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: UserId,
    pub username: String,
    pub name: String,
    pub role: RoleKind,
}

impl From<&User> for SessionUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            name: user.name.clone(),
            role: user.role.kind(),
        }
    }
}

/// Structured login result: `{success, user}` or `{success, error}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<SessionUser>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LoginOutcome {
    pub fn granted(user: SessionUser) -> Self {
        Self {
            success: true,
            user: Some(user),
            error: None,
        }
    }

    pub fn denied() -> Self {
        Self {
            success: false,
            user: None,
            error: Some(INVALID_CREDENTIALS.to_string()),
        }
    }
}

/// The currently signed-in user, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    current: Option<SessionUser>,
}

impl Session {
    pub fn restore(current: Option<SessionUser>) -> Self {
        Self { current }
    }

    pub fn current(&self) -> Option<&SessionUser> {
        self.current.as_ref()
    }

    /// Adopt the user of a successful outcome; a failed one leaves the session as is.
    pub fn apply(&mut self, outcome: &LoginOutcome) -> bool {
        match (&outcome.user, outcome.success) {
            (Some(user), true) => {
                self.current = Some(user.clone());
                true
            }
            _ => false,
        }
    }

    pub fn clear(&mut self) -> Option<SessionUser> {
        self.current.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denied_outcome_serializes_like_the_dashboard_expects() {
        let json = serde_json::to_value(LoginOutcome::denied()).unwrap();
        assert_eq!(json, serde_json::json!({ "success": false, "error": "Credenciales incorrectas" }));
    }

    #[test]
    fn failed_login_keeps_existing_session() {
        let existing = SessionUser {
            id: UserId::new(),
            username: "admin".into(),
            name: "Administrador".into(),
            role: RoleKind::Admin,
        };
        let mut session = Session::restore(Some(existing.clone()));
        assert!(!session.apply(&LoginOutcome::denied()));
        assert_eq!(session.current(), Some(&existing));
        assert_eq!(session.clear(), Some(existing));
        assert_eq!(session.current(), None);
    }
}
