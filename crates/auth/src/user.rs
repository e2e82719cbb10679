//! User accounts.

use serde::{Deserialize, Serialize};

use realprint_core::{Entity, ServiceKind, UserId};

use crate::credentials::Credential;

/// Account role with its role-specific attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Role {
    Admin,
    Client {
        #[serde(default)]
        company: Option<String>,
    },
    /// Operators receive tasks for orders of their specialty.
    Operator { specialty: ServiceKind },
}

impl Role {
    pub fn kind(&self) -> RoleKind {
        match self {
            Role::Admin => RoleKind::Admin,
            Role::Client { .. } => RoleKind::Client,
            Role::Operator { .. } => RoleKind::Operator,
        }
    }

    pub fn specialty(&self) -> Option<ServiceKind> {
        match self {
            Role::Operator { specialty } => Some(*specialty),
            _ => None,
        }
    }
}

/// Role without attributes (what a session exposes).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleKind {
    Admin,
    Client,
    Operator,
}

/// Account record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub credential: Credential,
    pub name: String,
    pub email: String,
    #[serde(flatten)]
    pub role: Role,
    pub active: bool,
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl User {
    /// Active operator whose specialty is `service`.
    pub fn handles(&self, service: ServiceKind) -> bool {
        self.active && self.role.specialty() == Some(service)
    }
}

/// Input for `UserDirectory::create_user`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Shallow-merge edit of an account. A new password is re-hashed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub username: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_is_flattened_into_user_json() {
        let user = User {
            id: UserId::new(),
            username: "operario".into(),
            credential: Credential::hash("pw").unwrap(),
            name: "Operator".into(),
            email: "op@example.com".into(),
            role: Role::Operator { specialty: ServiceKind::Signage },
            active: true,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["role"], "operator");
        assert_eq!(json["specialty"], "signage");
        let back: User = serde_json::from_value(json).unwrap();
        assert_eq!(back, user);
    }

    #[test]
    fn inactive_operator_handles_nothing() {
        let mut user = User {
            id: UserId::new(),
            username: "op".into(),
            credential: Credential::hash("pw").unwrap(),
            name: "Op".into(),
            email: "op@example.com".into(),
            role: Role::Operator { specialty: ServiceKind::Screenprint },
            active: true,
        };
        assert!(user.handles(ServiceKind::Screenprint));
        assert!(!user.handles(ServiceKind::Signage));
        user.active = false;
        assert!(!user.handles(ServiceKind::Screenprint));
    }
}
