//! User directory: account administration, authentication and operator lookup.

use tracing::{debug, info};

use realprint_core::{DomainError, DomainResult, EntityVec, ServiceKind, UserId};

use crate::credentials::Credential;
use crate::session::{LoginOutcome, SessionUser};
use crate::user::{NewUser, User, UserPatch};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserDirectory {
    users: EntityVec<User>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_users(users: EntityVec<User>) -> Self {
        Self { users }
    }

    pub fn users(&self) -> &EntityVec<User> {
        &self.users
    }

    pub fn user(&self, id: UserId) -> Option<&User> {
        self.users.get(&id)
    }

    pub fn active_count(&self) -> usize {
        self.users.iter().filter(|u| u.active).count()
    }

    /// Create an active account; usernames are unique.
    pub fn create_user(&mut self, spec: NewUser) -> DomainResult<User> {
        let username = spec.username.trim().to_string();
        validate_username(&username)?;
        validate_email(&spec.email)?;
        self.ensure_username_free(&username, None)?;

        let user = User {
            id: UserId::new(),
            username,
            credential: Credential::hash(&spec.password)?,
            name: spec.name,
            email: spec.email.trim().to_lowercase(),
            role: spec.role,
            active: true,
        };
        info!(user_id = %user.id, role = ?user.role.kind(), "user created");
        self.users.push(user.clone());
        Ok(user)
    }

    /// Shallow merge; `Ok(None)` when the user does not exist.
    pub fn update_user(&mut self, id: UserId, patch: UserPatch) -> DomainResult<Option<User>> {
        if !self.users.contains(&id) {
            return Ok(None);
        }
        let username = match patch.username {
            Some(name) => {
                let name = name.trim().to_string();
                validate_username(&name)?;
                self.ensure_username_free(&name, Some(id))?;
                Some(name)
            }
            None => None,
        };
        if let Some(email) = &patch.email {
            validate_email(email)?;
        }
        let credential = patch.password.as_deref().map(Credential::hash).transpose()?;

        let Some(user) = self.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(username) = username {
            user.username = username;
        }
        if let Some(credential) = credential {
            user.credential = credential;
        }
        if let Some(name) = patch.name {
            user.name = name;
        }
        if let Some(email) = patch.email {
            user.email = email.trim().to_lowercase();
        }
        if let Some(role) = patch.role {
            user.role = role;
        }
        if let Some(active) = patch.active {
            user.active = active;
        }
        Ok(Some(user.clone()))
    }

    pub fn set_active(&mut self, id: UserId, active: bool) -> Option<User> {
        let user = self.users.get_mut(&id)?;
        user.active = active;
        info!(user_id = %id, active, "user activation changed");
        Some(user.clone())
    }

    /// Flip the active flag (the dashboard's enable/disable switch).
    pub fn toggle_active(&mut self, id: UserId) -> Option<User> {
        let active = !self.users.get(&id)?.active;
        self.set_active(id, active)
    }

    pub fn delete_user(&mut self, id: UserId) -> Option<User> {
        self.users.remove(&id)
    }

    /// Exact username + password match against an active account.
    pub fn authenticate(&self, username: &str, password: &str) -> LoginOutcome {
        let found = self
            .users
            .iter()
            .find(|u| u.active && u.username == username && u.credential.verify(password));
        match found {
            Some(user) => {
                info!(user_id = %user.id, "login succeeded");
                LoginOutcome::granted(SessionUser::from(user))
            }
            None => {
                debug!(username, "login rejected");
                LoginOutcome::denied()
            }
        }
    }

    /// First active operator (in directory order) specialised in `service`.
    pub fn first_operator_for(&self, service: ServiceKind) -> Option<&User> {
        self.users.iter().find(|u| u.handles(service))
    }

    fn ensure_username_free(&self, username: &str, except: Option<UserId>) -> DomainResult<()> {
        let taken = self
            .users
            .iter()
            .any(|u| u.username == username && Some(u.id) != except);
        if taken {
            return Err(DomainError::conflict(format!("username {username:?} already exists")));
        }
        Ok(())
    }
}

fn validate_username(username: &str) -> DomainResult<()> {
    if username.is_empty() {
        return Err(DomainError::validation("username cannot be empty"));
    }
    Ok(())
}

fn validate_email(email: &str) -> DomainResult<()> {
    if email.trim().is_empty() || !email.contains('@') {
        return Err(DomainError::validation("invalid email format"));
    }
    Ok(())
}
