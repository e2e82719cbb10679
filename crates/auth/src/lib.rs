//! `realprint-auth`: user accounts, credentials and sign-in.
//!
//! Storage-free: the ledger persists the directory and the session snapshot.

pub mod credentials;
pub mod directory;
pub mod session;
pub mod user;

pub use credentials::Credential;
pub use directory::UserDirectory;
pub use session::{INVALID_CREDENTIALS, LoginOutcome, Session, SessionUser};
pub use user::{NewUser, Role, RoleKind, User, UserPatch};
