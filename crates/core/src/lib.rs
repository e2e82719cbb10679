//! `realprint-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod entity;
pub mod error;
pub mod id;
pub mod service;
pub mod value_object;

pub use entity::{Entity, EntityVec};
pub use error::{DomainError, DomainResult};
pub use id::{FinalProductId, InventoryItemId, OrderId, TaskId, UserId};
pub use service::ServiceKind;
pub use value_object::Money;
