//! Catalog domain module: inventory materials and final products.
//!
//! This crate contains business rules for the catalog, implemented purely as
//! deterministic domain logic (no IO, no storage).

pub mod company;
pub mod item;
pub mod product;
pub mod service;
pub mod store;

pub use company::CompanyCatalogs;
pub use item::{InventoryItem, InventoryItemPatch, NewInventoryItem};
pub use product::{
    derive_unit_price, FinalProduct, FinalProductPatch, GarmentDescriptor, MaterialLine, NewFinalProduct, Packaging,
};
pub use service::{GarmentSupplier, ScreenprintOption, Service};
pub use store::CatalogStore;
