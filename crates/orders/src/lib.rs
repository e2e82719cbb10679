//! Order Ledger domain module: orders, placement with box fan-out and
//! material consumption rules.
//!
//! Pure, deterministic domain logic (no IO, no storage). Stock is moved by the
//! caller from the plans returned here.

pub mod book;
pub mod consumption;
pub mod order;
pub mod placement;

pub use book::OrderBook;
pub use consumption::{
    on_delete, on_task_completed, on_transition, ConsumptionPhase, ConsumptionPolicy, ConsumptionStep, MaterialMove,
};
pub use order::{price_for, BoxPosition, Order, OrderPatch, OrderState, PlaceOrder};
pub use placement::{plan_placement, Placement};
