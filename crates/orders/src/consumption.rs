//! Material consumption: how an order's lifecycle moves stock and usage.
//!
//! Two policies exist:
//!
//! - [`ConsumptionPolicy::Legacy`] reproduces the dashboard's historical
//!   behavior: stock is decremented at placement, again when an administrator
//!   moves the order to in-progress, and a third time when the operator
//!   completes the task. Data produced by the old dashboard only balances under
//!   this policy.
//! - [`ConsumptionPolicy::Phased`] treats the lifecycle as
//!   `reserved → consumed`: placement reserves stock once, starting or
//!   completing work records usage once, and cancelling or deleting a still
//!   reserved order releases the stock.
//!
//! Everything here is pure: functions return the moves to apply and the phase
//! the order ends up in.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use realprint_catalog::FinalProduct;
use realprint_core::{DomainError, InventoryItemId};

use crate::order::{Order, OrderState};

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsumptionPolicy {
    #[default]
    Legacy,
    Phased,
}

impl FromStr for ConsumptionPolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "legacy" => Ok(ConsumptionPolicy::Legacy),
            "phased" => Ok(ConsumptionPolicy::Phased),
            other => Err(DomainError::validation(format!("unknown consumption policy: {other:?}"))),
        }
    }
}

/// Where an order stands with respect to its materials.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsumptionPhase {
    /// No catalog product: nothing to reserve.
    #[default]
    Unreserved,
    /// Stock has been taken out for the order.
    Reserved,
    /// Usage has been recorded.
    Consumed,
    /// Reserved stock was returned (cancel/delete under the phased policy).
    Released,
}

/// One inventory mutation. Stock and usage deltas are applied independently
/// with clamping at zero.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MaterialMove {
    pub item_id: InventoryItemId,
    pub stock_delta: i64,
    pub usage_delta: i64,
}

/// Moves to apply plus the phase the order moves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumptionStep {
    pub moves: Vec<MaterialMove>,
    pub phase: ConsumptionPhase,
}

/// Build one move per bill-of-materials line for `units` finished units.
///
/// `stock_sign`/`usage_sign` are -1, 0 or +1.
pub fn material_moves(product: &FinalProduct, units: i64, stock_sign: i64, usage_sign: i64) -> Vec<MaterialMove> {
    product
        .bill_of_materials
        .iter()
        .map(|line| {
            let amount = line.required_for(units);
            MaterialMove {
                item_id: line.item_id,
                stock_delta: amount.saturating_mul(stock_sign),
                usage_delta: amount.saturating_mul(usage_sign),
            }
        })
        .collect()
}

/// Move the same flat `amount` for every bill-of-materials line, ignoring
/// each line's per-unit requirement.
fn flat_moves(product: &FinalProduct, amount: i64, stock_sign: i64, usage_sign: i64) -> Vec<MaterialMove> {
    product
        .bill_of_materials
        .iter()
        .map(|line| MaterialMove {
            item_id: line.item_id,
            stock_delta: amount.saturating_mul(stock_sign),
            usage_delta: amount.saturating_mul(usage_sign),
        })
        .collect()
}

/// Moves for an administrator transition or task completion.
///
/// Legacy moves the order's raw `quantity` (boxes for boxed orders) once per
/// material; phased moves the resolved units times each line's requirement,
/// matching what placement reserved.
fn lifecycle_moves(
    policy: ConsumptionPolicy,
    order: &Order,
    product: &FinalProduct,
    stock_sign: i64,
    usage_sign: i64,
) -> Vec<MaterialMove> {
    match policy {
        ConsumptionPolicy::Legacy => flat_moves(product, order.quantity, stock_sign, usage_sign),
        ConsumptionPolicy::Phased => material_moves(product, order.resolved_unit_quantity, stock_sign, usage_sign),
    }
}

/// Effect of moving `order` (currently in `order.state`) to `next`.
///
/// `None` means no inventory side effect and no phase change. Under the
/// legacy policy the phase only records that usage was ever taken; a reversal
/// to pending leaves it untouched.
pub fn on_transition(
    policy: ConsumptionPolicy,
    order: &Order,
    product: &FinalProduct,
    next: OrderState,
) -> Option<ConsumptionStep> {
    let previous = order.state;
    match policy {
        ConsumptionPolicy::Legacy => match next {
            // From any prior state, including in-progress itself.
            OrderState::InProgress => Some(ConsumptionStep {
                moves: lifecycle_moves(policy, order, product, -1, 1),
                phase: ConsumptionPhase::Consumed,
            }),
            OrderState::Pending if previous == OrderState::InProgress => Some(ConsumptionStep {
                moves: lifecycle_moves(policy, order, product, 1, -1),
                phase: order.consumption,
            }),
            _ => None,
        },
        ConsumptionPolicy::Phased => match (next, order.consumption) {
            (OrderState::InProgress, ConsumptionPhase::Reserved) => Some(ConsumptionStep {
                moves: lifecycle_moves(policy, order, product, 0, 1),
                phase: ConsumptionPhase::Consumed,
            }),
            (OrderState::Pending, ConsumptionPhase::Consumed) if previous == OrderState::InProgress => {
                Some(ConsumptionStep {
                    moves: lifecycle_moves(policy, order, product, 0, -1),
                    phase: ConsumptionPhase::Reserved,
                })
            }
            (OrderState::Cancelled, ConsumptionPhase::Reserved) => {
                Some(release(product, order.resolved_unit_quantity))
            }
            _ => None,
        },
    }
}

/// Effect of the operator completing the order's task.
pub fn on_task_completed(policy: ConsumptionPolicy, order: &Order, product: &FinalProduct) -> Option<ConsumptionStep> {
    match policy {
        ConsumptionPolicy::Legacy => Some(ConsumptionStep {
            moves: lifecycle_moves(policy, order, product, -1, 1),
            phase: ConsumptionPhase::Consumed,
        }),
        ConsumptionPolicy::Phased => (order.consumption == ConsumptionPhase::Reserved).then(|| ConsumptionStep {
            moves: lifecycle_moves(policy, order, product, 0, 1),
            phase: ConsumptionPhase::Consumed,
        }),
    }
}

/// Effect of deleting the order. Legacy never restores stock.
pub fn on_delete(policy: ConsumptionPolicy, order: &Order, product: &FinalProduct) -> Option<ConsumptionStep> {
    match (policy, order.consumption) {
        (ConsumptionPolicy::Phased, ConsumptionPhase::Reserved) => {
            Some(release(product, order.resolved_unit_quantity))
        }
        _ => None,
    }
}

fn release(product: &FinalProduct, units: i64) -> ConsumptionStep {
    ConsumptionStep {
        moves: material_moves(product, units, 1, 0),
        phase: ConsumptionPhase::Released,
    }
}
