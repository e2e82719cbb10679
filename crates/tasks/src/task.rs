use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use realprint_core::{Entity, OrderId, TaskId, UserId};
use realprint_orders::{Order, OrderState};

/// Task lifecycle (a subset of the order lifecycle).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Pending,
    InProgress,
    Completed,
}

impl TaskState {
    /// The order state an operator update mirrors onto the linked order.
    pub fn as_order_state(self) -> OrderState {
        match self {
            TaskState::Pending => OrderState::Pending,
            TaskState::InProgress => OrderState::InProgress,
            TaskState::Completed => OrderState::Completed,
        }
    }
}

/// Operator work item derived from exactly one order.
///
/// The operator is bound when the task is created; later changes to operator
/// accounts do not re-route it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub operator_id: UserId,
    pub order_id: OrderId,
    pub description: String,
    pub state: TaskState,
    pub created_at: DateTime<Utc>,
}

impl Entity for Task {
    type Id = TaskId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// "Handle signage order", with the box position when the order is one box of many.
pub fn describe(order: &Order) -> String {
    let label = order.service.kind().label();
    match order.box_position {
        Some(pos) => format!("Handle {label} order (box {}/{})", pos.index, pos.total),
        None => format!("Handle {label} order"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_states_map_onto_order_states() {
        assert_eq!(TaskState::InProgress.as_order_state(), OrderState::InProgress);
        assert_eq!(TaskState::Completed.as_order_state(), OrderState::Completed);
        assert_eq!(serde_json::to_string(&TaskState::InProgress).unwrap(), "\"in_progress\"");
    }
}
