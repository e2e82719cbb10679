//! Task Dispatcher: one task per order, routed by operator specialty.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use realprint_auth::UserDirectory;
use realprint_core::{EntityVec, OrderId, TaskId, UserId};
use realprint_orders::Order;

use crate::task::{describe, Task, TaskState};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskBoard {
    tasks: EntityVec<Task>,
}

impl TaskBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tasks(tasks: EntityVec<Task>) -> Self {
        Self { tasks }
    }

    pub fn tasks(&self) -> &EntityVec<Task> {
        &self.tasks
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(&id)
    }

    pub fn for_order(&self, order_id: OrderId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.order_id == order_id)
    }

    pub fn for_operator(&self, operator: UserId) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(move |t| t.operator_id == operator)
    }

    /// Bind a pending task to the first active operator whose specialty
    /// matches the order's service. No matching operator: no task.
    pub fn create_for_order(&mut self, order: &Order, directory: &UserDirectory, now: DateTime<Utc>) -> Option<Task> {
        let service = order.service.kind();
        let Some(operator) = directory.first_operator_for(service) else {
            warn!(order_id = %order.id, %service, "no operator for service; order has no task");
            return None;
        };
        let task = Task {
            id: TaskId::new(),
            operator_id: operator.id,
            order_id: order.id,
            description: describe(order),
            state: TaskState::Pending,
            created_at: now,
        };
        info!(task_id = %task.id, order_id = %order.id, operator_id = %operator.id, "task created");
        self.tasks.prepend([task.clone()]);
        Some(task)
    }

    /// Overwrite the state; returns the updated task.
    pub fn set_state(&mut self, id: TaskId, state: TaskState) -> Option<Task> {
        let task = self.tasks.get_mut(&id)?;
        task.state = state;
        Some(task.clone())
    }

    /// Cascade for order deletion; returns how many tasks were dropped.
    pub fn remove_for_order(&mut self, order_id: OrderId) -> usize {
        self.tasks.remove_where(|t| t.order_id == order_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use realprint_auth::{NewUser, Role};
    use realprint_catalog::Service;
    use realprint_core::{Money, ServiceKind};
    use realprint_orders::{BoxPosition, ConsumptionPhase, OrderState};

    fn order(service: Service) -> Order {
        Order {
            id: OrderId::new(),
            client_id: UserId::new(),
            client_name: "Club".into(),
            final_product_id: None,
            service,
            description: String::new(),
            quantity: 1,
            resolved_unit_quantity: 1,
            requested_delivery_date: None,
            creation_date: NaiveDate::from_ymd_opt(2026, 5, 5).unwrap(),
            total_price: Money::ZERO,
            state: OrderState::Pending,
            box_position: None,
            consumption: ConsumptionPhase::Unreserved,
        }
    }

    fn directory_with(specialty: ServiceKind) -> (UserDirectory, UserId) {
        let mut dir = UserDirectory::new();
        let op = dir
            .create_user(NewUser {
                username: "op".into(),
                password: "pw".into(),
                name: "Operator".into(),
                email: "op@example.com".into(),
                role: Role::Operator { specialty },
            })
            .unwrap();
        (dir, op.id)
    }

    #[test]
    fn task_routed_to_matching_operator() {
        let (dir, op) = directory_with(ServiceKind::Signage);
        let mut board = TaskBoard::new();
        let o = order(Service::Signage);
        let task = board.create_for_order(&o, &dir, Utc::now()).unwrap();
        assert_eq!(task.operator_id, op);
        assert_eq!(task.state, TaskState::Pending);
        assert_eq!(board.for_order(o.id), Some(&task));
        assert_eq!(board.for_operator(op).count(), 1);
    }

    #[test]
    fn no_matching_operator_means_no_task() {
        let (dir, _) = directory_with(ServiceKind::Screenprint);
        let mut board = TaskBoard::new();
        assert!(board.create_for_order(&order(Service::Signage), &dir, Utc::now()).is_none());
        assert!(board.tasks().is_empty());
    }

    #[test]
    fn description_mentions_box() {
        let mut o = order(Service::Dtf);
        o.box_position = Some(BoxPosition { index: 2, total: 3 });
        assert_eq!(describe(&o), "Handle DTF order (box 2/3)");
    }

    #[test]
    fn remove_for_order_cascades() {
        let (dir, _) = directory_with(ServiceKind::Dtf);
        let mut board = TaskBoard::new();
        let keep = order(Service::Dtf);
        let gone = order(Service::Dtf);
        board.create_for_order(&keep, &dir, Utc::now());
        board.create_for_order(&gone, &dir, Utc::now());
        assert_eq!(board.remove_for_order(gone.id), 1);
        assert!(board.for_order(keep.id).is_some());
        assert_eq!(board.set_state(TaskId::new(), TaskState::Completed), None);
    }
}
