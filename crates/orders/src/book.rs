//! Order book: the stored collection of orders, newest first.

use realprint_core::{EntityVec, FinalProductId, OrderId, UserId};

use crate::consumption::ConsumptionPhase;
use crate::order::{Order, OrderPatch, OrderState};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderBook {
    orders: EntityVec<Order>,
}

impl OrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_orders(orders: EntityVec<Order>) -> Self {
        Self { orders }
    }

    pub fn orders(&self) -> &EntityVec<Order> {
        &self.orders
    }

    pub fn order(&self, id: OrderId) -> Option<&Order> {
        self.orders.get(&id)
    }

    /// Store freshly placed orders ahead of existing ones, keeping their relative order.
    pub fn insert(&mut self, orders: Vec<Order>) {
        self.orders.prepend(orders);
    }

    pub fn update(&mut self, id: OrderId, patch: OrderPatch) -> Option<Order> {
        let order = self.orders.get_mut(&id)?;
        order.apply_patch(patch);
        Some(order.clone())
    }

    /// Overwrite the state field only; returns the previous state.
    pub fn set_state(&mut self, id: OrderId, state: OrderState) -> Option<OrderState> {
        let order = self.orders.get_mut(&id)?;
        Some(core::mem::replace(&mut order.state, state))
    }

    pub fn set_phase(&mut self, id: OrderId, phase: ConsumptionPhase) {
        if let Some(order) = self.orders.get_mut(&id) {
            order.consumption = phase;
        }
    }

    pub fn remove(&mut self, id: OrderId) -> Option<Order> {
        self.orders.remove(&id)
    }

    pub fn for_client(&self, client: UserId) -> impl Iterator<Item = &Order> {
        self.orders.iter().filter(move |o| o.client_id == client)
    }

    pub fn references_product(&self, product: FinalProductId) -> bool {
        self.orders.iter().any(|o| o.final_product_id == Some(product))
    }
}
