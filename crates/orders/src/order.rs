use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use realprint_catalog::{FinalProduct, Service};
use realprint_core::{DomainResult, Entity, FinalProductId, Money, OrderId, UserId};

use crate::consumption::ConsumptionPhase;

/// Order status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderState {
    Pending,
    InProgress,
    Completed,
    Shipped,
    Cancelled,
}

impl OrderState {
    pub const ALL: [OrderState; 5] = [
        OrderState::Pending,
        OrderState::InProgress,
        OrderState::Completed,
        OrderState::Shipped,
        OrderState::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OrderState::Pending => "pending",
            OrderState::InProgress => "in_progress",
            OrderState::Completed => "completed",
            OrderState::Shipped => "shipped",
            OrderState::Cancelled => "cancelled",
        }
    }

    /// Clients may only edit or delete their orders while pending.
    pub fn is_client_editable(self) -> bool {
        self == OrderState::Pending
    }

    /// Counted as fulfilled on the dashboard.
    pub fn is_fulfilled(self) -> bool {
        matches!(self, OrderState::Completed | OrderState::Shipped)
    }
}

impl core::fmt::Display for OrderState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position of a box order within its multi-box placement (1-based).
///
/// As wide as the order quantity it was split from, so `total` always equals
/// the requested box count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxPosition {
    pub index: u64,
    pub total: u64,
}

/// A unit of client demand.
///
/// `quantity` counts boxes when the product is boxed and units otherwise;
/// `resolved_unit_quantity` is always in units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub client_id: UserId,
    pub client_name: String,
    pub final_product_id: Option<FinalProductId>,
    pub service: Service,
    pub description: String,
    pub quantity: i64,
    pub resolved_unit_quantity: i64,
    pub requested_delivery_date: Option<NaiveDate>,
    pub creation_date: NaiveDate,
    pub total_price: Money,
    pub state: OrderState,
    #[serde(default)]
    pub box_position: Option<BoxPosition>,
    #[serde(default)]
    pub consumption: ConsumptionPhase,
}

impl Entity for Order {
    type Id = OrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Order {
    pub fn apply_patch(&mut self, patch: OrderPatch) {
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(quantity) = patch.quantity {
            self.quantity = quantity;
        }
        if let Some(units) = patch.resolved_unit_quantity {
            self.resolved_unit_quantity = units;
        }
        if let Some(total) = patch.total_price {
            self.total_price = total;
        }
        if let Some(date) = patch.requested_delivery_date {
            self.requested_delivery_date = Some(date);
        }
        if let Some(service) = patch.service {
            self.service = service;
        }
        if let Some(product) = patch.final_product_id {
            self.final_product_id = Some(product);
        }
    }
}

/// Units and total for `quantity` of `product`; without a product the
/// quantity is taken as units at `fallback_unit_price`.
pub fn price_for(product: Option<&FinalProduct>, quantity: i64, fallback_unit_price: Money) -> (i64, Money) {
    match product {
        Some(p) => {
            let units = p.packaging.units_for(quantity);
            (units, p.unit_price.times(units))
        }
        None => (quantity, fallback_unit_price.times(quantity)),
    }
}

/// Input for placing an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceOrder {
    pub client_id: UserId,
    pub client_name: String,
    pub final_product_id: Option<FinalProductId>,
    pub service: Service,
    pub description: String,
    /// Not validated: zero or negative values pass through.
    pub quantity: i64,
    pub requested_delivery_date: Option<NaiveDate>,
    /// Price per unit for orders that do not reference a catalog product.
    #[serde(default)]
    pub unit_price: Option<Money>,
}

impl PlaceOrder {
    /// Build an input, validating the service variant for ordering.
    pub fn new(
        client_id: UserId,
        client_name: impl Into<String>,
        service: Service,
        final_product_id: Option<FinalProductId>,
        quantity: i64,
    ) -> DomainResult<Self> {
        service.validate_for_order()?;
        Ok(Self {
            client_id,
            client_name: client_name.into(),
            final_product_id,
            service,
            description: String::new(),
            quantity,
            requested_delivery_date: None,
            unit_price: None,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_delivery_date(mut self, date: NaiveDate) -> Self {
        self.requested_delivery_date = Some(date);
        self
    }

    pub fn with_unit_price(mut self, price: Money) -> Self {
        self.unit_price = Some(price);
        self
    }
}

/// Shallow-merge edit (client editing of pending orders).
///
/// Pricing fields are not recomputed from the new quantity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPatch {
    pub description: Option<String>,
    pub quantity: Option<i64>,
    pub resolved_unit_quantity: Option<i64>,
    pub total_price: Option<Money>,
    pub requested_delivery_date: Option<NaiveDate>,
    pub service: Option<Service>,
    pub final_product_id: Option<FinalProductId>,
}
