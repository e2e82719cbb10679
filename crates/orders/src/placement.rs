//! Order placement planning, including box fan-out.
//!
//! Planning is pure: it returns the orders to store and the stock moves to
//! apply. The ledger applies both and requests one task per planned order.

use chrono::NaiveDate;

use realprint_catalog::FinalProduct;
use realprint_core::{Money, OrderId};

use crate::consumption::{material_moves, ConsumptionPhase, ConsumptionPolicy, MaterialMove};
use crate::order::{price_for, BoxPosition, Order, OrderState, PlaceOrder};

/// Result of planning a placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    /// Created orders, in box order for fan-outs.
    pub orders: Vec<Order>,
    /// Stock reservations, one batch per created order.
    pub moves: Vec<MaterialMove>,
}

impl Placement {
    pub fn is_fan_out(&self) -> bool {
        self.orders.iter().any(|o| o.box_position.is_some())
    }
}

/// Plan the orders and stock reservations for `input`.
///
/// `product` is the resolved final product, or `None` when the input names no
/// product or names one that no longer exists; either way no stock moves.
///
/// - Boxed product, `quantity > 1`: one order per box, each `quantity = 1`
///   and reserving a full box of every material.
/// - Otherwise: a single order. Under the legacy policy it reserves `quantity`
///   units of every material even for a single box; the phased policy reserves
///   the resolved units.
pub fn plan_placement(
    input: PlaceOrder,
    product: Option<&FinalProduct>,
    policy: ConsumptionPolicy,
    today: NaiveDate,
) -> Placement {
    let fallback_price = input.unit_price.unwrap_or(Money::ZERO);
    let phase = if product.is_some() {
        ConsumptionPhase::Reserved
    } else {
        ConsumptionPhase::Unreserved
    };
    let final_product_id = product.map(|p| p.id).or(input.final_product_id);

    let template = Order {
        id: OrderId::new(),
        client_id: input.client_id,
        client_name: input.client_name,
        final_product_id,
        service: input.service,
        description: input.description,
        quantity: input.quantity,
        resolved_unit_quantity: input.quantity,
        requested_delivery_date: input.requested_delivery_date,
        creation_date: today,
        total_price: Money::ZERO,
        state: OrderState::Pending,
        box_position: None,
        consumption: phase,
    };

    if let Some(p) = product {
        if let Some(box_size) = p.packaging.box_size() {
            if input.quantity > 1 {
                return fan_out(template, p, i64::from(box_size));
            }
        }
    }

    let mut order = template;
    let (units, total) = price_for(product, order.quantity, fallback_price);
    order.resolved_unit_quantity = units;
    order.total_price = total;

    let moves = match product {
        Some(p) => {
            let reserved = match policy {
                ConsumptionPolicy::Legacy => order.quantity,
                ConsumptionPolicy::Phased => units,
            };
            material_moves(p, reserved, -1, 0)
        }
        None => Vec::new(),
    };

    Placement {
        orders: vec![order],
        moves,
    }
}

/// Positions `1..=boxes`, lazily. Non-positive counts yield nothing.
fn box_positions(boxes: i64) -> impl DoubleEndedIterator<Item = BoxPosition> {
    let total = u64::try_from(boxes).unwrap_or(0);
    (1..=total).map(move |index| BoxPosition { index, total })
}

fn fan_out(template: Order, product: &FinalProduct, box_size: i64) -> Placement {
    let mut orders = Vec::new();
    let mut moves = Vec::new();

    for position in box_positions(template.quantity) {
        let mut order = template.clone();
        order.id = OrderId::new();
        order.quantity = 1;
        order.resolved_unit_quantity = box_size;
        order.total_price = product.unit_price.times(box_size);
        order.box_position = Some(position);
        moves.extend(material_moves(product, box_size, -1, 0));
        orders.push(order);
    }

    Placement { orders, moves }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::{BTreeSet, HashSet};
    use std::num::NonZeroU32;

    use realprint_catalog::{MaterialLine, Packaging, Service};
    use realprint_core::{FinalProductId, InventoryItemId, UserId};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn product(lines: Vec<MaterialLine>, packaging: Packaging, euros: i64) -> FinalProduct {
        FinalProduct {
            id: FinalProductId::new(),
            name: "Kit".into(),
            service: Service::Signage,
            bill_of_materials: lines,
            allowed_clients: BTreeSet::new(),
            unit_price: Money::from_euros(euros),
            packaging,
            garment: None,
        }
    }

    fn input(product: Option<&FinalProduct>, quantity: i64) -> PlaceOrder {
        PlaceOrder::new(UserId::new(), "Club", Service::Signage, product.map(|p| p.id), quantity).unwrap()
    }

    fn boxed(size: u32) -> Packaging {
        Packaging::Boxed { box_size: NonZeroU32::new(size).unwrap() }
    }

    #[test]
    fn unboxed_order_reserves_quantity_times_recipe() {
        let item = InventoryItemId::new();
        let p = product(vec![MaterialLine::new(item, 2)], Packaging::Unit, 10);
        let plan = plan_placement(input(Some(&p), 5), Some(&p), ConsumptionPolicy::Legacy, today());

        assert_eq!(plan.orders.len(), 1);
        let order = &plan.orders[0];
        assert_eq!(order.total_price, Money::from_euros(50));
        assert_eq!(order.resolved_unit_quantity, 5);
        assert_eq!(order.state, OrderState::Pending);
        assert_eq!(order.creation_date, today());
        assert_eq!(plan.moves, vec![MaterialMove { item_id: item, stock_delta: -10, usage_delta: 0 }]);
        assert!(!plan.is_fan_out());
    }

    #[test]
    fn single_box_is_not_fanned_out() {
        let item = InventoryItemId::new();
        let p = product(vec![MaterialLine::new(item, 1)], boxed(50), 1);

        let legacy = plan_placement(input(Some(&p), 1), Some(&p), ConsumptionPolicy::Legacy, today());
        assert_eq!(legacy.orders.len(), 1);
        assert_eq!(legacy.orders[0].resolved_unit_quantity, 50);
        assert_eq!(legacy.orders[0].box_position, None);
        assert_eq!(legacy.moves[0].stock_delta, -1);

        let phased = plan_placement(input(Some(&p), 1), Some(&p), ConsumptionPolicy::Phased, today());
        assert_eq!(phased.moves[0].stock_delta, -50);
    }

    #[test]
    fn unresolved_product_places_without_stock_moves() {
        let missing = FinalProductId::new();
        let mut req = input(None, 3).with_unit_price(Money::from_euros(2));
        req.final_product_id = Some(missing);
        let plan = plan_placement(req, None, ConsumptionPolicy::Legacy, today());
        assert!(plan.moves.is_empty());
        assert_eq!(plan.orders[0].final_product_id, Some(missing));
        assert_eq!(plan.orders[0].total_price, Money::from_euros(6));
        assert_eq!(plan.orders[0].consumption, ConsumptionPhase::Unreserved);
    }

    #[test]
    fn box_positions_keep_counts_beyond_u32() {
        let boxes = 5_000_000_000_i64;
        let mut positions = box_positions(boxes);
        assert_eq!(positions.next(), Some(BoxPosition { index: 1, total: 5_000_000_000 }));
        assert_eq!(
            positions.next_back(),
            Some(BoxPosition { index: 5_000_000_000, total: 5_000_000_000 })
        );
        assert_eq!(box_positions(0).next(), None);
        assert_eq!(box_positions(-3).next(), None);
    }

    #[test]
    fn negative_quantity_passes_through() {
        let p = product(vec![], Packaging::Unit, 1);
        let plan = plan_placement(input(Some(&p), -2), Some(&p), ConsumptionPolicy::Legacy, today());
        assert_eq!(plan.orders[0].quantity, -2);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: fanning out N boxes of size S yields N orders of S units each,
        /// boxes numbered 1..=N, and reserves N × S × per-unit of every material.
        #[test]
        fn box_fan_out_conserves_quantity(
            boxes in 2i64..40,
            box_size in 1u32..200,
            per_unit in prop::collection::vec(1u32..5, 1..4)
        ) {
            let lines: Vec<MaterialLine> = per_unit
                .iter()
                .map(|q| MaterialLine::new(InventoryItemId::new(), *q))
                .collect();
            let p = product(lines.clone(), boxed(box_size), 3);
            let plan = plan_placement(input(Some(&p), boxes), Some(&p), ConsumptionPolicy::Legacy, today());

            prop_assert_eq!(plan.orders.len() as i64, boxes);
            let ids: HashSet<OrderId> = plan.orders.iter().map(|o| o.id).collect();
            prop_assert_eq!(ids.len() as i64, boxes);
            for (i, order) in plan.orders.iter().enumerate() {
                prop_assert_eq!(order.quantity, 1);
                prop_assert_eq!(order.resolved_unit_quantity, i64::from(box_size));
                prop_assert_eq!(order.box_position, Some(BoxPosition { index: i as u64 + 1, total: boxes as u64 }));
            }
            for line in &lines {
                let total: i64 = plan
                    .moves
                    .iter()
                    .filter(|m| m.item_id == line.item_id)
                    .map(|m| m.stock_delta)
                    .sum();
                prop_assert_eq!(total, -(boxes * i64::from(box_size) * i64::from(line.quantity_per_unit)));
            }
        }
    }
}
