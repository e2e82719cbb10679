//! Statistics and reports.
//!
//! Pure aggregations over the current ledger collections: nothing is cached,
//! every call recomputes from the slices it is given.

use std::collections::BTreeMap;

use serde::Serialize;

use realprint_auth::User;
use realprint_catalog::{FinalProduct, InventoryItem};
use realprint_core::{EntityVec, FinalProductId, InventoryItemId, Money, ServiceKind, UserId};
use realprint_orders::{Order, OrderState};

/// Shown for references that no longer resolve.
pub const MISSING_NAME: &str = "-";

/// Headline numbers for the administrator dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_orders: usize,
    pub pending: usize,
    pub in_progress: usize,
    /// Completed or shipped.
    pub fulfilled: usize,
    pub low_stock_items: usize,
    pub total_sales: Money,
    pub active_users: usize,
}

pub fn dashboard_stats(orders: &[Order], items: &[InventoryItem], users: &[User]) -> DashboardStats {
    let count = |pred: fn(&Order) -> bool| orders.iter().filter(|o| pred(o)).count();
    DashboardStats {
        total_orders: orders.len(),
        pending: count(|o| o.state == OrderState::Pending),
        in_progress: count(|o| o.state == OrderState::InProgress),
        fulfilled: count(|o| o.state.is_fulfilled()),
        low_stock_items: items.iter().filter(|i| i.is_low_stock()).count(),
        total_sales: orders.iter().map(|o| o.total_price).sum(),
        active_users: users.iter().filter(|u| u.active).count(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateCount {
    pub state: OrderState,
    pub orders: usize,
}

/// One line per order state, zero counts included.
pub fn orders_by_state(orders: &[Order]) -> Vec<StateCount> {
    OrderState::ALL
        .iter()
        .map(|&state| StateCount {
            state,
            orders: orders.iter().filter(|o| o.state == state).count(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceSummary {
    pub service: ServiceKind,
    pub orders: usize,
    pub revenue: Money,
}

/// Order count and revenue per service line, every line included.
pub fn by_service(orders: &[Order]) -> Vec<ServiceSummary> {
    ServiceKind::ALL
        .iter()
        .map(|&service| {
            let matching = orders.iter().filter(|o| o.service.kind() == service);
            let (count, revenue) = matching.fold((0, Money::ZERO), |(n, total), o| (n + 1, total + o.total_price));
            ServiceSummary {
                service,
                orders: count,
                revenue,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientSpend {
    pub client_id: UserId,
    pub client_name: String,
    pub orders: usize,
    pub total: Money,
}

/// The `n` biggest spenders, highest first.
///
/// Clients are grouped in order of first appearance and sorted stably, so
/// ties keep that order.
pub fn top_clients(orders: &[Order], n: usize) -> Vec<ClientSpend> {
    let mut spend: Vec<ClientSpend> = Vec::new();
    for order in orders {
        match spend.iter_mut().find(|c| c.client_id == order.client_id) {
            Some(entry) => {
                entry.orders += 1;
                entry.total += order.total_price;
            }
            None => spend.push(ClientSpend {
                client_id: order.client_id,
                client_name: order.client_name.clone(),
                orders: 1,
                total: order.total_price,
            }),
        }
    }
    spend.sort_by(|a, b| b.total.cmp(&a.total));
    spend.truncate(n);
    spend
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BoxSummary {
    pub orders: usize,
    pub revenue: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductSummary {
    pub final_product_id: FinalProductId,
    /// [`MISSING_NAME`] when the product was deleted.
    pub name: String,
    pub orders: usize,
    pub units: i64,
    pub revenue: Money,
    /// Keyed by 1-based box index; empty for products never ordered by the box.
    pub by_box: BTreeMap<u64, BoxSummary>,
}

/// Aggregates per referenced final product, in order of first appearance.
pub fn by_final_product(orders: &[Order], products: &EntityVec<FinalProduct>) -> Vec<ProductSummary> {
    let mut summaries: Vec<ProductSummary> = Vec::new();
    for order in orders {
        let Some(product_id) = order.final_product_id else {
            continue;
        };
        let idx = match summaries.iter().position(|s| s.final_product_id == product_id) {
            Some(idx) => idx,
            None => {
                summaries.push(ProductSummary {
                    final_product_id: product_id,
                    name: products
                        .get(&product_id)
                        .map_or_else(|| MISSING_NAME.to_string(), |p| p.name.clone()),
                    orders: 0,
                    units: 0,
                    revenue: Money::ZERO,
                    by_box: BTreeMap::new(),
                });
                summaries.len() - 1
            }
        };
        let summary = &mut summaries[idx];
        summary.orders += 1;
        summary.units = summary.units.saturating_add(order.resolved_unit_quantity);
        summary.revenue += order.total_price;
        if let Some(pos) = order.box_position {
            let slot = summary.by_box.entry(pos.index).or_default();
            slot.orders += 1;
            slot.revenue += order.total_price;
        }
    }
    summaries
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
    pub category: String,
    pub items: usize,
    pub stock: u64,
    /// Σ stock × unit price.
    pub stock_value: Money,
}

/// Inventory grouped by category, alphabetically.
pub fn inventory_by_category(items: &[InventoryItem]) -> Vec<CategorySummary> {
    let mut by_category: BTreeMap<&str, CategorySummary> = BTreeMap::new();
    for item in items {
        let entry = by_category.entry(item.category.as_str()).or_insert_with(|| CategorySummary {
            category: item.category.clone(),
            items: 0,
            stock: 0,
            stock_value: Money::ZERO,
        });
        entry.items += 1;
        entry.stock = entry.stock.saturating_add(item.stock);
        entry.stock_value += item.stock_value();
    }
    by_category.into_values().collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LowStockLine {
    pub item_id: InventoryItemId,
    pub name: String,
    pub stock: u64,
    pub minimum_stock: u64,
}

pub fn low_stock(items: &[InventoryItem]) -> Vec<LowStockLine> {
    items
        .iter()
        .filter(|i| i.is_low_stock())
        .map(|i| LowStockLine {
            item_id: i.id,
            name: i.name.clone(),
            stock: i.stock,
            minimum_stock: i.minimum_stock,
        })
        .collect()
}

/// Everything the reports screen shows, in one snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub stats: DashboardStats,
    pub by_state: Vec<StateCount>,
    pub by_service: Vec<ServiceSummary>,
    pub top_clients: Vec<ClientSpend>,
    pub by_final_product: Vec<ProductSummary>,
    pub inventory_by_category: Vec<CategorySummary>,
    pub low_stock: Vec<LowStockLine>,
}

impl Report {
    pub const TOP_CLIENTS: usize = 5;

    pub fn build(
        orders: &[Order],
        items: &[InventoryItem],
        products: &EntityVec<FinalProduct>,
        users: &[User],
    ) -> Self {
        Self {
            stats: dashboard_stats(orders, items, users),
            by_state: orders_by_state(orders),
            by_service: by_service(orders),
            top_clients: top_clients(orders, Self::TOP_CLIENTS),
            by_final_product: by_final_product(orders, products),
            inventory_by_category: inventory_by_category(items),
            low_stock: low_stock(items),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::BTreeSet;

    use realprint_catalog::{Packaging, Service};
    use realprint_core::OrderId;
    use realprint_orders::{BoxPosition, ConsumptionPhase};

    fn order(client: UserId, name: &str, service: Service, euros: i64, state: OrderState) -> Order {
        Order {
            id: OrderId::new(),
            client_id: client,
            client_name: name.into(),
            final_product_id: None,
            service,
            description: String::new(),
            quantity: 1,
            resolved_unit_quantity: 1,
            requested_delivery_date: None,
            creation_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            total_price: Money::from_euros(euros),
            state,
            box_position: None,
            consumption: ConsumptionPhase::Unreserved,
        }
    }

    fn item(category: &str, stock: u64, minimum: u64, cents: i64) -> InventoryItem {
        InventoryItem {
            id: InventoryItemId::new(),
            name: format!("{category} {stock}"),
            category: category.into(),
            stock,
            minimum_stock: minimum,
            unit_price: Money::from_cents(cents),
            available_for_orders: true,
            available_services: BTreeSet::new(),
            usage_count: 0,
        }
    }

    #[test]
    fn stats_count_states_and_sum_sales() {
        let a = UserId::new();
        let orders = vec![
            order(a, "A", Service::Signage, 10, OrderState::Pending),
            order(a, "A", Service::Dtf, 20, OrderState::InProgress),
            order(a, "A", Service::Dtf, 30, OrderState::Completed),
            order(a, "A", Service::Dtf, 40, OrderState::Shipped),
            order(a, "A", Service::Dtf, 50, OrderState::Cancelled),
        ];
        let items = vec![item("Vinilo", 15, 15, 100), item("Vinilo", 16, 15, 100)];
        let stats = dashboard_stats(&orders, &items, &[]);
        assert_eq!(stats.total_orders, 5);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.in_progress, 1);
        assert_eq!(stats.fulfilled, 2);
        assert_eq!(stats.low_stock_items, 1);
        assert_eq!(stats.total_sales, Money::from_euros(150));
        assert_eq!(stats.active_users, 0);

        let by_state = orders_by_state(&orders);
        assert_eq!(by_state.len(), OrderState::ALL.len());
        assert!(by_state.iter().all(|line| line.orders == 1));
    }

    #[test]
    fn service_lines_include_empty_ones() {
        let orders = vec![order(UserId::new(), "A", Service::Signage, 27, OrderState::Pending)];
        let lines = by_service(&orders);
        assert_eq!(lines.len(), ServiceKind::ALL.len());
        let signage = lines.iter().find(|l| l.service == ServiceKind::Signage).unwrap();
        assert_eq!((signage.orders, signage.revenue), (1, Money::from_euros(27)));
        let dtf = lines.iter().find(|l| l.service == ServiceKind::Dtf).unwrap();
        assert_eq!((dtf.orders, dtf.revenue), (0, Money::ZERO));
    }

    #[test]
    fn top_clients_sorted_descending_with_stable_ties() {
        let (a, b, c) = (UserId::new(), UserId::new(), UserId::new());
        let orders = vec![
            order(a, "A", Service::Dtf, 10, OrderState::Pending),
            order(b, "B", Service::Dtf, 30, OrderState::Pending),
            order(c, "C", Service::Dtf, 10, OrderState::Pending),
            order(a, "A", Service::Dtf, 5, OrderState::Pending),
        ];
        let top = top_clients(&orders, 3);
        let names: Vec<&str> = top.iter().map(|c| c.client_name.as_str()).collect();
        assert_eq!(names, ["B", "A", "C"]);
        assert_eq!(top[1].orders, 2);
        assert_eq!(top_clients(&orders, 1).len(), 1);
    }

    #[test]
    fn product_breakdown_keys_boxes_and_marks_missing_products() {
        let product_id = FinalProductId::new();
        let mut boxes = Vec::new();
        for index in 1..=2 {
            let mut o = order(UserId::new(), "A", Service::Signage, 50, OrderState::Pending);
            o.final_product_id = Some(product_id);
            o.resolved_unit_quantity = 50;
            o.box_position = Some(BoxPosition { index, total: 2 });
            boxes.push(o);
        }
        let summaries = by_final_product(&boxes, &EntityVec::new());
        assert_eq!(summaries.len(), 1);
        let s = &summaries[0];
        assert_eq!(s.name, MISSING_NAME);
        assert_eq!((s.orders, s.units, s.revenue), (2, 100, Money::from_euros(100)));
        assert_eq!(s.by_box.keys().copied().collect::<Vec<_>>(), vec![1, 2]);

        let unit = FinalProduct {
            id: product_id,
            name: "Vinyl".into(),
            service: Service::Signage,
            bill_of_materials: vec![],
            allowed_clients: BTreeSet::new(),
            unit_price: Money::from_euros(1),
            packaging: Packaging::Unit,
            garment: None,
        };
        let named = by_final_product(&boxes, &EntityVec::from(vec![unit]));
        assert_eq!(named[0].name, "Vinyl");
    }

    #[test]
    fn categories_sum_stock_value() {
        let items = vec![
            item("Vinilo", 10, 0, 2700),
            item("Transfer", 100, 0, 150),
            item("Vinilo", 2, 0, 2700),
        ];
        let categories = inventory_by_category(&items);
        assert_eq!(categories[0].category, "Transfer");
        assert_eq!(categories[1].items, 2);
        assert_eq!(categories[1].stock, 12);
        assert_eq!(categories[1].stock_value, Money::from_euros(324));
        assert_eq!(low_stock(&items).len(), 0);
    }
}
