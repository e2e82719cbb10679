use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use realprint_core::{Entity, InventoryItemId, Money, ServiceKind};

/// A stocked material or sellable unit.
///
/// # Invariants
/// - `stock` never goes negative: decrements clamp at zero.
/// - `usage_count` never goes negative either; it only shrinks when an
///   in-progress order is sent back to pending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: InventoryItemId,
    pub name: String,
    pub category: String,
    pub stock: u64,
    pub minimum_stock: u64,
    pub unit_price: Money,
    pub available_for_orders: bool,
    #[serde(default)]
    pub available_services: BTreeSet<ServiceKind>,
    /// Cumulative units consumed. Older persisted data may lack the field.
    #[serde(default)]
    pub usage_count: u64,
}

impl Entity for InventoryItem {
    type Id = InventoryItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl InventoryItem {
    /// `stock = max(0, stock + delta)`; returns the new stock.
    pub fn apply_stock_delta(&mut self, delta: i64) -> u64 {
        self.stock = clamp_add(self.stock, delta);
        self.stock
    }

    /// `usage_count = max(0, usage_count + delta)`; returns the new count.
    pub fn apply_usage_delta(&mut self, delta: i64) -> u64 {
        self.usage_count = clamp_add(self.usage_count, delta);
        self.usage_count
    }

    /// At or below the reorder threshold.
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.minimum_stock
    }

    /// Value of the remaining stock at the item's unit price.
    pub fn stock_value(&self) -> Money {
        self.unit_price.times(i64::try_from(self.stock).unwrap_or(i64::MAX))
    }

    pub fn apply_patch(&mut self, patch: InventoryItemPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(stock) = patch.stock {
            self.stock = stock;
        }
        if let Some(minimum_stock) = patch.minimum_stock {
            self.minimum_stock = minimum_stock;
        }
        if let Some(unit_price) = patch.unit_price {
            self.unit_price = unit_price;
        }
        if let Some(available) = patch.available_for_orders {
            self.available_for_orders = available;
        }
        if let Some(services) = patch.available_services {
            self.available_services = services;
        }
    }
}

fn clamp_add(current: u64, delta: i64) -> u64 {
    if delta >= 0 {
        current.saturating_add(delta.unsigned_abs())
    } else {
        current.saturating_sub(delta.unsigned_abs())
    }
}

/// Input for `CatalogStore::create_item`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInventoryItem {
    pub name: String,
    pub category: String,
    pub stock: u64,
    pub minimum_stock: u64,
    pub unit_price: Money,
    pub available_for_orders: bool,
    #[serde(default)]
    pub available_services: BTreeSet<ServiceKind>,
}

/// Shallow-merge edit of an inventory item. `usage_count` is not editable here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItemPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub stock: Option<u64>,
    pub minimum_stock: Option<u64>,
    pub unit_price: Option<Money>,
    pub available_for_orders: Option<bool>,
    pub available_services: Option<BTreeSet<ServiceKind>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn item(stock: u64) -> InventoryItem {
        InventoryItem {
            id: InventoryItemId::new(),
            name: "White tee".to_string(),
            category: "garments".to_string(),
            stock,
            minimum_stock: 10,
            unit_price: Money::from_cents(250),
            available_for_orders: true,
            available_services: BTreeSet::from([ServiceKind::Screenprint]),
            usage_count: 0,
        }
    }

    #[test]
    fn decrement_clamps_at_zero() {
        let mut it = item(5);
        assert_eq!(it.apply_stock_delta(-8), 0);
        assert_eq!(it.apply_stock_delta(3), 3);
    }

    #[test]
    fn usage_never_negative() {
        let mut it = item(0);
        it.apply_usage_delta(2);
        assert_eq!(it.apply_usage_delta(-5), 0);
    }

    #[test]
    fn low_stock_includes_threshold() {
        assert!(item(10).is_low_stock());
        assert!(!item(11).is_low_stock());
    }

    #[test]
    fn patch_leaves_usage_untouched() {
        let mut it = item(4);
        it.usage_count = 9;
        it.apply_patch(InventoryItemPatch {
            name: Some("Black tee".to_string()),
            stock: Some(40),
            ..Default::default()
        });
        assert_eq!(it.name, "Black tee");
        assert_eq!(it.stock, 40);
        assert_eq!(it.usage_count, 9);
    }

    #[test]
    fn legacy_record_without_usage_defaults_to_zero() {
        let mut json = serde_json::to_value(item(1)).unwrap();
        json.as_object_mut().unwrap().remove("usage_count");
        let parsed: InventoryItem = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.usage_count, 0);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 512,
            ..ProptestConfig::default()
        })]

        /// Property: no sequence of adjustments drives stock below zero, and the
        /// result always equals the clamped running sum.
        #[test]
        fn stock_is_never_negative(
            initial in 0u64..10_000,
            deltas in prop::collection::vec(-5_000i64..5_000, 0..40)
        ) {
            let mut it = item(initial);
            let mut expected = initial as i128;
            for delta in deltas {
                let stock = it.apply_stock_delta(delta);
                expected = (expected + delta as i128).max(0);
                prop_assert_eq!(stock as i128, expected);
            }
        }
    }
}
