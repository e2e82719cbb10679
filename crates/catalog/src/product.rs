use std::collections::BTreeSet;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use realprint_core::{Entity, FinalProductId, InventoryItemId, Money, UserId};

use crate::item::InventoryItem;
use crate::service::Service;

/// One line of a final product's recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialLine {
    pub item_id: InventoryItemId,
    pub quantity_per_unit: u32,
}

impl MaterialLine {
    pub fn new(item_id: InventoryItemId, quantity_per_unit: u32) -> Self {
        Self { item_id, quantity_per_unit }
    }

    /// Material required for `units` finished units.
    pub fn required_for(&self, units: i64) -> i64 {
        units.saturating_mul(i64::from(self.quantity_per_unit))
    }
}

/// How a final product is sold.
///
/// A boxed product is sold in fixed-size batches; ordering several boxes fans
/// out into one order per box. `NonZeroU32` makes a zero-sized box unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "packaging", rename_all = "snake_case")]
pub enum Packaging {
    Unit,
    Boxed { box_size: NonZeroU32 },
}

impl Packaging {
    pub fn is_boxed(&self) -> bool {
        matches!(self, Packaging::Boxed { .. })
    }

    pub fn box_size(&self) -> Option<u32> {
        match self {
            Packaging::Unit => None,
            Packaging::Boxed { box_size } => Some(box_size.get()),
        }
    }

    /// Units represented by `quantity` (boxes when boxed, units otherwise).
    pub fn units_for(&self, quantity: i64) -> i64 {
        match self.box_size() {
            Some(size) => quantity.saturating_mul(i64::from(size)),
            None => quantity,
        }
    }
}

/// Optional garment descriptor shown to clients (garment, model, size).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GarmentDescriptor {
    pub garment: Option<String>,
    pub model: Option<String>,
    pub size: Option<String>,
}

/// A sellable composition of inventory materials.
///
/// # Invariants
/// - Every material line references an item that existed when the product was
///   created or last updated (deleting the item later is tolerated).
/// - Clients not in `allowed_clients` cannot order it; an empty list means nobody can.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalProduct {
    pub id: FinalProductId,
    pub name: String,
    pub service: Service,
    pub bill_of_materials: Vec<MaterialLine>,
    #[serde(default)]
    pub allowed_clients: BTreeSet<UserId>,
    pub unit_price: Money,
    pub packaging: Packaging,
    #[serde(default)]
    pub garment: Option<GarmentDescriptor>,
}

impl Entity for FinalProduct {
    type Id = FinalProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl FinalProduct {
    pub fn is_orderable_by(&self, client: UserId) -> bool {
        self.allowed_clients.contains(&client)
    }

    pub fn uses_item(&self, item_id: InventoryItemId) -> bool {
        self.bill_of_materials.iter().any(|l| l.item_id == item_id)
    }

    pub fn apply_patch(&mut self, patch: FinalProductPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(service) = patch.service {
            self.service = service;
        }
        if let Some(bom) = patch.bill_of_materials {
            self.bill_of_materials = bom;
        }
        if let Some(clients) = patch.allowed_clients {
            self.allowed_clients = clients;
        }
        if let Some(price) = patch.unit_price {
            self.unit_price = price;
        }
        if let Some(packaging) = patch.packaging {
            self.packaging = packaging;
        }
        if let Some(garment) = patch.garment {
            self.garment = Some(garment);
        }
    }
}

/// Σ(material.unit_price × quantity_per_unit); lines whose item is missing contribute nothing.
pub fn derive_unit_price<'a>(
    bill_of_materials: &[MaterialLine],
    lookup: impl Fn(InventoryItemId) -> Option<&'a InventoryItem>,
) -> Money {
    bill_of_materials
        .iter()
        .filter_map(|line| lookup(line.item_id).map(|item| item.unit_price.times(i64::from(line.quantity_per_unit))))
        .sum()
}

/// Input for `CatalogStore::create_final_product`.
///
/// `unit_price: None` means "derive from the bill of materials".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFinalProduct {
    pub name: String,
    pub service: Service,
    pub bill_of_materials: Vec<MaterialLine>,
    #[serde(default)]
    pub allowed_clients: BTreeSet<UserId>,
    pub unit_price: Option<Money>,
    pub packaging: Packaging,
    #[serde(default)]
    pub garment: Option<GarmentDescriptor>,
}

/// Shallow-merge edit of a final product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalProductPatch {
    pub name: Option<String>,
    pub service: Option<Service>,
    pub bill_of_materials: Option<Vec<MaterialLine>>,
    pub allowed_clients: Option<BTreeSet<UserId>>,
    pub unit_price: Option<Money>,
    pub packaging: Option<Packaging>,
    pub garment: Option<GarmentDescriptor>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boxed_units_multiply_by_box_size() {
        let boxed = Packaging::Boxed { box_size: NonZeroU32::new(50).unwrap() };
        assert_eq!(boxed.units_for(3), 150);
        assert_eq!(Packaging::Unit.units_for(3), 3);
        assert!(boxed.is_boxed());
    }

    #[test]
    fn zero_box_size_does_not_deserialize() {
        let json = serde_json::json!({ "packaging": "boxed", "box_size": 0 });
        assert!(serde_json::from_value::<Packaging>(json).is_err());
    }

    #[test]
    fn required_material_scales_with_units() {
        let line = MaterialLine::new(InventoryItemId::new(), 2);
        assert_eq!(line.required_for(5), 10);
    }
}
