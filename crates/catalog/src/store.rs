//! Catalog Store: authoritative stock levels and product definitions.
//!
//! Every mutation is atomic per call; nothing here spans calls. Unresolved ids
//! are no-ops (`None`), never errors.

use tracing::debug;

use realprint_core::{DomainError, DomainResult, EntityVec, FinalProductId, InventoryItemId, ServiceKind, UserId};

use crate::company::CompanyCatalogs;
use crate::item::{InventoryItem, InventoryItemPatch, NewInventoryItem};
use crate::product::{derive_unit_price, FinalProduct, FinalProductPatch, MaterialLine, NewFinalProduct};
use crate::service::Service;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogStore {
    items: EntityVec<InventoryItem>,
    products: EntityVec<FinalProduct>,
    companies: CompanyCatalogs,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(
        items: EntityVec<InventoryItem>,
        products: EntityVec<FinalProduct>,
        companies: CompanyCatalogs,
    ) -> Self {
        Self { items, products, companies }
    }

    pub fn items(&self) -> &EntityVec<InventoryItem> {
        &self.items
    }

    pub fn products(&self) -> &EntityVec<FinalProduct> {
        &self.products
    }

    pub fn company_catalogs(&self) -> &CompanyCatalogs {
        &self.companies
    }

    pub fn item(&self, id: InventoryItemId) -> Option<&InventoryItem> {
        self.items.get(&id)
    }

    pub fn product(&self, id: FinalProductId) -> Option<&FinalProduct> {
        self.products.get(&id)
    }

    // ── Inventory ────────────────────────────────────────────────────────────

    /// `stock = max(0, stock + delta)`. Returns the new stock, `None` if the item is unknown.
    ///
    /// Does not touch `usage_count`; pair with [`Self::adjust_usage`] where needed.
    pub fn adjust_stock(&mut self, id: InventoryItemId, delta: i64) -> Option<u64> {
        let Some(item) = self.items.get_mut(&id) else {
            debug!(item_id = %id, delta, "adjust_stock on unknown item ignored");
            return None;
        };
        let stock = item.apply_stock_delta(delta);
        debug!(item_id = %id, delta, stock, "stock adjusted");
        Some(stock)
    }

    /// `usage_count = max(0, usage_count + delta)`.
    pub fn adjust_usage(&mut self, id: InventoryItemId, delta: i64) -> Option<u64> {
        let Some(item) = self.items.get_mut(&id) else {
            debug!(item_id = %id, delta, "adjust_usage on unknown item ignored");
            return None;
        };
        let usage = item.apply_usage_delta(delta);
        debug!(item_id = %id, delta, usage, "usage adjusted");
        Some(usage)
    }

    pub fn create_item(&mut self, spec: NewInventoryItem) -> InventoryItem {
        let item = InventoryItem {
            id: InventoryItemId::new(),
            name: spec.name,
            category: spec.category,
            stock: spec.stock,
            minimum_stock: spec.minimum_stock,
            unit_price: spec.unit_price,
            available_for_orders: spec.available_for_orders,
            available_services: spec.available_services,
            usage_count: 0,
        };
        self.items.push(item.clone());
        item
    }

    pub fn update_item(&mut self, id: InventoryItemId, patch: InventoryItemPatch) -> Option<InventoryItem> {
        let item = self.items.get_mut(&id)?;
        item.apply_patch(patch);
        Some(item.clone())
    }

    /// Unconditional removal; products may be left referencing the id.
    pub fn delete_item(&mut self, id: InventoryItemId) -> Option<InventoryItem> {
        self.items.remove(&id)
    }

    /// Final products whose bill of materials mentions `id`.
    pub fn products_using(&self, id: InventoryItemId) -> impl Iterator<Item = &FinalProduct> {
        self.products.iter().filter(move |p| p.uses_item(id))
    }

    pub fn low_stock_items(&self) -> impl Iterator<Item = &InventoryItem> {
        self.items.iter().filter(|i| i.is_low_stock())
    }

    // ── Final products ───────────────────────────────────────────────────────

    /// Create a product, deriving the unit price from its materials when none is given.
    pub fn create_final_product(&mut self, spec: NewFinalProduct) -> DomainResult<FinalProduct> {
        self.ensure_materials_exist(&spec.bill_of_materials)?;
        let unit_price = spec
            .unit_price
            .unwrap_or_else(|| derive_unit_price(&spec.bill_of_materials, |id| self.items.get(&id)));
        let product = FinalProduct {
            id: FinalProductId::new(),
            name: spec.name,
            service: spec.service,
            bill_of_materials: spec.bill_of_materials,
            allowed_clients: spec.allowed_clients,
            unit_price,
            packaging: spec.packaging,
            garment: spec.garment,
        };
        self.products.push(product.clone());
        Ok(product)
    }

    /// Shallow merge. A replacement bill of materials must reference existing items.
    pub fn update_final_product(
        &mut self,
        id: FinalProductId,
        patch: FinalProductPatch,
    ) -> DomainResult<Option<FinalProduct>> {
        if let Some(bom) = &patch.bill_of_materials {
            self.ensure_materials_exist(bom)?;
        }
        let Some(product) = self.products.get_mut(&id) else {
            return Ok(None);
        };
        product.apply_patch(patch);
        Ok(Some(product.clone()))
    }

    pub fn delete_final_product(&mut self, id: FinalProductId) -> Option<FinalProduct> {
        self.products.remove(&id)
    }

    /// Products `client` may order, optionally narrowed to those serving `requested`.
    pub fn orderable_products(&self, client: UserId, requested: Option<&Service>) -> Vec<&FinalProduct> {
        self.products
            .iter()
            .filter(|p| p.is_orderable_by(client))
            .filter(|p| requested.is_none_or(|wanted| p.service.serves(wanted)))
            .collect()
    }

    // ── Company catalogs ─────────────────────────────────────────────────────

    pub fn set_company_catalog(&mut self, company: impl Into<String>, service: ServiceKind, garments: Vec<String>) {
        self.companies.set(company, service, garments);
    }

    pub fn company_catalog(&self, company: &str, service: ServiceKind) -> &[String] {
        self.companies.get(company, service)
    }

    fn ensure_materials_exist(&self, bom: &[MaterialLine]) -> DomainResult<()> {
        match bom.iter().find(|line| !self.items.contains(&line.item_id)) {
            Some(line) => Err(DomainError::validation(format!(
                "bill of materials references unknown inventory item {}",
                line.item_id
            ))),
            None => Ok(()),
        }
    }
}
