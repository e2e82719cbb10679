//! The ledger service: every collection behind one explicit owner.
//!
//! Each write accessor mutates the in-memory collections first, then writes
//! back only the collections it touched. Write failures are logged and the
//! collection stays pending until the next successful write or [`Ledger::flush`];
//! the in-memory mutation is never rolled back.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info, warn};

use realprint_auth::{LoginOutcome, NewUser, Session, SessionUser, User, UserDirectory, UserPatch};
use realprint_catalog::{
    CatalogStore, CompanyCatalogs, FinalProduct, FinalProductPatch, InventoryItem, InventoryItemPatch,
    NewFinalProduct, NewInventoryItem, Service,
};
use realprint_core::{
    DomainError, DomainResult, EntityVec, FinalProductId, InventoryItemId, OrderId, ServiceKind, TaskId, UserId,
};
use realprint_orders::{
    on_delete, on_task_completed, on_transition, plan_placement, ConsumptionStep, MaterialMove, Order, OrderBook,
    OrderPatch, OrderState, PlaceOrder,
};
use realprint_tasks::{Task, TaskBoard, TaskState};

use crate::config::{IntegrityMode, LedgerConfig};
use crate::kv::{FileKeyValueStore, InMemoryKeyValueStore, KeyValueStore, StoreError};
use crate::persistence::{self, Collection};
use crate::reports::{self, DashboardStats, Report};
use crate::seed;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

pub struct Ledger<S: KeyValueStore> {
    config: LedgerConfig,
    store: S,
    catalog: CatalogStore,
    orders: OrderBook,
    tasks: TaskBoard,
    users: UserDirectory,
    session: Session,
    /// Collections changed in memory but not yet written.
    dirty: BTreeSet<Collection>,
}

/// Ledger over whichever store the configuration selects.
pub type ConfiguredLedger = Ledger<Arc<dyn KeyValueStore>>;

impl ConfiguredLedger {
    /// File-backed when `data_dir` is set, in-memory otherwise.
    pub fn from_config(config: LedgerConfig) -> Result<Self, LedgerError> {
        let store: Arc<dyn KeyValueStore> = match &config.data_dir {
            Some(dir) => Arc::new(FileKeyValueStore::open(dir)?),
            None => Arc::new(InMemoryKeyValueStore::new()),
        };
        Ledger::open(store, config)
    }
}

impl<S: KeyValueStore> Ledger<S> {
    /// Load every collection independently from `store`.
    ///
    /// A missing or unreadable collection falls back to the seed dataset (or
    /// to empty when seeding is off) and is written back straight away.
    pub fn open(store: S, config: LedgerConfig) -> Result<Self, LedgerError> {
        let mut dirty = BTreeSet::new();
        let seed = config.seed;

        let items: EntityVec<InventoryItem> = load_or(&store, Collection::Inventory, &mut dirty, || {
            Ok(if seed { seed::inventory() } else { EntityVec::new() })
        })?;
        let products: EntityVec<FinalProduct> = load_or(&store, Collection::FinalProducts, &mut dirty, || {
            Ok(if seed { seed::final_products() } else { EntityVec::new() })
        })?;
        let companies = load_or(&store, Collection::CompanyCatalogs, &mut dirty, || {
            Ok(if seed { seed::company_catalogs() } else { CompanyCatalogs::new() })
        })?;
        let orders: EntityVec<Order> = load_or(&store, Collection::Orders, &mut dirty, || Ok(EntityVec::new()))?;
        let tasks: EntityVec<Task> = load_or(&store, Collection::Tasks, &mut dirty, || Ok(EntityVec::new()))?;
        let users: EntityVec<User> = load_or(&store, Collection::Users, &mut dirty, || {
            if seed { seed::users() } else { Ok(EntityVec::new()) }
        })?;
        let current = match persistence::load::<Option<SessionUser>, _>(&store, Collection::Session) {
            Ok(session) => session.flatten(),
            Err(StoreError::Serialization(e)) => {
                warn!(error = %e, "discarding unreadable session");
                None
            }
            Err(e) => return Err(e.into()),
        };

        info!(
            items = items.len(),
            products = products.len(),
            orders = orders.len(),
            tasks = tasks.len(),
            users = users.len(),
            consumption = ?config.consumption,
            integrity = ?config.integrity,
            "ledger opened"
        );

        let mut ledger = Self {
            config,
            store,
            catalog: CatalogStore::from_parts(items, products, companies),
            orders: OrderBook::from_orders(orders),
            tasks: TaskBoard::from_tasks(tasks),
            users: UserDirectory::from_users(users),
            session: Session::restore(current),
            dirty,
        };
        ledger.persist();
        Ok(ledger)
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Collections whose last write failed (or has not happened yet).
    pub fn pending_writes(&self) -> impl Iterator<Item = Collection> + '_ {
        self.dirty.iter().copied()
    }

    // ── Read accessors ───────────────────────────────────────────────────────

    pub fn list_orders(&self) -> &[Order] {
        self.orders.orders().as_slice()
    }

    pub fn list_inventory(&self) -> &[InventoryItem] {
        self.catalog.items().as_slice()
    }

    pub fn list_final_products(&self) -> &[FinalProduct] {
        self.catalog.products().as_slice()
    }

    pub fn list_tasks(&self) -> &[Task] {
        self.tasks.tasks().as_slice()
    }

    pub fn list_users(&self) -> &[User] {
        self.users.users().as_slice()
    }

    pub fn order(&self, id: OrderId) -> Option<&Order> {
        self.orders.order(id)
    }

    pub fn item(&self, id: InventoryItemId) -> Option<&InventoryItem> {
        self.catalog.item(id)
    }

    pub fn final_product(&self, id: FinalProductId) -> Option<&FinalProduct> {
        self.catalog.product(id)
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.task(id)
    }

    pub fn task_for_order(&self, id: OrderId) -> Option<&Task> {
        self.tasks.for_order(id)
    }

    pub fn user(&self, id: UserId) -> Option<&User> {
        self.users.user(id)
    }

    pub fn orders_for_client(&self, client: UserId) -> Vec<&Order> {
        self.orders.for_client(client).collect()
    }

    pub fn tasks_for_operator(&self, operator: UserId) -> Vec<&Task> {
        self.tasks.for_operator(operator).collect()
    }

    /// Products `client` may order, optionally narrowed to a requested service.
    pub fn orderable_products(&self, client: UserId, requested: Option<&Service>) -> Vec<&FinalProduct> {
        self.catalog.orderable_products(client, requested)
    }

    pub fn company_catalog(&self, company: &str, service: ServiceKind) -> &[String] {
        self.catalog.company_catalog(company, service)
    }

    pub fn low_stock_items(&self) -> Vec<&InventoryItem> {
        self.catalog.low_stock_items().collect()
    }

    // ── Orders ───────────────────────────────────────────────────────────────

    /// Place an order; a boxed product ordered by several boxes yields one
    /// order per box. Returns every created order.
    pub fn place_order(&mut self, input: PlaceOrder) -> Vec<Order> {
        let product = input.final_product_id.and_then(|id| self.catalog.product(id)).cloned();
        if product.is_none() {
            if let Some(id) = input.final_product_id {
                debug!(final_product_id = %id, "order references an unknown product; no materials reserved");
            }
        }

        let now = Utc::now();
        let placement = plan_placement(input, product.as_ref(), self.config.consumption, now.date_naive());

        self.apply_moves(&placement.moves);
        self.orders.insert(placement.orders.clone());
        self.dirty.insert(Collection::Orders);

        for order in &placement.orders {
            if self.tasks.create_for_order(order, &self.users, now).is_some() {
                self.dirty.insert(Collection::Tasks);
            }
        }

        info!(
            orders = placement.orders.len(),
            fan_out = placement.is_fan_out(),
            material_moves = placement.moves.len(),
            "order placed"
        );
        self.persist();
        placement.orders
    }

    /// Shallow-merge edit; prices are not recomputed.
    pub fn update_order(&mut self, id: OrderId, patch: OrderPatch) -> Option<Order> {
        let Some(order) = self.orders.update(id, patch) else {
            debug!(order_id = %id, "update of unknown order ignored");
            return None;
        };
        self.dirty.insert(Collection::Orders);
        info!(order_id = %id, "order updated");
        self.persist();
        Some(order)
    }

    /// Remove the order and its task, whatever its state.
    pub fn delete_order(&mut self, id: OrderId) -> Option<Order> {
        let Some(order) = self.orders.remove(id) else {
            debug!(order_id = %id, "delete of unknown order ignored");
            return None;
        };
        self.dirty.insert(Collection::Orders);

        if let Some(product) = self.product_of(&order) {
            if let Some(step) = on_delete(self.config.consumption, &order, &product) {
                self.apply_moves(&step.moves);
            }
        }

        let dropped = self.tasks.remove_for_order(id);
        if dropped > 0 {
            self.dirty.insert(Collection::Tasks);
        }

        info!(order_id = %id, tasks_removed = dropped, "order deleted");
        self.persist();
        Some(order)
    }

    /// Administrator state change, with the inventory side effects of the
    /// configured consumption policy.
    ///
    /// Not idempotent on inventory under the legacy policy: moving an
    /// in-progress order to in-progress again consumes its materials again.
    pub fn set_order_state(&mut self, id: OrderId, next: OrderState) -> Option<Order> {
        let Some(order) = self.orders.order(id).cloned() else {
            debug!(order_id = %id, state = %next, "state change of unknown order ignored");
            return None;
        };

        if let Some(product) = self.product_of(&order) {
            if let Some(step) = on_transition(self.config.consumption, &order, &product, next) {
                self.apply_step(id, step);
            }
        }

        self.orders.set_state(id, next);
        self.dirty.insert(Collection::Orders);
        info!(order_id = %id, from = %order.state, to = %next, "order state changed");
        self.persist();
        self.orders.order(id).cloned()
    }

    // ── Tasks ────────────────────────────────────────────────────────────────

    /// Change the task state only.
    pub fn set_task_state(&mut self, id: TaskId, state: TaskState) -> Option<Task> {
        let Some(task) = self.tasks.set_state(id, state) else {
            debug!(task_id = %id, "state change of unknown task ignored");
            return None;
        };
        self.dirty.insert(Collection::Tasks);
        info!(task_id = %id, ?state, "task state changed");
        self.persist();
        Some(task)
    }

    /// Operator update: the task state is mirrored onto its order, and
    /// completing the task consumes the order's materials.
    ///
    /// The mirrored order state is a plain write; administrator transition
    /// effects do not run on this path.
    pub fn operator_set_task_state(&mut self, id: TaskId, state: TaskState) -> Option<Task> {
        let task = self.set_task_state(id, state)?;

        let Some(order) = self.orders.order(task.order_id).cloned() else {
            debug!(task_id = %id, order_id = %task.order_id, "task refers to a deleted order");
            return Some(task);
        };

        if state == TaskState::Completed {
            if let Some(product) = self.product_of(&order) {
                if let Some(step) = on_task_completed(self.config.consumption, &order, &product) {
                    self.apply_step(order.id, step);
                }
            }
        }

        self.orders.set_state(order.id, state.as_order_state());
        self.dirty.insert(Collection::Orders);
        info!(task_id = %id, order_id = %order.id, ?state, "order state mirrored from task");
        self.persist();
        Some(task)
    }

    // ── Catalog ──────────────────────────────────────────────────────────────

    pub fn create_item(&mut self, spec: NewInventoryItem) -> InventoryItem {
        let item = self.catalog.create_item(spec);
        self.dirty.insert(Collection::Inventory);
        self.persist();
        item
    }

    pub fn update_item(&mut self, id: InventoryItemId, patch: InventoryItemPatch) -> Option<InventoryItem> {
        let item = self.catalog.update_item(id, patch)?;
        self.dirty.insert(Collection::Inventory);
        self.persist();
        Some(item)
    }

    /// `stock = max(0, stock + delta)`; returns the new stock.
    pub fn adjust_stock(&mut self, id: InventoryItemId, delta: i64) -> Option<u64> {
        let stock = self.catalog.adjust_stock(id, delta)?;
        self.dirty.insert(Collection::Inventory);
        self.persist();
        Some(stock)
    }

    pub fn adjust_usage(&mut self, id: InventoryItemId, delta: i64) -> Option<u64> {
        let usage = self.catalog.adjust_usage(id, delta)?;
        self.dirty.insert(Collection::Inventory);
        self.persist();
        Some(usage)
    }

    /// Under strict integrity, an item still used by a bill of materials is
    /// not deleted.
    pub fn delete_item(&mut self, id: InventoryItemId) -> DomainResult<Option<InventoryItem>> {
        if self.config.integrity == IntegrityMode::Strict {
            if let Some(product) = self.catalog.products_using(id).next() {
                return Err(DomainError::conflict(format!(
                    "inventory item {id} is used by final product {}",
                    product.id
                )));
            }
        }
        let removed = self.catalog.delete_item(id);
        if removed.is_some() {
            self.dirty.insert(Collection::Inventory);
            info!(item_id = %id, "inventory item deleted");
            self.persist();
        }
        Ok(removed)
    }

    pub fn create_final_product(&mut self, spec: NewFinalProduct) -> DomainResult<FinalProduct> {
        let product = self.catalog.create_final_product(spec)?;
        self.dirty.insert(Collection::FinalProducts);
        self.persist();
        Ok(product)
    }

    pub fn update_final_product(
        &mut self,
        id: FinalProductId,
        patch: FinalProductPatch,
    ) -> DomainResult<Option<FinalProduct>> {
        let updated = self.catalog.update_final_product(id, patch)?;
        if updated.is_some() {
            self.dirty.insert(Collection::FinalProducts);
            self.persist();
        }
        Ok(updated)
    }

    /// Under strict integrity, a product referenced by any order is not deleted.
    pub fn delete_final_product(&mut self, id: FinalProductId) -> DomainResult<Option<FinalProduct>> {
        if self.config.integrity == IntegrityMode::Strict && self.orders.references_product(id) {
            return Err(DomainError::conflict(format!("final product {id} is referenced by orders")));
        }
        let removed = self.catalog.delete_final_product(id);
        if removed.is_some() {
            self.dirty.insert(Collection::FinalProducts);
            info!(final_product_id = %id, "final product deleted");
            self.persist();
        }
        Ok(removed)
    }

    pub fn set_company_catalog(&mut self, company: &str, service: ServiceKind, garments: Vec<String>) {
        self.catalog.set_company_catalog(company, service, garments);
        self.dirty.insert(Collection::CompanyCatalogs);
        info!(company, %service, "company catalog replaced");
        self.persist();
    }

    // ── Users and session ────────────────────────────────────────────────────

    pub fn create_user(&mut self, spec: NewUser) -> DomainResult<User> {
        let user = self.users.create_user(spec)?;
        self.dirty.insert(Collection::Users);
        self.persist();
        Ok(user)
    }

    pub fn update_user(&mut self, id: UserId, patch: UserPatch) -> DomainResult<Option<User>> {
        let updated = self.users.update_user(id, patch)?;
        if updated.is_some() {
            self.dirty.insert(Collection::Users);
            self.persist();
        }
        Ok(updated)
    }

    /// Soft delete: the account stays but can no longer sign in or receive tasks.
    pub fn deactivate_user(&mut self, id: UserId) -> Option<User> {
        let user = self.users.set_active(id, false)?;
        self.dirty.insert(Collection::Users);
        self.persist();
        Some(user)
    }

    pub fn toggle_user_active(&mut self, id: UserId) -> Option<User> {
        let user = self.users.toggle_active(id)?;
        self.dirty.insert(Collection::Users);
        self.persist();
        Some(user)
    }

    /// Hard delete. Tasks already bound to the user keep the dangling id.
    pub fn delete_user(&mut self, id: UserId) -> Option<User> {
        let user = self.users.delete_user(id)?;
        self.dirty.insert(Collection::Users);
        info!(user_id = %id, "user deleted");
        self.persist();
        Some(user)
    }

    /// A failed login leaves any existing session untouched.
    pub fn login(&mut self, username: &str, password: &str) -> LoginOutcome {
        let outcome = self.users.authenticate(username, password);
        if self.session.apply(&outcome) {
            self.dirty.insert(Collection::Session);
            self.persist();
        }
        outcome
    }

    pub fn logout(&mut self) -> Option<SessionUser> {
        let previous = self.session.clear()?;
        self.dirty.insert(Collection::Session);
        info!(user_id = %previous.id, "logged out");
        self.persist();
        Some(previous)
    }

    pub fn current_user(&self) -> Option<&SessionUser> {
        self.session.current()
    }

    // ── Statistics ───────────────────────────────────────────────────────────

    pub fn statistics(&self) -> DashboardStats {
        reports::dashboard_stats(self.list_orders(), self.list_inventory(), self.list_users())
    }

    pub fn report(&self) -> Report {
        Report::build(
            self.list_orders(),
            self.list_inventory(),
            self.catalog.products(),
            self.list_users(),
        )
    }

    // ── Persistence ──────────────────────────────────────────────────────────

    /// Write every pending collection, stopping at the first failure.
    pub fn flush(&mut self) -> Result<(), StoreError> {
        while let Some(collection) = self.dirty.first().copied() {
            self.write(collection)?;
            self.dirty.remove(&collection);
        }
        Ok(())
    }

    /// Best-effort write of pending collections; failures stay pending.
    fn persist(&mut self) {
        let pending: Vec<Collection> = self.dirty.iter().copied().collect();
        for collection in pending {
            match self.write(collection) {
                Ok(()) => {
                    self.dirty.remove(&collection);
                }
                Err(e) => warn!(%collection, error = %e, "failed to persist collection"),
            }
        }
    }

    fn write(&self, collection: Collection) -> Result<(), StoreError> {
        match collection {
            Collection::Inventory => persistence::save(&self.store, collection, self.catalog.items()),
            Collection::FinalProducts => persistence::save(&self.store, collection, self.catalog.products()),
            Collection::CompanyCatalogs => {
                persistence::save(&self.store, collection, self.catalog.company_catalogs())
            }
            Collection::Orders => persistence::save(&self.store, collection, self.orders.orders()),
            Collection::Tasks => persistence::save(&self.store, collection, self.tasks.tasks()),
            Collection::Users => persistence::save(&self.store, collection, self.users.users()),
            Collection::Session => match self.session.current() {
                Some(user) => persistence::save(&self.store, collection, user),
                None => self.store.remove(collection.key()),
            },
        }
    }

    // ── Helpers ──────────────────────────────────────────────────────────────

    fn product_of(&self, order: &Order) -> Option<FinalProduct> {
        order.final_product_id.and_then(|id| self.catalog.product(id)).cloned()
    }

    fn apply_step(&mut self, order_id: OrderId, step: ConsumptionStep) {
        self.apply_moves(&step.moves);
        self.orders.set_phase(order_id, step.phase);
        self.dirty.insert(Collection::Orders);
    }

    /// Moves against deleted items are skipped.
    fn apply_moves(&mut self, moves: &[MaterialMove]) {
        for mv in moves {
            let mut touched = false;
            if mv.stock_delta != 0 {
                touched |= self.catalog.adjust_stock(mv.item_id, mv.stock_delta).is_some();
            }
            if mv.usage_delta != 0 {
                touched |= self.catalog.adjust_usage(mv.item_id, mv.usage_delta).is_some();
            }
            if touched {
                self.dirty.insert(Collection::Inventory);
            }
        }
    }
}

/// Load `collection`, or build it with `fallback` and mark it for writing.
fn load_or<T, S>(
    store: &S,
    collection: Collection,
    dirty: &mut BTreeSet<Collection>,
    fallback: impl FnOnce() -> DomainResult<T>,
) -> Result<T, LedgerError>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    match persistence::load(store, collection) {
        Ok(Some(value)) => return Ok(value),
        Ok(None) => debug!(%collection, "collection missing; using fallback"),
        Err(StoreError::Serialization(e)) => {
            warn!(%collection, error = %e, "collection unreadable; using fallback")
        }
        Err(e) => return Err(e.into()),
    }
    dirty.insert(collection);
    Ok(fallback()?)
}
