//! Entity trait: identity + continuity across state changes.
//!
//! `EntityVec` is the flat, ordered collection every store keeps its records in.
//! Order matters: it is the display order and the tie-break order for reports.

use serde::{Deserialize, Serialize};

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

/// Ordered collection of entities addressed by id.
///
/// Lookups are linear, matching the size of the collections involved (a shop's
/// worth of orders and materials). Serializes as a plain JSON array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityVec<T> {
    records: Vec<T>,
}

impl<T> Default for EntityVec<T> {
    fn default() -> Self {
        Self { records: Vec::new() }
    }
}

impl<T> From<Vec<T>> for EntityVec<T> {
    fn from(records: Vec<T>) -> Self {
        Self { records }
    }
}

impl<T: Entity> EntityVec<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.records
    }

    pub fn iter(&self) -> core::slice::Iter<'_, T> {
        self.records.iter()
    }

    pub fn get(&self, id: &T::Id) -> Option<&T> {
        self.records.iter().find(|r| r.id() == id)
    }

    pub fn get_mut(&mut self, id: &T::Id) -> Option<&mut T> {
        self.records.iter_mut().find(|r| r.id() == id)
    }

    pub fn contains(&self, id: &T::Id) -> bool {
        self.get(id).is_some()
    }

    /// Append at the end (catalog and user collections grow this way).
    pub fn push(&mut self, record: T) {
        self.records.push(record);
    }

    /// Insert before all existing records (newest-first collections).
    pub fn prepend(&mut self, records: impl IntoIterator<Item = T>) {
        let mut fresh: Vec<T> = records.into_iter().collect();
        fresh.append(&mut self.records);
        self.records = fresh;
    }

    /// Remove the record with `id`, returning it.
    pub fn remove(&mut self, id: &T::Id) -> Option<T> {
        let idx = self.records.iter().position(|r| r.id() == id)?;
        Some(self.records.remove(idx))
    }

    /// Remove every record matching `pred`, returning how many were dropped.
    pub fn remove_where(&mut self, mut pred: impl FnMut(&T) -> bool) -> usize {
        let before = self.records.len();
        self.records.retain(|r| !pred(r));
        before - self.records.len()
    }
}

impl<'a, T> IntoIterator for &'a EntityVec<T> {
    type Item = &'a T;
    type IntoIter = core::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
