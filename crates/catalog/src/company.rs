use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use realprint_core::ServiceKind;

/// Garments/objects each client company works with, per service line.
///
/// Persisted as `{ company: { service: [garment, ...] } }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompanyCatalogs(BTreeMap<String, BTreeMap<ServiceKind, Vec<String>>>);

impl CompanyCatalogs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the list for `company`/`service`, leaving other services intact.
    pub fn set(&mut self, company: impl Into<String>, service: ServiceKind, garments: Vec<String>) {
        self.0.entry(company.into()).or_default().insert(service, garments);
    }

    /// Garments for `company`/`service`; empty when none were configured.
    pub fn get(&self, company: &str, service: ServiceKind) -> &[String] {
        self.0
            .get(company)
            .and_then(|by_service| by_service.get(&service))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
