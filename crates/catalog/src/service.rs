//! Service variants with their variant-specific attributes.
//!
//! Screen printing is the only line with sub-services; the "print and press"
//! sub-service additionally needs to know who supplies the garments.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use realprint_core::{DomainError, DomainResult, ServiceKind};

/// Who provides the garments for a print-and-press job.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GarmentSupplier {
    /// The client brings their own garments.
    Client,
    /// The shop sources the garments.
    Shop,
    /// Product works either way (only meaningful on catalog products).
    Both,
}

impl GarmentSupplier {
    /// Whether a product offering `self` can serve a request for `requested`.
    pub fn covers(self, requested: GarmentSupplier) -> bool {
        self == GarmentSupplier::Both || self == requested
    }
}

impl FromStr for GarmentSupplier {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s.split_whitespace().collect::<String>().to_lowercase();
        match normalized.as_str() {
            "client" | "cliente_ropa" => Ok(GarmentSupplier::Client),
            "shop" | "realprint_ropa" => Ok(GarmentSupplier::Shop),
            "both" | "ambas" => Ok(GarmentSupplier::Both),
            other => Err(DomainError::validation(format!("unknown garment supplier: {other:?}"))),
        }
    }
}

/// Screen printing sub-service.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScreenprintOption {
    PrintOnly,
    PrintAndPress { garment_supplier: GarmentSupplier },
}

/// Service requested by an order or offered by a final product.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "service", rename_all = "snake_case")]
pub enum Service {
    Screenprint { option: ScreenprintOption },
    Signage,
    Dtf,
}

impl Service {
    /// Build a service from loosely-typed form input.
    ///
    /// `subservice` is required for screen printing; `garment_supplier` is
    /// required for print-and-press and ignored elsewhere.
    pub fn parse(service: &str, subservice: Option<&str>, garment_supplier: Option<&str>) -> DomainResult<Self> {
        let kind: ServiceKind = service.parse()?;
        match kind {
            ServiceKind::Signage => Ok(Service::Signage),
            ServiceKind::Dtf => Ok(Service::Dtf),
            ServiceKind::Screenprint => {
                let sub = subservice
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| DomainError::validation("screen printing requires a subservice"))?;
                let option = match sub.to_lowercase().as_str() {
                    "print_only" | "solo_serigrafia" => ScreenprintOption::PrintOnly,
                    "print_and_press" | "serigrafia+planchado" => {
                        let supplier = garment_supplier
                            .map(str::trim)
                            .filter(|s| !s.is_empty())
                            .ok_or_else(|| DomainError::validation("print and press requires a garment supplier"))?
                            .parse()?;
                        ScreenprintOption::PrintAndPress { garment_supplier: supplier }
                    }
                    other => return Err(DomainError::validation(format!("unknown subservice: {other:?}"))),
                };
                Ok(Service::Screenprint { option })
            }
        }
    }

    pub fn kind(&self) -> ServiceKind {
        match self {
            Service::Screenprint { .. } => ServiceKind::Screenprint,
            Service::Signage => ServiceKind::Signage,
            Service::Dtf => ServiceKind::Dtf,
        }
    }

    pub fn garment_supplier(&self) -> Option<GarmentSupplier> {
        match self {
            Service::Screenprint { option: ScreenprintOption::PrintAndPress { garment_supplier } } => Some(*garment_supplier),
            _ => None,
        }
    }

    /// Orders name a concrete supplier; `Both` is a catalog-only value.
    pub fn validate_for_order(&self) -> DomainResult<()> {
        if self.garment_supplier() == Some(GarmentSupplier::Both) {
            return Err(DomainError::validation("an order must name a single garment supplier"));
        }
        Ok(())
    }

    /// Whether a product offering `self` can fulfil a request for `requested`.
    pub fn serves(&self, requested: &Service) -> bool {
        match (self, requested) {
            (Service::Screenprint { option: offered }, Service::Screenprint { option: wanted }) => match (offered, wanted) {
                (ScreenprintOption::PrintOnly, ScreenprintOption::PrintOnly) => true,
                (
                    ScreenprintOption::PrintAndPress { garment_supplier: offered },
                    ScreenprintOption::PrintAndPress { garment_supplier: wanted },
                ) => offered.covers(*wanted),
                _ => false,
            },
            (offered, wanted) => offered.kind() == wanted.kind(),
        }
    }
}

impl From<ServiceKind> for Service {
    /// Screen printing defaults to print-only when nothing more specific is known.
    fn from(kind: ServiceKind) -> Self {
        match kind {
            ServiceKind::Screenprint => Service::Screenprint { option: ScreenprintOption::PrintOnly },
            ServiceKind::Signage => Service::Signage,
            ServiceKind::Dtf => Service::Dtf,
        }
    }
}
