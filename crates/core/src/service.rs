//! Service lines offered by the shop.
//!
//! Shared vocabulary: products, orders, inventory availability and operator
//! specialties all speak in terms of `ServiceKind`.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Closed set of service lines.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    /// Screen printing on garments.
    #[serde(alias = "serigrafia")]
    Screenprint,
    /// Vinyl signage / vehicle wrapping.
    #[serde(alias = "rotulacion")]
    Signage,
    /// Direct-to-film transfers.
    Dtf,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 3] = [ServiceKind::Screenprint, ServiceKind::Signage, ServiceKind::Dtf];

    pub fn as_str(self) -> &'static str {
        match self {
            ServiceKind::Screenprint => "screenprint",
            ServiceKind::Signage => "signage",
            ServiceKind::Dtf => "dtf",
        }
    }

    /// Human-facing label.
    pub fn label(self) -> &'static str {
        match self {
            ServiceKind::Screenprint => "Screen printing",
            ServiceKind::Signage => "Signage",
            ServiceKind::Dtf => "DTF",
        }
    }
}

impl core::fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceKind {
    type Err = DomainError;

    /// Case-insensitive; also accepts the legacy tags stored by older data.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "screenprint" | "serigrafia" | "serigrafía" => Ok(ServiceKind::Screenprint),
            "signage" | "rotulacion" | "rotulación" => Ok(ServiceKind::Signage),
            "dtf" => Ok(ServiceKind::Dtf),
            other => Err(DomainError::validation(format!("unknown service: {other:?}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("SCREENPRINT".parse::<ServiceKind>().unwrap(), ServiceKind::Screenprint);
        assert_eq!(" Rotulacion ".parse::<ServiceKind>().unwrap(), ServiceKind::Signage);
    }

    #[test]
    fn unknown_service_is_a_validation_error() {
        assert!(matches!("embroidery".parse::<ServiceKind>(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn legacy_tag_deserializes() {
        let kind: ServiceKind = serde_json::from_str("\"serigrafia\"").unwrap();
        assert_eq!(kind, ServiceKind::Screenprint);
        assert_eq!(serde_json::to_string(&kind).unwrap(), "\"screenprint\"");
    }
}
