//! Demo dataset loaded for collections missing from the store.
//!
//! Ids are fixed so references between seeded records (bill of materials,
//! product allow-lists) stay valid across restarts.

use std::collections::BTreeSet;
use std::num::NonZeroU32;

use uuid::Uuid;

use realprint_auth::{Credential, Role, User};
use realprint_catalog::{
    CompanyCatalogs, FinalProduct, GarmentDescriptor, GarmentSupplier, InventoryItem, MaterialLine, Packaging,
    ScreenprintOption, Service,
};
use realprint_core::{DomainResult, EntityVec, FinalProductId, InventoryItemId, Money, ServiceKind, UserId};

pub const ADMIN_ID: UserId = UserId::from_uuid(Uuid::from_u128(0x0192_0000_0000_7000_8000_0000_0000_0001));
pub const CLIENT_ID: UserId = UserId::from_uuid(Uuid::from_u128(0x0192_0000_0000_7000_8000_0000_0000_0002));
pub const SCREENPRINT_OPERATOR_ID: UserId =
    UserId::from_uuid(Uuid::from_u128(0x0192_0000_0000_7000_8000_0000_0000_0003));
pub const SIGNAGE_OPERATOR_ID: UserId = UserId::from_uuid(Uuid::from_u128(0x0192_0000_0000_7000_8000_0000_0000_0004));

/// Company whose garment catalog is seeded.
pub const DEMO_COMPANY: &str = "4";

const fn item_id(n: u128) -> InventoryItemId {
    InventoryItemId::from_uuid(Uuid::from_u128(0x0192_0000_0000_7000_8000_0001_0000_0000 | n))
}

const fn product_id(n: u128) -> FinalProductId {
    FinalProductId::from_uuid(Uuid::from_u128(0x0192_0000_0000_7000_8000_0002_0000_0000 | n))
}

/// Shirts per box.
const SHIRT_BOX: NonZeroU32 = NonZeroU32::MIN.saturating_add(49);

pub const VINYL_ITEM_ID: InventoryItemId = item_id(4);
pub const VINYL_PRODUCT_ID: FinalProductId = product_id(1);
pub const HOME_SHIRT_PRODUCT_ID: FinalProductId = product_id(2);

fn transfer(n: u128, name: &str, stock: u64, cents: i64) -> InventoryItem {
    InventoryItem {
        id: item_id(n),
        name: name.to_string(),
        category: "Transfer".to_string(),
        stock,
        minimum_stock: 2500,
        unit_price: Money::from_cents(cents),
        available_for_orders: false,
        available_services: BTreeSet::from([ServiceKind::Screenprint]),
        usage_count: 0,
    }
}

pub fn inventory() -> EntityVec<InventoryItem> {
    EntityVec::from(vec![
        transfer(1, "ESCUDO ADULTO", 20_000, 200),
        transfer(2, "MARCAJE DIGI 1ª EQUIPACION", 20_000, 150),
        transfer(3, "MARCAJE ORIGEN 1ªEQUIPACION", 20_000, 100),
        InventoryItem {
            id: VINYL_ITEM_ID,
            name: "VINILO NEGRO MATE 5 AÑOS".to_string(),
            category: "Vinilo".to_string(),
            stock: 67,
            minimum_stock: 15,
            unit_price: Money::from_euros(27),
            available_for_orders: true,
            available_services: BTreeSet::from([ServiceKind::Signage]),
            usage_count: 0,
        },
        transfer(5, "MARCAJE PROD.OFICIAL", 20_000, 100),
        transfer(6, "MARCAJE INTEGRA 1ªEQUIPACION", 20_000, 100),
        transfer(7, "PARCHE LIGA", 20_000, 200),
        transfer(8, "MARCAJE CENTRAL LECHERA 1ªEQUIPACION", 20_000, 100),
        transfer(9, "MARCAJE HYUNDAI 1ªEQUIPACION", 19_986, 150),
    ])
}

pub fn final_products() -> EntityVec<FinalProduct> {
    let home_shirt_bom = [1, 2, 3, 5, 6, 7, 8, 9]
        .into_iter()
        .map(|n| MaterialLine::new(item_id(n), 1))
        .collect();

    EntityVec::from(vec![
        FinalProduct {
            id: VINYL_PRODUCT_ID,
            name: "VINILO NEGRO MATE 5 AÑOS".to_string(),
            service: Service::Signage,
            bill_of_materials: vec![MaterialLine::new(VINYL_ITEM_ID, 1)],
            allowed_clients: BTreeSet::from([CLIENT_ID]),
            unit_price: Money::from_euros(27),
            packaging: Packaging::Unit,
            garment: None,
        },
        FinalProduct {
            id: HOME_SHIRT_PRODUCT_ID,
            name: "CAMISETA 1ª EQUIPACIÓN 128 (niño)".to_string(),
            service: Service::Screenprint {
                option: ScreenprintOption::PrintAndPress {
                    garment_supplier: GarmentSupplier::Client,
                },
            },
            bill_of_materials: home_shirt_bom,
            allowed_clients: BTreeSet::from([CLIENT_ID]),
            unit_price: Money::from_euros(11),
            packaging: Packaging::Boxed { box_size: SHIRT_BOX },
            garment: Some(GarmentDescriptor {
                garment: Some("Camiseta".to_string()),
                model: Some("1ª equipación".to_string()),
                size: Some("128".to_string()),
            }),
        },
    ])
}

pub fn company_catalogs() -> CompanyCatalogs {
    let mut catalogs = CompanyCatalogs::new();
    catalogs.set(
        DEMO_COMPANY,
        ServiceKind::Dtf,
        ["Camiseta", "Pantalón", "Chándal", "Anorak"].map(String::from).to_vec(),
    );
    catalogs.set(
        DEMO_COMPANY,
        ServiceKind::Signage,
        ["Furgoneta", "Balón", "Botella"].map(String::from).to_vec(),
    );
    catalogs
}

/// Demo accounts. Hashing the demo passwords is the only fallible part.
pub fn users() -> DomainResult<EntityVec<User>> {
    let user = |id, username: &str, password: &str, name: &str, email: &str, role| -> DomainResult<User> {
        Ok(User {
            id,
            username: username.to_string(),
            credential: Credential::hash(password)?,
            name: name.to_string(),
            email: email.to_string(),
            role,
            active: true,
        })
    };

    Ok(EntityVec::from(vec![
        user(ADMIN_ID, "admin", "admin123", "Administrador", "admin@realprint.com", Role::Admin)?,
        user(
            CLIENT_ID,
            "cliente",
            "cliente123",
            "Cliente Demo",
            "cliente@email.com",
            Role::Client { company: None },
        )?,
        user(
            SCREENPRINT_OPERATOR_ID,
            "operario_demo_serigrafia",
            "operario123",
            "Operario Demo Serigrafía",
            "operario_demo_serigrafia@email.com",
            Role::Operator {
                specialty: ServiceKind::Screenprint,
            },
        )?,
        user(
            SIGNAGE_OPERATOR_ID,
            "operario_demo_rotulacion",
            "operario123",
            "Operario Demo Rotulación",
            "operario_demo_rotulacion@email.com",
            Role::Operator {
                specialty: ServiceKind::Signage,
            },
        )?,
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use realprint_core::Entity;

    #[test]
    fn seeded_products_reference_seeded_items() {
        let items = inventory();
        for product in final_products().iter() {
            for line in &product.bill_of_materials {
                assert!(items.contains(&line.item_id), "{} references a missing item", product.name);
            }
        }
    }

    #[test]
    fn seeded_box_is_fifty() {
        let products = final_products();
        let shirt = products.get(&HOME_SHIRT_PRODUCT_ID).unwrap();
        assert_eq!(shirt.packaging.box_size(), Some(50));
        assert_eq!(shirt.bill_of_materials.len(), 8);
    }

    #[test]
    fn demo_accounts_verify() {
        let users = users().unwrap();
        let admin = users.get(&ADMIN_ID).unwrap();
        assert_eq!(*admin.id(), ADMIN_ID);
        assert!(admin.credential.verify("admin123"));
        assert!(!admin.credential.verify("wrongpass"));
        assert_eq!(users.len(), 4);
    }
}
