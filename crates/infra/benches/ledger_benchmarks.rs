use std::collections::BTreeSet;
use std::num::NonZeroU32;

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use realprint_auth::{NewUser, Role};
use realprint_catalog::{MaterialLine, NewFinalProduct, NewInventoryItem, Packaging, Service};
use realprint_core::{FinalProductId, Money, ServiceKind, UserId};
use realprint_infra::{InMemoryKeyValueStore, Ledger, LedgerConfig};
use realprint_orders::{plan_placement, ConsumptionPolicy, PlaceOrder};

type BenchLedger = Ledger<InMemoryKeyValueStore>;

/// Ledger with one screen-printing operator, one client and a boxed product
/// built from `materials` inventory items.
fn setup(materials: usize) -> (BenchLedger, UserId, FinalProductId) {
    let config = LedgerConfig {
        seed: false,
        ..LedgerConfig::default()
    };
    let mut ledger = Ledger::open(InMemoryKeyValueStore::new(), config).unwrap();

    ledger
        .create_user(NewUser {
            username: "printer".into(),
            password: "printer-pw".into(),
            name: "Printer".into(),
            email: "printer@realprint.test".into(),
            role: Role::Operator {
                specialty: ServiceKind::Screenprint,
            },
        })
        .unwrap();
    let client = ledger
        .create_user(NewUser {
            username: "club".into(),
            password: "club-pw".into(),
            name: "Club".into(),
            email: "club@realprint.test".into(),
            role: Role::Client { company: None },
        })
        .unwrap()
        .id;

    let lines = (0..materials)
        .map(|n| {
            let id = ledger
                .create_item(NewInventoryItem {
                    name: format!("Transfer {n}"),
                    category: "Transfer".into(),
                    stock: 1_000_000_000,
                    minimum_stock: 100,
                    unit_price: Money::from_cents(150),
                    available_for_orders: false,
                    available_services: BTreeSet::from([ServiceKind::Screenprint]),
                })
                .id;
            MaterialLine::new(id, 1)
        })
        .collect();

    let product = ledger
        .create_final_product(NewFinalProduct {
            name: "Home shirt".into(),
            service: Service::from(ServiceKind::Screenprint),
            bill_of_materials: lines,
            allowed_clients: BTreeSet::from([client]),
            unit_price: None,
            packaging: Packaging::Boxed {
                box_size: NonZeroU32::new(50).unwrap(),
            },
            garment: None,
        })
        .unwrap()
        .id;

    (ledger, client, product)
}

fn bench_place_order(c: &mut Criterion) {
    let (ledger, client, product) = setup(8);
    let product = ledger.final_product(product).unwrap().clone();
    let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
    let mut group = c.benchmark_group("place_order");

    for boxes in [1_i64, 10, 50] {
        let input = PlaceOrder::new(client, "Club", product.service, Some(product.id), boxes).unwrap();
        group.throughput(Throughput::Elements(boxes as u64));
        group.bench_with_input(BenchmarkId::new("boxes", boxes), &input, |b, input| {
            b.iter(|| {
                black_box(plan_placement(
                    input.clone(),
                    Some(&product),
                    ConsumptionPolicy::Legacy,
                    today,
                ))
            });
        });
    }

    group.finish();
}

fn bench_report(c: &mut Criterion) {
    let mut group = c.benchmark_group("report");

    for orders in [100_i64, 1_000] {
        let (mut ledger, client, product) = setup(8);
        let input = PlaceOrder::new(client, "Club", Service::from(ServiceKind::Screenprint), Some(product), orders).unwrap();
        ledger.place_order(input);

        group.throughput(Throughput::Elements(orders as u64));
        group.bench_with_input(BenchmarkId::new("orders", orders), &ledger, |b, ledger| {
            b.iter(|| black_box(ledger.report()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_place_order, bench_report);
criterion_main!(benches);
