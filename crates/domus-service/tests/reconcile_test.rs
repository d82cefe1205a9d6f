//! Integration tests for the reading reconciliation engine using
//! in-memory SurrealDB.

use chrono::Utc;
use domus_core::error::DomusError;
use domus_core::models::apartment::CreateApartment;
use domus_core::models::counter::{CounterKind, CreateCounter};
use domus_core::models::house::{CreateHouse, UpdateHouse};
use domus_core::models::reading::CreateReading;
use domus_core::models::user::{Principal, Role};
use domus_core::repository::{
    ApartmentRepository, CounterRepository, HouseRepository, ReadingRepository,
};
use domus_db::repository::{
    SurrealApartmentRepository, SurrealCounterRepository, SurrealHouseRepository,
    SurrealReadingRepository,
};
use domus_service::ReconcileService;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

struct Harness {
    service: ReconcileService<
        SurrealHouseRepository<Db>,
        SurrealApartmentRepository<Db>,
        SurrealCounterRepository<Db>,
        SurrealReadingRepository<Db>,
    >,
    readings: SurrealReadingRepository<Db>,
    manager: Principal,
    house_id: Uuid,
    /// Apartments "1" and "2"; "3" has no counters.
    counter_a: Uuid,
    counter_b: Uuid,
}

async fn setup() -> Harness {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    domus_db::run_migrations(&db).await.unwrap();

    let house_repo = SurrealHouseRepository::new(db.clone());
    let apartment_repo = SurrealApartmentRepository::new(db.clone());
    let counter_repo = SurrealCounterRepository::new(db.clone());
    let reading_repo = SurrealReadingRepository::new(db);

    let manager = Principal::new(Uuid::new_v4(), Role::User);
    let house = house_repo
        .create(CreateHouse {
            address: "1 Ledger St".into(),
            info: String::new(),
        })
        .await
        .unwrap();
    house_repo
        .update(
            house.id,
            UpdateHouse {
                managers: Some(vec![manager.user_id]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let mut apartment_ids = Vec::new();
    for number in ["1", "2", "3"] {
        let apartment = apartment_repo
            .create(CreateApartment {
                house_id: house.id,
                owner_id: Uuid::new_v4(),
                entrance: "1".into(),
                floor: "1".into(),
                number: number.into(),
            })
            .await
            .unwrap();
        apartment_ids.push(apartment.id);
    }

    let counter_a = counter_repo
        .create(CreateCounter {
            apartment_id: apartment_ids[0],
            kind: CounterKind::Electricity,
            serial_number: "E-A".into(),
            name: "hall".into(),
            active: true,
        })
        .await
        .unwrap();
    let counter_b = counter_repo
        .create(CreateCounter {
            apartment_id: apartment_ids[1],
            kind: CounterKind::Electricity,
            serial_number: "E-B".into(),
            name: "hall".into(),
            active: true,
        })
        .await
        .unwrap();

    Harness {
        service: ReconcileService::new(house_repo, apartment_repo, counter_repo, reading_repo.clone()),
        readings: reading_repo,
        manager,
        house_id: house.id,
        counter_a: counter_a.id,
        counter_b: counter_b.id,
    }
}

async fn record(h: &Harness, counter_id: Uuid, value: f64, year: i32, month: u32) {
    h.readings
        .create(CreateReading {
            counter_id,
            user_id: Uuid::new_v4(),
            value,
            year,
            month,
            created_at: Utc::now(),
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn table_joins_current_and_previous_months() {
    let h = setup().await;
    record(&h, h.counter_a, 100.0, 2025, 5).await;
    record(&h, h.counter_a, 120.5, 2025, 6).await;
    record(&h, h.counter_b, 50.0, 2025, 6).await;

    let table = h
        .service
        .reading_table(&h.manager, h.house_id, CounterKind::Electricity, 2025, 6)
        .await
        .unwrap();

    assert_eq!(table.rows.len(), 3);

    // Apartment 1: both months recorded.
    assert_eq!(table.rows[0].seq, Some(1));
    assert_eq!(table.rows[0].previous, Some(100.0));
    assert_eq!(table.rows[0].current, Some(120.5));
    assert!((table.rows[0].delta - 20.5).abs() < 1e-9);

    // Apartment 2: current only, delta collapses to zero.
    assert_eq!(table.rows[1].seq, Some(2));
    assert_eq!(table.rows[1].previous, None);
    assert_eq!(table.rows[1].delta, 0.0);

    // Apartment 3: no counter of the kind, flat-rate placeholder.
    assert!(table.rows[2].flat_rate);
    assert_eq!(table.rows[2].seq, Some(3));
}

#[tokio::test]
async fn january_looks_back_to_december() {
    let h = setup().await;
    record(&h, h.counter_a, 100.0, 2024, 12).await;
    record(&h, h.counter_a, 110.0, 2025, 1).await;

    let table = h
        .service
        .reading_table(&h.manager, h.house_id, CounterKind::Electricity, 2025, 1)
        .await
        .unwrap();
    assert_eq!(table.rows[0].previous, Some(100.0));
    assert!((table.rows[0].delta - 10.0).abs() < 1e-9);
}

#[tokio::test]
async fn repeated_runs_are_byte_identical() {
    let h = setup().await;
    record(&h, h.counter_a, 100.0, 2025, 5).await;
    record(&h, h.counter_a, 120.5, 2025, 6).await;
    record(&h, h.counter_b, 50.0, 2025, 6).await;

    let first = h
        .service
        .reading_table(&h.manager, h.house_id, CounterKind::Electricity, 2025, 6)
        .await
        .unwrap()
        .to_cells();
    let second = h
        .service
        .reading_table(&h.manager, h.house_id, CounterKind::Electricity, 2025, 6)
        .await
        .unwrap()
        .to_cells();
    assert_eq!(first, second);
}

#[tokio::test]
async fn table_is_manager_scoped() {
    let h = setup().await;

    let stranger = Principal::new(Uuid::new_v4(), Role::User);
    let denied = h
        .service
        .reading_table(&stranger, h.house_id, CounterKind::Electricity, 2025, 6)
        .await;
    assert!(matches!(denied, Err(DomusError::PermissionDenied { .. })));

    let admin = Principal::new(Uuid::new_v4(), Role::Admin);
    h.service
        .reading_table(&admin, h.house_id, CounterKind::Electricity, 2025, 6)
        .await
        .unwrap();
}

#[tokio::test]
async fn period_is_validated_before_anything_else() {
    let h = setup().await;

    let bad_month = h
        .service
        .reading_table(&h.manager, h.house_id, CounterKind::Electricity, 2025, 13)
        .await;
    assert!(matches!(bad_month, Err(DomusError::InvalidInput { .. })));

    let bad_year = h
        .service
        .reading_table(&h.manager, h.house_id, CounterKind::Electricity, 1999, 6)
        .await;
    assert!(matches!(bad_year, Err(DomusError::InvalidInput { .. })));
}

#[tokio::test]
async fn monthly_report_builds_three_tables() {
    let h = setup().await;
    record(&h, h.counter_a, 100.0, 2025, 6).await;

    let report = h
        .service
        .monthly_report(&h.manager, h.house_id, 2025, 6)
        .await
        .unwrap();

    assert_eq!(report.electricity.kind, CounterKind::Electricity);
    assert_eq!(report.hot_water.kind, CounterKind::HotWater);
    assert_eq!(report.cold_water.kind, CounterKind::ColdWater);

    // No hot-water counters exist, so every apartment is flat-rate.
    assert_eq!(report.hot_water.rows.len(), 3);
    assert!(report.hot_water.rows.iter().all(|r| r.flat_rate));
}
