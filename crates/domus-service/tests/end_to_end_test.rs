//! End-to-end scenarios: the full journey from registration through
//! counter approval, readings and the monthly reconciliation table,
//! all against one in-memory SurrealDB instance.

use std::sync::Arc;

use chrono::Utc;
use domus_auth::{AuthConfig, AuthService, LoginInput, RegisterInput};
use domus_core::clock::{Clock, FixedClock};
use domus_core::models::counter::CounterKind;
use domus_core::models::house::CreateHouse;
use domus_core::models::request::RequestOutcome;
use domus_core::models::user::Role;
use domus_db::repository::{
    SurrealApartmentRepository, SurrealChangeRequestRepository, SurrealCounterRepository,
    SurrealEventRepository, SurrealHouseRepository, SurrealReadingRepository,
    SurrealSessionRepository, SurrealUserRepository,
};
use domus_service::{
    AddApartmentInput, AddCounterInput, ApartmentService, CounterService, HouseService,
    ReadingService, ReconcileService, ServiceConfig,
};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

#[tokio::test]
async fn resident_journey_from_registration_to_reconciliation() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    domus_db::run_migrations(&db).await.unwrap();

    let house_repo = SurrealHouseRepository::new(db.clone());
    let apartment_repo = SurrealApartmentRepository::new(db.clone());
    let counter_repo = SurrealCounterRepository::new(db.clone());
    let reading_repo = SurrealReadingRepository::new(db.clone());
    let request_repo = SurrealChangeRequestRepository::new(db.clone());
    let event_repo = SurrealEventRepository::new(db.clone());
    let session_repo = SurrealSessionRepository::new(db.clone());
    let user_repo = SurrealUserRepository::new(db);

    let clock = Arc::new(FixedClock::at(Utc::now()));
    let auth = AuthService::new(
        user_repo.clone(),
        session_repo,
        Arc::clone(&clock),
        AuthConfig::default(),
    );
    let houses = HouseService::new(house_repo.clone(), user_repo.clone());
    let apartments =
        ApartmentService::new(house_repo.clone(), apartment_repo.clone(), user_repo.clone());
    let counters = CounterService::new(
        house_repo.clone(),
        apartment_repo.clone(),
        counter_repo.clone(),
        reading_repo.clone(),
        request_repo,
        event_repo,
        Arc::clone(&clock),
        ServiceConfig {
            system_sender: Uuid::new_v4(),
        },
    );
    let readings = ReadingService::new(
        house_repo.clone(),
        apartment_repo.clone(),
        counter_repo.clone(),
        reading_repo.clone(),
        Arc::clone(&clock),
    );
    let reconcile = ReconcileService::new(house_repo, apartment_repo, counter_repo, reading_repo);

    // Registration and login for all three actors.
    let register = |email: &str, role| RegisterInput {
        name: "E2e".into(),
        surname: "Person".into(),
        email: email.into(),
        password: "correct horse".into(),
        role,
    };
    auth.register(register("admin@example.com", Role::Admin))
        .await
        .unwrap();
    auth.register(register("mgr@example.com", Role::User))
        .await
        .unwrap();
    auth.register(register("owner@example.com", Role::User))
        .await
        .unwrap();

    let login = async |email: &str| {
        let out = auth
            .login(LoginInput {
                email: email.into(),
                password: "correct horse".into(),
                ip: None,
                device_info: None,
            })
            .await
            .unwrap();
        auth.authenticate(&out.token).await.unwrap()
    };
    let admin = login("admin@example.com").await;
    let manager = login("mgr@example.com").await;
    let owner = login("owner@example.com").await;

    // Admin provisions the house and appoints the manager.
    let house = houses
        .add_house(
            &admin,
            CreateHouse {
                address: "1 Journey Rd".into(),
                info: String::new(),
            },
        )
        .await
        .unwrap();
    houses
        .add_manager(&admin, house.id, manager.user_id)
        .await
        .unwrap();

    // Manager adds the owner's apartment.
    let apartment = apartments
        .add_apartment(
            &manager,
            AddApartmentInput {
                house_id: house.id,
                owner_email: "owner@example.com".into(),
                entrance: "1".into(),
                floor: "4".into(),
                number: "42".into(),
            },
        )
        .await
        .unwrap();

    // Owner registers a meter; manager approves it.
    let counter = counters
        .add_counter(
            &owner,
            AddCounterInput {
                apartment_id: apartment.id,
                kind: "electricity".into(),
                serial_number: "E2E-1".into(),
                name: "hall".into(),
                start_value: 1000.0,
                reason: "move-in".into(),
            },
        )
        .await
        .unwrap();
    let request_id = counters.list_requests(&manager, house.id).await.unwrap()[0].id;
    counters
        .resolve_request(&manager, request_id, RequestOutcome::Approved)
        .await
        .unwrap();

    // Owner records this month's reading.
    let reading = readings
        .add_reading(&owner, counter.id, 1042.73)
        .await
        .unwrap();
    assert_eq!(reading.value, 1042.7);

    // The manager's reconciliation table carries the value.
    use chrono::Datelike;
    let now = clock.now();
    let table = reconcile
        .reading_table(
            &manager,
            house.id,
            CounterKind::Electricity,
            now.year(),
            now.month(),
        )
        .await
        .unwrap();
    assert_eq!(table.rows.len(), 1);
    assert_eq!(table.rows[0].current, Some(1042.7));
    assert_eq!(table.rows[0].serial_number, "E2E-1");
}

#[tokio::test]
async fn rejected_counter_leaves_no_trace() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    domus_db::run_migrations(&db).await.unwrap();

    let house_repo = SurrealHouseRepository::new(db.clone());
    let apartment_repo = SurrealApartmentRepository::new(db.clone());
    let counter_repo = SurrealCounterRepository::new(db.clone());
    let reading_repo = SurrealReadingRepository::new(db.clone());
    let request_repo = SurrealChangeRequestRepository::new(db.clone());
    let event_repo = SurrealEventRepository::new(db.clone());
    let user_repo = SurrealUserRepository::new(db);

    let clock = Arc::new(FixedClock::at(Utc::now()));
    let houses = HouseService::new(house_repo.clone(), user_repo.clone());
    let apartments =
        ApartmentService::new(house_repo.clone(), apartment_repo.clone(), user_repo.clone());
    let counters = CounterService::new(
        house_repo.clone(),
        apartment_repo.clone(),
        counter_repo.clone(),
        reading_repo.clone(),
        request_repo,
        event_repo,
        Arc::clone(&clock),
        ServiceConfig {
            system_sender: Uuid::new_v4(),
        },
    );

    use domus_core::models::user::{CreateUser, Principal};
    use domus_core::repository::{CounterRepository, ReadingRepository, UserRepository};

    let admin = Principal::new(Uuid::new_v4(), Role::Admin);
    let owner_user = user_repo
        .create(CreateUser {
            name: "Owner".into(),
            surname: "Person".into(),
            email: "owner@example.com".into(),
            password_hash: "$argon2id$fake".into(),
            role: Role::User,
        })
        .await
        .unwrap();
    let owner = Principal::from(&owner_user);

    let house = houses
        .add_house(
            &admin,
            CreateHouse {
                address: "2 Journey Rd".into(),
                info: String::new(),
            },
        )
        .await
        .unwrap();
    let apartment = apartments
        .add_apartment(
            &admin,
            AddApartmentInput {
                house_id: house.id,
                owner_email: "owner@example.com".into(),
                entrance: "1".into(),
                floor: "1".into(),
                number: "1".into(),
            },
        )
        .await
        .unwrap();

    let counter = counters
        .add_counter(
            &owner,
            AddCounterInput {
                apartment_id: apartment.id,
                kind: "gas".into(),
                serial_number: "G2E-1".into(),
                name: "boiler".into(),
                start_value: 7.0,
                reason: "new install".into(),
            },
        )
        .await
        .unwrap();

    let request_id = counters.list_requests(&admin, house.id).await.unwrap()[0].id;
    counters
        .resolve_request(&admin, request_id, RequestOutcome::Rejected)
        .await
        .unwrap();

    // Counter, seed reading and request are all gone.
    assert!(counter_repo.get_by_id(counter.id).await.is_err());
    assert!(
        reading_repo
            .latest_for_counter(counter.id)
            .await
            .unwrap()
            .is_none()
    );
    assert!(counters.list_requests(&admin, house.id).await.unwrap().is_empty());
}
