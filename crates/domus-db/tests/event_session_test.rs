//! Integration tests for event, session and change request
//! repositories using in-memory SurrealDB.

use chrono::{Duration, Utc};
use domus_core::models::counter::CounterKind;
use domus_core::models::event::{CreateEvent, EventKind};
use domus_core::models::request::{CreateChangeRequest, RequestKind};
use domus_core::models::session::CreateSession;
use domus_core::repository::{
    ChangeRequestRepository, EventRepository, Pagination, SessionRepository,
};
use domus_db::repository::{
    SurrealChangeRequestRepository, SurrealEventRepository, SurrealSessionRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

async fn setup() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    domus_db::run_migrations(&db).await.unwrap();
    db
}

fn new_event(user_id: Uuid) -> CreateEvent {
    CreateEvent {
        user_id,
        kind: EventKind::Notification,
        title: "Request reviewed".into(),
        details: "Your counter was approved".into(),
        sender_id: Uuid::new_v4(),
        house_id: None,
        created_at: Utc::now(),
    }
}

fn new_session(user_id: Uuid, token_hash: &str) -> CreateSession {
    CreateSession {
        user_id,
        token_hash: token_hash.into(),
        ip: Some("127.0.0.1".into()),
        device_info: Some("cli".into()),
        expires_at: Utc::now() + Duration::hours(1),
    }
}

#[tokio::test]
async fn events_start_unread_and_can_be_marked() {
    let db = setup().await;
    let repo = SurrealEventRepository::new(db);

    let user_id = Uuid::new_v4();
    let event = repo.create(new_event(user_id)).await.unwrap();
    assert!(!event.read);

    let marked = repo.set_read(event.id, true).await.unwrap();
    assert!(marked.read);

    let fetched = repo.get_by_id(event.id).await.unwrap();
    assert!(fetched.read);
}

#[tokio::test]
async fn list_events_filters_by_read_flag() {
    let db = setup().await;
    let repo = SurrealEventRepository::new(db);

    let user_id = Uuid::new_v4();
    let first = repo.create(new_event(user_id)).await.unwrap();
    repo.create(new_event(user_id)).await.unwrap();
    repo.create(new_event(Uuid::new_v4())).await.unwrap();
    repo.set_read(first.id, true).await.unwrap();

    let all = repo
        .list_for_user(user_id, None, Pagination::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 2);

    let unread = repo
        .list_for_user(user_id, Some(false), Pagination::default())
        .await
        .unwrap();
    assert_eq!(unread.len(), 1);
}

#[tokio::test]
async fn session_lookup_by_token_hash() {
    let db = setup().await;
    let repo = SurrealSessionRepository::new(db);

    let user_id = Uuid::new_v4();
    let session = repo.create(new_session(user_id, "abc123")).await.unwrap();
    assert_eq!(session.user_id, user_id);

    let found = repo.get_by_token_hash("abc123").await.unwrap();
    assert_eq!(found.id, session.id);

    assert!(repo.get_by_token_hash("missing").await.is_err());
}

#[tokio::test]
async fn touch_extends_session_expiry() {
    let db = setup().await;
    let repo = SurrealSessionRepository::new(db);

    let session = repo
        .create(new_session(Uuid::new_v4(), "touch-me"))
        .await
        .unwrap();

    let new_expiry = Utc::now() + Duration::hours(8);
    repo.touch(session.id, Utc::now(), new_expiry).await.unwrap();

    let refreshed = repo.get_by_token_hash("touch-me").await.unwrap();
    assert!(refreshed.expires_at > session.expires_at);
}

#[tokio::test]
async fn delete_for_user_removes_all_sessions() {
    let db = setup().await;
    let repo = SurrealSessionRepository::new(db);

    let user_id = Uuid::new_v4();
    repo.create(new_session(user_id, "one")).await.unwrap();
    repo.create(new_session(user_id, "two")).await.unwrap();
    repo.create(new_session(Uuid::new_v4(), "other"))
        .await
        .unwrap();

    let removed = repo.delete_for_user(user_id).await.unwrap();
    assert_eq!(removed, 2);

    assert!(repo.get_by_token_hash("one").await.is_err());
    assert!(repo.get_by_token_hash("other").await.is_ok());
}

#[tokio::test]
async fn cleanup_removes_only_expired_sessions() {
    let db = setup().await;
    let repo = SurrealSessionRepository::new(db);

    let mut expired = new_session(Uuid::new_v4(), "stale");
    expired.expires_at = Utc::now() - Duration::hours(1);
    repo.create(expired).await.unwrap();
    repo.create(new_session(Uuid::new_v4(), "fresh"))
        .await
        .unwrap();

    let removed = repo.cleanup_expired(Utc::now()).await.unwrap();
    assert_eq!(removed, 1);
    assert!(repo.get_by_token_hash("stale").await.is_err());
    assert!(repo.get_by_token_hash("fresh").await.is_ok());
}

#[tokio::test]
async fn change_request_lifecycle() {
    let db = setup().await;
    let repo = SurrealChangeRequestRepository::new(db);

    let house_id = Uuid::new_v4();
    let request = repo
        .create(CreateChangeRequest {
            counter_id: Uuid::new_v4(),
            kind: RequestKind::Add,
            reason: "new meter installed".into(),
            house_id,
            user_id: Uuid::new_v4(),
            counter_kind: CounterKind::ColdWater,
            counter_serial_number: "C-42".into(),
            apartment_number: "5".into(),
            created_at: Utc::now(),
        })
        .await
        .unwrap();
    assert_eq!(request.kind, RequestKind::Add);

    let pending = repo.list_by_house(house_id).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].counter_serial_number, "C-42");

    // Resolution deletes the document.
    repo.delete(request.id).await.unwrap();
    assert!(repo.get_by_id(request.id).await.is_err());
    assert!(repo.list_by_house(house_id).await.unwrap().is_empty());
}
