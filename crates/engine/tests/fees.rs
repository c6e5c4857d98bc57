use std::time::Duration;

use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{Engine, EngineError, LogKind};
use migration::MigratorTrait;
use uuid::Uuid;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    for (id, name) in [
        ("20180001", "Dana Kim"),
        ("20190002", "Yuna Lee"),
        ("20200003", "Minho Park"),
    ] {
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO members (id, name) VALUES (?, ?)",
            vec![id.into(), name.into()],
        ))
        .await
        .unwrap();
    }
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

async fn log_count(db: &DatabaseConnection) -> i64 {
    let row = db
        .query_one(Statement::from_string(
            db.get_database_backend(),
            "SELECT COUNT(*) AS cnt FROM payment_logs".to_string(),
        ))
        .await
        .unwrap()
        .unwrap();
    row.try_get("", "cnt").unwrap()
}

#[tokio::test]
async fn create_term_rejects_duplicate() {
    let (engine, _db) = engine_with_db().await;

    engine.create_term(2024, 1, 50000).await.unwrap();
    let err = engine.create_term(2024, 1, 70000).await.unwrap_err();
    assert_eq!(err, EngineError::DuplicateTerm("2024-1".to_string()));

    // The original term is unmodified.
    let term = engine.term(2024, 1).await.unwrap();
    assert_eq!(term.amount, 50000);

    // A different semester of the same year is fine.
    engine.create_term(2024, 2, 50000).await.unwrap();
}

#[tokio::test]
async fn submit_records_unapproved_log() {
    let (engine, _db) = engine_with_db().await;
    engine.create_term(2024, 1, 50000).await.unwrap();

    let log_id = engine.submit("20180001", 2024, 1, 30000).await.unwrap();

    let pending = engine.pending(2024, 1).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, log_id);
    assert_eq!(pending[0].kind, LogKind::Unapproved);
    assert_eq!(pending[0].amount, 30000);
    assert_eq!(pending[0].member_id, Some("20180001".to_string()));

    // Unapproved submissions are not part of the settled history.
    assert!(engine.history(2024, 1).await.unwrap().is_empty());
}

#[tokio::test]
async fn submit_requires_term() {
    let (engine, db) = engine_with_db().await;

    let err = engine.submit("20180001", 2024, 1, 30000).await.unwrap_err();
    assert_eq!(err, EngineError::TermNotFound("2024-1".to_string()));
    assert_eq!(log_count(&db).await, 0);
}

#[tokio::test]
async fn approve_transitions_and_refreshes_timestamp() {
    let (engine, _db) = engine_with_db().await;
    engine.create_term(2024, 1, 50000).await.unwrap();
    let log_id = engine.submit("20180001", 2024, 1, 30000).await.unwrap();

    tokio::time::sleep(Duration::from_millis(10)).await;
    engine.approve(&[log_id]).await.unwrap();

    assert!(engine.pending(2024, 1).await.unwrap().is_empty());

    let history = engine.history(2024, 1).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].kind, LogKind::Approved);
    assert!(history[0].updated_at > history[0].created_at);
}

#[tokio::test]
async fn approve_is_idempotent() {
    let (engine, _db) = engine_with_db().await;
    engine.create_term(2024, 1, 50000).await.unwrap();
    let log_id = engine.submit("20180001", 2024, 1, 30000).await.unwrap();

    engine.approve(&[log_id]).await.unwrap();
    let first = engine.history(2024, 1).await.unwrap()[0].updated_at;

    tokio::time::sleep(Duration::from_millis(10)).await;
    engine.approve(&[log_id]).await.unwrap();

    let history = engine.history(2024, 1).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].kind, LogKind::Approved);
    // Re-approval only refreshes the timestamp.
    assert!(history[0].updated_at > first);
}

#[tokio::test]
async fn reject_removes_log_entirely() {
    let (engine, db) = engine_with_db().await;
    engine.create_term(2024, 1, 50000).await.unwrap();
    let keep = engine.submit("20180001", 2024, 1, 30000).await.unwrap();
    let gone = engine.submit("20190002", 2024, 1, 20000).await.unwrap();

    engine.reject(2024, 1, &[gone]).await.unwrap();

    // Both the roster reference and the stored record are gone.
    let pending = engine.pending(2024, 1).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, keep);
    assert_eq!(log_count(&db).await, 1);
}

#[tokio::test]
async fn reject_unknown_id_is_noop() {
    let (engine, db) = engine_with_db().await;
    engine.create_term(2024, 1, 50000).await.unwrap();
    engine.submit("20180001", 2024, 1, 30000).await.unwrap();

    engine.reject(2024, 1, &[Uuid::new_v4()]).await.unwrap();

    assert_eq!(engine.pending(2024, 1).await.unwrap().len(), 1);
    assert_eq!(log_count(&db).await, 1);
}

#[tokio::test]
async fn reject_requires_term() {
    let (engine, _db) = engine_with_db().await;

    let err = engine.reject(2024, 1, &[Uuid::new_v4()]).await.unwrap_err();
    assert_eq!(err, EngineError::TermNotFound("2024-1".to_string()));
}

#[tokio::test]
async fn paid_and_unpaid_partition_members() {
    let (engine, _db) = engine_with_db().await;
    engine.create_term(2024, 1, 50000).await.unwrap();

    // "20180001" reaches the bar in two installments, "20190002" stays below,
    // "20200003" never submits anything.
    let first = engine.submit("20180001", 2024, 1, 30000).await.unwrap();
    let second = engine.submit("20180001", 2024, 1, 30000).await.unwrap();
    let below = engine.submit("20190002", 2024, 1, 10000).await.unwrap();
    engine.approve(&[first, second, below]).await.unwrap();

    assert_eq!(engine.member_total(2024, 1, "20180001").await.unwrap(), 60000);

    let paid = engine.paid_members(2024, 1).await.unwrap();
    assert_eq!(paid.len(), 1);
    assert_eq!(paid[0].id, "20180001");
    assert_eq!(paid[0].name, "Dana Kim");

    let unpaid = engine.unpaid_members(2024, 1).await.unwrap();
    assert_eq!(unpaid.len(), 1);
    assert_eq!(unpaid[0].id, "20190002");

    // A direct deposit has no member and moves neither partition.
    engine.deposit(2024, 1, 50000).await.unwrap();
    assert_eq!(engine.paid_members(2024, 1).await.unwrap().len(), 1);
    assert_eq!(engine.unpaid_members(2024, 1).await.unwrap().len(), 1);
    assert_eq!(engine.member_total(2024, 1, "20180001").await.unwrap(), 60000);
}

#[tokio::test]
async fn member_without_approved_logs_is_in_neither_partition() {
    let (engine, _db) = engine_with_db().await;
    engine.create_term(2024, 1, 50000).await.unwrap();

    // A pending submission alone does not place the member anywhere.
    engine.submit("20200003", 2024, 1, 60000).await.unwrap();

    assert!(engine.paid_members(2024, 1).await.unwrap().is_empty());
    assert!(engine.unpaid_members(2024, 1).await.unwrap().is_empty());
    assert_eq!(engine.member_total(2024, 1, "20200003").await.unwrap(), 0);
}

#[tokio::test]
async fn deposit_shows_up_in_history() {
    let (engine, _db) = engine_with_db().await;
    engine.create_term(2024, 1, 50000).await.unwrap();

    engine.deposit(2024, 1, 50000).await.unwrap();

    let history = engine.history(2024, 1).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].kind, LogKind::Direct);
    assert_eq!(history[0].amount, 50000);
    assert_eq!(history[0].member_id, None);
}

#[tokio::test]
async fn history_orders_by_state_change() {
    let (engine, _db) = engine_with_db().await;
    engine.create_term(2024, 1, 50000).await.unwrap();

    let first = engine.submit("20180001", 2024, 1, 10000).await.unwrap();
    let second = engine.submit("20190002", 2024, 1, 20000).await.unwrap();

    // Approve in reverse submission order; history follows approval time,
    // not insertion time.
    tokio::time::sleep(Duration::from_millis(10)).await;
    engine.approve(&[second]).await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    engine.approve(&[first]).await.unwrap();

    let history = engine.history(2024, 1).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].id, second);
    assert_eq!(history[1].id, first);
}

#[tokio::test]
async fn member_total_is_scoped_to_the_term() {
    let (engine, _db) = engine_with_db().await;
    engine.create_term(2024, 1, 50000).await.unwrap();
    engine.create_term(2024, 2, 50000).await.unwrap();

    let spring = engine.submit("20180001", 2024, 1, 30000).await.unwrap();
    let fall = engine.submit("20180001", 2024, 2, 20000).await.unwrap();
    engine.approve(&[spring, fall]).await.unwrap();

    assert_eq!(engine.member_total(2024, 1, "20180001").await.unwrap(), 30000);
    assert_eq!(engine.member_total(2024, 2, "20180001").await.unwrap(), 20000);
}

#[tokio::test]
async fn queries_require_term() {
    let (engine, _db) = engine_with_db().await;

    let not_found = EngineError::TermNotFound("2025-1".to_string());
    assert_eq!(
        engine.member_total(2025, 1, "20180001").await.unwrap_err(),
        not_found
    );
    assert_eq!(engine.history(2025, 1).await.unwrap_err(), not_found);
    assert_eq!(engine.pending(2025, 1).await.unwrap_err(), not_found);
    assert_eq!(engine.paid_members(2025, 1).await.unwrap_err(), not_found);
    assert_eq!(engine.unpaid_members(2025, 1).await.unwrap_err(), not_found);
    assert_eq!(engine.deposit(2025, 1, 1000).await.unwrap_err(), not_found);
}

#[tokio::test]
async fn submit_rejects_non_positive_amount() {
    let (engine, db) = engine_with_db().await;
    engine.create_term(2024, 1, 50000).await.unwrap();

    assert!(matches!(
        engine.submit("20180001", 2024, 1, 0).await.unwrap_err(),
        EngineError::InvalidAmount(_)
    ));
    assert!(matches!(
        engine.deposit(2024, 1, -500).await.unwrap_err(),
        EngineError::InvalidAmount(_)
    ));
    assert_eq!(log_count(&db).await, 0);
}
