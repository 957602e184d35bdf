//! Integration tests for schema initialization using in-memory SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

#[tokio::test]
async fn schema_migration_applies_successfully() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    screenbook_db::run_migrations(&db).await.unwrap();

    let mut result = db.query("INFO FOR DB").await.unwrap();
    let info: Option<surrealdb_types::Value> = result.take(0).unwrap();
    let info = info.expect("INFO FOR DB should return a value");
    let info_str = format!("{:?}", info);

    for table in [
        "admin",
        "participant",
        "otp_code",
        "event",
        "booking",
        "medical_result",
    ] {
        assert!(info_str.contains(table), "missing {table} table");
    }
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    screenbook_db::run_migrations(&db).await.unwrap();
    screenbook_db::run_migrations(&db).await.unwrap();
}

#[tokio::test]
async fn negative_slot_counts_are_rejected() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    screenbook_db::run_migrations(&db).await.unwrap();

    let result = db
        .query(
            "CREATE event SET name = 'x', scheduled_at = time::now(), \
             address = 'y', total_slots = 1, available_slots = -1, \
             status = 'published', created_by = 'a', dedup_key = 'k'",
        )
        .await
        .unwrap()
        .check();
    assert!(result.is_err());
}
