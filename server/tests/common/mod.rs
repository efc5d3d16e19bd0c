//! Shared helpers for the server integration tests.

use fleetdock_server::db::vehicles::NewVehicle;
use fleetdock_server::db::{self, Db};
use tempfile::TempDir;

/// A fresh SQLite database with the full schema and seeds applied.
/// The TempDir must stay alive for the duration of the test.
pub async fn test_db() -> (Db, TempDir) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("fleetdock-test.db");
    let url = format!("sqlite://{}?mode=rwc", path.display());
    let db = db::connect(&url).await.expect("connect test db");
    db::schema::ensure_schema(&db).await.expect("apply schema");
    (db, dir)
}

/// A minimal vehicle row for seeding reference data.
pub fn vehicle(slug: &str, name: &str) -> NewVehicle {
    NewVehicle {
        slug: slug.to_string(),
        name: name.to_string(),
        ..NewVehicle::default()
    }
}
