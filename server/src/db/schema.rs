//! Schema creation and lookup seeding.
//!
//! One relational schema, created idempotently at boot. Lookup tables are
//! seeded here once and treated as immutable afterwards; new entries only
//! ever arrive through a new seed row in a release, never at runtime.

use sqlx::AnyPool;

use super::dialect::Dialect;
use super::{now_utc, Db};

/// Create every table and seed the lookup enums. Idempotent.
pub async fn ensure_schema(db: &Db) -> Result<(), sqlx::Error> {
    for statement in table_statements(db.dialect) {
        sqlx::query(&statement).execute(&db.pool).await?;
    }
    seed_lookups(&db.pool, db.dialect).await
}

fn table_statements(d: Dialect) -> Vec<String> {
    let pk = d.auto_pk();
    let mut stmts = vec![
        format!(
            "CREATE TABLE IF NOT EXISTS manufacturers (
                id {pk},
                uuid TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                slug TEXT,
                code TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS game_versions (
                id {pk},
                uuid TEXT NOT NULL UNIQUE,
                code TEXT NOT NULL,
                channel TEXT,
                is_default INTEGER NOT NULL DEFAULT 0,
                released_at TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS vehicle_types (
                id {pk},
                key TEXT NOT NULL UNIQUE,
                label TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS production_statuses (
                id {pk},
                key TEXT NOT NULL UNIQUE,
                label TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS insurance_types (
                id {pk},
                key TEXT NOT NULL UNIQUE,
                label TEXT NOT NULL,
                duration_months BIGINT,
                is_lifetime INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS sync_sources (
                id {pk},
                key TEXT NOT NULL UNIQUE,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS vehicles (
                id {pk},
                uuid TEXT,
                slug TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                class_name TEXT,
                manufacturer_id BIGINT REFERENCES manufacturers(id),
                vehicle_type_id BIGINT REFERENCES vehicle_types(id),
                production_status_id BIGINT REFERENCES production_statuses(id),
                description TEXT,
                length DOUBLE PRECISION,
                beam DOUBLE PRECISION,
                height DOUBLE PRECISION,
                mass DOUBLE PRECISION,
                cargo DOUBLE PRECISION,
                crew_min BIGINT,
                crew_max BIGINT,
                speed_scm DOUBLE PRECISION,
                speed_max DOUBLE PRECISION,
                pledge_price DOUBLE PRECISION,
                pledge_url TEXT,
                image_source TEXT,
                image_small TEXT,
                image_medium TEXT,
                image_large TEXT,
                game_version_id BIGINT REFERENCES game_versions(id),
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS paints (
                id {pk},
                name TEXT NOT NULL,
                slug TEXT,
                class_name TEXT NOT NULL UNIQUE,
                description TEXT,
                image_source TEXT,
                image_small TEXT,
                image_medium TEXT,
                image_large TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )"
        ),
        "CREATE TABLE IF NOT EXISTS paint_vehicles (
            paint_id BIGINT NOT NULL REFERENCES paints(id),
            vehicle_id BIGINT NOT NULL REFERENCES vehicles(id),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (paint_id, vehicle_id)
        )"
        .to_string(),
        format!(
            "CREATE TABLE IF NOT EXISTS ports (
                id {pk},
                vehicle_id BIGINT NOT NULL REFERENCES vehicles(id),
                uuid TEXT NOT NULL,
                name TEXT,
                class_name TEXT,
                size_min BIGINT,
                size_max BIGINT,
                port_type TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE (vehicle_id, uuid)
            )"
        ),
        "CREATE TABLE IF NOT EXISTS vehicle_loaners (
            vehicle_id BIGINT NOT NULL REFERENCES vehicles(id),
            loaner_id BIGINT NOT NULL REFERENCES vehicles(id),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (vehicle_id, loaner_id)
        )"
        .to_string(),
        format!(
            "CREATE TABLE IF NOT EXISTS users (
                id {pk},
                username TEXT NOT NULL UNIQUE,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS user_fleet (
                id {pk},
                user_id BIGINT NOT NULL REFERENCES users(id),
                vehicle_id BIGINT REFERENCES vehicles(id),
                insurance_type_id BIGINT REFERENCES insurance_types(id),
                warbond INTEGER NOT NULL DEFAULT 0,
                is_loaner INTEGER NOT NULL DEFAULT 0,
                pledge_id TEXT,
                pledge_name TEXT,
                pledge_cost DOUBLE PRECISION,
                pledge_date TEXT,
                custom_name TEXT,
                equipped_paint_id BIGINT REFERENCES paints(id),
                imported_at TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )"
        ),
        "CREATE TABLE IF NOT EXISTS user_paints (
            user_id BIGINT NOT NULL REFERENCES users(id),
            paint_id BIGINT NOT NULL REFERENCES paints(id),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (user_id, paint_id)
        )"
        .to_string(),
        format!(
            "CREATE TABLE IF NOT EXISTS user_llm_configs (
                id {pk},
                user_id BIGINT NOT NULL REFERENCES users(id),
                provider TEXT NOT NULL,
                encrypted_config TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE (user_id, provider)
            )"
        ),
        "CREATE TABLE IF NOT EXISTS user_settings (
            user_id BIGINT NOT NULL REFERENCES users(id),
            key TEXT NOT NULL,
            value TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (user_id, key)
        )"
        .to_string(),
        format!(
            "CREATE TABLE IF NOT EXISTS sync_history (
                id {pk},
                source_id BIGINT NOT NULL REFERENCES sync_sources(id),
                endpoint TEXT NOT NULL,
                status TEXT NOT NULL,
                record_count BIGINT NOT NULL DEFAULT 0,
                error_message TEXT,
                started_at TEXT NOT NULL,
                completed_at TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )"
        ),
    ];

    // Six item taxonomies sharing one shape, unique by in-game uuid.
    for table in [
        "components",
        "fps_weapons",
        "fps_armour",
        "fps_attachments",
        "fps_ammo",
        "fps_utilities",
    ] {
        stmts.push(format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                id {pk},
                uuid TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                class_name TEXT,
                size BIGINT,
                grade TEXT,
                item_type TEXT,
                manufacturer_name TEXT,
                description TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )"
        ));
    }

    stmts
}

async fn seed_lookups(pool: &AnyPool, d: Dialect) -> Result<(), sqlx::Error> {
    let now = now_utc();

    let sql = format!(
        "{} vehicle_types (key, label, created_at, updated_at) VALUES ($1, $2, $3, $4){}",
        d.insert_ignore(),
        d.insert_ignore_suffix()
    );
    for (key, label) in [("ship", "Ship"), ("ground_vehicle", "Ground Vehicle")] {
        sqlx::query(&sql)
            .bind(key)
            .bind(label)
            .bind(&now)
            .bind(&now)
            .execute(pool)
            .await?;
    }

    let sql = format!(
        "{} production_statuses (key, label, created_at, updated_at) VALUES ($1, $2, $3, $4){}",
        d.insert_ignore(),
        d.insert_ignore_suffix()
    );
    for (key, label) in [
        ("flight_ready", "Flight Ready"),
        ("in_production", "In Production"),
        ("in_concept", "In Concept"),
        ("announced", "Announced"),
    ] {
        sqlx::query(&sql)
            .bind(key)
            .bind(label)
            .bind(&now)
            .bind(&now)
            .execute(pool)
            .await?;
    }

    let sql = format!(
        "{} insurance_types (key, label, duration_months, is_lifetime, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6){}",
        d.insert_ignore(),
        d.insert_ignore_suffix()
    );
    for (key, label, months, lifetime) in [
        ("lti", "Lifetime Insurance", None, 1i64),
        ("120_month", "120-Month Insurance", Some(120i64), 0),
        ("72_month", "72-Month Insurance", Some(72), 0),
        ("60_month", "60-Month Insurance", Some(60), 0),
        ("48_month", "48-Month Insurance", Some(48), 0),
        ("36_month", "36-Month Insurance", Some(36), 0),
        ("24_month", "24-Month Insurance", Some(24), 0),
        ("12_month", "12-Month Insurance", Some(12), 0),
        ("6_month", "6-Month Insurance", Some(6), 0),
        ("3_month", "3-Month Insurance", Some(3), 0),
        ("2_month", "2-Month Insurance", Some(2), 0),
        ("1_month", "1-Month Insurance", Some(1), 0),
    ] {
        sqlx::query(&sql)
            .bind(key)
            .bind(label)
            .bind(months)
            .bind(lifetime)
            .bind(&now)
            .bind(&now)
            .execute(pool)
            .await?;
    }

    // Fixed ids so sync_history rows stay readable across databases.
    let sql = format!(
        "{} sync_sources (id, key, created_at, updated_at) VALUES ($1, $2, $3, $4){}",
        d.insert_ignore(),
        d.insert_ignore_suffix()
    );
    for (id, key) in [
        (1i64, "scwiki"),
        (2, "fleetyards"),
        (3, "hangarxplor"),
        (4, "scunpacked"),
        (5, "rsi_api"),
    ] {
        sqlx::query(&sql)
            .bind(id)
            .bind(key)
            .bind(&now)
            .bind(&now)
            .execute(pool)
            .await?;
    }

    Ok(())
}
