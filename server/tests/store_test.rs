//! Store integration tests over a fresh SQLite database.
//!
//! These cover the write discipline the syncers rely on: slug-stable
//! upserts, COALESCE column preservation, image/metadata separation, the
//! transactional join-table replacements, and the audit-row lifecycle.

mod common;

use common::{test_db, vehicle};
use fleetdock_engine::ImageSet;
use fleetdock_server::db::fleet::NewFleetEntry;
use fleetdock_server::db::items::{ItemKind, NewItem};
use fleetdock_server::db::paints::NewPaint;
use fleetdock_server::db::sync_history::{SyncSource, SyncStatus};
use fleetdock_server::db::vehicles::{NewPort, NewVehicle};
use fleetdock_server::db;

// ============================================================================
// Vehicle upserts
// ============================================================================

#[tokio::test]
async fn vehicle_upsert_is_keyed_by_slug() {
    let (db, _dir) = test_db().await;

    let first = db::vehicles::upsert_vehicle(
        &db,
        &NewVehicle {
            length: Some(30.0),
            description: Some("A dependable hull".to_string()),
            ..vehicle("nomad", "Nomad")
        },
    )
    .await
    .unwrap();

    // same slug, fresh data: same row id, non-empty fields win
    let second = db::vehicles::upsert_vehicle(
        &db,
        &NewVehicle {
            pledge_price: Some(80.0),
            ..vehicle("nomad", "Nomad")
        },
    )
    .await
    .unwrap();

    assert_eq!(first, second);
    let row = db::vehicles::get_vehicle_by_slug(&db, "nomad").await.unwrap().unwrap();
    assert_eq!(row.name, "Nomad");
    assert_eq!(row.length, Some(30.0));
    assert_eq!(row.pledge_price, Some(80.0));
    assert_eq!(db::vehicles::count_vehicles(&db).await.unwrap(), 1);
}

#[tokio::test]
async fn empty_incoming_fields_never_clobber() {
    let (db, _dir) = test_db().await;

    db::vehicles::upsert_vehicle(
        &db,
        &NewVehicle {
            uuid: Some("uuid-dur".to_string()),
            description: Some("Expedition ship".to_string()),
            cargo: Some(24.0),
            ..vehicle("dur", "Dur")
        },
    )
    .await
    .unwrap();

    // incoming empty strings and NULLs keep the stored values
    db::vehicles::upsert_vehicle(
        &db,
        &NewVehicle {
            uuid: Some(String::new()),
            description: None,
            ..vehicle("dur", "Dur")
        },
    )
    .await
    .unwrap();

    let row = db::vehicles::get_vehicle_by_slug(&db, "dur").await.unwrap().unwrap();
    assert_eq!(row.uuid.as_deref(), Some("uuid-dur"));
    assert_eq!(row.cargo, Some(24.0));
}

// ============================================================================
// Image / metadata separation
// ============================================================================

#[tokio::test]
async fn image_updates_touch_only_image_columns() {
    let (db, _dir) = test_db().await;
    db::vehicles::upsert_vehicle(
        &db,
        &NewVehicle {
            length: Some(25.5),
            cargo: Some(12.0),
            ..vehicle("dur", "Dur")
        },
    )
    .await
    .unwrap();

    let fy = ImageSet::uniform("https://fy.example/dur.jpg");
    assert_eq!(db::vehicles::update_vehicle_images(&db, "dur", &fy).await.unwrap(), 1);

    let row = db::vehicles::get_vehicle_by_slug(&db, "dur").await.unwrap().unwrap();
    assert_eq!(row.name, "Dur");
    assert_eq!(row.length, Some(25.5));
    assert_eq!(row.cargo, Some(12.0));
    assert_eq!(row.images.small.as_deref(), Some("https://fy.example/dur.jpg"));

    // a later source with different URLs wins
    let rsi = ImageSet::uniform("https://rsi.example/dur.jpg");
    db::vehicles::update_vehicle_images(&db, "dur", &rsi).await.unwrap();
    let row = db::vehicles::get_vehicle_by_slug(&db, "dur").await.unwrap().unwrap();
    assert_eq!(row.images.large.as_deref(), Some("https://rsi.example/dur.jpg"));
    assert_eq!(row.name, "Dur");

    // but an empty incoming set preserves what is there
    db::vehicles::update_vehicle_images(&db, "dur", &ImageSet::default()).await.unwrap();
    let row = db::vehicles::get_vehicle_by_slug(&db, "dur").await.unwrap().unwrap();
    assert_eq!(row.images.source.as_deref(), Some("https://rsi.example/dur.jpg"));

    // unknown slugs update nothing
    assert_eq!(db::vehicles::update_vehicle_images(&db, "ghost", &fy).await.unwrap(), 0);
}

#[tokio::test]
async fn metadata_upserts_never_write_images() {
    let (db, _dir) = test_db().await;
    db::vehicles::upsert_vehicle(&db, &vehicle("dur", "Dur")).await.unwrap();
    db::vehicles::update_vehicle_images(&db, "dur", &ImageSet::uniform("https://img.example/d.jpg"))
        .await
        .unwrap();

    // a wiki-style re-upsert carries no image columns at all
    db::vehicles::upsert_vehicle(
        &db,
        &NewVehicle {
            length: Some(31.0),
            ..vehicle("dur", "Dur")
        },
    )
    .await
    .unwrap();

    let row = db::vehicles::get_vehicle_by_slug(&db, "dur").await.unwrap().unwrap();
    assert_eq!(row.images.small.as_deref(), Some("https://img.example/d.jpg"));
    assert_eq!(row.length, Some(31.0));
}

// ============================================================================
// Reconciler lookups
// ============================================================================

#[tokio::test]
async fn slug_lookups_are_deterministic() {
    let (db, _dir) = test_db().await;
    for (slug, name) in [
        ("aurora-es", "Aurora ES"),
        ("aurora-cl", "Aurora CL"),
        ("890-jump", "890 Jump"),
        ("890-jump-pirate", "890 Jump Pirate Edition"),
    ] {
        db::vehicles::upsert_vehicle(&db, &vehicle(slug, name)).await.unwrap();
    }

    let exact = db::vehicles::find_vehicle_ids_by_slug_like(&db, "890-jump").await.unwrap();
    assert_eq!(exact.len(), 1);

    let cl = db::vehicles::find_vehicle_id_by_slug(&db, "aurora-cl").await.unwrap().unwrap();
    let es = db::vehicles::find_vehicle_id_by_slug(&db, "aurora-es").await.unwrap().unwrap();
    // prefix results come back in slug order: cl before es
    assert_eq!(
        db::vehicles::find_vehicle_ids_by_slug_prefix(&db, "aurora").await.unwrap(),
        vec![cl, es]
    );

    let by_name = db::vehicles::find_vehicle_ids_by_name_contains(&db, "890 jump").await.unwrap();
    assert_eq!(by_name.len(), 2);

    // batched lookup drops unknown slugs and keeps slug order
    let batch = db::vehicles::find_vehicle_ids_by_slugs(
        &db,
        &["aurora-cl".to_string(), "890-jump".to_string(), "ghost".to_string()],
    )
    .await
    .unwrap();
    assert_eq!(batch.len(), 2);
    assert_eq!(batch[0].0, "890-jump");
    assert_eq!(batch[1].0, "aurora-cl");

    assert!(db::vehicles::find_vehicle_id_by_slug(&db, "unknown").await.unwrap().is_none());
}

// ============================================================================
// Paints
// ============================================================================

#[tokio::test]
async fn paint_upsert_returns_id_on_conflict() {
    let (db, _dir) = test_db().await;
    let paint = NewPaint {
        name: "Ghoulish Green".to_string(),
        slug: Some("ghoulish-green".to_string()),
        class_name: "DRAK_Cutter_Paint_Ghoulish".to_string(),
        description: None,
    };
    let first = db::paints::upsert_paint(&db, &paint).await.unwrap();
    let second = db::paints::upsert_paint(&db, &paint).await.unwrap();
    assert_eq!(first, second);

    let refs = db::paints::get_all_paint_name_classes(&db).await.unwrap();
    assert_eq!(refs.len(), 1);
    assert!(!refs[0].has_image);

    db::paints::update_paint_images(
        &db,
        "DRAK_Cutter_Paint_Ghoulish",
        &ImageSet::uniform("https://img.example/gg.jpg"),
    )
    .await
    .unwrap();
    let refs = db::paints::get_all_paint_name_classes(&db).await.unwrap();
    assert!(refs[0].has_image);
}

#[tokio::test]
async fn paint_vehicle_links_replace_transactionally() {
    let (db, _dir) = test_db().await;
    let v1 = db::vehicles::upsert_vehicle(&db, &vehicle("890-jump", "890 Jump")).await.unwrap();
    let v2 = db::vehicles::upsert_vehicle(&db, &vehicle("890-jump-pirate", "890 Jump Pirate"))
        .await
        .unwrap();
    let paint_id = db::paints::upsert_paint(
        &db,
        &NewPaint {
            name: "Luminex".to_string(),
            slug: None,
            class_name: "ORIG_890Jump_Paint_Luminex".to_string(),
            description: None,
        },
    )
    .await
    .unwrap();

    db::paints::set_paint_vehicles(&db, paint_id, &[v1, v2]).await.unwrap();
    assert_eq!(
        db::paints::get_vehicle_slugs_with_paints(&db).await.unwrap(),
        vec!["890-jump".to_string(), "890-jump-pirate".to_string()]
    );

    db::paints::set_paint_vehicles(&db, paint_id, &[v2]).await.unwrap();
    let linked = db::paints::get_paints_by_vehicle_slug(&db, "890-jump").await.unwrap();
    assert!(linked.is_empty());
    let linked = db::paints::get_paints_by_vehicle_slug(&db, "890-jump-pirate").await.unwrap();
    assert_eq!(linked.len(), 1);
    assert_eq!(linked[0].class_name, "ORIG_890Jump_Paint_Luminex");

    // a paint with zero links survives
    db::paints::set_paint_vehicles(&db, paint_id, &[]).await.unwrap();
    assert_eq!(db::paints::count_paints(&db).await.unwrap(), 1);
}

// ============================================================================
// Ports, loaners, items
// ============================================================================

#[tokio::test]
async fn ports_and_loaners_upsert() {
    let (db, _dir) = test_db().await;
    let carrack = db::vehicles::upsert_vehicle(&db, &vehicle("carrack", "Carrack")).await.unwrap();
    let pisces =
        db::vehicles::upsert_vehicle(&db, &vehicle("c8-pisces", "C8 Pisces")).await.unwrap();

    let port = NewPort {
        uuid: "port-1".to_string(),
        name: Some("WeaponHardpoint_1".to_string()),
        class_name: None,
        size_min: Some(1),
        size_max: Some(4),
        port_type: Some("WeaponGun".to_string()),
    };
    db::vehicles::upsert_port(&db, carrack, &port).await.unwrap();
    // same (vehicle, uuid) updates in place rather than duplicating
    db::vehicles::upsert_port(&db, carrack, &port).await.unwrap();

    db::vehicles::set_vehicle_loaners(&db, carrack, &[pisces]).await.unwrap();
    db::vehicles::set_vehicle_loaners(&db, carrack, &[]).await.unwrap();
}

#[tokio::test]
async fn items_upsert_by_uuid() {
    let (db, _dir) = test_db().await;
    let item = NewItem {
        uuid: "item-1".to_string(),
        name: "FR-86 Shield Generator".to_string(),
        size: Some(2),
        grade: Some("A".to_string()),
        ..NewItem::default()
    };
    let first = db::items::upsert_item(&db, ItemKind::Component, &item).await.unwrap();
    let second = db::items::upsert_item(&db, ItemKind::Component, &item).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(db::items::count_items(&db, ItemKind::Component).await.unwrap(), 1);
    assert_eq!(db::items::count_items(&db, ItemKind::FpsWeapon).await.unwrap(), 0);
}

// ============================================================================
// Sync history
// ============================================================================

#[tokio::test]
async fn sync_history_runs_through_its_lifecycle() {
    let (db, _dir) = test_db().await;

    let id = db::sync_history::insert_sync_history(&db, SyncSource::ScWiki, "vehicles+items")
        .await
        .unwrap();
    let row = db::sync_history::get_sync_history(&db, id).await.unwrap().unwrap();
    assert_eq!(row.status, "running");
    assert_eq!(row.source_key, "scwiki");
    assert!(row.completed_at.is_none());

    db::sync_history::update_sync_history(&db, id, SyncStatus::Success, 42, None).await.unwrap();
    let row = db::sync_history::get_sync_history(&db, id).await.unwrap().unwrap();
    assert_eq!(row.status, "success");
    assert_eq!(row.record_count, 42);
    assert!(row.completed_at.is_some());

    let err_id = db::sync_history::insert_sync_history(&db, SyncSource::RsiApi, "graphql")
        .await
        .unwrap();
    db::sync_history::update_sync_history(
        &db,
        err_id,
        SyncStatus::Error,
        0,
        Some("context_deadline_exceeded"),
    )
    .await
    .unwrap();

    let history = db::sync_history::list_sync_history(&db, 10).await.unwrap();
    assert_eq!(history.len(), 2);
    // newest first
    assert_eq!(history[0].id, err_id);
    assert_eq!(history[0].error_message.as_deref(), Some("context_deadline_exceeded"));

    let latest = db::sync_history::latest_sync_per_source(&db).await.unwrap();
    assert_eq!(latest.len(), 2);
}

// ============================================================================
// User fleet
// ============================================================================

#[tokio::test]
async fn fleet_listing_never_drops_rows() {
    let (db, _dir) = test_db().await;
    let user_id = db::users::ensure_default_user(&db).await.unwrap();

    let entries = vec![NewFleetEntry {
        vehicle_id: None,
        insurance_type_id: None,
        custom_name: Some("Mystery Ship".to_string()),
        imported_at: db::now_utc(),
        ..NewFleetEntry::default()
    }];
    db::fleet::replace_user_fleet(&db, user_id, &entries).await.unwrap();

    let fleet = db::fleet::list_user_fleet(&db, user_id).await.unwrap();
    assert_eq!(fleet.len(), 1);
    assert!(fleet[0].vehicle_slug.is_none());
    assert!(fleet[0].insurance_label.is_none());
    assert_eq!(fleet[0].custom_name.as_deref(), Some("Mystery Ship"));
}

#[tokio::test]
async fn fleet_replacement_is_atomic() {
    let (db, _dir) = test_db().await;
    let user_id = db::users::ensure_default_user(&db).await.unwrap();
    let vehicle_id =
        db::vehicles::upsert_vehicle(&db, &vehicle("nomad", "Nomad")).await.unwrap();

    let three: Vec<NewFleetEntry> = (0..3)
        .map(|_| NewFleetEntry {
            vehicle_id: Some(vehicle_id),
            imported_at: db::now_utc(),
            ..NewFleetEntry::default()
        })
        .collect();
    db::fleet::replace_user_fleet(&db, user_id, &three).await.unwrap();
    assert_eq!(db::fleet::count_user_fleet(&db, user_id).await.unwrap(), 3);

    // a broken re-import (dangling vehicle fk) must leave the 3 rows intact
    let broken = vec![NewFleetEntry {
        vehicle_id: Some(999_999),
        imported_at: db::now_utc(),
        ..NewFleetEntry::default()
    }];
    assert!(db::fleet::replace_user_fleet(&db, user_id, &broken).await.is_err());
    assert_eq!(db::fleet::count_user_fleet(&db, user_id).await.unwrap(), 3);

    let two: Vec<NewFleetEntry> = (0..2)
        .map(|_| NewFleetEntry {
            vehicle_id: Some(vehicle_id),
            imported_at: db::now_utc(),
            ..NewFleetEntry::default()
        })
        .collect();
    db::fleet::replace_user_fleet(&db, user_id, &two).await.unwrap();
    assert_eq!(db::fleet::count_user_fleet(&db, user_id).await.unwrap(), 2);
}

#[tokio::test]
async fn fleet_entry_mutations() {
    let (db, _dir) = test_db().await;
    let user_id = db::users::ensure_default_user(&db).await.unwrap();
    assert_eq!(db::users::ensure_default_user(&db).await.unwrap(), user_id);

    db::fleet::replace_user_fleet(
        &db,
        user_id,
        &[NewFleetEntry {
            imported_at: db::now_utc(),
            ..NewFleetEntry::default()
        }],
    )
    .await
    .unwrap();
    let entry_id = db::fleet::list_user_fleet(&db, user_id).await.unwrap()[0].id;

    assert_eq!(
        db::fleet::set_fleet_custom_name(&db, entry_id, Some("Best Ship")).await.unwrap(),
        1
    );
    let paint_id = db::paints::upsert_paint(
        &db,
        &NewPaint {
            name: "Luminex".to_string(),
            slug: None,
            class_name: "ORIG_890Jump_Paint_Luminex".to_string(),
            description: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(db::fleet::set_fleet_paint(&db, entry_id, Some(paint_id)).await.unwrap(), 1);

    db::fleet::add_user_paint(&db, user_id, paint_id).await.unwrap();
    db::fleet::add_user_paint(&db, user_id, paint_id).await.unwrap();
    assert_eq!(db::fleet::list_user_paint_ids(&db, user_id).await.unwrap(), vec![paint_id]);

    let fleet = db::fleet::list_user_fleet(&db, user_id).await.unwrap();
    assert_eq!(fleet[0].custom_name.as_deref(), Some("Best Ship"));
    assert_eq!(fleet[0].equipped_paint_name.as_deref(), Some("Luminex"));
}
