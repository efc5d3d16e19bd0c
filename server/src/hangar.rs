//! Hangar import: joining a user's hangar dump to the reference data.
//!
//! The input is the JSON array produced by a HangarXplor dump. Each entry
//! is resolved to a `vehicle_id` through the slug cascade and to a typed
//! `insurance_type_id`; entries that resolve nothing are still imported
//! with NULL references and reported back. The whole fleet is replaced in
//! one transaction, so a failure partway leaves the previous import
//! intact.

use std::collections::HashMap;

use fleetdock_engine::{
    compact_slug, resolve_insurance, slug_from_name, slug_from_ship_code, InsuranceTypeRef,
};
use serde::{Deserialize, Serialize};

use crate::db::fleet::NewFleetEntry;
use crate::db::sync_history::{self, SyncSource, SyncStatus};
use crate::db::{self, Db};
use crate::error::Result;

/// One entry of a hangar dump.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HangarEntry {
    #[serde(default)]
    pub ship_code: Option<String>,
    #[serde(default)]
    pub ship_name: Option<String>,
    #[serde(default)]
    pub manufacturer_code: Option<String>,
    #[serde(default)]
    pub manufacturer_name: Option<String>,
    #[serde(default)]
    pub lti: bool,
    #[serde(default)]
    pub insurance: Option<String>,
    /// The user's custom name for this ship.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub warbond: bool,
    #[serde(default)]
    pub is_loaner: bool,
    #[serde(default)]
    pub pledge_id: Option<String>,
    #[serde(default)]
    pub pledge_name: Option<String>,
    #[serde(default)]
    pub pledge_cost: Option<f64>,
    #[serde(default)]
    pub pledge_date: Option<String>,
}

/// What an import did, including what it could not resolve.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportSummary {
    pub inserted: u64,
    pub unresolved_vehicles: Vec<String>,
    pub unresolved_insurance: Vec<String>,
}

/// Import a hangar dump for one user, replacing their current fleet.
pub async fn import_hangar(
    db: &Db,
    user_id: i64,
    entries: Vec<HangarEntry>,
) -> Result<ImportSummary> {
    let history_id =
        sync_history::insert_sync_history(db, SyncSource::HangarXplor, "import").await?;

    match import_inner(db, user_id, entries).await {
        Ok(summary) => {
            sync_history::update_sync_history(
                db,
                history_id,
                SyncStatus::Success,
                summary.inserted as i64,
                None,
            )
            .await?;
            Ok(summary)
        }
        Err(err) => {
            let err = err.normalize_cancellation();
            sync_history::update_sync_history(
                db,
                history_id,
                SyncStatus::Error,
                0,
                Some(&err.to_string()),
            )
            .await?;
            Err(err)
        }
    }
}

async fn import_inner(
    db: &Db,
    user_id: i64,
    entries: Vec<HangarEntry>,
) -> Result<ImportSummary> {
    let slug_ids = db::vehicles::get_all_vehicle_slug_ids(db).await?;
    let by_slug: HashMap<&str, i64> = slug_ids.iter().map(|(s, id)| (s.as_str(), *id)).collect();
    let by_compact: HashMap<String, i64> = slug_ids
        .iter()
        .map(|(s, id)| (compact_slug(s), *id))
        .collect();

    let insurance_types: Vec<InsuranceTypeRef> = db::lookups::list_insurance_types(db)
        .await?
        .iter()
        .map(|t| t.to_ref())
        .collect();

    let imported_at = db::now_utc();
    let mut summary = ImportSummary::default();
    let mut rows = Vec::with_capacity(entries.len());

    for entry in &entries {
        let vehicle_id = resolve_vehicle(entry, &by_slug, &by_compact);
        if vehicle_id.is_none() {
            let label = entry_label(entry);
            tracing::debug!(entry = %label, "hangar entry matched no vehicle");
            summary.unresolved_vehicles.push(label);
        }

        let insurance_type_id =
            resolve_insurance(entry.insurance.as_deref(), entry.lti, &insurance_types);
        if insurance_type_id.is_none() {
            if let Some(label) = entry.insurance.as_deref().filter(|i| !i.trim().is_empty()) {
                summary.unresolved_insurance.push(label.to_string());
            }
        }

        rows.push(NewFleetEntry {
            vehicle_id,
            insurance_type_id,
            warbond: entry.warbond,
            is_loaner: entry.is_loaner,
            pledge_id: entry.pledge_id.clone(),
            pledge_name: entry.pledge_name.clone(),
            pledge_cost: entry.pledge_cost,
            pledge_date: entry.pledge_date.clone(),
            custom_name: entry.name.clone(),
            imported_at: imported_at.clone(),
        });
    }

    summary.inserted = db::fleet::replace_user_fleet(db, user_id, &rows).await?;
    tracing::info!(
        user_id,
        inserted = summary.inserted,
        unresolved_vehicles = summary.unresolved_vehicles.len(),
        unresolved_insurance = summary.unresolved_insurance.len(),
        "hangar import committed"
    );
    Ok(summary)
}

/// Slug cascade: ship-code slug, then name slug, then compact comparison.
fn resolve_vehicle(
    entry: &HangarEntry,
    by_slug: &HashMap<&str, i64>,
    by_compact: &HashMap<String, i64>,
) -> Option<i64> {
    let mut candidates = Vec::new();
    if let Some(code) = entry.ship_code.as_deref().filter(|c| !c.is_empty()) {
        candidates.push(slug_from_ship_code(code));
    }
    if let Some(name) = entry
        .ship_name
        .as_deref()
        .filter(|n| !n.is_empty())
        .or_else(|| entry.name.as_deref().filter(|n| !n.is_empty()))
    {
        candidates.push(slug_from_name(name));
    }

    for candidate in &candidates {
        if let Some(id) = by_slug.get(candidate.as_str()) {
            return Some(*id);
        }
    }
    for candidate in &candidates {
        if let Some(id) = by_compact.get(&compact_slug(candidate)) {
            return Some(*id);
        }
    }
    None
}

fn entry_label(entry: &HangarEntry) -> String {
    entry
        .ship_name
        .as_deref()
        .or(entry.ship_code.as_deref())
        .or(entry.name.as_deref())
        .unwrap_or("unknown entry")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_prefers_ship_name() {
        let entry = HangarEntry {
            ship_code: Some("ANVL_Hornet".to_string()),
            ship_name: Some("Hornet".to_string()),
            ..HangarEntry::default()
        };
        assert_eq!(entry_label(&entry), "Hornet");

        let bare = HangarEntry::default();
        assert_eq!(entry_label(&bare), "unknown entry");
    }

    #[test]
    fn cascade_prefers_ship_code() {
        let mut by_slug = HashMap::new();
        by_slug.insert("f7a-hornet-mk-i", 7i64);
        by_slug.insert("hornet", 9i64);
        let by_compact = HashMap::new();

        let entry = HangarEntry {
            ship_code: Some("ANVL_F7A_Hornet_Mk_I".to_string()),
            ship_name: Some("Hornet".to_string()),
            ..HangarEntry::default()
        };
        assert_eq!(resolve_vehicle(&entry, &by_slug, &by_compact), Some(7));
    }

    #[test]
    fn cascade_falls_back_to_compact() {
        let by_slug = HashMap::new();
        let mut by_compact = HashMap::new();
        by_compact.insert("atls".to_string(), 3i64);

        let entry = HangarEntry {
            ship_name: Some("A.T.L.S".to_string()),
            ..HangarEntry::default()
        };
        assert_eq!(resolve_vehicle(&entry, &by_slug, &by_compact), Some(3));
    }
}
