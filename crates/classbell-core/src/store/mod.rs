//! Schedule persistence.
//!
//! The engine itself is pure; this module defines the minimal contract it
//! needs from storage ([`ScheduleStore`]) plus two implementations: a
//! mutex-guarded in-memory store for tests and embedding, and a SQLite
//! store ([`ScheduleDb`]) for the application.

pub mod migrations;
pub mod schedule_db;

pub use schedule_db::ScheduleDb;

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Mutex;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StoreError;
use crate::structure::ScheduleStructure;

/// An isolated school/organization owning its own schedules.
///
/// Always passed explicitly; the engine has no ambient "current tenant".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(Uuid);

impl TenantId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for TenantId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for TenantId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl From<Uuid> for TenantId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

/// A date-keyed schedule that supersedes the standard day for exactly one
/// calendar date, with the event name administrators gave it ("Festival",
/// "Assembly").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialSchedule {
    pub target_date: NaiveDate,
    pub name: Option<String>,
    pub structure: ScheduleStructure,
}

impl SpecialSchedule {
    pub fn new(target_date: NaiveDate, name: Option<String>, structure: ScheduleStructure) -> Self {
        Self {
            target_date,
            name,
            structure,
        }
    }
}

/// Persistence contract for standard schedules and per-date overrides.
///
/// One standard schedule per tenant, at most one override per (tenant,
/// date). Implementations upsert on put; concurrent edits are last-write-
/// wins, but anything persisted has passed structure validation because
/// [`ScheduleStructure`] cannot exist unvalidated.
pub trait ScheduleStore {
    /// The tenant's recurring standard schedule, if configured.
    fn standard_schedule(&self, tenant: &TenantId) -> Result<Option<ScheduleStructure>, StoreError>;

    /// Create or replace the tenant's standard schedule.
    fn put_standard_schedule(
        &self,
        tenant: &TenantId,
        structure: &ScheduleStructure,
    ) -> Result<(), StoreError>;

    /// The override governing `date`, if one is stored.
    fn override_for(
        &self,
        tenant: &TenantId,
        date: NaiveDate,
    ) -> Result<Option<SpecialSchedule>, StoreError>;

    /// Create or replace the override for the special schedule's date.
    fn put_override(&self, tenant: &TenantId, special: &SpecialSchedule) -> Result<(), StoreError>;

    /// Remove the override for `date`, falling the date back to the
    /// standard schedule.
    ///
    /// # Errors
    /// [`StoreError::OverrideNotFound`] if no override exists for `date`.
    fn delete_override(&self, tenant: &TenantId, date: NaiveDate) -> Result<(), StoreError>;

    /// All of the tenant's overrides, ascending by date.
    fn list_overrides(&self, tenant: &TenantId) -> Result<Vec<SpecialSchedule>, StoreError>;
}

/// Seed the tenant's standard schedule with the default school day if none
/// is configured yet, returning whichever structure now governs.
///
/// Called at tenant onboarding; a no-op for tenants that already have one.
pub fn ensure_onboarded(
    store: &dyn ScheduleStore,
    tenant: &TenantId,
) -> Result<ScheduleStructure, StoreError> {
    if let Some(existing) = store.standard_schedule(tenant)? {
        return Ok(existing);
    }
    let default = ScheduleStructure::default_school_day();
    store.put_standard_schedule(tenant, &default)?;
    Ok(default)
}

#[derive(Debug, Default)]
struct TenantRecords {
    standard: Option<ScheduleStructure>,
    overrides: BTreeMap<NaiveDate, SpecialSchedule>,
}

/// In-memory [`ScheduleStore`] backed by a mutex-guarded map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<HashMap<TenantId, TenantRecords>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_tenant<T>(&self, tenant: &TenantId, f: impl FnOnce(&mut TenantRecords) -> T) -> T {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        f(inner.entry(*tenant).or_default())
    }
}

impl ScheduleStore for MemoryStore {
    fn standard_schedule(&self, tenant: &TenantId) -> Result<Option<ScheduleStructure>, StoreError> {
        Ok(self.with_tenant(tenant, |r| r.standard.clone()))
    }

    fn put_standard_schedule(
        &self,
        tenant: &TenantId,
        structure: &ScheduleStructure,
    ) -> Result<(), StoreError> {
        self.with_tenant(tenant, |r| r.standard = Some(structure.clone()));
        Ok(())
    }

    fn override_for(
        &self,
        tenant: &TenantId,
        date: NaiveDate,
    ) -> Result<Option<SpecialSchedule>, StoreError> {
        Ok(self.with_tenant(tenant, |r| r.overrides.get(&date).cloned()))
    }

    fn put_override(&self, tenant: &TenantId, special: &SpecialSchedule) -> Result<(), StoreError> {
        self.with_tenant(tenant, |r| {
            r.overrides.insert(special.target_date, special.clone())
        });
        Ok(())
    }

    fn delete_override(&self, tenant: &TenantId, date: NaiveDate) -> Result<(), StoreError> {
        let removed = self.with_tenant(tenant, |r| r.overrides.remove(&date));
        match removed {
            Some(_) => Ok(()),
            None => Err(StoreError::OverrideNotFound { date }),
        }
    }

    fn list_overrides(&self, tenant: &TenantId) -> Result<Vec<SpecialSchedule>, StoreError> {
        Ok(self.with_tenant(tenant, |r| r.overrides.values().cloned().collect()))
    }
}

/// Returns `~/.config/classbell[-dev]/` based on CLASSBELL_ENV.
///
/// Set CLASSBELL_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if the home directory cannot be determined or if
/// creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("CLASSBELL_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("classbell-dev")
    } else {
        base_dir.join("classbell")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::BreakWindow;
    use crate::time::TimeOfDay;

    fn t(s: &str) -> TimeOfDay {
        TimeOfDay::parse(s).unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn short_day(end: &str) -> ScheduleStructure {
        ScheduleStructure::new(t("07:00"), t(end), 38, vec![]).unwrap()
    }

    #[test]
    fn standard_schedule_round_trip() {
        let store = MemoryStore::new();
        let tenant = TenantId::new();

        assert!(store.standard_schedule(&tenant).unwrap().is_none());

        let day = ScheduleStructure::default_school_day();
        store.put_standard_schedule(&tenant, &day).unwrap();
        assert_eq!(store.standard_schedule(&tenant).unwrap(), Some(day.clone()));

        // Put replaces in place.
        let replacement = short_day("12:00");
        store.put_standard_schedule(&tenant, &replacement).unwrap();
        assert_eq!(store.standard_schedule(&tenant).unwrap(), Some(replacement));
    }

    #[test]
    fn overrides_are_keyed_by_date() {
        let store = MemoryStore::new();
        let tenant = TenantId::new();
        let festival = SpecialSchedule::new(
            date("2026-12-18"),
            Some("Festival".to_string()),
            short_day("12:00"),
        );
        store.put_override(&tenant, &festival).unwrap();

        assert_eq!(
            store.override_for(&tenant, date("2026-12-18")).unwrap(),
            Some(festival)
        );
        assert!(store.override_for(&tenant, date("2026-12-19")).unwrap().is_none());
    }

    #[test]
    fn put_override_upserts() {
        let store = MemoryStore::new();
        let tenant = TenantId::new();
        let d = date("2026-12-18");

        store
            .put_override(&tenant, &SpecialSchedule::new(d, None, short_day("12:00")))
            .unwrap();
        let edited = SpecialSchedule::new(d, Some("Assembly".to_string()), short_day("11:00"));
        store.put_override(&tenant, &edited).unwrap();

        assert_eq!(store.override_for(&tenant, d).unwrap(), Some(edited));
        assert_eq!(store.list_overrides(&tenant).unwrap().len(), 1);
    }

    #[test]
    fn list_is_ordered_by_date() {
        let store = MemoryStore::new();
        let tenant = TenantId::new();
        for d in ["2027-03-05", "2026-12-18", "2027-01-20"] {
            store
                .put_override(&tenant, &SpecialSchedule::new(date(d), None, short_day("12:00")))
                .unwrap();
        }
        let dates: Vec<NaiveDate> = store
            .list_overrides(&tenant)
            .unwrap()
            .into_iter()
            .map(|s| s.target_date)
            .collect();
        assert_eq!(dates, [date("2026-12-18"), date("2027-01-20"), date("2027-03-05")]);
    }

    #[test]
    fn delete_missing_override_reports_not_found() {
        let store = MemoryStore::new();
        let tenant = TenantId::new();
        let d = date("2026-12-18");

        let err = store.delete_override(&tenant, d).unwrap_err();
        assert!(matches!(err, StoreError::OverrideNotFound { .. }));

        store
            .put_override(&tenant, &SpecialSchedule::new(d, None, short_day("12:00")))
            .unwrap();
        store.delete_override(&tenant, d).unwrap();
        assert!(store.override_for(&tenant, d).unwrap().is_none());
    }

    #[test]
    fn tenants_are_isolated() {
        let store = MemoryStore::new();
        let a = TenantId::new();
        let b = TenantId::new();

        store
            .put_standard_schedule(&a, &ScheduleStructure::default_school_day())
            .unwrap();
        store
            .put_override(
                &a,
                &SpecialSchedule::new(date("2026-12-18"), None, short_day("12:00")),
            )
            .unwrap();

        assert!(store.standard_schedule(&b).unwrap().is_none());
        assert!(store.list_overrides(&b).unwrap().is_empty());
    }

    #[test]
    fn onboarding_seeds_the_default_day_once() {
        let store = MemoryStore::new();
        let tenant = TenantId::new();

        let seeded = ensure_onboarded(&store, &tenant).unwrap();
        assert_eq!(seeded, ScheduleStructure::default_school_day());

        // A tenant with a customized day keeps it.
        let custom = short_day("13:00");
        store.put_standard_schedule(&tenant, &custom).unwrap();
        assert_eq!(ensure_onboarded(&store, &tenant).unwrap(), custom);
    }

    #[test]
    fn break_window_breaks_survive_the_store() {
        let store = MemoryStore::new();
        let tenant = TenantId::new();
        let day = ScheduleStructure::new(
            t("07:00"),
            t("14:00"),
            45,
            vec![BreakWindow::new("Recess", t("09:30"), t("10:00"))],
        )
        .unwrap();
        store.put_standard_schedule(&tenant, &day).unwrap();
        let loaded = store.standard_schedule(&tenant).unwrap().unwrap();
        assert_eq!(loaded.breaks()[0].name, "Recess");
    }
}
