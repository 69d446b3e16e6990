//! SQLite-backed schedule storage.
//!
//! One `schedule_settings` row per tenant and one `special_schedules` row
//! per (tenant, date). Window bounds are stored as "HH:MM" text and breaks
//! as a JSON array, the same shape the wire format uses.

use std::path::Path;

use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{data_dir, ScheduleStore, SpecialSchedule, TenantId};
use crate::error::StoreError;
use crate::store::migrations;
use crate::structure::{BreakWindow, ScheduleStructure};
use crate::time::TimeOfDay;

/// Rebuild a structure from its column values, re-running validation so a
/// corrupted row is reported instead of leaking an inconsistent structure.
fn decode_structure(
    start_time: &str,
    end_time: &str,
    module_duration: i64,
    breaks_json: &str,
) -> Result<ScheduleStructure, StoreError> {
    let start = TimeOfDay::parse(start_time)
        .map_err(|e| StoreError::InvalidRecord(e.to_string()))?;
    let end = TimeOfDay::parse(end_time)
        .map_err(|e| StoreError::InvalidRecord(e.to_string()))?;
    let duration = u32::try_from(module_duration)
        .map_err(|_| StoreError::InvalidRecord(format!("module_duration {module_duration}")))?;
    let breaks: Vec<BreakWindow> = serde_json::from_str(breaks_json)?;

    ScheduleStructure::new(start, end, duration, breaks)
        .map_err(|e| StoreError::InvalidRecord(e.to_string()))
}

fn row_to_special(row: &Row) -> Result<SpecialSchedule, rusqlite::Error> {
    // Decoding errors surface after the query; rusqlite's row callback can
    // only carry its own error type.
    let target_date: String = row.get(0)?;
    let name: Option<String> = row.get(1)?;
    let start_time: String = row.get(2)?;
    let end_time: String = row.get(3)?;
    let module_duration: i64 = row.get(4)?;
    let breaks_json: String = row.get(5)?;

    let date: NaiveDate = target_date.parse().map_err(|_| {
        rusqlite::Error::InvalidColumnType(0, "target_date".into(), rusqlite::types::Type::Text)
    })?;
    let structure =
        decode_structure(&start_time, &end_time, module_duration, &breaks_json).map_err(|_| {
            rusqlite::Error::InvalidColumnType(2, "structure".into(), rusqlite::types::Type::Text)
        })?;

    Ok(SpecialSchedule::new(date, name, structure))
}

/// SQLite database implementing [`ScheduleStore`].
pub struct ScheduleDb {
    conn: Connection,
}

impl ScheduleDb {
    /// Open (or create) the database at the default data directory.
    pub fn open_default() -> Result<Self, StoreError> {
        let dir = data_dir().map_err(|e| StoreError::MigrationFailed(e.to_string()))?;
        Self::open(dir.join("classbell.db"))
    }

    /// Open (or create) a database at `path` and apply pending migrations.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| StoreError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_connection(conn)
    }

    /// In-memory database, mainly for tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        migrations::migrate(&conn).map_err(|e| StoreError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }
}

impl ScheduleStore for ScheduleDb {
    fn standard_schedule(&self, tenant: &TenantId) -> Result<Option<ScheduleStructure>, StoreError> {
        let row = self
            .conn
            .query_row(
                "SELECT start_time, end_time, module_duration, breaks
                 FROM schedule_settings WHERE tenant_id = ?1",
                params![tenant.to_string()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;

        match row {
            Some((start, end, duration, breaks)) => {
                Ok(Some(decode_structure(&start, &end, duration, &breaks)?))
            }
            None => Ok(None),
        }
    }

    fn put_standard_schedule(
        &self,
        tenant: &TenantId,
        structure: &ScheduleStructure,
    ) -> Result<(), StoreError> {
        let breaks = serde_json::to_string(structure.breaks())?;
        self.conn.execute(
            "INSERT INTO schedule_settings
                (tenant_id, start_time, end_time, module_duration, breaks, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(tenant_id) DO UPDATE SET
                start_time = excluded.start_time,
                end_time = excluded.end_time,
                module_duration = excluded.module_duration,
                breaks = excluded.breaks,
                updated_at = excluded.updated_at",
            params![
                tenant.to_string(),
                structure.start_time().to_string(),
                structure.end_time().to_string(),
                structure.module_duration(),
                breaks,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn override_for(
        &self,
        tenant: &TenantId,
        date: NaiveDate,
    ) -> Result<Option<SpecialSchedule>, StoreError> {
        let special = self
            .conn
            .query_row(
                "SELECT target_date, name, start_time, end_time, module_duration, breaks
                 FROM special_schedules
                 WHERE tenant_id = ?1 AND target_date = ?2",
                params![tenant.to_string(), date.to_string()],
                row_to_special,
            )
            .optional()?;
        Ok(special)
    }

    fn put_override(&self, tenant: &TenantId, special: &SpecialSchedule) -> Result<(), StoreError> {
        let breaks = serde_json::to_string(special.structure.breaks())?;
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO special_schedules
                (id, tenant_id, target_date, name, start_time, end_time,
                 module_duration, breaks, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
             ON CONFLICT(tenant_id, target_date) DO UPDATE SET
                name = excluded.name,
                start_time = excluded.start_time,
                end_time = excluded.end_time,
                module_duration = excluded.module_duration,
                breaks = excluded.breaks,
                updated_at = excluded.updated_at",
            params![
                Uuid::new_v4().to_string(),
                tenant.to_string(),
                special.target_date.to_string(),
                special.name,
                special.structure.start_time().to_string(),
                special.structure.end_time().to_string(),
                special.structure.module_duration(),
                breaks,
                now,
            ],
        )?;
        Ok(())
    }

    fn delete_override(&self, tenant: &TenantId, date: NaiveDate) -> Result<(), StoreError> {
        let affected = self.conn.execute(
            "DELETE FROM special_schedules WHERE tenant_id = ?1 AND target_date = ?2",
            params![tenant.to_string(), date.to_string()],
        )?;
        if affected == 0 {
            return Err(StoreError::OverrideNotFound { date });
        }
        Ok(())
    }

    fn list_overrides(&self, tenant: &TenantId) -> Result<Vec<SpecialSchedule>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT target_date, name, start_time, end_time, module_duration, breaks
             FROM special_schedules
             WHERE tenant_id = ?1
             ORDER BY target_date ASC",
        )?;
        let rows = stmt.query_map(params![tenant.to_string()], row_to_special)?;

        let mut specials = Vec::new();
        for row in rows {
            specials.push(row?);
        }
        Ok(specials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ensure_onboarded;

    fn t(s: &str) -> TimeOfDay {
        TimeOfDay::parse(s).unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn festival_day() -> ScheduleStructure {
        ScheduleStructure::new(
            t("07:00"),
            t("12:00"),
            38,
            vec![BreakWindow::new("Recess", t("10:00"), t("10:30"))],
        )
        .unwrap()
    }

    #[test]
    fn standard_schedule_round_trip() {
        let db = ScheduleDb::open_in_memory().unwrap();
        let tenant = TenantId::new();

        assert!(db.standard_schedule(&tenant).unwrap().is_none());

        let day = ScheduleStructure::default_school_day();
        db.put_standard_schedule(&tenant, &day).unwrap();
        assert_eq!(db.standard_schedule(&tenant).unwrap(), Some(day));

        let replacement = festival_day();
        db.put_standard_schedule(&tenant, &replacement).unwrap();
        assert_eq!(db.standard_schedule(&tenant).unwrap(), Some(replacement));
    }

    #[test]
    fn override_round_trip_with_name() {
        let db = ScheduleDb::open_in_memory().unwrap();
        let tenant = TenantId::new();
        let special = SpecialSchedule::new(
            date("2026-12-18"),
            Some("Christmas Festival".to_string()),
            festival_day(),
        );

        db.put_override(&tenant, &special).unwrap();
        assert_eq!(db.override_for(&tenant, date("2026-12-18")).unwrap(), Some(special));
        assert!(db.override_for(&tenant, date("2026-12-19")).unwrap().is_none());
    }

    #[test]
    fn put_override_upserts_per_date() {
        let db = ScheduleDb::open_in_memory().unwrap();
        let tenant = TenantId::new();
        let d = date("2026-12-18");

        db.put_override(&tenant, &SpecialSchedule::new(d, None, festival_day()))
            .unwrap();
        let edited = SpecialSchedule::new(
            d,
            Some("Assembly".to_string()),
            ScheduleStructure::new(t("07:00"), t("11:00"), 30, vec![]).unwrap(),
        );
        db.put_override(&tenant, &edited).unwrap();

        let listed = db.list_overrides(&tenant).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0], edited);
    }

    #[test]
    fn list_orders_by_date_ascending() {
        let db = ScheduleDb::open_in_memory().unwrap();
        let tenant = TenantId::new();
        for d in ["2027-03-05", "2026-12-18", "2027-01-20"] {
            db.put_override(&tenant, &SpecialSchedule::new(date(d), None, festival_day()))
                .unwrap();
        }
        let dates: Vec<NaiveDate> = db
            .list_overrides(&tenant)
            .unwrap()
            .into_iter()
            .map(|s| s.target_date)
            .collect();
        assert_eq!(dates, [date("2026-12-18"), date("2027-01-20"), date("2027-03-05")]);
    }

    #[test]
    fn delete_override_falls_back_to_not_found() {
        let db = ScheduleDb::open_in_memory().unwrap();
        let tenant = TenantId::new();
        let d = date("2026-12-18");

        assert!(matches!(
            db.delete_override(&tenant, d).unwrap_err(),
            StoreError::OverrideNotFound { .. }
        ));

        db.put_override(&tenant, &SpecialSchedule::new(d, None, festival_day()))
            .unwrap();
        db.delete_override(&tenant, d).unwrap();
        assert!(db.override_for(&tenant, d).unwrap().is_none());
    }

    #[test]
    fn tenants_do_not_see_each_other() {
        let db = ScheduleDb::open_in_memory().unwrap();
        let a = TenantId::new();
        let b = TenantId::new();

        db.put_standard_schedule(&a, &ScheduleStructure::default_school_day())
            .unwrap();
        db.put_override(&a, &SpecialSchedule::new(date("2026-12-18"), None, festival_day()))
            .unwrap();

        assert!(db.standard_schedule(&b).unwrap().is_none());
        assert!(db.list_overrides(&b).unwrap().is_empty());
    }

    #[test]
    fn data_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("classbell.db");
        let tenant = TenantId::new();

        {
            let db = ScheduleDb::open(&path).unwrap();
            ensure_onboarded(&db, &tenant).unwrap();
            db.put_override(
                &tenant,
                &SpecialSchedule::new(
                    date("2026-12-18"),
                    Some("Festival".to_string()),
                    festival_day(),
                ),
            )
            .unwrap();
        }

        let db = ScheduleDb::open(&path).unwrap();
        assert_eq!(
            db.standard_schedule(&tenant).unwrap(),
            Some(ScheduleStructure::default_school_day())
        );
        let listed = db.list_overrides(&tenant).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name.as_deref(), Some("Festival"));
    }
}
