//! Effective-schedule resolution.
//!
//! Given a tenant and a calendar date, the override for that date governs
//! if one exists; otherwise the tenant's standard schedule does. Pure
//! lookup: repeated calls against unchanged storage return the same result.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};
use crate::store::{ScheduleStore, TenantId};
use crate::structure::ScheduleStructure;

/// Which schedule governs a resolved date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleSource {
    Standard,
    Override,
}

/// The structure governing a date, together with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveSchedule {
    pub source: ScheduleSource,
    pub structure: ScheduleStructure,
}

/// Resolve the schedule governing `date` for `tenant`.
///
/// # Errors
/// [`ScheduleError::NoScheduleConfigured`] if the tenant has neither an
/// override for the date nor a standard schedule; storage failures pass
/// through.
pub fn resolve(
    store: &dyn ScheduleStore,
    tenant: &TenantId,
    date: NaiveDate,
) -> Result<EffectiveSchedule> {
    if let Some(special) = store.override_for(tenant, date)? {
        return Ok(EffectiveSchedule {
            source: ScheduleSource::Override,
            structure: special.structure,
        });
    }

    match store.standard_schedule(tenant)? {
        Some(structure) => Ok(EffectiveSchedule {
            source: ScheduleSource::Standard,
            structure,
        }),
        None => Err(ScheduleError::NoScheduleConfigured {
            tenant: *tenant,
            date,
        }
        .into()),
    }
}
