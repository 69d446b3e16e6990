//! Core error types for classbell-core.
//!
//! This module defines the error hierarchy using thiserror. Every error is
//! a deterministic function of its inputs; nothing here is retried
//! internally, the caller is expected to correct the input and call again.

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

use crate::store::TenantId;
use crate::time::TimeOfDay;

/// Core error type for classbell-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Domain/validation errors from the schedule engine
    #[error("Schedule error: {0}")]
    Schedule(#[from] ScheduleError),

    /// Storage-related errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Domain errors for schedule structures and the allocation algorithm.
///
/// Validation reports the first violation it finds; the ordering of the
/// checks is part of the contract (see [`crate::structure::ScheduleStructure::new`]).
#[derive(Error, Debug)]
pub enum ScheduleError {
    /// Malformed wall-clock time string at the parsing boundary
    #[error("Invalid time format: {0:?} (expected \"HH:MM\")")]
    InvalidTimeFormat(String),

    /// Day window has start >= end
    #[error("Invalid window: start ({start}) must be before end ({end})")]
    InvalidWindow { start: TimeOfDay, end: TimeOfDay },

    /// Non-positive module length
    #[error("Invalid module duration: {0} minutes (must be positive)")]
    InvalidModuleDuration(u32),

    /// A break whose own start >= end
    #[error("Invalid break window '{name}': start ({start}) must be before end ({end})")]
    InvalidBreakWindow {
        name: String,
        start: TimeOfDay,
        end: TimeOfDay,
    },

    /// A break not fully contained in the day window
    #[error("Break '{name}' falls outside the day window")]
    BreakOutsideWindow { name: String },

    /// Two breaks that overlap each other
    #[error("Breaks '{first}' and '{second}' overlap")]
    OverlappingBreaks { first: String, second: String },

    /// Break edit addressed a position that does not exist
    #[error("Break index {index} out of bounds (length: {len})")]
    BreakIndexOutOfBounds { index: usize, len: usize },

    /// Reference day fits zero modules, no proportion can be derived from it
    #[error(
        "Degenerate reference: {module_duration}-minute modules do not fit \
         in {available_minutes} available minutes"
    )]
    DegenerateReference {
        module_duration: u32,
        available_minutes: u32,
    },

    /// Target day has no instructional time left after breaks
    #[error("Target day has non-positive available time ({minutes} minutes)")]
    NegativeAvailableTime { minutes: i32 },

    /// Target window too short to host the reference module count
    #[error(
        "Cannot fit {module_count} modules into {available_minutes} available \
         minutes with a positive duration"
    )]
    DurationBelowMinimum {
        available_minutes: i32,
        module_count: u32,
    },

    /// Resolver found neither an override nor a standard schedule
    #[error("No schedule configured for tenant {tenant} on {date}")]
    NoScheduleConfigured { tenant: TenantId, date: NaiveDate },
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the database
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// A persisted record no longer passes validation or cannot be decoded
    #[error("Invalid stored record: {0}")]
    InvalidRecord(String),

    /// Delete targeted an override that does not exist
    #[error("No override stored for {date}")]
    OverrideNotFound { date: NaiveDate },
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::QueryFailed(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::InvalidRecord(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
