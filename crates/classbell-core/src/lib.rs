//! # Classbell Core Library
//!
//! Instructional time allocation engine for a multi-tenant school
//! management application. A tenant's day is described by a
//! [`ScheduleStructure`]: the instructional window, a fixed module
//! duration, and the break windows nested inside it. For exceptional
//! calendar dates (festivals, assemblies, shortened days) an override
//! structure supersedes the standard day, and the normalizer proposes a
//! module duration that keeps the day's module count intact inside the
//! changed window.
//!
//! ## Key components
//!
//! - [`TimeOfDay`] / [`TimeSpan`]: wall-clock arithmetic, minutes since
//!   midnight
//! - [`ScheduleStructure`]: validated day shape; cannot exist inconsistent
//! - [`propose_module_duration`]: proportional recalculation that preserves
//!   module count across a compressed or expanded window
//! - [`resolve`]: override-then-standard lookup for a (tenant, date)
//! - [`ScheduleStore`]: persistence contract, with in-memory and SQLite
//!   implementations
//!
//! The engine is pure computation over immutable values: no I/O outside
//! the store implementations, no shared mutable state, and every operation
//! either returns a valid value or a specific [`ScheduleError`].

pub mod error;
pub mod normalizer;
pub mod resolver;
pub mod store;
pub mod structure;
pub mod time;

pub use error::{CoreError, Result, ScheduleError, StoreError};
pub use normalizer::{propose_module_duration, propose_structure, target_available_minutes};
pub use resolver::{resolve, EffectiveSchedule, ScheduleSource};
pub use store::{
    data_dir, ensure_onboarded, MemoryStore, ScheduleDb, ScheduleStore, SpecialSchedule, TenantId,
};
pub use structure::{BreakWindow, ScheduleStructure};
pub use time::{TimeOfDay, TimeSpan, MINUTES_PER_DAY};
