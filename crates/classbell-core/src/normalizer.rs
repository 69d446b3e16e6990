//! Module-count normalization.
//!
//! When a special day compresses (or expands) the teaching window, the
//! adjusted schedule should still hold the same number of instructional
//! modules as the standard day, just shorter or longer ones. This module
//! derives that proportional module duration.
//!
//! Floor division is used on both sides (module count and proposed
//! duration) so the result never overcommits the available time; leftover
//! minutes stay unallocated rather than being folded into the last module.

use crate::error::ScheduleError;
use crate::structure::{BreakWindow, ScheduleStructure};
use crate::time::TimeSpan;

/// Instructional minutes left in a candidate day: window minus breaks.
///
/// Inputs are raw (not yet validated), so the result may be non-positive.
pub fn target_available_minutes(window: TimeSpan, breaks: &[BreakWindow]) -> i32 {
    let break_total: i32 = breaks.iter().map(|b| b.duration_minutes()).sum();
    window.duration_minutes() - break_total
}

/// Propose a module duration for a target day that preserves the reference
/// day's module count.
///
/// Only available minutes matter: the target may have a different number
/// of breaks, placed differently, than the reference.
///
/// # Errors
/// - [`ScheduleError::DegenerateReference`] if the reference fits zero
///   modules (no proportion can be derived from it)
/// - [`ScheduleError::NegativeAvailableTime`] if the target has no
///   instructional time left after breaks
/// - [`ScheduleError::DurationBelowMinimum`] if the target is too short to
///   host the reference module count with any positive duration; this is
///   reported rather than clamped so the administrator sees why the day
///   cannot work
pub fn propose_module_duration(
    reference: &ScheduleStructure,
    target_window: TimeSpan,
    target_breaks: &[BreakWindow],
) -> Result<u32, ScheduleError> {
    let reference_modules = reference.module_count();
    if reference_modules == 0 {
        return Err(ScheduleError::DegenerateReference {
            module_duration: reference.module_duration(),
            available_minutes: reference.available_minutes(),
        });
    }

    let target_available = target_available_minutes(target_window, target_breaks);
    if target_available <= 0 {
        return Err(ScheduleError::NegativeAvailableTime {
            minutes: target_available,
        });
    }

    let proposed = target_available as u32 / reference_modules;
    if proposed == 0 {
        return Err(ScheduleError::DurationBelowMinimum {
            available_minutes: target_available,
            module_count: reference_modules,
        });
    }

    Ok(proposed)
}

/// Propose a duration and assemble the complete target structure with it,
/// running full validation on the result.
///
/// Going through this (rather than feeding [`propose_module_duration`]'s
/// output into storage directly) guarantees a proposal can never be
/// accepted while inconsistent.
pub fn propose_structure(
    reference: &ScheduleStructure,
    target_window: TimeSpan,
    target_breaks: Vec<BreakWindow>,
) -> Result<ScheduleStructure, ScheduleError> {
    let duration = propose_module_duration(reference, target_window, &target_breaks)?;
    ScheduleStructure::new(target_window.start, target_window.end, duration, target_breaks)
}
