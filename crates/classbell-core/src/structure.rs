//! Schedule structures: the shape of an instructional day.
//!
//! A [`ScheduleStructure`] is the central entity of the engine: a day window,
//! a nominal module duration, and an ordered set of break windows. The only
//! way to obtain one is through the validating constructor (deserialization
//! is routed through it too), so a structure that exists is consistent.

use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;
use crate::time::{TimeOfDay, TimeSpan};

/// A non-instructional interval (recess) nested inside the day window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakWindow {
    pub name: String,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
}

impl BreakWindow {
    pub fn new(name: impl Into<String>, start_time: TimeOfDay, end_time: TimeOfDay) -> Self {
        Self {
            name: name.into(),
            start_time,
            end_time,
        }
    }

    pub fn span(&self) -> TimeSpan {
        TimeSpan::new(self.start_time, self.end_time)
    }

    /// Signed duration in minutes; negative if the break is inverted.
    pub fn duration_minutes(&self) -> i32 {
        self.span().duration_minutes()
    }
}

/// Unvalidated wire shape; deserialization funnels through [`ScheduleStructure::new`].
#[derive(Debug, Clone, Deserialize)]
struct RawScheduleStructure {
    start_time: TimeOfDay,
    end_time: TimeOfDay,
    module_duration: u32,
    breaks: Vec<BreakWindow>,
}

/// A validated day structure: window bounds, module duration, breaks.
///
/// Fields are private; mutation is modeled as building a replacement
/// candidate and revalidating it wholesale, never as in-place edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawScheduleStructure")]
pub struct ScheduleStructure {
    start_time: TimeOfDay,
    end_time: TimeOfDay,
    module_duration: u32,
    breaks: Vec<BreakWindow>,
}

impl TryFrom<RawScheduleStructure> for ScheduleStructure {
    type Error = ScheduleError;

    fn try_from(raw: RawScheduleStructure) -> Result<Self, Self::Error> {
        Self::new(raw.start_time, raw.end_time, raw.module_duration, raw.breaks)
    }
}

impl ScheduleStructure {
    /// Build a validated structure.
    ///
    /// Checks run in a fixed order and the first violation wins:
    /// 1. day `start < end`, else [`ScheduleError::InvalidWindow`]
    /// 2. `module_duration > 0`, else [`ScheduleError::InvalidModuleDuration`]
    /// 3. each break `start < end`, else [`ScheduleError::InvalidBreakWindow`]
    /// 4. each break inside the day window, else [`ScheduleError::BreakOutsideWindow`]
    /// 5. no two breaks overlap, else [`ScheduleError::OverlappingBreaks`]
    ///
    /// Breaks are normalized into ascending order by start time (stable, so
    /// insertion order breaks ties).
    pub fn new(
        start_time: TimeOfDay,
        end_time: TimeOfDay,
        module_duration: u32,
        breaks: Vec<BreakWindow>,
    ) -> Result<Self, ScheduleError> {
        if start_time >= end_time {
            return Err(ScheduleError::InvalidWindow {
                start: start_time,
                end: end_time,
            });
        }
        if module_duration == 0 {
            return Err(ScheduleError::InvalidModuleDuration(module_duration));
        }

        let window = TimeSpan::new(start_time, end_time);
        for b in &breaks {
            if b.start_time >= b.end_time {
                return Err(ScheduleError::InvalidBreakWindow {
                    name: b.name.clone(),
                    start: b.start_time,
                    end: b.end_time,
                });
            }
        }
        for b in &breaks {
            if !window.contains(b.span()) {
                return Err(ScheduleError::BreakOutsideWindow {
                    name: b.name.clone(),
                });
            }
        }
        for (i, a) in breaks.iter().enumerate() {
            for b in &breaks[i + 1..] {
                if a.span().overlaps(b.span()) {
                    return Err(ScheduleError::OverlappingBreaks {
                        first: a.name.clone(),
                        second: b.name.clone(),
                    });
                }
            }
        }

        let mut breaks = breaks;
        breaks.sort_by_key(|b| b.start_time);

        Ok(Self {
            start_time,
            end_time,
            module_duration,
            breaks,
        })
    }

    /// The structure a tenant starts with at onboarding: a 07:00-14:00 day
    /// of 50-minute modules with a single mid-morning recess.
    pub fn default_school_day() -> Self {
        Self {
            start_time: TimeOfDay::from_minutes_unchecked(7 * 60),
            end_time: TimeOfDay::from_minutes_unchecked(14 * 60),
            module_duration: 50,
            breaks: vec![BreakWindow {
                name: "Recess".to_string(),
                start_time: TimeOfDay::from_minutes_unchecked(10 * 60),
                end_time: TimeOfDay::from_minutes_unchecked(10 * 60 + 30),
            }],
        }
    }

    pub fn start_time(&self) -> TimeOfDay {
        self.start_time
    }

    pub fn end_time(&self) -> TimeOfDay {
        self.end_time
    }

    pub fn window(&self) -> TimeSpan {
        TimeSpan::new(self.start_time, self.end_time)
    }

    pub fn module_duration(&self) -> u32 {
        self.module_duration
    }

    /// Breaks, ascending by start time.
    pub fn breaks(&self) -> &[BreakWindow] {
        &self.breaks
    }

    /// Window duration minus total break time.
    ///
    /// Never negative: breaks are contained in the window and pairwise
    /// disjoint, so their total cannot exceed the window.
    pub fn available_minutes(&self) -> u32 {
        let window = self.window().duration_minutes();
        let breaks: i32 = self.breaks.iter().map(|b| b.duration_minutes()).sum();
        (window - breaks).max(0) as u32
    }

    /// How many whole modules fit in the available time.
    pub fn module_count(&self) -> u32 {
        self.available_minutes() / self.module_duration
    }

    /// Candidate with a different day window, revalidated.
    pub fn with_window(&self, start_time: TimeOfDay, end_time: TimeOfDay) -> Result<Self, ScheduleError> {
        Self::new(start_time, end_time, self.module_duration, self.breaks.clone())
    }

    /// Candidate with a different module duration, revalidated.
    pub fn with_module_duration(&self, module_duration: u32) -> Result<Self, ScheduleError> {
        Self::new(self.start_time, self.end_time, module_duration, self.breaks.clone())
    }

    /// Candidate with an extra break, revalidated.
    pub fn with_break_added(&self, brk: BreakWindow) -> Result<Self, ScheduleError> {
        let mut breaks = self.breaks.clone();
        breaks.push(brk);
        Self::new(self.start_time, self.end_time, self.module_duration, breaks)
    }

    /// Candidate with the break at `index` replaced, revalidated.
    pub fn with_break_replaced(&self, index: usize, brk: BreakWindow) -> Result<Self, ScheduleError> {
        if index >= self.breaks.len() {
            return Err(ScheduleError::BreakIndexOutOfBounds {
                index,
                len: self.breaks.len(),
            });
        }
        let mut breaks = self.breaks.clone();
        breaks[index] = brk;
        Self::new(self.start_time, self.end_time, self.module_duration, breaks)
    }

    /// Candidate with the break at `index` removed, revalidated.
    pub fn with_break_removed(&self, index: usize) -> Result<Self, ScheduleError> {
        if index >= self.breaks.len() {
            return Err(ScheduleError::BreakIndexOutOfBounds {
                index,
                len: self.breaks.len(),
            });
        }
        let mut breaks = self.breaks.clone();
        breaks.remove(index);
        Self::new(self.start_time, self.end_time, self.module_duration, breaks)
    }
}
