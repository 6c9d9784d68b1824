//! Reporting mode and date range selection.

use crate::consts::cli_consts::presets;
use chrono::NaiveDate;

/// Which dataset the dashboard reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display)]
pub enum Mode {
    /// The user's own records.
    #[default]
    Live,
    /// Read-only demo dataset served by the backend.
    Sample,
}

impl Mode {
    pub fn is_sample(&self) -> bool {
        matches!(self, Mode::Sample)
    }

    /// Label of the mode toggle.
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Live => "Real Data",
            Mode::Sample => "Test Data",
        }
    }
}

/// Selected date range. Custom bounds may be partially filled while the user is picking them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRange {
    /// Trailing window of `n` days ending today.
    LastNDays(u32),
    Custom {
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
}

impl DateRange {
    /// Bounds of a usable custom range: both present and `start <= end`.
    pub fn custom_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        match *self {
            DateRange::Custom {
                start: Some(start),
                end: Some(end),
            } if start <= end => Some((start, end)),
            _ => None,
        }
    }

    /// A preset is always complete; a custom range only once its bounds are valid.
    pub fn is_complete(&self) -> bool {
        match self {
            DateRange::LastNDays(_) => true,
            DateRange::Custom { .. } => self.custom_bounds().is_some(),
        }
    }
}

impl Default for DateRange {
    fn default() -> Self {
        DateRange::LastNDays(presets::DEFAULT_DAYS)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FilterState {
    mode: Mode,
    range: DateRange,
    custom_range_visible: bool,
}

impl FilterState {
    pub fn new(mode: Mode, range: DateRange) -> Self {
        Self {
            mode,
            range,
            custom_range_visible: matches!(range, DateRange::Custom { .. }),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn range(&self) -> DateRange {
        self.range
    }

    /// Whether the custom start/end inputs are shown.
    pub fn custom_range_visible(&self) -> bool {
        self.custom_range_visible
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    /// Selects a trailing window and hides the custom inputs.
    pub fn set_preset(&mut self, days: u32) {
        self.range = DateRange::LastNDays(days);
        self.custom_range_visible = false;
    }

    /// Selects a custom range. Either bound may still be missing.
    pub fn set_custom_range(&mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) {
        self.range = DateRange::Custom { start, end };
        self.custom_range_visible = true;
    }

    /// A refresh is only issued for a complete selection.
    pub fn is_ready(&self) -> bool {
        self.range.is_complete()
    }
}
