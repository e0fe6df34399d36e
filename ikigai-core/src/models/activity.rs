//! Daily activity types.

use serde::{Deserialize, Serialize};

/// Activity totals for one day.
///
/// Produced fresh by every successful API call and discarded once mapped
/// to metrics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivitySummary {
    /// Total calories burned.
    pub calories_out: u32,
    /// Calories burned above the basal metabolic rate.
    pub activity_calories: u32,
    /// Basal metabolic rate calories.
    pub calories_bmr: u32,
    /// Minutes in the fairly-active band.
    pub fairly_active_minutes: u32,
    /// Minutes in the lightly-active band.
    pub lightly_active_minutes: u32,
    /// Minutes in the very-active band.
    pub very_active_minutes: u32,
    /// Sedentary minutes.
    pub sedentary_minutes: u32,
    /// Step count, when the device reports one.
    pub steps: Option<u32>,
    /// Daily goals, when the response carries them.
    pub goals: Option<Goals>,
}

/// Daily targets configured by the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goals {
    /// Target step count.
    pub steps: u32,
    /// Target calories burned.
    pub calories_out: u32,
}
