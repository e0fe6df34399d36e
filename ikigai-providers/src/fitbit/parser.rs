//! Fitbit daily activity response parsing.
//!
//! Only the fields that feed metrics are decoded; everything else in the
//! response (distances, activity lists, heart rate zones) is ignored.
//!
//! ```json
//! {
//!   "summary": {
//!     "activityCalories": 400,
//!     "caloriesBMR": 1800,
//!     "caloriesOut": 2200,
//!     "fairlyActiveMinutes": 10,
//!     "lightlyActiveMinutes": 120,
//!     "veryActiveMinutes": 15,
//!     "sedentaryMinutes": 600,
//!     "steps": 8000
//!   },
//!   "goals": { "caloriesOut": 2500, "steps": 10000 }
//! }
//! ```

use ikigai_core::{ActivitySummary, ApiError, Goals};
use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Deserialize)]
struct DailyActivityResponse {
    summary: SummaryPayload,
    #[serde(default)]
    goals: Option<GoalsPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryPayload {
    activity_calories: u32,
    #[serde(rename = "caloriesBMR")]
    calories_bmr: u32,
    calories_out: u32,
    fairly_active_minutes: u32,
    lightly_active_minutes: u32,
    very_active_minutes: u32,
    sedentary_minutes: u32,
    #[serde(default)]
    steps: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoalsPayload {
    calories_out: u32,
    steps: u32,
}

/// Decodes a daily activity response body.
///
/// # Errors
///
/// Returns [`ApiError::Decode`] if the body is not JSON or a required
/// summary field is missing or not a non-negative integer.
pub fn parse_daily_activity(body: &[u8]) -> Result<ActivitySummary, ApiError> {
    let response: DailyActivityResponse = serde_json::from_slice(body).map_err(|e| {
        warn!(error = %e, "Failed to parse activity response");
        ApiError::Decode(e.to_string())
    })?;

    let summary = response.summary;
    Ok(ActivitySummary {
        calories_out: summary.calories_out,
        activity_calories: summary.activity_calories,
        calories_bmr: summary.calories_bmr,
        fairly_active_minutes: summary.fairly_active_minutes,
        lightly_active_minutes: summary.lightly_active_minutes,
        very_active_minutes: summary.very_active_minutes,
        sedentary_minutes: summary.sedentary_minutes,
        steps: summary.steps,
        goals: response.goals.map(|g| Goals {
            steps: g.steps,
            calories_out: g.calories_out,
        }),
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ikigai_core::ApiErrorKind;

    const SCENARIO_A: &str = r#"{
        "summary": {
            "caloriesOut": 2200,
            "activityCalories": 400,
            "caloriesBMR": 1800,
            "fairlyActiveMinutes": 10,
            "lightlyActiveMinutes": 120,
            "veryActiveMinutes": 15,
            "sedentaryMinutes": 600,
            "steps": 8000
        },
        "goals": { "caloriesOut": 2500, "steps": 10000 }
    }"#;

    #[test]
    fn test_parse_full_response() {
        let summary = parse_daily_activity(SCENARIO_A.as_bytes()).unwrap();

        assert_eq!(summary.calories_out, 2200);
        assert_eq!(summary.activity_calories, 400);
        assert_eq!(summary.calories_bmr, 1800);
        assert_eq!(summary.fairly_active_minutes, 10);
        assert_eq!(summary.lightly_active_minutes, 120);
        assert_eq!(summary.very_active_minutes, 15);
        assert_eq!(summary.sedentary_minutes, 600);
        assert_eq!(summary.steps, Some(8000));
        assert_eq!(
            summary.goals,
            Some(Goals {
                steps: 10_000,
                calories_out: 2500
            })
        );
    }

    #[test]
    fn test_parse_without_goals_or_steps() {
        let json = r#"{"summary": {
            "caloriesOut": 1, "activityCalories": 2, "caloriesBMR": 3,
            "fairlyActiveMinutes": 4, "lightlyActiveMinutes": 5,
            "veryActiveMinutes": 6, "sedentaryMinutes": 7
        }}"#;

        let summary = parse_daily_activity(json.as_bytes()).unwrap();
        assert_eq!(summary.steps, None);
        assert_eq!(summary.goals, None);
    }

    #[test]
    fn test_parse_ignores_unknown_fields() {
        let json = r#"{
            "activities": [],
            "summary": {
                "caloriesOut": 1, "activityCalories": 2, "caloriesBMR": 3,
                "fairlyActiveMinutes": 4, "lightlyActiveMinutes": 5,
                "veryActiveMinutes": 6, "sedentaryMinutes": 7,
                "distances": [{"activity": "total", "distance": 1.5}],
                "floors": 3
            },
            "goals": {"activeMinutes": 30, "caloriesOut": 2500, "distance": 8.05, "floors": 10, "steps": 10000}
        }"#;

        let summary = parse_daily_activity(json.as_bytes()).unwrap();
        assert_eq!(summary.goals.map(|g| g.steps), Some(10_000));
    }

    #[test]
    fn test_invalid_json_is_decode_error() {
        let err = parse_daily_activity(b"<html>oops</html>").unwrap_err();
        assert_eq!(err.kind(), ApiErrorKind::Decode);
    }

    #[test]
    fn test_missing_summary_is_decode_error() {
        let err = parse_daily_activity(br#"{"goals": {"caloriesOut": 1, "steps": 2}}"#).unwrap_err();
        assert_eq!(err.kind(), ApiErrorKind::Decode);
    }

    #[test]
    fn test_negative_value_is_decode_error() {
        let json = SCENARIO_A.replace("\"caloriesOut\": 2200", "\"caloriesOut\": -5");
        let err = parse_daily_activity(json.as_bytes()).unwrap_err();
        assert_eq!(err.kind(), ApiErrorKind::Decode);
    }
}
