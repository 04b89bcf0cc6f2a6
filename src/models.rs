use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Direction of the predicted CGPA change, derived from the sign of the
/// rounded difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increase,
    Decrease,
    Stable,
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Trend::Increase => "increase",
            Trend::Decrease => "decrease",
            Trend::Stable => "stable",
        };
        f.write_str(label)
    }
}

/// Caller-supplied numeric fields. GPA fields are on a 0-10 scale; credit
/// fields are optional and switch the predictor to the credit-weighted
/// formula when supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioInput {
    #[serde(rename = "currentCGPA")]
    pub current_cgpa: f64,
    #[serde(rename = "lastSGPA")]
    pub last_sgpa: f64,
    #[serde(rename = "upcomingSGPA")]
    pub upcoming_sgpa: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_credits: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sem_credits: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upcoming_sem_credits: Option<f64>,
}

/// Predictor output. Both numbers carry exactly two decimal places.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    #[serde(rename = "newCGPA")]
    pub new_cgpa: f64,
    pub difference: f64,
    pub trend: Trend,
}

/// A saved prediction. The JSON shape (camelCase keys, epoch-millisecond
/// timestamp) matches what the original web version of this tool kept in
/// localStorage, so an exported collection from either tool loads in the
/// other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub id: Uuid,
    pub name: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub input: ScenarioInput,
    #[serde(flatten)]
    pub prediction: Prediction,
}

impl Scenario {
    pub fn new(name: String, input: ScenarioInput, prediction: Prediction) -> Self {
        Scenario {
            id: Uuid::new_v4(),
            name,
            timestamp: now_millis(),
            input,
            prediction,
        }
    }
}

/// Current instant truncated to millisecond precision, so an in-memory
/// scenario compares equal to its stored form.
pub fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}
