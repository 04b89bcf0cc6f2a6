use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{Scenario, ScenarioInput};
use crate::predict;

/// Saved-scenario collection backed by a single JSON file.
///
/// The whole collection is the unit of persistence: it is read once when the
/// store is opened and rewritten in full after every change.
pub struct ScenarioStore {
    path: PathBuf,
    scenarios: Vec<Scenario>,
}

impl ScenarioStore {
    /// Opens the store at `path`. A missing file yields an empty collection;
    /// an unreadable or malformed file is reported on stderr and likewise
    /// replaced with an empty collection rather than failing the command.
    pub fn load(path: &Path) -> Self {
        let scenarios = match std::fs::read_to_string(path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(scenarios) => scenarios,
                Err(err) => {
                    eprintln!(
                        "warning: discarding malformed scenario file {}: {err}",
                        path.display()
                    );
                    Vec::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(err) => {
                eprintln!("warning: cannot read {}: {err}", path.display());
                Vec::new()
            }
        };

        ScenarioStore {
            path: path.to_path_buf(),
            scenarios,
        }
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(&self.scenarios)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("failed to write {}", self.path.display()))
    }

    /// Inserts a scenario, or replaces the stored one with the same id so a
    /// re-saved edit keeps its identity.
    pub fn upsert(&mut self, scenario: Scenario) {
        match self.scenarios.iter_mut().find(|s| s.id == scenario.id) {
            Some(existing) => *existing = scenario,
            None => self.scenarios.push(scenario),
        }
    }

    pub fn delete(&mut self, id: &Uuid) -> bool {
        let before = self.scenarios.len();
        self.scenarios.retain(|s| s.id != *id);
        self.scenarios.len() < before
    }

    pub fn get(&self, id: &Uuid) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.id == *id)
    }

    pub fn all(&self) -> &[Scenario] {
        &self.scenarios
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    /// Scenarios newest first, as the saved-prediction list displays them.
    pub fn sorted_by_recency(&self) -> Vec<&Scenario> {
        let mut sorted: Vec<&Scenario> = self.scenarios.iter().collect();
        sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        sorted
    }

    pub fn export_csv(&self, csv_path: &Path) -> anyhow::Result<usize> {
        let mut writer = csv::Writer::from_path(csv_path)
            .with_context(|| format!("failed to create {}", csv_path.display()))?;

        for scenario in &self.scenarios {
            writer.serialize(CsvScenario::from(scenario))?;
        }
        writer.flush()?;
        Ok(self.scenarios.len())
    }

    /// Imports scenarios from a CSV file. Predictions are recomputed from the
    /// imported inputs, so a hand-edited row cannot store a trend that
    /// disagrees with its difference. Rows carrying an id upsert; rows
    /// without one are inserted fresh.
    pub fn import_csv(&mut self, csv_path: &Path) -> anyhow::Result<usize> {
        let mut reader = csv::Reader::from_path(csv_path)
            .with_context(|| format!("failed to open {}", csv_path.display()))?;
        let mut imported = 0usize;

        for result in reader.deserialize::<CsvScenario>() {
            let row = result?;
            let input = ScenarioInput {
                current_cgpa: row.current_cgpa,
                last_sgpa: row.last_sgpa,
                upcoming_sgpa: row.upcoming_sgpa,
                total_credits: row.total_credits,
                last_sem_credits: row.last_sem_credits,
                upcoming_sem_credits: row.upcoming_sem_credits,
            };
            let prediction = predict::predict(&input);
            let timestamp = row
                .timestamp
                .and_then(DateTime::<Utc>::from_timestamp_millis)
                .unwrap_or_else(Utc::now);

            self.upsert(Scenario {
                id: row.id.unwrap_or_else(Uuid::new_v4),
                name: row.name,
                timestamp,
                input,
                prediction,
            });
            imported += 1;
        }

        Ok(imported)
    }
}

/// Flat CSV row. Prediction columns are written on export for readability but
/// ignored on import.
#[derive(serde::Serialize, serde::Deserialize)]
struct CsvScenario {
    #[serde(default)]
    id: Option<Uuid>,
    name: String,
    /// Epoch milliseconds, matching the stored JSON timestamps.
    #[serde(default)]
    timestamp: Option<i64>,
    #[serde(rename = "currentCGPA")]
    current_cgpa: f64,
    #[serde(rename = "lastSGPA", default)]
    last_sgpa: f64,
    #[serde(rename = "upcomingSGPA")]
    upcoming_sgpa: f64,
    #[serde(rename = "totalCredits", default)]
    total_credits: Option<f64>,
    #[serde(rename = "lastSemCredits", default)]
    last_sem_credits: Option<f64>,
    #[serde(rename = "upcomingSemCredits", default)]
    upcoming_sem_credits: Option<f64>,
    #[serde(rename = "newCGPA", default)]
    new_cgpa: Option<f64>,
    #[serde(default)]
    difference: Option<f64>,
    #[serde(default)]
    trend: Option<String>,
}

impl From<&Scenario> for CsvScenario {
    fn from(scenario: &Scenario) -> Self {
        CsvScenario {
            id: Some(scenario.id),
            name: scenario.name.clone(),
            timestamp: Some(scenario.timestamp.timestamp_millis()),
            current_cgpa: scenario.input.current_cgpa,
            last_sgpa: scenario.input.last_sgpa,
            upcoming_sgpa: scenario.input.upcoming_sgpa,
            total_credits: scenario.input.total_credits,
            last_sem_credits: scenario.input.last_sem_credits,
            upcoming_sem_credits: scenario.input.upcoming_sem_credits,
            new_cgpa: Some(scenario.prediction.new_cgpa),
            difference: Some(scenario.prediction.difference),
            trend: Some(scenario.prediction.trend.to_string()),
        }
    }
}
