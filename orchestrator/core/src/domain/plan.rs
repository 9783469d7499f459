// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Plan
//!
//! Canonical recovery plan shape returned to callers.
//!
//! The model authors every field except the derived link fields on
//! [`Exercise`]. Nested scalars are deserialized leniently (a model may emit
//! `"sets": 3` or `"sets": "3"`), and list fields accept either an array or a
//! single string. Top-level presence is checked by the response normalizer,
//! not here.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub analysis: Analysis,
    pub exercise_plan: ExercisePlan,
    pub diet_recommendations: DietRecommendations,
    pub consultation: Consultation,
    pub recovery_timeline: RecoveryTimeline,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    #[serde(default, deserialize_with = "lenient::string")]
    pub understanding: String,
    #[serde(default, deserialize_with = "lenient::list")]
    pub likely_causes: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub severity: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub prognosis: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExercisePlan {
    /// Non-empty and ordered; the UI numbers exercises by position
    pub selected_exercises: Vec<Exercise>,
}

/// One exercise entry. The last four fields are derived by enrichment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    #[serde(deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub sets: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub reps: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub difficulty: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment_name: Option<String>,

    /// Model-authored keys we do not model (e.g. "holdTime"), kept verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Exercise {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Drop any derived link fields, e.g. ones a model invented
    pub fn clear_derived(&mut self) {
        self.video_url = None;
        self.thumbnail_url = None;
        self.equipment_url = None;
        self.equipment_name = None;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DietRecommendations {
    #[serde(default, deserialize_with = "lenient::string")]
    pub overview: String,
    #[serde(default, deserialize_with = "lenient::list")]
    pub key_foods: Vec<String>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub foods_to_avoid: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub hydration: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Consultation {
    #[serde(default, deserialize_with = "lenient::string")]
    pub urgency: String,
    #[serde(default, deserialize_with = "lenient::list")]
    pub specialists: Vec<String>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub red_flags: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub follow_up: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecoveryTimeline {
    #[serde(default, deserialize_with = "lenient::string")]
    pub week1: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub week2_3: String,
    #[serde(rename = "longTerm", default, deserialize_with = "lenient::string")]
    pub long_term: String,
}

/// Model output could not be turned into a [`Plan`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("plan corrupted: {reason}")]
pub struct PlanCorrupted {
    pub reason: String,
}

impl PlanCorrupted {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn scalar(value: Value) -> Option<String> {
        match value {
            Value::Null => None,
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            other => Some(other.to_string()),
        }
    }

    pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(scalar(Value::deserialize(deserializer)?).unwrap_or_default())
    }

    pub fn list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Array(items) => items.into_iter().filter_map(scalar).collect(),
            Value::Null => Vec::new(),
            other => scalar(other).into_iter().collect(),
        })
    }
}
