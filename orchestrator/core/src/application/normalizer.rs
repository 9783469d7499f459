// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Response normalization: raw completion text in, validated [`Plan`] out.

use crate::domain::plan::{Plan, PlanCorrupted};
use serde_json::Value;

const REQUIRED_SECTIONS: [&str; 5] = [
    "analysis",
    "exercisePlan",
    "dietRecommendations",
    "consultation",
    "recoveryTimeline",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseNormalizer;

impl ResponseNormalizer {
    pub fn new() -> Self {
        Self
    }

    pub fn normalize(&self, raw: &str) -> Result<Plan, PlanCorrupted> {
        let json = Self::strip_decoration(raw);
        if json.is_empty() {
            return Err(PlanCorrupted::new("response is empty"));
        }

        let value: Value = serde_json::from_str(json)
            .map_err(|e| PlanCorrupted::new(format!("invalid JSON: {}", e)))?;

        Self::check_shape(&value)?;

        let mut plan: Plan = serde_json::from_value(value)
            .map_err(|e| PlanCorrupted::new(format!("unexpected plan shape: {}", e)))?;

        for exercise in &mut plan.exercise_plan.selected_exercises {
            exercise.clear_derived();
        }

        Ok(plan)
    }

    /// Remove markdown fences and any prose around the outermost object
    fn strip_decoration(raw: &str) -> &str {
        let text = raw.trim();
        let text = Self::fenced_block(text).unwrap_or(text);

        match (text.find('{'), text.rfind('}')) {
            (Some(start), Some(end)) if start < end => &text[start..=end],
            _ => text.trim(),
        }
    }

    /// Content of the first fenced block opened before the JSON object.
    ///
    /// A fence only counts at the start of the text or of a line, so
    /// backticks inside string values and a lone closing fence are ignored.
    fn fenced_block(text: &str) -> Option<&str> {
        let open = if text.starts_with("```") {
            0
        } else {
            text.find("\n```")? + 1
        };
        if text.find('{').is_some_and(|brace| brace < open) {
            return None;
        }

        let after_marker = &text[open + 3..];
        // Skip the info string ("json", "JSON", ...) up to the end of the line
        let content_start = match after_marker.find('\n') {
            Some(newline) if after_marker[..newline].trim().chars().all(|c| c.is_ascii_alphanumeric()) => {
                newline + 1
            }
            _ => 0,
        };
        let content = &after_marker[content_start..];

        let content = match content.find("\n```") {
            Some(close) => &content[..close],
            None => {
                let trimmed = content.trim_end();
                trimmed.strip_suffix("```").unwrap_or(trimmed)
            }
        };
        Some(content.trim())
    }

    fn check_shape(value: &Value) -> Result<(), PlanCorrupted> {
        let root = value
            .as_object()
            .ok_or_else(|| PlanCorrupted::new("top-level value is not an object"))?;

        for section in REQUIRED_SECTIONS {
            match root.get(section) {
                Some(Value::Object(_)) => {}
                Some(_) => {
                    return Err(PlanCorrupted::new(format!("section '{}' is not an object", section)))
                }
                None => return Err(PlanCorrupted::new(format!("missing section '{}'", section))),
            }
        }

        let exercises = root["exercisePlan"]
            .get("selectedExercises")
            .and_then(Value::as_array)
            .ok_or_else(|| PlanCorrupted::new("exercisePlan.selectedExercises is not an array"))?;

        if exercises.is_empty() {
            return Err(PlanCorrupted::new("exercisePlan.selectedExercises is empty"));
        }

        for (index, exercise) in exercises.iter().enumerate() {
            let name = exercise.get("name").and_then(Value::as_str).map(str::trim);
            if name.map_or(true, str::is_empty) {
                return Err(PlanCorrupted::new(format!(
                    "exercise #{} has no name",
                    index + 1
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload() -> Value {
        json!({
            "analysis": {
                "understanding": "Patellofemoral pain",
                "likelyCauses": ["Weak quadriceps"],
                "severity": "mild",
                "prognosis": "Good"
            },
            "exercisePlan": {
                "selectedExercises": [
                    {"name": "Quad Set", "sets": "3", "reps": "10", "difficulty": "beginner", "description": "Tighten thigh"},
                    {"name": "Straight Leg Raise", "sets": 3, "reps": 12, "difficulty": "beginner", "description": "Lift leg"}
                ]
            },
            "dietRecommendations": {
                "overview": "Anti-inflammatory",
                "keyFoods": ["Turmeric"],
                "foodsToAvoid": ["Sugar"],
                "hydration": "2-3 litres"
            },
            "consultation": {
                "urgency": "routine",
                "specialists": ["Physiotherapist"],
                "redFlags": ["Swelling"],
                "followUp": "2 weeks"
            },
            "recoveryTimeline": {
                "week1": "Reduce pain",
                "week2_3": "Strengthen",
                "longTerm": "Maintain"
            }
        })
    }

    #[test]
    fn test_plain_payload() {
        let plan = ResponseNormalizer::new().normalize(&payload().to_string()).unwrap();
        let names: Vec<_> = plan
            .exercise_plan
            .selected_exercises
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, vec!["Quad Set", "Straight Leg Raise"]);
        assert_eq!(plan.exercise_plan.selected_exercises[1].sets, "3");
    }

    #[test]
    fn test_fenced_payload_matches_plain() {
        let normalizer = ResponseNormalizer::new();
        let raw = serde_json::to_string_pretty(&payload()).unwrap();
        let plain = normalizer.normalize(&raw).unwrap();

        for wrapped in [
            format!("```json\n{}\n```", raw),
            format!("```JSON\n{}\n```\n", raw),
            format!("```\n{}\n```", raw),
            format!("Here is the plan:\n```json\n{}\n```\nStay well!", raw),
            format!("Sure! {} Hope this helps.", raw),
            format!("{}\nHope this helps!", raw),
            format!("{}\n```", raw),
            format!("{}\n```\nLet me know if you need changes.", raw),
            format!("Plan below.\n\n```json\n{}\n```\n\nNotes: {{see above}}", raw),
        ] {
            assert_eq!(normalizer.normalize(&wrapped).unwrap(), plain, "input: {}", wrapped);
        }
    }

    #[test]
    fn test_backticks_inside_strings_survive() {
        let mut value = payload();
        value["exercisePlan"]["selectedExercises"][0]["description"] =
            json!("Hold for ``` three ``` seconds");
        let normalizer = ResponseNormalizer::new();

        for raw in [
            value.to_string(),
            serde_json::to_string_pretty(&value).unwrap(),
            format!("```json\n{}\n```", serde_json::to_string_pretty(&value).unwrap()),
        ] {
            let plan = normalizer.normalize(&raw).unwrap();
            assert_eq!(
                plan.exercise_plan.selected_exercises[0].description,
                "Hold for ``` three ``` seconds",
                "input: {}",
                raw
            );
        }
    }

    #[test]
    fn test_single_line_fence() {
        let raw = format!("```{}```", payload());
        assert!(ResponseNormalizer::new().normalize(&raw).is_ok());
    }

    #[test]
    fn test_missing_analysis_rejected() {
        let mut value = payload();
        value.as_object_mut().unwrap().remove("analysis");
        let err = ResponseNormalizer::new().normalize(&value.to_string()).unwrap_err();
        assert!(err.reason.contains("analysis"));
    }

    #[test]
    fn test_empty_exercises_rejected() {
        let mut value = payload();
        value["exercisePlan"]["selectedExercises"] = json!([]);
        let err = ResponseNormalizer::new().normalize(&value.to_string()).unwrap_err();
        assert!(err.reason.contains("empty"));
    }

    #[test]
    fn test_unnamed_exercise_rejected() {
        let mut value = payload();
        value["exercisePlan"]["selectedExercises"][1]["name"] = json!("  ");
        assert!(ResponseNormalizer::new().normalize(&value.to_string()).is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        let normalizer = ResponseNormalizer::new();
        assert!(normalizer.normalize("").is_err());
        assert!(normalizer.normalize("I cannot help with that.").is_err());
        assert!(normalizer.normalize("{\"analysis\": ").is_err());
        assert!(normalizer.normalize("[1, 2, 3]").is_err());
    }

    #[test]
    fn test_model_supplied_links_discarded() {
        let mut value = payload();
        value["exercisePlan"]["selectedExercises"][0]["videoUrl"] = json!("https://evil.example");
        value["exercisePlan"]["selectedExercises"][0]["equipmentName"] = json!("Gold Band");
        let plan = ResponseNormalizer::new().normalize(&value.to_string()).unwrap();
        let first = &plan.exercise_plan.selected_exercises[0];
        assert!(first.video_url.is_none());
        assert!(first.equipment_name.is_none());
    }
}
