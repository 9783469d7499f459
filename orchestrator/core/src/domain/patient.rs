// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Patient
//!
//! Intake data for a single plan request. Lives only for the duration of that
//! request and is never persisted.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Patient intake, immutable while a plan is being generated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientProfile {
    pub name: String,

    pub age: u32,

    #[serde(default)]
    pub occupation: String,

    /// Free text, e.g. "left knee" or "lower back pain"
    pub problem_area: String,

    #[serde(default, alias = "symptomDescription")]
    pub symptoms: String,

    /// e.g. "vegetarian", "non-vegetarian", "vegan"
    #[serde(default)]
    pub diet_preference: String,

    #[serde(default)]
    pub medical_history: MedicalHistory,

    /// Free text or "no"
    #[serde(default = "default_recent_surgery")]
    pub recent_surgery: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalHistory {
    #[serde(default)]
    pub diabetes: bool,

    #[serde(default)]
    pub high_blood_pressure: bool,

    #[serde(default)]
    pub heart_condition: bool,
}

impl MedicalHistory {
    /// Human-readable flag lines, always all three in a fixed order
    pub fn describe(&self) -> Vec<String> {
        vec![
            format!("Diabetes: {}", yes_no(self.diabetes)),
            format!("High blood pressure: {}", yes_no(self.high_blood_pressure)),
            format!("Heart condition: {}", yes_no(self.heart_condition)),
        ]
    }
}

impl PatientProfile {
    pub fn has_recent_surgery(&self) -> bool {
        let surgery = self.recent_surgery.trim();
        !(surgery.is_empty()
            || surgery.eq_ignore_ascii_case("no")
            || surgery.eq_ignore_ascii_case("none"))
    }

    pub fn body_region(&self) -> BodyRegion {
        BodyRegion::from_problem_area(&self.problem_area)
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

fn default_recent_surgery() -> String {
    "no".to_string()
}

/// Coarse body region derived from the free-text problem area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyRegion {
    Neck,
    Shoulder,
    UpperBack,
    LowerBack,
    Elbow,
    Wrist,
    Hip,
    Knee,
    Ankle,
    General,
}

// Ordered: multi-word aliases sit ahead of the single words they contain.
// Aliases match whole words only.
const REGION_ALIASES: &[(&str, BodyRegion)] = &[
    ("lower back", BodyRegion::LowerBack),
    ("lumbar", BodyRegion::LowerBack),
    ("sciatica", BodyRegion::LowerBack),
    ("upper back", BodyRegion::UpperBack),
    ("thoracic", BodyRegion::UpperBack),
    ("cervical", BodyRegion::Neck),
    ("neck", BodyRegion::Neck),
    ("rotator cuff", BodyRegion::Shoulder),
    ("frozen shoulder", BodyRegion::Shoulder),
    ("shoulder", BodyRegion::Shoulder),
    ("tennis elbow", BodyRegion::Elbow),
    ("elbow", BodyRegion::Elbow),
    ("carpal", BodyRegion::Wrist),
    ("wrist", BodyRegion::Wrist),
    ("hand", BodyRegion::Wrist),
    ("hip", BodyRegion::Hip),
    ("groin", BodyRegion::Hip),
    ("acl", BodyRegion::Knee),
    ("meniscus", BodyRegion::Knee),
    ("menisci", BodyRegion::Knee),
    ("knee", BodyRegion::Knee),
    ("ankle", BodyRegion::Ankle),
    ("achilles", BodyRegion::Ankle),
    ("foot", BodyRegion::Ankle),
    ("feet", BodyRegion::Ankle),
    ("heel", BodyRegion::Ankle),
    ("back", BodyRegion::LowerBack),
    ("spine", BodyRegion::LowerBack),
];

impl BodyRegion {
    pub fn from_problem_area(problem_area: &str) -> Self {
        let text = problem_area.to_lowercase();
        let words: Vec<&str> = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|word| !word.is_empty())
            .collect();

        REGION_ALIASES
            .iter()
            .find(|(alias, _)| contains_phrase(&words, alias))
            .map(|(_, region)| *region)
            .unwrap_or(BodyRegion::General)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BodyRegion::Neck => "neck",
            BodyRegion::Shoulder => "shoulder",
            BodyRegion::UpperBack => "upper_back",
            BodyRegion::LowerBack => "lower_back",
            BodyRegion::Elbow => "elbow",
            BodyRegion::Wrist => "wrist",
            BodyRegion::Hip => "hip",
            BodyRegion::Knee => "knee",
            BodyRegion::Ankle => "ankle",
            BodyRegion::General => "general",
        }
    }
}

/// True when the words of `phrase` appear consecutively in `words`
fn contains_phrase(words: &[&str], phrase: &str) -> bool {
    let phrase: Vec<&str> = phrase.split(' ').collect();
    words.windows(phrase.len()).any(|window| {
        window
            .iter()
            .zip(&phrase)
            .all(|(word, alias)| same_word(word, alias))
    })
}

/// Exact match, or the alias with a plural ending ("knees", "hips")
fn same_word(word: &str, alias: &str) -> bool {
    word.strip_prefix(alias)
        .is_some_and(|rest| matches!(rest, "" | "s" | "es"))
}

impl fmt::Display for BodyRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_aliases() {
        assert_eq!(BodyRegion::from_problem_area("Left KNEE"), BodyRegion::Knee);
        assert_eq!(BodyRegion::from_problem_area("lower back pain"), BodyRegion::LowerBack);
        assert_eq!(BodyRegion::from_problem_area("upper back stiffness"), BodyRegion::UpperBack);
        assert_eq!(BodyRegion::from_problem_area("torn ACL"), BodyRegion::Knee);
        assert_eq!(BodyRegion::from_problem_area("dizziness"), BodyRegion::General);
    }

    #[test]
    fn test_region_aliases_match_whole_words() {
        assert_eq!(BodyRegion::from_problem_area("relationship stress"), BodyRegion::General);
        assert_eq!(BodyRegion::from_problem_area("pain when handling boxes"), BodyRegion::General);
        assert_eq!(BodyRegion::from_problem_area("backache after a facial"), BodyRegion::General);
        assert_eq!(BodyRegion::from_problem_area("torn ACL, left side"), BodyRegion::Knee);
        assert_eq!(BodyRegion::from_problem_area("both hips"), BodyRegion::Hip);
        assert_eq!(BodyRegion::from_problem_area("sore feet"), BodyRegion::Ankle);
        assert_eq!(BodyRegion::from_problem_area("right hand/wrist"), BodyRegion::Wrist);
        assert_eq!(BodyRegion::from_problem_area("Lower-back"), BodyRegion::LowerBack);
        assert_eq!(BodyRegion::from_problem_area("torn meniscus"), BodyRegion::Knee);
    }

    #[test]
    fn test_recent_surgery() {
        let mut profile: PatientProfile = serde_json::from_value(serde_json::json!({
            "name": "Asha",
            "age": 34,
            "problemArea": "knee"
        }))
        .unwrap();
        assert_eq!(profile.recent_surgery, "no");
        assert!(!profile.has_recent_surgery());

        profile.recent_surgery = "ACL reconstruction, 6 weeks ago".to_string();
        assert!(profile.has_recent_surgery());
    }

    #[test]
    fn test_describe_history() {
        let history = MedicalHistory {
            diabetes: true,
            high_blood_pressure: false,
            heart_condition: true,
        };
        assert_eq!(
            history.describe(),
            vec![
                "Diabetes: Yes".to_string(),
                "High blood pressure: No".to_string(),
                "Heart condition: Yes".to_string(),
            ]
        );
    }
}
