// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Prompt Template Engine
//!
//! Renders the recovery-plan prompt from a patient profile using Handlebars.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Transform a [`PatientProfile`] into the single prompt string
//!   reused by every provider attempt
//!
//! # Supported Placeholders
//!
//! - `{{name}}`, `{{age}}`, `{{occupation}}` - Patient identity
//! - `{{problem_area}}`, `{{body_region}}` - Free-text area and its coarse region
//! - `{{symptoms}}`, `{{diet_preference}}` - Intake answers
//! - `{{#each medical_history}}` - One human-readable line per history flag
//! - `{{recent_surgery}}` - Free text, "no" when absent
//! - `{{response_schema}}` - JSON shape the model must answer with
//!
//! Escaping is disabled: the output is plain text for an LLM, not HTML.

use anyhow::{Context, Result};
use handlebars::Handlebars;
use serde::Serialize;
use tracing::warn;

use crate::domain::patient::PatientProfile;

// ============================================================================
// Template Context
// ============================================================================

/// Context data for prompt template rendering
#[derive(Debug, Clone, Serialize)]
pub struct PromptContext {
    pub name: String,
    pub age: u32,
    pub occupation: String,
    pub problem_area: String,
    pub body_region: String,
    pub symptoms: String,
    pub diet_preference: String,
    pub medical_history: Vec<String>,
    pub recent_surgery: String,
    pub has_recent_surgery: bool,
    pub response_schema: &'static str,
}

impl PromptContext {
    pub fn from_profile(profile: &PatientProfile) -> Self {
        Self {
            name: profile.name.trim().to_string(),
            age: profile.age,
            occupation: or_unspecified(&profile.occupation),
            problem_area: profile.problem_area.trim().to_string(),
            body_region: profile.body_region().to_string(),
            symptoms: or_unspecified(&profile.symptoms),
            diet_preference: or_unspecified(&profile.diet_preference),
            medical_history: profile.medical_history.describe(),
            recent_surgery: profile.recent_surgery.trim().to_string(),
            has_recent_surgery: profile.has_recent_surgery(),
            response_schema: RESPONSE_SCHEMA,
        }
    }
}

fn or_unspecified(value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        "not specified".to_string()
    } else {
        value.to_string()
    }
}

/// JSON shape requested from every provider
pub const RESPONSE_SCHEMA: &str = r#"{
  "analysis": {
    "understanding": "string",
    "likelyCauses": ["string"],
    "severity": "mild | moderate | severe",
    "prognosis": "string"
  },
  "exercisePlan": {
    "selectedExercises": [
      {
        "name": "string",
        "sets": "string",
        "reps": "string",
        "difficulty": "beginner | intermediate | advanced",
        "description": "string"
      }
    ]
  },
  "dietRecommendations": {
    "overview": "string",
    "keyFoods": ["string"],
    "foodsToAvoid": ["string"],
    "hydration": "string"
  },
  "consultation": {
    "urgency": "routine | soon | urgent",
    "specialists": ["string"],
    "redFlags": ["string"],
    "followUp": "string"
  },
  "recoveryTimeline": {
    "week1": "string",
    "week2_3": "string",
    "longTerm": "string"
  }
}"#;

pub const SYSTEM_PROMPT: &str =
    "You are an experienced physiotherapist. Reply with a single JSON object and nothing else.";

const PLAN_TEMPLATE: &str = "Create a personalised physiotherapy recovery plan for this patient.

Patient details:
- Name: {{name}}
- Age: {{age}}
- Occupation: {{occupation}}
- Problem area: {{problem_area}} (body region: {{body_region}})
- Symptoms: {{symptoms}}
- Diet preference: {{diet_preference}}

Medical history:
{{#each medical_history}}- {{this}}
{{/each}}- Recent surgery: {{#if has_recent_surgery}}{{recent_surgery}}{{else}}No{{/if}}

Guidelines:
- Choose 4 to 6 exercises that are safe for the medical history above, ordered from easiest to hardest.
- Use common exercise names (for example \"Quad Set\" or \"Glute Bridge\") and mention any equipment in the description.
- Diet advice must respect the diet preference.
- List red flags that need urgent medical attention.

Respond with valid JSON only, no markdown, matching exactly this structure:
{{response_schema}}
";

// ============================================================================
// Template Engine
// ============================================================================

pub struct PromptTemplateEngine {
    handlebars: Handlebars<'static>,
}

impl PromptTemplateEngine {
    /// Create a new template engine
    pub fn new() -> Self {
        let mut handlebars = Handlebars::new();

        handlebars.set_strict_mode(false); // Missing optional fields render empty
        handlebars.register_escape_fn(handlebars::no_escape);

        Self { handlebars }
    }

    /// Render a template with context
    pub fn render(&self, template: &str, context: &PromptContext) -> Result<String> {
        self.handlebars
            .render_template(template, context)
            .context("Failed to render prompt template")
    }

    /// Render the plan prompt, using `template` when one is configured.
    ///
    /// A custom template that fails to render is logged and replaced by the
    /// built-in one.
    pub fn render_with_fallback(
        &self,
        template: Option<&str>,
        context: &PromptContext,
    ) -> Result<String> {
        if let Some(template) = template {
            match self.render(template, context) {
                Ok(prompt) => return Ok(prompt),
                Err(e) => warn!(error = %format!("{:#}", e), "Custom prompt template failed, using built-in template"),
            }
        }
        self.render(Self::default_template(), context)
    }

    /// Render the built-in plan prompt for a patient
    pub fn render_plan_prompt(&self, profile: &PatientProfile) -> Result<String> {
        self.render(Self::default_template(), &PromptContext::from_profile(profile))
    }

    /// Get the default prompt template
    pub fn default_template() -> &'static str {
        PLAN_TEMPLATE
    }

    /// Validate template syntax without rendering
    pub fn validate_template(&self, template: &str) -> Result<()> {
        handlebars::template::Template::compile(template)
            .map(|_| ())
            .context("Invalid Handlebars template syntax")
    }
}

impl Default for PromptTemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::patient::MedicalHistory;

    fn profile() -> PatientProfile {
        PatientProfile {
            name: "Asha O'Neil".to_string(),
            age: 34,
            occupation: "Teacher".to_string(),
            problem_area: "Left knee".to_string(),
            symptoms: "Pain climbing stairs".to_string(),
            diet_preference: "vegetarian".to_string(),
            medical_history: MedicalHistory {
                diabetes: true,
                high_blood_pressure: false,
                heart_condition: false,
            },
            recent_surgery: "no".to_string(),
        }
    }

    #[test]
    fn test_plan_prompt_contains_patient_details() {
        let engine = PromptTemplateEngine::new();
        let prompt = engine.render_plan_prompt(&profile()).unwrap();

        assert!(prompt.contains("Name: Asha O'Neil"));
        assert!(prompt.contains("Problem area: Left knee (body region: knee)"));
        assert!(prompt.contains("- Diabetes: Yes"));
        assert!(prompt.contains("- High blood pressure: No"));
        assert!(prompt.contains("- Heart condition: No"));
        assert!(prompt.contains("- Recent surgery: No"));
        assert!(prompt.contains("\"selectedExercises\""));
    }

    #[test]
    fn test_plan_prompt_is_deterministic() {
        let engine = PromptTemplateEngine::new();
        let first = engine.render_plan_prompt(&profile()).unwrap();
        let second = PromptTemplateEngine::new().render_plan_prompt(&profile()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_recent_surgery_rendered() {
        let mut patient = profile();
        patient.recent_surgery = "Arthroscopy, March".to_string();
        let prompt = PromptTemplateEngine::new().render_plan_prompt(&patient).unwrap();
        assert!(prompt.contains("- Recent surgery: Arthroscopy, March"));
    }

    #[test]
    fn test_blank_fields_render_as_unspecified() {
        let mut patient = profile();
        patient.occupation = "  ".to_string();
        let prompt = PromptTemplateEngine::new().render_plan_prompt(&patient).unwrap();
        assert!(prompt.contains("Occupation: not specified"));
    }

    #[test]
    fn test_fallback_rendering() {
        let engine = PromptTemplateEngine::new();
        let context = PromptContext::from_profile(&profile());

        let result = engine
            .render_with_fallback(Some("Plan for {{name}} ({{body_region}})"), &context)
            .unwrap();
        assert_eq!(result, "Plan for Asha O'Neil (knee)");

        let result = engine.render_with_fallback(None, &context).unwrap();
        assert!(result.contains("Respond with valid JSON only"));
    }

    #[test]
    fn test_broken_custom_template_falls_back_to_builtin() {
        let engine = PromptTemplateEngine::new();
        let context = PromptContext::from_profile(&profile());

        let result = engine
            .render_with_fallback(Some("{{#if name}}unclosed"), &context)
            .unwrap();
        assert!(result.contains("- Name: Asha O'Neil"));
        assert!(result.contains("Respond with valid JSON only"));
    }

    #[test]
    fn test_validate_template() {
        let engine = PromptTemplateEngine::new();
        assert!(engine.validate_template(PromptTemplateEngine::default_template()).is_ok());
        assert!(engine.validate_template("{{name").is_err());
        assert!(engine.validate_template("{{#if name}}unclosed").is_err());
    }
}
