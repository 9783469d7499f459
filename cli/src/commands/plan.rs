// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! One-shot plan generation
//!
//! Reads a patient profile (YAML or JSON), runs the provider chain and
//! prints the enriched plan as JSON on stdout.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};

use physio_orchestrator_core::application::fallback_orchestrator::PlanningError;
use physio_orchestrator_core::application::recovery_plan_service::RecoveryPlanService;
use physio_orchestrator_core::domain::patient::PatientProfile;
use physio_orchestrator_core::domain::planner_config::PlannerConfigManifest;

#[derive(Args)]
pub struct PlanArgs {
    /// Patient profile file (.yaml, .yml or .json)
    #[arg(short, long, value_name = "FILE")]
    profile: PathBuf,

    /// Write the plan to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Single-line JSON output
    #[arg(long)]
    compact: bool,
}

pub async fn execute(args: PlanArgs, config: PlannerConfigManifest) -> Result<()> {
    config
        .validate()
        .context("Configuration validation failed")?;

    let profile = load_profile(&args.profile)?;
    let service = RecoveryPlanService::from_config(&config);

    let plan = match service.generate(&profile).await {
        Ok(plan) => plan,
        Err(e) => {
            report_failure(&e);
            return Err(e).context("Plan generation failed");
        }
    };

    let json = if args.compact {
        serde_json::to_string(&plan)?
    } else {
        serde_json::to_string_pretty(&plan)?
    };

    match &args.output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write plan to {:?}", path))?;
            eprintln!(
                "{}",
                format!(
                    "✓ Recovery plan with {} exercises written to {}",
                    plan.exercise_plan.selected_exercises.len(),
                    path.display()
                )
                .green()
            );
        }
        None => println!("{}", json),
    }

    Ok(())
}

/// Parse a patient profile, choosing the format by file extension
fn load_profile(path: &Path) -> Result<PatientProfile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read profile {:?}", path))?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        serde_json::from_str(&content).with_context(|| format!("Invalid JSON profile {:?}", path))
    } else {
        serde_yaml::from_str(&content).with_context(|| format!("Invalid YAML profile {:?}", path))
    }
}

fn report_failure(error: &PlanningError) {
    eprintln!("{}", error.user_message().red());

    if let PlanningError::AllProvidersExhausted { attempts } = error {
        for attempt in attempts {
            let marker = if attempt.fatal { "fatal" } else { "failed" };
            eprintln!(
                "  {} {} ({})",
                attempt.provider.bold(),
                marker.dimmed(),
                attempt.reason
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_yaml_profile() {
        let file = write_temp(
            ".yaml",
            r#"
name: Asha
age: 29
occupation: Software engineer
problemArea: Knee
symptomDescription: Pain on stairs
dietPreference: vegetarian
medicalHistory:
  highBloodPressure: true
"#,
        );
        let profile = load_profile(file.path()).unwrap();
        assert_eq!(profile.name, "Asha");
        assert_eq!(profile.symptoms, "Pain on stairs");
        assert!(profile.medical_history.high_blood_pressure);
        assert!(!profile.has_recent_surgery());
    }

    #[test]
    fn test_load_json_profile() {
        let file = write_temp(
            ".json",
            r#"{"name":"Ravi","age":52,"problemArea":"lower back","recentSurgery":"discectomy 2024"}"#,
        );
        let profile = load_profile(file.path()).unwrap();
        assert_eq!(profile.age, 52);
        assert!(profile.has_recent_surgery());
    }

    #[test]
    fn test_incomplete_profile_is_rejected() {
        let file = write_temp(".json", r#"{"name":"Ravi"}"#);
        assert!(load_profile(file.path()).is_err());
    }
}
