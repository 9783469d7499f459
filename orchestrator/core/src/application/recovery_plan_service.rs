// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Recovery plan service: the entry point used by the HTTP API and the CLI.
//!
//! Races the whole fallback chain against the overall planning deadline and
//! enriches the validated plan. When the deadline wins, the orchestration
//! future is dropped, which cancels any in-flight provider call; its result
//! can never reach the caller.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::application::enrichment::PlanEnricher;
use crate::application::fallback_orchestrator::{FallbackOrchestrator, PlanningError};
use crate::domain::patient::PatientProfile;
use crate::domain::plan::Plan;
use crate::domain::planner_config::PlannerConfigManifest;
use crate::infrastructure::llm::ProviderRegistry;

pub struct RecoveryPlanService {
    orchestrator: FallbackOrchestrator,
    enricher: PlanEnricher,
    deadline: Duration,
}

impl RecoveryPlanService {
    pub fn new(orchestrator: FallbackOrchestrator, deadline: Duration) -> Self {
        Self {
            orchestrator,
            enricher: PlanEnricher::new(),
            deadline,
        }
    }

    /// Wire the provider chain and planning options from configuration
    pub fn from_config(config: &PlannerConfigManifest) -> Arc<Self> {
        let registry = ProviderRegistry::from_config(config);
        let orchestrator =
            FallbackOrchestrator::new(registry.into_providers(), config.spec.planning.clone());
        Arc::new(Self::new(orchestrator, config.spec.planning.deadline))
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.orchestrator.provider_names()
    }

    /// Generate an enriched recovery plan for one patient
    pub async fn generate(&self, profile: &PatientProfile) -> Result<Plan, PlanningError> {
        let request_id = Uuid::new_v4();
        let span = info_span!("recovery_plan", %request_id, region = %profile.body_region());

        async {
            info!("Generating recovery plan");

            let plan = match tokio::time::timeout(self.deadline, self.orchestrator.run(profile)).await
            {
                Ok(result) => result?,
                Err(_) => {
                    warn!(deadline = ?self.deadline, "Plan generation deadline exceeded");
                    return Err(PlanningError::DeadlineExceeded(self.deadline));
                }
            };

            let plan = self.enricher.enrich(plan);
            info!(
                exercises = plan.exercise_plan.selected_exercises.len(),
                "Recovery plan ready"
            );
            Ok(plan)
        }
        .instrument(span)
        .await
    }
}
