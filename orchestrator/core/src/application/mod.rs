// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Application services: provider fallback, normalization, enrichment and the
//! deadline-bounded plan service that ties them together.

pub mod enrichment;
pub mod fallback_orchestrator;
pub mod normalizer;
pub mod recovery_plan_service;

pub use enrichment::PlanEnricher;
pub use fallback_orchestrator::{FallbackOrchestrator, PlanningError, ProviderFailure, ProviderOutput};
pub use normalizer::ResponseNormalizer;
pub use recovery_plan_service::RecoveryPlanService;
