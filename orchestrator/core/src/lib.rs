// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Physio Orchestrator Core
//!
//! Generates physiotherapy recovery plans by prompting an ordered chain of
//! LLM providers, normalizing the first usable answer and enriching it with
//! exercise videos and equipment links.
//!
//! # Architecture
//!
//! - **Layer:** Core System
//! - **Flow:** `RecoveryPlanService` → `FallbackOrchestrator` → `ProviderClient`s
//!   → `ResponseNormalizer` → `PlanEnricher`

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
