// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Presentation Layer
//!
//! HTTP surface that translates requests into application service calls.
//! No business logic lives here; all work is delegated to
//! [`crate::application::recovery_plan_service`].
//!
//! | Route | Method | Description |
//! |-------|--------|-------------|
//! | `/health` | GET | Liveness plus the configured provider order |
//! | `/v1/recovery-plans` | POST | Patient profile in, enriched plan out |

pub mod api;
