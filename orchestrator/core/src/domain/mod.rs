// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Domain
//!
//! Patient intake, plan shape, provider interface, lookup tables and
//! configuration types. No I/O lives here apart from config file loading.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer

pub mod catalog;
pub mod llm;
pub mod patient;
pub mod plan;
pub mod planner_config;
