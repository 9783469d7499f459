// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the physio CLI

pub mod config;
pub mod plan;
pub mod serve;

pub use self::config::ConfigCommand;
pub use self::plan::PlanArgs;
pub use self::serve::ServeArgs;
