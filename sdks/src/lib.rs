// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! AgentStore Rust SDK
//!
//! A typed client for the AgentStore marketplace REST API. [`MarketplaceClient`]
//! implements the [`MarketplaceApi`](agentstore_core::domain::repository::MarketplaceApi)
//! port, so it plugs straight into the core application services.

pub mod client;
pub mod types;

pub use client::MarketplaceClient;
pub use types::*;
