// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Domain model for the AgentStore marketplace
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Listings, lifecycle rules, revenue, users and support records

pub mod listing;
pub mod lifecycle;
pub mod revenue;
pub mod user;
pub mod support;
pub mod events;
pub mod fetch;
pub mod session;
pub mod client_config;
pub mod repository;
