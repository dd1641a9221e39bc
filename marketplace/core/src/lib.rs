// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! AgentStore core
//!
//! Listing lifecycle, revenue derivation and the use cases behind the
//! vendor, admin and marketplace dashboards.
//!
//! # Architecture
//!
//! - **Layer:** Core System
//! - **Purpose:** Domain model and ports, application services, and the
//!   in-process adapters (event bus, in-memory backend, degraded-data cache)

pub mod domain;
pub mod application;
pub mod infrastructure;

pub use domain::*;
