// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Snapshot files
//!
//! A snapshot is a JSON document of previously fetched backend data. It seeds
//! the degraded-data cache and the offline in-memory backend.
//!
//! ```json
//! { "listings": [...], "users": [...], "reports": [...],
//!   "notifications": [...], "transactions": [...], "stats": {...} }
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::listing::AgentListing;
use crate::domain::revenue::Transaction;
use crate::domain::support::{AdminStats, Notification, Report, Subscription};
use crate::domain::user::User;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub listings: Vec<AgentListing>,
    pub users: Vec<User>,
    pub reports: Vec<Report>,
    pub notifications: Vec<Notification>,
    pub transactions: Vec<Transaction>,
    pub subscriptions: Vec<Subscription>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<AdminStats>,
}

impl Snapshot {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot {:?}", path))?;
        serde_json::from_str(&content).with_context(|| format!("Failed to parse snapshot {:?}", path))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).with_context(|| format!("Failed to write snapshot {:?}", path))
    }
}
