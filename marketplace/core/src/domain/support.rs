// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Support tickets, notifications and subscription records
//!
//! These are append-only records held by the backend. Reports move
//! `open → resolved` and notifications `unread → read`; nothing else changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::listing::ListingId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    #[default]
    #[serde(alias = "Open", alias = "pending")]
    Open,
    #[serde(alias = "Resolved", alias = "closed")]
    Resolved,
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Open => "open",
            Self::Resolved => "resolved",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    #[serde(alias = "_id")]
    pub id: String,
    pub subject: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub reporter_id: Option<String>,
    #[serde(default)]
    pub agent_id: Option<ListingId>,
    #[serde(default)]
    pub status: TicketStatus,
    #[serde(default)]
    pub resolution_note: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Report {
    pub fn is_open(&self) -> bool {
        self.status == TicketStatus::Open
    }

    pub fn resolve(&mut self, note: &str) -> Result<(), SupportError> {
        validate_resolution_note(note)?;
        if !self.is_open() {
            return Err(SupportError::AlreadyResolved(self.id.clone()));
        }
        self.status = TicketStatus::Resolved;
        self.resolution_note = Some(note.trim().to_string());
        Ok(())
    }
}

pub fn validate_resolution_note(note: &str) -> Result<(), SupportError> {
    if note.trim().is_empty() {
        return Err(SupportError::EmptyField("resolution note"));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReport {
    pub subject: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<ListingId>,
}

impl NewReport {
    pub fn validate(&self) -> Result<(), SupportError> {
        if self.subject.trim().is_empty() {
            return Err(SupportError::EmptyField("subject"));
        }
        if self.description.trim().is_empty() {
            return Err(SupportError::EmptyField("description"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, alias = "isRead")]
    pub read: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A purchase/subscription record created when a user subscribes to an agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    #[serde(alias = "_id")]
    pub id: String,
    pub agent_id: ListingId,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub plan: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubscription {
    pub agent_id: ListingId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
}

/// Platform-wide counters shown on the admin dashboard
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdminStats {
    pub total_users: u64,
    pub total_vendors: u64,
    pub total_agents: u64,
    pub pending_reviews: u64,
    pub pending_deletions: u64,
    pub total_revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SupportError {
    #[error("The {0} cannot be empty")]
    EmptyField(&'static str),

    #[error("Report {0} is already resolved")]
    AlreadyResolved(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_report() -> Report {
        serde_json::from_str(r#"{"_id":"r1","subject":"Broken link","status":"open"}"#).unwrap()
    }

    #[test]
    fn test_resolve_once() {
        let mut report = open_report();
        report.resolve(" refunded ").unwrap();
        assert_eq!(report.status, TicketStatus::Resolved);
        assert_eq!(report.resolution_note.as_deref(), Some("refunded"));

        assert_eq!(
            report.resolve("again"),
            Err(SupportError::AlreadyResolved("r1".to_string()))
        );
    }

    #[test]
    fn test_resolution_note_required() {
        let mut report = open_report();
        assert_eq!(report.resolve("  "), Err(SupportError::EmptyField("resolution note")));
        assert!(report.is_open());
    }

    #[test]
    fn test_new_report_validation() {
        let report = NewReport {
            subject: "Spam".to_string(),
            description: String::new(),
            agent_id: None,
        };
        assert_eq!(report.validate(), Err(SupportError::EmptyField("description")));
    }

    #[test]
    fn test_notification_read_alias() {
        let n: Notification = serde_json::from_str(r#"{"id":"n1","isRead":true}"#).unwrap();
        assert!(n.read);
    }
}
