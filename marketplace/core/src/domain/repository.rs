// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Backend Port
//!
//! The marketplace backend is owned by another service; this crate only sees
//! it through [`MarketplaceApi`]. Implementations:
//!
//! | Implementation | Crate | Use |
//! |----------------|-------|-----|
//! | `MarketplaceClient` | `agentstore-sdk` | REST over HTTPS |
//! | `InMemoryMarketplace` | `crate::infrastructure::in_memory` | tests, `--offline` demo |
//!
//! Reads return the backend's current view; mutations return nothing and the
//! caller re-fetches, since the backend is the sole source of truth for state.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::lifecycle::LifecycleCommand;
use crate::domain::listing::{AgentListing, ListingId, NewListing};
use crate::domain::revenue::Transaction;
use crate::domain::support::{AdminStats, NewReport, NewSubscription, Notification, Report, Subscription};
use crate::domain::user::User;

#[async_trait]
pub trait MarketplaceApi: Send + Sync {
    // --- Listings ---

    async fn list_listings(&self) -> Result<Vec<AgentListing>, ApiError>;

    async fn get_listing(&self, id: &ListingId) -> Result<AgentListing, ApiError>;

    async fn create_listing(&self, listing: &NewListing) -> Result<AgentListing, ApiError>;

    /// Perform one lifecycle action. Each command maps to a single endpoint.
    async fn execute(&self, id: &ListingId, command: &LifecycleCommand) -> Result<(), ApiError>;

    async fn subscribe(&self, subscription: &NewSubscription) -> Result<Subscription, ApiError>;

    // --- Admin ---

    async fn admin_stats(&self) -> Result<AdminStats, ApiError>;

    async fn list_users(&self) -> Result<Vec<User>, ApiError>;

    async fn set_user_blocked(&self, user_id: &str, blocked: bool) -> Result<(), ApiError>;

    // --- Revenue ---

    async fn admin_revenue(&self) -> Result<Vec<Transaction>, ApiError>;

    async fn vendor_revenue(&self) -> Result<Vec<Transaction>, ApiError>;

    // --- Support ---

    async fn list_reports(&self) -> Result<Vec<Report>, ApiError>;

    async fn create_report(&self, report: &NewReport) -> Result<Report, ApiError>;

    async fn resolve_report(&self, report_id: &str, note: &str) -> Result<(), ApiError>;

    async fn list_notifications(&self) -> Result<Vec<Notification>, ApiError>;

    async fn mark_notification_read(&self, notification_id: &str) -> Result<(), ApiError>;
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("Session expired or missing; log in again")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Backend rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Failed to decode backend response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Failures where the backend was unreachable or unhealthy, as opposed to
    /// a definite answer. Only these are eligible for degraded fallbacks.
    pub fn is_unavailable(&self) -> bool {
        match self {
            Self::Timeout | Self::Network(_) => true,
            Self::Rejected { status, .. } => *status >= 500,
            Self::Unauthorized | Self::NotFound(_) | Self::Decode(_) => false,
        }
    }
}
