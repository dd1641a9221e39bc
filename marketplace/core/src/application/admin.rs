// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Admin use cases: the approvals queue, deletion decisions, user blocking,
//! platform statistics and financials.

use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::application::lifecycle::{ListingLifecycleService, ListingView};
use crate::application::ServiceError;
use crate::domain::events::MarketplaceEvent;
use crate::domain::fetch::Fetched;
use crate::domain::lifecycle::{Actor, LifecycleCommand};
use crate::domain::listing::{AgentListing, ListingId, ReviewStatus};
use crate::domain::revenue::{self, RevenueReport};
use crate::domain::support::AdminStats;
use crate::domain::user::{User, UserStatus};
use crate::infrastructure::event_bus::EventBus;
use crate::infrastructure::fallback::ResilientMarketplace;

/// Approvals queue filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReviewFilter {
    #[default]
    Pending,
    Approved,
    Rejected,
    All,
}

impl ReviewFilter {
    pub fn matches(self, listing: &AgentListing) -> bool {
        match self {
            Self::Pending => listing.review_status == ReviewStatus::PendingReview,
            Self::Approved => listing.review_status == ReviewStatus::Approved,
            Self::Rejected => listing.review_status == ReviewStatus::Rejected,
            Self::All => true,
        }
    }
}

impl FromStr for ReviewFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "all" => Ok(Self::All),
            other => Err(format!(
                "unknown filter '{other}' (expected pending, approved, rejected or all)"
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub user: User,
    pub status: UserStatus,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        let status = user.display_status();
        Self { user, status }
    }
}

pub struct AdminService {
    gateway: Arc<ResilientMarketplace>,
    event_bus: Arc<EventBus>,
    lifecycle: ListingLifecycleService,
}

impl AdminService {
    pub fn new(gateway: Arc<ResilientMarketplace>, event_bus: Arc<EventBus>) -> Self {
        let lifecycle = ListingLifecycleService::new(gateway.clone(), event_bus.clone());
        Self {
            gateway,
            event_bus,
            lifecycle,
        }
    }

    pub async fn approvals(
        &self,
        filter: ReviewFilter,
    ) -> Result<Fetched<Vec<ListingView>>, ServiceError> {
        let listings = self.gateway.listings().await?;
        Ok(listings.map(|all| {
            all.into_iter()
                .filter(|l| filter.matches(l))
                .map(|l| ListingView::for_actor(l, Actor::Admin))
                .collect()
        }))
    }

    pub async fn approve(
        &self,
        id: &ListingId,
        message: Option<String>,
    ) -> Result<Option<AgentListing>, ServiceError> {
        self.lifecycle
            .perform(Actor::Admin, id, LifecycleCommand::Approve { message })
            .await
    }

    pub async fn reject(&self, id: &ListingId, reason: &str) -> Result<Option<AgentListing>, ServiceError> {
        self.lifecycle
            .perform(
                Actor::Admin,
                id,
                LifecycleCommand::Reject {
                    reason: reason.to_string(),
                },
            )
            .await
    }

    pub async fn force_live(&self, id: &ListingId) -> Result<Option<AgentListing>, ServiceError> {
        self.lifecycle
            .perform(Actor::Admin, id, LifecycleCommand::ForceLive)
            .await
    }

    pub async fn deletion_requests(&self) -> Result<Fetched<Vec<ListingView>>, ServiceError> {
        let listings = self.gateway.listings().await?;
        Ok(listings.map(|all| {
            all.into_iter()
                .filter(AgentListing::is_pending_deletion)
                .map(|l| ListingView::for_actor(l, Actor::Admin))
                .collect()
        }))
    }

    /// Removes the listing permanently
    pub async fn approve_deletion(&self, id: &ListingId) -> Result<(), ServiceError> {
        self.lifecycle
            .perform(Actor::Admin, id, LifecycleCommand::ApproveDeletion)
            .await?;
        Ok(())
    }

    pub async fn reject_deletion(
        &self,
        id: &ListingId,
        reason: &str,
    ) -> Result<Option<AgentListing>, ServiceError> {
        self.lifecycle
            .perform(
                Actor::Admin,
                id,
                LifecycleCommand::RejectDeletion {
                    reason: reason.to_string(),
                },
            )
            .await
    }

    pub async fn users(&self) -> Result<Fetched<Vec<UserView>>, ServiceError> {
        let users = self.gateway.users().await?;
        Ok(users.map(|all| all.into_iter().map(UserView::from).collect()))
    }

    /// Block or unblock a user and return the re-fetched record
    pub async fn set_blocked(&self, user_id: &str, blocked: bool) -> Result<UserView, ServiceError> {
        self.gateway.api().set_user_blocked(user_id, blocked).await?;
        info!(user_id, blocked, "Updated user block flag");
        self.event_bus.publish(MarketplaceEvent::UserBlockChanged {
            user_id: user_id.to_string(),
            blocked,
            changed_at: Utc::now(),
        });

        let users = self.gateway.api().list_users().await?;
        users
            .into_iter()
            .find(|u| u.id == user_id)
            .map(UserView::from)
            .ok_or_else(|| ServiceError::Validation(format!("user {user_id} disappeared after update")))
    }

    pub async fn stats(&self) -> Result<Fetched<AdminStats>, ServiceError> {
        Ok(self.gateway.admin_stats().await?)
    }

    pub async fn financials(&self) -> Result<Fetched<RevenueReport>, ServiceError> {
        let transactions = self.gateway.admin_revenue().await?;
        Ok(transactions.map(|txs| revenue::summarize(&txs)))
    }
}
