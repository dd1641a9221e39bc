// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! In-memory marketplace backend
//!
//! Process-local implementation of [`MarketplaceApi`] for tests and the CLI's
//! offline mode. Lifecycle commands go through
//! [`crate::domain::lifecycle::apply`], so the same transition table guards
//! calls that bypass the application services.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::domain::lifecycle::{self, Actor, LifecycleCommand, LifecycleError, Transition};
use crate::domain::listing::{AgentListing, ListingId, NewListing, ReviewStatus};
use crate::domain::repository::{ApiError, MarketplaceApi};
use crate::domain::revenue::Transaction;
use crate::domain::support::{
    AdminStats, NewReport, NewSubscription, Notification, Report, Subscription, SupportError,
    TicketStatus,
};
use crate::domain::user::{Role, User};
use crate::infrastructure::snapshot::Snapshot;

/// Who the in-memory backend believes is calling
#[derive(Debug, Clone, Default)]
pub struct Identity {
    pub user_id: Option<String>,
    pub role: Option<Role>,
}

#[derive(Clone)]
pub struct InMemoryMarketplace {
    state: Arc<RwLock<Snapshot>>,
    identity: Identity,
}

impl InMemoryMarketplace {
    pub fn new() -> Self {
        Self::from_snapshot(Snapshot::default())
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            state: Arc::new(RwLock::new(snapshot)),
            identity: Identity::default(),
        }
    }

    /// A handle sharing the same state but calling as `identity`
    pub fn acting_as(&self, identity: Identity) -> Self {
        Self {
            state: Arc::clone(&self.state),
            identity,
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state.read().clone()
    }

    pub fn insert_listing(&self, listing: AgentListing) {
        self.state.write().listings.push(listing);
    }

    pub fn insert_user(&self, user: User) {
        self.state.write().users.push(user);
    }

    pub fn insert_report(&self, report: Report) {
        self.state.write().reports.push(report);
    }

    pub fn insert_notification(&self, notification: Notification) {
        self.state.write().notifications.push(notification);
    }

    pub fn insert_transaction(&self, transaction: Transaction) {
        self.state.write().transactions.push(transaction);
    }

    fn actor_for(&self, command: &LifecycleCommand) -> Result<Actor, ApiError> {
        match self.identity.role {
            None => Ok(command.action().actor()),
            Some(role) => Actor::from_role(role).ok_or_else(|| ApiError::Rejected {
                status: 403,
                message: format!("role '{role}' cannot manage listings"),
            }),
        }
    }
}

impl Default for InMemoryMarketplace {
    fn default() -> Self {
        Self::new()
    }
}

fn lifecycle_rejection(err: LifecycleError) -> ApiError {
    let status = match &err {
        LifecycleError::Forbidden { .. } => 403,
        LifecycleError::NotAllowed { .. } | LifecycleError::DeletionPending(_) => 409,
        LifecycleError::MissingReason(_) | LifecycleError::Listing(_) => 400,
    };
    ApiError::Rejected {
        status,
        message: err.to_string(),
    }
}

fn support_rejection(err: SupportError) -> ApiError {
    let status = match &err {
        SupportError::EmptyField(_) => 400,
        SupportError::AlreadyResolved(_) => 409,
    };
    ApiError::Rejected {
        status,
        message: err.to_string(),
    }
}

#[async_trait]
impl MarketplaceApi for InMemoryMarketplace {
    async fn list_listings(&self) -> Result<Vec<AgentListing>, ApiError> {
        Ok(self.state.read().listings.clone())
    }

    async fn get_listing(&self, id: &ListingId) -> Result<AgentListing, ApiError> {
        self.state
            .read()
            .listings
            .iter()
            .find(|l| &l.id == id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("agent {id}")))
    }

    async fn create_listing(&self, listing: &NewListing) -> Result<AgentListing, ApiError> {
        let created = AgentListing::draft(listing.clone(), self.identity.user_id.clone()).map_err(|e| {
            ApiError::Rejected {
                status: 400,
                message: e.to_string(),
            }
        })?;
        self.state.write().listings.push(created.clone());
        debug!(listing_id = %created.id, "Created listing");
        Ok(created)
    }

    async fn execute(&self, id: &ListingId, command: &LifecycleCommand) -> Result<(), ApiError> {
        let actor = self.actor_for(command)?;
        let mut state = self.state.write();
        let index = state
            .listings
            .iter()
            .position(|l| &l.id == id)
            .ok_or_else(|| ApiError::NotFound(format!("agent {id}")))?;

        let current = state.listings[index].clone();
        if actor == Actor::Vendor {
            if let (Some(owner), Some(caller)) = (&current.vendor_id, &self.identity.user_id) {
                if owner != caller {
                    return Err(ApiError::Rejected {
                        status: 403,
                        message: "cannot modify an agent owned by another vendor".to_string(),
                    });
                }
            }
        }

        match lifecycle::apply(current, actor, command.clone()).map_err(lifecycle_rejection)? {
            Transition::Updated(listing) => state.listings[index] = listing,
            Transition::Removed(_) => {
                state.listings.remove(index);
                for user in state.users.iter_mut() {
                    user.subscribed_agents.retain(|agent| agent != id);
                }
            }
        }
        debug!(listing_id = %id, action = %command.action(), "Applied lifecycle command");
        Ok(())
    }

    async fn subscribe(&self, subscription: &NewSubscription) -> Result<Subscription, ApiError> {
        let mut state = self.state.write();
        let listing = state
            .listings
            .iter_mut()
            .find(|l| l.id == subscription.agent_id)
            .ok_or_else(|| ApiError::NotFound(format!("agent {}", subscription.agent_id)))?;

        if !listing.is_publicly_visible(true) || listing.is_pending_deletion() {
            return Err(ApiError::Rejected {
                status: 409,
                message: format!("agent {} is not available for subscription", listing.id),
            });
        }

        let plan = match &subscription.plan {
            Some(name) => Some(listing.pricing.plan(name).cloned().ok_or_else(|| ApiError::Rejected {
                status: 400,
                message: format!("agent {} has no plan named '{}'", listing.id, name),
            })?),
            None => listing.pricing.primary_plan().cloned(),
        };

        listing.usage_count += 1;
        let vendor_id = listing.vendor_id.clone();
        let agent_name = listing.name.clone();
        let now = Utc::now();

        let record = Subscription {
            id: Uuid::new_v4().to_string(),
            agent_id: subscription.agent_id.clone(),
            user_id: self.identity.user_id.clone(),
            plan: plan.as_ref().map(|p| p.name.clone()),
            created_at: Some(now),
        };

        if let Some(plan) = plan.filter(|p| p.price > 0.0) {
            state.transactions.push(Transaction {
                id: Uuid::new_v4().to_string(),
                agent_id: subscription.agent_id.clone(),
                agent_name: Some(agent_name),
                user_id: self.identity.user_id.clone(),
                vendor_id,
                amount: plan.price,
                currency: plan.currency.clone(),
                created_at: Some(now),
            });
        }

        if let Some(user_id) = &self.identity.user_id {
            if let Some(user) = state.users.iter_mut().find(|u| &u.id == user_id) {
                if !user.is_subscribed_to(&subscription.agent_id) {
                    user.subscribed_agents.push(subscription.agent_id.clone());
                }
            }
        }

        state.subscriptions.push(record.clone());
        Ok(record)
    }

    async fn admin_stats(&self) -> Result<AdminStats, ApiError> {
        let state = self.state.read();
        let count_role = |role: Role| state.users.iter().filter(|u| u.role == role).count() as u64;
        Ok(AdminStats {
            total_users: count_role(Role::User),
            total_vendors: count_role(Role::Vendor),
            total_agents: state.listings.len() as u64,
            pending_reviews: state
                .listings
                .iter()
                .filter(|l| l.review_status == ReviewStatus::PendingReview)
                .count() as u64,
            pending_deletions: state.listings.iter().filter(|l| l.is_pending_deletion()).count() as u64,
            total_revenue: state.transactions.iter().map(|t| t.amount).sum(),
        })
    }

    async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        Ok(self.state.read().users.clone())
    }

    async fn set_user_blocked(&self, user_id: &str, blocked: bool) -> Result<(), ApiError> {
        let mut state = self.state.write();
        let user = state
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| ApiError::NotFound(format!("user {user_id}")))?;
        user.is_blocked = blocked;
        Ok(())
    }

    async fn admin_revenue(&self) -> Result<Vec<Transaction>, ApiError> {
        Ok(self.state.read().transactions.clone())
    }

    async fn vendor_revenue(&self) -> Result<Vec<Transaction>, ApiError> {
        let state = self.state.read();
        Ok(match &self.identity.user_id {
            Some(vendor) => state
                .transactions
                .iter()
                .filter(|t| t.vendor_id.as_deref() == Some(vendor.as_str()))
                .cloned()
                .collect(),
            None => state.transactions.clone(),
        })
    }

    async fn list_reports(&self) -> Result<Vec<Report>, ApiError> {
        Ok(self.state.read().reports.clone())
    }

    async fn create_report(&self, report: &NewReport) -> Result<Report, ApiError> {
        report.validate().map_err(support_rejection)?;
        let created = Report {
            id: Uuid::new_v4().to_string(),
            subject: report.subject.trim().to_string(),
            description: report.description.trim().to_string(),
            reporter_id: self.identity.user_id.clone(),
            agent_id: report.agent_id.clone(),
            status: TicketStatus::Open,
            resolution_note: None,
            created_at: Some(Utc::now()),
        };
        self.state.write().reports.push(created.clone());
        Ok(created)
    }

    async fn resolve_report(&self, report_id: &str, note: &str) -> Result<(), ApiError> {
        let mut state = self.state.write();
        let report = state
            .reports
            .iter_mut()
            .find(|r| r.id == report_id)
            .ok_or_else(|| ApiError::NotFound(format!("report {report_id}")))?;
        report.resolve(note).map_err(support_rejection)
    }

    async fn list_notifications(&self) -> Result<Vec<Notification>, ApiError> {
        Ok(self.state.read().notifications.clone())
    }

    async fn mark_notification_read(&self, notification_id: &str) -> Result<(), ApiError> {
        let mut state = self.state.write();
        let notification = state
            .notifications
            .iter_mut()
            .find(|n| n.id == notification_id)
            .ok_or_else(|| ApiError::NotFound(format!("notification {notification_id}")))?;
        notification.read = true;
        Ok(())
    }
}
