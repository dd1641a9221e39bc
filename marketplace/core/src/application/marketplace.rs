// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Consumer-facing marketplace: browse public listings and subscribe.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::application::ServiceError;
use crate::domain::events::MarketplaceEvent;
use crate::domain::fetch::Fetched;
use crate::domain::listing::{AgentListing, ListingId};
use crate::domain::support::{NewSubscription, Subscription};
use crate::infrastructure::event_bus::EventBus;
use crate::infrastructure::fallback::ResilientMarketplace;

#[derive(Debug, Clone, Default)]
pub struct BrowseQuery {
    /// Case-insensitive exact category match
    pub category: Option<String>,
    /// Case-insensitive substring of name or description
    pub search: Option<String>,
}

impl BrowseQuery {
    fn matches(&self, listing: &AgentListing) -> bool {
        let category_ok = match &self.category {
            Some(wanted) => listing
                .category
                .as_deref()
                .is_some_and(|c| c.eq_ignore_ascii_case(wanted)),
            None => true,
        };
        let search_ok = match &self.search {
            Some(term) => {
                let term = term.to_lowercase();
                listing.name.to_lowercase().contains(&term)
                    || listing.description.to_lowercase().contains(&term)
            }
            None => true,
        };
        category_ok && search_ok
    }
}

pub struct MarketplaceService {
    gateway: Arc<ResilientMarketplace>,
    event_bus: Arc<EventBus>,
    unset_status_visible: bool,
}

impl MarketplaceService {
    pub fn new(
        gateway: Arc<ResilientMarketplace>,
        event_bus: Arc<EventBus>,
        unset_status_visible: bool,
    ) -> Self {
        Self {
            gateway,
            event_bus,
            unset_status_visible,
        }
    }

    /// Whether `listing` belongs in the public catalogue
    pub fn is_listed(&self, listing: &AgentListing) -> bool {
        listing.is_publicly_visible(self.unset_status_visible) && !listing.is_pending_deletion()
    }

    pub async fn browse(&self, query: &BrowseQuery) -> Result<Fetched<Vec<AgentListing>>, ServiceError> {
        let listings = self.gateway.listings().await?;
        Ok(listings.map(|all| {
            all.into_iter()
                .filter(|l| self.is_listed(l) && query.matches(l))
                .collect()
        }))
    }

    pub async fn subscribe(
        &self,
        id: &ListingId,
        plan: Option<String>,
    ) -> Result<Subscription, ServiceError> {
        let listing = self.gateway.listing(id).await?;
        if !self.is_listed(&listing) {
            return Err(ServiceError::Validation(format!(
                "{} is not available in the marketplace",
                listing.name
            )));
        }
        if let Some(name) = &plan {
            if listing.pricing.plan(name).is_none() {
                return Err(ServiceError::Validation(format!(
                    "{} has no plan named '{}' (pricing: {})",
                    listing.name, name, listing.pricing
                )));
            }
        }

        let subscription = self
            .gateway
            .api()
            .subscribe(&NewSubscription {
                agent_id: id.clone(),
                plan,
            })
            .await?;
        info!(listing_id = %id, plan = ?subscription.plan, "Subscribed to listing");

        self.event_bus.publish(MarketplaceEvent::SubscriptionChanged {
            listing_id: id.clone(),
            user_id: subscription.user_id.clone(),
            changed_at: Utc::now(),
        });
        Ok(subscription)
    }
}
