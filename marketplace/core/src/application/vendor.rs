// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Vendor use cases: create listings, move them through review, manage
//! visibility and deletion, and read vendor revenue.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::application::lifecycle::{ListingLifecycleService, ListingView};
use crate::application::ServiceError;
use crate::domain::events::MarketplaceEvent;
use crate::domain::fetch::Fetched;
use crate::domain::lifecycle::{Actor, LifecycleCommand};
use crate::domain::listing::{AgentListing, ListingId, NewListing};
use crate::domain::revenue::{self, RevenueReport};
use crate::infrastructure::event_bus::EventBus;
use crate::infrastructure::fallback::ResilientMarketplace;

pub struct VendorService {
    gateway: Arc<ResilientMarketplace>,
    event_bus: Arc<EventBus>,
    lifecycle: ListingLifecycleService,
    vendor_id: Option<String>,
}

impl VendorService {
    /// `vendor_id` narrows listing views to the vendor's own records when the
    /// backend returns the full catalogue.
    pub fn new(
        gateway: Arc<ResilientMarketplace>,
        event_bus: Arc<EventBus>,
        vendor_id: Option<String>,
    ) -> Self {
        let lifecycle = ListingLifecycleService::new(gateway.clone(), event_bus.clone());
        Self {
            gateway,
            event_bus,
            lifecycle,
            vendor_id,
        }
    }

    pub async fn my_listings(&self) -> Result<Fetched<Vec<ListingView>>, ServiceError> {
        let listings = self.gateway.listings().await?;
        Ok(listings.map(|all| {
            all.into_iter()
                .filter(|l| match &self.vendor_id {
                    Some(vendor) => l.is_owned_by(vendor),
                    None => true,
                })
                .map(|l| ListingView::for_actor(l, Actor::Vendor))
                .collect()
        }))
    }

    pub async fn listing(&self, id: &ListingId) -> Result<ListingView, ServiceError> {
        let listing = self.gateway.listing(id).await?;
        Ok(ListingView::for_actor(listing, Actor::Vendor))
    }

    /// Create a draft listing
    pub async fn create(&self, new: NewListing) -> Result<AgentListing, ServiceError> {
        new.validate()?;
        let created = self.gateway.api().create_listing(&new).await?;
        info!(listing_id = %created.id, name = %created.name, "Created draft listing");
        self.event_bus.publish(MarketplaceEvent::ListingCreated {
            listing_id: created.id.clone(),
            created_at: Utc::now(),
        });
        Ok(created)
    }

    pub async fn submit(&self, id: &ListingId) -> Result<Option<AgentListing>, ServiceError> {
        self.lifecycle
            .perform(Actor::Vendor, id, LifecycleCommand::SubmitForReview)
            .await
    }

    pub async fn set_url(&self, id: &ListingId, url: &str) -> Result<Option<AgentListing>, ServiceError> {
        self.lifecycle
            .perform(
                Actor::Vendor,
                id,
                LifecycleCommand::EditUrl {
                    url: url.to_string(),
                },
            )
            .await
    }

    pub async fn deactivate(&self, id: &ListingId) -> Result<Option<AgentListing>, ServiceError> {
        self.lifecycle
            .perform(Actor::Vendor, id, LifecycleCommand::Deactivate)
            .await
    }

    pub async fn reactivate(&self, id: &ListingId) -> Result<Option<AgentListing>, ServiceError> {
        self.lifecycle
            .perform(Actor::Vendor, id, LifecycleCommand::Reactivate)
            .await
    }

    pub async fn request_deletion(
        &self,
        id: &ListingId,
    ) -> Result<Option<AgentListing>, ServiceError> {
        self.lifecycle
            .perform(Actor::Vendor, id, LifecycleCommand::RequestDeletion)
            .await
    }

    pub async fn revenue(&self) -> Result<Fetched<RevenueReport>, ServiceError> {
        let transactions = self.gateway.vendor_revenue().await?;
        Ok(transactions.map(|txs| revenue::summarize(&txs)))
    }
}
