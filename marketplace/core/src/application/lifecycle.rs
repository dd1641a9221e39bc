// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Listing Lifecycle Service
//!
//! Application service that drives one lifecycle action end to end.
//!
//! # Flow
//!
//! 1. Validate the command payload (empty reasons and bad URLs never reach the backend)
//! 2. Fetch the current listing and guard the action with the transition table
//! 3. Send the single backend call
//! 4. Publish `ListingChanged` or `ListingRemoved`
//! 5. Re-fetch, since the backend owns the resulting state
//!
//! A failed call leaves nothing to roll back because no local state is changed.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use crate::application::ServiceError;
use crate::domain::events::MarketplaceEvent;
use crate::domain::lifecycle::{self, Actor, LifecycleAction, LifecycleCommand};
use crate::domain::listing::{AgentListing, ListingId};
use crate::domain::revenue::Money;
use crate::infrastructure::event_bus::EventBus;
use crate::infrastructure::fallback::ResilientMarketplace;

/// A listing as a dashboard row: the record plus what the viewer may do with it
#[derive(Debug, Clone, Serialize)]
pub struct ListingView {
    pub listing: AgentListing,
    pub actions: BTreeSet<LifecycleAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_revenue: Option<Money>,
}

impl ListingView {
    pub fn for_actor(listing: AgentListing, actor: Actor) -> Self {
        let actions = lifecycle::actions_for(actor, &listing);
        let estimated_revenue = listing.estimated_revenue();
        Self {
            listing,
            actions,
            estimated_revenue,
        }
    }
}

pub struct ListingLifecycleService {
    gateway: Arc<ResilientMarketplace>,
    event_bus: Arc<EventBus>,
}

impl ListingLifecycleService {
    pub fn new(gateway: Arc<ResilientMarketplace>, event_bus: Arc<EventBus>) -> Self {
        Self { gateway, event_bus }
    }

    /// Perform `command` on listing `id` as `actor`.
    ///
    /// Returns the re-fetched listing, or `None` when the listing was removed.
    pub async fn perform(
        &self,
        actor: Actor,
        id: &ListingId,
        command: LifecycleCommand,
    ) -> Result<Option<AgentListing>, ServiceError> {
        let action = command.action();
        command.validate()?;

        let current = self.gateway.listing(id).await?;
        lifecycle::check(actor, action, &current)?;

        if let Err(e) = self.gateway.api().execute(id, &command).await {
            warn!(listing_id = %id, %action, "Lifecycle action failed: {}", e);
            return Err(e.into());
        }
        info!(listing_id = %id, %action, %actor, "Lifecycle action applied");

        if action == LifecycleAction::ApproveDeletion {
            self.event_bus.publish(MarketplaceEvent::ListingRemoved {
                listing_id: id.clone(),
                removed_at: Utc::now(),
            });
            return Ok(None);
        }

        self.event_bus.publish(MarketplaceEvent::ListingChanged {
            listing_id: id.clone(),
            action,
            changed_at: Utc::now(),
        });

        Ok(Some(self.gateway.listing(id).await?))
    }
}
