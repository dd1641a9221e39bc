// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::lifecycle::LifecycleAction;
use crate::domain::listing::ListingId;

/// Events published after a mutation succeeds on the backend.
///
/// Views subscribe to these to know when to re-fetch; the events carry ids
/// only, never the new state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MarketplaceEvent {
    ListingCreated {
        listing_id: ListingId,
        created_at: DateTime<Utc>,
    },
    ListingChanged {
        listing_id: ListingId,
        action: LifecycleAction,
        changed_at: DateTime<Utc>,
    },
    ListingRemoved {
        listing_id: ListingId,
        removed_at: DateTime<Utc>,
    },
    SubscriptionChanged {
        listing_id: ListingId,
        user_id: Option<String>,
        changed_at: DateTime<Utc>,
    },
    UserBlockChanged {
        user_id: String,
        blocked: bool,
        changed_at: DateTime<Utc>,
    },
    ReportCreated {
        report_id: String,
        created_at: DateTime<Utc>,
    },
    ReportResolved {
        report_id: String,
        resolved_at: DateTime<Utc>,
    },
    NotificationRead {
        notification_id: String,
        read_at: DateTime<Utc>,
    },
}

impl MarketplaceEvent {
    /// The listing this event concerns, if any
    pub fn listing_id(&self) -> Option<&ListingId> {
        match self {
            Self::ListingCreated { listing_id, .. }
            | Self::ListingChanged { listing_id, .. }
            | Self::ListingRemoved { listing_id, .. }
            | Self::SubscriptionChanged { listing_id, .. } => Some(listing_id),
            Self::UserBlockChanged { .. }
            | Self::ReportCreated { .. }
            | Self::ReportResolved { .. }
            | Self::NotificationRead { .. } => None,
        }
    }
}
