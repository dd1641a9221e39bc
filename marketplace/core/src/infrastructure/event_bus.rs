// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Event Bus Implementation - Pub/Sub for Marketplace Events
//
// Provides in-memory event streaming using tokio broadcast channels.
// Services publish after each successful mutation; views subscribe to learn
// when to re-fetch instead of polling a shared flag.

use crate::domain::events::MarketplaceEvent;
use crate::domain::listing::ListingId;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Event bus for publishing and subscribing to marketplace events
#[derive(Clone)]
pub struct EventBus {
    sender: Arc<broadcast::Sender<MarketplaceEvent>>,
}

impl EventBus {
    /// Create a new event bus with specified channel capacity.
    /// Once `capacity` events are buffered the oldest are dropped for slow receivers.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Create event bus with default capacity (256)
    pub fn with_default_capacity() -> Self {
        Self::new(256)
    }

    /// Publish an event to all subscribers
    pub fn publish(&self, event: MarketplaceEvent) {
        debug!("Publishing event: {:?}", event);

        // send() fails only when nobody is subscribed
        let receiver_count = self.sender.send(event).unwrap_or(0);

        if receiver_count == 0 {
            debug!("No subscribers listening to event");
        }
    }

    /// Subscribe to all marketplace events
    pub fn subscribe(&self) -> EventReceiver {
        EventReceiver {
            receiver: self.sender.subscribe(),
        }
    }

    /// Subscribe to events concerning a single listing
    pub fn subscribe_listing(&self, listing_id: ListingId) -> ListingEventReceiver {
        ListingEventReceiver {
            receiver: self.sender.subscribe(),
            listing_id,
        }
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

fn map_recv_error(e: broadcast::error::RecvError) -> EventBusError {
    match e {
        broadcast::error::RecvError::Closed => EventBusError::Closed,
        broadcast::error::RecvError::Lagged(n) => {
            warn!("Event receiver lagged by {} events", n);
            EventBusError::Lagged(n)
        }
    }
}

/// Receiver for all marketplace events
pub struct EventReceiver {
    receiver: broadcast::Receiver<MarketplaceEvent>,
}

impl EventReceiver {
    /// Receive the next event (waits until one is available)
    pub async fn recv(&mut self) -> Result<MarketplaceEvent, EventBusError> {
        self.receiver.recv().await.map_err(map_recv_error)
    }

    /// Try to receive an event without waiting
    pub fn try_recv(&mut self) -> Result<MarketplaceEvent, EventBusError> {
        self.receiver.try_recv().map_err(|e| match e {
            broadcast::error::TryRecvError::Empty => EventBusError::Empty,
            broadcast::error::TryRecvError::Closed => EventBusError::Closed,
            broadcast::error::TryRecvError::Lagged(n) => {
                warn!("Event receiver lagged by {} events", n);
                EventBusError::Lagged(n)
            }
        })
    }

    /// Drain everything currently buffered, e.g. to decide which views to refresh
    pub fn drain(&mut self) -> Vec<MarketplaceEvent> {
        let mut events = Vec::new();
        loop {
            match self.try_recv() {
                Ok(event) => events.push(event),
                Err(EventBusError::Lagged(_)) => continue,
                Err(_) => break,
            }
        }
        events
    }
}

/// Receiver filtered to a single listing
pub struct ListingEventReceiver {
    receiver: broadcast::Receiver<MarketplaceEvent>,
    listing_id: ListingId,
}

impl ListingEventReceiver {
    /// Receive the next event for the watched listing, skipping all others
    pub async fn recv(&mut self) -> Result<MarketplaceEvent, EventBusError> {
        loop {
            let event = self.receiver.recv().await.map_err(map_recv_error)?;
            if event.listing_id() == Some(&self.listing_id) {
                return Ok(event);
            }
        }
    }
}

/// Errors that can occur when receiving events
#[derive(Debug, thiserror::Error)]
pub enum EventBusError {
    #[error("Event bus is closed")]
    Closed,

    #[error("No events available")]
    Empty,

    #[error("Receiver lagged by {0} events (events were dropped)")]
    Lagged(u64),
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}
