// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Degraded-data decorator
//!
//! Wraps a [`MarketplaceApi`] and gives every read a [`FallbackPolicy`].
//! When the backend is unavailable (timeout, network failure, 5xx) a read may
//! substitute an empty value or the last successful response, and the result
//! is returned as [`Fetched::Degraded`]. Definite answers such as `401` or
//! `404` always propagate. Mutations are passed straight through.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::fetch::{DegradedSource, FallbackPolicy, Fetched};
use crate::domain::listing::{AgentListing, ListingId};
use crate::domain::repository::{ApiError, MarketplaceApi};
use crate::domain::revenue::Transaction;
use crate::domain::support::{AdminStats, Notification, Report};
use crate::domain::user::User;
use crate::infrastructure::snapshot::Snapshot;

const LISTINGS: &str = "listings";
const LISTING: &str = "listing";
const STATS: &str = "admin_stats";
const USERS: &str = "users";
const ADMIN_REVENUE: &str = "admin_revenue";
const VENDOR_REVENUE: &str = "vendor_revenue";
const REPORTS: &str = "reports";
const NOTIFICATIONS: &str = "notifications";

/// Value served by a degraded read that has nothing cached.
/// `None` means the read has no meaningful placeholder and must fail instead.
trait Placeholder: Sized {
    fn placeholder() -> Option<Self>;
}

impl<T> Placeholder for Vec<T> {
    fn placeholder() -> Option<Self> {
        Some(Vec::new())
    }
}

impl Placeholder for AdminStats {
    fn placeholder() -> Option<Self> {
        Some(AdminStats::default())
    }
}

impl Placeholder for AgentListing {
    fn placeholder() -> Option<Self> {
        None
    }
}

pub struct ResilientMarketplace {
    api: Arc<dyn MarketplaceApi>,
    enabled: bool,
    cache: Mutex<HashMap<&'static str, serde_json::Value>>,
}

impl ResilientMarketplace {
    pub fn new(api: Arc<dyn MarketplaceApi>) -> Self {
        Self {
            api,
            enabled: true,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// With fallbacks disabled every read uses [`FallbackPolicy::Propagate`]
    pub fn with_fallback(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// The wrapped backend, for mutations
    pub fn api(&self) -> &Arc<dyn MarketplaceApi> {
        &self.api
    }

    /// Seed the cache from a snapshot so the first failed read has something to show.
    /// Vendor revenue is seeded only for a known vendor, with that vendor's transactions.
    pub fn seed_from_snapshot(&self, snapshot: &Snapshot, vendor_id: Option<&str>) {
        self.remember(LISTINGS, &snapshot.listings);
        self.remember(USERS, &snapshot.users);
        self.remember(REPORTS, &snapshot.reports);
        self.remember(ADMIN_REVENUE, &snapshot.transactions);
        if let Some(vendor) = vendor_id {
            let own: Vec<&Transaction> = snapshot
                .transactions
                .iter()
                .filter(|t| t.vendor_id.as_deref() == Some(vendor))
                .collect();
            self.remember(VENDOR_REVENUE, &own);
        }
        if let Some(stats) = &snapshot.stats {
            self.remember(STATS, stats);
        }
        debug!(listings = snapshot.listings.len(), "Seeded fallback cache from snapshot");
    }

    fn remember<T: Serialize>(&self, key: &'static str, value: &T) {
        match serde_json::to_value(value) {
            Ok(json) => {
                self.cache.lock().insert(key, json);
            }
            Err(e) => warn!("Failed to cache {} response: {}", key, e),
        }
    }

    fn recall<T: DeserializeOwned>(&self, key: &'static str) -> Option<T> {
        let json = self.cache.lock().get(key).cloned()?;
        serde_json::from_value(json).ok()
    }

    async fn read<T, F>(
        &self,
        key: &'static str,
        policy: FallbackPolicy,
        fetch: F,
    ) -> Result<Fetched<T>, ApiError>
    where
        T: Serialize + DeserializeOwned + Placeholder,
        F: Future<Output = Result<T, ApiError>>,
    {
        let policy = if self.enabled { policy } else { FallbackPolicy::Propagate };

        let err = match fetch.await {
            Ok(value) => {
                if policy == FallbackPolicy::Cached {
                    self.remember(key, &value);
                }
                return Ok(Fetched::Live(value));
            }
            Err(e) => e,
        };

        if !err.is_unavailable() {
            return Err(err);
        }

        let (value, source) = match policy {
            FallbackPolicy::Propagate => return Err(err),
            FallbackPolicy::Cached => match self.recall::<T>(key) {
                Some(value) => (value, DegradedSource::Cached),
                None => match T::placeholder() {
                    Some(value) => (value, DegradedSource::Empty),
                    None => return Err(err),
                },
            },
            FallbackPolicy::Empty => match T::placeholder() {
                Some(value) => (value, DegradedSource::Empty),
                None => return Err(err),
            },
        };

        let reason = err.to_string();
        warn!(read = key, %source, "Backend unavailable, serving degraded data: {}", reason);
        metrics::counter!("agentstore_degraded_reads_total", "read" => key).increment(1);

        Ok(Fetched::Degraded {
            value,
            source,
            reason,
        })
    }

    pub async fn listings(&self) -> Result<Fetched<Vec<AgentListing>>, ApiError> {
        self.read(LISTINGS, FallbackPolicy::Cached, self.api.list_listings()).await
    }

    /// Single-listing reads drive lifecycle decisions and never degrade
    pub async fn listing(&self, id: &ListingId) -> Result<AgentListing, ApiError> {
        self.read(LISTING, FallbackPolicy::Propagate, self.api.get_listing(id))
            .await
            .map(Fetched::into_value)
    }

    pub async fn admin_stats(&self) -> Result<Fetched<AdminStats>, ApiError> {
        self.read(STATS, FallbackPolicy::Cached, self.api.admin_stats()).await
    }

    pub async fn users(&self) -> Result<Fetched<Vec<User>>, ApiError> {
        self.read(USERS, FallbackPolicy::Cached, self.api.list_users()).await
    }

    pub async fn admin_revenue(&self) -> Result<Fetched<Vec<Transaction>>, ApiError> {
        self.read(ADMIN_REVENUE, FallbackPolicy::Cached, self.api.admin_revenue()).await
    }

    pub async fn vendor_revenue(&self) -> Result<Fetched<Vec<Transaction>>, ApiError> {
        self.read(VENDOR_REVENUE, FallbackPolicy::Cached, self.api.vendor_revenue()).await
    }

    pub async fn reports(&self) -> Result<Fetched<Vec<Report>>, ApiError> {
        self.read(REPORTS, FallbackPolicy::Cached, self.api.list_reports()).await
    }

    pub async fn notifications(&self) -> Result<Fetched<Vec<Notification>>, ApiError> {
        self.read(NOTIFICATIONS, FallbackPolicy::Empty, self.api.list_notifications()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::in_memory::InMemoryMarketplace;
    use crate::domain::lifecycle::LifecycleCommand;
    use crate::domain::listing::NewListing;
    use crate::domain::support::{NewReport, NewSubscription, Subscription};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Delegates to an in-memory backend until switched off
    struct Flaky {
        inner: InMemoryMarketplace,
        down: AtomicBool,
        error: ApiError,
    }

    impl Flaky {
        fn new(error: ApiError) -> Self {
            Self {
                inner: InMemoryMarketplace::new(),
                down: AtomicBool::new(false),
                error,
            }
        }

        fn gate(&self) -> Result<(), ApiError> {
            if self.down.load(Ordering::SeqCst) {
                Err(self.error.clone())
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl MarketplaceApi for Flaky {
        async fn list_listings(&self) -> Result<Vec<AgentListing>, ApiError> {
            self.gate()?;
            self.inner.list_listings().await
        }
        async fn get_listing(&self, id: &ListingId) -> Result<AgentListing, ApiError> {
            self.gate()?;
            self.inner.get_listing(id).await
        }
        async fn create_listing(&self, listing: &NewListing) -> Result<AgentListing, ApiError> {
            self.gate()?;
            self.inner.create_listing(listing).await
        }
        async fn execute(&self, id: &ListingId, command: &LifecycleCommand) -> Result<(), ApiError> {
            self.gate()?;
            self.inner.execute(id, command).await
        }
        async fn subscribe(&self, s: &NewSubscription) -> Result<Subscription, ApiError> {
            self.gate()?;
            self.inner.subscribe(s).await
        }
        async fn admin_stats(&self) -> Result<AdminStats, ApiError> {
            self.gate()?;
            self.inner.admin_stats().await
        }
        async fn list_users(&self) -> Result<Vec<User>, ApiError> {
            self.gate()?;
            self.inner.list_users().await
        }
        async fn set_user_blocked(&self, user_id: &str, blocked: bool) -> Result<(), ApiError> {
            self.gate()?;
            self.inner.set_user_blocked(user_id, blocked).await
        }
        async fn admin_revenue(&self) -> Result<Vec<Transaction>, ApiError> {
            self.gate()?;
            self.inner.admin_revenue().await
        }
        async fn vendor_revenue(&self) -> Result<Vec<Transaction>, ApiError> {
            self.gate()?;
            self.inner.vendor_revenue().await
        }
        async fn list_reports(&self) -> Result<Vec<Report>, ApiError> {
            self.gate()?;
            self.inner.list_reports().await
        }
        async fn create_report(&self, report: &NewReport) -> Result<Report, ApiError> {
            self.gate()?;
            self.inner.create_report(report).await
        }
        async fn resolve_report(&self, report_id: &str, note: &str) -> Result<(), ApiError> {
            self.gate()?;
            self.inner.resolve_report(report_id, note).await
        }
        async fn list_notifications(&self) -> Result<Vec<Notification>, ApiError> {
            self.gate()?;
            self.inner.list_notifications().await
        }
        async fn mark_notification_read(&self, id: &str) -> Result<(), ApiError> {
            self.gate()?;
            self.inner.mark_notification_read(id).await
        }
    }

    fn listing_named(name: &str) -> AgentListing {
        serde_json::from_value(serde_json::json!({ "id": name, "name": name, "status": "Live" })).unwrap()
    }

    #[tokio::test]
    async fn test_cached_read_after_outage() {
        let flaky = Arc::new(Flaky::new(ApiError::Timeout));
        flaky.inner.insert_listing(listing_named("echo"));
        let resilient = ResilientMarketplace::new(flaky.clone());

        let live = resilient.listings().await.unwrap();
        assert!(!live.is_degraded());

        flaky.down.store(true, Ordering::SeqCst);
        let degraded = resilient.listings().await.unwrap();
        assert!(degraded.is_degraded());
        assert!(degraded.degraded_notice().is_some());
        assert_eq!(degraded.value().len(), 1);
        assert!(matches!(degraded, Fetched::Degraded { source: DegradedSource::Cached, .. }));
    }

    #[tokio::test]
    async fn test_cache_miss_degrades_to_empty() {
        let flaky = Arc::new(Flaky::new(ApiError::Network("connection refused".into())));
        flaky.down.store(true, Ordering::SeqCst);
        let resilient = ResilientMarketplace::new(flaky);

        let users = resilient.users().await.unwrap();
        assert!(matches!(users, Fetched::Degraded { source: DegradedSource::Empty, .. }));
        assert!(users.value().is_empty());

        let notifications = resilient.notifications().await.unwrap();
        assert!(notifications.is_degraded());
    }

    #[tokio::test]
    async fn test_snapshot_seeds_cache() {
        let flaky = Arc::new(Flaky::new(ApiError::Rejected {
            status: 503,
            message: "maintenance".into(),
        }));
        flaky.down.store(true, Ordering::SeqCst);
        let resilient = ResilientMarketplace::new(flaky);
        resilient.seed_from_snapshot(
            &Snapshot {
                listings: vec![listing_named("a"), listing_named("b")],
                ..Snapshot::default()
            },
            None,
        );

        let listings = resilient.listings().await.unwrap();
        assert!(matches!(listings, Fetched::Degraded { source: DegradedSource::Cached, .. }));
        assert_eq!(listings.into_value().len(), 2);

        let vendor = resilient.vendor_revenue().await.unwrap();
        assert!(matches!(vendor, Fetched::Degraded { source: DegradedSource::Empty, .. }));
    }

    #[tokio::test]
    async fn test_snapshot_seeds_vendor_revenue_for_that_vendor() {
        let flaky = Arc::new(Flaky::new(ApiError::Timeout));
        flaky.down.store(true, Ordering::SeqCst);
        let resilient = ResilientMarketplace::new(flaky);
        let transactions: Vec<Transaction> = serde_json::from_value(serde_json::json!([
            { "id": "t1", "agentId": "a1", "amount": 10.0, "vendorId": "v1" },
            { "id": "t2", "agentId": "a1", "amount": 20.0, "vendorId": "v2" },
            { "id": "t3", "agentId": "a1", "amount": 30.0, "vendorId": "v1" }
        ]))
        .unwrap();
        resilient.seed_from_snapshot(
            &Snapshot {
                transactions,
                ..Snapshot::default()
            },
            Some("v1"),
        );

        let vendor = resilient.vendor_revenue().await.unwrap();
        assert!(matches!(vendor, Fetched::Degraded { source: DegradedSource::Cached, .. }));
        let ids: Vec<String> = vendor.into_value().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["t1", "t3"]);

        let admin = resilient.admin_revenue().await.unwrap();
        assert_eq!(admin.value().len(), 3);
    }

    #[tokio::test]
    async fn test_definite_errors_propagate() {
        let flaky = Arc::new(Flaky::new(ApiError::Unauthorized));
        flaky.down.store(true, Ordering::SeqCst);
        let resilient = ResilientMarketplace::new(flaky);
        assert_eq!(resilient.listings().await.unwrap_err(), ApiError::Unauthorized);
    }

    #[tokio::test]
    async fn test_disabled_fallback_propagates() {
        let flaky = Arc::new(Flaky::new(ApiError::Timeout));
        flaky.inner.insert_listing(listing_named("echo"));
        let resilient = ResilientMarketplace::new(flaky.clone()).with_fallback(false);
        resilient.listings().await.unwrap();

        flaky.down.store(true, Ordering::SeqCst);
        assert_eq!(resilient.listings().await.unwrap_err(), ApiError::Timeout);
    }

    #[tokio::test]
    async fn test_single_listing_never_degrades() {
        let flaky = Arc::new(Flaky::new(ApiError::Timeout));
        flaky.inner.insert_listing(listing_named("echo"));
        let resilient = ResilientMarketplace::new(flaky.clone());
        resilient.listings().await.unwrap();

        flaky.down.store(true, Ordering::SeqCst);
        assert!(resilient.listing(&ListingId::from("echo")).await.is_err());
    }
}
