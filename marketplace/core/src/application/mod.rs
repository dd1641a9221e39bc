// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Application services
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Vendor, admin, marketplace and support use cases. Each
//!   mutation is guarded locally, sent as one backend call, announced on the
//!   [`EventBus`](crate::infrastructure::event_bus::EventBus) and followed by a
//!   re-fetch.

use thiserror::Error;

use crate::domain::lifecycle::LifecycleError;
use crate::domain::listing::ListingError;
use crate::domain::repository::ApiError;
use crate::domain::support::SupportError;

pub mod admin;
pub mod lifecycle;
pub mod marketplace;
pub mod support;
pub mod vendor;

pub use admin::{AdminService, ReviewFilter, UserView};
pub use lifecycle::{ListingLifecycleService, ListingView};
pub use marketplace::{BrowseQuery, MarketplaceService};
pub use support::SupportService;
pub use vendor::VendorService;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Listing(#[from] ListingError),

    #[error(transparent)]
    Support(#[from] SupportError),

    #[error("{0}")]
    Validation(String),
}

impl ServiceError {
    /// The session is gone and the caller must log in again
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api(ApiError::Unauthorized))
    }
}
