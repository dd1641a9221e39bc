// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Agent listing aggregate
//!
//! A listing is a vendor-published agent app in the marketplace. Its state is
//! split across two independent axes (`status` for visibility, `review_status`
//! for the admin review cycle) plus a blocking deletion flag. Transitions
//! between those states live in [`crate::domain::lifecycle`].
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Listing value objects, pricing and wire representation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use url::Url;
use uuid::Uuid;

use crate::domain::revenue::{self, Money};

// ============================================================================
// Value Objects
// ============================================================================

/// Opaque listing identifier assigned by the backend
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingId(pub String);

impl ListingId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ListingId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ListingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ListingId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ListingId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Operational visibility of a listing
///
/// Decoding is lenient: case, spaces, dashes and underscores are ignored, and
/// older records carrying `"active"` count as live. Anything unrecognised
/// decodes to [`ListingStatus::Unknown`], which is never publicly visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ListingStatus {
    Draft,
    Live,
    Inactive,
    #[serde(rename = "Under Review")]
    UnderReview,
    Unknown,
}

impl ListingStatus {
    pub fn parse_lenient(raw: &str) -> Self {
        let normalized: String = raw
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "draft" => Self::Draft,
            "live" | "active" => Self::Live,
            "inactive" => Self::Inactive,
            "underreview" => Self::UnderReview,
            _ => Self::Unknown,
        }
    }
}

impl<'de> Deserialize<'de> for ListingStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let status = Self::parse_lenient(&raw);
        if status == Self::Unknown {
            tracing::debug!(status = %raw, "Unrecognised listing status, treating as not public");
        }
        Ok(status)
    }
}

impl std::fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Draft => "Draft",
            Self::Live => "Live",
            Self::Inactive => "Inactive",
            Self::UnderReview => "Under Review",
            Self::Unknown => "Unknown",
        })
    }
}

/// Admin review state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ReviewStatus {
    #[default]
    #[serde(alias = "draft")]
    Draft,
    #[serde(rename = "Pending Review", alias = "PendingReview", alias = "pending")]
    PendingReview,
    #[serde(alias = "approved")]
    Approved,
    #[serde(alias = "rejected")]
    Rejected,
}

impl std::fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Draft => "Draft",
            Self::PendingReview => "Pending Review",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
        })
    }
}

/// Deletion workflow flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DeletionStatus {
    #[default]
    #[serde(rename = "None", alias = "none")]
    NotRequested,
    #[serde(alias = "pending")]
    Pending,
}

impl std::fmt::Display for DeletionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::NotRequested => "None",
            Self::Pending => "Pending",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    #[default]
    #[serde(alias = "Monthly")]
    Monthly,
    #[serde(alias = "Yearly", alias = "annual")]
    Yearly,
    #[serde(rename = "one-time", alias = "One-time", alias = "onetime")]
    OneTime,
}

impl std::fmt::Display for BillingCycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
            Self::OneTime => "one-time",
        })
    }
}

impl std::str::FromStr for BillingCycle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "monthly" => Ok(Self::Monthly),
            "yearly" | "annual" => Ok(Self::Yearly),
            "one-time" | "onetime" => Ok(Self::OneTime),
            other => Err(format!(
                "unknown billing cycle '{other}' (expected monthly, yearly or one-time)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingPlan {
    pub name: String,
    pub price: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub billing_cycle: BillingCycle,
}

impl PricingPlan {
    pub fn money(&self) -> Money {
        Money::new(self.price, &self.currency)
    }
}

/// Listing pricing: the literal `"Free"` or a list of plans
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Pricing {
    #[default]
    Free,
    Plans(Vec<PricingPlan>),
}

impl Pricing {
    pub fn is_free(&self) -> bool {
        match self {
            Self::Free => true,
            Self::Plans(plans) => plans.iter().all(|p| p.price == 0.0),
        }
    }

    /// The plan shown first on the listing, used for revenue estimates
    pub fn primary_plan(&self) -> Option<&PricingPlan> {
        match self {
            Self::Free => None,
            Self::Plans(plans) => plans.first(),
        }
    }

    pub fn plan(&self, name: &str) -> Option<&PricingPlan> {
        match self {
            Self::Free => None,
            Self::Plans(plans) => plans.iter().find(|p| p.name.eq_ignore_ascii_case(name)),
        }
    }
}

impl std::fmt::Display for Pricing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.primary_plan() {
            None => f.write_str("Free"),
            Some(plan) => write!(f, "{} / {}", plan.money(), plan.billing_cycle),
        }
    }
}

#[derive(Serialize)]
struct PlansRef<'a> {
    plans: &'a [PricingPlan],
}

impl Serialize for Pricing {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Free => serializer.serialize_str("Free"),
            Self::Plans(plans) => PlansRef { plans }.serialize(serializer),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPricing {
    Label(String),
    Plans { plans: Vec<PricingPlan> },
}

impl<'de> Deserialize<'de> for Pricing {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Option::<RawPricing>::deserialize(deserializer)? {
            None => Ok(Self::Free),
            Some(RawPricing::Label(label)) if label.eq_ignore_ascii_case("free") => Ok(Self::Free),
            Some(RawPricing::Label(label)) => Err(serde::de::Error::invalid_value(
                serde::de::Unexpected::Str(&label),
                &"\"Free\" or a plan list",
            )),
            Some(RawPricing::Plans { plans }) if plans.is_empty() => Ok(Self::Free),
            Some(RawPricing::Plans { plans }) => Ok(Self::Plans(plans)),
        }
    }
}

fn default_currency() -> String {
    "USD".to_string()
}

/// Treats an explicit `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// Aggregate Root: AgentListing
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentListing {
    #[serde(alias = "_id")]
    pub id: ListingId,

    pub name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, alias = "vendor", skip_serializing_if = "Option::is_none")]
    pub vendor_id: Option<String>,

    /// Absent on legacy records, which the marketplace treats as live
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ListingStatus>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub review_status: ReviewStatus,

    #[serde(default, deserialize_with = "null_as_default")]
    pub deletion_status: DeletionStatus,

    #[serde(default)]
    pub pricing: Pricing,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletion_rejection_reason: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub usage_count: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl AgentListing {
    /// Create a draft listing owned by `vendor_id` (aggregate factory method)
    pub fn draft(new: NewListing, vendor_id: Option<String>) -> Result<Self, ListingError> {
        new.validate()?;
        let now = Utc::now();
        Ok(Self {
            id: ListingId::new(),
            name: new.name.trim().to_string(),
            description: new.description,
            category: new.category,
            vendor_id,
            status: Some(ListingStatus::Draft),
            review_status: ReviewStatus::Draft,
            deletion_status: DeletionStatus::NotRequested,
            pricing: new.pricing,
            url: new.url,
            rejection_reason: None,
            approval_message: None,
            deletion_rejection_reason: None,
            usage_count: 0,
            created_at: Some(now),
            updated_at: Some(now),
        })
    }

    /// Visibility status with the legacy "missing means live" default applied
    pub fn effective_status(&self) -> ListingStatus {
        self.status.unwrap_or(ListingStatus::Live)
    }

    pub fn is_pending_deletion(&self) -> bool {
        self.deletion_status == DeletionStatus::Pending
    }

    /// Whether the listing belongs in the public marketplace.
    ///
    /// `unset_status_visible` controls how records without a `status` field
    /// are treated.
    pub fn is_publicly_visible(&self, unset_status_visible: bool) -> bool {
        match self.status {
            None => unset_status_visible,
            Some(ListingStatus::Live) => true,
            Some(_) => false,
        }
    }

    pub fn is_owned_by(&self, vendor_id: &str) -> bool {
        self.vendor_id.as_deref() == Some(vendor_id)
    }

    /// Estimated revenue: primary plan price times subscriber count
    pub fn estimated_revenue(&self) -> Option<Money> {
        self.pricing.primary_plan().map(|plan| {
            Money::new(
                revenue::estimated_revenue(plan.price, self.usage_count),
                &plan.currency,
            )
        })
    }

    pub fn state_summary(&self) -> String {
        format!(
            "status={}, review={}, deletion={}",
            self.status
                .map(|s| s.to_string())
                .unwrap_or_else(|| "unset".to_string()),
            self.review_status,
            self.deletion_status
        )
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}

/// Input for a vendor creating a listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewListing {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub pricing: Pricing,
}

impl NewListing {
    pub fn validate(&self) -> Result<(), ListingError> {
        if self.name.trim().is_empty() {
            return Err(ListingError::EmptyName);
        }
        if let Some(url) = &self.url {
            validate_deployment_url(url)?;
        }
        if let Pricing::Plans(plans) = &self.pricing {
            for plan in plans {
                if plan.name.trim().is_empty() {
                    return Err(ListingError::InvalidPlan("plan name cannot be empty".to_string()));
                }
                if !plan.price.is_finite() || plan.price < 0.0 {
                    return Err(ListingError::InvalidPlan(format!(
                        "plan '{}' has an invalid price {}",
                        plan.name, plan.price
                    )));
                }
                if plan.currency.len() != 3 || !plan.currency.chars().all(|c| c.is_ascii_alphabetic()) {
                    return Err(ListingError::InvalidPlan(format!(
                        "plan '{}' has an invalid currency code '{}'",
                        plan.name, plan.currency
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Deployment endpoints must be absolute http(s) URLs with a host
pub fn validate_deployment_url(raw: &str) -> Result<Url, ListingError> {
    let url = Url::parse(raw.trim()).map_err(|e| ListingError::InvalidUrl(format!("{raw}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ListingError::InvalidUrl(format!(
            "{raw}: scheme must be http or https"
        )));
    }
    if url.host_str().is_none() {
        return Err(ListingError::InvalidUrl(format!("{raw}: missing host")));
    }
    Ok(url)
}

// ============================================================================
// Domain Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ListingError {
    #[error("Listing name cannot be empty")]
    EmptyName,

    #[error("Invalid deployment URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid pricing plan: {0}")]
    InvalidPlan(String),
}
