// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # Listing Lifecycle State Machine
//!
//! The single transition table for agent listings. Every surface that offers
//! or performs a lifecycle action consults this module, so the same guards hold
//! for the CLI, the application services and the in-memory backend.
//!
//! | Actor | Action | Precondition | Effect |
//! |-------|--------|--------------|--------|
//! | Vendor | Submit for review | review ∈ {Draft, Rejected} | review = Pending Review |
//! | Admin | Approve | review = Pending Review | review = Approved, optional message, status Live unless Inactive |
//! | Admin | Reject | review = Pending Review | review = Rejected, reason required |
//! | Admin | Force live | status ≠ Live | status = Live |
//! | Vendor | Deactivate | status ∈ {Live, Under Review} | status = Inactive |
//! | Vendor | Reactivate | status = Inactive | status = Live |
//! | Vendor | Edit URL | (none) | url replaced |
//! | Vendor | Request deletion | (none) | deletion = Pending |
//! | Admin | Approve deletion | deletion = Pending | listing removed |
//! | Admin | Reject deletion | deletion = Pending | deletion = None, reason required |
//!
//! A pending deletion blocks every action except the two deletion decisions.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::listing::{
    validate_deployment_url, AgentListing, DeletionStatus, ListingError, ListingId, ListingStatus,
    ReviewStatus,
};
use crate::domain::user::Role;

/// Who performs a lifecycle action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Actor {
    Vendor,
    Admin,
}

impl Actor {
    /// Plain users cannot drive the listing lifecycle
    pub fn from_role(role: Role) -> Option<Self> {
        match role {
            Role::Vendor => Some(Self::Vendor),
            Role::Admin => Some(Self::Admin),
            Role::User => None,
        }
    }
}

impl std::fmt::Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Vendor => "vendor",
            Self::Admin => "admin",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleAction {
    SubmitForReview,
    Approve,
    Reject,
    ForceLive,
    Deactivate,
    Reactivate,
    EditUrl,
    RequestDeletion,
    ApproveDeletion,
    RejectDeletion,
}

impl LifecycleAction {
    pub const ALL: [LifecycleAction; 10] = [
        Self::SubmitForReview,
        Self::Approve,
        Self::Reject,
        Self::ForceLive,
        Self::Deactivate,
        Self::Reactivate,
        Self::EditUrl,
        Self::RequestDeletion,
        Self::ApproveDeletion,
        Self::RejectDeletion,
    ];

    pub fn actor(self) -> Actor {
        match self {
            Self::SubmitForReview
            | Self::Deactivate
            | Self::Reactivate
            | Self::EditUrl
            | Self::RequestDeletion => Actor::Vendor,
            Self::Approve
            | Self::Reject
            | Self::ForceLive
            | Self::ApproveDeletion
            | Self::RejectDeletion => Actor::Admin,
        }
    }

    fn is_deletion_decision(self) -> bool {
        matches!(self, Self::ApproveDeletion | Self::RejectDeletion)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::SubmitForReview => "submit for review",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::ForceLive => "force live",
            Self::Deactivate => "deactivate",
            Self::Reactivate => "reactivate",
            Self::EditUrl => "edit url",
            Self::RequestDeletion => "request deletion",
            Self::ApproveDeletion => "approve deletion",
            Self::RejectDeletion => "reject deletion",
        }
    }
}

impl std::fmt::Display for LifecycleAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A lifecycle action together with its payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum LifecycleCommand {
    SubmitForReview,
    Approve { message: Option<String> },
    Reject { reason: String },
    ForceLive,
    Deactivate,
    Reactivate,
    EditUrl { url: String },
    RequestDeletion,
    ApproveDeletion,
    RejectDeletion { reason: String },
}

impl LifecycleCommand {
    pub fn action(&self) -> LifecycleAction {
        match self {
            Self::SubmitForReview => LifecycleAction::SubmitForReview,
            Self::Approve { .. } => LifecycleAction::Approve,
            Self::Reject { .. } => LifecycleAction::Reject,
            Self::ForceLive => LifecycleAction::ForceLive,
            Self::Deactivate => LifecycleAction::Deactivate,
            Self::Reactivate => LifecycleAction::Reactivate,
            Self::EditUrl { .. } => LifecycleAction::EditUrl,
            Self::RequestDeletion => LifecycleAction::RequestDeletion,
            Self::ApproveDeletion => LifecycleAction::ApproveDeletion,
            Self::RejectDeletion { .. } => LifecycleAction::RejectDeletion,
        }
    }

    /// Payload checks that need no listing state. Run before any backend call.
    pub fn validate(&self) -> Result<(), LifecycleError> {
        match self {
            Self::Reject { reason } | Self::RejectDeletion { reason } if reason.trim().is_empty() => {
                Err(LifecycleError::MissingReason(self.action()))
            }
            Self::EditUrl { url } => {
                validate_deployment_url(url)?;
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

/// Result of applying a command to a listing
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    Updated(AgentListing),
    Removed(ListingId),
}

/// Precondition of each action, ignoring the deletion block
fn precondition_holds(action: LifecycleAction, listing: &AgentListing) -> bool {
    let status = listing.effective_status();
    match action {
        LifecycleAction::SubmitForReview => matches!(
            listing.review_status,
            ReviewStatus::Draft | ReviewStatus::Rejected
        ),
        LifecycleAction::Approve | LifecycleAction::Reject => {
            listing.review_status == ReviewStatus::PendingReview
        }
        LifecycleAction::ForceLive => status != ListingStatus::Live,
        LifecycleAction::Deactivate => {
            matches!(status, ListingStatus::Live | ListingStatus::UnderReview)
        }
        LifecycleAction::Reactivate => status == ListingStatus::Inactive,
        LifecycleAction::EditUrl | LifecycleAction::RequestDeletion => true,
        LifecycleAction::ApproveDeletion | LifecycleAction::RejectDeletion => {
            listing.is_pending_deletion()
        }
    }
}

/// Every action currently available on `listing`, for any actor
pub fn allowed_actions(listing: &AgentListing) -> BTreeSet<LifecycleAction> {
    LifecycleAction::ALL
        .into_iter()
        .filter(|action| {
            if listing.is_pending_deletion() && !action.is_deletion_decision() {
                return false;
            }
            precondition_holds(*action, listing)
        })
        .collect()
}

/// The subset of [`allowed_actions`] available to `actor`
pub fn actions_for(actor: Actor, listing: &AgentListing) -> BTreeSet<LifecycleAction> {
    allowed_actions(listing)
        .into_iter()
        .filter(|action| action.actor() == actor)
        .collect()
}

/// Guard a single action
pub fn check(
    actor: Actor,
    action: LifecycleAction,
    listing: &AgentListing,
) -> Result<(), LifecycleError> {
    if action.actor() != actor {
        return Err(LifecycleError::Forbidden {
            action,
            required: action.actor(),
        });
    }
    if listing.is_pending_deletion() && !action.is_deletion_decision() {
        return Err(LifecycleError::DeletionPending(listing.id.clone()));
    }
    if !precondition_holds(action, listing) {
        return Err(LifecycleError::NotAllowed {
            action,
            state: listing.state_summary(),
        });
    }
    Ok(())
}

/// Apply `command` to `listing` on behalf of `actor`
pub fn apply(
    mut listing: AgentListing,
    actor: Actor,
    command: LifecycleCommand,
) -> Result<Transition, LifecycleError> {
    command.validate()?;
    check(actor, command.action(), &listing)?;

    match command {
        LifecycleCommand::SubmitForReview => {
            listing.review_status = ReviewStatus::PendingReview;
            listing.rejection_reason = None;
        }
        LifecycleCommand::Approve { message } => {
            listing.review_status = ReviewStatus::Approved;
            listing.approval_message = message.filter(|m| !m.trim().is_empty());
            // a vendor-deactivated listing stays hidden until reactivated
            if listing.status != Some(ListingStatus::Inactive) {
                listing.status = Some(ListingStatus::Live);
            }
        }
        LifecycleCommand::Reject { reason } => {
            listing.review_status = ReviewStatus::Rejected;
            listing.rejection_reason = Some(reason.trim().to_string());
        }
        LifecycleCommand::ForceLive | LifecycleCommand::Reactivate => {
            listing.status = Some(ListingStatus::Live);
        }
        LifecycleCommand::Deactivate => {
            listing.status = Some(ListingStatus::Inactive);
        }
        LifecycleCommand::EditUrl { url } => {
            listing.url = Some(url.trim().to_string());
        }
        LifecycleCommand::RequestDeletion => {
            listing.deletion_status = DeletionStatus::Pending;
        }
        LifecycleCommand::ApproveDeletion => {
            return Ok(Transition::Removed(listing.id));
        }
        LifecycleCommand::RejectDeletion { reason } => {
            listing.deletion_status = DeletionStatus::NotRequested;
            listing.deletion_rejection_reason = Some(reason.trim().to_string());
        }
    }

    listing.touch();
    Ok(Transition::Updated(listing))
}

// ============================================================================
// Domain Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LifecycleError {
    #[error("Cannot {action} while the listing is in state ({state})")]
    NotAllowed {
        action: LifecycleAction,
        state: String,
    },

    #[error("Only the {required} can {action}")]
    Forbidden {
        action: LifecycleAction,
        required: Actor,
    },

    #[error("Listing {0} has a pending deletion request")]
    DeletionPending(ListingId),

    #[error("A non-empty reason is required to {0}")]
    MissingReason(LifecycleAction),

    #[error(transparent)]
    Listing(#[from] ListingError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::listing::{NewListing, Pricing};

    fn draft() -> AgentListing {
        AgentListing::draft(
            NewListing {
                name: "Researcher".to_string(),
                description: String::new(),
                category: None,
                url: None,
                pricing: Pricing::Free,
            },
            Some("vendor-1".to_string()),
        )
        .unwrap()
    }

    fn updated(transition: Transition) -> AgentListing {
        match transition {
            Transition::Updated(listing) => listing,
            Transition::Removed(id) => panic!("listing {id} unexpectedly removed"),
        }
    }

    #[test]
    fn test_draft_actions() {
        let listing = draft();
        let vendor = actions_for(Actor::Vendor, &listing);
        assert!(vendor.contains(&LifecycleAction::SubmitForReview));
        assert!(vendor.contains(&LifecycleAction::RequestDeletion));
        assert!(!vendor.contains(&LifecycleAction::Deactivate));
        assert!(!vendor.contains(&LifecycleAction::Reactivate));

        let admin = actions_for(Actor::Admin, &listing);
        assert_eq!(admin, BTreeSet::from([LifecycleAction::ForceLive]));
    }

    #[test]
    fn test_review_cycle() {
        let listing = updated(apply(draft(), Actor::Vendor, LifecycleCommand::SubmitForReview).unwrap());
        assert_eq!(listing.review_status, ReviewStatus::PendingReview);

        // cannot resubmit while pending
        assert!(matches!(
            check(Actor::Vendor, LifecycleAction::SubmitForReview, &listing),
            Err(LifecycleError::NotAllowed { .. })
        ));

        let rejected = updated(
            apply(
                listing.clone(),
                Actor::Admin,
                LifecycleCommand::Reject { reason: "  broken endpoint ".to_string() },
            )
            .unwrap(),
        );
        assert_eq!(rejected.review_status, ReviewStatus::Rejected);
        assert_eq!(rejected.rejection_reason.as_deref(), Some("broken endpoint"));

        let resubmitted =
            updated(apply(rejected, Actor::Vendor, LifecycleCommand::SubmitForReview).unwrap());
        assert_eq!(resubmitted.review_status, ReviewStatus::PendingReview);
        assert_eq!(resubmitted.rejection_reason, None);

        let approved = updated(
            apply(
                resubmitted,
                Actor::Admin,
                LifecycleCommand::Approve { message: Some("welcome".to_string()) },
            )
            .unwrap(),
        );
        assert_eq!(approved.review_status, ReviewStatus::Approved);
        assert_eq!(approved.approval_message.as_deref(), Some("welcome"));
        assert_eq!(approved.status, Some(ListingStatus::Live));
        assert!(approved.is_publicly_visible(false));
    }

    #[test]
    fn test_approve_keeps_deactivated_listing_hidden() {
        let mut listing = updated(apply(draft(), Actor::Vendor, LifecycleCommand::SubmitForReview).unwrap());
        listing.status = Some(ListingStatus::Inactive);
        let approved = updated(
            apply(listing, Actor::Admin, LifecycleCommand::Approve { message: None }).unwrap(),
        );
        assert_eq!(approved.review_status, ReviewStatus::Approved);
        assert_eq!(approved.status, Some(ListingStatus::Inactive));
        assert!(actions_for(Actor::Vendor, &approved).contains(&LifecycleAction::Reactivate));
    }

    #[test]
    fn test_reject_requires_reason() {
        let listing = updated(apply(draft(), Actor::Vendor, LifecycleCommand::SubmitForReview).unwrap());
        for reason in ["", "   "] {
            let err = apply(
                listing.clone(),
                Actor::Admin,
                LifecycleCommand::Reject { reason: reason.to_string() },
            )
            .unwrap_err();
            assert_eq!(err, LifecycleError::MissingReason(LifecycleAction::Reject));
        }
    }

    #[test]
    fn test_visibility_axis() {
        let mut listing = draft();
        assert!(check(Actor::Vendor, LifecycleAction::Deactivate, &listing).is_err());

        listing = updated(apply(listing, Actor::Admin, LifecycleCommand::ForceLive).unwrap());
        assert_eq!(listing.status, Some(ListingStatus::Live));
        assert!(check(Actor::Admin, LifecycleAction::ForceLive, &listing).is_err());

        listing = updated(apply(listing, Actor::Vendor, LifecycleCommand::Deactivate).unwrap());
        assert_eq!(listing.status, Some(ListingStatus::Inactive));
        assert!(check(Actor::Vendor, LifecycleAction::Deactivate, &listing).is_err());

        listing = updated(apply(listing, Actor::Vendor, LifecycleCommand::Reactivate).unwrap());
        assert_eq!(listing.status, Some(ListingStatus::Live));
    }

    #[test]
    fn test_under_review_and_unset_status_can_deactivate() {
        let mut listing = draft();
        listing.status = Some(ListingStatus::UnderReview);
        assert!(check(Actor::Vendor, LifecycleAction::Deactivate, &listing).is_ok());

        listing.status = None;
        assert!(check(Actor::Vendor, LifecycleAction::Deactivate, &listing).is_ok());
    }

    #[test]
    fn test_pending_deletion_blocks_other_actions() {
        let listing = updated(apply(draft(), Actor::Vendor, LifecycleCommand::RequestDeletion).unwrap());
        assert!(listing.is_pending_deletion());
        assert_eq!(
            allowed_actions(&listing),
            BTreeSet::from([LifecycleAction::ApproveDeletion, LifecycleAction::RejectDeletion])
        );
        assert_eq!(
            check(Actor::Vendor, LifecycleAction::SubmitForReview, &listing),
            Err(LifecycleError::DeletionPending(listing.id.clone()))
        );
        assert!(check(Actor::Vendor, LifecycleAction::RequestDeletion, &listing).is_err());
    }

    #[test]
    fn test_deletion_decisions() {
        let pending = updated(apply(draft(), Actor::Vendor, LifecycleCommand::RequestDeletion).unwrap());

        let removed = apply(pending.clone(), Actor::Admin, LifecycleCommand::ApproveDeletion).unwrap();
        assert_eq!(removed, Transition::Removed(pending.id.clone()));

        let kept = updated(
            apply(
                pending,
                Actor::Admin,
                LifecycleCommand::RejectDeletion { reason: "active subscribers".to_string() },
            )
            .unwrap(),
        );
        assert_eq!(kept.deletion_status, DeletionStatus::NotRequested);
        assert_eq!(kept.deletion_rejection_reason.as_deref(), Some("active subscribers"));
        assert!(allowed_actions(&kept).contains(&LifecycleAction::SubmitForReview));
    }

    #[test]
    fn test_wrong_actor_is_forbidden() {
        let listing = draft();
        assert_eq!(
            check(Actor::Vendor, LifecycleAction::ForceLive, &listing),
            Err(LifecycleError::Forbidden {
                action: LifecycleAction::ForceLive,
                required: Actor::Admin,
            })
        );
        assert!(matches!(
            apply(listing, Actor::Admin, LifecycleCommand::SubmitForReview),
            Err(LifecycleError::Forbidden { .. })
        ));
    }

    #[test]
    fn test_edit_url_validation() {
        let err = LifecycleCommand::EditUrl { url: "not a url".to_string() }
            .validate()
            .unwrap_err();
        assert!(matches!(err, LifecycleError::Listing(ListingError::InvalidUrl(_))));

        let listing = updated(
            apply(
                draft(),
                Actor::Vendor,
                LifecycleCommand::EditUrl { url: "https://agent.example.com".to_string() },
            )
            .unwrap(),
        );
        assert_eq!(listing.url.as_deref(), Some("https://agent.example.com"));
    }
}
