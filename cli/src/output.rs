// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Terminal rendering helpers shared by the commands

use std::collections::BTreeSet;

use anyhow::Result;
use colored::{ColoredString, Colorize};
use serde::Serialize;

use agentstore_core::domain::events::MarketplaceEvent;
use agentstore_core::domain::fetch::Fetched;
use agentstore_core::domain::lifecycle::LifecycleAction;
use agentstore_core::domain::listing::{AgentListing, ListingStatus, ReviewStatus};

/// Print a warning line when data is not live
pub fn degraded_notice<T>(fetched: &Fetched<T>) {
    if let Some(notice) = fetched.degraded_notice() {
        eprintln!("{}", format!("⚠ {notice}").yellow());
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn status(listing: &AgentListing) -> ColoredString {
    match listing.status {
        None => "Live (unset)".green(),
        Some(ListingStatus::Live) => "Live".green(),
        Some(ListingStatus::Draft) => "Draft".dimmed(),
        Some(ListingStatus::Inactive) => "Inactive".red(),
        Some(ListingStatus::UnderReview) => "Under Review".yellow(),
        Some(ListingStatus::Unknown) => "Unknown".red(),
    }
}

pub fn review(listing: &AgentListing) -> ColoredString {
    let label = listing.review_status.to_string();
    match listing.review_status {
        ReviewStatus::Approved => label.green(),
        ReviewStatus::Rejected => label.red(),
        ReviewStatus::PendingReview => label.yellow(),
        ReviewStatus::Draft => label.dimmed(),
    }
}

pub fn actions(actions: &BTreeSet<LifecycleAction>) -> String {
    if actions.is_empty() {
        return "-".to_string();
    }
    actions
        .iter()
        .map(|a| a.label())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Truncate to `width` characters for table cells
pub fn cell(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
        cut.push('…');
        cut
    }
}

pub fn success(message: impl std::fmt::Display) {
    println!("{}", format!("✓ {message}").green());
}

/// One-line summary of the changes a command made, for the refresh hint
pub fn change_notice(events: &[MarketplaceEvent]) -> Option<String> {
    if events.is_empty() {
        return None;
    }
    let listings: BTreeSet<_> = events.iter().filter_map(MarketplaceEvent::listing_id).collect();
    let other = events.iter().filter(|e| e.listing_id().is_none()).count();

    let mut parts = Vec::new();
    if !listings.is_empty() {
        parts.push(plural(listings.len(), "listing"));
    }
    if other > 0 {
        parts.push(plural(other, "other record"));
    }
    Some(format!("Changed {}; list views show it on the next refresh", parts.join(" and ")))
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentstore_core::domain::listing::ListingId;

    #[test]
    fn test_cell_truncates_on_char_boundary() {
        assert_eq!(cell("short", 10), "short");
        assert_eq!(cell("Résumé writer", 6), "Résum…");
    }

    #[test]
    fn test_actions_render() {
        assert_eq!(actions(&BTreeSet::new()), "-");
        let set: BTreeSet<_> = [LifecycleAction::Reject, LifecycleAction::Approve].into();
        assert_eq!(actions(&set), "approve, reject");
    }

    #[test]
    fn test_change_notice_counts_distinct_listings() {
        assert_eq!(change_notice(&[]), None);

        let events = vec![
            MarketplaceEvent::ListingCreated {
                listing_id: ListingId::from("a1"),
                created_at: Default::default(),
            },
            MarketplaceEvent::ListingChanged {
                listing_id: ListingId::from("a1"),
                action: LifecycleAction::SubmitForReview,
                changed_at: Default::default(),
            },
            MarketplaceEvent::ReportResolved {
                report_id: "r1".to_string(),
                resolved_at: Default::default(),
            },
        ];
        assert_eq!(
            change_notice(&events).unwrap(),
            "Changed 1 listing and 1 other record; list views show it on the next refresh"
        );
    }
}
