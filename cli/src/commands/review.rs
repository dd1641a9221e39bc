// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Admin review commands: approvals queue and deletion requests

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use agentstore_core::application::ReviewFilter;
use agentstore_core::domain::listing::{ListingId, ListingStatus};
use agentstore_core::domain::user::Role;

use crate::commands::app::{print_listing_detail, print_listing_table};
use crate::context::AppContext;
use crate::output;

#[derive(Subcommand)]
pub enum ReviewCommand {
    /// Show the approvals queue
    Queue {
        /// pending, approved, rejected or all
        #[arg(long, default_value = "pending")]
        filter: ReviewFilter,
    },

    /// Approve a listing awaiting review
    Approve {
        #[arg(value_name = "LISTING_ID")]
        id: String,

        /// Optional note shown to the vendor
        #[arg(long)]
        message: Option<String>,
    },

    /// Reject a listing awaiting review
    Reject {
        #[arg(value_name = "LISTING_ID")]
        id: String,

        /// Reason shown to the vendor (required)
        #[arg(long)]
        reason: String,
    },

    /// Make a listing live without review
    ForceLive {
        #[arg(value_name = "LISTING_ID")]
        id: String,
    },

    /// List pending deletion requests
    Deletions,

    /// Permanently remove a listing with a pending deletion request
    ApproveDeletion {
        #[arg(value_name = "LISTING_ID")]
        id: String,
    },

    /// Keep a listing and clear its deletion request
    RejectDeletion {
        #[arg(value_name = "LISTING_ID")]
        id: String,

        #[arg(long)]
        reason: String,
    },
}

pub async fn handle_command(command: ReviewCommand, ctx: &AppContext) -> Result<()> {
    ctx.require_role(Role::Admin)?;
    let admin = ctx.admin();

    match command {
        ReviewCommand::Queue { filter } => {
            let queue = admin.approvals(filter).await?;
            output::degraded_notice(&queue);
            if ctx.json {
                return output::print_json(queue.value());
            }
            print_listing_table(queue.value());
        }
        ReviewCommand::Approve { id, message } => {
            let listing = admin.approve(&ListingId::from(id), message).await?;
            output::success("Listing approved");
            if let Some(listing) = listing {
                println!("  {}", listing.state_summary().dimmed());
                if listing.status == Some(ListingStatus::Inactive) {
                    println!(
                        "  {}",
                        "Deactivated by the vendor; it goes live when they reactivate it".dimmed()
                    );
                }
            }
        }
        ReviewCommand::Reject { id, reason } => {
            admin.reject(&ListingId::from(id), &reason).await?;
            output::success("Listing rejected");
        }
        ReviewCommand::ForceLive { id } => {
            if let Some(listing) = admin.force_live(&ListingId::from(id)).await? {
                output::success(format!("{} is live", listing.name));
            }
        }
        ReviewCommand::Deletions => {
            let requests = admin.deletion_requests().await?;
            output::degraded_notice(&requests);
            if ctx.json {
                return output::print_json(requests.value());
            }
            if requests.value().is_empty() {
                println!("{}", "No pending deletion requests".green());
            }
            for view in requests.value() {
                print_listing_detail(view);
                println!();
            }
        }
        ReviewCommand::ApproveDeletion { id } => {
            let id = ListingId::from(id);
            admin.approve_deletion(&id).await?;
            output::success(format!("Listing {id} deleted"));
        }
        ReviewCommand::RejectDeletion { id, reason } => {
            admin.reject_deletion(&ListingId::from(id), &reason).await?;
            output::success("Deletion request rejected; the listing stays");
        }
    }

    Ok(())
}
