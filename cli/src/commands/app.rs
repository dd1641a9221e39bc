// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Vendor commands for managing your own listings
//!
//! Commands: list, show, create, submit, set-url, deactivate, reactivate, delete

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;

use agentstore_core::application::ListingView;
use agentstore_core::domain::listing::{
    AgentListing, BillingCycle, ListingId, NewListing, Pricing, PricingPlan,
};
use agentstore_core::domain::user::Role;

use crate::context::AppContext;
use crate::output;

#[derive(Subcommand)]
pub enum AppCommand {
    /// List your listings with the actions available on each
    List,

    /// Show one listing in detail
    Show {
        #[arg(value_name = "LISTING_ID")]
        id: String,
    },

    /// Create a draft listing
    Create {
        /// Read the listing from a YAML or JSON file instead of flags
        #[arg(long, value_name = "FILE", conflicts_with_all = ["name", "price"])]
        file: Option<PathBuf>,

        #[arg(long, required_unless_present = "file")]
        name: Option<String>,

        #[arg(long, default_value = "")]
        description: String,

        #[arg(long)]
        category: Option<String>,

        /// Deployment URL shown to subscribers
        #[arg(long)]
        url: Option<String>,

        /// Price of a single plan; omit for a free listing
        #[arg(long)]
        price: Option<f64>,

        #[arg(long, default_value = "USD")]
        currency: String,

        #[arg(long, default_value = "Standard")]
        plan_name: String,

        /// monthly, yearly or one-time
        #[arg(long, default_value = "monthly")]
        billing: BillingCycle,
    },

    /// Submit a draft or rejected listing for review
    Submit {
        #[arg(value_name = "LISTING_ID")]
        id: String,
    },

    /// Replace the deployment URL
    SetUrl {
        #[arg(value_name = "LISTING_ID")]
        id: String,

        #[arg(value_name = "URL")]
        url: String,
    },

    /// Hide a live listing from the marketplace
    Deactivate {
        #[arg(value_name = "LISTING_ID")]
        id: String,
    },

    /// Put an inactive listing back on the marketplace
    Reactivate {
        #[arg(value_name = "LISTING_ID")]
        id: String,
    },

    /// Ask an admin to delete the listing
    Delete {
        #[arg(value_name = "LISTING_ID")]
        id: String,
    },
}

pub async fn handle_command(command: AppCommand, ctx: &AppContext) -> Result<()> {
    ctx.require_role(Role::Vendor)?;
    let vendor = ctx.vendor();

    match command {
        AppCommand::List => {
            let listings = vendor.my_listings().await?;
            output::degraded_notice(&listings);
            if ctx.json {
                return output::print_json(listings.value());
            }
            print_listing_table(listings.value());
        }
        AppCommand::Show { id } => {
            let view = vendor.listing(&ListingId::from(id)).await?;
            if ctx.json {
                return output::print_json(&view);
            }
            print_listing_detail(&view);
        }
        AppCommand::Create {
            file,
            name,
            description,
            category,
            url,
            price,
            currency,
            plan_name,
            billing,
        } => {
            let new = match file {
                Some(path) => read_listing_file(&path)?,
                None => NewListing {
                    name: name.unwrap_or_default(),
                    description,
                    category,
                    url,
                    pricing: match price {
                        None => Pricing::Free,
                        Some(price) => Pricing::Plans(vec![PricingPlan {
                            name: plan_name,
                            price,
                            currency: currency.to_ascii_uppercase(),
                            billing_cycle: billing,
                        }]),
                    },
                },
            };
            let created = vendor.create(new).await?;
            output::success(format!("Draft created: {} ({})", created.name, created.id));
            println!("  Next: agentstore app submit {}", created.id);
        }
        AppCommand::Submit { id } => {
            report(vendor.submit(&ListingId::from(id)).await?, "Submitted for review");
        }
        AppCommand::SetUrl { id, url } => {
            report(vendor.set_url(&ListingId::from(id), &url).await?, "Deployment URL updated");
        }
        AppCommand::Deactivate { id } => {
            report(vendor.deactivate(&ListingId::from(id)).await?, "Listing deactivated");
        }
        AppCommand::Reactivate { id } => {
            report(vendor.reactivate(&ListingId::from(id)).await?, "Listing reactivated");
        }
        AppCommand::Delete { id } => {
            report(
                vendor.request_deletion(&ListingId::from(id)).await?,
                "Deletion requested; an admin will review it",
            );
        }
    }

    Ok(())
}

fn read_listing_file(path: &Path) -> Result<NewListing> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read listing file: {:?}", path))?;
    serde_yaml::from_str(&content).with_context(|| format!("Failed to parse listing file: {:?}", path))
}

fn report(listing: Option<AgentListing>, message: &str) {
    output::success(message);
    if let Some(listing) = listing {
        println!("  {}", listing.state_summary().dimmed());
    }
}

pub(crate) fn print_listing_table(views: &[ListingView]) {
    if views.is_empty() {
        println!("{}", "No listings found".yellow());
        return;
    }

    println!(
        "{:<26} {:<22} {:<14} {:<16} {:<18} {}",
        "ID", "NAME", "STATUS", "REVIEW", "PRICING", "ACTIONS"
    );
    for view in views {
        let listing = &view.listing;
        let mut actions = output::actions(&view.actions);
        if listing.is_pending_deletion() {
            actions = format!("{} {}", "deletion pending".red(), actions);
        }
        println!(
            "{:<26} {:<22} {:<14} {:<16} {:<18} {}",
            output::cell(listing.id.as_str(), 26),
            output::cell(&listing.name, 22).bold(),
            output::status(listing),
            output::review(listing),
            output::cell(&listing.pricing.to_string(), 18),
            actions
        );
    }
}

pub(crate) fn print_listing_detail(view: &ListingView) {
    let listing = &view.listing;
    println!("{}", listing.name.bold());
    println!("  ID: {}", listing.id);
    if !listing.description.is_empty() {
        println!("  Description: {}", listing.description);
    }
    if let Some(category) = &listing.category {
        println!("  Category: {}", category);
    }
    println!("  Status: {}", output::status(listing));
    println!("  Review: {}", output::review(listing));
    println!("  Deletion: {}", listing.deletion_status);
    println!("  Pricing: {}", listing.pricing);
    println!("  URL: {}", listing.url.as_deref().unwrap_or("(not set)"));
    println!("  Subscribers: {}", listing.usage_count);
    if let Some(estimate) = &view.estimated_revenue {
        println!("  Estimated revenue: {}", estimate);
    }
    if let Some(reason) = &listing.rejection_reason {
        println!("  Rejection reason: {}", reason.red());
    }
    if let Some(message) = &listing.approval_message {
        println!("  Approval message: {}", message);
    }
    if let Some(reason) = &listing.deletion_rejection_reason {
        println!("  Deletion rejected: {}", reason);
    }
    println!("  Available actions: {}", output::actions(&view.actions));
}
