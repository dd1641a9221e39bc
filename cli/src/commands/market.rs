// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Public marketplace: browse live agents and subscribe

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use agentstore_core::application::BrowseQuery;
use agentstore_core::domain::listing::ListingId;
use agentstore_core::domain::user::Role;

use crate::context::AppContext;
use crate::output;

#[derive(Subcommand)]
pub enum MarketCommand {
    /// Browse agents currently on the marketplace
    List {
        #[arg(long)]
        category: Option<String>,

        /// Match against name and description
        #[arg(long)]
        search: Option<String>,
    },

    /// Subscribe to an agent
    Subscribe {
        #[arg(value_name = "LISTING_ID")]
        id: String,

        /// Plan name; defaults to the first plan
        #[arg(long)]
        plan: Option<String>,
    },
}

pub async fn handle_command(command: MarketCommand, ctx: &AppContext) -> Result<()> {
    let market = ctx.marketplace();

    match command {
        MarketCommand::List { category, search } => {
            let query = BrowseQuery { category, search };
            let listings = market.browse(&query).await?;
            output::degraded_notice(&listings);
            if ctx.json {
                return output::print_json(listings.value());
            }

            if listings.value().is_empty() {
                println!("{}", "No agents match".yellow());
                return Ok(());
            }
            println!("{:<26} {:<24} {:<16} {}", "ID", "NAME", "CATEGORY", "PRICING");
            for listing in listings.value() {
                println!(
                    "{:<26} {:<24} {:<16} {}",
                    output::cell(listing.id.as_str(), 26),
                    output::cell(&listing.name, 24).bold(),
                    output::cell(listing.category.as_deref().unwrap_or("-"), 16),
                    listing.pricing
                );
            }
        }
        MarketCommand::Subscribe { id, plan } => {
            ctx.require_role(Role::User)?;
            let subscription = market.subscribe(&ListingId::from(id), plan).await?;
            if ctx.json {
                return output::print_json(&subscription);
            }
            output::success(format!(
                "Subscribed to {}{}",
                subscription.agent_id,
                subscription
                    .plan
                    .as_deref()
                    .map(|p| format!(" ({p})"))
                    .unwrap_or_default()
            ));
        }
    }

    Ok(())
}
