// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use anyhow::Result;
use colored::Colorize;

use agentstore_core::domain::revenue::format_currency;
use agentstore_core::domain::user::Role;

use crate::context::AppContext;
use crate::output;

/// Admin dashboard counters
pub async fn handle_command(ctx: &AppContext) -> Result<()> {
    ctx.require_role(Role::Admin)?;
    let stats = ctx.admin().stats().await?;
    output::degraded_notice(&stats);
    if ctx.json {
        return output::print_json(stats.value());
    }

    let stats = stats.value();
    println!("{}", "Platform".bold());
    println!("  Users:             {}", stats.total_users);
    println!("  Vendors:           {}", stats.total_vendors);
    println!("  Agents:            {}", stats.total_agents);
    println!("  Pending reviews:   {}", highlight(stats.pending_reviews));
    println!("  Pending deletions: {}", highlight(stats.pending_deletions));
    println!("  Total revenue:     {}", format_currency(stats.total_revenue, "USD"));
    Ok(())
}

fn highlight(count: u64) -> colored::ColoredString {
    if count > 0 {
        count.to_string().yellow()
    } else {
        count.to_string().normal()
    }
}
