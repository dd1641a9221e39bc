// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Revenue reports with the platform/vendor split

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use agentstore_core::domain::revenue::{format_currency, RevenueReport};
use agentstore_core::domain::user::Role;

use crate::context::AppContext;
use crate::output;

#[derive(Subcommand)]
pub enum RevenueCommand {
    /// Platform-wide revenue (admin)
    Admin,

    /// Revenue from your own listings (vendor)
    Vendor,
}

pub async fn handle_command(command: RevenueCommand, ctx: &AppContext) -> Result<()> {
    let report = match command {
        RevenueCommand::Admin => {
            ctx.require_role(Role::Admin)?;
            ctx.admin().financials().await?
        }
        RevenueCommand::Vendor => {
            ctx.require_role(Role::Vendor)?;
            ctx.vendor().revenue().await?
        }
    };

    output::degraded_notice(&report);
    if ctx.json {
        return output::print_json(report.value());
    }
    print_report(report.value());
    Ok(())
}

fn print_report(report: &RevenueReport) {
    if report.totals.is_empty() {
        println!("{}", "No transactions yet".yellow());
        return;
    }

    println!("{}", "Totals".bold());
    println!("{:<8} {:>16} {:>16} {:>16}", "CURRENCY", "GROSS", "PLATFORM FEE", "VENDOR");
    for (currency, split) in &report.totals {
        println!(
            "{:<8} {:>16} {:>16} {:>16}",
            currency,
            format_currency(split.gross, currency),
            format_currency(split.platform_fee, currency),
            format_currency(split.vendor_earnings, currency).green()
        );
    }

    println!();
    println!("{}", "By agent".bold());
    println!("{:<24} {:>6} {:>16} {:>16}", "AGENT", "SALES", "GROSS", "VENDOR");
    for agent in &report.by_agent {
        let name = agent.agent_name.as_deref().unwrap_or(agent.agent_id.as_str());
        println!(
            "{:<24} {:>6} {:>16} {:>16}",
            output::cell(name, 24),
            agent.transactions,
            format_currency(agent.split.gross, &agent.currency),
            format_currency(agent.split.vendor_earnings, &agent.currency)
        );
    }
}
