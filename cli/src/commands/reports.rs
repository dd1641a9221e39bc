// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Support reports: filed by users, resolved by admins

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use agentstore_core::domain::listing::ListingId;
use agentstore_core::domain::support::{NewReport, TicketStatus};
use agentstore_core::domain::user::Role;

use crate::context::AppContext;
use crate::output;

#[derive(Subcommand)]
pub enum ReportsCommand {
    /// List support reports
    List {
        /// Only show open reports
        #[arg(long)]
        open: bool,
    },

    /// File a new report
    Create {
        #[arg(long)]
        subject: String,

        #[arg(long)]
        description: String,

        /// Listing the report is about
        #[arg(long, value_name = "LISTING_ID")]
        agent: Option<String>,
    },

    /// Resolve an open report (admin)
    Resolve {
        #[arg(value_name = "REPORT_ID")]
        id: String,

        #[arg(long)]
        note: String,
    },
}

pub async fn handle_command(command: ReportsCommand, ctx: &AppContext) -> Result<()> {
    let support = ctx.support();

    match command {
        ReportsCommand::List { open } => {
            ctx.require_role(Role::Admin)?;
            let reports = support.reports(open).await?;
            output::degraded_notice(&reports);
            if ctx.json {
                return output::print_json(reports.value());
            }
            if reports.value().is_empty() {
                println!("{}", "No reports".green());
                return Ok(());
            }
            println!("{:<26} {:<10} {:<32} {}", "ID", "STATUS", "SUBJECT", "AGENT");
            for report in reports.value() {
                let status = match report.status {
                    TicketStatus::Open => report.status.to_string().yellow(),
                    TicketStatus::Resolved => report.status.to_string().green(),
                };
                println!(
                    "{:<26} {:<10} {:<32} {}",
                    output::cell(&report.id, 26),
                    status,
                    output::cell(&report.subject, 32),
                    report.agent_id.as_ref().map(|a| a.as_str()).unwrap_or("-")
                );
                if let Some(note) = &report.resolution_note {
                    println!("  {}", format!("Resolution: {note}").dimmed());
                }
            }
        }
        ReportsCommand::Create {
            subject,
            description,
            agent,
        } => {
            let report = support
                .file_report(NewReport {
                    subject,
                    description,
                    agent_id: agent.map(ListingId::from),
                })
                .await?;
            output::success(format!("Report filed: {}", report.id));
        }
        ReportsCommand::Resolve { id, note } => {
            ctx.require_role(Role::Admin)?;
            support.resolve_report(&id, &note).await?;
            output::success(format!("Report {id} resolved"));
        }
    }

    Ok(())
}
