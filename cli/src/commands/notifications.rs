// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use crate::context::AppContext;
use crate::output;

#[derive(Subcommand)]
pub enum NotificationsCommand {
    /// List notifications for the current session
    List {
        #[arg(long)]
        unread: bool,
    },

    /// Mark a notification as read
    Read {
        #[arg(value_name = "NOTIFICATION_ID")]
        id: String,
    },
}

pub async fn handle_command(command: NotificationsCommand, ctx: &AppContext) -> Result<()> {
    let support = ctx.support();

    match command {
        NotificationsCommand::List { unread } => {
            let notifications = support.notifications(unread).await?;
            output::degraded_notice(&notifications);
            if ctx.json {
                return output::print_json(notifications.value());
            }
            if notifications.value().is_empty() {
                println!("{}", "No notifications".dimmed());
                return Ok(());
            }
            for n in notifications.value() {
                let marker = if n.read { " ".normal() } else { "●".blue() };
                let when = n
                    .created_at
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default();
                println!("{} {} {} {}", marker, n.id.dimmed(), n.title.bold(), when.dimmed());
                if !n.message.is_empty() {
                    println!("    {}", n.message);
                }
            }
        }
        NotificationsCommand::Read { id } => {
            support.mark_read(&id).await?;
            output::success("Marked as read");
        }
    }

    Ok(())
}
