// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Admin user management

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use agentstore_core::domain::user::{Role, UserStatus};

use crate::context::AppContext;
use crate::output;

#[derive(Subcommand)]
pub enum UsersCommand {
    /// List all users with their status
    List,

    /// Block a user
    Block {
        #[arg(value_name = "USER_ID")]
        id: String,
    },

    /// Unblock a user
    Unblock {
        #[arg(value_name = "USER_ID")]
        id: String,
    },
}

pub async fn handle_command(command: UsersCommand, ctx: &AppContext) -> Result<()> {
    ctx.require_role(Role::Admin)?;
    let admin = ctx.admin();

    match command {
        UsersCommand::List => {
            let users = admin.users().await?;
            output::degraded_notice(&users);
            if ctx.json {
                return output::print_json(users.value());
            }
            if users.value().is_empty() {
                println!("{}", "No users found".yellow());
                return Ok(());
            }
            println!("{:<26} {:<20} {:<28} {:<8} {}", "ID", "NAME", "EMAIL", "ROLE", "STATUS");
            for view in users.value() {
                let status = match view.status {
                    UserStatus::Blocked => view.status.to_string().red(),
                    UserStatus::Verified => view.status.to_string().green(),
                    UserStatus::Unverified => view.status.to_string().dimmed(),
                };
                println!(
                    "{:<26} {:<20} {:<28} {:<8} {}",
                    output::cell(&view.user.id, 26),
                    output::cell(&view.user.name, 20),
                    output::cell(&view.user.email, 28),
                    view.user.role.to_string(),
                    status
                );
            }
        }
        UsersCommand::Block { id } => {
            let view = admin.set_blocked(&id, true).await?;
            output::success(format!("{} is now {}", display_name(&view.user.name, &id), view.status));
        }
        UsersCommand::Unblock { id } => {
            let view = admin.set_blocked(&id, false).await?;
            output::success(format!("{} is now {}", display_name(&view.user.name, &id), view.status));
        }
    }

    Ok(())
}

fn display_name<'a>(name: &'a str, id: &'a str) -> &'a str {
    if name.is_empty() {
        id
    } else {
        name
    }
}
