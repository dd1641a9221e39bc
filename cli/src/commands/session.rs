// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Session commands: store, show and clear the bearer token
//!
//! Tokens are issued by the AgentStore web login; this command only stores one.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;

use agentstore_core::domain::session::{Session, SessionStore};
use agentstore_core::domain::user::Role;

use crate::context::AppContext;
use crate::output;

#[derive(Subcommand)]
pub enum SessionCommand {
    /// Store a bearer token for subsequent commands
    Login {
        /// Bearer token issued by the AgentStore backend
        #[arg(long, env = "AGENTSTORE_TOKEN", hide_env_values = true)]
        token: String,

        /// Role the token was issued for (user, vendor, admin)
        #[arg(long)]
        role: Role,

        /// Your user id, used to narrow vendor views
        #[arg(long)]
        user_id: Option<String>,
    },

    /// Show the stored session
    Show,

    /// Remove the stored session
    Logout,
}

pub async fn handle_command(command: SessionCommand, ctx: &AppContext) -> Result<()> {
    match command {
        SessionCommand::Login {
            token,
            role,
            user_id,
        } => {
            if token.trim().is_empty() {
                anyhow::bail!("Token cannot be empty");
            }
            ctx.sessions()
                .save(&Session::new(token.trim(), role, user_id))
                .context("Failed to store session")?;
            output::success(format!("Logged in as {role}"));
            println!("  Session file: {}", ctx.sessions().path().display());
        }
        SessionCommand::Show => match ctx.session() {
            Some(session) => {
                println!("{}", "Current session:".bold());
                println!("  Role: {}", session.role);
                println!(
                    "  User: {}",
                    session.user_id.as_deref().unwrap_or("(not set)")
                );
                println!("  Since: {}", session.created_at.format("%Y-%m-%d %H:%M UTC"));
                let preview: String = session.token.chars().take(6).collect();
                println!("  Token: {preview}…");
            }
            None => println!("{}", "Not logged in".yellow()),
        },
        SessionCommand::Logout => {
            ctx.sessions().clear().context("Failed to clear session")?;
            output::success("Logged out");
        }
    }
    Ok(())
}
