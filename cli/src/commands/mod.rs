// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the AgentStore CLI

pub mod app;
pub mod config;
pub mod market;
pub mod notifications;
pub mod reports;
pub mod revenue;
pub mod review;
pub mod session;
pub mod stats;
pub mod users;

pub use self::app::AppCommand;
pub use self::config::ConfigCommand;
pub use self::market::MarketCommand;
pub use self::notifications::NotificationsCommand;
pub use self::reports::ReportsCommand;
pub use self::revenue::RevenueCommand;
pub use self::review::ReviewCommand;
pub use self::session::SessionCommand;
pub use self::users::UsersCommand;
