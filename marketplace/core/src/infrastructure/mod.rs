// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod event_bus;
pub mod fallback;
pub mod in_memory;
pub mod session_store;
pub mod snapshot;

pub use event_bus::{EventBus, EventBusError, EventReceiver};
pub use fallback::ResilientMarketplace;
pub use in_memory::{Identity, InMemoryMarketplace};
