// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use serde::{Deserialize, Serialize};

use crate::domain::listing::ListingId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Vendor,
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::User => "user",
            Self::Vendor => "vendor",
            Self::Admin => "admin",
        })
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "user" => Ok(Self::User),
            "vendor" => Ok(Self::Vendor),
            "admin" => Ok(Self::Admin),
            other => Err(format!("unknown role '{other}' (expected user, vendor or admin)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub is_blocked: bool,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub subscribed_agents: Vec<ListingId>,
}

/// Status shown next to a user in the admin user list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserStatus {
    Blocked,
    Verified,
    Unverified,
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Blocked => "Blocked",
            Self::Verified => "Verified",
            Self::Unverified => "Unverified",
        })
    }
}

impl User {
    /// Blocking overrides verification state
    pub fn display_status(&self) -> UserStatus {
        if self.is_blocked {
            UserStatus::Blocked
        } else if self.is_verified {
            UserStatus::Verified
        } else {
            UserStatus::Unverified
        }
    }

    pub fn is_subscribed_to(&self, listing_id: &ListingId) -> bool {
        self.subscribed_agents.contains(listing_id)
    }
}
