// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::user::Role;

/// Persisted login state used to authenticate backend calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(token: impl Into<String>, role: Role, user_id: Option<String>) -> Self {
        Self {
            token: token.into(),
            role,
            user_id,
            created_at: Utc::now(),
        }
    }
}

/// Storage for the current session. `clear` is called when the backend
/// answers `401`.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Option<Session>;

    fn save(&self, session: &Session) -> Result<(), SessionError>;

    fn clear(&self) -> Result<(), SessionError>;
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session file is malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Cannot determine session location: {0}")]
    Location(String),
}
