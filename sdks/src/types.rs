// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Wire types used only by the HTTP client. Domain records are deserialized
//! directly into the `agentstore_core` types.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error payload returned by the backend, e.g. `{"message": "cannot delete non-owned app"}`
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    pub fn into_message(self) -> Option<String> {
        self.message.or(self.error).filter(|m| !m.trim().is_empty())
    }
}

/// Responses arrive either bare or wrapped in `{"data": ...}`
pub fn unwrap_envelope(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Decode a response body, keeping serde's description of what failed
pub fn decode_body<T: DeserializeOwned>(text: &str) -> Result<T, String> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| format!("response is not valid JSON: {e}"))?;
    serde_json::from_value(unwrap_envelope(value)).map_err(|e| e.to_string())
}

#[derive(Debug, Serialize)]
pub struct ApproveBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReasonBody {
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct UrlBody {
    pub url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockBody {
    pub is_blocked: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveBody {
    pub resolution_note: String,
}
