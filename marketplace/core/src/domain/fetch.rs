// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Degraded-data results
//!
//! A read either reflects the live backend or is explicitly marked degraded,
//! so callers never mistake a substitute for live data.

/// What a read does when the backend is unavailable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// Return the error to the caller
    Propagate,
    /// Substitute an empty value
    Empty,
    /// Substitute the last value successfully fetched for the same read
    Cached,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegradedSource {
    Empty,
    Cached,
}

impl std::fmt::Display for DegradedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Empty => "empty placeholder",
            Self::Cached => "cached copy",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Fetched<T> {
    Live(T),
    Degraded {
        value: T,
        source: DegradedSource,
        reason: String,
    },
}

impl<T> Fetched<T> {
    pub fn value(&self) -> &T {
        match self {
            Self::Live(value) | Self::Degraded { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Self::Live(value) | Self::Degraded { value, .. } => value,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    /// Human-readable explanation when the value is not live
    pub fn degraded_notice(&self) -> Option<String> {
        match self {
            Self::Live(_) => None,
            Self::Degraded { source, reason, .. } => {
                Some(format!("showing {source}: backend unavailable ({reason})"))
            }
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetched<U> {
        match self {
            Self::Live(value) => Fetched::Live(f(value)),
            Self::Degraded { value, source, reason } => Fetched::Degraded {
                value: f(value),
                source,
                reason,
            },
        }
    }
}
