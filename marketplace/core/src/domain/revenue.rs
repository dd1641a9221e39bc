// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Revenue derivation
//!
//! Platform fee split, revenue estimates and currency formatting shared by the
//! admin financials, vendor revenue and transaction views.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::listing::ListingId;

/// Share of gross revenue retained by the marketplace operator
pub const PLATFORM_FEE_RATE: f64 = 0.5;

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Gross revenue broken into platform fee and vendor earnings
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueSplit {
    pub gross: f64,
    pub platform_fee: f64,
    pub vendor_earnings: f64,
}

impl RevenueSplit {
    fn accumulate(&mut self, other: RevenueSplit) {
        self.gross = round_cents(self.gross + other.gross);
        self.platform_fee = round_cents(self.platform_fee + other.platform_fee);
        self.vendor_earnings = round_cents(self.vendor_earnings + other.vendor_earnings);
    }
}

/// Split `amount` between platform and vendor.
///
/// Earnings are derived by subtraction so the two parts always sum to gross.
pub fn split(amount: f64) -> RevenueSplit {
    let gross = round_cents(amount);
    let platform_fee = round_cents(gross * PLATFORM_FEE_RATE);
    RevenueSplit {
        gross,
        platform_fee,
        vendor_earnings: round_cents(gross - platform_fee),
    }
}

pub fn estimated_revenue(price: f64, usage_count: u64) -> f64 {
    price * usage_count as f64
}

/// An amount in a given ISO 4217 currency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Money {
    pub amount: f64,
    pub currency: String,
}

impl Money {
    pub fn new(amount: f64, currency: &str) -> Self {
        Self {
            amount,
            currency: currency.to_ascii_uppercase(),
        }
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&format_currency(self.amount, &self.currency))
    }
}

/// Symbol and minor-unit digits for currencies with a dedicated symbol
fn currency_style(code: &str) -> (Option<&'static str>, usize) {
    match code {
        "USD" => (Some("$"), 2),
        "EUR" => (Some("€"), 2),
        "GBP" => (Some("£"), 2),
        "INR" => (Some("₹"), 2),
        "JPY" => (Some("¥"), 0),
        _ => (None, 2),
    }
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Format `amount` for display, e.g. `$1,234.50`, `¥1,235` or `CHF 12.00`
pub fn format_currency(amount: f64, currency: &str) -> String {
    let code = currency.to_ascii_uppercase();
    let (symbol, decimals) = currency_style(&code);

    let fixed = format!("{:.*}", decimals, amount.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut number = group_thousands(int_part);
    if let Some(frac) = frac_part {
        number.push('.');
        number.push_str(frac);
    }

    let sign = if amount < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };

    match symbol {
        Some(symbol) => format!("{sign}{symbol}{number}"),
        None => format!("{sign}{code} {number}"),
    }
}

// ============================================================================
// Transactions
// ============================================================================

/// A completed purchase as reported by the revenue endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(alias = "_id")]
    pub id: String,
    pub agent_id: ListingId,
    #[serde(default)]
    pub agent_name: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub vendor_id: Option<String>,
    pub amount: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Transaction {
    pub fn split(&self) -> RevenueSplit {
        split(self.amount)
    }
}

fn default_currency() -> String {
    "USD".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentRevenue {
    pub agent_id: ListingId,
    pub agent_name: Option<String>,
    pub currency: String,
    pub transactions: usize,
    pub split: RevenueSplit,
}

/// Revenue grouped per currency and per agent
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueReport {
    pub totals: BTreeMap<String, RevenueSplit>,
    pub by_agent: Vec<AgentRevenue>,
}

pub fn summarize(transactions: &[Transaction]) -> RevenueReport {
    let mut totals: BTreeMap<String, RevenueSplit> = BTreeMap::new();
    let mut by_agent: BTreeMap<(ListingId, String), AgentRevenue> = BTreeMap::new();

    for tx in transactions {
        let currency = tx.currency.to_ascii_uppercase();
        let part = tx.split();

        totals.entry(currency.clone()).or_default().accumulate(part);

        let entry = by_agent
            .entry((tx.agent_id.clone(), currency.clone()))
            .or_insert_with(|| AgentRevenue {
                agent_id: tx.agent_id.clone(),
                agent_name: tx.agent_name.clone(),
                currency,
                transactions: 0,
                split: RevenueSplit::default(),
            });
        entry.transactions += 1;
        entry.split.accumulate(part);
    }

    let mut by_agent: Vec<AgentRevenue> = by_agent.into_values().collect();
    by_agent.sort_by(|a, b| b.split.gross.total_cmp(&a.split.gross));

    RevenueReport { totals, by_agent }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_is_fifty_fifty() {
        let s = split(100.0);
        assert_eq!(s.gross, 100.0);
        assert_eq!(s.platform_fee, 50.0);
        assert_eq!(s.vendor_earnings, 50.0);

        for currency in ["USD", "EUR", "JPY", "CHF"] {
            let tx = Transaction {
                id: "t".to_string(),
                agent_id: ListingId::from("a"),
                agent_name: None,
                user_id: None,
                vendor_id: None,
                amount: 100.0,
                currency: currency.to_string(),
                created_at: None,
            };
            assert_eq!(tx.split().platform_fee, 50.0);
            assert_eq!(tx.split().vendor_earnings, 50.0);
        }
    }

    #[test]
    fn test_split_parts_sum_to_gross() {
        let s = split(0.03);
        assert!((s.platform_fee + s.vendor_earnings - s.gross).abs() < 1e-9);
        assert_eq!(format_currency(split(100.0).platform_fee, "USD"), "$50.00");
    }

    #[test]
    fn test_estimated_revenue() {
        assert_eq!(estimated_revenue(9.99, 0), 0.0);
        assert_eq!(estimated_revenue(10.0, 25), 250.0);
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(1234.5, "usd"), "$1,234.50");
        assert_eq!(format_currency(1_000_000.0, "EUR"), "€1,000,000.00");
        assert_eq!(format_currency(1234.6, "JPY"), "¥1,235");
        assert_eq!(format_currency(12.0, "CHF"), "CHF 12.00");
        assert_eq!(format_currency(-5.25, "GBP"), "-£5.25");
        assert_eq!(format_currency(0.0, "INR"), "₹0.00");
        assert_eq!(format_currency(999.999, "USD"), "$1,000.00");
    }

    #[test]
    fn test_summarize_groups_by_currency_and_agent() {
        let tx = |id: &str, agent: &str, amount: f64, currency: &str| Transaction {
            id: id.to_string(),
            agent_id: ListingId::from(agent),
            agent_name: Some(agent.to_uppercase()),
            user_id: None,
            vendor_id: None,
            amount,
            currency: currency.to_string(),
            created_at: None,
        };
        let report = summarize(&[
            tx("1", "a", 100.0, "USD"),
            tx("2", "a", 50.0, "usd"),
            tx("3", "b", 20.0, "EUR"),
        ]);

        assert_eq!(report.totals["USD"].gross, 150.0);
        assert_eq!(report.totals["USD"].platform_fee, 75.0);
        assert_eq!(report.totals["EUR"].vendor_earnings, 10.0);

        assert_eq!(report.by_agent.len(), 2);
        assert_eq!(report.by_agent[0].agent_id, ListingId::from("a"));
        assert_eq!(report.by_agent[0].transactions, 2);
    }
}
