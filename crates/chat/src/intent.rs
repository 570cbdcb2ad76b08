//! Keyword/regex intent detection.
//!
//! Deterministic and single-pass: lowercase the message, try the specific
//! patterns first, fall through to keyword buckets, end at `Unknown`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Detected user intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Intent {
    Greeting,
    Help,
    /// Stock level of a named product ("how much X do we have").
    StockOf { query: String },
    LowStock,
    InventoryValue,
    MovementHistory,
    Unknown,
}

static STOCK_OF_RE: Lazy<Regex> = Lazy::new(|| {
    // "stock of <x>", "how much <x> ...", "how many <x> ..."
    Regex::new(
        r"(?:stock (?:of|for)|how (?:much|many))\s+(?P<q>.+?)(?:\s+(?:do we have|in stock|left|remaining|is there|are there))?[\s?.!]*$",
    )
    .expect("stock-of pattern must compile")
});

static GREETING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(hi|hello|hey|good (morning|afternoon|evening))\b").unwrap());

/// Detect intent from a free-text message.
pub fn detect_intent(message: &str) -> Intent {
    let msg = message.trim().to_lowercase();
    if msg.is_empty() {
        return Intent::Unknown;
    }

    if GREETING_RE.is_match(&msg) {
        return Intent::Greeting;
    }

    if msg.contains("help") || msg.contains("what can you do") {
        return Intent::Help;
    }

    // Low-stock before stock-of: "which products are low on stock" would
    // otherwise match the quantity pattern.
    if (msg.contains("low") && msg.contains("stock"))
        || msg.contains("running out")
        || msg.contains("critical")
        || msg.contains("reorder")
    {
        return Intent::LowStock;
    }

    if (msg.contains("value") || msg.contains("worth")) && !msg.contains("movement") {
        return Intent::InventoryValue;
    }

    if msg.contains("movement")
        || msg.contains("history")
        || (msg.contains("recent") && (msg.contains("in") || msg.contains("out")))
    {
        return Intent::MovementHistory;
    }

    if let Some(caps) = STOCK_OF_RE.captures(&msg) {
        let query = caps["q"].trim().to_string();
        if !query.is_empty() {
            return Intent::StockOf { query };
        }
    }

    // Bare "stock <x>" / "<x> stock" style queries.
    if msg.contains("stock") || msg.contains("quantity") {
        let query = msg
            .replace("stock", " ")
            .replace("quantity", " ")
            .replace("of", " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        if !query.is_empty() {
            return Intent::StockOf { query };
        }
    }

    Intent::Unknown
}
