use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use super::signal::SignalKind;

/// Which kind of remote position a trade or execution refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TradeKind {
    #[serde(rename = "SmartTrade")]
    SmartTrade,
    #[serde(rename = "DCA Bot")]
    DcaBot,
}

impl fmt::Display for TradeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SmartTrade => f.write_str("SmartTrade"),
            Self::DcaBot => f.write_str("DCA Bot"),
        }
    }
}

/// A position successfully opened on the remote platform.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Execution {
    pub kind: TradeKind,
    pub remote_id: u64,
    pub message: String,
    pub raw: Value,
}

impl Execution {
    pub fn trade_id(&self) -> Option<u64> {
        (self.kind == TradeKind::SmartTrade).then_some(self.remote_id)
    }

    pub fn bot_id(&self) -> Option<u64> {
        (self.kind == TradeKind::DcaBot).then_some(self.remote_id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionOutcome {
    Executed(Execution),
    /// Only BUY signals reach the remote platform.
    Skipped { signal: SignalKind },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeSummary {
    #[serde(rename = "type")]
    pub kind: TradeKind,
    pub id: u64,
    pub pair: String,
    pub status: String,
    pub created_at: Option<DateTime<Utc>>,
    pub profit: Option<f64>,
}

/// Newest first, undated entries last, at most `limit` entries.
pub fn merge_recent(
    smart_trades: Vec<TradeSummary>,
    bots: Vec<TradeSummary>,
    limit: usize,
) -> Vec<TradeSummary> {
    let mut merged = smart_trades;
    merged.extend(bots);
    merged.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    merged.truncate(limit);
    merged
}
