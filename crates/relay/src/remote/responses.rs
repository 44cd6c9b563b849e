use chrono::{DateTime, Utc};
use common::models::{AccountInfo, TradeKind, TradeSummary};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::traits::RemoteResponse;

/// Amounts arrive either as JSON numbers or as numeric strings.
fn flexible_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.as_ref().and_then(value_as_f64))
}

fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn parse_time(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.with_timezone(&Utc))
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountResponse {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    pub market_code: Option<String>,
    pub currency_code: Option<String>,
    #[serde(default, deserialize_with = "flexible_f64")]
    pub usd_amount: Option<f64>,
    #[serde(default, deserialize_with = "flexible_f64")]
    pub day_profit_usd: Option<f64>,
}

impl RemoteResponse<AccountInfo> for AccountResponse {
    fn normalize(&self) -> AccountInfo {
        AccountInfo {
            account_id: self.id,
            name: self.name.clone(),
            market_code: self.market_code.clone(),
            currency_code: self.currency_code.clone(),
            balance_usd: self.usd_amount,
            day_profit_usd: self.day_profit_usd,
            status: "active".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmartTradeResponse {
    pub id: u64,
    #[serde(default)]
    pub pair: String,
    /// Either a plain string or an object such as `{"type": "waiting_targets"}`.
    #[serde(default)]
    pub status: Value,
    pub created_at: Option<String>,
    /// Either an amount or an object such as `{"usd": "1.2", "percent": "0.4"}`.
    #[serde(default)]
    pub profit: Value,
}

impl RemoteResponse<TradeSummary> for SmartTradeResponse {
    fn normalize(&self) -> TradeSummary {
        let status = match &self.status {
            Value::String(s) => s.clone(),
            Value::Object(o) => o
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string(),
            _ => "unknown".to_string(),
        };

        let profit = match &self.profit {
            Value::Object(o) => o.get("usd").and_then(value_as_f64),
            other => value_as_f64(other),
        };

        TradeSummary {
            kind: TradeKind::SmartTrade,
            id: self.id,
            pair: self.pair.clone(),
            status,
            created_at: parse_time(self.created_at.as_deref()),
            profit,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BotResponse {
    pub id: u64,
    #[serde(default)]
    pub pairs: Vec<String>,
    #[serde(default)]
    pub is_enabled: bool,
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "flexible_f64")]
    pub usd_final_profit: Option<f64>,
}

impl RemoteResponse<TradeSummary> for BotResponse {
    fn normalize(&self) -> TradeSummary {
        TradeSummary {
            kind: TradeKind::DcaBot,
            id: self.id,
            pair: self.pairs.first().cloned().unwrap_or_default(),
            status: if self.is_enabled { "enabled" } else { "disabled" }.to_string(),
            created_at: parse_time(self.created_at.as_deref()),
            profit: self.usd_final_profit,
        }
    }
}
