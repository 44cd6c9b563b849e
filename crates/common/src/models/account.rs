use serde::Serialize;

/// Normalized view of the exchange account trades are routed to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountInfo {
    pub account_id: u64,
    pub name: String,
    pub market_code: Option<String>,
    pub currency_code: Option<String>,
    pub balance_usd: Option<f64>,
    pub day_profit_usd: Option<f64>,
    pub status: String,
}
