use async_trait::async_trait;
use common::models::{AccountInfo, ExecutionOutcome, TradeSummary, TradingSignal};
use serde_json::Value;

use crate::error::RelayError;
use crate::remote::payloads::{DcaBotRequest, SmartTradeRequest};
use crate::remote::responses::{AccountResponse, BotResponse, SmartTradeResponse};

/// Maps a raw API record onto the shape the rest of the system reports.
pub trait RemoteResponse<T> {
    fn normalize(&self) -> T;
}

/// Signed calls against the 3Commas REST API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExchangeApi: Send + Sync {
    async fn accounts(&self) -> Result<Vec<AccountResponse>, RelayError>;

    async fn create_smart_trade(&self, order: &SmartTradeRequest) -> Result<Value, RelayError>;

    async fn create_bot(&self, bot: &DcaBotRequest) -> Result<Value, RelayError>;

    async fn enable_bot(&self, bot_id: u64) -> Result<Value, RelayError>;

    async fn smart_trades(
        &self,
        account_id: u64,
        limit: usize,
    ) -> Result<Vec<SmartTradeResponse>, RelayError>;

    async fn bots(&self, account_id: u64, limit: usize) -> Result<Vec<BotResponse>, RelayError>;
}

/// What the HTTP receiver needs from the relay.
#[async_trait]
pub trait TradeRelay: Send + Sync {
    /// Opens a position for a BUY signal; every other signal is skipped.
    async fn execute(&self, signal: &TradingSignal) -> Result<ExecutionOutcome, RelayError>;

    async fn account_status(&self) -> Result<AccountInfo, RelayError>;

    async fn recent_trades(&self, limit: usize) -> Result<Vec<TradeSummary>, RelayError>;
}
