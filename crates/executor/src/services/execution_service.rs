use std::sync::Arc;

use common::TradingConfig;
use common::models::{AccountInfo, Execution, ExecutionOutcome, InboundSignal, TradeSummary};
use relay::TradeRelay;
use tracing::{error, info, warn};

use crate::receiver::error::ApiError;

/// What the receiver answers for an accepted signal.
#[derive(Debug, Clone, PartialEq)]
pub enum SignalReply {
    Executed(Execution),
    Acknowledged { pair: String },
    TestAcknowledged,
}

pub struct ExecutionService {
    relay: Arc<dyn TradeRelay>,
    config: Arc<TradingConfig>,
}

impl ExecutionService {
    pub fn new(relay: Arc<dyn TradeRelay>, config: Arc<TradingConfig>) -> Self {
        Self { relay, config }
    }

    pub fn supported_pairs(&self) -> &[String] {
        &self.config.pairs
    }

    pub async fn process(&self, body: &[u8]) -> Result<SignalReply, ApiError> {
        info!("Received trading signal: {}", String::from_utf8_lossy(body));

        let inbound = InboundSignal::from_body(body, &self.config).map_err(|e| {
            error!("Rejected trading signal: {}", e);
            ApiError::from(e)
        })?;

        let signal = match inbound {
            InboundSignal::Test => {
                info!("Test signal received");
                return Ok(SignalReply::TestAcknowledged);
            }
            InboundSignal::Hold { pair } => {
                info!("HOLD signal received for {} - no action taken", pair);
                return Ok(SignalReply::Acknowledged { pair });
            }
            InboundSignal::Buy(signal) => signal,
        };

        match self.relay.execute(&signal).await {
            Ok(ExecutionOutcome::Executed(execution)) => {
                info!(
                    "Successfully executed BUY for {} via {} {}",
                    signal.pair, execution.kind, execution.remote_id
                );
                Ok(SignalReply::Executed(execution))
            }
            Ok(ExecutionOutcome::Skipped { signal: kind }) => {
                warn!("Relay skipped {} signal for {}", kind, signal.pair);
                Err(ApiError::NotExecuted(kind))
            }
            Err(e) => {
                error!("Failed to execute trade for {}: {}", signal.pair, e);
                Err(ApiError::Relay(e))
            }
        }
    }

    pub async fn account_status(&self) -> Result<AccountInfo, ApiError> {
        self.relay.account_status().await.map_err(|e| {
            error!("Error getting status: {}", e);
            ApiError::Relay(e)
        })
    }

    pub async fn recent_trades(&self, limit: usize) -> Result<Vec<TradeSummary>, ApiError> {
        self.relay.recent_trades(limit).await.map_err(|e| {
            error!("Error getting trades: {}", e);
            ApiError::Relay(e)
        })
    }
}
