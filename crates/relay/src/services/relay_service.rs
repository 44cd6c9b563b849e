use async_trait::async_trait;
use chrono::Utc;
use common::TradingConfig;
use common::models::{
    AccountInfo, Execution, ExecutionOutcome, SignalKind, TradeKind, TradeSummary, TradingSignal,
    merge_recent,
};
use serde_json::Value;
use tracing::{error, info, warn};

use crate::error::RelayError;
use crate::remote::payloads::{DcaBotRequest, SmartTradeRequest};
use crate::traits::{ExchangeApi, RemoteResponse, TradeRelay};

/// Opens positions on the configured account, preferring a SmartTrade and
/// falling back once to a DCA bot.
pub struct RelayService<A> {
    api: A,
    account_id: u64,
    config: TradingConfig,
}

fn remote_id(raw: &Value) -> Result<u64, RelayError> {
    let id = match raw.get("id") {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.parse().ok(),
        _ => None,
    };
    id.ok_or_else(|| RelayError::MalformedResponse(format!("response carries no id: {}", raw)))
}

impl<A: ExchangeApi> RelayService<A> {
    pub fn new(api: A, account_id: u64, config: TradingConfig) -> Self {
        info!("3Commas relay initialized with Account ID: {}", account_id);
        Self {
            api,
            account_id,
            config,
        }
    }

    pub async fn create_smart_trade(&self, signal: &TradingSignal) -> Result<Execution, RelayError> {
        let order = SmartTradeRequest::from_signal(signal, self.account_id, &self.config);
        let raw = self.api.create_smart_trade(&order).await?;
        let trade_id = remote_id(&raw)?;

        info!("SmartTrade created successfully: {}", trade_id);
        Ok(Execution {
            kind: TradeKind::SmartTrade,
            remote_id: trade_id,
            message: "SmartTrade created".to_string(),
            raw,
        })
    }

    pub async fn create_dca_bot(&self, signal: &TradingSignal) -> Result<Execution, RelayError> {
        let bot = DcaBotRequest::from_signal(signal, self.account_id, &self.config, Utc::now());
        info!("Creating DCA Bot for {} with pairs: {:?}", signal.pair, bot.pairs);

        let raw = self.api.create_bot(&bot).await?;
        let bot_id = remote_id(&raw)?;
        info!("DCA Bot created successfully: {}", bot_id);

        let mut message = "DCA Bot created".to_string();
        if self.config.dca.start_after_create {
            match self.api.enable_bot(bot_id).await {
                Ok(_) => {
                    info!("DCA Bot {} enabled", bot_id);
                    message.push_str(" and started");
                }
                Err(e) => {
                    warn!("DCA Bot {} created but could not be enabled: {}", bot_id, e);
                    message.push_str(&format!(" (enable failed: {})", e));
                }
            }
        }

        Ok(Execution {
            kind: TradeKind::DcaBot,
            remote_id: bot_id,
            message,
            raw,
        })
    }
}

#[async_trait]
impl<A: ExchangeApi> TradeRelay for RelayService<A> {
    async fn execute(&self, signal: &TradingSignal) -> Result<ExecutionOutcome, RelayError> {
        if signal.signal != SignalKind::Buy {
            info!("Signal type {} not executed", signal.signal);
            return Ok(ExecutionOutcome::Skipped {
                signal: signal.signal,
            });
        }

        info!("Executing BUY signal for {}", signal.pair);

        let smart_trade_err = match self.create_smart_trade(signal).await {
            Ok(execution) => return Ok(ExecutionOutcome::Executed(execution)),
            Err(e) => e,
        };

        warn!("SmartTrade failed ({}), trying DCA Bot as fallback", smart_trade_err);

        match self.create_dca_bot(signal).await {
            Ok(execution) => Ok(ExecutionOutcome::Executed(execution)),
            Err(dca_err) => {
                error!("DCA Bot creation failed: {}", dca_err);
                Err(RelayError::FallbackExhausted {
                    smart_trade: Box::new(smart_trade_err),
                    dca_bot: Box::new(dca_err),
                })
            }
        }
    }

    async fn account_status(&self) -> Result<AccountInfo, RelayError> {
        let accounts = self.api.accounts().await?;

        accounts
            .iter()
            .find(|account| account.id == self.account_id)
            .map(|account| account.normalize())
            .ok_or(RelayError::AccountNotFound(self.account_id))
    }

    async fn recent_trades(&self, limit: usize) -> Result<Vec<TradeSummary>, RelayError> {
        let (smart_trades, bots) = futures_util::try_join!(
            self.api.smart_trades(self.account_id, limit),
            self.api.bots(self.account_id, limit),
        )?;

        Ok(merge_recent(
            smart_trades.iter().map(|t| t.normalize()).collect(),
            bots.iter().map(|b| b.normalize()).collect(),
            limit,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::responses::{AccountResponse, BotResponse, SmartTradeResponse};
    use crate::traits::MockExchangeApi;
    use mockall::Sequence;
    use reqwest::StatusCode;
    use serde_json::json;

    const ACCOUNT: u64 = 42;

    fn buy_signal() -> TradingSignal {
        TradingSignal {
            signal: SignalKind::Buy,
            pair: "BTC/USDT".into(),
            take_profit: 0.30,
            stop_loss: 0.15,
            base_order_size: None,
            confidence: Some(0.8),
        }
    }

    fn rejected() -> RelayError {
        RelayError::Remote {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            body: r#"{"error":"record_invalid"}"#.into(),
        }
    }

    fn service(api: MockExchangeApi) -> RelayService<MockExchangeApi> {
        RelayService::new(api, ACCOUNT, TradingConfig::default())
    }

    #[tokio::test]
    async fn test_non_buy_signals_are_skipped() {
        let mut api = MockExchangeApi::new();
        api.expect_create_smart_trade().never();
        api.expect_create_bot().never();

        let relay = service(api);
        for kind in [SignalKind::Hold, SignalKind::Test] {
            let mut signal = buy_signal();
            signal.signal = kind;
            let outcome = relay.execute(&signal).await.unwrap();
            assert_eq!(outcome, ExecutionOutcome::Skipped { signal: kind });
        }
    }

    #[tokio::test]
    async fn test_smart_trade_success_skips_fallback() {
        let mut api = MockExchangeApi::new();
        api.expect_create_smart_trade()
            .withf(|order| order.account_id == ACCOUNT && order.pair == "BTC/USDT")
            .times(1)
            .returning(|_| Ok(json!({ "id": 1001, "status": { "type": "created" } })));
        api.expect_create_bot().never();

        let outcome = service(api).execute(&buy_signal()).await.unwrap();
        let ExecutionOutcome::Executed(execution) = outcome else {
            panic!("expected an execution");
        };
        assert_eq!(execution.kind, TradeKind::SmartTrade);
        assert_eq!(execution.trade_id(), Some(1001));
        assert_eq!(execution.raw["status"]["type"], "created");
    }

    #[tokio::test]
    async fn test_failed_smart_trade_falls_back_to_dca_bot_once() {
        let mut seq = Sequence::new();
        let mut api = MockExchangeApi::new();
        api.expect_create_smart_trade()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(rejected()));
        api.expect_create_bot()
            .withf(|bot| bot.pairs == vec!["BTC_USDT".to_string()])
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(json!({ "id": 555 })));
        api.expect_enable_bot()
            .withf(|id| *id == 555)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(json!({ "id": 555, "is_enabled": true })));

        let outcome = service(api).execute(&buy_signal()).await.unwrap();
        let ExecutionOutcome::Executed(execution) = outcome else {
            panic!("expected an execution");
        };
        assert_eq!(execution.kind, TradeKind::DcaBot);
        assert_eq!(execution.bot_id(), Some(555));
        assert!(execution.message.starts_with("DCA Bot created"));
    }

    #[tokio::test]
    async fn test_smart_trade_without_id_counts_as_failure() {
        let mut api = MockExchangeApi::new();
        api.expect_create_smart_trade()
            .times(1)
            .returning(|_| Ok(json!({ "status": "accepted" })));
        api.expect_create_bot()
            .times(1)
            .returning(|_| Ok(json!({ "id": "77" })));
        api.expect_enable_bot().returning(|_| Ok(Value::Null));

        let outcome = service(api).execute(&buy_signal()).await.unwrap();
        assert!(matches!(
            outcome,
            ExecutionOutcome::Executed(Execution { kind: TradeKind::DcaBot, remote_id: 77, .. })
        ));
    }

    #[tokio::test]
    async fn test_enable_failure_keeps_created_bot() {
        let mut api = MockExchangeApi::new();
        api.expect_create_smart_trade().returning(|_| Err(rejected()));
        api.expect_create_bot().returning(|_| Ok(json!({ "id": 8 })));
        api.expect_enable_bot().times(1).returning(|_| Err(rejected()));

        let outcome = service(api).execute(&buy_signal()).await.unwrap();
        let ExecutionOutcome::Executed(execution) = outcome else {
            panic!("expected an execution");
        };
        assert_eq!(execution.bot_id(), Some(8));
        assert!(execution.message.contains("enable failed"));
    }

    #[tokio::test]
    async fn test_bot_is_not_enabled_when_disabled_in_config() {
        let mut api = MockExchangeApi::new();
        api.expect_create_smart_trade().returning(|_| Err(rejected()));
        api.expect_create_bot().returning(|_| Ok(json!({ "id": 8 })));
        api.expect_enable_bot().never();

        let mut config = TradingConfig::default();
        config.dca.start_after_create = false;
        let relay = RelayService::new(api, ACCOUNT, config);

        let outcome = relay.execute(&buy_signal()).await.unwrap();
        assert!(matches!(outcome, ExecutionOutcome::Executed(_)));
    }

    #[tokio::test]
    async fn test_both_paths_failing_reports_both_errors() {
        let mut api = MockExchangeApi::new();
        api.expect_create_smart_trade().times(1).returning(|_| Err(rejected()));
        api.expect_create_bot()
            .times(1)
            .returning(|_| Err(RelayError::MalformedResponse("boom".into())));
        api.expect_enable_bot().never();

        let err = service(api).execute(&buy_signal()).await.unwrap_err();
        assert!(matches!(err, RelayError::FallbackExhausted { .. }));
        let message = err.to_string();
        assert!(message.contains("record_invalid"));
        assert!(message.contains("boom"));
    }

    #[tokio::test]
    async fn test_account_status_selects_configured_account() {
        let mut api = MockExchangeApi::new();
        api.expect_accounts().times(2).returning(|| {
            Ok(serde_json::from_value::<Vec<AccountResponse>>(json!([
                { "id": 1, "name": "Paper" },
                { "id": ACCOUNT, "name": "Main", "market_code": "binance", "currency_code": "USDT", "usd_amount": "450" }
            ]))
            .unwrap())
        });

        let relay = service(api);
        let info = relay.account_status().await.unwrap();
        assert_eq!(info.account_id, ACCOUNT);
        assert_eq!(info.name, "Main");
        assert_eq!(info.balance_usd, Some(450.0));

        let other = RelayService {
            account_id: 3,
            ..relay
        };
        assert!(matches!(other.account_status().await, Err(RelayError::AccountNotFound(3))));
    }

    #[tokio::test]
    async fn test_recent_trades_merges_both_sources() {
        let mut api = MockExchangeApi::new();
        api.expect_smart_trades()
            .withf(|account, limit| *account == ACCOUNT && *limit == 5)
            .times(1)
            .returning(|_, _| {
                Ok(serde_json::from_value::<Vec<SmartTradeResponse>>(json!([
                    { "id": 1, "pair": "USDT_BTC", "status": "completed", "created_at": "2025-03-01T08:00:00Z" },
                    { "id": 2, "pair": "USDT_ETH", "status": "active", "created_at": "2025-03-01T12:00:00Z" },
                    { "id": 3, "pair": "USDT_SOL", "status": "active", "created_at": "2025-03-01T09:30:00Z" }
                ]))
                .unwrap())
            });
        api.expect_bots()
            .times(1)
            .returning(|_, _| {
                Ok(serde_json::from_value::<Vec<BotResponse>>(json!([
                    { "id": 10, "pairs": ["BTC_USDT"], "is_enabled": true, "created_at": "2025-03-01T11:00:00Z" },
                    { "id": 11, "pairs": ["ETH_USDT"], "is_enabled": false, "created_at": "2025-03-01T07:00:00Z" },
                    { "id": 12, "pairs": ["ADA_USDT"], "is_enabled": true, "created_at": "2025-03-01T13:00:00Z" }
                ]))
                .unwrap())
            });

        let trades = service(api).recent_trades(5).await.unwrap();
        let ids: Vec<u64> = trades.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![12, 2, 10, 3, 1]);
        assert_eq!(trades[0].kind, TradeKind::DcaBot);
        assert_eq!(trades[1].kind, TradeKind::SmartTrade);
    }

    #[tokio::test]
    async fn test_recent_trades_fails_when_a_listing_fails() {
        let mut api = MockExchangeApi::new();
        api.expect_smart_trades().returning(|_, _| Ok(vec![]));
        api.expect_bots().returning(|_, _| Err(rejected()));

        assert!(matches!(
            service(api).recent_trades(10).await,
            Err(RelayError::Remote { .. })
        ));
    }
}
