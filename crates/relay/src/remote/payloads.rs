use chrono::{DateTime, Utc};
use common::TradingConfig;
use common::models::TradingSignal;
use serde::Serialize;

/// Renders an amount the way the API expects numeric strings: no float noise,
/// no trailing zeros.
pub fn decimal(value: f64) -> String {
    let rendered = format!("{:.8}", value);
    let trimmed = rendered.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "" | "-0" => "0".to_string(),
        other => other.to_string(),
    }
}

fn percent(fraction: f64) -> String {
    decimal(fraction * 100.0)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Units {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Position {
    #[serde(rename = "type")]
    pub side: String, // "buy"
    pub order_type: String, // "market"
    pub units: Units,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceTarget {
    pub value: String,
    #[serde(rename = "type")]
    pub kind: String, // "bid" or "ask"
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TakeProfitStep {
    pub order_type: String,
    pub price: PriceTarget,
    pub volume: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TakeProfit {
    pub enabled: bool,
    pub steps: Vec<TakeProfitStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopLossCondition {
    pub price: PriceTarget,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopLoss {
    pub enabled: bool,
    pub order_type: String,
    pub conditional: StopLossCondition,
}

/// Body of `POST /public/api/v2/smart_trades`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SmartTradeRequest {
    pub account_id: u64,
    pub pair: String,
    pub position: Position,
    pub take_profit: TakeProfit,
    pub stop_loss: StopLoss,
    pub note: String,
}

impl SmartTradeRequest {
    /// Market entry, a single market take-profit step for the full volume and
    /// a conditional market stop-loss.
    pub fn from_signal(signal: &TradingSignal, account_id: u64, config: &TradingConfig) -> Self {
        Self {
            account_id,
            pair: signal.pair.clone(),
            position: Position {
                side: "buy".into(),
                order_type: "market".into(),
                units: Units {
                    value: decimal(signal.order_size(config)),
                },
            },
            take_profit: TakeProfit {
                enabled: true,
                steps: vec![TakeProfitStep {
                    order_type: "market".into(),
                    price: PriceTarget {
                        value: percent(signal.take_profit),
                        kind: "bid".into(),
                    },
                    volume: 100,
                }],
            },
            stop_loss: StopLoss {
                enabled: true,
                order_type: "market".into(),
                conditional: StopLossCondition {
                    price: PriceTarget {
                        value: percent(signal.stop_loss),
                        kind: "ask".into(),
                    },
                },
            },
            note: signal.note(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BotStrategy {
    pub strategy: String,
}

/// Body of `POST /public/api/ver1/bots/create_bot`. Numeric settings travel
/// as strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DcaBotRequest {
    pub name: String,
    pub account_id: u64,
    pub pairs: Vec<String>,
    pub base_order_volume: String,
    pub take_profit: String,
    pub safety_order_volume: String,
    pub martingale_volume_coefficient: String,
    pub martingale_step_coefficient: String,
    pub max_safety_orders: String,
    pub active_safety_orders_count: String,
    pub safety_order_step_percentage: String,
    pub take_profit_type: String,
    pub strategy_list: Vec<BotStrategy>,
    pub stop_loss_percentage: String,
    pub cooldown: String,
}

impl DcaBotRequest {
    pub fn from_signal(
        signal: &TradingSignal,
        account_id: u64,
        config: &TradingConfig,
        created_at: DateTime<Utc>,
    ) -> Self {
        let dca = &config.dca;
        let pair = signal.bot_pair();
        let base_size = signal.order_size(config);

        Self {
            name: format!("AI-Bot-{}-{}", pair, created_at.timestamp()),
            account_id,
            pairs: vec![pair],
            base_order_volume: decimal(base_size),
            take_profit: percent(signal.take_profit),
            safety_order_volume: decimal(base_size * dca.safety_order_multiplier),
            martingale_volume_coefficient: decimal(dca.martingale_volume_coefficient),
            martingale_step_coefficient: decimal(dca.martingale_step_coefficient),
            max_safety_orders: dca.max_safety_orders.to_string(),
            active_safety_orders_count: dca.active_safety_orders.to_string(),
            safety_order_step_percentage: decimal(dca.safety_order_step_percentage),
            take_profit_type: "total".into(),
            strategy_list: vec![BotStrategy {
                strategy: "long".into(),
            }],
            stop_loss_percentage: percent(signal.stop_loss),
            cooldown: dca.cooldown.as_secs().to_string(),
        }
    }
}
