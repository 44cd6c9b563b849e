use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::{Bounds, MIN_ORDER_SIZE, TradingConfig};
use crate::error::ValidationError;

const REQUIRED_FIELDS: [&str; 4] = ["signal", "pair", "take_profit", "stop_loss"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalKind {
    Buy,
    Hold,
    Test,
}

impl FromStr for SignalKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BUY" => Ok(Self::Buy),
            "HOLD" => Ok(Self::Hold),
            "TEST" => Ok(Self::Test),
            other => Err(ValidationError::UnknownSignal(other.to_string())),
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Buy => "BUY",
            Self::Hold => "HOLD",
            Self::Test => "TEST",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingSignal {
    pub signal: SignalKind,
    pub pair: String, // "BTC/USDT"
    pub take_profit: f64,
    pub stop_loss: f64,
    pub base_order_size: Option<f64>,
    pub confidence: Option<f64>,
}

impl TradingSignal {
    /// Pair in the `BASE_QUOTE` form bot endpoints expect.
    pub fn bot_pair(&self) -> String {
        self.pair.replace('/', "_")
    }

    pub fn order_size(&self, config: &TradingConfig) -> f64 {
        self.base_order_size.unwrap_or(config.base_order_size)
    }

    pub fn note(&self) -> String {
        format!(
            "AI Generated Signal - Confidence: {:.2}",
            self.confidence.unwrap_or(0.0)
        )
    }
}

/// A validated request body.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundSignal {
    /// Connectivity probe. Skips every other check.
    Test,
    /// Acknowledged only. Numeric fields are present but never parsed.
    Hold { pair: String },
    Buy(TradingSignal),
}

impl InboundSignal {
    pub fn from_body(body: &[u8], config: &TradingConfig) -> Result<Self, ValidationError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(ValidationError::EmptyBody);
        }

        let value: Value = serde_json::from_slice(body)
            .map_err(|e| ValidationError::MalformedJson(e.to_string()))?;

        Self::from_value(&value, config)
    }

    pub fn from_value(value: &Value, config: &TradingConfig) -> Result<Self, ValidationError> {
        let fields = value.as_object().ok_or(ValidationError::NotAnObject)?;

        if fields.get("signal").and_then(Value::as_str) == Some("TEST") {
            return Ok(Self::Test);
        }

        let missing: Vec<&'static str> = REQUIRED_FIELDS
            .into_iter()
            .filter(|field| fields.get(*field).is_none_or(Value::is_null))
            .collect();
        if !missing.is_empty() {
            return Err(ValidationError::MissingFields(missing));
        }

        let pair = match fields.get("pair").and_then(Value::as_str) {
            Some(pair) if config.is_supported_pair(pair) => pair.to_string(),
            Some(pair) => return Err(ValidationError::UnsupportedPair(pair.to_string())),
            None => return Err(ValidationError::UnsupportedPair(fields["pair"].to_string())),
        };

        let signal = match &fields["signal"] {
            Value::String(s) => s.parse::<SignalKind>()?,
            other => return Err(ValidationError::UnknownSignal(other.to_string())),
        };

        match signal {
            SignalKind::Hold => Ok(Self::Hold { pair }),
            SignalKind::Test => Ok(Self::Test),
            SignalKind::Buy => {
                let trading_signal = TradingSignal {
                    signal,
                    pair,
                    take_profit: required_number(fields, "take_profit")?,
                    stop_loss: required_number(fields, "stop_loss")?,
                    base_order_size: optional_number(fields, "base_order_size")?,
                    confidence: optional_number(fields, "confidence")?,
                };
                check_ranges(&trading_signal, config)?;
                Ok(Self::Buy(trading_signal))
            }
        }
    }
}

fn required_number(fields: &Map<String, Value>, field: &'static str) -> Result<f64, ValidationError> {
    fields
        .get(field)
        .and_then(Value::as_f64)
        .ok_or(ValidationError::NotANumber { field })
}

fn optional_number(
    fields: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<f64>, ValidationError> {
    match fields.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_f64()
            .map(Some)
            .ok_or(ValidationError::NotANumber { field }),
    }
}

fn check_ranges(signal: &TradingSignal, config: &TradingConfig) -> Result<(), ValidationError> {
    let checks = [
        ("take_profit", Some(signal.take_profit), config.take_profit),
        ("stop_loss", Some(signal.stop_loss), config.stop_loss),
        ("confidence", signal.confidence, Bounds::new(0.0, 1.0)),
    ];

    for (field, value, bounds) in checks {
        if let Some(value) = value.filter(|v| !bounds.contains(*v)) {
            return Err(ValidationError::OutOfRange {
                field,
                value,
                min: bounds.min,
                max: bounds.max,
            });
        }
    }

    match signal.base_order_size {
        Some(size) if size < MIN_ORDER_SIZE => Err(ValidationError::OutOfRange {
            field: "base_order_size",
            value: size,
            min: MIN_ORDER_SIZE,
            max: f64::MAX,
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> Result<InboundSignal, ValidationError> {
        InboundSignal::from_value(&value, &TradingConfig::default())
    }

    #[test]
    fn test_buy_signal_is_parsed() {
        let parsed = parse(json!({
            "signal": "BUY",
            "pair": "BTC/USDT",
            "take_profit": 0.30,
            "stop_loss": 0.15,
            "confidence": 0.82
        }))
        .unwrap();

        let InboundSignal::Buy(signal) = parsed else {
            panic!("expected a trade signal");
        };
        assert_eq!(signal.signal, SignalKind::Buy);
        assert_eq!(signal.bot_pair(), "BTC_USDT");
        assert_eq!(signal.base_order_size, None);
        assert_eq!(signal.order_size(&TradingConfig::default()), 50.0);
        assert_eq!(signal.note(), "AI Generated Signal - Confidence: 0.82");
    }

    #[test]
    fn test_test_signal_bypasses_validation() {
        assert_eq!(parse(json!({ "signal": "TEST" })).unwrap(), InboundSignal::Test);
        assert_eq!(
            parse(json!({ "signal": "TEST", "pair": "NOPE/USDT" })).unwrap(),
            InboundSignal::Test
        );
    }

    #[test]
    fn test_missing_fields_are_listed_in_order() {
        let err = parse(json!({ "pair": "BTC/USDT", "take_profit": 0.3 })).unwrap_err();
        assert_eq!(err.missing_fields(), &["signal", "stop_loss"]);

        let err = parse(json!({ "signal": "BUY", "pair": null })).unwrap_err();
        assert_eq!(err.missing_fields(), &["pair", "take_profit", "stop_loss"]);
    }

    #[test]
    fn test_pair_must_be_allow_listed() {
        let err = parse(json!({
            "signal": "BUY",
            "pair": "DOGE/USDT",
            "take_profit": 0.3,
            "stop_loss": 0.15
        }))
        .unwrap_err();
        assert_eq!(err, ValidationError::UnsupportedPair("DOGE/USDT".into()));
    }

    #[test]
    fn test_unknown_signal_type() {
        let err = parse(json!({
            "signal": "SELL",
            "pair": "ETH/USDT",
            "take_profit": 0.3,
            "stop_loss": 0.15
        }))
        .unwrap_err();
        assert_eq!(err.to_string(), "Invalid signal type");
    }

    #[test]
    fn test_hold_skips_numeric_checks() {
        let parsed = parse(json!({
            "signal": "HOLD",
            "pair": "SOL/USDT",
            "take_profit": 0.9,
            "stop_loss": 0.9
        }))
        .unwrap();
        assert_eq!(parsed, InboundSignal::Hold { pair: "SOL/USDT".into() });

        let parsed = parse(json!({
            "signal": "HOLD",
            "pair": "BTC/USDT",
            "take_profit": "0.3",
            "stop_loss": 0.15
        }))
        .unwrap();
        assert_eq!(parsed, InboundSignal::Hold { pair: "BTC/USDT".into() });

        let err = parse(json!({ "signal": "HOLD", "pair": "BTC/USDT", "take_profit": 0.3 })).unwrap_err();
        assert_eq!(err.missing_fields(), &["stop_loss"]);
    }

    #[test]
    fn test_base_order_size_must_survive_rendering() {
        for size in [0.0, -5.0, 0.000_000_001] {
            let err = parse(json!({
                "signal": "BUY",
                "pair": "BTC/USDT",
                "take_profit": 0.3,
                "stop_loss": 0.15,
                "base_order_size": size
            }))
            .unwrap_err();
            assert!(matches!(err, ValidationError::OutOfRange { field: "base_order_size", .. }));
        }

        let parsed = parse(json!({
            "signal": "BUY",
            "pair": "BTC/USDT",
            "take_profit": 0.3,
            "stop_loss": 0.15,
            "base_order_size": 0.00000001
        }))
        .unwrap();
        assert!(matches!(parsed, InboundSignal::Buy(TradingSignal { base_order_size: Some(_), .. })));
    }

    #[test]
    fn test_buy_ranges_are_enforced() {
        let err = parse(json!({
            "signal": "BUY",
            "pair": "SOL/USDT",
            "take_profit": 0.5,
            "stop_loss": 0.15
        }))
        .unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { field: "take_profit", .. }));

        let err = parse(json!({
            "signal": "BUY",
            "pair": "SOL/USDT",
            "take_profit": 0.3,
            "stop_loss": 0.15,
            "confidence": 1.5
        }))
        .unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { field: "confidence", .. }));

        let err = parse(json!({
            "signal": "BUY",
            "pair": "SOL/USDT",
            "take_profit": "0.3",
            "stop_loss": 0.15
        }))
        .unwrap_err();
        assert_eq!(err, ValidationError::NotANumber { field: "take_profit" });
    }

    #[test]
    fn test_body_errors() {
        let config = TradingConfig::default();
        assert_eq!(InboundSignal::from_body(b"", &config).unwrap_err(), ValidationError::EmptyBody);
        assert!(matches!(
            InboundSignal::from_body(b"signal=BUY", &config).unwrap_err(),
            ValidationError::MalformedJson(_)
        ));
        assert_eq!(
            InboundSignal::from_body(b"[1,2]", &config).unwrap_err(),
            ValidationError::NotAnObject
        );
    }
}
