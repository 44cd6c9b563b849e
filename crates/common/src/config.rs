use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use crate::error::ConfigError;

pub const API_KEY_VAR: &str = "THREE_COMMAS_API_KEY";
pub const API_SECRET_VAR: &str = "THREE_COMMAS_SECRET";
pub const ACCOUNT_ID_VAR: &str = "ACCOUNT_ID";

pub const DEFAULT_BASE_URL: &str = "https://api.3commas.io";

/// Smallest order size that survives the 8-decimal rendering of outbound amounts.
pub const MIN_ORDER_SIZE: f64 = 0.000_000_01;

const TRADING_PAIRS: &[&str; 6] = &[
    "BTC/USDT", "ETH/USDT", "SOL/USDT", "BNB/USDT", "XRP/USDT", "ADA/USDT",
];

/// Inclusive range a signal fraction has to fall into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Parameters of the DCA bot created when a SmartTrade is rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct DcaSettings {
    /// Safety order volume as a fraction of the base order.
    pub safety_order_multiplier: f64,
    pub safety_order_step_percentage: f64,
    pub max_safety_orders: u32,
    pub active_safety_orders: u32,
    pub martingale_volume_coefficient: f64,
    pub martingale_step_coefficient: f64,
    pub cooldown: Duration,
    pub start_after_create: bool,
}

impl Default for DcaSettings {
    fn default() -> Self {
        Self {
            safety_order_multiplier: 0.5,
            safety_order_step_percentage: 2.5,
            max_safety_orders: 10,
            active_safety_orders: 10,
            martingale_volume_coefficient: 1.2,
            martingale_step_coefficient: 1.0,
            cooldown: Duration::from_secs(300),
            start_after_create: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TradingConfig {
    pub pairs: Vec<String>,
    pub take_profit: Bounds,
    pub stop_loss: Bounds,
    pub base_order_size: f64,
    pub dca: DcaSettings,
    pub base_url: String,
    pub request_timeout: Duration,
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            pairs: TRADING_PAIRS.iter().map(|p| p.to_string()).collect(),
            take_profit: Bounds::new(0.25, 0.35),
            stop_loss: Bounds::new(0.10, 0.20),
            base_order_size: 50.0,
            dca: DcaSettings::default(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl TradingConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the defaults and applies the overrides `lookup` knows about.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("THREE_COMMAS_BASE_URL").filter(|v| !v.trim().is_empty()) {
            config.base_url = url.trim_end_matches('/').to_string();
        }

        if let Some(raw) = lookup("BASE_ORDER_SIZE") {
            config.base_order_size = raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|size| *size >= MIN_ORDER_SIZE)
                .ok_or(ConfigError::InvalidValue {
                    name: "BASE_ORDER_SIZE",
                    value: raw.clone(),
                })?;
        }

        if let Some(raw) = lookup("THREE_COMMAS_TIMEOUT_SECS") {
            let secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidValue {
                    name: "THREE_COMMAS_TIMEOUT_SECS",
                    value: raw.clone(),
                })?;
            config.request_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    pub fn is_supported_pair(&self, pair: &str) -> bool {
        self.pairs.iter().any(|p| p == pair)
    }
}

/// API credentials and the account trades are opened on.
#[derive(Clone, PartialEq)]
pub struct Credentials {
    pub api_key: String,
    pub api_secret: String,
    pub account_id: u64,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"***")
            .field("api_secret", &"***")
            .field("account_id", &self.account_id)
            .finish()
    }
}

impl Credentials {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Every absent or blank variable is reported at once.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_key = read(API_KEY_VAR);
        let api_secret = read(API_SECRET_VAR);
        let account_id = read(ACCOUNT_ID_VAR);

        let missing: Vec<&'static str> = [
            (API_KEY_VAR, api_key.is_none()),
            (API_SECRET_VAR, api_secret.is_none()),
            (ACCOUNT_ID_VAR, account_id.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, absent)| absent.then_some(name))
        .collect();

        match (api_key, api_secret, account_id) {
            (Some(api_key), Some(api_secret), Some(account_id)) => {
                let account_id = account_id
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidAccountId(account_id.clone()))?;
                Ok(Self {
                    api_key,
                    api_secret,
                    account_id,
                })
            }
            _ => Err(ConfigError::MissingVariables(missing)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host: IpAddr = match lookup("HOST") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                name: "HOST",
                value: raw.clone(),
            })?,
            None => IpAddr::from([0, 0, 0, 0]),
        };

        let port: u16 = match lookup("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                name: "PORT",
                value: raw.clone(),
            })?,
            None => 5000,
        };

        Ok(Self { host, port })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
