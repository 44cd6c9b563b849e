use async_trait::async_trait;
use common::{Credentials, TradingConfig};
use reqwest::{Client, Method};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, info};

use crate::error::RelayError;
use crate::remote::payloads::{DcaBotRequest, SmartTradeRequest};
use crate::remote::responses::{AccountResponse, BotResponse, SmartTradeResponse};
use crate::signer::{RequestSigner, encode_query};
use crate::traits::ExchangeApi;

pub const ACCOUNTS_PATH: &str = "/public/api/ver1/accounts";
pub const SMART_TRADES_PATH: &str = "/public/api/v2/smart_trades";
pub const BOTS_PATH: &str = "/public/api/ver1/bots";
pub const CREATE_BOT_PATH: &str = "/public/api/ver1/bots/create_bot";

#[derive(Clone)]
pub struct ThreeCommasClient {
    client: Client,
    base_url: String,
    api_key: String,
    signer: RequestSigner,
}

impl ThreeCommasClient {
    pub fn new(credentials: &Credentials, config: &TradingConfig) -> Result<Self, RelayError> {
        let client = Client::builder()
            .user_agent("signal_executor/0.1.0")
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| RelayError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: credentials.api_key.clone(),
            signer: RequestSigner::new(credentials.api_secret.clone()),
        })
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> Result<Value, RelayError> {
        let signed = self.signer.sign(&method, path, query);

        let query_string = encode_query(query);
        let url = if query_string.is_empty() {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}{}?{}", self.base_url, path, query_string)
        };

        let mut request = self
            .client
            .request(method.clone(), &url)
            .header("APIKEY", &self.api_key)
            .header("Signature", &signed.signature)
            .header("Timestamp", &signed.timestamp)
            .header("Content-Type", "application/json");
        if let Some(body) = body {
            request = request.json(&body);
        }

        let resp = request.send().await.map_err(|e| {
            error!("Request error to 3Commas API: {} {} - {}", method, path, e);
            RelayError::Network(e)
        })?;

        let status = resp.status();
        info!("3Commas API: {} {} - Status: {}", method, path, status);

        let text = resp.text().await?;
        if !status.is_success() {
            error!("3Commas API error: {} - {}", status, text);
            return Err(RelayError::Remote { status, body: text });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(|e| {
            error!("Undecodable 3Commas response for {} {}: {}", method, path, e);
            RelayError::MalformedResponse(e.to_string())
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, RelayError> {
        let value = self.send(Method::GET, path, query, None).await?;
        serde_json::from_value(value).map_err(|e| RelayError::MalformedResponse(e.to_string()))
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value, RelayError> {
        let body = serde_json::to_value(body).map_err(|e| RelayError::MalformedResponse(e.to_string()))?;
        debug!("POST {} body: {}", path, body);
        self.send(Method::POST, path, &[], Some(body)).await
    }
}

#[async_trait]
impl ExchangeApi for ThreeCommasClient {
    async fn accounts(&self) -> Result<Vec<AccountResponse>, RelayError> {
        self.get(ACCOUNTS_PATH, &[]).await
    }

    async fn create_smart_trade(&self, order: &SmartTradeRequest) -> Result<Value, RelayError> {
        self.post(SMART_TRADES_PATH, order).await
    }

    async fn create_bot(&self, bot: &DcaBotRequest) -> Result<Value, RelayError> {
        self.post(CREATE_BOT_PATH, bot).await
    }

    async fn enable_bot(&self, bot_id: u64) -> Result<Value, RelayError> {
        let path = format!("{}/{}/enable", BOTS_PATH, bot_id);
        self.send(Method::POST, &path, &[], None).await
    }

    async fn smart_trades(
        &self,
        account_id: u64,
        limit: usize,
    ) -> Result<Vec<SmartTradeResponse>, RelayError> {
        let query = [("account_id", account_id.to_string()), ("limit", limit.to_string())];
        self.get(SMART_TRADES_PATH, &query).await
    }

    async fn bots(&self, account_id: u64, limit: usize) -> Result<Vec<BotResponse>, RelayError> {
        let query = [("account_id", account_id.to_string()), ("limit", limit.to_string())];
        self.get(BOTS_PATH, &query).await
    }
}
