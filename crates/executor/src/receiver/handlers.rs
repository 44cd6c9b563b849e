use std::any::Any;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{Instrument, error, info_span};
use uuid::Uuid;

use super::error::ApiError;
use super::{SERVICE_NAME, SharedService, timestamp};
use crate::services::execution_service::SignalReply;

const DEFAULT_TRADES_LIMIT: usize = 10;
const MAX_TRADES_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
pub struct TradesQuery {
    pub limit: Option<usize>,
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": timestamp(),
    }))
}

pub async fn tv_signal(State(service): State<SharedService>, body: Bytes) -> Result<Json<Value>, ApiError> {
    let request_id = Uuid::new_v4();
    let reply = service
        .process(&body)
        .instrument(info_span!("signal", %request_id))
        .await?;

    let body = match reply {
        SignalReply::Executed(execution) => json!({
            "status": "success",
            "message": execution.message,
            "trade_id": execution.remote_id,
            "type": execution.kind,
            "timestamp": timestamp(),
        }),
        SignalReply::Acknowledged { pair } => json!({
            "status": "acknowledged",
            "message": format!("HOLD signal received for {}, no action taken", pair),
            "timestamp": timestamp(),
        }),
        SignalReply::TestAcknowledged => json!({
            "status": "test_acknowledged",
            "message": "Test signal received successfully",
            "timestamp": timestamp(),
        }),
    };

    Ok(Json(body))
}

pub async fn status(State(service): State<SharedService>) -> Result<Json<Value>, ApiError> {
    let account_info = service.account_status().await?;

    Ok(Json(json!({
        "status": "operational",
        "account_info": account_info,
        "supported_pairs": service.supported_pairs(),
        "timestamp": timestamp(),
    })))
}

pub async fn trades(
    State(service): State<SharedService>,
    query: Option<Query<TradesQuery>>,
) -> Result<Json<Value>, ApiError> {
    let limit = query
        .and_then(|Query(q)| q.limit)
        .unwrap_or(DEFAULT_TRADES_LIMIT)
        .clamp(1, MAX_TRADES_LIMIT);

    let trades = service.recent_trades(limit).await?;

    Ok(Json(json!({
        "trades": trades,
        "timestamp": timestamp(),
    })))
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// Last-resort response for a handler that panicked.
pub fn panicked(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");
    error!("Unexpected error handling request: {}", detail);

    ApiError::Internal.into_response()
}
