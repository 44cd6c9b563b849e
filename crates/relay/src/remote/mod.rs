pub mod client;
pub mod payloads;
pub mod responses;

pub use client::ThreeCommasClient;
pub use payloads::{DcaBotRequest, SmartTradeRequest};
pub use responses::{AccountResponse, BotResponse, SmartTradeResponse};
