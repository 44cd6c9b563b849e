pub mod error;
pub mod remote;
pub mod services;
pub mod signer;
pub mod traits;

pub use error::RelayError;
pub use remote::ThreeCommasClient;
pub use services::relay_service::RelayService;
pub use traits::{ExchangeApi, TradeRelay};
