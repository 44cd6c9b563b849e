pub mod account;
pub mod signal;
pub mod trade;

pub use account::AccountInfo;
pub use signal::{InboundSignal, SignalKind, TradingSignal};
pub use trade::{Execution, ExecutionOutcome, TradeKind, TradeSummary, merge_recent};
