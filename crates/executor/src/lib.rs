pub mod receiver;
pub mod services;

pub use receiver::{router, serve};
pub use services::execution_service::ExecutionService;
