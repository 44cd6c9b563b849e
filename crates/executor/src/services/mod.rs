pub mod execution_service;
