//! QuantSafe Core - PQC service logic shared by the HTTP and CLI frontends

pub mod error;
pub mod pool;
pub mod service;
pub mod wire;

pub use error::{Result, ServiceError};
pub use pool::CryptoPool;
pub use service::PqcService;
