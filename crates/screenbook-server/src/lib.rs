//! Screenbook Server — HTTP API over the booking, result and account
//! services, plus the SMS and file storage adapters they run on.

pub mod api;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod sms;
pub mod state;
pub mod storage;

pub use config::ServerConfig;
pub use error::ApiError;
pub use routes::build_router;
pub use state::AppState;
