//! Screenbook Database — SurrealDB connection management and repository
//! implementations.
//!
//! This crate provides:
//! - Connection management ([`DbManager`], [`DbConfig`])
//! - Schema initialization and migrations ([`run_migrations`])
//! - Error types ([`DbError`])
//! - Repository implementations for every `screenbook-core` trait

mod connection;
mod error;
pub mod repository;
mod schema;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use repository::{
    SurrealAdminRepository, SurrealBookingRepository, SurrealEventRepository,
    SurrealOtpRepository, SurrealParticipantRepository, SurrealResultRepository, verify_password,
};
pub use schema::{run_migrations, schema_v1};
