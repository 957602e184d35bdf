//! Screenbook Core — domain models, repository traits and gateway
//! traits shared by every crate in the workspace.
//!
//! Nothing in this crate talks to a database, a network or a file
//! system. Persistence lives behind [`repository`] traits, outbound
//! collaborators (SMS provider, file storage, OTP verification,
//! download link signing) behind [`gateway`] traits.

pub mod context;
pub mod error;
pub mod gateway;
pub mod models;
pub mod repository;
