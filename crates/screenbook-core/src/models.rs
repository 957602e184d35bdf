//! Domain models for Screenbook.
//!
//! These are the core types shared across all crates.

pub mod admin;
pub mod booking;
pub mod event;
pub mod otp;
pub mod participant;
pub mod profile;
pub mod result;
