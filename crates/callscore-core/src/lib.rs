//! Core types and trait definitions for the callscore earnings store.
//!
//! This crate is deliberately free of database and I/O dependencies.
//! All other crates depend on it; it depends on nothing heavier than
//! serde and chrono.

pub mod analysis;
pub mod correlation;
pub mod error;
pub mod movement;
pub mod score;
pub mod store;
pub mod transcript;
pub mod validate;

pub use error::{Error, Result};
