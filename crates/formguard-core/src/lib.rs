//! # Formguard Core
//!
//! The domain layer of Formguard: rate limit buckets, client identifiers,
//! limiter results and the ports infrastructure must implement.
//! This crate contains pure logic with zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;

pub use error::{ConfigError, DomainError};
