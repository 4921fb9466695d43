//! # FX Types
//!
//! Domain types and port traits for the exchange-rate service.
//! This crate has ZERO external IO dependencies - only data structures,
//! configuration values, and trait definitions.
//!
//! ## Architecture
//!
//! - `domain/` - Store configuration and the persisted cache entry
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Data Transfer Objects for API boundaries
//! - `error/` - Store and application error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{CachedRates, RateStoreConfig};
pub use dto::*;
pub use error::{AppError, StoreError};
pub use exchange_rates::{Currency, FormatOptions, Locale, RateSnapshot};
pub use ports::{GeoLocator, KeyValueStore, ProviderError, ProviderQuotes, RateProvider};
