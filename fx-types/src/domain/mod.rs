//! Domain models for the exchange-rate service.

pub mod cache;
pub mod config;

pub use cache::CachedRates;
pub use config::RateStoreConfig;
