//! # FX Hex
//!
//! Application layer and HTTP adapter for the exchange-rate service.
//!
//! ## Architecture
//!
//! - `rate_store/` - Rate snapshot ownership, cache, provider fallback
//! - `service/` - Consumer-facing currency service
//! - `worker/` - Background refresh timer
//! - `inbound/` - HTTP adapter (Axum server)
//!
//! Everything is generic over `S: KeyValueStore`, allowing different
//! cache backends to be injected.

pub mod inbound;
pub mod openapi;
pub mod rate_store;
pub mod service;
pub mod worker;


pub use rate_store::{RATES_CACHE_KEY, RateStore};
pub use service::{CurrencyService, PREFERENCE_KEY};
pub use worker::{RefreshHandle, RefreshWorker};
