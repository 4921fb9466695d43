//! Port traits (interfaces for adapters).
//!
//! These are the contracts that adapters must implement.
//! The application layer depends on these traits, not concrete implementations.

mod geo;
mod provider;
mod store;

pub use geo::GeoLocator;
pub use provider::{ProviderError, ProviderQuotes, RateProvider};
pub use store::KeyValueStore;
