//! HTTP Inbound Adapter
//!
//! Axum-based HTTP server that exposes the currency service.

mod handlers;
mod rate_limit;
mod server;

pub use rate_limit::RateLimiterState;
pub use server::HttpServer;
