//! IP geolocation port.

use super::ProviderError;

/// Resolves the caller's country from its network location.
#[async_trait::async_trait]
pub trait GeoLocator: Send + Sync {
    /// Returns an ISO 3166-1 alpha-2 country code.
    async fn country_code(&self) -> Result<String, ProviderError>;
}
