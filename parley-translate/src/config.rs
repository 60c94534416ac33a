//! Provider and client configuration.

use std::time::Duration;

/// Default provider API version.
pub const DEFAULT_API_VERSION: &str = "2025-05-01-preview";

/// HTTP provider configuration.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Base URL of the translator resource. Empty means unconfigured.
    pub endpoint: String,
    /// Subscription key sent as `Ocp-Apim-Subscription-Key`.
    pub api_key: String,
    /// Resource region sent as `Ocp-Apim-Subscription-Region`.
    pub region: Option<String>,
    pub api_version: String,
    /// Transport-level request timeout.
    pub timeout: Duration,
}

impl ProviderConfig {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            region: None,
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: Duration::from_secs(20),
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Whether an endpoint has been configured.
    pub fn is_configured(&self) -> bool {
        !self.endpoint.trim().is_empty()
    }

    /// Full translate URL, without the query string.
    pub fn translate_url(&self) -> String {
        format!(
            "{}/translator/text/translate",
            self.endpoint.trim().trim_end_matches('/')
        )
    }
}

/// [`TranslationClient`](crate::TranslationClient) configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Upper bound on one provider call.
    pub provider_timeout: Duration,
    /// Lifetime of cache entries written after a provider call.
    pub cache_ttl: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            provider_timeout: Duration::from_secs(20),
            cache_ttl: Duration::from_secs(86_400),
        }
    }
}

impl ClientConfig {
    pub fn with_provider_timeout(mut self, timeout: Duration) -> Self {
        self.provider_timeout = timeout;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_url_trims_slash() {
        let config = ProviderConfig::new("https://example.cognitiveservices.azure.com/", "key");
        assert_eq!(
            config.translate_url(),
            "https://example.cognitiveservices.azure.com/translator/text/translate"
        );
    }

    #[test]
    fn test_unconfigured_endpoint() {
        assert!(!ProviderConfig::new("  ", "key").is_configured());
        assert!(ProviderConfig::new("https://x", "key").is_configured());
    }
}
