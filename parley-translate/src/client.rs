//! Cache-aware translation client.

use crate::config::ClientConfig;
use crate::dto::{AUTO, TranslateRequest, TranslateResponse};
use crate::error::{TranslateError, TranslateResult};
use crate::provider::TranslationProvider;
use parley_cache::{CacheStore, TranslationCacheKey, get_typed, set_typed};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Language every request must include.
pub const REQUIRED_TARGET: &str = "en";

/// Validates requests, consults the cache and calls the provider.
///
/// The client never retries; failures are returned as they happened.
#[derive(Clone)]
pub struct TranslationClient {
    provider: Arc<dyn TranslationProvider>,
    cache: Option<Arc<dyn CacheStore>>,
    config: ClientConfig,
}

impl TranslationClient {
    pub fn new(provider: Arc<dyn TranslationProvider>, config: ClientConfig) -> Self {
        Self {
            provider,
            cache: None,
            config,
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn CacheStore>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Translate `request`, honouring `cancel` while waiting on the provider.
    pub async fn translate(
        &self,
        request: &TranslateRequest,
        cancel: &CancellationToken,
    ) -> TranslateResult<TranslateResponse> {
        validate(request)?;

        let key = cache_key(request);
        if !request.force_refresh
            && let Some(hit) = self.cached(&key).await
        {
            debug!(key = %key, "translation served from cache");
            return Ok(TranslateResponse {
                from_cache: true,
                ..hit
            });
        }

        let provider_request = request.to_provider_request();
        let timeout = self.config.provider_timeout;
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(TranslateError::Cancelled),
            result = tokio::time::timeout(timeout, self.provider.translate(&provider_request)) => result,
        };

        let response = result
            .map_err(|_| TranslateError::Timeout(timeout))??
            .into_response(&request.source_language)
            .ok_or_else(|| TranslateError::Decode("response contained no items".to_string()))?;

        self.store(&key, &response).await;
        Ok(response)
    }

    async fn cached(&self, key: &str) -> Option<TranslateResponse> {
        let cache = self.cache.as_ref()?;
        match get_typed::<TranslateResponse>(cache.as_ref(), key).await {
            Ok(hit) => hit,
            Err(e) => {
                warn!(key = %key, error = %e, "translation cache read failed");
                None
            }
        }
    }

    async fn store(&self, key: &str, response: &TranslateResponse) {
        let Some(cache) = &self.cache else {
            return;
        };
        if let Err(e) = set_typed(cache.as_ref(), key, response, Some(self.config.cache_ttl)).await {
            warn!(key = %key, error = %e, "translation cache write failed");
        }
    }
}

fn validate(request: &TranslateRequest) -> TranslateResult<()> {
    if request.targets.is_empty() {
        return Err(TranslateError::InvalidArgument(
            "at least one target language is required".to_string(),
        ));
    }

    if let Some(target) = request
        .targets
        .iter()
        .find(|t| t.language.trim().is_empty() || t.language.trim().eq_ignore_ascii_case(AUTO))
    {
        return Err(TranslateError::InvalidArgument(format!(
            "target language {:?} cannot be auto-detect",
            target.language
        )));
    }

    if !request
        .targets
        .iter()
        .any(|t| t.language.trim().eq_ignore_ascii_case(REQUIRED_TARGET))
    {
        return Err(TranslateError::InvalidArgument(format!(
            "target languages must include {:?}",
            REQUIRED_TARGET
        )));
    }

    Ok(())
}

/// Cache key of a request.
pub fn cache_key(request: &TranslateRequest) -> String {
    request
        .targets
        .iter()
        .fold(
            TranslationCacheKey::new(request.text.as_str(), request.source_language.as_str()),
            |key, t| key.target(&t.language, &t.deployment_name, t.tone.as_deref()),
        )
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::{ProviderItem, ProviderRequest, ProviderResponse, ProviderTranslation, TranslateTarget};
    use async_trait::async_trait;
    use parley_cache::InMemoryCache;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    struct CountingProvider {
        calls: AtomicUsize,
        delay: Option<Duration>,
    }

    #[async_trait]
    impl TranslationProvider for CountingProvider {
        async fn translate(&self, request: &ProviderRequest) -> TranslateResult<ProviderResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            let input = &request.inputs[0];
            Ok(ProviderResponse {
                value: vec![ProviderItem {
                    detected_language: None,
                    translations: input
                        .targets
                        .iter()
                        .map(|t| ProviderTranslation {
                            language: t.language.clone(),
                            text: format!("[{}] {}", t.language, input.text),
                        })
                        .collect(),
                }],
            })
        }
    }

    fn client(provider: Arc<CountingProvider>) -> TranslationClient {
        TranslationClient::new(provider, ClientConfig::default())
            .with_cache(Arc::new(InMemoryCache::new()))
    }

    fn hello() -> TranslateRequest {
        TranslateRequest::for_languages("Hello", "auto", ["en", "pl"], "gpt-4o-mini", None)
    }

    #[tokio::test]
    async fn test_auto_target_rejected_without_provider_call() {
        let provider = Arc::new(CountingProvider::default());
        let request = TranslateRequest::for_languages("Hello", "auto", ["en", "auto"], "d", None);

        let err = client(provider.clone())
            .translate(&request, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, TranslateError::InvalidArgument(_)));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_english_is_required() {
        let provider = Arc::new(CountingProvider::default());
        let request = TranslateRequest::for_languages("Hello", "auto", ["pl"], "d", None);

        let err = client(provider.clone())
            .translate(&request, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, TranslateError::InvalidArgument(_)));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_second_call_is_served_from_cache() {
        let provider = Arc::new(CountingProvider::default());
        let client = client(provider.clone());
        let token = CancellationToken::new();

        let first = client.translate(&hello(), &token).await.unwrap();
        let second = client.translate(&hello(), &token).await.unwrap();

        assert!(!first.from_cache);
        assert!(second.from_cache);
        assert_eq!(first.translations, second.translations);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_force_refresh_bypasses_cache() {
        let provider = Arc::new(CountingProvider::default());
        let client = client(provider.clone());
        let token = CancellationToken::new();

        client.translate(&hello(), &token).await.unwrap();
        let refreshed = client
            .translate(&hello().force_refresh(true), &token)
            .await
            .unwrap();

        assert!(!refreshed.from_cache);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_works_without_cache() {
        let provider = Arc::new(CountingProvider::default());
        let client = TranslationClient::new(provider.clone(), ClientConfig::default());
        let token = CancellationToken::new();

        client.translate(&hello(), &token).await.unwrap();
        client.translate(&hello(), &token).await.unwrap();
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_provider_timeout() {
        let provider = Arc::new(CountingProvider {
            delay: Some(Duration::from_secs(60)),
            ..Default::default()
        });
        let client = TranslationClient::new(
            provider,
            ClientConfig::default().with_provider_timeout(Duration::from_secs(5)),
        );

        let err = client
            .translate(&hello(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, TranslateError::Timeout(d) if d == Duration::from_secs(5)));
    }

    #[tokio::test]
    async fn test_cancelled_before_provider_answers() {
        let provider = Arc::new(CountingProvider {
            delay: Some(Duration::from_secs(60)),
            ..Default::default()
        });
        let client = client(provider);
        let token = CancellationToken::new();
        token.cancel();

        let err = client.translate(&hello(), &token).await.unwrap_err();
        assert!(matches!(err, TranslateError::Cancelled));
    }

    #[test]
    fn test_cache_key_ignores_target_order() {
        let a = TranslateRequest::new("Hi", "auto")
            .with_target(TranslateTarget::new("en", "d"))
            .with_target(TranslateTarget::new("pl", "d"));
        let b = TranslateRequest::new("Hi", "auto")
            .with_target(TranslateTarget::new("pl", "d"))
            .with_target(TranslateTarget::new("en", "d"));
        assert_eq!(cache_key(&a), cache_key(&b));
    }
}
