//! Translation provider seam and the HTTP implementation.

use crate::config::ProviderConfig;
use crate::dto::{ProviderRequest, ProviderResponse};
use crate::error::{TranslateError, TranslateResult};
use async_trait::async_trait;
use tracing::debug;

/// Something that can execute a [`ProviderRequest`].
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    async fn translate(&self, request: &ProviderRequest) -> TranslateResult<ProviderResponse>;
}

/// Provider speaking the Azure AI Translator text API over HTTPS.
#[derive(Clone)]
pub struct HttpTranslationProvider {
    inner: reqwest::Client,
    config: ProviderConfig,
}

impl HttpTranslationProvider {
    pub fn new(config: ProviderConfig) -> TranslateResult<Self> {
        let inner = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("parley-translate/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TranslateError::Transport(e.to_string()))?;

        Ok(Self { inner, config })
    }

    /// Wrap an existing reqwest client.
    pub fn with_client(inner: reqwest::Client, config: ProviderConfig) -> Self {
        Self { inner, config }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn map_error(&self, err: reqwest::Error) -> TranslateError {
        if err.is_timeout() {
            TranslateError::Timeout(self.config.timeout)
        } else {
            err.into()
        }
    }
}

#[async_trait]
impl TranslationProvider for HttpTranslationProvider {
    async fn translate(&self, request: &ProviderRequest) -> TranslateResult<ProviderResponse> {
        if !self.config.is_configured() {
            return Err(TranslateError::MissingEndpoint);
        }

        let mut builder = self
            .inner
            .post(self.config.translate_url())
            .query(&[("api-version", self.config.api_version.as_str())])
            .header("Ocp-Apim-Subscription-Key", &self.config.api_key)
            .json(request);

        if let Some(region) = &self.config.region {
            builder = builder.header("Ocp-Apim-Subscription-Region", region);
        }

        let response = builder.send().await.map_err(|e| self.map_error(e))?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(status = status.as_u16(), body = %body, "translation provider rejected request");
            return Err(TranslateError::Http {
                status: status.as_u16(),
            });
        }

        response
            .json::<ProviderResponse>()
            .await
            .map_err(|e| self.map_error(e))
    }
}
