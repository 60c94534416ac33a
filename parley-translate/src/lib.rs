//! Translation client for the message pipeline.
//!
//! [`TranslationClient`] validates a [`TranslateRequest`], looks it up in an
//! optional [`CacheStore`](parley_cache::CacheStore), and otherwise calls a
//! [`TranslationProvider`] within a timeout that also races a cancellation
//! token. [`HttpTranslationProvider`] talks to the Azure AI Translator text
//! API; tests substitute their own provider.
//!
//! ```no_run
//! use parley_translate::*;
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! # #[tokio::main]
//! # async fn main() -> TranslateResult<()> {
//! let provider = HttpTranslationProvider::new(
//!     ProviderConfig::new("https://my-resource.cognitiveservices.azure.com", "key")
//!         .with_region("westeurope"),
//! )?;
//! let client = TranslationClient::new(Arc::new(provider), ClientConfig::default());
//!
//! let request = TranslateRequest::for_languages("Cześć", "auto", ["en", "de"], "gpt-4o-mini", None);
//! let response = client.translate(&request, &CancellationToken::new()).await?;
//! println!("{:?}", response.translations);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod dto;
pub mod error;
pub mod provider;

pub use client::{REQUIRED_TARGET, TranslationClient, cache_key};
pub use config::{ClientConfig, DEFAULT_API_VERSION, ProviderConfig};
pub use dto::{
    AUTO, DetectedLanguage, ProviderInput, ProviderItem, ProviderRequest, ProviderResponse,
    ProviderTarget, ProviderTranslation, SourceLanguage, TranslateRequest, TranslateResponse,
    TranslateTarget,
};
pub use error::{TranslateError, TranslateResult};
pub use provider::{HttpTranslationProvider, TranslationProvider};
