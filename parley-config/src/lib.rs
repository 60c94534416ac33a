//! Configuration for the Parley translation pipeline.
//!
//! Settings are layered, later layers winning:
//!
//! 1. [`PipelineSettings::default`]
//! 2. an optional settings file (JSON, TOML or `.env` style)
//! 3. an optional `.env` file loaded into the process environment
//! 4. `PARLEY_*` environment variables
//!
//! ```no_run
//! use parley_config::SettingsLoader;
//!
//! let settings = SettingsLoader::new()
//!     .with_file("parley.toml")
//!     .with_dotenv()
//!     .load()?;
//! assert!(settings.max_concurrent_jobs > 0);
//! # Ok::<(), parley_config::ConfigError>(())
//! ```

pub mod env;
pub mod error;
pub mod loader;
pub mod validation;

pub use env::EnvLoader;
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat};
pub use validation::{ConfigValidator, Validate};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Every tunable of the translation pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Master switch for the translation feature
    pub enabled: bool,
    pub queue_name: String,
    pub redis_url: String,
    /// Prefix for every Redis key the pipeline owns
    pub key_prefix: String,
    pub max_concurrent_jobs: usize,
    pub max_retries: u32,
    /// Minimum delay before an automatically retried job is picked up again
    pub retry_delay_seconds: u64,
    /// Upper bound for one job's translate call, including cache access
    pub job_timeout_seconds: u64,
    /// Pause after an empty dequeue
    pub poll_interval_ms: u64,
    pub endpoint: String,
    pub api_key: String,
    pub region: Option<String>,
    pub api_version: String,
    pub deployment_name: String,
    pub tone: Option<String>,
    /// Timeout of the outbound HTTP request itself
    pub provider_timeout_seconds: u64,
    pub cache_ttl_seconds: u64,
    /// Priority given to jobs re-queued through manual retry
    pub manual_retry_priority: i32,
    /// Targets used when a message does not carry its own list
    pub default_target_languages: Vec<String>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            queue_name: "translation-jobs".to_string(),
            redis_url: "redis://localhost:6379".to_string(),
            key_prefix: "parley".to_string(),
            max_concurrent_jobs: 4,
            max_retries: 3,
            retry_delay_seconds: 5,
            job_timeout_seconds: 30,
            poll_interval_ms: 500,
            endpoint: String::new(),
            api_key: String::new(),
            region: None,
            api_version: "2025-05-01-preview".to_string(),
            deployment_name: "gpt-4o-mini".to_string(),
            tone: None,
            provider_timeout_seconds: 20,
            cache_ttl_seconds: 86_400,
            manual_retry_priority: 10,
            default_target_languages: vec!["en".to_string()],
        }
    }
}

impl PipelineSettings {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_seconds)
    }

    pub fn job_timeout(&self) -> Duration {
        Duration::from_secs(self.job_timeout_seconds)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_seconds)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }
}

impl Validate for PipelineSettings {
    fn validate(&self) -> Result<()> {
        ConfigValidator::not_empty(&self.queue_name, "queue_name")?;
        ConfigValidator::not_empty(&self.key_prefix, "key_prefix")?;
        ConfigValidator::is_redis_url(&self.redis_url, "redis_url")?;
        ConfigValidator::in_range(self.max_concurrent_jobs, 1, 256, "max_concurrent_jobs")?;
        ConfigValidator::in_range(self.max_retries, 0, 100, "max_retries")?;
        ConfigValidator::in_range(self.job_timeout_seconds, 1, 3600, "job_timeout_seconds")?;
        ConfigValidator::in_range(
            self.provider_timeout_seconds,
            1,
            3600,
            "provider_timeout_seconds",
        )?;
        ConfigValidator::not_empty(&self.deployment_name, "deployment_name")?;
        ConfigValidator::contains(
            &self.default_target_languages,
            "en",
            "default_target_languages",
        )?;

        // An empty endpoint is allowed here; jobs then fail as MissingEndpoint.
        if !self.endpoint.is_empty() {
            ConfigValidator::is_url(&self.endpoint, "endpoint")?;
        }

        Ok(())
    }
}

/// Builds [`PipelineSettings`] from the configured layers.
#[derive(Debug, Clone)]
pub struct SettingsLoader {
    file: Option<PathBuf>,
    dotenv: bool,
    prefix: String,
    overrides: Option<Vec<(String, String)>>,
}

impl SettingsLoader {
    pub fn new() -> Self {
        Self {
            file: None,
            dotenv: false,
            prefix: "PARLEY".to_string(),
            overrides: None,
        }
    }

    /// Read a settings file; the format follows the extension.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Load `.env` from the working directory, if present.
    pub fn with_dotenv(mut self) -> Self {
        self.dotenv = true;
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Use these variables instead of the process environment.
    pub fn with_env_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.overrides = Some(
            vars.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Merge every layer, deserialize and validate.
    pub fn load(&self) -> Result<PipelineSettings> {
        let mut merged = serde_json::to_value(PipelineSettings::default())
            .map_err(|e| ConfigError::SerializationError(e.to_string()))?;

        if let Some(path) = &self.file {
            let file_value = ConfigLoader::auto(path)?.load_file(path)?;
            merge(&mut merged, file_value);
            tracing::debug!(path = %path.display(), "loaded settings file");
        }

        if self.dotenv
            && let Err(e) = dotenvy::dotenv()
        {
            tracing::debug!(error = %e, "no .env file loaded");
        }

        let env_loader = EnvLoader::new(self.prefix.clone());
        let env_vars = match &self.overrides {
            Some(vars) => env_loader.load_from(vars.clone()),
            None => env_loader.load(),
        };
        apply_env(&mut merged, env_vars);

        let settings: PipelineSettings = serde_json::from_value(merged)
            .map_err(|e| ConfigError::DeserializationError(e.to_string()))?;

        settings.validate()?;
        Ok(settings)
    }
}

impl Default for SettingsLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn merge(base: &mut Value, overlay: Value) {
    if let (Value::Object(base), Value::Object(overlay)) = (base, overlay) {
        for (key, value) in overlay {
            base.insert(key, value);
        }
    }
}

// Environment values are strings; coerce them using the type of the current value.
fn apply_env(base: &mut Value, vars: HashMap<String, String>) {
    let Value::Object(map) = base else {
        return;
    };

    for (key, raw) in vars {
        let Some(current) = map.get(&key) else {
            continue;
        };

        let coerced = match current {
            Value::Bool(_) => match raw.to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Value::Bool(true),
                "0" | "false" | "no" | "off" => Value::Bool(false),
                _ => Value::String(raw),
            },
            Value::Number(_) => serde_json::from_str::<serde_json::Number>(raw.trim())
                .map(Value::Number)
                .unwrap_or(Value::String(raw)),
            Value::Array(_) => Value::Array(
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(|s| Value::String(s.to_string()))
                    .collect(),
            ),
            _ => Value::String(raw),
        };

        map.insert(key, coerced);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn no_env() -> Vec<(String, String)> {
        Vec::new()
    }

    #[test]
    fn test_defaults_are_valid() {
        let settings = PipelineSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.default_target_languages, vec!["en".to_string()]);
        assert_eq!(settings.job_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_env_overrides_are_coerced() {
        let settings = SettingsLoader::new()
            .with_env_vars([
                ("PARLEY_ENABLED", "false"),
                ("PARLEY_MAX_RETRIES", "7"),
                ("PARLEY_API_KEY", "12345"),
                ("PARLEY_REGION", "westeurope"),
                ("PARLEY_DEFAULT_TARGET_LANGUAGES", "en, pl,de"),
                ("PARLEY_UNKNOWN_SETTING", "ignored"),
            ])
            .load()
            .unwrap();

        assert!(!settings.enabled);
        assert_eq!(settings.max_retries, 7);
        assert_eq!(settings.api_key, "12345");
        assert_eq!(settings.region.as_deref(), Some("westeurope"));
        assert_eq!(settings.default_target_languages, vec!["en", "pl", "de"]);
    }

    #[test]
    fn test_invalid_number_is_rejected() {
        let result = SettingsLoader::new()
            .with_env_vars([("PARLEY_MAX_CONCURRENT_JOBS", "many")])
            .load();
        assert!(matches!(result, Err(ConfigError::DeserializationError(_))));
    }

    #[test]
    fn test_validation_requires_english_target() {
        let result = SettingsLoader::new()
            .with_env_vars([("PARLEY_DEFAULT_TARGET_LANGUAGES", "pl,de")])
            .load();
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_file_then_env_layering() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
            queue_name = "chat-translations"
            max_concurrent_jobs = 8
            endpoint = "https://translator.example.com"
            "#
        )
        .unwrap();

        let settings = SettingsLoader::new()
            .with_file(file.path())
            .with_env_vars([("PARLEY_MAX_CONCURRENT_JOBS", "2")])
            .load()
            .unwrap();

        assert_eq!(settings.queue_name, "chat-translations");
        assert_eq!(settings.max_concurrent_jobs, 2);
        assert_eq!(settings.endpoint, "https://translator.example.com");
    }

    #[test]
    fn test_endpoint_must_be_url_when_set() {
        let mut settings = PipelineSettings::default();
        settings.endpoint = "translator.example.com".to_string();
        assert!(settings.validate().is_err());

        let settings = SettingsLoader::new().with_env_vars(no_env()).load().unwrap();
        assert!(settings.endpoint.is_empty());
    }
}
