// Configuration validation

use crate::{ConfigError, Result};

/// Trait for validating configuration
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Reusable validation rules
pub struct ConfigValidator;

impl ConfigValidator {
    pub fn not_empty(value: &str, field: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "{} cannot be empty",
                field
            )));
        }
        Ok(())
    }

    pub fn in_range<T: PartialOrd + std::fmt::Display>(
        value: T,
        min: T,
        max: T,
        field: &str,
    ) -> Result<()> {
        if value < min || value > max {
            return Err(ConfigError::ValidationError(format!(
                "{} must be between {} and {} (got {})",
                field, min, max, value
            )));
        }
        Ok(())
    }

    pub fn is_url(value: &str, field: &str) -> Result<()> {
        if !value.starts_with("http://") && !value.starts_with("https://") {
            return Err(ConfigError::ValidationError(format!(
                "{} must be an http(s) URL",
                field
            )));
        }
        Ok(())
    }

    pub fn is_redis_url(value: &str, field: &str) -> Result<()> {
        if !value.starts_with("redis://")
            && !value.starts_with("rediss://")
            && !value.starts_with("redis+unix://")
        {
            return Err(ConfigError::ValidationError(format!(
                "{} must be a redis:// or rediss:// URL",
                field
            )));
        }
        Ok(())
    }

    pub fn contains(values: &[String], required: &str, field: &str) -> Result<()> {
        if !values.iter().any(|v| v.trim().eq_ignore_ascii_case(required)) {
            return Err(ConfigError::ValidationError(format!(
                "{} must include \"{}\"",
                field, required
            )));
        }
        Ok(())
    }
}
