//! Request fingerprints for translation cache entries.

use sha2::{Digest, Sha256};

/// Prefix of every translation cache key.
pub const KEY_PREFIX: &str = "translation:";

/// Builder for the cache key of one translation request.
///
/// The key depends on the text, the normalized source language and the set of
/// `(language, deployment, tone)` targets; target order does not matter.
///
/// ```
/// use parley_cache::TranslationCacheKey;
///
/// let a = TranslationCacheKey::new("Hello", "auto")
///     .target("en", "gpt-4o-mini", None)
///     .target("pl", "gpt-4o-mini", None)
///     .build();
/// let b = TranslationCacheKey::new("Hello", "AUTO")
///     .target("pl", "gpt-4o-mini", None)
///     .target("en", "gpt-4o-mini", None)
///     .build();
/// assert_eq!(a, b);
/// assert!(a.starts_with("translation:"));
/// ```
#[derive(Debug, Clone)]
pub struct TranslationCacheKey {
    text: String,
    source_language: String,
    targets: Vec<(String, String, String)>,
}

impl TranslationCacheKey {
    pub fn new(text: impl Into<String>, source_language: &str) -> Self {
        Self {
            text: text.into(),
            source_language: normalize(source_language),
            targets: Vec::new(),
        }
    }

    pub fn target(mut self, language: &str, deployment_name: &str, tone: Option<&str>) -> Self {
        self.targets.push((
            normalize(language),
            deployment_name.trim().to_string(),
            tone.map(|t| t.trim().to_lowercase()).unwrap_or_default(),
        ));
        self
    }

    /// `translation:` followed by the hex SHA-256 digest.
    pub fn build(mut self) -> String {
        self.targets.sort();
        self.targets.dedup();

        let mut hasher = Sha256::new();
        field(&mut hasher, &self.text);
        field(&mut hasher, &self.source_language);
        for (language, deployment, tone) in &self.targets {
            field(&mut hasher, language);
            field(&mut hasher, deployment);
            field(&mut hasher, tone);
        }

        format!("{}{}", KEY_PREFIX, hex::encode(hasher.finalize()))
    }
}

// Length-prefixed so ("ab", "c") and ("a", "bc") hash differently.
fn field(hasher: &mut Sha256, value: &str) {
    hasher.update((value.len() as u64).to_be_bytes());
    hasher.update(value.as_bytes());
}

fn normalize(code: &str) -> String {
    let code = code.trim();
    if code.is_empty() {
        "auto".to_string()
    } else {
        code.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(text: &str, source: &str, tone: Option<&str>) -> String {
        TranslationCacheKey::new(text, source)
            .target("en", "gpt-4o-mini", tone)
            .target("pl", "gpt-4o-mini", tone)
            .build()
    }

    #[test]
    fn test_key_shape() {
        let k = key("Hello", "auto", None);
        assert!(k.starts_with(KEY_PREFIX));
        assert_eq!(k.len(), KEY_PREFIX.len() + 64);
    }

    #[test]
    fn test_key_is_stable() {
        assert_eq!(key("Hello", "auto", None), key("Hello", "auto", None));
    }

    #[test]
    fn test_key_varies_with_inputs() {
        let base = key("Hello", "auto", None);
        assert_ne!(base, key("Hello!", "auto", None));
        assert_ne!(base, key("Hello", "en", None));
        assert_ne!(base, key("Hello", "auto", Some("formal")));

        let other_deployment = TranslationCacheKey::new("Hello", "auto")
            .target("en", "gpt-4o", None)
            .target("pl", "gpt-4o", None)
            .build();
        assert_ne!(base, other_deployment);
    }

    #[test]
    fn test_empty_source_means_auto() {
        assert_eq!(key("Hello", "", None), key("Hello", " Auto ", None));
    }

    #[test]
    fn test_field_boundaries_matter() {
        let a = TranslationCacheKey::new("ab", "c").build();
        let b = TranslationCacheKey::new("a", "bc").build();
        assert_ne!(a, b);
    }
}
