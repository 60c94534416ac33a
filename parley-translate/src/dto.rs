//! Request and response types, both the caller-facing ones and the provider wire format.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Wire value meaning "detect the source language".
pub const AUTO: &str = "auto";

/// Source language of a request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum SourceLanguage {
    /// Let the provider detect the language
    #[default]
    Auto,
    /// A normalized language code such as `"en"`
    Code(String),
}

impl SourceLanguage {
    /// Parse a language code; empty input and `"auto"` (any case) mean [`Auto`](Self::Auto).
    pub fn parse(code: &str) -> Self {
        let code = code.trim().to_lowercase();
        if code.is_empty() || code == AUTO {
            Self::Auto
        } else {
            Self::Code(code)
        }
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, Self::Auto)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Auto => AUTO,
            Self::Code(code) => code,
        }
    }
}

impl From<&str> for SourceLanguage {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl fmt::Display for SourceLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SourceLanguage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SourceLanguage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// One requested output language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateTarget {
    pub language: String,
    pub deployment_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
}

impl TranslateTarget {
    pub fn new(language: &str, deployment_name: impl Into<String>) -> Self {
        Self {
            language: language.trim().to_lowercase(),
            deployment_name: deployment_name.into(),
            tone: None,
        }
    }

    pub fn with_tone(mut self, tone: impl Into<String>) -> Self {
        self.tone = Some(tone.into());
        self
    }
}

/// A caller's translation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslateRequest {
    pub text: String,
    pub source_language: SourceLanguage,
    pub targets: Vec<TranslateTarget>,
    /// Skip the cache lookup (the result is still written back)
    pub force_refresh: bool,
}

impl TranslateRequest {
    pub fn new(text: impl Into<String>, source_language: impl Into<SourceLanguage>) -> Self {
        Self {
            text: text.into(),
            source_language: source_language.into(),
            targets: Vec::new(),
            force_refresh: false,
        }
    }

    /// Convenience for requests that share one deployment and tone.
    pub fn for_languages<I, S>(
        text: impl Into<String>,
        source_language: impl Into<SourceLanguage>,
        languages: I,
        deployment_name: &str,
        tone: Option<&str>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut request = Self::new(text, source_language);
        for language in languages {
            let mut target = TranslateTarget::new(language.as_ref(), deployment_name);
            target.tone = tone.map(str::to_string);
            request.targets.push(target);
        }
        request
    }

    pub fn with_target(mut self, target: TranslateTarget) -> Self {
        self.targets.push(target);
        self
    }

    pub fn force_refresh(mut self, force: bool) -> Self {
        self.force_refresh = force;
        self
    }

    /// Provider payload for this request.
    pub fn to_provider_request(&self) -> ProviderRequest {
        ProviderRequest {
            inputs: vec![ProviderInput {
                text: self.text.clone(),
                language: self.source_language.clone(),
                targets: self
                    .targets
                    .iter()
                    .map(|t| ProviderTarget {
                        language: t.language.clone(),
                        deployment_name: t.deployment_name.clone(),
                        tone: t.tone.clone(),
                    })
                    .collect(),
            }],
        }
    }
}

/// Result of a translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected_language: Option<String>,
    /// Translated text per target language
    pub translations: BTreeMap<String, String>,
    /// Set when served from the cache; never persisted
    #[serde(skip)]
    pub from_cache: bool,
}

/// Outbound provider payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderRequest {
    pub inputs: Vec<ProviderInput>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderInput {
    pub text: String,
    #[serde(skip_serializing_if = "SourceLanguage::is_auto")]
    pub language: SourceLanguage,
    pub targets: Vec<ProviderTarget>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderTarget {
    pub language: String,
    pub deployment_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
}

/// Provider answer, one item per input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderResponse {
    #[serde(default)]
    pub value: Vec<ProviderItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected_language: Option<DetectedLanguage>,
    #[serde(default)]
    pub translations: Vec<ProviderTranslation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedLanguage {
    pub language: String,
    #[serde(default)]
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderTranslation {
    pub language: String,
    pub text: String,
}

impl ProviderResponse {
    /// Flatten the first item into a [`TranslateResponse`].
    pub(crate) fn into_response(self, source: &SourceLanguage) -> Option<TranslateResponse> {
        let item = self.value.into_iter().next()?;
        let detected_language = item
            .detected_language
            .map(|d| d.language.to_lowercase())
            .or_else(|| (!source.is_auto()).then(|| source.as_str().to_string()));

        let translations = item
            .translations
            .into_iter()
            .map(|t| (t.language.to_lowercase(), t.text))
            .collect();

        Some(TranslateResponse {
            detected_language,
            translations,
            from_cache: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_source_language_parse() {
        assert_eq!(SourceLanguage::parse(""), SourceLanguage::Auto);
        assert_eq!(SourceLanguage::parse(" AUTO "), SourceLanguage::Auto);
        assert_eq!(SourceLanguage::parse("PL"), SourceLanguage::Code("pl".into()));
    }

    #[test]
    fn test_auto_source_is_omitted_from_payload() {
        let request = TranslateRequest::for_languages("Hello", "auto", ["en", "pl"], "gpt-4o-mini", None);
        let payload = serde_json::to_value(request.to_provider_request()).unwrap();

        assert_eq!(
            payload,
            json!({
                "inputs": [{
                    "text": "Hello",
                    "targets": [
                        {"language": "en", "deploymentName": "gpt-4o-mini"},
                        {"language": "pl", "deploymentName": "gpt-4o-mini"}
                    ]
                }]
            })
        );
    }

    #[test]
    fn test_explicit_source_and_tone_are_sent() {
        let request = TranslateRequest::new("Cześć", "pl")
            .with_target(TranslateTarget::new("en", "gpt-4o").with_tone("formal"));
        let payload = serde_json::to_value(request.to_provider_request()).unwrap();

        let input = &payload["inputs"][0];
        assert_eq!(input["language"], "pl");
        assert_eq!(input["targets"][0]["tone"], "formal");
    }

    #[test]
    fn test_provider_response_mapping() {
        let body = json!({
            "value": [{
                "detectedLanguage": {"language": "EN", "score": 0.98},
                "translations": [
                    {"language": "en", "text": "Hello", "sourceCharacters": 5},
                    {"language": "pl", "text": "Cześć"}
                ]
            }]
        });
        let parsed: ProviderResponse = serde_json::from_value(body).unwrap();
        let response = parsed.into_response(&SourceLanguage::Auto).unwrap();

        assert_eq!(response.detected_language.as_deref(), Some("en"));
        assert_eq!(response.translations["pl"], "Cześć");
        assert!(!response.from_cache);
    }

    #[test]
    fn test_empty_provider_response() {
        assert!(ProviderResponse::default()
            .into_response(&SourceLanguage::Auto)
            .is_none());
    }

    #[test]
    fn test_from_cache_is_not_serialized() {
        let response = TranslateResponse {
            detected_language: None,
            translations: BTreeMap::new(),
            from_cache: true,
        };
        let value = serde_json::to_value(&response).unwrap();
        assert!(value.get("fromCache").is_none());
    }
}
