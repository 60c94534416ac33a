// Environment variable loading

use std::collections::HashMap;
use std::env;

/// Collects prefixed environment variables as lower-cased setting keys.
///
/// `PARLEY_MAX_RETRIES=5` with prefix `PARLEY` yields `max_retries -> "5"`.
pub struct EnvLoader {
    prefix: String,
}

impl EnvLoader {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Load from the process environment
    pub fn load(&self) -> HashMap<String, String> {
        self.load_from(env::vars())
    }

    /// Load from an explicit set of variables
    pub fn load_from<I>(&self, vars: I) -> HashMap<String, String>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let marker = format!("{}_", self.prefix);

        vars.into_iter()
            .filter_map(|(key, value)| {
                key.strip_prefix(&marker)
                    .filter(|rest| !rest.is_empty())
                    .map(|rest| (rest.to_lowercase(), value))
            })
            .collect()
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new("PARLEY")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_strips_prefix_and_lowercases() {
        let loaded = EnvLoader::default().load_from(vars(&[
            ("PARLEY_MAX_RETRIES", "5"),
            ("PARLEY_QUEUE_NAME", "jobs"),
            ("HOME", "/root"),
        ]));

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.get("max_retries").map(String::as_str), Some("5"));
        assert_eq!(loaded.get("queue_name").map(String::as_str), Some("jobs"));
    }

    #[test]
    fn test_ignores_similar_prefixes() {
        let loaded = EnvLoader::new("PARLEY").load_from(vars(&[
            ("PARLEYX_ENABLED", "true"),
            ("PARLEY_", "empty"),
        ]));
        assert!(loaded.is_empty());
    }
}
