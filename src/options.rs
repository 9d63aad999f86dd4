use serde::{Deserialize, Serialize};
use std::env;

use crate::errors::{FormatError, Result};

pub const NAMED_MODULES_ENV: &str = "AMDFORMATTER_NAMED_MODULES";
pub const DIRECT_EXPORTS_ENV: &str = "AMDFORMATTER_DIRECT_EXPORTS";

/// Fully resolved formatter settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormatterOptions {
    /// Pass the module name as the first `define()` argument.
    pub named_modules: bool,
    /// Return a lone default export as the bare value and bind single-specifier
    /// imports straight to the dependency parameter.
    pub direct_exports: bool,
}

impl Default for FormatterOptions {
    fn default() -> Self {
        Self {
            named_modules: true,
            direct_exports: false,
        }
    }
}

impl FormatterOptions {
    pub fn new(named_modules: bool, direct_exports: bool) -> Self {
        Self {
            named_modules,
            direct_exports,
        }
    }

    /// Options taken from the environment alone.
    pub fn from_env() -> Self {
        FormatterConfig::default().resolve()
    }
}

/// Options as supplied by a caller; unset fields fall back to the environment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatterConfig {
    #[serde(default)]
    pub named_modules: Option<bool>,
    #[serde(default)]
    pub direct_exports: Option<bool>,
}

impl FormatterConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| FormatError::Parse {
            module: "<options>".to_string(),
            message: e.to_string(),
        })
    }

    pub fn resolve(&self) -> FormatterOptions {
        self.resolve_with(|key| env::var(key).ok())
    }

    fn resolve_with(&self, lookup: impl Fn(&str) -> Option<String>) -> FormatterOptions {
        let named_modules = self.named_modules.unwrap_or_else(|| {
            lookup(NAMED_MODULES_ENV).map_or(true, |value| value != "false")
        });
        let direct_exports = self
            .direct_exports
            .unwrap_or_else(|| lookup(DIRECT_EXPORTS_ENV).map_or(false, |value| value == "true"));

        FormatterOptions {
            named_modules,
            direct_exports,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_environment() {
        let options = FormatterConfig::default().resolve_with(env_of(&[]));
        assert_eq!(options, FormatterOptions::default());
        assert!(options.named_modules);
        assert!(!options.direct_exports);
    }

    #[test]
    fn test_environment_fallbacks() {
        let options = FormatterConfig::default().resolve_with(env_of(&[
            (NAMED_MODULES_ENV, "false"),
            (DIRECT_EXPORTS_ENV, "true"),
        ]));
        assert!(!options.named_modules);
        assert!(options.direct_exports);

        // Anything but the exact strings keeps the default.
        let options = FormatterConfig::default().resolve_with(env_of(&[
            (NAMED_MODULES_ENV, "0"),
            (DIRECT_EXPORTS_ENV, "1"),
        ]));
        assert!(options.named_modules);
        assert!(!options.direct_exports);
    }

    #[test]
    fn test_explicit_values_win_over_environment() {
        let config = FormatterConfig::from_json(r#"{"namedModules": false}"#).unwrap();
        let options = config.resolve_with(env_of(&[
            (NAMED_MODULES_ENV, "true"),
            (DIRECT_EXPORTS_ENV, "true"),
        ]));
        assert!(!options.named_modules);
        assert!(options.direct_exports);
    }

    #[test]
    fn test_invalid_json_is_rejected() {
        assert!(FormatterConfig::from_json("{namedModules:").is_err());
    }
}
