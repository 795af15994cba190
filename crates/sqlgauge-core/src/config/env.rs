//! Settings read from the process environment.
//!
//! Secrets never live in the YAML config. A live generator without
//! `SQLGAUGE_API_KEY` is a fatal configuration error.

use crate::errors::ConfigError;

pub const API_KEY_VAR: &str = "SQLGAUGE_API_KEY";
pub const MODEL_VAR: &str = "SQLGAUGE_MODEL";
pub const BASE_URL_VAR: &str = "SQLGAUGE_BASE_URL";
pub const TEMPERATURE_VAR: &str = "SQLGAUGE_TEMPERATURE";
pub const MAX_TOKENS_VAR: &str = "SQLGAUGE_MAX_TOKENS";

#[derive(Clone)]
pub struct GeneratorEnv {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl std::fmt::Debug for GeneratorEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratorEnv")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl GeneratorEnv {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Same as [`GeneratorEnv::from_env`] over an arbitrary key lookup.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_key = get(API_KEY_VAR)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| {
                ConfigError(format!(
                    "{} is not set (required for live generation; use --trace-file to replay)",
                    API_KEY_VAR
                ))
            })?;

        let mut cfg = Self {
            api_key,
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            temperature: 0.0,
            max_tokens: 512,
        };
        if let Some(v) = get(MODEL_VAR) {
            cfg.model = v;
        }
        if let Some(v) = get(BASE_URL_VAR) {
            cfg.base_url = v;
        }
        if let Some(v) = get(TEMPERATURE_VAR) {
            cfg.temperature = v
                .parse()
                .map_err(|_| ConfigError(format!("{} must be a number, got {:?}", TEMPERATURE_VAR, v)))?;
        }
        if let Some(v) = get(MAX_TOKENS_VAR) {
            cfg.max_tokens = v
                .parse()
                .map_err(|_| ConfigError(format!("{} must be an integer, got {:?}", MAX_TOKENS_VAR, v)))?;
        }
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn missing_key_is_fatal() {
        let err = GeneratorEnv::from_lookup(lookup(&[])).unwrap_err();
        assert!(err.to_string().starts_with("config error:"));
        assert!(GeneratorEnv::from_lookup(lookup(&[(API_KEY_VAR, "  ")])).is_err());
    }

    #[test]
    fn defaults_and_overrides() {
        let cfg = GeneratorEnv::from_lookup(lookup(&[(API_KEY_VAR, "sk-test")])).unwrap();
        assert_eq!(cfg.model, "gpt-4o-mini");
        assert_eq!(cfg.max_tokens, 512);

        let cfg = GeneratorEnv::from_lookup(lookup(&[
            (API_KEY_VAR, "sk-test"),
            (MODEL_VAR, "local-sql"),
            (BASE_URL_VAR, "http://localhost:8080/v1"),
            (MAX_TOKENS_VAR, "256"),
        ]))
        .unwrap();
        assert_eq!(cfg.model, "local-sql");
        assert_eq!(cfg.base_url, "http://localhost:8080/v1");
        assert_eq!(cfg.max_tokens, 256);
        assert!(!format!("{:?}", cfg).contains("sk-test"));
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        let res = GeneratorEnv::from_lookup(lookup(&[(API_KEY_VAR, "k"), (TEMPERATURE_VAR, "warm")]));
        assert!(res.is_err());
    }
}
