//! Process configuration.
//!
//! Everything here is resolved once at startup (after `.env` has been loaded)
//! and handed to the services that need it. Request handlers never read the
//! environment directly.

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "MediCare Assist";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8501";
const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const DEFAULT_OLLAMA_MODEL: &str = "medgemma:latest";
const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org/search";
const DEFAULT_OVERPASS_URL: &str = "http://overpass-api.de/api/interpreter";
const DEFAULT_USER_AGENT: &str = "HealthcareAssistant/1.0";
const DEFAULT_SESSION_IDLE_SECS: u64 = 1800;

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "medicare_assist=info,tower_http=warn"
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Unknown reasoning provider '{0}' (expected 'gemini' or 'ollama')")]
    UnknownProvider(String),
}

/// Which remote service answers the consultation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReasoningProvider {
    Gemini,
    Ollama,
}

impl std::str::FromStr for ReasoningProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "ollama" => Ok(Self::Ollama),
            other => Err(ConfigError::UnknownProvider(other.to_string())),
        }
    }
}

/// Reasoning backend settings. The API key is redacted from `Debug` output.
#[derive(Clone)]
pub struct ReasoningConfig {
    pub provider: ReasoningProvider,
    pub api_key: Option<String>,
    pub gemini_url: String,
    pub gemini_model: String,
    pub ollama_url: String,
    pub ollama_model: String,
}

impl fmt::Debug for ReasoningConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReasoningConfig")
            .field("provider", &self.provider)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("gemini_url", &self.gemini_url)
            .field("gemini_model", &self.gemini_model)
            .field("ollama_url", &self.ollama_url)
            .field("ollama_model", &self.ollama_model)
            .finish()
    }
}

/// Geocoding and points-of-interest endpoints.
#[derive(Debug, Clone)]
pub struct LocationConfig {
    pub geocoder_url: String,
    pub overpass_url: String,
    pub user_agent: String,
}

/// Top-level configuration resolved at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub reasoning: ReasoningConfig,
    pub location: LocationConfig,
    pub session_idle_timeout: Duration,
}

impl AppConfig {
    /// Resolve configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration from an arbitrary key lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let or_default = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let bind_raw = or_default("MEDICARE_BIND_ADDR", DEFAULT_BIND_ADDR);
        let bind_addr = bind_raw.parse().map_err(|_| ConfigError::InvalidValue {
            key: "MEDICARE_BIND_ADDR",
            value: bind_raw.clone(),
        })?;

        let provider = match get("MEDICARE_REASONING_PROVIDER") {
            Some(p) => p.parse()?,
            None => ReasoningProvider::Gemini,
        };

        let session_idle_timeout = match get("MEDICARE_SESSION_IDLE_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                    key: "MEDICARE_SESSION_IDLE_SECS",
                    value: raw.clone(),
                })?;
                if secs == 0 {
                    return Err(ConfigError::InvalidValue {
                        key: "MEDICARE_SESSION_IDLE_SECS",
                        value: raw,
                    });
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_SESSION_IDLE_SECS),
        };

        Ok(Self {
            bind_addr,
            reasoning: ReasoningConfig {
                provider,
                api_key: get("GOOGLE_API_KEY"),
                gemini_url: or_default("MEDICARE_GEMINI_URL", DEFAULT_GEMINI_URL),
                gemini_model: or_default("MEDICARE_GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
                ollama_url: or_default("MEDICARE_OLLAMA_URL", DEFAULT_OLLAMA_URL),
                ollama_model: or_default("MEDICARE_OLLAMA_MODEL", DEFAULT_OLLAMA_MODEL),
            },
            location: LocationConfig {
                geocoder_url: or_default("MEDICARE_GEOCODER_URL", DEFAULT_GEOCODER_URL),
                overpass_url: or_default("MEDICARE_OVERPASS_URL", DEFAULT_OVERPASS_URL),
                user_agent: or_default("MEDICARE_USER_AGENT", DEFAULT_USER_AGENT),
            },
            session_idle_timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_environment_empty() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8501");
        assert_eq!(config.reasoning.provider, ReasoningProvider::Gemini);
        assert_eq!(config.reasoning.gemini_model, "gemini-2.0-flash");
        assert!(config.reasoning.api_key.is_none());
        assert_eq!(config.location.user_agent, "HealthcareAssistant/1.0");
        assert_eq!(config.session_idle_timeout, Duration::from_secs(1800));
    }

    #[test]
    fn reads_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("MEDICARE_BIND_ADDR", "0.0.0.0:9000"),
            ("MEDICARE_REASONING_PROVIDER", "Ollama"),
            ("GOOGLE_API_KEY", "secret-key"),
            ("MEDICARE_SESSION_IDLE_SECS", "60"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.reasoning.provider, ReasoningProvider::Ollama);
        assert_eq!(config.reasoning.api_key.as_deref(), Some("secret-key"));
        assert_eq!(config.session_idle_timeout, Duration::from_secs(60));
    }

    #[test]
    fn blank_values_are_unset() {
        let config =
            AppConfig::from_lookup(lookup_from(&[("GOOGLE_API_KEY", "   ")])).unwrap();
        assert!(config.reasoning.api_key.is_none());
    }

    #[test]
    fn rejects_bad_bind_addr() {
        let err = AppConfig::from_lookup(lookup_from(&[("MEDICARE_BIND_ADDR", "nowhere")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "MEDICARE_BIND_ADDR", .. }));
    }

    #[test]
    fn rejects_unknown_provider() {
        let err = AppConfig::from_lookup(lookup_from(&[(
            "MEDICARE_REASONING_PROVIDER",
            "oracle",
        )]))
        .unwrap_err();
        assert_eq!(err, ConfigError::UnknownProvider("oracle".into()));
    }

    #[test]
    fn rejects_zero_idle_timeout() {
        let err = AppConfig::from_lookup(lookup_from(&[("MEDICARE_SESSION_IDLE_SECS", "0")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn debug_redacts_api_key() {
        let config =
            AppConfig::from_lookup(lookup_from(&[("GOOGLE_API_KEY", "AIza-very-secret")])).unwrap();
        let printed = format!("{config:?}");
        assert!(!printed.contains("AIza-very-secret"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }
}
