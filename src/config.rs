// src/config.rs

//! # Configuration (config)
//!
//! Order submission settings, loaded from the environment.

use crate::error::EmsxError;
use std::env;
use std::time::Duration;

pub const BETA_SERVICE: &str = "//blp/emapisvc_beta";
pub const PRODUCTION_SERVICE: &str = "//blp/emapisvc";

const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_HAND_INSTRUCTION: &str = "ANY";

/// EMSX environment; selects the service name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmsxEnvironment {
    #[default]
    Beta,
    Production,
}

impl EmsxEnvironment {
    /// Anything other than `production`/`prod` is treated as beta.
    pub fn from_str_case_insensitive(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Beta,
        }
    }

    pub const fn service_name(&self) -> &'static str {
        match self {
            Self::Beta => BETA_SERVICE,
            Self::Production => PRODUCTION_SERVICE,
        }
    }
}

/// ## `EmsxConfig`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmsxConfig {
    /// Service opened for each call.
    pub service: String,
    /// Upper bound on waiting for the full response; `None` waits forever.
    pub response_timeout: Option<Duration>,
    /// Used when a ticket carries no hand instruction.
    pub hand_instruction: String,
}

impl Default for EmsxConfig {
    fn default() -> Self {
        Self {
            service: BETA_SERVICE.to_string(),
            response_timeout: Some(DEFAULT_RESPONSE_TIMEOUT),
            hand_instruction: DEFAULT_HAND_INSTRUCTION.to_string(),
        }
    }
}

impl EmsxConfig {
    /// Read `EMSX_ENVIRONMENT`, `EMSX_SERVICE`, `EMSX_RESPONSE_TIMEOUT_MS`
    /// and `EMSX_HAND_INSTRUCTION`.
    pub fn from_env() -> Result<Self, EmsxError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, EmsxError> {
        let environment = lookup("EMSX_ENVIRONMENT")
            .map(|v| EmsxEnvironment::from_str_case_insensitive(&v))
            .unwrap_or_default();

        let service = lookup("EMSX_SERVICE")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| environment.service_name().to_string());

        let response_timeout = match lookup("EMSX_RESPONSE_TIMEOUT_MS") {
            None => Some(DEFAULT_RESPONSE_TIMEOUT),
            Some(raw) => {
                let ms: u64 = raw.trim().parse().map_err(|_| {
                    EmsxError::Config(format!("EMSX_RESPONSE_TIMEOUT_MS is not a number: {raw}"))
                })?;
                (ms > 0).then(|| Duration::from_millis(ms))
            }
        };

        let hand_instruction = lookup("EMSX_HAND_INSTRUCTION")
            .unwrap_or_else(|| DEFAULT_HAND_INSTRUCTION.to_string());

        Ok(Self {
            service,
            response_timeout,
            hand_instruction,
        })
    }

    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = service.into();
        self
    }

    pub fn with_response_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.response_timeout = timeout;
        self
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
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_to_beta() {
        let config = EmsxConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, EmsxConfig::default());
        assert_eq!(config.service, "//blp/emapisvc_beta");
    }

    #[test]
    fn production_environment_selects_production_service() {
        let config = EmsxConfig::from_lookup(lookup(&[("EMSX_ENVIRONMENT", "PRODUCTION")])).unwrap();
        assert_eq!(config.service, PRODUCTION_SERVICE);
    }

    #[test]
    fn explicit_service_wins() {
        let config = EmsxConfig::from_lookup(lookup(&[
            ("EMSX_ENVIRONMENT", "production"),
            ("EMSX_SERVICE", "//blp/custom"),
        ]))
        .unwrap();
        assert_eq!(config.service, "//blp/custom");
    }

    #[test]
    fn zero_timeout_disables_deadline() {
        let config = EmsxConfig::from_lookup(lookup(&[("EMSX_RESPONSE_TIMEOUT_MS", "0")])).unwrap();
        assert_eq!(config.response_timeout, None);

        let config = EmsxConfig::from_lookup(lookup(&[("EMSX_RESPONSE_TIMEOUT_MS", "1500")])).unwrap();
        assert_eq!(config.response_timeout, Some(Duration::from_millis(1500)));
    }

    #[test]
    fn bad_timeout_is_a_config_error() {
        let err = EmsxConfig::from_lookup(lookup(&[("EMSX_RESPONSE_TIMEOUT_MS", "soon")])).unwrap_err();
        assert!(matches!(err, EmsxError::Config(_)));
    }
}
