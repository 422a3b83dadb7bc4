//! Emitter configuration.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use tracing::warn;

/// Environment variable read by [`EmitterConfig::from_env`].
pub const FAILURE_POLICY_ENV: &str = "TYPED_EMITTER_FAILURE_POLICY";

/// What happens when a listener panics during dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Catch the panic, log it, and keep delivering to the remaining listeners.
    #[default]
    Isolate,
    /// Let the panic unwind out of `dispatch_event`.
    Propagate,
}

impl FromStr for FailurePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "isolate" => Ok(Self::Isolate),
            "propagate" => Ok(Self::Propagate),
            _ => Err(ConfigError::UnknownFailurePolicy(s.trim().to_string())),
        }
    }
}

/// Configuration for an [`EventEmitter`](crate::EventEmitter).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    /// Listener panic handling.
    pub failure_policy: FailurePolicy,
}

impl EmitterConfig {
    /// Configuration with the given failure policy.
    #[must_use]
    pub fn with_failure_policy(failure_policy: FailurePolicy) -> Self {
        Self { failure_policy }
    }

    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `TYPED_EMITTER_FAILURE_POLICY`: `isolate` or `propagate` (default: isolate)
    pub fn from_env() -> Self {
        let failure_policy = match env::var(FAILURE_POLICY_ENV) {
            Ok(raw) => raw.parse().unwrap_or_else(|e: ConfigError| {
                warn!(error = %e, "Ignoring {FAILURE_POLICY_ENV}, using default");
                FailurePolicy::default()
            }),
            Err(_) => FailurePolicy::default(),
        };
        Self { failure_policy }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_isolates() {
        assert_eq!(EmitterConfig::default().failure_policy, FailurePolicy::Isolate);
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("isolate".parse::<FailurePolicy>(), Ok(FailurePolicy::Isolate));
        assert_eq!(" Propagate ".parse::<FailurePolicy>(), Ok(FailurePolicy::Propagate));
        assert_eq!(
            "retry".parse::<FailurePolicy>(),
            Err(ConfigError::UnknownFailurePolicy("retry".to_string()))
        );
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: EmitterConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, EmitterConfig::default());

        let config: EmitterConfig =
            serde_json::from_str(r#"{ "failure_policy": "propagate" }"#).unwrap();
        assert_eq!(config.failure_policy, FailurePolicy::Propagate);
    }

    // Single test so no other test races on the process environment.
    #[test]
    fn test_from_env_absent_set_and_unknown() {
        env::remove_var(FAILURE_POLICY_ENV);
        assert_eq!(EmitterConfig::from_env().failure_policy, FailurePolicy::Isolate);

        env::set_var(FAILURE_POLICY_ENV, "propagate");
        assert_eq!(EmitterConfig::from_env().failure_policy, FailurePolicy::Propagate);

        env::set_var(FAILURE_POLICY_ENV, "retry");
        assert_eq!(EmitterConfig::from_env().failure_policy, FailurePolicy::Isolate);

        env::remove_var(FAILURE_POLICY_ENV);
    }
}
