//! Injector configuration.
//!
//! Settings come from code, from environment variables, or (with the
//! `config` feature) from JSON.

use std::env;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use crate::cache_policy::CachePolicy;
use crate::error::{DiError, DiResult};

/// Default bound on nested resolution depth.
pub const DEFAULT_MAX_DEPTH: usize = 1024;

/// Settings applying to every resolution performed by an injector.
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::{CachePolicy, InjectorConfig};
///
/// let config = InjectorConfig::default()
///     .with_max_depth(64)
///     .with_default_cache_policy(CachePolicy::Memoize);
///
/// assert_eq!(config.max_depth, 64);
/// assert!(config.catch_panics);
/// assert!(config.validate().is_ok());
/// assert!(InjectorConfig::default().with_max_depth(0).validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct InjectorConfig {
    /// Maximum nesting of satisfactions before resolution fails
    pub max_depth: usize,
    /// Policy used when neither the rule nor the satisfaction chose one
    pub default_cache_policy: CachePolicy,
    /// Turn panics in user constructors and hooks into construction errors
    pub catch_panics: bool,
}

impl Default for InjectorConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            default_cache_policy: CachePolicy::NoPreference,
            catch_panics: true,
        }
    }
}

fn parse_policy(value: &str) -> DiResult<CachePolicy> {
    match value.trim().to_ascii_lowercase().as_str() {
        "no_preference" | "none" => Ok(CachePolicy::NoPreference),
        "new_instance" | "new" => Ok(CachePolicy::NewInstance),
        "memoize" | "singleton" => Ok(CachePolicy::Memoize),
        other => Err(DiError::configuration(format!(
            "unknown cache policy `{}`",
            other
        ))),
    }
}

impl InjectorConfig {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_default_cache_policy(mut self, policy: CachePolicy) -> Self {
        self.default_cache_policy = policy;
        self
    }

    pub fn with_catch_panics(mut self, catch_panics: bool) -> Self {
        self.catch_panics = catch_panics;
        self
    }

    /// Rejects settings that would make every resolution fail.
    pub fn validate(&self) -> DiResult<()> {
        if self.max_depth == 0 {
            return Err(DiError::configuration("max_depth must be at least 1"));
        }
        Ok(())
    }

    /// Defaults overridden by `{PREFIX}_MAX_DEPTH`, `{PREFIX}_CACHE_POLICY`
    /// and `{PREFIX}_CATCH_PANICS`.
    pub fn from_env(prefix: &str) -> DiResult<Self> {
        let prefix = prefix.to_uppercase();
        let var = |name: &str| env::var(format!("{}_{}", prefix, name)).ok();
        let mut config = Self::default();

        if let Some(value) = var("MAX_DEPTH") {
            config.max_depth = value.trim().parse().map_err(|_| {
                DiError::configuration(format!("invalid {}_MAX_DEPTH `{}`", prefix, value))
            })?;
        }
        if let Some(value) = var("CACHE_POLICY") {
            config.default_cache_policy = parse_policy(&value)?;
        }
        if let Some(value) = var("CATCH_PANICS") {
            config.catch_panics = value.trim().parse().map_err(|_| {
                DiError::configuration(format!("invalid {}_CATCH_PANICS `{}`", prefix, value))
            })?;
        }

        tracing::debug!(?config, "loaded injector config from environment");
        config.validate()?;
        Ok(config)
    }

    /// Parses a JSON document; missing fields keep their defaults.
    #[cfg(feature = "config")]
    pub fn from_json(json: &str) -> DiResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| DiError::configuration(format!("invalid injector config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a JSON configuration file.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<std::path::Path>) -> DiResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            DiError::configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }
}
