//! Configuration types for the default backend

use crate::message::DEFAULT_REPEATABLE_PREFIXES;
use serde::{Deserialize, Serialize};

/// Default backend configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultBackendConfig {
    /// Default referral URLs of the server
    ///
    /// When non-empty, unhandled operations are answered with a referral to
    /// these URLs instead of noSuchObject.
    #[serde(default)]
    pub default_referrals: Vec<String>,

    /// RDN prefixes whose trailing runs are reported as one suffix
    ///
    /// Order matters: the first prefix matching the last RDN wins.
    #[serde(default = "default_repeatable_prefixes")]
    pub repeatable_prefixes: Vec<String>,
}

impl DefaultBackendConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self {
            default_referrals: Vec::new(),
            repeatable_prefixes: default_repeatable_prefixes(),
        }
    }

    /// Set the default referral URLs
    pub fn with_default_referrals(mut self, referrals: Vec<String>) -> Self {
        self.default_referrals = referrals;
        self
    }

    /// Set the repeatable prefix table
    pub fn with_repeatable_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.repeatable_prefixes = prefixes;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        for url in &self.default_referrals {
            let lower = url.to_ascii_lowercase();
            let rest = lower
                .strip_prefix("ldap://")
                .or_else(|| lower.strip_prefix("ldaps://"));
            match rest {
                Some(host) if !host.is_empty() => {}
                _ => {
                    return Err(crate::Error::config(format!(
                        "Default referral must be an ldap:// or ldaps:// URL with a host. Got: '{}'",
                        url
                    )));
                }
            }
        }

        for prefix in &self.repeatable_prefixes {
            if prefix.len() < 2 || !prefix.ends_with('=') {
                return Err(crate::Error::config(format!(
                    "Repeatable prefix must be an attribute type followed by '='. Got: '{}'",
                    prefix
                )));
            }
        }

        Ok(())
    }
}

impl Default for DefaultBackendConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn default_repeatable_prefixes() -> Vec<String> {
    DEFAULT_REPEATABLE_PREFIXES
        .iter()
        .map(|prefix| prefix.to_string())
        .collect()
}
