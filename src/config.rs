/// Runtime configuration
///
/// Read once from the process environment at startup. There is no
/// config file; everything has a default except the API credential.

use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Settings for the remote edit client
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteConfig {
    /// Gemini API key (`API_KEY`, falling back to `GEMINI_API_KEY`)
    pub api_key: Option<String>,
    /// Model name (`MAGIC_ERASER_MODEL`)
    pub model: String,
    /// API base URL without trailing slash (`MAGIC_ERASER_ENDPOINT`)
    pub endpoint: String,
    /// Request timeout (`MAGIC_ERASER_TIMEOUT_SECS`); `None` waits forever
    pub timeout: Option<Duration>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub remote: RemoteConfig,
}

impl Config {
    /// Load from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values count as unset
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let api_key = get("API_KEY").or_else(|| get("GEMINI_API_KEY"));

        let model = get("MAGIC_ERASER_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let endpoint = get("MAGIC_ERASER_ENDPOINT")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        let timeout = get("MAGIC_ERASER_TIMEOUT_SECS").and_then(|raw| match raw.parse::<u64>() {
            Ok(0) => None,
            Ok(secs) => Some(Duration::from_secs(secs)),
            Err(_) => {
                log::warn!("⚠️  Ignoring MAGIC_ERASER_TIMEOUT_SECS={raw:?}: not a number of seconds");
                None
            }
        });

        Config {
            remote: RemoteConfig {
                api_key,
                model,
                endpoint,
                timeout,
            },
        }
    }
}
