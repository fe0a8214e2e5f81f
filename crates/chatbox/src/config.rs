use std::env;
use std::error::Error;
use std::fmt::{self, Display};
use std::path::PathBuf;
use std::time::Duration;

use chatbox_core::identity::UserIdentity;
use chatbox_core::{ChatBuilder, RetryPolicy};
use chatbox_http_model::{HttpConfig, HttpConfigBuilder, HttpProvider};

const BASE_URL_VAR: &str = "CHATBOX_BASE_URL";
const CHAT_PATH_VAR: &str = "CHATBOX_CHAT_PATH";
const TIMEOUT_SECS_VAR: &str = "CHATBOX_TIMEOUT_SECS";
const MAX_RETRIES_VAR: &str = "CHATBOX_MAX_RETRIES";
const USER_NAME_VAR: &str = "CHATBOX_USER_NAME";
const LOG_FILE_VAR: &str = "CHATBOX_LOG_FILE";

const DEFAULT_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// An environment variable holding an unusable value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigError {
    var: &'static str,
    value: String,
    reason: String,
}

impl ConfigError {
    /// Returns the name of the offending variable.
    #[inline]
    pub fn var(&self) -> &str {
        self.var
    }
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}={:?}: {}", self.var, self.value, self.reason)
    }
}

impl Error for ConfigError {}

/// Settings of the chat widget, read from `CHATBOX_*` environment
/// variables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the completion service.
    pub base_url: String,
    /// Path of the chat endpoint, `/api/chat` when unset.
    pub chat_path: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
    /// How many times a transient failure is retried.
    pub max_retries: u32,
    /// Display name of the user, used for the avatar.
    pub user_name: Option<String>,
    /// Where to write logs. Nothing is logged when unset.
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// Reads the configuration from the process environment.
    #[inline]
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable
    /// name to its value.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let base_url = lookup(BASE_URL_VAR)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        if !base_url.starts_with("http://") && !base_url.starts_with("https://")
        {
            return Err(ConfigError {
                var: BASE_URL_VAR,
                value: base_url,
                reason: "expected an http:// or https:// URL".to_owned(),
            });
        }

        let timeout_secs = parse_number(
            TIMEOUT_SECS_VAR,
            lookup(TIMEOUT_SECS_VAR),
            DEFAULT_TIMEOUT_SECS,
        )?;
        if timeout_secs == 0 {
            return Err(ConfigError {
                var: TIMEOUT_SECS_VAR,
                value: "0".to_owned(),
                reason: "must be at least 1".to_owned(),
            });
        }
        let max_retries =
            parse_number(MAX_RETRIES_VAR, lookup(MAX_RETRIES_VAR), 0)?;

        Ok(Self {
            base_url,
            chat_path: lookup(CHAT_PATH_VAR),
            timeout: Duration::from_secs(timeout_secs),
            max_retries,
            user_name: lookup(USER_NAME_VAR),
            log_file: lookup(LOG_FILE_VAR).map(PathBuf::from),
        })
    }

    /// Returns the configuration of the HTTP completion provider.
    pub fn http_config(&self) -> HttpConfig {
        let mut builder = HttpConfigBuilder::with_base_url(&self.base_url)
            .with_timeout(self.timeout);
        if let Some(path) = &self.chat_path {
            builder = builder.with_path(path);
        }
        builder.build()
    }

    /// Returns the retry policy for completion requests.
    #[inline]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::with_max_retries(self.max_retries)
    }

    /// Returns the identity shown next to the user's messages.
    #[inline]
    pub fn identity(&self) -> UserIdentity {
        UserIdentity::new(self.user_name.clone())
    }

    /// Creates a chat builder talking to the configured endpoint.
    pub fn chat_builder(&self) -> ChatBuilder {
        let provider = HttpProvider::new(self.http_config());
        ChatBuilder::with_completion_provider(provider)
            .with_retry(self.retry_policy())
    }
}

fn parse_number<T: std::str::FromStr>(
    var: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let Some(value) = value else {
        return Ok(default);
    };
    value.trim().parse().map_err(|err: T::Err| ConfigError {
        var,
        reason: err.to_string(),
        value,
    })
}
