use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_CHAT_PATH: &str = "/api/chat";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Builder for [`HttpConfig`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct HttpConfigBuilder {
    base_url: String,
    path: Option<String>,
    timeout: Option<Duration>,
}

impl HttpConfigBuilder {
    /// Creates a builder pointing at the given base URL, e.g.
    /// `https://example.com`.
    #[inline]
    pub fn with_base_url<S: Into<String>>(base_url: S) -> Self {
        Self {
            base_url: base_url.into(),
            path: None,
            timeout: None,
        }
    }

    /// Sets the path of the chat endpoint, `/api/chat` by default.
    #[inline]
    pub fn with_path<S: Into<String>>(mut self, path: S) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Sets how long a single request may take.
    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> HttpConfig {
        let base_url = self.base_url.trim_end_matches('/').to_owned();
        let mut path = self.path.unwrap_or_else(|| DEFAULT_CHAT_PATH.to_owned());
        if !path.starts_with('/') {
            path.insert(0, '/');
        }
        HttpConfig {
            base_url,
            path,
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
        }
    }
}

impl Default for HttpConfigBuilder {
    #[inline]
    fn default() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }
}

/// Configuration for the HTTP completion provider.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct HttpConfig {
    pub(crate) base_url: String,
    pub(crate) path: String,
    pub(crate) timeout: Duration,
}

impl HttpConfig {
    /// Returns the full URL of the chat endpoint.
    #[inline]
    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, self.path)
    }

    /// Returns the per-request timeout.
    #[inline]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HttpConfigBuilder::default().build();
        assert_eq!(config.endpoint(), "http://localhost:3000/api/chat");
        assert_eq!(config.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_joins_base_url_and_path() {
        let config = HttpConfigBuilder::with_base_url("https://chat.example/")
            .with_path("v2/chat")
            .with_timeout(Duration::from_secs(5))
            .build();
        assert_eq!(config.endpoint(), "https://chat.example/v2/chat");
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }
}
