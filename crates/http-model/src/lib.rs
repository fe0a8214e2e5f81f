//! A completion provider for the `/api/chat` HTTP endpoint.
//!
//! The endpoint takes `{ "Body": <input> }` and answers with a JSON
//! object carrying at least `{ "text": <reply> }`.

#[macro_use]
extern crate tracing;

mod config;
mod proto;

use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::sync::Arc;

use chatbox_model::{
    Completion, CompletionProvider, CompletionProviderError,
    CompletionRequest, ErrorKind,
};
use mime::Mime;
use reqwest::{Client, Response, header};

pub use config::{HttpConfig, HttpConfigBuilder};
use proto::ChatResponse;

/// Error type for [`HttpProvider`].
#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
}

impl Error {
    fn new(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    fn from_reqwest(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            ErrorKind::Timeout
        } else if err.is_status() {
            ErrorKind::Status
        } else if err.is_decode() {
            ErrorKind::Decode
        } else {
            ErrorKind::Transport
        };
        Self::new(format!("{err}"), kind)
    }

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for Error {}

impl CompletionProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// Completion provider backed by the chat HTTP endpoint.
#[derive(Clone, Debug)]
pub struct HttpProvider {
    client: Client,
    config: Arc<HttpConfig>,
}

impl HttpProvider {
    /// Creates a new `HttpProvider` with the given configuration.
    #[inline]
    pub fn new(config: HttpConfig) -> Self {
        Self {
            client: Client::new(),
            config: Arc::new(config),
        }
    }

    /// Returns the configuration of this provider.
    #[inline]
    pub fn config(&self) -> &HttpConfig {
        &self.config
    }
}

impl CompletionProvider for HttpProvider {
    type Error = Error;

    fn complete(
        &self,
        req: &CompletionRequest,
    ) -> impl Future<Output = Result<Completion, Self::Error>> + Send + 'static
    {
        let body = proto::create_request(req);
        let endpoint = self.config.endpoint();
        debug!("posting {} bytes to {endpoint}", req.input.len());
        let resp_fut = self
            .client
            .post(endpoint)
            .header(header::ACCEPT, "application/json")
            .timeout(self.config.timeout)
            .json(&body)
            .send();

        async move {
            let resp = resp_fut
                .await
                .and_then(Response::error_for_status)
                .map_err(Error::from_reqwest)?;

            let content_type = resp
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(ToOwned::to_owned);
            if let Some(content_type) = content_type {
                let is_json = content_type
                    .parse::<Mime>()
                    .map(|m| {
                        m.subtype() == mime::JSON
                            || m.suffix() == Some(mime::JSON)
                    })
                    .unwrap_or(false);
                if !is_json {
                    return Err(Error::new(
                        format!("Unexpected content type: {content_type}"),
                        ErrorKind::Decode,
                    ));
                }
            }

            let bytes = resp.bytes().await.map_err(Error::from_reqwest)?;
            let reply: ChatResponse =
                serde_json::from_slice(&bytes).map_err(|err| {
                    warn!("undecodable reply: {err}");
                    Error::new(format!("{err}"), ErrorKind::Decode)
                })?;
            trace!("got a reply of {} chars", reply.text.len());
            Ok(proto::into_completion(reply))
        }
    }
}
