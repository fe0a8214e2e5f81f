use std::fmt::{self, Display};

/// The kind of error that occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The service could not be reached, or the connection broke.
    Transport,
    /// The service did not answer in time.
    Timeout,
    /// The service answered with a non-success status.
    Status,
    /// The reply could not be decoded into a completion.
    Decode,
    /// Any other errors.
    Other,
}

impl ErrorKind {
    /// Returns `true` if a later attempt of the same request may succeed.
    #[inline]
    pub fn is_transient(self) -> bool {
        matches!(self, ErrorKind::Transport | ErrorKind::Timeout)
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Transport => write!(f, "Service unreachable"),
            ErrorKind::Timeout => write!(f, "Request timed out"),
            ErrorKind::Status => write!(f, "Service error"),
            ErrorKind::Decode => write!(f, "Malformed reply"),
            ErrorKind::Other => write!(f, "Unknown error"),
        }
    }
}
