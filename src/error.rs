use crate::{policy::Outcome, schema::ValidationError};

/// Boxed error produced by a [`Transport`](crate::Transport) when no response was obtained.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// The transport never obtained a response (refused, DNS, timeout).
    #[error("network error: {0}")]
    Network(#[source] BoxError),
    /// The request was malformed (e.g. an unparsable URL); never retried.
    #[error("invalid request: {0}")]
    InvalidRequest(#[source] BoxError),
    /// Non-success HTTP status code with raw response body.
    #[error("http error {status}: {body}")]
    Http { status: u16, body: String },
    /// A transient failure that used up the retry budget.
    #[error("retries exhausted after {attempts} attempts: {last}")]
    RetryExhausted {
        /// Total transport calls, initial attempt included.
        attempts: u32,
        /// Error of the final attempt.
        #[source]
        last: Box<HttpError>,
    },
    /// The response body did not satisfy the response schema.
    #[error("response validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Coarse classification of an [`HttpError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    InvalidRequest,
    ClientError,
    RateLimited,
    ServerError,
    /// Non-2xx status outside 4xx/5xx, e.g. an unfollowed redirect.
    UnexpectedStatus,
    RetryExhausted,
    Validation,
}

impl HttpError {
    /// Coarse classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network(_) => ErrorKind::Network,
            Self::InvalidRequest(_) => ErrorKind::InvalidRequest,
            Self::Http { status: 429, .. } => ErrorKind::RateLimited,
            Self::Http { status, .. } if (400..500).contains(status) => ErrorKind::ClientError,
            Self::Http { status, .. } if (500..600).contains(status) => ErrorKind::ServerError,
            Self::Http { .. } => ErrorKind::UnexpectedStatus,
            Self::RetryExhausted { .. } => ErrorKind::RetryExhausted,
            Self::Validation(_) => ErrorKind::Validation,
        }
    }

    /// The error of the final transport attempt; `self` unless retries were exhausted.
    pub fn last_error(&self) -> &HttpError {
        match self {
            Self::RetryExhausted { last, .. } => last.last_error(),
            other => other,
        }
    }

    /// Status code of the failing response, looking through `RetryExhausted`.
    pub fn status(&self) -> Option<u16> {
        match self.last_error() {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw body of the failing response, looking through `RetryExhausted`.
    pub fn body(&self) -> Option<&str> {
        match self.last_error() {
            Self::Http { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Transport outcome this error represents, if it came from a transport attempt.
    pub fn outcome(&self) -> Option<Outcome> {
        match self.last_error() {
            Self::Network(_) => Some(Outcome::NetworkFailure),
            Self::Http { status, .. } => Some(Outcome::Status(*status)),
            _ => None,
        }
    }

    /// Whether a transient failure used up the retry budget.
    pub fn is_retry_exhausted(&self) -> bool {
        matches!(self, Self::RetryExhausted { .. })
    }
}
