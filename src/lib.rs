//! `resilient-http` is an async HTTP client that retries transient failures
//! and optionally validates response bodies against a typed contract.
//!
//! Every verb method shares one retry loop:
//! - network failures, `429` and `5xx` are retried with capped exponential
//!   backoff (3 retries by default), one `warn` log event per retry;
//! - other `4xx` responses fail immediately;
//! - the response body is handed to a [`ResponseSchema`]: [`Raw`] returns it
//!   untyped, [`Json`] deserializes it into `T`.
//!
//! ```no_run
//! use resilient_http::{HttpClient, RequestOptions};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct User {
//!     id: u64,
//! }
//!
//! # async fn run() -> resilient_http::Result<()> {
//! let http = HttpClient::new();
//! let user: User = http
//!     .get("https://api.example.com/users/1", RequestOptions::new().json::<User>())
//!     .await?;
//! let raw = http
//!     .get("https://api.example.com/health", RequestOptions::new())
//!     .await?;
//! println!("{} {raw}", user.id);
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod options;
mod retry;
mod transport;
mod types;

pub mod env;
pub mod logging;
pub mod policy;
pub mod schema;

pub use client::HttpClient;
pub use error::{BoxError, ErrorKind, HttpError};
pub use logging::{LogLevel, Logger, Metadata, TracingLogger};
pub use options::{ClientOptions, RequestOptions};
pub use policy::{Backoff, Outcome, RetryPolicy};
pub use retry::Retrying;
pub use schema::{Json, Raw, ResponseSchema, ValidationError};
pub use transport::{InvalidRequest, ReqwestTransport, Transport, TransportRequest, TransportResponse};
pub use types::{Method, RequestConfig};

pub type Result<T> = std::result::Result<T, HttpError>;
