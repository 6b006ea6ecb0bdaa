//! Response contracts.
//!
//! A [`ResponseSchema`] turns a decoded response body into the value a call
//! resolves to. [`Raw`] keeps the body untyped; [`Json`] deserializes it into
//! a concrete type; [`from_fn`] wraps a hand-written validator.

use std::{fmt, marker::PhantomData};

use serde::de::DeserializeOwned;
use serde_json::Value;

/// The response body did not match the expected shape.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
    /// Decoded body that failed validation.
    pub body: Value,
}

impl ValidationError {
    /// Creates an error for `body` with a diagnostic message.
    pub fn new(message: impl Into<String>, body: Value) -> Self {
        Self {
            message: message.into(),
            body,
        }
    }
}

/// Validator bound to the type a successful call resolves to.
pub trait ResponseSchema {
    type Output;

    fn validate(&self, body: Value) -> Result<Self::Output, ValidationError>;
}

/// No contract: the decoded body is returned as-is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Raw;

impl ResponseSchema for Raw {
    type Output = Value;

    fn validate(&self, body: Value) -> Result<Value, ValidationError> {
        Ok(body)
    }
}

/// Contract expressed as a `serde` type.
pub struct Json<T>(PhantomData<fn() -> T>);

impl<T> Json<T> {
    /// Creates a contract for `T`.
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for Json<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Json<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Json<T> {}

impl<T> fmt::Debug for Json<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Json<{}>", std::any::type_name::<T>())
    }
}

impl<T: DeserializeOwned> ResponseSchema for Json<T> {
    type Output = T;

    fn validate(&self, body: Value) -> Result<T, ValidationError> {
        T::deserialize(&body).map_err(|err| ValidationError::new(err.to_string(), body))
    }
}

/// Contract backed by a closure; see [`from_fn`].
#[derive(Clone, Copy)]
pub struct FnSchema<F>(F);

impl<F> fmt::Debug for FnSchema<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnSchema(<fn>)")
    }
}

/// Builds a schema from a validator closure.
///
/// The closure receives the decoded body by reference and returns either
/// the typed value or a diagnostic message.
pub fn from_fn<T, F>(f: F) -> FnSchema<F>
where
    F: Fn(&Value) -> Result<T, String>,
{
    FnSchema(f)
}

impl<T, F> ResponseSchema for FnSchema<F>
where
    F: Fn(&Value) -> Result<T, String>,
{
    type Output = T;

    fn validate(&self, body: Value) -> Result<T, ValidationError> {
        (self.0)(&body).map_err(|message| ValidationError::new(message, body))
    }
}

/// Decodes a response body the way it is handed to schemas.
///
/// Empty bodies become `null`, JSON is parsed, anything else is kept as a
/// JSON string holding the raw text.
pub(crate) fn decode_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_owned()))
}
