use std::fmt;

use serde_json::Value;

use crate::{options::RequestOptions, schema::Raw};

/// HTTP methods the client issues.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// Upper-case method name as sent on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Everything needed for one logical call.
#[derive(Clone, Debug)]
pub struct RequestConfig<S = Raw> {
    pub method: Method,
    pub url: String,
    pub body: Option<Value>,
    pub options: RequestOptions<S>,
}

impl RequestConfig<Raw> {
    /// A request with no body and default options.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            body: None,
            options: RequestOptions::new(),
        }
    }
}

impl<S> RequestConfig<S> {
    /// Sets the JSON body.
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Replaces the per-call options, including the response contract.
    pub fn options<S2>(self, options: RequestOptions<S2>) -> RequestConfig<S2> {
        RequestConfig {
            method: self.method,
            url: self.url,
            body: self.body,
            options,
        }
    }
}
