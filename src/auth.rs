// src/auth.rs

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;
use tracing::debug;

use crate::errors::{NavError, Result};

pub const AUTHORIZATION: &str = "Authorization";

/// Why a header collection refused a write.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HeaderError {
    #[error("invalid header name")]
    InvalidName,
    #[error("invalid header value")]
    InvalidValue,
}

/// Mutable headers of a pending request.
pub trait HeaderCollection {
    fn set_header(&mut self, key: &str, value: &str) -> std::result::Result<(), HeaderError>;
    fn header(&self, key: &str) -> Option<&str>;
}

impl HeaderCollection for HashMap<String, String> {
    fn set_header(&mut self, key: &str, value: &str) -> std::result::Result<(), HeaderError> {
        self.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn header(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }
}

/// Header map that enforces HTTP field syntax. Names are case-insensitive.
#[derive(Debug, Default, Clone)]
pub struct Headers {
    inner: BTreeMap<String, String>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

// RFC 9110 token characters.
fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c)
}

impl HeaderCollection for Headers {
    fn set_header(&mut self, key: &str, value: &str) -> std::result::Result<(), HeaderError> {
        if key.is_empty() || !key.chars().all(is_token_char) {
            return Err(HeaderError::InvalidName);
        }
        if value.chars().any(|c| c != '\t' && c.is_ascii_control()) {
            return Err(HeaderError::InvalidValue);
        }
        self.inner.insert(key.to_ascii_lowercase(), value.to_string());
        Ok(())
    }

    fn header(&self, key: &str) -> Option<&str> {
        self.inner.get(&key.to_ascii_lowercase()).map(String::as_str)
    }
}

/// Writes `key: value`, normalizing any rejection into [`NavError::Configuration`].
pub fn set_header<H>(headers: &mut H, key: &str, value: &str) -> Result<()>
where
    H: HeaderCollection + ?Sized,
{
    headers
        .set_header(key, value)
        .map_err(|source| NavError::Configuration {
            key: key.to_string(),
            value: value.to_string(),
            source,
        })
}

pub trait Authenticator {
    /// The token currently held, if any. Acquiring and refreshing it is up
    /// to the implementor.
    fn current_token(&self) -> Option<&str>;

    /// Hook invoked before a request is dispatched.
    fn configure_request<H>(&self, headers: &mut H) -> Result<()>
    where
        H: HeaderCollection + ?Sized,
    {
        match self.current_token() {
            Some(token) if !token.is_empty() => {
                debug!("attaching authorization header");
                set_header(headers, AUTHORIZATION, token)
            }
            _ => Ok(()),
        }
    }
}

/// Holds a token handed to it from elsewhere.
#[derive(Debug, Default, Clone)]
pub struct TokenAuthenticator {
    token: Option<String>,
}

impl TokenAuthenticator {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    pub fn clear(&mut self) {
        self.token = None;
    }
}

impl Authenticator for TokenAuthenticator {
    fn current_token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}
