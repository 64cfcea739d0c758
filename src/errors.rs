use thiserror::Error;

use crate::auth::HeaderError;
use crate::null_object::BinaryOp;

// Everything that can go wrong while navigating a document.
#[derive(Debug, Error)]
pub enum NavError {
    // The navigation expression itself is malformed.
    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid JSON document: {0}")]
    Json(#[from] serde_json::Error),

    // The dynamic-dispatch failure: a named member or method does not exist on the receiver.
    #[error("'{receiver}' does not contain a definition for '{name}'")]
    MemberNotFound { receiver: &'static str, name: String },

    #[error("cannot index {receiver} with [{index}]")]
    InvalidIndex { receiver: &'static str, index: String },

    #[error("{0} is not iterable")]
    NotIterable(&'static str),

    #[error("{0} is not callable")]
    NotCallable(&'static str),

    #[error("operator '{op}' cannot be applied to {left} and {right}")]
    UnsupportedOperation {
        op: BinaryOp,
        left: &'static str,
        right: &'static str,
    },

    #[error("cannot coerce {found} to {target}: {source}")]
    Coercion {
        target: &'static str,
        found: &'static str,
        #[source]
        source: serde_json::Error,
    },

    // Raised by the authenticator hook when the header collection rejects a write.
    #[error("could not set '{key}' = '{value}'")]
    Configuration {
        key: String,
        value: String,
        #[source]
        source: HeaderError,
    },
}

pub type Result<T> = std::result::Result<T, NavError>;
