// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wire format adapters.
//!
//! Each adapter binds the coder engine to one concrete wire format and
//! exposes the same six operations: serialize to memory, deserialize from
//! memory, and stream/file variants (scoped resources, closed on every exit
//! path). The text format runs the base64 bridge for raw bytes; the binary
//! format passes bytes through natively.

pub mod json;
pub mod msgpack;

use std::fmt;

use crate::error::CoderError;

pub use msgpack::PackError;

/// Errors raised by the format adapters.
#[derive(Debug)]
pub enum FormatError {
    /// Engine-level failure (unsupported type, malformed envelope payload).
    Coder(CoderError),
    /// The underlying JSON codec rejected the document.
    Json(serde_json::Error),
    /// Stream or file I/O failure.
    Io(std::io::Error),
    /// Malformed MessagePack input.
    Pack(PackError),
    /// JSON has no representation for NaN or infinities.
    NonFiniteFloat,
    /// Invalid text under the base64 bridge key.
    Base64 { reason: String },
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Coder(e) => write!(f, "{}", e),
            Self::Json(e) => write!(f, "JSON codec error: {}", e),
            Self::Io(e) => write!(f, "I/O error: {}", e),
            Self::Pack(e) => write!(f, "{}", e),
            Self::NonFiniteFloat => {
                write!(f, "non-finite float has no JSON representation")
            }
            Self::Base64 { reason } => write!(f, "invalid base64 payload: {}", reason),
        }
    }
}

impl std::error::Error for FormatError {}

impl From<CoderError> for FormatError {
    fn from(e: CoderError) -> Self {
        Self::Coder(e)
    }
}

impl From<serde_json::Error> for FormatError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl From<std::io::Error> for FormatError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<PackError> for FormatError {
    fn from(e: PackError) -> Self {
        Self::Pack(e)
    }
}

pub type FormatResult<T> = std::result::Result<T, FormatError>;
