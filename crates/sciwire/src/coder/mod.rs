// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type coders: one per foreign type the wire formats cannot carry natively.
//!
//! A coder knows how to test membership (`claims`), encode a native value to
//! a tagged envelope, and decode an envelope back. Coders that embed nested
//! trees in their payload (sets, object-dtype arrays) recurse through the
//! [`CoderContext`] handed to them rather than calling the walker directly,
//! so a custom registry always reaches the configuration that is actually in
//! effect.

mod array;
mod frame;
mod opaque;
mod registry;
mod set;
mod time;

pub use array::{MaskedArrayCoder, NdArrayCoder};
pub use frame::FrameCoder;
pub use opaque::OPAQUE_TAG;
pub(crate) use opaque::{decode_opaque, encode_opaque};
pub use registry::CoderRegistry;
pub use set::SetCoder;
pub use time::{DateTimeCoder, TimeDeltaCoder};

use crate::engine::CoderContext;
use crate::error::CoderError;
use crate::value::{Map, Value};

/// A tagged envelope: the reserved type key mapping to the coder's tag, plus
/// coder-specific payload fields at the same level.
pub type Envelope = Map;

/// One supported foreign type.
pub trait TypeCoder: Send + Sync {
    /// Unique tag within a registry.
    fn tag(&self) -> &'static str;

    /// Membership test; the walker consults coders in registration order and
    /// the first claim wins.
    fn claims(&self, value: &Value) -> bool;

    /// Encode a claimed value to a complete envelope, including the reserved
    /// type key (available as `cx.type_key()`). Must not mutate `value`.
    fn encode(&self, value: &Value, cx: &CoderContext<'_>) -> Result<Envelope, CoderError>;

    /// Decode an envelope whose type key has already been stripped. Missing
    /// or malformed payload fields must surface as [`CoderError::Decode`].
    fn decode(&self, payload: Envelope, cx: &CoderContext<'_>) -> Result<Value, CoderError>;
}

/// Error for an `encode` call on a value the coder does not claim.
pub(crate) fn claim_mismatch(value: &Value) -> CoderError {
    CoderError::UnsupportedType {
        type_name: value.type_name().to_string(),
        preview: value.preview(64),
    }
}

/// Decode error for `tag` with the given reason.
pub(crate) fn decode_err(tag: &str, reason: impl Into<String>) -> CoderError {
    CoderError::Decode {
        tag: tag.to_string(),
        reason: reason.into(),
    }
}

/// Remove a required payload field.
pub(crate) fn take_field(
    payload: &mut Envelope,
    tag: &str,
    field: &str,
) -> Result<Value, CoderError> {
    payload
        .remove(field)
        .ok_or_else(|| decode_err(tag, format!("missing required field '{}'", field)))
}

/// Remove a required string field.
pub(crate) fn take_string(
    payload: &mut Envelope,
    tag: &str,
    field: &str,
) -> Result<String, CoderError> {
    match take_field(payload, tag, field)? {
        Value::String(s) => Ok(s),
        other => Err(decode_err(
            tag,
            format!("field '{}' must be a string, got {}", field, other.type_name()),
        )),
    }
}

/// Remove a required integer field.
pub(crate) fn take_i64(payload: &mut Envelope, tag: &str, field: &str) -> Result<i64, CoderError> {
    match take_field(payload, tag, field)? {
        Value::Int(i) => Ok(i),
        other => Err(decode_err(
            tag,
            format!(
                "field '{}' must be an integer, got {}",
                field,
                other.type_name()
            ),
        )),
    }
}

/// Remove a required raw-bytes field.
pub(crate) fn take_bytes(
    payload: &mut Envelope,
    tag: &str,
    field: &str,
) -> Result<Vec<u8>, CoderError> {
    match take_field(payload, tag, field)? {
        Value::Bytes(b) => Ok(b),
        other => Err(decode_err(
            tag,
            format!("field '{}' must be bytes, got {}", field, other.type_name()),
        )),
    }
}

/// Remove a required list field.
pub(crate) fn take_list(
    payload: &mut Envelope,
    tag: &str,
    field: &str,
) -> Result<Vec<Value>, CoderError> {
    match take_field(payload, tag, field)? {
        Value::List(items) => Ok(items),
        other => Err(decode_err(
            tag,
            format!("field '{}' must be a list, got {}", field, other.type_name()),
        )),
    }
}

/// Fresh envelope carrying only the reserved type key for `tag`.
pub(crate) fn envelope_with_tag(cx: &CoderContext<'_>, tag: &str) -> Envelope {
    let mut env = Envelope::new();
    env.insert(
        cx.type_key().to_string(),
        Value::String(tag.to_string()),
    );
    env
}
