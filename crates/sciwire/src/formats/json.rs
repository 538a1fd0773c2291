// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! JSON adapter.
//!
//! JSON has no native binary type, so raw bytes cross the boundary through
//! the base64 bridge: every `Value::Bytes` in the wire tree becomes a
//! single-key mapping `{"__base64__": <text>}` during conversion to
//! `serde_json::Value`, and any JSON object whose only key is the bridge key
//! becomes bytes again on the way in. The bridge runs inside the tree
//! conversion, before the recursive decoder sees the tree, so envelope
//! payloads that embed byte blocks (array element data) arrive intact.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::config::Config;
use crate::engine::{decode_tree, encode_tree};
use crate::error::CoderError;
use crate::formats::{FormatError, FormatResult};
use crate::value::{Map, Value};

/// Reserved bridge key for base64-coded byte payloads. Distinct from the
/// type key; a mapping with exactly this one key is consumed by the bridge.
pub const BASE64_KEY: &str = "__base64__";

/// Serialize a value tree to a JSON string.
pub fn to_string(value: &Value, config: &Config) -> FormatResult<String> {
    let wire = encode_tree(value, config)?;
    let json = to_json_value(&wire)?;
    Ok(serde_json::to_string(&json)?)
}

/// Serialize a value tree to pretty-printed JSON.
pub fn to_string_pretty(value: &Value, config: &Config) -> FormatResult<String> {
    let wire = encode_tree(value, config)?;
    let json = to_json_value(&wire)?;
    Ok(serde_json::to_string_pretty(&json)?)
}

/// Deserialize a value tree from a JSON string.
pub fn from_str(text: &str, config: &Config) -> FormatResult<Value> {
    let json: serde_json::Value = serde_json::from_str(text)?;
    let tree = from_json_value(json)?;
    Ok(decode_tree(tree, config)?)
}

/// Serialize a value tree to a writer; the writer is flushed before return.
pub fn to_writer<W: Write>(mut writer: W, value: &Value, config: &Config) -> FormatResult<()> {
    let wire = encode_tree(value, config)?;
    let json = to_json_value(&wire)?;
    serde_json::to_writer(&mut writer, &json)?;
    writer.flush()?;
    Ok(())
}

/// Deserialize a value tree from a reader.
pub fn from_reader<R: Read>(reader: R, config: &Config) -> FormatResult<Value> {
    let json: serde_json::Value = serde_json::from_reader(reader)?;
    let tree = from_json_value(json)?;
    Ok(decode_tree(tree, config)?)
}

/// Serialize to a file; the handle is closed on every exit path.
pub fn to_file<P: AsRef<Path>>(path: P, value: &Value, config: &Config) -> FormatResult<()> {
    let file = File::create(path)?;
    to_writer(BufWriter::new(file), value, config)
}

/// Deserialize from a file; the handle is closed on every exit path.
pub fn from_file<P: AsRef<Path>>(path: P, config: &Config) -> FormatResult<Value> {
    let file = File::open(path)?;
    from_reader(BufReader::new(file), config)
}

/// Wire tree to JSON tree; applies the base64 bridge to byte nodes.
fn to_json_value(value: &Value) -> FormatResult<serde_json::Value> {
    match value {
        Value::Null => Ok(serde_json::Value::Null),
        Value::Bool(b) => Ok(serde_json::Value::Bool(*b)),
        Value::Int(i) => Ok(serde_json::Value::from(*i)),
        Value::UInt(u) => Ok(serde_json::Value::from(*u)),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .ok_or(FormatError::NonFiniteFloat),
        Value::String(s) => Ok(serde_json::Value::String(s.clone())),
        Value::Bytes(bytes) => {
            let mut bridge = serde_json::Map::new();
            bridge.insert(
                BASE64_KEY.to_string(),
                serde_json::Value::String(STANDARD.encode(bytes)),
            );
            Ok(serde_json::Value::Object(bridge))
        }
        Value::List(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(to_json_value(item)?);
            }
            Ok(serde_json::Value::Array(out))
        }
        Value::Map(map) => {
            let mut out = serde_json::Map::new();
            for (key, child) in map {
                out.insert(key.clone(), to_json_value(child)?);
            }
            Ok(serde_json::Value::Object(out))
        }
        foreign => Err(FormatError::Coder(CoderError::UnsupportedType {
            type_name: foreign.type_name().to_string(),
            preview: foreign.preview(64),
        })),
    }
}

/// JSON tree to wire tree; replaces bridge mappings with bytes before the
/// recursive decoder runs.
fn from_json_value(json: serde_json::Value) -> FormatResult<Value> {
    match json {
        serde_json::Value::Null => Ok(Value::Null),
        serde_json::Value::Bool(b) => Ok(Value::Bool(b)),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Int(i))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::UInt(u))
            } else {
                Ok(Value::Float(n.as_f64().unwrap_or_default()))
            }
        }
        serde_json::Value::String(s) => Ok(Value::String(s)),
        serde_json::Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(from_json_value(item)?);
            }
            Ok(Value::List(out))
        }
        serde_json::Value::Object(map) => {
            if map.len() == 1 {
                if let Some(serde_json::Value::String(text)) = map.get(BASE64_KEY) {
                    let bytes = STANDARD.decode(text).map_err(|e| FormatError::Base64 {
                        reason: e.to_string(),
                    })?;
                    return Ok(Value::Bytes(bytes));
                }
            }
            let mut out = Map::new();
            for (key, child) in map {
                out.insert(key, from_json_value(child)?);
            }
            Ok(Value::Map(out))
        }
    }
}
