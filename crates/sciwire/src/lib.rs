// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # sciwire - Tagged-envelope serialization for scientific values
//!
//! JSON and MessagePack carry maps, lists and a handful of scalars. Data
//! from scientific and engineering code also carries datetimes, time deltas,
//! sets, N-dimensional arrays, masked arrays and tabular frames. `sciwire`
//! bridges the gap: every such foreign value is wrapped in a tagged envelope
//! (a mapping with a reserved `"~#type"` key naming its coder) that
//! round-trips through encode/decode, at any nesting depth.
//!
//! ## Quick Start
//!
//! ```rust
//! use sciwire::formats::json;
//! use sciwire::{Config, DType, Map, NdArray, Value};
//!
//! let config = Config::default();
//!
//! let mut tree = Map::new();
//! tree.insert("label".to_string(), Value::from("run-7"));
//! tree.insert(
//!     "grid".to_string(),
//!     Value::from(NdArray::zeros(DType::F64, vec![2, 3]).unwrap()),
//! );
//! let tree = Value::Map(tree);
//!
//! let text = json::to_string(&tree, &config).unwrap();
//! let back = json::from_str(&text, &config).unwrap();
//! assert_eq!(back, tree);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +--------------------------------------------------------------+
//! |                      Format adapters                         |
//! |   formats::json (base64 bridge) | formats::msgpack (native)  |
//! +--------------------------------------------------------------+
//! |                     Recursive engine                         |
//! |   encode_tree / decode_tree over the Value tree              |
//! +--------------------------------------------------------------+
//! |                      Coder registry                          |
//! |   ordered TypeCoders, first claim wins, tags are injective   |
//! +--------------------------------------------------------------+
//! |                       Value types                            |
//! |   DateTime | TimeDelta | ValueSet | NdArray | Masked | Frame |
//! +--------------------------------------------------------------+
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Value`] | Recursive tree union the engine walks |
//! | [`Config`] | Registry, fallback gate and type-key override per call |
//! | [`CoderRegistry`] | Ordered coder list consulted by the engine |
//! | [`TypeCoder`] | Contract for one foreign type |
//! | [`NdArray`] | Dtype + shape + row-major little-endian bytes |
//! | [`Frame`] | Named equal-length columns with a JSON text transform |
//!
//! Values no coder claims fail encoding loudly unless the caller opts into
//! the opaque fallback, which stores a build-specific binary blob under the
//! `opaque-fallback` tag. Mappings with an unrecognized tag decode to an
//! inert mapping with the tag reattached, so newer producers stay readable.

pub mod array;
pub mod coder;
pub mod config;
pub mod engine;
pub mod error;
pub mod formats;
pub mod frame;
pub mod value;

pub use array::{ArrayData, ArrayError, DType, Element, MaskedArray, NdArray};
pub use coder::{
    CoderRegistry, DateTimeCoder, Envelope, FrameCoder, MaskedArrayCoder, NdArrayCoder, SetCoder,
    TimeDeltaCoder, TypeCoder, OPAQUE_TAG,
};
pub use config::{Config, TYPE_KEY};
pub use engine::{decode_tree, encode_tree, CoderContext};
pub use error::{CoderError, CoderResult};
pub use formats::{FormatError, FormatResult, PackError};
pub use frame::{Frame, FrameError};
pub use value::{Map, TimeDelta, Value, ValueSet};
