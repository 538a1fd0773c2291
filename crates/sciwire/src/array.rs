// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! N-dimensional array value types.
//!
//! These carry exactly the capability contract the coder engine needs from a
//! numeric array: a dtype name, a shape, a row-major little-endian byte view
//! of contiguous element data, and a constructor from those parts. Object
//! dtype arrays hold their elements as a flat row-major `Value` list instead
//! of raw bytes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Errors for array construction and typed element access.
#[derive(Debug)]
pub enum ArrayError {
    ByteLength { expected: usize, actual: usize },
    ElementCount { expected: usize, actual: usize },
    MaskLength { elements: usize, mask: usize },
    DtypeMismatch { expected: &'static str, found: &'static str },
    NotNumeric,
}

impl fmt::Display for ArrayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ByteLength { expected, actual } => {
                write!(
                    f,
                    "byte length {} does not match shape and dtype (expected {})",
                    actual, expected
                )
            }
            Self::ElementCount { expected, actual } => {
                write!(
                    f,
                    "element count {} does not match shape (expected {})",
                    actual, expected
                )
            }
            Self::MaskLength { elements, mask } => {
                write!(
                    f,
                    "mask length {} does not match element count {}",
                    mask, elements
                )
            }
            Self::DtypeMismatch { expected, found } => {
                write!(f, "dtype mismatch: expected {}, found {}", expected, found)
            }
            Self::NotNumeric => write!(f, "object dtype has no fixed-size elements"),
        }
    }
}

impl std::error::Error for ArrayError {}

/// Element type of an array, named the way numpy names them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DType {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Object,
}

impl DType {
    /// Dtype name as it appears in envelope payloads.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::I8 => "int8",
            Self::I16 => "int16",
            Self::I32 => "int32",
            Self::I64 => "int64",
            Self::U8 => "uint8",
            Self::U16 => "uint16",
            Self::U32 => "uint32",
            Self::U64 => "uint64",
            Self::F32 => "float32",
            Self::F64 => "float64",
            Self::Object => "object",
        }
    }

    /// Parse a dtype name; None for names this crate does not carry.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "bool" => Some(Self::Bool),
            "int8" => Some(Self::I8),
            "int16" => Some(Self::I16),
            "int32" => Some(Self::I32),
            "int64" => Some(Self::I64),
            "uint8" => Some(Self::U8),
            "uint16" => Some(Self::U16),
            "uint32" => Some(Self::U32),
            "uint64" => Some(Self::U64),
            "float32" => Some(Self::F32),
            "float64" => Some(Self::F64),
            "object" => Some(Self::Object),
            _ => None,
        }
    }

    /// Bytes per element; None for the object dtype.
    pub fn itemsize(&self) -> Option<usize> {
        match self {
            Self::Bool | Self::I8 | Self::U8 => Some(1),
            Self::I16 | Self::U16 => Some(2),
            Self::I32 | Self::U32 | Self::F32 => Some(4),
            Self::I64 | Self::U64 | Self::F64 => Some(8),
            Self::Object => None,
        }
    }
}

/// Rust scalar types that map onto a numeric dtype.
pub trait Element: Copy {
    const DTYPE: DType;
    fn write_le(&self, out: &mut Vec<u8>);
    /// `bytes` is exactly `DTYPE.itemsize()` long.
    fn read_le(bytes: &[u8]) -> Self;
}

macro_rules! impl_element {
    ($type:ty, $dtype:expr) => {
        impl Element for $type {
            const DTYPE: DType = $dtype;

            fn write_le(&self, out: &mut Vec<u8>) {
                out.extend_from_slice(&self.to_le_bytes());
            }

            fn read_le(bytes: &[u8]) -> Self {
                let mut buf = [0u8; std::mem::size_of::<$type>()];
                buf.copy_from_slice(bytes);
                <$type>::from_le_bytes(buf)
            }
        }
    };
}

impl_element!(i8, DType::I8);
impl_element!(i16, DType::I16);
impl_element!(i32, DType::I32);
impl_element!(i64, DType::I64);
impl_element!(u8, DType::U8);
impl_element!(u16, DType::U16);
impl_element!(u32, DType::U32);
impl_element!(u64, DType::U64);
impl_element!(f32, DType::F32);
impl_element!(f64, DType::F64);

impl Element for bool {
    const DTYPE: DType = DType::Bool;

    fn write_le(&self, out: &mut Vec<u8>) {
        out.push(*self as u8);
    }

    fn read_le(bytes: &[u8]) -> Self {
        bytes[0] != 0
    }
}

/// Contiguous element storage, row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ArrayData {
    /// Little-endian bytes for numeric dtypes.
    Raw(Vec<u8>),
    /// Flat element values for the object dtype.
    Values(Vec<Value>),
}

/// N-dimensional array: dtype, shape, contiguous row-major data.
///
/// Invariants enforced at construction: raw byte length equals
/// `product(shape) * itemsize`, object element count equals `product(shape)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NdArray {
    dtype: DType,
    shape: Vec<usize>,
    data: ArrayData,
}

/// Product of the shape; 1 for the zero-dimensional scalar shape.
fn shape_elements(shape: &[usize]) -> usize {
    shape.iter().product()
}

impl NdArray {
    /// Build a numeric array from raw little-endian row-major bytes.
    pub fn from_bytes(dtype: DType, shape: Vec<usize>, bytes: Vec<u8>) -> Result<Self, ArrayError> {
        let itemsize = dtype.itemsize().ok_or(ArrayError::NotNumeric)?;
        let expected = shape_elements(&shape) * itemsize;
        if bytes.len() != expected {
            return Err(ArrayError::ByteLength {
                expected,
                actual: bytes.len(),
            });
        }
        Ok(Self {
            dtype,
            shape,
            data: ArrayData::Raw(bytes),
        })
    }

    /// Build an object-dtype array from flat row-major element values.
    pub fn from_values(shape: Vec<usize>, values: Vec<Value>) -> Result<Self, ArrayError> {
        let expected = shape_elements(&shape);
        if values.len() != expected {
            return Err(ArrayError::ElementCount {
                expected,
                actual: values.len(),
            });
        }
        Ok(Self {
            dtype: DType::Object,
            shape,
            data: ArrayData::Values(values),
        })
    }

    /// Build a numeric array from typed elements in row-major order.
    pub fn from_elems<T: Element>(shape: Vec<usize>, elems: &[T]) -> Result<Self, ArrayError> {
        let expected = shape_elements(&shape);
        if elems.len() != expected {
            return Err(ArrayError::ElementCount {
                expected,
                actual: elems.len(),
            });
        }
        let mut bytes = Vec::with_capacity(elems.len() * std::mem::size_of::<T>());
        for elem in elems {
            elem.write_le(&mut bytes);
        }
        Ok(Self {
            dtype: T::DTYPE,
            shape,
            data: ArrayData::Raw(bytes),
        })
    }

    /// All-zero numeric array of the given dtype and shape.
    pub fn zeros(dtype: DType, shape: Vec<usize>) -> Result<Self, ArrayError> {
        let itemsize = dtype.itemsize().ok_or(ArrayError::NotNumeric)?;
        let bytes = vec![0u8; shape_elements(&shape) * itemsize];
        Self::from_bytes(dtype, shape, bytes)
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of elements (product of the shape).
    pub fn element_count(&self) -> usize {
        shape_elements(&self.shape)
    }

    pub fn data(&self) -> &ArrayData {
        &self.data
    }

    /// Raw byte view for numeric dtypes.
    pub fn raw_bytes(&self) -> Option<&[u8]> {
        match &self.data {
            ArrayData::Raw(bytes) => Some(bytes),
            ArrayData::Values(_) => None,
        }
    }

    /// Flat element view for the object dtype.
    pub fn object_values(&self) -> Option<&[Value]> {
        match &self.data {
            ArrayData::Raw(_) => None,
            ArrayData::Values(values) => Some(values),
        }
    }

    /// Read the elements back as a typed vector, row-major.
    pub fn to_elems<T: Element>(&self) -> Result<Vec<T>, ArrayError> {
        if self.dtype != T::DTYPE {
            return Err(ArrayError::DtypeMismatch {
                expected: T::DTYPE.name(),
                found: self.dtype.name(),
            });
        }
        match &self.data {
            ArrayData::Raw(bytes) => Ok(bytes
                .chunks_exact(std::mem::size_of::<T>())
                .map(T::read_le)
                .collect()),
            ArrayData::Values(_) => Err(ArrayError::NotNumeric),
        }
    }
}

/// A numeric array with a parallel per-element validity mask.
///
/// `mask[i]` true means element `i` is masked out. The mask always covers
/// every element exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaskedArray {
    data: NdArray,
    mask: Vec<bool>,
}

impl MaskedArray {
    pub fn new(data: NdArray, mask: Vec<bool>) -> Result<Self, ArrayError> {
        if mask.len() != data.element_count() {
            return Err(ArrayError::MaskLength {
                elements: data.element_count(),
                mask: mask.len(),
            });
        }
        Ok(Self { data, mask })
    }

    pub fn data(&self) -> &NdArray {
        &self.data
    }

    pub fn mask(&self) -> &[bool] {
        &self.mask
    }
}
