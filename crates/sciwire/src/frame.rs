// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Tabular frame value type.
//!
//! A frame is an ordered collection of named, equal-length columns of scalar
//! cells. It carries its own JSON text round-trip, and the frame coder ships
//! exactly that text as the envelope payload. Round-trip precision of coded
//! frames is therefore bounded by this transform, not by the outer wire
//! format.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Errors for frame construction and the native text transform.
#[derive(Debug)]
pub enum FrameError {
    ColumnLength { expected: usize, actual: usize },
    DuplicateColumn(String),
    UnsupportedCell { column: String, type_name: &'static str },
    NonFiniteCell { column: String },
    Parse(String),
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ColumnLength { expected, actual } => {
                write!(
                    f,
                    "column length {} does not match frame length {}",
                    actual, expected
                )
            }
            Self::DuplicateColumn(name) => write!(f, "duplicate column name: '{}'", name),
            Self::UnsupportedCell { column, type_name } => {
                write!(
                    f,
                    "column '{}' holds a {} cell; frame cells must be scalars",
                    column, type_name
                )
            }
            Self::NonFiniteCell { column } => {
                write!(f, "column '{}' holds a non-finite float", column)
            }
            Self::Parse(reason) => write!(f, "invalid frame text: {}", reason),
        }
    }
}

impl std::error::Error for FrameError {}

/// Ordered named columns of equal length.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Frame {
    names: Vec<String>,
    columns: Vec<Vec<Value>>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column. The first column fixes the frame length; every later
    /// column must match it. Cells are restricted to finite scalars
    /// (null, bool, int, float, string).
    pub fn push_column(
        &mut self,
        name: impl Into<String>,
        values: Vec<Value>,
    ) -> Result<(), FrameError> {
        let name = name.into();
        if self.names.contains(&name) {
            return Err(FrameError::DuplicateColumn(name));
        }
        if let Some(first) = self.columns.first() {
            if values.len() != first.len() {
                return Err(FrameError::ColumnLength {
                    expected: first.len(),
                    actual: values.len(),
                });
            }
        }
        for cell in &values {
            match cell {
                Value::Null | Value::Bool(_) | Value::Int(_) | Value::UInt(_)
                | Value::String(_) => {}
                Value::Float(f) if f.is_finite() => {}
                Value::Float(_) => {
                    return Err(FrameError::NonFiniteCell { column: name });
                }
                other => {
                    return Err(FrameError::UnsupportedCell {
                        column: name,
                        type_name: other.type_name(),
                    });
                }
            }
        }
        self.names.push(name);
        self.columns.push(values);
        Ok(())
    }

    /// Column names in frame order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Cells of a named column.
    pub fn column(&self, name: &str) -> Option<&[Value]> {
        let index = self.names.iter().position(|n| n == name)?;
        Some(&self.columns[index])
    }

    pub fn column_count(&self) -> usize {
        self.names.len()
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map(Vec::len).unwrap_or(0)
    }

    /// Native text transform: serialize to JSON text.
    ///
    /// Shape: `{"columns": [names...], "data": [[column cells]...]}`.
    pub fn to_json_text(&self) -> Result<String, FrameError> {
        let names: Vec<serde_json::Value> = self
            .names
            .iter()
            .map(|n| serde_json::Value::String(n.clone()))
            .collect();
        let mut data = Vec::with_capacity(self.columns.len());
        for (name, column) in self.names.iter().zip(&self.columns) {
            let mut cells = Vec::with_capacity(column.len());
            for cell in column {
                cells.push(cell_to_json(name, cell)?);
            }
            data.push(serde_json::Value::Array(cells));
        }
        let mut root = serde_json::Map::new();
        root.insert("columns".to_string(), serde_json::Value::Array(names));
        root.insert("data".to_string(), serde_json::Value::Array(data));
        serde_json::to_string(&serde_json::Value::Object(root))
            .map_err(|e| FrameError::Parse(e.to_string()))
    }

    /// Native text transform: parse JSON text produced by [`Frame::to_json_text`].
    pub fn from_json_text(text: &str) -> Result<Self, FrameError> {
        let root: serde_json::Value =
            serde_json::from_str(text).map_err(|e| FrameError::Parse(e.to_string()))?;
        let root = root
            .as_object()
            .ok_or_else(|| FrameError::Parse("top level is not an object".into()))?;
        let names = root
            .get("columns")
            .and_then(serde_json::Value::as_array)
            .ok_or_else(|| FrameError::Parse("missing 'columns' array".into()))?;
        let data = root
            .get("data")
            .and_then(serde_json::Value::as_array)
            .ok_or_else(|| FrameError::Parse("missing 'data' array".into()))?;
        if names.len() != data.len() {
            return Err(FrameError::Parse(format!(
                "{} column names but {} data columns",
                names.len(),
                data.len()
            )));
        }

        let mut frame = Frame::new();
        for (name, column) in names.iter().zip(data) {
            let name = name
                .as_str()
                .ok_or_else(|| FrameError::Parse("column name is not a string".into()))?;
            let cells = column
                .as_array()
                .ok_or_else(|| FrameError::Parse("data column is not an array".into()))?;
            let values: Vec<Value> = cells.iter().map(cell_from_json).collect::<Result<_, _>>()?;
            frame.push_column(name, values)?;
        }
        Ok(frame)
    }
}

fn cell_to_json(column: &str, cell: &Value) -> Result<serde_json::Value, FrameError> {
    match cell {
        Value::Null => Ok(serde_json::Value::Null),
        Value::Bool(b) => Ok(serde_json::Value::Bool(*b)),
        Value::Int(i) => Ok(serde_json::Value::from(*i)),
        Value::UInt(u) => Ok(serde_json::Value::from(*u)),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .ok_or_else(|| FrameError::NonFiniteCell {
                column: column.to_string(),
            }),
        Value::String(s) => Ok(serde_json::Value::String(s.clone())),
        other => Err(FrameError::UnsupportedCell {
            column: column.to_string(),
            type_name: other.type_name(),
        }),
    }
}

fn cell_from_json(cell: &serde_json::Value) -> Result<Value, FrameError> {
    match cell {
        serde_json::Value::Null => Ok(Value::Null),
        serde_json::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Int(i))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::from_u64(u))
            } else {
                Ok(Value::Float(n.as_f64().unwrap_or_default()))
            }
        }
        serde_json::Value::String(s) => Ok(Value::String(s.clone())),
        other => Err(FrameError::Parse(format!(
            "cell is not a scalar: {}",
            other
        ))),
    }
}
