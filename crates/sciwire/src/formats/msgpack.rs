// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! MessagePack adapter.
//!
//! In-tree implementation of the MessagePack format over the wire subset of
//! [`Value`]: nil, bool, all integer widths, float32/64, str, bin, array and
//! map families. Raw bytes use the bin family directly; no base64 step.
//! Integers are written minimal-width and accepted at any width. Map keys
//! must be strings, floats travel as IEEE-754 bits (non-finite included),
//! and trailing bytes after the top-level value are an error.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::config::Config;
use crate::engine::{decode_tree, encode_tree};
use crate::formats::FormatResult;
use crate::value::{Map, Value};

/// Errors for the MessagePack wire layer.
#[derive(Debug, Clone)]
pub enum PackError {
    ReadFailed { offset: usize, reason: String },
    InvalidData { reason: String },
    TrailingBytes { remaining: usize },
}

impl fmt::Display for PackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFailed { offset, reason } => {
                write!(f, "read failed at offset {}: {}", offset, reason)
            }
            Self::InvalidData { reason } => write!(f, "invalid MessagePack data: {}", reason),
            Self::TrailingBytes { remaining } => {
                write!(f, "{} trailing bytes after top-level value", remaining)
            }
        }
    }
}

impl std::error::Error for PackError {}

/// Serialize a value tree to MessagePack bytes.
pub fn to_vec(value: &Value, config: &Config) -> FormatResult<Vec<u8>> {
    let wire = encode_tree(value, config)?;
    let mut packer = Packer::new();
    packer.pack_value(&wire)?;
    Ok(packer.into_bytes())
}

/// Deserialize a value tree from MessagePack bytes.
pub fn from_slice(bytes: &[u8], config: &Config) -> FormatResult<Value> {
    let mut unpacker = Unpacker::new(bytes);
    let tree = unpacker.unpack_value()?;
    if !unpacker.is_eof() {
        return Err(PackError::TrailingBytes {
            remaining: unpacker.remaining(),
        }
        .into());
    }
    Ok(decode_tree(tree, config)?)
}

/// Serialize a value tree to a writer; the writer is flushed before return.
pub fn to_writer<W: Write>(mut writer: W, value: &Value, config: &Config) -> FormatResult<()> {
    let bytes = to_vec(value, config)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Deserialize a value tree from a reader (reads to end of stream).
pub fn from_reader<R: Read>(mut reader: R, config: &Config) -> FormatResult<Value> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    from_slice(&bytes, config)
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

/// MessagePack encoder over the wire subset of `Value`.
struct Packer {
    buffer: Vec<u8>,
}

impl Packer {
    fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    fn pack_value(&mut self, value: &Value) -> Result<(), PackError> {
        match value {
            Value::Null => {
                self.buffer.push(0xC0);
                Ok(())
            }
            Value::Bool(false) => {
                self.buffer.push(0xC2);
                Ok(())
            }
            Value::Bool(true) => {
                self.buffer.push(0xC3);
                Ok(())
            }
            Value::Int(i) => {
                self.pack_int(*i);
                Ok(())
            }
            Value::UInt(u) => {
                self.pack_uint(*u);
                Ok(())
            }
            Value::Float(f) => {
                self.buffer.push(0xCB);
                self.buffer.extend(&f.to_bits().to_be_bytes());
                Ok(())
            }
            Value::String(s) => self.pack_str(s),
            Value::Bytes(b) => self.pack_bin(b),
            Value::List(items) => {
                self.pack_array_header(items.len())?;
                for item in items {
                    self.pack_value(item)?;
                }
                Ok(())
            }
            Value::Map(map) => {
                self.pack_map_header(map.len())?;
                for (key, child) in map {
                    self.pack_str(key)?;
                    self.pack_value(child)?;
                }
                Ok(())
            }
            foreign => Err(PackError::InvalidData {
                reason: format!("cannot pack {} value; not a wire type", foreign.type_name()),
            }),
        }
    }

    fn pack_int(&mut self, v: i64) {
        if v >= 0 {
            self.pack_uint(v as u64);
        } else if v >= -32 {
            self.buffer.push(v as u8);
        } else if v >= i8::MIN as i64 {
            self.buffer.push(0xD0);
            self.buffer.push(v as i8 as u8);
        } else if v >= i16::MIN as i64 {
            self.buffer.push(0xD1);
            self.buffer.extend(&(v as i16).to_be_bytes());
        } else if v >= i32::MIN as i64 {
            self.buffer.push(0xD2);
            self.buffer.extend(&(v as i32).to_be_bytes());
        } else {
            self.buffer.push(0xD3);
            self.buffer.extend(&v.to_be_bytes());
        }
    }

    fn pack_uint(&mut self, v: u64) {
        if v <= 0x7F {
            self.buffer.push(v as u8);
        } else if v <= u8::MAX as u64 {
            self.buffer.push(0xCC);
            self.buffer.push(v as u8);
        } else if v <= u16::MAX as u64 {
            self.buffer.push(0xCD);
            self.buffer.extend(&(v as u16).to_be_bytes());
        } else if v <= u32::MAX as u64 {
            self.buffer.push(0xCE);
            self.buffer.extend(&(v as u32).to_be_bytes());
        } else {
            self.buffer.push(0xCF);
            self.buffer.extend(&v.to_be_bytes());
        }
    }

    fn pack_str(&mut self, s: &str) -> Result<(), PackError> {
        let len = s.len();
        if len <= 31 {
            self.buffer.push(0xA0 | len as u8);
        } else if len <= u8::MAX as usize {
            self.buffer.push(0xD9);
            self.buffer.push(len as u8);
        } else if len <= u16::MAX as usize {
            self.buffer.push(0xDA);
            self.buffer.extend(&(len as u16).to_be_bytes());
        } else if len <= u32::MAX as usize {
            self.buffer.push(0xDB);
            self.buffer.extend(&(len as u32).to_be_bytes());
        } else {
            return Err(too_large("string", len));
        }
        self.buffer.extend(s.as_bytes());
        Ok(())
    }

    fn pack_bin(&mut self, b: &[u8]) -> Result<(), PackError> {
        let len = b.len();
        if len <= u8::MAX as usize {
            self.buffer.push(0xC4);
            self.buffer.push(len as u8);
        } else if len <= u16::MAX as usize {
            self.buffer.push(0xC5);
            self.buffer.extend(&(len as u16).to_be_bytes());
        } else if len <= u32::MAX as usize {
            self.buffer.push(0xC6);
            self.buffer.extend(&(len as u32).to_be_bytes());
        } else {
            return Err(too_large("byte string", len));
        }
        self.buffer.extend(b);
        Ok(())
    }

    fn pack_array_header(&mut self, len: usize) -> Result<(), PackError> {
        if len <= 15 {
            self.buffer.push(0x90 | len as u8);
        } else if len <= u16::MAX as usize {
            self.buffer.push(0xDC);
            self.buffer.extend(&(len as u16).to_be_bytes());
        } else if len <= u32::MAX as usize {
            self.buffer.push(0xDD);
            self.buffer.extend(&(len as u32).to_be_bytes());
        } else {
            return Err(too_large("array", len));
        }
        Ok(())
    }

    fn pack_map_header(&mut self, len: usize) -> Result<(), PackError> {
        if len <= 15 {
            self.buffer.push(0x80 | len as u8);
        } else if len <= u16::MAX as usize {
            self.buffer.push(0xDE);
            self.buffer.extend(&(len as u16).to_be_bytes());
        } else if len <= u32::MAX as usize {
            self.buffer.push(0xDF);
            self.buffer.extend(&(len as u32).to_be_bytes());
        } else {
            return Err(too_large("map", len));
        }
        Ok(())
    }
}

fn too_large(what: &str, len: usize) -> PackError {
    PackError::InvalidData {
        reason: format!("{} of {} entries exceeds the format limit", what, len),
    }
}

/// Bounds-checked MessagePack decoder.
struct Unpacker<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> Unpacker<'a> {
    fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.offset)
    }

    fn is_eof(&self) -> bool {
        self.offset >= self.buffer.len()
    }

    fn read_u8(&mut self) -> Result<u8, PackError> {
        let bytes = self.read_bytes(1)?;
        Ok(bytes[0])
    }

    fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], PackError> {
        if self.offset + len > self.buffer.len() {
            return Err(PackError::ReadFailed {
                offset: self.offset,
                reason: "unexpected end of buffer".into(),
            });
        }
        let slice = &self.buffer[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    fn read_be_u16(&mut self) -> Result<u16, PackError> {
        let bytes = self.read_bytes(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    fn read_be_u32(&mut self) -> Result<u32, PackError> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_be_u64(&mut self) -> Result<u64, PackError> {
        let bytes = self.read_bytes(8)?;
        Ok(u64::from_be_bytes([
            bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
        ]))
    }

    fn unpack_value(&mut self) -> Result<Value, PackError> {
        let marker = self.read_u8()?;
        match marker {
            // positive fixint
            0x00..=0x7F => Ok(Value::Int(marker as i64)),
            // fixmap / fixarray / fixstr
            0x80..=0x8F => self.unpack_map((marker & 0x0F) as usize),
            0x90..=0x9F => self.unpack_array((marker & 0x0F) as usize),
            0xA0..=0xBF => self.unpack_str((marker & 0x1F) as usize),
            0xC0 => Ok(Value::Null),
            0xC1 => Err(PackError::InvalidData {
                reason: "reserved marker 0xc1".into(),
            }),
            0xC2 => Ok(Value::Bool(false)),
            0xC3 => Ok(Value::Bool(true)),
            // bin 8/16/32
            0xC4 => {
                let len = self.read_u8()? as usize;
                Ok(Value::Bytes(self.read_bytes(len)?.to_vec()))
            }
            0xC5 => {
                let len = self.read_be_u16()? as usize;
                Ok(Value::Bytes(self.read_bytes(len)?.to_vec()))
            }
            0xC6 => {
                let len = self.read_be_u32()? as usize;
                Ok(Value::Bytes(self.read_bytes(len)?.to_vec()))
            }
            // ext family is never produced by this crate
            0xC7..=0xC9 | 0xD4..=0xD8 => Err(PackError::InvalidData {
                reason: format!("ext type marker 0x{:02x} is not supported", marker),
            }),
            // float 32/64
            0xCA => {
                let bits = self.read_be_u32()?;
                Ok(Value::Float(f32::from_bits(bits) as f64))
            }
            0xCB => {
                let bits = self.read_be_u64()?;
                Ok(Value::Float(f64::from_bits(bits)))
            }
            // uint 8/16/32/64
            0xCC => {
                let v = self.read_u8()?;
                Ok(Value::Int(v as i64))
            }
            0xCD => {
                let v = self.read_be_u16()?;
                Ok(Value::Int(v as i64))
            }
            0xCE => {
                let v = self.read_be_u32()?;
                Ok(Value::Int(v as i64))
            }
            0xCF => {
                let v = self.read_be_u64()?;
                Ok(Value::from_u64(v))
            }
            // int 8/16/32/64
            0xD0 => {
                let v = self.read_u8()? as i8;
                Ok(Value::Int(v as i64))
            }
            0xD1 => {
                let v = self.read_be_u16()? as i16;
                Ok(Value::Int(v as i64))
            }
            0xD2 => {
                let v = self.read_be_u32()? as i32;
                Ok(Value::Int(v as i64))
            }
            0xD3 => {
                let v = self.read_be_u64()? as i64;
                Ok(Value::Int(v))
            }
            // str 8/16/32
            0xD9 => {
                let len = self.read_u8()? as usize;
                self.unpack_str(len)
            }
            0xDA => {
                let len = self.read_be_u16()? as usize;
                self.unpack_str(len)
            }
            0xDB => {
                let len = self.read_be_u32()? as usize;
                self.unpack_str(len)
            }
            // array 16/32
            0xDC => {
                let len = self.read_be_u16()? as usize;
                self.unpack_array(len)
            }
            0xDD => {
                let len = self.read_be_u32()? as usize;
                self.unpack_array(len)
            }
            // map 16/32
            0xDE => {
                let len = self.read_be_u16()? as usize;
                self.unpack_map(len)
            }
            0xDF => {
                let len = self.read_be_u32()? as usize;
                self.unpack_map(len)
            }
            // negative fixint
            0xE0..=0xFF => Ok(Value::Int(marker as i8 as i64)),
        }
    }

    fn unpack_str(&mut self, len: usize) -> Result<Value, PackError> {
        let offset = self.offset;
        let bytes = self.read_bytes(len)?;
        String::from_utf8(bytes.to_vec())
            .map(Value::String)
            .map_err(|e| PackError::ReadFailed {
                offset,
                reason: format!("invalid UTF-8 in string: {}", e),
            })
    }

    fn unpack_array(&mut self, len: usize) -> Result<Value, PackError> {
        let mut items = Vec::with_capacity(len.min(4096));
        for _ in 0..len {
            items.push(self.unpack_value()?);
        }
        Ok(Value::List(items))
    }

    fn unpack_map(&mut self, len: usize) -> Result<Value, PackError> {
        let mut map = Map::new();
        for _ in 0..len {
            let key = match self.unpack_value()? {
                Value::String(key) => key,
                other => {
                    return Err(PackError::InvalidData {
                        reason: format!("map key must be a string, got {}", other.type_name()),
                    })
                }
            };
            let child = self.unpack_value()?;
            map.insert(key, child);
        }
        Ok(Value::Map(map))
    }
}
