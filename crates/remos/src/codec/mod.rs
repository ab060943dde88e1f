// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2026 remos developers

//! The abstract codec contract and polymorphic object dispatch.
//!
//! [`Encoder`] and [`Decoder`] define the primitive read/write set a byte
//! backend must provide: booleans, fixed-width integers and floats,
//! length-prefixed text, and the three meta-primitives (type id, field id,
//! ref id, all signed 32-bit). The structural primitive, writing or
//! reading a polymorphic object, lives here as [`write_object`] /
//! [`read_object`] and double-dispatches through the object's own class
//! descriptor, so backends never need to know concrete types.
//!
//! Numeric values use fixed-width native byte order; normalizing endianness
//! across architectures is out of scope for this layer and is a documented
//! portability boundary of the wire format.

pub mod buffer;

pub use buffer::{BufDecoder, BufEncoder};

use crate::object::Entity;
use crate::types::MAX_TEXT_LEN;
use std::fmt;

/// Codec error. Every primitive reports failure as a value; the core never
/// retries and never panics on wire input.
#[derive(Debug, Clone)]
pub enum CodecError {
    /// A primitive write could not complete.
    WriteFailed { offset: usize, reason: String },
    /// A primitive read could not complete.
    ReadFailed { offset: usize, reason: String },
    /// An object body carried a field id its class never registered.
    /// Aborts decoding of the current object only.
    UnknownField { class: &'static str, field_id: i32 },
    /// Codec entry points of one class were invoked with an instance of a
    /// different dynamic class.
    ClassMismatch { expected: &'static str },
    /// Structurally invalid wire data (bad length prefix, bad sentinel).
    InvalidData { reason: String },
    /// Decoded text was not valid UTF-8.
    Utf8Error(std::string::FromUtf8Error),
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WriteFailed { offset, reason } => {
                write!(f, "write failed at offset {}: {}", offset, reason)
            }
            Self::ReadFailed { offset, reason } => {
                write!(f, "read failed at offset {}: {}", offset, reason)
            }
            Self::UnknownField { class, field_id } => {
                write!(f, "class '{}': unknown field id {}", class, field_id)
            }
            Self::ClassMismatch { expected } => {
                write!(f, "object is not an instance of class '{}'", expected)
            }
            Self::InvalidData { reason } => write!(f, "invalid data: {}", reason),
            Self::Utf8Error(e) => write!(f, "text is not valid UTF-8: {}", e),
        }
    }
}

impl std::error::Error for CodecError {}

impl From<std::string::FromUtf8Error> for CodecError {
    fn from(e: std::string::FromUtf8Error) -> Self {
        Self::Utf8Error(e)
    }
}

pub type CodecResult<T> = core::result::Result<T, CodecError>;

/// Write half of the codec contract.
///
/// Implementors provide the scalar and byte primitives; the meta-primitives
/// and text framing are derived. Text encoding is a 16-bit length prefix
/// followed by raw bytes, with input clamped to [`MAX_TEXT_LEN`] bytes: a
/// silent, documented truncation, not an error.
pub trait Encoder {
    fn write_bool(&mut self, v: bool) -> CodecResult<()>;
    fn write_i8(&mut self, v: i8) -> CodecResult<()>;
    fn write_i16(&mut self, v: i16) -> CodecResult<()>;
    fn write_i32(&mut self, v: i32) -> CodecResult<()>;
    fn write_i64(&mut self, v: i64) -> CodecResult<()>;
    fn write_f32(&mut self, v: f32) -> CodecResult<()>;
    fn write_f64(&mut self, v: f64) -> CodecResult<()>;
    fn write_bytes(&mut self, buf: &[u8]) -> CodecResult<()>;

    /// Length-prefixed text, clamped to [`MAX_TEXT_LEN`] bytes. When the
    /// clamp would split a multi-byte character the cut backs off to the
    /// nearest character boundary.
    fn write_text(&mut self, v: &str) -> CodecResult<()> {
        let mut end = v.len().min(MAX_TEXT_LEN);
        while !v.is_char_boundary(end) {
            end -= 1;
        }
        self.write_i16(end as i16)?;
        self.write_bytes(v[..end].as_bytes())
    }

    fn write_type_id(&mut self, type_id: i32) -> CodecResult<()> {
        self.write_i32(type_id)
    }

    fn write_field_id(&mut self, field_id: i32) -> CodecResult<()> {
        self.write_i32(field_id)
    }

    fn write_ref_id(&mut self, ref_id: i32) -> CodecResult<()> {
        self.write_i32(ref_id)
    }
}

/// Read half of the codec contract.
pub trait Decoder {
    fn read_bool(&mut self) -> CodecResult<bool>;
    fn read_i8(&mut self) -> CodecResult<i8>;
    fn read_i16(&mut self) -> CodecResult<i16>;
    fn read_i32(&mut self) -> CodecResult<i32>;
    fn read_i64(&mut self) -> CodecResult<i64>;
    fn read_f32(&mut self) -> CodecResult<f32>;
    fn read_f64(&mut self) -> CodecResult<f64>;
    fn read_bytes(&mut self, buf: &mut [u8]) -> CodecResult<()>;

    fn read_text(&mut self) -> CodecResult<String> {
        let len = self.read_i16()?;
        if len < 0 || len as usize > MAX_TEXT_LEN {
            return Err(CodecError::InvalidData {
                reason: format!("text length prefix {} out of range", len),
            });
        }
        let mut buf = vec![0u8; len as usize];
        self.read_bytes(&mut buf)?;
        Ok(String::from_utf8(buf)?)
    }

    fn read_type_id(&mut self) -> CodecResult<i32> {
        self.read_i32()
    }

    fn read_field_id(&mut self) -> CodecResult<i32> {
        self.read_i32()
    }

    fn read_ref_id(&mut self) -> CodecResult<i32> {
        self.read_i32()
    }
}

/// Write a polymorphic object body through the encoder.
///
/// Dispatches through the dynamic class descriptor's serializer, so the
/// caller (and the backend) need not know the concrete type.
pub fn write_object(enc: &mut dyn Encoder, obj: &dyn Entity) -> CodecResult<()> {
    obj.class().write_to(enc, obj)
}

/// Read a polymorphic object body from the decoder into `obj`.
///
/// Dispatches through the dynamic class descriptor's deserializer. The
/// instance must already be of the class the wire body was produced from;
/// the body itself carries no type id.
pub fn read_object(dec: &mut dyn Decoder, obj: &mut dyn Entity) -> CodecResult<()> {
    obj.class().read_from(dec, obj)
}
