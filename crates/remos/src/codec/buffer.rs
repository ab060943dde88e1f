// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2026 remos developers

//! In-memory buffer backend for the codec contract.
//!
//! [`BufEncoder`] appends to a growable byte vector; [`BufDecoder`] is a
//! bounds-checked cursor over a byte slice. Both use fixed-width native
//! byte order.

use super::{CodecError, CodecResult, Decoder, Encoder};

/// Generate encoder methods for primitive types.
///
/// Each generated method converts the value with `to_ne_bytes()` and appends
/// the bytes to the output vector.
macro_rules! impl_write_ne {
    ($name:ident, $type:ty) => {
        fn $name(&mut self, v: $type) -> CodecResult<()> {
            self.buf.extend_from_slice(&v.to_ne_bytes());
            Ok(())
        }
    };
}

/// Generate decoder methods for primitive types.
///
/// Each generated method checks bounds (returns `CodecError::ReadFailed` on
/// overrun), reads N bytes, and converts them with `from_ne_bytes()`.
macro_rules! impl_read_ne {
    ($name:ident, $type:ty, $size:expr) => {
        fn $name(&mut self) -> CodecResult<$type> {
            let mut bytes = [0u8; $size];
            self.take(&mut bytes)?;
            Ok(<$type>::from_ne_bytes(bytes))
        }
    };
}

/// Growable byte-vector encoder. Writes never fail.
#[derive(Debug, Default)]
pub struct BufEncoder {
    buf: Vec<u8>,
}

impl BufEncoder {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

impl Encoder for BufEncoder {
    impl_write_ne!(write_i8, i8);
    impl_write_ne!(write_i16, i16);
    impl_write_ne!(write_i32, i32);
    impl_write_ne!(write_i64, i64);
    impl_write_ne!(write_f32, f32);
    impl_write_ne!(write_f64, f64);

    fn write_bool(&mut self, v: bool) -> CodecResult<()> {
        self.write_i8(i8::from(v))
    }

    fn write_bytes(&mut self, buf: &[u8]) -> CodecResult<()> {
        self.buf.extend_from_slice(buf);
        Ok(())
    }
}

/// Bounds-checked read cursor over a byte slice.
#[derive(Debug)]
pub struct BufDecoder<'a> {
    buf: &'a [u8],
    offset: usize,
}

impl<'a> BufDecoder<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, offset: 0 }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.offset)
    }

    pub fn is_eof(&self) -> bool {
        self.offset >= self.buf.len()
    }

    fn take(&mut self, out: &mut [u8]) -> CodecResult<()> {
        if self.offset + out.len() > self.buf.len() {
            return Err(CodecError::ReadFailed {
                offset: self.offset,
                reason: "unexpected end of buffer".into(),
            });
        }
        out.copy_from_slice(&self.buf[self.offset..self.offset + out.len()]);
        self.offset += out.len();
        Ok(())
    }
}

impl Decoder for BufDecoder<'_> {
    impl_read_ne!(read_i8, i8, 1);
    impl_read_ne!(read_i16, i16, 2);
    impl_read_ne!(read_i32, i32, 4);
    impl_read_ne!(read_i64, i64, 8);
    impl_read_ne!(read_f32, f32, 4);
    impl_read_ne!(read_f64, f64, 8);

    fn read_bool(&mut self) -> CodecResult<bool> {
        Ok(self.read_i8()? != 0)
    }

    fn read_bytes(&mut self, buf: &mut [u8]) -> CodecResult<()> {
        self.take(buf)
    }
}
