// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2026 remos developers

//! Wire-protocol constants and the scalar type system.
//!
//! Centralizes the class-id partition, field limits, and the mapping from
//! supported scalar kinds to their stable numeric ids and default values.
//! Nothing in this module travels on the wire: both peers are assumed to
//! share an identical schema, so kind ids exist only to describe and
//! validate declarations.

use crate::codec::{CodecResult, Decoder, Encoder};

/// Class id of the root class (`Base`).
pub const CLASS_ID_ROOT: i32 = 0;

/// Highest class id reserved for basic scalar kinds (1..=14).
pub const CLASS_ID_SCALAR_MAX: i32 = 0x0E;

/// Lowest class id available to user classes.
pub const CLASS_ID_USER_MIN: i32 = 0x0F;

/// Highest class id available to user classes.
pub const CLASS_ID_USER_MAX: i32 = 0xFFFF;

/// Maximum number of fields a single class may declare (ancestors included).
pub const MAX_FIELD_COUNT: usize = 255;

/// Highest valid field id. Field ids occupy `0..=MAX_FIELD_ID`.
pub const MAX_FIELD_ID: i32 = 0xFE;

/// Field-id sentinel terminating an object body on the wire.
pub const FIELD_ID_END: i32 = -1;

/// Ref id denoting a null reference.
pub const NULL_REF_ID: i32 = 0;

/// Maximum encoded text length in bytes. Longer input is truncated.
pub const MAX_TEXT_LEN: usize = 1023;

/// Returns true when `class_id` is valid for registration: the root id or a
/// user id inside the user partition.
pub fn class_id_in_partition(class_id: i32) -> bool {
    class_id == CLASS_ID_ROOT || (CLASS_ID_USER_MIN..=CLASS_ID_USER_MAX).contains(&class_id)
}

/// Supported scalar kinds with their stable numeric ids.
///
/// The gaps in the numbering (8, 9, 11..=13) are reserved for kinds that the
/// protocol may add later; ids must never be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ScalarKind {
    Bool = 1,
    Int8 = 2,
    Int16 = 3,
    Int32 = 4,
    Int64 = 5,
    Float32 = 6,
    Float64 = 7,
    Text = 0x0A,
}

impl ScalarKind {
    /// Stable numeric id of this kind.
    pub fn type_id(self) -> i32 {
        self as i32
    }

    /// Fixed encoded width in bytes, or `None` for length-prefixed text.
    pub fn wire_width(self) -> Option<usize> {
        match self {
            Self::Bool | Self::Int8 => Some(1),
            Self::Int16 => Some(2),
            Self::Int32 | Self::Float32 => Some(4),
            Self::Int64 | Self::Float64 => Some(8),
            Self::Text => None,
        }
    }
}

/// A Rust type usable as a scalar field value.
///
/// Binds the type to its [`ScalarKind`], its default value (via [`Default`],
/// used by field initializers), and its codec entry points. Implemented for
/// exactly the supported set; a field declared with any other type fails to
/// compile, which is the registration-time validation this layer provides.
pub trait Scalar: Default + Clone + 'static {
    /// The scalar kind this type maps to.
    const KIND: ScalarKind;

    /// Write this value through the encoder.
    fn encode(&self, enc: &mut dyn Encoder) -> CodecResult<()>;

    /// Read a value of this type from the decoder.
    fn decode(dec: &mut dyn Decoder) -> CodecResult<Self>;
}

macro_rules! impl_scalar {
    ($ty:ty, $kind:ident, $write:ident, $read:ident) => {
        impl Scalar for $ty {
            const KIND: ScalarKind = ScalarKind::$kind;

            fn encode(&self, enc: &mut dyn Encoder) -> CodecResult<()> {
                enc.$write(*self)
            }

            fn decode(dec: &mut dyn Decoder) -> CodecResult<Self> {
                dec.$read()
            }
        }
    };
}

impl_scalar!(bool, Bool, write_bool, read_bool);
impl_scalar!(i8, Int8, write_i8, read_i8);
impl_scalar!(i16, Int16, write_i16, read_i16);
impl_scalar!(i32, Int32, write_i32, read_i32);
impl_scalar!(i64, Int64, write_i64, read_i64);
impl_scalar!(f32, Float32, write_f32, read_f32);
impl_scalar!(f64, Float64, write_f64, read_f64);

impl Scalar for String {
    const KIND: ScalarKind = ScalarKind::Text;

    fn encode(&self, enc: &mut dyn Encoder) -> CodecResult<()> {
        enc.write_text(self)
    }

    fn decode(dec: &mut dyn Decoder) -> CodecResult<Self> {
        dec.read_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_boundaries() {
        assert!(class_id_in_partition(CLASS_ID_ROOT));
        assert!(!class_id_in_partition(1));
        assert!(!class_id_in_partition(CLASS_ID_SCALAR_MAX));
        assert!(class_id_in_partition(CLASS_ID_USER_MIN));
        assert!(class_id_in_partition(CLASS_ID_USER_MAX));
        assert!(!class_id_in_partition(CLASS_ID_USER_MAX + 1));
        assert!(!class_id_in_partition(-1));
    }

    #[test]
    fn test_scalar_kind_ids_are_stable() {
        assert_eq!(ScalarKind::Bool.type_id(), 1);
        assert_eq!(ScalarKind::Int8.type_id(), 2);
        assert_eq!(ScalarKind::Int16.type_id(), 3);
        assert_eq!(ScalarKind::Int32.type_id(), 4);
        assert_eq!(ScalarKind::Int64.type_id(), 5);
        assert_eq!(ScalarKind::Float32.type_id(), 6);
        assert_eq!(ScalarKind::Float64.type_id(), 7);
        assert_eq!(ScalarKind::Text.type_id(), 10);
    }

    #[test]
    fn test_scalar_defaults() {
        assert!(!bool::default());
        assert_eq!(i64::default(), 0);
        assert_eq!(f64::default(), 0.0);
        assert_eq!(String::default(), "");
    }

    #[test]
    fn test_wire_widths() {
        assert_eq!(ScalarKind::Bool.wire_width(), Some(1));
        assert_eq!(ScalarKind::Int64.wire_width(), Some(8));
        assert_eq!(ScalarKind::Text.wire_width(), None);
    }
}
