// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2026 remos developers

//! # REMOS - Remote Object System
//!
//! A lightweight remote-object framework in pure Rust: a reflection layer
//! and binary codec that lets networked applications declare typed classes,
//! serialize instances field-by-field, and replicate object state between
//! an authoritative host and a slave peer.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use remos::{
//!     read_object, write_object, Base, BufDecoder, BufEncoder, ClassDescriptor,
//!     ClassRegistry, Fields, Reflect,
//! };
//! use std::sync::OnceLock;
//!
//! #[derive(Default)]
//! struct Sensor {
//!     base: Base,
//!     reading: f64,
//!     label: String,
//! }
//!
//! impl Reflect for Sensor {
//!     type Super = Base;
//!     const CLASS_ID: i32 = 20;
//!     const CLASS_NAME: &'static str = "Sensor";
//!
//!     fn meta_class() -> &'static ClassDescriptor {
//!         static CLASS: OnceLock<ClassDescriptor> = OnceLock::new();
//!         CLASS.get_or_init(ClassDescriptor::describe::<Sensor>)
//!     }
//!
//!     fn create() -> Self {
//!         Sensor::default()
//!     }
//!
//!     fn super_ref(&self) -> &Base {
//!         &self.base
//!     }
//!
//!     fn super_mut(&mut self) -> &mut Base {
//!         &mut self.base
//!     }
//!
//!     fn declare_fields(fields: &mut Fields<'_, Self>) {
//!         fields
//!             .scalar(1, "reading", |s| &s.reading, |s| &mut s.reading)
//!             .scalar(2, "label", |s| &s.label, |s| &mut s.label);
//!     }
//! }
//!
//! fn main() -> Result<(), remos::CodecError> {
//!     // Explicit, ordered registration before any traffic.
//!     let mut registry = ClassRegistry::new();
//!     registry.register::<Base>();
//!     registry.register::<Sensor>();
//!
//!     let sensor = Sensor {
//!         base: Base,
//!         reading: 21.5,
//!         label: "intake".into(),
//!     };
//!     let mut enc = BufEncoder::new();
//!     write_object(&mut enc, &sensor)?;
//!
//!     let bytes = enc.into_bytes();
//!     let mut dec = BufDecoder::new(&bytes);
//!     let mut copy = Sensor::create();
//!     read_object(&mut dec, &mut copy)?;
//!     assert_eq!(copy.reading, 21.5);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +------------------------------------------------------------------+
//! |                       Application Classes                        |
//! |        Reflect impls -> per-type static ClassDescriptor          |
//! +------------------------------------------------------------------+
//! |                        Reflection Layer                          |
//! |   ClassRegistry | FieldRegistry dispatch | Ref/Member links      |
//! +------------------------------------------------------------------+
//! |                       Replication Layer                          |
//! |   HostReplicator (authors ops) -> ReplicaStore (applies ops)     |
//! +------------------------------------------------------------------+
//! |                        Codec Contract                            |
//! |   Encoder/Decoder traits | BufEncoder/BufDecoder backend         |
//! +------------------------------------------------------------------+
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Reflect`] | Per-class contract: id, name, super class, fields, factory |
//! | [`ClassDescriptor`] | Static runtime record with codec/factory closures |
//! | [`ClassRegistry`] | Explicit id → descriptor table, populated at startup |
//! | [`Ref`] / [`Member`] | Shared nullable link / exclusive embedded sub-object |
//! | [`HostReplicator`] | Authors create/replicate/destroy operations |
//! | [`ReplicaStore`] | Applies operations, tracks per-entity state |
//!
//! ## Wire Format
//!
//! Object body: `(field_id: i32, value)*` in declaration order, terminated
//! by field id `-1`; no length prefix, no checksum. Reference field:
//! `ref_id: i32`, then the full recursive target body iff non-zero.
//! Numerics are fixed-width native byte order; peers must share an
//! architecture (normalization is a transport concern, out of scope here).
//!
//! ## Threading
//!
//! Single-threaded by design: registration happens once during startup, and
//! every encode/decode/apply call runs to completion on the calling thread.
//! No locking is provided; keeping the core confined to one thread is the
//! caller's responsibility.

/// Abstract codec contract and the in-memory buffer backend.
pub mod codec;
/// Shared references and embedded members between objects.
pub mod link;
/// Object model: Entity/Reflect traits, class descriptors, registries.
pub mod object;
/// Host → slave replication: policies, envelope, state machine.
pub mod replication;
/// Wire constants and the scalar type system.
pub mod types;

pub use codec::{
    read_object, write_object, BufDecoder, BufEncoder, CodecError, CodecResult, Decoder, Encoder,
};
pub use link::{Member, Ref};
pub use object::{
    Base, ClassDescriptor, ClassRegistry, Entity, FieldDescriptor, FieldRegistry, Fields, Reflect,
};
pub use replication::{
    Applied, HostReplicator, OpCode, RepPolicy, ReplicaState, ReplicaStore, ReplicationError, Role,
};
pub use types::{Scalar, ScalarKind};

/// REMOS version string.
pub const VERSION: &str = "0.1.0";
