// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2026 remos developers

//! Host → slave replication: policies, the per-entity operation envelope,
//! and the two endpoint roles.
//!
//! The host role is the sole author of operations; the slave role only
//! applies them. Each operation targets one entity and travels as:
//!
//! ```text
//! +---------+------------------+----------------+---------------------+
//! | op: i8  | object_id: i32   | type_id: i32   | object body payload |
//! |         |                  | (create only)  | (create/replicate)  |
//! +---------+------------------+----------------+---------------------+
//! ```
//!
//! Per-entity states on the slave side: unknown → (active | torn-off) →
//! destroyed. `Ordered` entities additionally require the transport to
//! preserve the relative send order of their replicate operations; a single
//! synchronous stream does so inherently.

mod host;
mod replica;

pub use host::HostReplicator;
pub use replica::{Applied, ReplicaState, ReplicaStore};

use crate::codec::{self, CodecError, CodecResult, Encoder};
use crate::object::Entity;
use std::fmt;

/// How instances of a class propagate from host to slave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepPolicy {
    /// Never replicated; appears in no operation.
    Never,
    /// Replicated once at creation, then torn off from the host; no
    /// further replicate operations apply.
    CreateOnce,
    /// Replicated whenever marked dirty.
    Normal,
    /// Replicated whenever marked dirty; relative order of replicate
    /// operations for the same entity must be preserved by the transport.
    Ordered,
}

impl fmt::Display for RepPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Never => "never",
            Self::CreateOnce => "create-once",
            Self::Normal => "normal",
            Self::Ordered => "ordered",
        };
        f.write_str(name)
    }
}

/// Which side of the replication relationship an endpoint plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Authoritative side; authors every operation.
    Host,
    /// Applying side; never originates operations for host-owned entities.
    Slave,
}

/// Per-entity wire operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i8)]
pub enum OpCode {
    Create = 1,
    Replicate = 2,
    Destroy = 3,
}

impl OpCode {
    pub fn from_i8(value: i8) -> Option<OpCode> {
        match value {
            1 => Some(Self::Create),
            2 => Some(Self::Replicate),
            3 => Some(Self::Destroy),
            _ => None,
        }
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Create => "create",
            Self::Replicate => "replicate",
            Self::Destroy => "destroy",
        };
        f.write_str(name)
    }
}

/// Replication failure. Applying one operation either succeeds or reports
/// here; already-applied entities are never corrupted by a later failure.
#[derive(Debug)]
pub enum ReplicationError {
    /// The payload could not be encoded or decoded.
    Codec(CodecError),
    /// The stream carried an op code outside the known set.
    BadOpCode(i8),
    /// A create operation named a type id absent from the class registry.
    UnknownClass(i32),
    /// A replicate/destroy operation named an object id never created.
    UnknownObject(i32),
    /// The operation is not valid in the entity's current state.
    InvalidTransition {
        object_id: i32,
        op: OpCode,
        state: ReplicaState,
    },
    /// The entity's class policy forbids the attempted operation.
    PolicyForbids {
        class: &'static str,
        policy: RepPolicy,
    },
}

impl fmt::Display for ReplicationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Codec(e) => write!(f, "payload codec failure: {}", e),
            Self::BadOpCode(v) => write!(f, "unknown op code {}", v),
            Self::UnknownClass(id) => write!(f, "create names unregistered class id {}", id),
            Self::UnknownObject(id) => write!(f, "operation names unknown object id {}", id),
            Self::InvalidTransition {
                object_id,
                op,
                state,
            } => write!(
                f,
                "object {}: '{}' not valid in state '{}'",
                object_id, op, state
            ),
            Self::PolicyForbids { class, policy } => {
                write!(f, "class '{}' policy '{}' forbids the operation", class, policy)
            }
        }
    }
}

impl std::error::Error for ReplicationError {}

impl From<CodecError> for ReplicationError {
    fn from(e: CodecError) -> Self {
        Self::Codec(e)
    }
}

/// Write a create operation: op code, object id, type id, full body.
pub fn write_create(enc: &mut dyn Encoder, object_id: i32, obj: &dyn Entity) -> CodecResult<()> {
    enc.write_i8(OpCode::Create as i8)?;
    enc.write_i32(object_id)?;
    enc.write_type_id(obj.class().id())?;
    codec::write_object(enc, obj)
}

/// Write a replicate operation: op code, object id, full body.
pub fn write_replicate(enc: &mut dyn Encoder, object_id: i32, obj: &dyn Entity) -> CodecResult<()> {
    enc.write_i8(OpCode::Replicate as i8)?;
    enc.write_i32(object_id)?;
    codec::write_object(enc, obj)
}

/// Write a destroy operation: op code, object id.
pub fn write_destroy(enc: &mut dyn Encoder, object_id: i32) -> CodecResult<()> {
    enc.write_i8(OpCode::Destroy as i8)?;
    enc.write_i32(object_id)
}
