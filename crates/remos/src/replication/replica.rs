// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2026 remos developers

//! Slave-side replica store: applies host-authored operations and tracks
//! the per-entity state machine.

use super::{OpCode, RepPolicy, ReplicationError, Role};
use crate::codec::{self, Decoder};
use crate::object::{ClassDescriptor, ClassRegistry, Entity};
use std::collections::BTreeMap;
use std::fmt;

/// Resting state of one replicated entity on the slave side.
///
/// "Created" is the transient point inside a create operation; an entity is
/// never observed there between operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplicaState {
    /// Live; replicate operations apply.
    Active,
    /// Created once, then detached from the host; replicate operations are
    /// consumed but ignored.
    TornOff,
    /// Released. Terminal: every further operation on the id is rejected.
    Destroyed,
}

impl fmt::Display for ReplicaState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Active => "active",
            Self::TornOff => "torn-off",
            Self::Destroyed => "destroyed",
        };
        f.write_str(name)
    }
}

/// Outcome of applying one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// A new entity was instantiated and decoded.
    Created(i32),
    /// The payload was decoded over the existing instance.
    Replicated(i32),
    /// The payload was consumed but discarded (torn-off entity).
    Ignored(i32),
    /// The instance was released; the id is now terminal.
    Destroyed(i32),
}

impl Applied {
    pub fn object_id(&self) -> i32 {
        match *self {
            Self::Created(id) | Self::Replicated(id) | Self::Ignored(id) | Self::Destroyed(id) => {
                id
            }
        }
    }
}

struct Replica {
    state: ReplicaState,
    class: &'static ClassDescriptor,
    instance: Option<Box<dyn Entity>>,
}

/// Applies host-authored operations against local replicas.
///
/// Holds one entry per object id ever created, including destroyed
/// tombstones so that late operations on a released id are rejected rather
/// than misapplied. The store never originates operations.
///
/// On error the decoder is left mid-operation; callers decide whether to
/// abandon the stream or resynchronize by other means. State applied by
/// earlier operations is never touched by a later failure.
pub struct ReplicaStore<'r> {
    registry: &'r ClassRegistry,
    replicas: BTreeMap<i32, Replica>,
}

impl<'r> ReplicaStore<'r> {
    pub fn new(registry: &'r ClassRegistry) -> Self {
        Self {
            registry,
            replicas: BTreeMap::new(),
        }
    }

    pub fn role(&self) -> Role {
        Role::Slave
    }

    /// Read one operation envelope from the decoder and apply it.
    pub fn apply(&mut self, dec: &mut dyn Decoder) -> Result<Applied, ReplicationError> {
        let raw_op = dec.read_i8().map_err(ReplicationError::Codec)?;
        let op = OpCode::from_i8(raw_op).ok_or(ReplicationError::BadOpCode(raw_op))?;
        let object_id = dec.read_i32().map_err(ReplicationError::Codec)?;
        match op {
            OpCode::Create => self.apply_create(dec, object_id),
            OpCode::Replicate => self.apply_replicate(dec, object_id),
            OpCode::Destroy => self.apply_destroy(object_id),
        }
    }

    /// Borrow a live replica (active or torn-off).
    pub fn get(&self, object_id: i32) -> Option<&dyn Entity> {
        self.replicas
            .get(&object_id)
            .and_then(|r| r.instance.as_deref())
    }

    /// Current state of an id, or `None` when never created.
    pub fn state(&self, object_id: i32) -> Option<ReplicaState> {
        self.replicas.get(&object_id).map(|r| r.state)
    }

    /// Number of tracked ids, destroyed tombstones included.
    pub fn len(&self) -> usize {
        self.replicas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.replicas.is_empty()
    }

    fn apply_create(
        &mut self,
        dec: &mut dyn Decoder,
        object_id: i32,
    ) -> Result<Applied, ReplicationError> {
        if let Some(existing) = self.replicas.get(&object_id) {
            return Err(ReplicationError::InvalidTransition {
                object_id,
                op: OpCode::Create,
                state: existing.state,
            });
        }
        let type_id = dec.read_type_id().map_err(ReplicationError::Codec)?;
        let class = self
            .registry
            .lookup(type_id)
            .ok_or(ReplicationError::UnknownClass(type_id))?;
        let state = match class.rep_policy() {
            RepPolicy::Never => {
                return Err(ReplicationError::PolicyForbids {
                    class: class.name(),
                    policy: RepPolicy::Never,
                });
            }
            RepPolicy::CreateOnce => ReplicaState::TornOff,
            RepPolicy::Normal | RepPolicy::Ordered => ReplicaState::Active,
        };
        let mut instance = class.create();
        codec::read_object(dec, instance.as_mut())?;
        log::debug!(
            "[ReplicaStore::apply] create object_id={} class='{}' state={}",
            object_id,
            class.name(),
            state
        );
        self.replicas.insert(
            object_id,
            Replica {
                state,
                class,
                instance: Some(instance),
            },
        );
        Ok(Applied::Created(object_id))
    }

    fn apply_replicate(
        &mut self,
        dec: &mut dyn Decoder,
        object_id: i32,
    ) -> Result<Applied, ReplicationError> {
        let replica = self
            .replicas
            .get_mut(&object_id)
            .ok_or(ReplicationError::UnknownObject(object_id))?;
        match replica.state {
            ReplicaState::Active => {
                if let Some(instance) = replica.instance.as_mut() {
                    codec::read_object(dec, instance.as_mut())?;
                }
                Ok(Applied::Replicated(object_id))
            }
            ReplicaState::TornOff => {
                // Consume the payload to keep the stream framed, then drop it.
                let mut scratch = replica.class.create();
                codec::read_object(dec, scratch.as_mut())?;
                log::debug!(
                    "[ReplicaStore::apply] replicate ignored for torn-off object_id={}",
                    object_id
                );
                Ok(Applied::Ignored(object_id))
            }
            ReplicaState::Destroyed => Err(ReplicationError::InvalidTransition {
                object_id,
                op: OpCode::Replicate,
                state: ReplicaState::Destroyed,
            }),
        }
    }

    fn apply_destroy(&mut self, object_id: i32) -> Result<Applied, ReplicationError> {
        let replica = self
            .replicas
            .get_mut(&object_id)
            .ok_or(ReplicationError::UnknownObject(object_id))?;
        if replica.state == ReplicaState::Destroyed {
            return Err(ReplicationError::InvalidTransition {
                object_id,
                op: OpCode::Destroy,
                state: ReplicaState::Destroyed,
            });
        }
        replica.instance = None;
        replica.state = ReplicaState::Destroyed;
        log::debug!("[ReplicaStore::apply] destroy object_id={}", object_id);
        Ok(Applied::Destroyed(object_id))
    }
}

impl fmt::Debug for ReplicaStore<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReplicaStore")
            .field("replicas", &self.replicas.len())
            .finish_non_exhaustive()
    }
}
