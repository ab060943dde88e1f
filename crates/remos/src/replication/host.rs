// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2026 remos developers

//! Host-side replicator: the sole author of replication operations.

use super::{write_create, write_destroy, write_replicate, RepPolicy, ReplicationError, Role};
use crate::codec::Encoder;
use crate::object::Entity;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

struct HostEntry {
    entity: Rc<RefCell<dyn Entity>>,
    policy: RepPolicy,
    torn_off: bool,
}

/// Authors create/replicate/destroy operations for the entities it owns.
///
/// Object ids are assigned at publish time and are stable for the life of
/// the entry. Dirty marks accumulate in marking order and drain on
/// [`flush`](Self::flush), so `Ordered` entities keep their relative
/// replicate order on any order-preserving transport.
pub struct HostReplicator {
    next_object_id: i32,
    entries: BTreeMap<i32, HostEntry>,
    dirty: Vec<i32>,
}

impl HostReplicator {
    pub fn new() -> Self {
        Self {
            next_object_id: 1,
            entries: BTreeMap::new(),
            dirty: Vec::new(),
        }
    }

    pub fn role(&self) -> Role {
        Role::Host
    }

    /// Take an entity under replication: assigns its object id and writes
    /// the create operation. `CreateOnce` entities tear off immediately and
    /// can never be marked dirty; `Never` entities are rejected.
    pub fn publish(
        &mut self,
        entity: Rc<RefCell<dyn Entity>>,
        enc: &mut dyn Encoder,
    ) -> Result<i32, ReplicationError> {
        let (policy, class_name) = {
            let borrowed = entity.borrow();
            let class = borrowed.class();
            (class.rep_policy(), class.name())
        };
        if policy == RepPolicy::Never {
            return Err(ReplicationError::PolicyForbids {
                class: class_name,
                policy,
            });
        }
        let object_id = self.next_object_id;
        self.next_object_id += 1;
        write_create(enc, object_id, &*entity.borrow())?;
        log::debug!(
            "[HostReplicator::publish] object_id={} class='{}' policy={}",
            object_id,
            class_name,
            policy
        );
        self.entries.insert(
            object_id,
            HostEntry {
                entity,
                policy,
                torn_off: policy == RepPolicy::CreateOnce,
            },
        );
        Ok(object_id)
    }

    /// Queue an entity for the next flush. Idempotent between flushes.
    pub fn mark_dirty(&mut self, object_id: i32) -> Result<(), ReplicationError> {
        let entry = self
            .entries
            .get(&object_id)
            .ok_or(ReplicationError::UnknownObject(object_id))?;
        if entry.torn_off {
            return Err(ReplicationError::PolicyForbids {
                class: entry.entity.borrow().class().name(),
                policy: entry.policy,
            });
        }
        if !self.dirty.contains(&object_id) {
            self.dirty.push(object_id);
        }
        Ok(())
    }

    /// Write one replicate operation per dirty entity, in marking order,
    /// and clear the dirty set. Returns the number of operations written.
    pub fn flush(&mut self, enc: &mut dyn Encoder) -> Result<usize, ReplicationError> {
        let dirty = std::mem::take(&mut self.dirty);
        let count = dirty.len();
        for object_id in dirty {
            if let Some(entry) = self.entries.get(&object_id) {
                write_replicate(enc, object_id, &*entry.entity.borrow())?;
            }
        }
        Ok(count)
    }

    /// Stop replicating an entity: writes the destroy operation and drops
    /// the entry. The object id is never reused.
    pub fn retire(
        &mut self,
        object_id: i32,
        enc: &mut dyn Encoder,
    ) -> Result<(), ReplicationError> {
        if self.entries.remove(&object_id).is_none() {
            return Err(ReplicationError::UnknownObject(object_id));
        }
        self.dirty.retain(|&id| id != object_id);
        write_destroy(enc, object_id)?;
        log::debug!("[HostReplicator::retire] object_id={}", object_id);
        Ok(())
    }

    /// Borrow a published entity.
    pub fn get(&self, object_id: i32) -> Option<Rc<RefCell<dyn Entity>>> {
        self.entries.get(&object_id).map(|e| Rc::clone(&e.entity))
    }

    pub fn contains(&self, object_id: i32) -> bool {
        self.entries.contains_key(&object_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entities currently queued for the next flush, in marking order.
    pub fn dirty_ids(&self) -> &[i32] {
        &self.dirty
    }
}

impl Default for HostReplicator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HostReplicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostReplicator")
            .field("entries", &self.entries.len())
            .field("dirty", &self.dirty)
            .finish_non_exhaustive()
    }
}
