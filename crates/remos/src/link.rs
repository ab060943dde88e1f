// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2026 remos developers

//! Inter-object links: shared nullable references and exclusive embedded
//! members.
//!
//! [`Ref`] is the shared discipline: any number of holders, nullable,
//! identified on the wire by a non-zero ref id (0 = null). The target and
//! its holder count live in one shared allocation; the target is dropped
//! exactly once, when the last holder releases it. Reference graphs with
//! cycles are never collected; that is a documented caller hazard, not
//! something this layer detects.
//!
//! [`Member`] is the exclusive discipline: always present, never shared,
//! created with its owner and dropped with it. Members carry no identity on
//! the wire and are encoded in place.

use crate::codec::{self, CodecResult, Decoder, Encoder};
use crate::object::Reflect;
use crate::types::NULL_REF_ID;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::rc::Rc;
use std::sync::atomic::{AtomicI32, Ordering};

// Process-wide ref-id source. Ids only need to be non-zero and unique
// within one sending process.
static NEXT_REF_ID: AtomicI32 = AtomicI32::new(1);

fn next_ref_id() -> i32 {
    NEXT_REF_ID.fetch_add(1, Ordering::Relaxed)
}

struct RefTarget<T> {
    ref_id: Cell<i32>,
    object: RefCell<T>,
}

/// Nullable, shared link to another entity.
///
/// Wire form: `ref_id: i32`; 0 when null, otherwise a non-zero id followed
/// by the full recursive body of the target. Each wire occurrence carries
/// the full body: targets referenced more than once in a stream are
/// re-serialized per occurrence and decode into separate instances.
///
/// Decoding a body produced from a different dynamic class than the field's
/// declared class is undefined behavior; the body carries no type id and no
/// check is performed.
pub struct Ref<T: Reflect> {
    target: Option<Rc<RefTarget<T>>>,
}

impl<T: Reflect> Ref<T> {
    /// The null reference.
    pub fn null() -> Self {
        Self { target: None }
    }

    /// Take ownership of `object` as a new shared target with a fresh,
    /// process-unique ref id.
    pub fn new(object: T) -> Self {
        Self {
            target: Some(Rc::new(RefTarget {
                ref_id: Cell::new(next_ref_id()),
                object: RefCell::new(object),
            })),
        }
    }

    pub fn is_null(&self) -> bool {
        self.target.is_none()
    }

    /// The wire identity of the target; 0 when null.
    pub fn ref_id(&self) -> i32 {
        self.target
            .as_ref()
            .map_or(NULL_REF_ID, |t| t.ref_id.get())
    }

    /// Number of live holders of the target; 0 when null.
    pub fn ref_count(&self) -> usize {
        self.target.as_ref().map_or(0, Rc::strong_count)
    }

    /// Borrow the target, or `None` when null.
    pub fn get(&self) -> Option<std::cell::Ref<'_, T>> {
        self.target.as_ref().map(|t| t.object.borrow())
    }

    /// Borrow the target mutably, or `None` when null.
    pub fn get_mut(&self) -> Option<std::cell::RefMut<'_, T>> {
        self.target.as_ref().map(|t| t.object.borrow_mut())
    }

    /// Point this reference at `other`'s target (or at null). Assigning a
    /// link with the same identity is a no-op, never a release.
    pub fn set(&mut self, other: &Ref<T>) {
        match (&self.target, &other.target) {
            (Some(a), Some(b)) if Rc::ptr_eq(a, b) => {}
            _ => self.target = other.target.clone(),
        }
    }

    /// Release this holder. The target is dropped when the last holder
    /// releases it.
    pub fn clear(&mut self) {
        self.target = None;
    }

    /// Encode as `ref_id`, followed by the full target body when non-null.
    pub fn encode(&self, enc: &mut dyn Encoder) -> CodecResult<()> {
        match &self.target {
            None => enc.write_ref_id(NULL_REF_ID),
            Some(target) => {
                enc.write_ref_id(target.ref_id.get())?;
                codec::write_object(enc, &*target.object.borrow())
            }
        }
    }

    /// Decode from the wire. A zero id consumes nothing further and leaves
    /// the null reference. A non-zero id constructs a fresh target through
    /// the declared class's factory when the slot is empty, adopts the wire
    /// id, and decodes the body in place.
    pub fn decode(&mut self, dec: &mut dyn Decoder) -> CodecResult<()> {
        let ref_id = dec.read_ref_id()?;
        if ref_id == NULL_REF_ID {
            self.target = None;
            return Ok(());
        }
        if self.target.is_none() {
            *self = Ref::from_instance(T::meta_class().create());
        }
        if let Some(target) = &self.target {
            target.ref_id.set(ref_id);
            codec::read_object(dec, &mut *target.object.borrow_mut())?;
        }
        Ok(())
    }

    fn from_instance(obj: Box<dyn crate::object::Entity>) -> Self {
        // Descriptor factories produce their own class; the fallback arm
        // cannot be reached through `T::meta_class()`.
        match obj.into_any().downcast::<T>() {
            Ok(concrete) => Ref::new(*concrete),
            Err(_) => Ref::new(T::create()),
        }
    }
}

impl<T: Reflect> Clone for Ref<T> {
    /// Adds a holder: increments the shared count.
    fn clone(&self) -> Self {
        Self {
            target: self.target.clone(),
        }
    }
}

impl<T: Reflect> Default for Ref<T> {
    fn default() -> Self {
        Self::null()
    }
}

impl<T: Reflect> fmt::Debug for Ref<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ref")
            .field("class", &T::CLASS_NAME)
            .field("ref_id", &self.ref_id())
            .field("ref_count", &self.ref_count())
            .finish()
    }
}

/// Exclusively-owned, always-present sub-object.
///
/// Created when the owner is created, dropped with the owner, never shared
/// and never null. Encoded and decoded in place with no id framing;
/// identity is never shared, so none is needed.
pub struct Member<T: Reflect> {
    object: Box<T>,
}

impl<T: Reflect> Member<T> {
    /// A member holding a factory-fresh sub-object.
    pub fn new() -> Self {
        Self {
            object: Box::new(T::create()),
        }
    }

    /// A member taking ownership of `object`.
    pub fn with(object: T) -> Self {
        Self {
            object: Box::new(object),
        }
    }

    /// Encode the sub-object body in place.
    pub fn encode(&self, enc: &mut dyn Encoder) -> CodecResult<()> {
        codec::write_object(enc, &*self.object)
    }

    /// Decode the sub-object body in place.
    pub fn decode(&mut self, dec: &mut dyn Decoder) -> CodecResult<()> {
        codec::read_object(dec, &mut *self.object)
    }
}

impl<T: Reflect> Default for Member<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Reflect> Deref for Member<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.object
    }
}

impl<T: Reflect> DerefMut for Member<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.object
    }
}

impl<T: Reflect + fmt::Debug> fmt::Debug for Member<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Member").field(&self.object).finish()
    }
}
