// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2026 remos developers

//! Class descriptors: the per-class runtime record of id, name, ancestor
//! link, field registry, and codec/factory closures.

use super::fields::{collect_fields, FieldRegistry};
use super::{Accessor, Entity, Reflect};
use crate::codec::{CodecError, CodecResult, Decoder, Encoder};
use crate::replication::RepPolicy;
use crate::types::{class_id_in_partition, CLASS_ID_ROOT, CLASS_ID_USER_MAX, CLASS_ID_USER_MIN};
use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

/// Factory closure: builds a blank instance and runs field initializers.
pub type FactoryFn = Box<dyn Fn() -> Box<dyn Entity> + Send + Sync>;
/// Class serializer closure: full object body, terminator included.
pub type SerializeFn = Box<dyn Fn(&mut dyn Encoder, &dyn Entity) -> CodecResult<()> + Send + Sync>;
/// Class deserializer closure.
pub type DeserializeFn =
    Box<dyn Fn(&mut dyn Decoder, &mut dyn Entity) -> CodecResult<()> + Send + Sync>;

/// Runtime record of one class: stable id, name, super link, replication
/// policy, field registry, and the factory/serializer/deserializer
/// closures. Immutable after construction and alive for the whole process;
/// instances hand out `&'static ClassDescriptor`.
pub struct ClassDescriptor {
    class_id: i32,
    class_name: &'static str,
    super_class: Option<&'static ClassDescriptor>,
    rep_policy: RepPolicy,
    fields: Arc<FieldRegistry>,
    factory: FactoryFn,
    serialize: SerializeFn,
    deserialize: DeserializeFn,
}

impl ClassDescriptor {
    /// Build the descriptor for `T` from its [`Reflect`] implementation:
    /// the generic adapter producing descriptor, factory, and codec entry
    /// points for one concrete class. Ancestor descriptors are built first
    /// (through `T::Super::meta_class()`), and ancestor fields are
    /// collected before `T`'s own.
    ///
    /// # Panics
    ///
    /// If `T::CLASS_ID` falls outside the valid partition (the root id or
    /// `CLASS_ID_USER_MIN..=CLASS_ID_USER_MAX`), or any field declaration
    /// violates its registration contract (see
    /// [`Fields`](super::Fields)).
    pub fn describe<T: Reflect>() -> ClassDescriptor {
        assert!(
            class_id_in_partition(T::CLASS_ID),
            "class '{}': id {} outside the valid partition ({} or {}..={})",
            T::CLASS_NAME,
            T::CLASS_ID,
            CLASS_ID_ROOT,
            CLASS_ID_USER_MIN,
            CLASS_ID_USER_MAX
        );

        let super_class = if TypeId::of::<T>() == TypeId::of::<T::Super>() {
            None
        } else {
            Some(T::Super::meta_class())
        };

        let mut registry = FieldRegistry::new(T::CLASS_NAME);
        collect_fields::<T>(&mut registry, &Accessor::root());
        let fields = Arc::new(registry);

        let ser_fields = Arc::clone(&fields);
        let serialize: SerializeFn = Box::new(move |enc, obj| {
            if obj.class().id() != T::CLASS_ID {
                return Err(CodecError::ClassMismatch {
                    expected: T::CLASS_NAME,
                });
            }
            ser_fields.serialize(enc, obj)
        });

        let de_fields = Arc::clone(&fields);
        let deserialize: DeserializeFn = Box::new(move |dec, obj| {
            if obj.class().id() != T::CLASS_ID {
                return Err(CodecError::ClassMismatch {
                    expected: T::CLASS_NAME,
                });
            }
            de_fields.deserialize(dec, obj)
        });

        let init_fields = Arc::clone(&fields);
        let factory: FactoryFn = Box::new(move || {
            let mut obj: Box<dyn Entity> = Box::new(T::create());
            for field in init_fields.iter() {
                (field.reset)(obj.as_mut());
            }
            obj
        });

        ClassDescriptor {
            class_id: T::CLASS_ID,
            class_name: T::CLASS_NAME,
            super_class,
            rep_policy: T::REP_POLICY,
            fields,
            factory,
            serialize,
            deserialize,
        }
    }

    pub fn id(&self) -> i32 {
        self.class_id
    }

    pub fn name(&self) -> &'static str {
        self.class_name
    }

    pub fn super_class(&self) -> Option<&'static ClassDescriptor> {
        self.super_class
    }

    pub fn rep_policy(&self) -> RepPolicy {
        self.rep_policy
    }

    pub fn fields(&self) -> &FieldRegistry {
        &self.fields
    }

    /// Construct a fresh instance through the factory, field initializers
    /// applied.
    pub fn create(&self) -> Box<dyn Entity> {
        (self.factory)()
    }

    /// Serialize `obj` (which must be of this class) as a full object body.
    pub fn write_to(&self, enc: &mut dyn Encoder, obj: &dyn Entity) -> CodecResult<()> {
        (self.serialize)(enc, obj)
    }

    /// Decode a full object body into `obj` (which must be of this class).
    pub fn read_from(&self, dec: &mut dyn Decoder, obj: &mut dyn Entity) -> CodecResult<()> {
        (self.deserialize)(dec, obj)
    }

    /// True when `ancestor` is this class or any link of its super chain.
    pub fn inherits_from(&self, ancestor: &ClassDescriptor) -> bool {
        let mut current = Some(self);
        while let Some(class) = current {
            if class.class_id == ancestor.class_id {
                return true;
            }
            current = class.super_class.map(|c| c as &ClassDescriptor);
        }
        false
    }
}

impl fmt::Debug for ClassDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassDescriptor")
            .field("class_id", &self.class_id)
            .field("class_name", &self.class_name)
            .field("super_class", &self.super_class.map(ClassDescriptor::name))
            .field("rep_policy", &self.rep_policy)
            .field("fields", &self.fields.len())
            .finish_non_exhaustive()
    }
}
