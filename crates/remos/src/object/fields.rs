// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2026 remos developers

//! Per-class field registry and the serialize/deserialize dispatch.
//!
//! Each class descriptor owns one [`FieldRegistry`]: an ordered field list
//! (declaration order = wire order) plus an id-indexed map (decode looks
//! fields up by id, so the wire may carry them in any order). Encoding is
//! order-fixed; decoding is order-independent.

use super::{Accessor, Entity, Reflect};
use crate::codec::{CodecResult, Decoder, Encoder};
use crate::link::{Member, Ref};
use crate::types::{Scalar, FIELD_ID_END, MAX_FIELD_COUNT, MAX_FIELD_ID};
use std::any::TypeId;
use std::collections::BTreeMap;
use std::fmt;

/// Field serializer bound to one concrete class through its accessor chain.
pub type SerializeFieldFn =
    Box<dyn Fn(&mut dyn Encoder, &dyn Entity) -> CodecResult<()> + Send + Sync>;
/// Field deserializer bound to one concrete class.
pub type DeserializeFieldFn =
    Box<dyn Fn(&mut dyn Decoder, &mut dyn Entity) -> CodecResult<()> + Send + Sync>;
/// Field initializer: resets the field to its declared default.
pub type ResetFieldFn = Box<dyn Fn(&mut dyn Entity) + Send + Sync>;

/// One named, id-tagged serializable field.
pub struct FieldDescriptor {
    pub(crate) id: i32,
    pub(crate) name: &'static str,
    pub(crate) serialize: SerializeFieldFn,
    pub(crate) deserialize: DeserializeFieldFn,
    pub(crate) reset: ResetFieldFn,
}

impl FieldDescriptor {
    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Ordered field list plus id-indexed lookup for one class, ancestors
/// included. Carries the reserved ceiling: the highest field id this class
/// and its ancestors claim, below which descendants may never declare.
pub struct FieldRegistry {
    class_name: &'static str,
    list: Vec<FieldDescriptor>,
    by_id: BTreeMap<i32, usize>,
    reserved_ceiling: i32,
}

impl FieldRegistry {
    pub(crate) fn new(class_name: &'static str) -> Self {
        Self {
            class_name,
            list: Vec::new(),
            by_id: BTreeMap::new(),
            reserved_ceiling: -1,
        }
    }

    /// Look a field up by id. A miss is a normal outcome (unknown wire
    /// field), never a panic.
    pub fn get(&self, field_id: i32) -> Option<&FieldDescriptor> {
        self.by_id.get(&field_id).map(|&idx| &self.list[idx])
    }

    /// Fields in declaration (= wire) order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.list.iter()
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Highest field id reserved by this class and its ancestors.
    pub fn reserved_ceiling(&self) -> i32 {
        self.reserved_ceiling
    }

    pub(crate) fn set_reserved_ceiling(&mut self, max_id: i32) {
        self.reserved_ceiling = max_id;
    }

    /// Register one field.
    ///
    /// # Panics
    ///
    /// Fatal configuration errors: id out of `0..=MAX_FIELD_ID`, id not
    /// above `inherited_ceiling`, duplicate id (own or ancestor), or more
    /// than [`MAX_FIELD_COUNT`] fields.
    pub(crate) fn insert(&mut self, descriptor: FieldDescriptor, inherited_ceiling: i32) {
        let id = descriptor.id;
        assert!(
            (0..=MAX_FIELD_ID).contains(&id),
            "class '{}': field '{}' id {} outside 0..={}",
            self.class_name,
            descriptor.name,
            id,
            MAX_FIELD_ID
        );
        assert!(
            id > inherited_ceiling,
            "class '{}': field '{}' id {} must exceed the inherited reserved ceiling {}",
            self.class_name,
            descriptor.name,
            id,
            inherited_ceiling
        );
        assert!(
            self.list.len() < MAX_FIELD_COUNT,
            "class '{}': more than {} fields",
            self.class_name,
            MAX_FIELD_COUNT
        );
        assert!(
            !self.by_id.contains_key(&id),
            "class '{}': field id {} already used by this class or an ancestor",
            self.class_name,
            id
        );
        self.by_id.insert(id, self.list.len());
        self.list.push(descriptor);
    }

    /// Write every field in declaration order, each preceded by its id,
    /// then the terminator id.
    pub(crate) fn serialize(&self, enc: &mut dyn Encoder, obj: &dyn Entity) -> CodecResult<()> {
        for field in &self.list {
            enc.write_field_id(field.id)?;
            (field.serialize)(enc, obj)?;
        }
        enc.write_field_id(FIELD_ID_END)
    }

    /// Read (field id, value) pairs until the terminator, dispatching each
    /// by id. An unknown id aborts this object's decode with a recoverable
    /// error; fields may arrive in any order.
    pub(crate) fn deserialize(&self, dec: &mut dyn Decoder, obj: &mut dyn Entity) -> CodecResult<()> {
        loop {
            let field_id = dec.read_field_id()?;
            if field_id == FIELD_ID_END {
                return Ok(());
            }
            match self.get(field_id) {
                Some(field) => (field.deserialize)(dec, obj)?,
                None => {
                    log::warn!(
                        "[FieldRegistry::deserialize] class '{}': unknown field id {}",
                        self.class_name,
                        field_id
                    );
                    return Err(crate::codec::CodecError::UnknownField {
                        class: self.class_name,
                        field_id,
                    });
                }
            }
        }
    }
}

impl fmt::Debug for FieldRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldRegistry")
            .field("class_name", &self.class_name)
            .field("fields", &self.list)
            .field("reserved_ceiling", &self.reserved_ceiling)
            .finish()
    }
}

/// Field declaration scope for one class, handed to
/// [`Reflect::declare_fields`].
///
/// Binds each declared field's typed accessors into the type-erased
/// registry through the accessor chain of the final concrete type.
pub struct Fields<'r, T: Reflect> {
    registry: &'r mut FieldRegistry,
    lens: Accessor<T>,
    inherited_ceiling: i32,
}

impl<'r, T: Reflect> Fields<'r, T> {
    pub(crate) fn new(registry: &'r mut FieldRegistry, lens: Accessor<T>) -> Self {
        let inherited_ceiling = registry.reserved_ceiling();
        Self {
            registry,
            lens,
            inherited_ceiling,
        }
    }

    /// Raise the reserved ceiling for descendants of this class.
    ///
    /// # Panics
    ///
    /// If `max_id` is outside `0..=MAX_FIELD_ID` or below the inherited
    /// ceiling.
    pub fn reserve(&mut self, max_id: i32) -> &mut Self {
        assert!(
            (0..=MAX_FIELD_ID).contains(&max_id),
            "class '{}': reserved ceiling {} outside 0..={}",
            T::CLASS_NAME,
            max_id,
            MAX_FIELD_ID
        );
        assert!(
            max_id >= self.inherited_ceiling,
            "class '{}': reserved ceiling {} below the inherited ceiling {}",
            T::CLASS_NAME,
            max_id,
            self.inherited_ceiling
        );
        self.registry.set_reserved_ceiling(max_id);
        self
    }

    /// Declare a scalar field.
    ///
    /// # Panics
    ///
    /// See [`FieldRegistry::insert`] for the fatal configuration errors.
    pub fn scalar<V: Scalar>(
        &mut self,
        id: i32,
        name: &'static str,
        get: fn(&T) -> &V,
        get_mut: fn(&mut T) -> &mut V,
    ) -> &mut Self {
        let lens = self.lens.clone();
        let serialize: SerializeFieldFn =
            Box::new(move |enc, obj| get(lens.get(obj)?).encode(enc));
        let lens = self.lens.clone();
        let deserialize: DeserializeFieldFn = Box::new(move |dec, obj| {
            *get_mut(lens.get_mut(obj)?) = V::decode(dec)?;
            Ok(())
        });
        let lens = self.lens.clone();
        let reset: ResetFieldFn = Box::new(move |obj| {
            if let Ok(part) = lens.get_mut(obj) {
                *get_mut(part) = V::default();
            }
        });
        self.insert(id, name, serialize, deserialize, reset)
    }

    /// Declare a reference field: a nullable, shared link to another
    /// entity.
    pub fn reference<U: Reflect>(
        &mut self,
        id: i32,
        name: &'static str,
        get: fn(&T) -> &Ref<U>,
        get_mut: fn(&mut T) -> &mut Ref<U>,
    ) -> &mut Self {
        let lens = self.lens.clone();
        let serialize: SerializeFieldFn =
            Box::new(move |enc, obj| get(lens.get(obj)?).encode(enc));
        let lens = self.lens.clone();
        let deserialize: DeserializeFieldFn =
            Box::new(move |dec, obj| get_mut(lens.get_mut(obj)?).decode(dec));
        let lens = self.lens.clone();
        let reset: ResetFieldFn = Box::new(move |obj| {
            if let Ok(part) = lens.get_mut(obj) {
                *get_mut(part) = Ref::null();
            }
        });
        self.insert(id, name, serialize, deserialize, reset)
    }

    /// Declare an embedded member field: an exclusively-owned, always
    /// present sub-object encoded in place.
    pub fn member<U: Reflect>(
        &mut self,
        id: i32,
        name: &'static str,
        get: fn(&T) -> &Member<U>,
        get_mut: fn(&mut T) -> &mut Member<U>,
    ) -> &mut Self {
        let lens = self.lens.clone();
        let serialize: SerializeFieldFn =
            Box::new(move |enc, obj| get(lens.get(obj)?).encode(enc));
        let lens = self.lens.clone();
        let deserialize: DeserializeFieldFn =
            Box::new(move |dec, obj| get_mut(lens.get_mut(obj)?).decode(dec));
        let lens = self.lens.clone();
        let reset: ResetFieldFn = Box::new(move |obj| {
            if let Ok(part) = lens.get_mut(obj) {
                *get_mut(part) = Member::default();
            }
        });
        self.insert(id, name, serialize, deserialize, reset)
    }

    fn insert(
        &mut self,
        id: i32,
        name: &'static str,
        serialize: SerializeFieldFn,
        deserialize: DeserializeFieldFn,
        reset: ResetFieldFn,
    ) -> &mut Self {
        self.registry.insert(
            FieldDescriptor {
                id,
                name,
                serialize,
                deserialize,
                reset,
            },
            self.inherited_ceiling,
        );
        self
    }
}

/// Collect the full field set for the concrete type `T`: ancestors first
/// (recursing to the root), then `T`'s own declarations. Ancestor fields
/// therefore always occupy earlier wire positions.
pub(crate) fn collect_fields<T: Reflect>(registry: &mut FieldRegistry, lens: &Accessor<T>) {
    if TypeId::of::<T>() != TypeId::of::<T::Super>() {
        collect_fields::<T::Super>(registry, &lens.to_super());
    }
    let mut fields = Fields::new(registry, lens.clone());
    T::declare_fields(&mut fields);
}
