// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2026 remos developers

//! Object model: the polymorphic [`Entity`] trait, the [`Reflect`] contract
//! each concrete class implements, and the accessor machinery that binds
//! ancestor field declarations to the final concrete type.
//!
//! Every concrete class derives from exactly one immediate super class
//! (single-chain inheritance, modeled by composition: the sub-class embeds
//! its super and exposes it through [`Reflect::super_ref`] /
//! [`Reflect::super_mut`]). The chain terminates at [`Base`], the root class
//! with id 0, whose super is itself.
//!
//! A class comes to life by implementing [`Reflect`] and holding its
//! descriptor in a per-type static:
//!
//! ```ignore
//! impl Reflect for Widget {
//!     type Super = Base;
//!     const CLASS_ID: i32 = 20;
//!     const CLASS_NAME: &'static str = "Widget";
//!
//!     fn meta_class() -> &'static ClassDescriptor {
//!         static CLASS: OnceLock<ClassDescriptor> = OnceLock::new();
//!         CLASS.get_or_init(ClassDescriptor::describe::<Widget>)
//!     }
//!
//!     fn create() -> Self { Widget::default() }
//!     fn super_ref(&self) -> &Base { &self.base }
//!     fn super_mut(&mut self) -> &mut Base { &mut self.base }
//!
//!     fn declare_fields(fields: &mut Fields<'_, Self>) {
//!         fields
//!             .scalar(1, "width", |w| &w.width, |w| &mut w.width)
//!             .scalar(2, "label", |w| &w.label, |w| &mut w.label);
//!     }
//! }
//! ```

mod class;
mod fields;
mod registry;

pub use class::ClassDescriptor;
pub use fields::{FieldDescriptor, FieldRegistry, Fields};
pub use registry::ClassRegistry;

use crate::codec::{CodecError, CodecResult};
use crate::replication::RepPolicy;
use crate::types::CLASS_ID_ROOT;
use std::any::Any;
use std::sync::{Arc, OnceLock};

/// A polymorphic object. Every instance reports its dynamic class
/// descriptor; the codec and the replication layer only ever see `dyn
/// Entity`.
///
/// Implemented automatically for every [`Reflect`] type.
pub trait Entity: Any {
    /// The dynamic class descriptor of this instance.
    fn class(&self) -> &'static ClassDescriptor;

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;

    /// True when `class` is this instance's dynamic class or any ancestor
    /// of it (walks the dynamic type's chain, not `class`'s descendants).
    fn instance_of(&self, class: &ClassDescriptor) -> bool {
        self.class().inherits_from(class)
    }

    /// True only for exact dynamic-class equality; no chain walk.
    fn same_class(&self, class: &ClassDescriptor) -> bool {
        self.class().id() == class.id()
    }
}

impl dyn Entity {
    /// Downcast to a concrete class.
    pub fn downcast_ref<T: Entity>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Downcast to a concrete class, mutably.
    pub fn downcast_mut<T: Entity>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}

/// The per-class reflection contract.
///
/// One implementation per concrete class supplies the class id and name, the
/// immediate super class, a factory, and the field declarations;
/// [`ClassDescriptor::describe`] turns those into the static descriptor with
/// its serialize/deserialize/factory closures. Field registration recurses
/// into the super class first, so ancestor fields always occupy earlier wire
/// positions than the class's own.
pub trait Reflect: Any + Sized {
    /// Immediate super class. The root class uses `Super = Self`.
    type Super: Reflect;

    /// Stable class id: [`CLASS_ID_ROOT`] for the root, otherwise inside
    /// the user partition.
    const CLASS_ID: i32;

    /// Class name, used in diagnostics only (never on the wire).
    const CLASS_NAME: &'static str;

    /// How instances of this class replicate from host to slave.
    const REP_POLICY: RepPolicy = RepPolicy::Normal;

    /// The class descriptor. Implementations hold it in a per-type
    /// `OnceLock` static and initialize it with
    /// [`ClassDescriptor::describe`].
    fn meta_class() -> &'static ClassDescriptor;

    /// Construct a blank instance. Field initializers run afterwards when
    /// construction goes through the descriptor factory.
    fn create() -> Self;

    /// Project to the embedded super-class portion.
    fn super_ref(&self) -> &Self::Super;

    /// Project to the embedded super-class portion, mutably.
    fn super_mut(&mut self) -> &mut Self::Super;

    /// Declare this class's own fields (ancestors excluded; they are
    /// collected by recursion).
    fn declare_fields(fields: &mut Fields<'_, Self>);
}

impl<T: Reflect> Entity for T {
    fn class(&self) -> &'static ClassDescriptor {
        T::meta_class()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// Projection from the entity being encoded/decoded down to the portion a
/// declaring class owns.
///
/// The chain starts at the final concrete type (a checked downcast from
/// `dyn Entity`) and narrows through `super_ref`/`super_mut` one hop per
/// ancestor, so a field declared on an ancestor reads and writes the right
/// sub-object of any descendant instance.
pub struct Accessor<T> {
    get_fn: Arc<dyn for<'a> Fn(&'a dyn Entity) -> CodecResult<&'a T> + Send + Sync>,
    get_mut_fn: Arc<dyn for<'a> Fn(&'a mut dyn Entity) -> CodecResult<&'a mut T> + Send + Sync>,
}

impl<T> Clone for Accessor<T> {
    fn clone(&self) -> Self {
        Self {
            get_fn: Arc::clone(&self.get_fn),
            get_mut_fn: Arc::clone(&self.get_mut_fn),
        }
    }
}

impl<T: Reflect> Accessor<T> {
    /// Identity projection: downcast the entity to `T` itself.
    pub(crate) fn root() -> Self {
        Self {
            get_fn: Arc::new(|obj| {
                obj.as_any()
                    .downcast_ref::<T>()
                    .ok_or(CodecError::ClassMismatch {
                        expected: T::CLASS_NAME,
                    })
            }),
            get_mut_fn: Arc::new(|obj| {
                obj.as_any_mut()
                    .downcast_mut::<T>()
                    .ok_or(CodecError::ClassMismatch {
                        expected: T::CLASS_NAME,
                    })
            }),
        }
    }

    /// Narrow one inheritance hop, yielding the projection to the super
    /// portion.
    pub(crate) fn to_super(&self) -> Accessor<T::Super> {
        let get_fn = Arc::clone(&self.get_fn);
        let get_mut_fn = Arc::clone(&self.get_mut_fn);
        Accessor {
            get_fn: Arc::new(move |obj| (*get_fn)(obj).map(T::super_ref)),
            get_mut_fn: Arc::new(move |obj| (*get_mut_fn)(obj).map(T::super_mut)),
        }
    }

    pub(crate) fn get<'a>(&self, obj: &'a dyn Entity) -> CodecResult<&'a T> {
        (*self.get_fn)(obj)
    }

    pub(crate) fn get_mut<'a>(&self, obj: &'a mut dyn Entity) -> CodecResult<&'a mut T> {
        (*self.get_mut_fn)(obj)
    }
}

/// The root class. Declares no fields and closes every inheritance chain.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Base;

impl Reflect for Base {
    type Super = Base;
    const CLASS_ID: i32 = CLASS_ID_ROOT;
    const CLASS_NAME: &'static str = "Base";
    const REP_POLICY: RepPolicy = RepPolicy::Never;

    fn meta_class() -> &'static ClassDescriptor {
        static CLASS: OnceLock<ClassDescriptor> = OnceLock::new();
        CLASS.get_or_init(ClassDescriptor::describe::<Base>)
    }

    fn create() -> Self {
        Base
    }

    fn super_ref(&self) -> &Base {
        self
    }

    fn super_mut(&mut self) -> &mut Base {
        self
    }

    fn declare_fields(_fields: &mut Fields<'_, Self>) {}
}
