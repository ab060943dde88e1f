// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2026 remos developers

#![allow(clippy::float_cmp)]

//! Inheritance semantics: ancestor fields precede descendant fields on the
//! wire, ancestor checks walk the right direction, and the reserved-ceiling
//! contract rejects colliding declarations at registration time.

use remos::{
    read_object, write_object, Base, BufDecoder, BufEncoder, ClassDescriptor, Entity, Fields,
    Reflect,
};
use std::sync::OnceLock;

#[derive(Debug, Default, Clone, PartialEq)]
struct Actor {
    base: Base,
    pos_x: f32,
    pos_y: f32,
}

impl Reflect for Actor {
    type Super = Base;
    const CLASS_ID: i32 = 21;
    const CLASS_NAME: &'static str = "Actor";

    fn meta_class() -> &'static ClassDescriptor {
        static CLASS: OnceLock<ClassDescriptor> = OnceLock::new();
        CLASS.get_or_init(ClassDescriptor::describe::<Actor>)
    }

    fn create() -> Self {
        Actor::default()
    }

    fn super_ref(&self) -> &Base {
        &self.base
    }

    fn super_mut(&mut self) -> &mut Base {
        &mut self.base
    }

    fn declare_fields(fields: &mut Fields<'_, Self>) {
        fields
            .reserve(9)
            .scalar(1, "pos_x", |a| &a.pos_x, |a| &mut a.pos_x)
            .scalar(2, "pos_y", |a| &a.pos_y, |a| &mut a.pos_y);
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Player {
    actor: Actor,
    score: i32,
    name: String,
}

impl Reflect for Player {
    type Super = Actor;
    const CLASS_ID: i32 = 22;
    const CLASS_NAME: &'static str = "Player";

    fn meta_class() -> &'static ClassDescriptor {
        static CLASS: OnceLock<ClassDescriptor> = OnceLock::new();
        CLASS.get_or_init(ClassDescriptor::describe::<Player>)
    }

    fn create() -> Self {
        Player::default()
    }

    fn super_ref(&self) -> &Actor {
        &self.actor
    }

    fn super_mut(&mut self) -> &mut Actor {
        &mut self.actor
    }

    fn declare_fields(fields: &mut Fields<'_, Self>) {
        fields
            .scalar(10, "score", |p| &p.score, |p| &mut p.score)
            .scalar(11, "name", |p| &p.name, |p| &mut p.name);
    }
}

fn sample_player() -> Player {
    Player {
        actor: Actor {
            base: Base,
            pos_x: 4.0,
            pos_y: -2.5,
        },
        score: 1200,
        name: "avatar".to_string(),
    }
}

#[test]
fn test_descriptor_chain() {
    let player = Player::meta_class();
    let actor = Actor::meta_class();
    let base = Base::meta_class();

    assert_eq!(player.id(), 22);
    assert_eq!(
        player.super_class().map(ClassDescriptor::id),
        Some(actor.id())
    );
    assert_eq!(
        actor.super_class().map(ClassDescriptor::id),
        Some(base.id())
    );
    assert!(base.super_class().is_none());

    // Ancestor fields are collected into the descendant registry.
    assert_eq!(actor.fields().len(), 2);
    assert_eq!(player.fields().len(), 4);
    assert_eq!(player.fields().reserved_ceiling(), 9);
}

#[test]
fn test_ancestor_fields_come_first_on_the_wire() {
    let ids: Vec<i32> = Player::meta_class()
        .fields()
        .iter()
        .map(|f| f.id())
        .collect();
    assert_eq!(ids, vec![1, 2, 10, 11]);

    let mut enc = BufEncoder::new();
    write_object(&mut enc, &sample_player()).expect("encode should succeed");
    let bytes = enc.into_bytes();
    assert_eq!(bytes[0..4], 1i32.to_ne_bytes());
}

#[test]
fn test_inherited_fields_round_trip() {
    let original = sample_player();
    let mut enc = BufEncoder::new();
    write_object(&mut enc, &original).expect("encode should succeed");

    let bytes = enc.into_bytes();
    let mut dec = BufDecoder::new(&bytes);
    let mut out = Player::create();
    read_object(&mut dec, &mut out).expect("decode should succeed");
    assert_eq!(out, original);
}

#[test]
fn test_instance_of_walks_the_dynamic_chain() {
    let player = sample_player();
    assert!(player.instance_of(Player::meta_class()));
    assert!(player.instance_of(Actor::meta_class()));
    assert!(player.instance_of(Base::meta_class()));

    // The walk goes up from the dynamic class, never down.
    let actor = Actor::create();
    assert!(actor.instance_of(Actor::meta_class()));
    assert!(actor.instance_of(Base::meta_class()));
    assert!(!actor.instance_of(Player::meta_class()));
}

#[test]
fn test_same_class_is_exact() {
    let player = sample_player();
    assert!(player.same_class(Player::meta_class()));
    assert!(!player.same_class(Actor::meta_class()));
    assert!(!player.same_class(Base::meta_class()));
}

#[test]
fn test_factory_applies_field_defaults() {
    let obj = Player::meta_class().create();
    let player = obj
        .downcast_ref::<Player>()
        .expect("factory should produce a Player");
    assert_eq!(player.score, 0);
    assert_eq!(player.name, "");
    assert_eq!(player.actor.pos_x, 0.0);
}

// A declaration below the inherited ceiling must be rejected when the
// descriptor is built.
#[derive(Debug, Default)]
struct BelowCeiling {
    actor: Actor,
    stale: i32,
}

impl Reflect for BelowCeiling {
    type Super = Actor;
    const CLASS_ID: i32 = 23;
    const CLASS_NAME: &'static str = "BelowCeiling";

    fn meta_class() -> &'static ClassDescriptor {
        static CLASS: OnceLock<ClassDescriptor> = OnceLock::new();
        CLASS.get_or_init(ClassDescriptor::describe::<BelowCeiling>)
    }

    fn create() -> Self {
        BelowCeiling::default()
    }

    fn super_ref(&self) -> &Actor {
        &self.actor
    }

    fn super_mut(&mut self) -> &mut Actor {
        &mut self.actor
    }

    fn declare_fields(fields: &mut Fields<'_, Self>) {
        // Id 5 sits under Actor's reserved ceiling of 9.
        fields.scalar(5, "stale", |b| &b.stale, |b| &mut b.stale);
    }
}

#[test]
#[should_panic(expected = "must exceed the inherited reserved ceiling")]
fn test_field_id_below_ceiling_is_fatal() {
    let _ = BelowCeiling::meta_class();
}

#[derive(Debug, Default)]
struct DuplicateField {
    base: Base,
    first: i32,
    second: i32,
}

impl Reflect for DuplicateField {
    type Super = Base;
    const CLASS_ID: i32 = 24;
    const CLASS_NAME: &'static str = "DuplicateField";

    fn meta_class() -> &'static ClassDescriptor {
        static CLASS: OnceLock<ClassDescriptor> = OnceLock::new();
        CLASS.get_or_init(ClassDescriptor::describe::<DuplicateField>)
    }

    fn create() -> Self {
        DuplicateField::default()
    }

    fn super_ref(&self) -> &Base {
        &self.base
    }

    fn super_mut(&mut self) -> &mut Base {
        &mut self.base
    }

    fn declare_fields(fields: &mut Fields<'_, Self>) {
        fields
            .scalar(1, "first", |d| &d.first, |d| &mut d.first)
            .scalar(1, "second", |d| &d.second, |d| &mut d.second);
    }
}

#[test]
#[should_panic(expected = "already used")]
fn test_duplicate_field_id_is_fatal() {
    let _ = DuplicateField::meta_class();
}

#[derive(Debug, Default)]
struct ShrunkenReserve {
    actor: Actor,
}

impl Reflect for ShrunkenReserve {
    type Super = Actor;
    const CLASS_ID: i32 = 25;
    const CLASS_NAME: &'static str = "ShrunkenReserve";

    fn meta_class() -> &'static ClassDescriptor {
        static CLASS: OnceLock<ClassDescriptor> = OnceLock::new();
        CLASS.get_or_init(ClassDescriptor::describe::<ShrunkenReserve>)
    }

    fn create() -> Self {
        ShrunkenReserve::default()
    }

    fn super_ref(&self) -> &Actor {
        &self.actor
    }

    fn super_mut(&mut self) -> &mut Actor {
        &mut self.actor
    }

    fn declare_fields(fields: &mut Fields<'_, Self>) {
        // Actor reserved up to 9; shrinking the ceiling is not allowed.
        fields.reserve(3);
    }
}

#[test]
#[should_panic(expected = "below the inherited ceiling")]
fn test_lowering_the_ceiling_is_fatal() {
    let _ = ShrunkenReserve::meta_class();
}

#[derive(Debug, Default)]
struct OutOfPartition {
    base: Base,
}

impl Reflect for OutOfPartition {
    type Super = Base;
    const CLASS_ID: i32 = 7; // scalar-kind partition, not a user id
    const CLASS_NAME: &'static str = "OutOfPartition";

    fn meta_class() -> &'static ClassDescriptor {
        static CLASS: OnceLock<ClassDescriptor> = OnceLock::new();
        CLASS.get_or_init(ClassDescriptor::describe::<OutOfPartition>)
    }

    fn create() -> Self {
        OutOfPartition::default()
    }

    fn super_ref(&self) -> &Base {
        &self.base
    }

    fn super_mut(&mut self) -> &mut Base {
        &mut self.base
    }

    fn declare_fields(_fields: &mut Fields<'_, Self>) {}
}

#[test]
#[should_panic(expected = "outside the valid partition")]
fn test_class_id_outside_partition_is_fatal() {
    let _ = OutOfPartition::meta_class();
}
