// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2026 remos developers

//! Reference and embedded-member wire laws: null refs cost exactly four
//! bytes, targets round-trip in full, each wire occurrence decodes into its
//! own instance, and N holders release exactly one deallocation.

use remos::{
    read_object, write_object, Base, BufDecoder, BufEncoder, ClassDescriptor, Fields, Member, Ref,
    Reflect,
};
use std::cell::Cell;
use std::sync::OnceLock;

#[derive(Debug, Default, Clone, PartialEq)]
struct Target {
    base: Base,
    value: i32,
    tag: String,
}

impl Reflect for Target {
    type Super = Base;
    const CLASS_ID: i32 = 40;
    const CLASS_NAME: &'static str = "Target";

    fn meta_class() -> &'static ClassDescriptor {
        static CLASS: OnceLock<ClassDescriptor> = OnceLock::new();
        CLASS.get_or_init(ClassDescriptor::describe::<Target>)
    }

    fn create() -> Self {
        Target::default()
    }

    fn super_ref(&self) -> &Base {
        &self.base
    }

    fn super_mut(&mut self) -> &mut Base {
        &mut self.base
    }

    fn declare_fields(fields: &mut Fields<'_, Self>) {
        fields
            .scalar(1, "value", |t| &t.value, |t| &mut t.value)
            .scalar(2, "tag", |t| &t.tag, |t| &mut t.tag);
    }
}

#[derive(Debug, Default)]
struct Holder {
    base: Base,
    link: Ref<Target>,
    spare: Ref<Target>,
}

impl Reflect for Holder {
    type Super = Base;
    const CLASS_ID: i32 = 41;
    const CLASS_NAME: &'static str = "Holder";

    fn meta_class() -> &'static ClassDescriptor {
        static CLASS: OnceLock<ClassDescriptor> = OnceLock::new();
        CLASS.get_or_init(ClassDescriptor::describe::<Holder>)
    }

    fn create() -> Self {
        Holder::default()
    }

    fn super_ref(&self) -> &Base {
        &self.base
    }

    fn super_mut(&mut self) -> &mut Base {
        &mut self.base
    }

    fn declare_fields(fields: &mut Fields<'_, Self>) {
        fields
            .reference(1, "link", |h| &h.link, |h| &mut h.link)
            .reference(2, "spare", |h| &h.spare, |h| &mut h.spare);
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Inner {
    base: Base,
    serial: i64,
}

impl Reflect for Inner {
    type Super = Base;
    const CLASS_ID: i32 = 42;
    const CLASS_NAME: &'static str = "Inner";

    fn meta_class() -> &'static ClassDescriptor {
        static CLASS: OnceLock<ClassDescriptor> = OnceLock::new();
        CLASS.get_or_init(ClassDescriptor::describe::<Inner>)
    }

    fn create() -> Self {
        Inner::default()
    }

    fn super_ref(&self) -> &Base {
        &self.base
    }

    fn super_mut(&mut self) -> &mut Base {
        &mut self.base
    }

    fn declare_fields(fields: &mut Fields<'_, Self>) {
        fields.scalar(1, "serial", |i| &i.serial, |i| &mut i.serial);
    }
}

#[derive(Debug, Default)]
struct Shell {
    base: Base,
    core: Member<Inner>,
    label: String,
}

impl Reflect for Shell {
    type Super = Base;
    const CLASS_ID: i32 = 43;
    const CLASS_NAME: &'static str = "Shell";

    fn meta_class() -> &'static ClassDescriptor {
        static CLASS: OnceLock<ClassDescriptor> = OnceLock::new();
        CLASS.get_or_init(ClassDescriptor::describe::<Shell>)
    }

    fn create() -> Self {
        Shell::default()
    }

    fn super_ref(&self) -> &Base {
        &self.base
    }

    fn super_mut(&mut self) -> &mut Base {
        &mut self.base
    }

    fn declare_fields(fields: &mut Fields<'_, Self>) {
        fields
            .member(1, "core", |s| &s.core, |s| &mut s.core)
            .scalar(2, "label", |s| &s.label, |s| &mut s.label);
    }
}

#[test]
fn test_null_reference_is_exactly_four_bytes() {
    let link: Ref<Target> = Ref::null();
    let mut enc = BufEncoder::new();
    link.encode(&mut enc).expect("encode should succeed");
    assert_eq!(enc.len(), 4);

    let bytes = enc.into_bytes();
    let mut dec = BufDecoder::new(&bytes);
    let mut out: Ref<Target> = Ref::null();
    out.decode(&mut dec).expect("decode should succeed");
    assert_eq!(dec.offset(), 4);
    assert!(out.is_null());
}

#[test]
fn test_reference_target_round_trips() {
    let mut holder = Holder::create();
    holder.link = Ref::new(Target {
        base: Base,
        value: 77,
        tag: "north".to_string(),
    });

    let mut enc = BufEncoder::new();
    write_object(&mut enc, &holder).expect("encode should succeed");

    let bytes = enc.into_bytes();
    let mut dec = BufDecoder::new(&bytes);
    let mut out = Holder::create();
    read_object(&mut dec, &mut out).expect("decode should succeed");

    assert_eq!(out.link.ref_id(), holder.link.ref_id());
    let target = out.link.get().expect("decoded link should be non-null");
    assert_eq!(target.value, 77);
    assert_eq!(target.tag, "north");
    assert!(out.spare.is_null());
}

#[test]
fn test_each_wire_occurrence_decodes_into_its_own_instance() {
    // Two holders of one target: both occurrences carry the full body.
    let mut holder = Holder::create();
    holder.link = Ref::new(Target {
        base: Base,
        value: 5,
        tag: "shared".to_string(),
    });
    holder.spare = holder.link.clone();
    assert_eq!(holder.link.ref_count(), 2);

    let mut enc = BufEncoder::new();
    write_object(&mut enc, &holder).expect("encode should succeed");

    let bytes = enc.into_bytes();
    let mut dec = BufDecoder::new(&bytes);
    let mut out = Holder::create();
    read_object(&mut dec, &mut out).expect("decode should succeed");

    // Same wire identity, separate local instances (no decode-side dedup).
    assert_eq!(out.link.ref_id(), out.spare.ref_id());
    assert_eq!(out.link.ref_count(), 1);
    assert_eq!(out.spare.ref_count(), 1);
    assert_eq!(out.link.get().expect("non-null").value, 5);
    assert_eq!(out.spare.get().expect("non-null").tag, "shared");
}

#[test]
fn test_decode_reuses_an_existing_target_in_place() {
    let mut source = Holder::create();
    source.link = Ref::new(Target {
        base: Base,
        value: 9,
        tag: "fresh".to_string(),
    });
    let mut enc = BufEncoder::new();
    write_object(&mut enc, &source).expect("encode should succeed");

    // The destination slot already holds a target; it is decoded over.
    let mut out = Holder::create();
    out.link = Ref::new(Target {
        base: Base,
        value: -1,
        tag: "stale".to_string(),
    });
    let alias = out.link.clone();

    let bytes = enc.into_bytes();
    let mut dec = BufDecoder::new(&bytes);
    read_object(&mut dec, &mut out).expect("decode should succeed");

    assert_eq!(out.link.get().expect("non-null").value, 9);
    // The alias shares the slot, so it observes the decoded state too.
    assert_eq!(alias.get().expect("non-null").tag, "fresh");
    assert_eq!(alias.ref_id(), source.link.ref_id());
}

#[test]
fn test_member_encodes_in_place_with_no_id_framing() {
    let mut shell = Shell::create();
    shell.core.serial = 31_337;
    shell.label = "pod".to_string();

    let mut enc = BufEncoder::new();
    write_object(&mut enc, &shell).expect("encode should succeed");

    // field id (4) + inner body (4 + 8 + 4) + field id (4) + text (2 + 3)
    // + terminator (4): no ref id anywhere.
    assert_eq!(enc.len(), 4 + 16 + 4 + 5 + 4);

    let bytes = enc.into_bytes();
    let mut dec = BufDecoder::new(&bytes);
    let mut out = Shell::create();
    read_object(&mut dec, &mut out).expect("decode should succeed");
    assert_eq!(out.core.serial, 31_337);
    assert_eq!(out.label, "pod");
}

thread_local! {
    static PROBE_DROPS: Cell<usize> = Cell::new(0);
}

#[derive(Debug, Default)]
struct Probe {
    base: Base,
}

impl Drop for Probe {
    fn drop(&mut self) {
        PROBE_DROPS.with(|d| d.set(d.get() + 1));
    }
}

impl Reflect for Probe {
    type Super = Base;
    const CLASS_ID: i32 = 44;
    const CLASS_NAME: &'static str = "Probe";

    fn meta_class() -> &'static ClassDescriptor {
        static CLASS: OnceLock<ClassDescriptor> = OnceLock::new();
        CLASS.get_or_init(ClassDescriptor::describe::<Probe>)
    }

    fn create() -> Self {
        Probe::default()
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
fn test_n_holders_release_exactly_one_deallocation() {
    PROBE_DROPS.with(|d| d.set(0));
    {
        let first = Ref::new(Probe::create());
        let holders: Vec<Ref<Probe>> = (0..3).map(|_| first.clone()).collect();
        assert_eq!(first.ref_count(), 4);

        drop(holders);
        assert_eq!(first.ref_count(), 1);
        assert_eq!(PROBE_DROPS.with(Cell::get), 0);
    }
    // Last holder gone: exactly one drop of the target.
    assert_eq!(PROBE_DROPS.with(Cell::get), 1);
}
