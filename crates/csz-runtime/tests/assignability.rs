use super::*;
use crate::metadata::{TypeMetadata, TypeRefMetadata};

struct Fixture {
    registry: TypeRegistry,
    x1: TypeHandle,
    x2: TypeHandle,
    i5: TypeHandle,
    i6: TypeHandle,
    i7: TypeHandle,
    i8: TypeHandle,
}

impl Fixture {
    fn new() -> Self {
        let registry = TypeRegistry::new();
        let h = registry
            .load(&[
                TypeMetadata::class("Demo.X1"),
                TypeMetadata::class("Demo.X2").with_base(TypeRefMetadata::named("Demo.X1")),
                TypeMetadata::interface("Demo.I5$1")
                    .with_generic_parameters(&[("T", Variance::Invariant)]),
                TypeMetadata::interface("Demo.I6$1")
                    .with_generic_parameters(&[("T", Variance::Covariant)]),
                TypeMetadata::interface("Demo.I7$1")
                    .with_generic_parameters(&[("T", Variance::Contravariant)]),
                TypeMetadata::interface("Demo.I8$2").with_generic_parameters(&[
                    ("T1", Variance::Covariant),
                    ("T2", Variance::Contravariant),
                ]),
            ])
            .unwrap();
        Self {
            registry,
            x1: h[0],
            x2: h[1],
            i5: h[2],
            i6: h[3],
            i7: h[4],
            i8: h[5],
        }
    }

    fn make(&self, def: TypeHandle, args: &[TypeHandle]) -> TypeHandle {
        self.registry.make_generic(def, args).unwrap()
    }

    fn assignable(&self, base: TypeHandle, derived: TypeHandle) -> bool {
        self.registry.is_assignable_from(base, Some(derived))
    }
}

#[test]
fn identity_object_and_absent_types() {
    let f = Fixture::new();
    assert!(f.assignable(f.x1, f.x1));
    assert!(f.assignable(TypeHandle::OBJECT, f.x2));
    assert!(f.assignable(TypeHandle::OBJECT, TypeHandle::INT32));
    assert!(!f.registry.is_assignable_from(f.x1, None));
}

#[test]
fn class_chain_is_directional() {
    let f = Fixture::new();
    assert!(f.assignable(f.x1, f.x2));
    assert!(!f.assignable(f.x2, f.x1));
    assert!(f.registry.is_subclass_of(f.x2, f.x1));
    assert!(!f.registry.is_subclass_of(f.x1, f.x1));
}

#[test]
fn covariant_parameter_follows_argument_direction() {
    let f = Fixture::new();
    let i6_x1 = f.make(f.i6, &[f.x1]);
    let i6_x2 = f.make(f.i6, &[f.x2]);
    assert!(f.assignable(i6_x1, i6_x2));
    assert!(!f.assignable(i6_x2, i6_x1));
}

#[test]
fn contravariant_parameter_reverses_direction() {
    let f = Fixture::new();
    let i7_x1 = f.make(f.i7, &[f.x1]);
    let i7_x2 = f.make(f.i7, &[f.x2]);
    assert!(f.assignable(i7_x2, i7_x1));
    assert!(!f.assignable(i7_x1, i7_x2));
}

#[test]
fn invariant_parameter_requires_equal_arguments() {
    let f = Fixture::new();
    let i5_x1 = f.make(f.i5, &[f.x1]);
    let i5_x2 = f.make(f.i5, &[f.x2]);
    assert!(!f.assignable(i5_x1, i5_x2));
    assert!(!f.assignable(i5_x2, i5_x1));
}

#[test]
fn mixed_variance_combines_every_position() {
    let f = Fixture::new();
    let target = f.make(f.i8, &[f.x1, f.x2]);
    assert!(f.assignable(target, f.make(f.i8, &[f.x2, f.x1])));
    assert!(f.assignable(target, f.make(f.i8, &[f.x1, f.x1])));
    assert!(!f.assignable(f.make(f.i8, &[f.x2, f.x2]), f.make(f.i8, &[f.x1, f.x2])));
    assert!(!f.assignable(f.make(f.i8, &[f.x1, f.x1]), f.make(f.i8, &[f.x1, f.x2])));
}

#[test]
fn variance_applies_through_implemented_interfaces() {
    let f = Fixture::new();
    let producer = f
        .registry
        .define(&TypeMetadata::class("Demo.Producer").with_interfaces(vec![
            TypeRefMetadata::generic("Demo.I6$1", vec![TypeRefMetadata::named("Demo.X2")]),
        ]))
        .unwrap();
    assert!(f.assignable(f.make(f.i6, &[f.x1]), producer));
    assert!(f.assignable(f.make(f.i6, &[f.x2]), producer));
    assert!(!f.assignable(f.make(f.i7, &[f.x2]), producer));
}

#[test]
fn generic_class_implementing_generic_interface() {
    let f = Fixture::new();
    let h = f
        .registry
        .load(&[
            TypeMetadata::interface("Demo.I2$1").with_generic_parameters(&[("T", Variance::Invariant)]),
            TypeMetadata::class("Demo.C2$1").with_generic_parameters(&[("T", Variance::Invariant)]),
            TypeMetadata::class("Demo.D2$1")
                .with_generic_parameters(&[("T", Variance::Invariant)])
                .with_base(TypeRefMetadata::generic("Demo.C2$1", vec![TypeRefMetadata::Param(0)]))
                .with_interfaces(vec![TypeRefMetadata::generic(
                    "Demo.I2$1",
                    vec![TypeRefMetadata::Param(0)],
                )]),
        ])
        .unwrap();
    let (i2, c2, d2) = (h[0], h[1], h[2]);
    let d2_int = f.make(d2, &[TypeHandle::INT32]);

    assert!(f.assignable(f.make(i2, &[TypeHandle::INT32]), d2_int));
    assert!(!f.assignable(f.make(i2, &[TypeHandle::STRING]), d2_int));
    assert!(f.assignable(f.make(c2, &[TypeHandle::INT32]), d2_int));
}

#[test]
fn open_generic_definitions_use_their_own_parameters() {
    let f = Fixture::new();
    let d3 = f
        .registry
        .define(
            &TypeMetadata::class("Demo.D3$1")
                .with_generic_parameters(&[("T", Variance::Invariant)])
                .with_interfaces(vec![TypeRefMetadata::generic(
                    "Demo.I5$1",
                    vec![TypeRefMetadata::Param(0)],
                )]),
        )
        .unwrap();
    let own_param = f.registry.get(d3).unwrap().generic_parameters[0].handle;
    assert!(f.assignable(f.make(f.i5, &[own_param]), d3));
    assert!(!f.assignable(f.make(f.i5, &[TypeHandle::INT32]), d3));
}

#[test]
fn arrays_compare_structurally() {
    let f = Fixture::new();
    let x1s = f.registry.make_array(f.x1, 1);
    let x2s = f.registry.make_array(f.x2, 1);
    let ints = f.registry.make_array(TypeHandle::INT32, 1);
    let longs = f.registry.make_array(TypeHandle::INT64, 1);

    assert!(f.assignable(x1s, x2s));
    assert!(!f.assignable(x2s, x1s));
    assert!(!f.assignable(ints, longs));
    assert!(!f.assignable(f.registry.make_array(f.x1, 2), x2s));
    assert!(f.assignable(TypeHandle::ARRAY, ints));
    assert!(f.assignable(TypeHandle::OBJECT, ints));
    assert!(!f.assignable(ints, TypeHandle::ARRAY));
}

#[test]
fn nullable_accepts_its_underlying_type() {
    let f = Fixture::new();
    let nullable_int = f.registry.nullable_of(TypeHandle::INT32);
    assert!(f.assignable(nullable_int, TypeHandle::INT32));
    assert!(!f.assignable(nullable_int, TypeHandle::INT64));
    assert!(!f.assignable(TypeHandle::INT32, nullable_int));
}
