use pretty_assertions::assert_eq;

use super::*;
use crate::{PrimitiveKind, Qualifiers, TypeKind, UserDefinedType, VectorType};

fn ok<T>(result: Result<T, TypeError>) -> T {
    result.unwrap_or_else(|e| panic!("{e}"))
}

#[test]
fn pool_starts_empty() {
    let pool = TypePool::new();
    assert!(pool.is_empty());
    assert_eq!(pool.len(), 0);
    assert_eq!(pool.stats(), PoolStats::default());
}

#[test]
fn equal_primitives_share_one_node() {
    let mut pool = TypePool::new();
    let a = pool.intern(ParamType::primitive(PrimitiveKind::Int));
    let b = pool.intern(ParamType::primitive(PrimitiveKind::Int));

    assert_eq!(a.render(), "int");
    assert!(Rc::ptr_eq(&a, &b));
    assert!(Rc::ptr_eq(&a, &pool.int()));
    assert_eq!(pool.len(), 1);
    assert_eq!(pool.stats(), PoolStats { hits: 2, misses: 1 });
}

#[test]
fn independently_named_types_share_one_node() {
    let mut pool = TypePool::new();
    let first = ok(UserDefinedType::new("image2d_t"));
    let second = ok(UserDefinedType::new(String::from("image2d_t")));
    let a = pool.intern(first.into());
    let b = pool.intern(second.into());
    assert!(Rc::ptr_eq(&a, &b));
    assert!(Rc::ptr_eq(&a, &ok(pool.user_defined("image2d_t"))));
}

#[test]
fn distinct_shapes_get_distinct_nodes() {
    let mut pool = TypePool::new();
    let float = pool.float();
    let float3 = ok(pool.vector(float.clone(), 3));
    let float4 = ok(pool.vector(float, 4));
    assert!(!Rc::ptr_eq(&float3, &float4));
    assert!(!float3.equals(&float4));
    assert_eq!(pool.len(), 3);
}

#[test]
fn composites_built_from_foreign_children_are_canonicalized() {
    let mut pool = TypePool::new();

    // Children allocated outside the pool.
    let foreign_uint = Rc::new(ParamType::primitive(PrimitiveKind::UInt));
    let foreign_vec = Rc::new(ParamType::from(ok(VectorType::new(foreign_uint, 2))));
    let ptr = PointerType::new(foreign_vec).with_address_space(AddressSpace::Local);

    let interned = pool.intern(ptr.into());
    assert_eq!(interned.render(), "__local uint2*");
    assert_eq!(pool.len(), 3);

    let Some(pointee) = interned.as_pointer().map(PointerType::pointee) else {
        panic!("expected a pointer");
    };
    assert!(pool.is_canonical(pointee));
    let Some(element) = pointee.as_vector().map(VectorType::scalar_type) else {
        panic!("expected a vector");
    };
    assert!(Rc::ptr_eq(element, &pool.uint()));

    for ty in &pool {
        assert!(pool.is_canonical(ty));
    }
}

#[test]
fn pointer_attributes_are_part_of_the_key() {
    let mut pool = TypePool::new();
    let float = pool.float();
    let global_const = pool.pointer_with(float.clone(), AddressSpace::Global, Qualifiers::CONST);
    assert_eq!(global_const.render(), "const __global float*");

    let restricted = ok(pool.with_qualifier(&global_const, Qualifier::Restrict, true));
    assert!(!Rc::ptr_eq(&restricted, &global_const));
    assert!(!restricted.equals(&global_const));
    assert_eq!(restricted.render(), "restrict const __global float*");

    let back = ok(pool.with_qualifier(&restricted, Qualifier::Restrict, false));
    assert!(Rc::ptr_eq(&back, &global_const));

    let private = ok(pool.with_address_space(&global_const, AddressSpace::Private));
    assert!(Rc::ptr_eq(
        &private,
        &pool.pointer_with(float, AddressSpace::Private, Qualifiers::CONST)
    ));
    assert_eq!(private.render(), "const float*");
}

#[test]
fn reinterning_non_pointers_is_a_kind_mismatch() {
    let mut pool = TypePool::new();
    let int = pool.int();
    assert_eq!(
        pool.with_address_space(&int, AddressSpace::Global),
        Err(TypeError::KindMismatch {
            expected: TypeKind::Pointer,
            found: TypeKind::Primitive,
        })
    );
    assert!(pool.with_qualifier(&int, Qualifier::Const, true).is_err());
}

#[test]
fn stored_nodes_are_never_mutated() {
    let mut pool = TypePool::new();
    let int = pool.int();
    let ptr = pool.pointer(int);
    let _ = ok(pool.with_address_space(&ptr, AddressSpace::Local));
    let _ = ok(pool.with_qualifier(&ptr, Qualifier::Volatile, true));
    assert_eq!(ptr.render(), "int*");
    assert_eq!(pool.len(), 4);
}

#[test]
fn lookup_without_insert() {
    let mut pool = TypePool::new();
    let double = ParamType::primitive(PrimitiveKind::Double);
    assert!(!pool.contains(&double));
    assert!(pool.get(&double).is_none());

    let canonical = pool.intern(double.clone());
    assert!(pool.contains(&double));
    assert!(pool
        .get(&double)
        .is_some_and(|found| Rc::ptr_eq(&found, &canonical)));

    let copy = Rc::new(double);
    assert!(!pool.is_canonical(&copy));
    assert!(pool.is_canonical(&canonical));
}

#[test]
fn iteration_follows_first_interning_order() {
    let mut pool = TypePool::new();
    let half = pool.half();
    let _ = pool.pointer(half);
    let _ = pool.int();
    let _ = pool.half();

    let rendered: Vec<_> = pool.iter().map(|ty| ty.render()).collect();
    assert_eq!(rendered, ["half", "half*", "int"]);
}

#[test]
fn constructor_errors_leave_the_pool_untouched() {
    let mut pool = TypePool::new();
    let sampler = pool.primitive(PrimitiveKind::Sampler);
    assert!(pool.vector(sampler, 4).is_err());
    let float = pool.float();
    assert_eq!(
        pool.vector(float, 0),
        Err(TypeError::InvalidVectorLength { len: 0 })
    );
    assert_eq!(pool.user_defined(""), Err(TypeError::EmptyTypeName));
    assert_eq!(pool.len(), 2);
}

#[test]
fn deep_pointer_chains_intern_once() {
    let mut pool = TypePool::new();
    let mut ty = pool.char();
    for _ in 0..200 {
        ty = pool.pointer(ty);
    }
    let len = pool.len();

    let mut rebuilt = Rc::new(ParamType::primitive(PrimitiveKind::Char));
    for _ in 0..200 {
        rebuilt = Rc::new(PointerType::new(rebuilt).into());
    }
    let canonical = pool.intern_ref(&rebuilt);

    assert!(Rc::ptr_eq(&canonical, &ty));
    assert_eq!(pool.len(), len);
    assert_eq!(canonical.depth(), 200);
}

#[test]
fn very_deep_pointer_chains_intern_in_linear_time() {
    const LEVELS: usize = 100_000;

    let mut pool = TypePool::new();
    let mut ty = pool.int();
    for _ in 0..LEVELS {
        ty = pool.pointer(ty);
    }
    assert_eq!(pool.len(), LEVELS + 1);
    assert_eq!(ty.depth(), LEVELS);

    let mut foreign = Rc::new(ParamType::primitive(PrimitiveKind::Int));
    for _ in 0..LEVELS {
        foreign = Rc::new(PointerType::new(foreign).into());
    }
    assert!(pool
        .get(&foreign)
        .is_some_and(|found| Rc::ptr_eq(&found, &ty)));
    assert!(Rc::ptr_eq(&pool.intern_ref(&foreign), &ty));
    assert_eq!(pool.len(), LEVELS + 1);

    let one_more = pool.pointer(Rc::clone(&ty));
    assert_eq!(one_more.depth(), LEVELS + 1);
    assert!(!pool.contains(&PointerType::new(one_more).with_qualifier(Qualifier::Const).into()));
}

mod proptest_pool {
    use std::rc::Rc;

    use proptest::prelude::*;

    use crate::{
        AddressSpace, ParamType, PointerType, PrimitiveKind, Qualifiers, TypePool,
        UserDefinedType, VectorType,
    };

    fn any_kind() -> impl Strategy<Value = PrimitiveKind> {
        (0..PrimitiveKind::COUNT).prop_map(|raw| PrimitiveKind::ALL[usize::from(raw)])
    }

    fn scalar_kind() -> impl Strategy<Value = PrimitiveKind> {
        (0..=PrimitiveKind::Double.raw()).prop_map(|raw| PrimitiveKind::ALL[usize::from(raw)])
    }

    fn leaf() -> impl Strategy<Value = ParamType> {
        prop_oneof![
            any_kind().prop_map(ParamType::primitive),
            (scalar_kind(), 1u32..=16).prop_map(|(kind, len)| {
                let elem = Rc::new(ParamType::primitive(kind));
                match VectorType::new(elem, len) {
                    Ok(vec) => ParamType::from(vec),
                    Err(err) => panic!("{err}"),
                }
            }),
            "[a-z_][a-z0-9_]{0,7}".prop_map(|name| match UserDefinedType::new(name) {
                Ok(named) => ParamType::from(named),
                Err(err) => panic!("{err}"),
            }),
        ]
    }

    fn param_type() -> impl Strategy<Value = ParamType> {
        leaf().prop_recursive(4, 16, 1, |inner| {
            (inner, 0..4u8, 0..8u8).prop_map(|(pointee, space, quals)| {
                let space = AddressSpace::ALL[usize::from(space)];
                let ptr = PointerType::new(Rc::new(pointee))
                    .with_address_space(space)
                    .with_qualifiers(Qualifiers::from_bits_truncate(quals));
                ParamType::from(ptr)
            })
        })
    }

    /// Structurally equal copy that shares no nodes with `ty`.
    fn rebuild(ty: &ParamType) -> ParamType {
        match ty {
            ParamType::Pointer(ptr) => {
                let pointee = Rc::new(rebuild(ptr.pointee()));
                PointerType::new(pointee)
                    .with_address_space(ptr.address_space())
                    .with_qualifiers(ptr.qualifiers())
                    .into()
            }
            ParamType::Vector(vec) => {
                let elem = Rc::new(rebuild(vec.scalar_type()));
                match VectorType::new(elem, vec.length()) {
                    Ok(vec) => vec.into(),
                    Err(err) => panic!("{err}"),
                }
            }
            ParamType::Primitive(_) | ParamType::UserDefined(_) => ty.clone(),
        }
    }

    proptest! {
        #[test]
        fn equal_candidates_intern_to_one_handle(ty in param_type()) {
            let mut pool = TypePool::new();
            let a = pool.intern(ty.clone());
            let b = pool.intern(rebuild(&ty));
            prop_assert!(Rc::ptr_eq(&a, &b), "{} interned twice", ty);
            prop_assert_eq!(a.render(), ty.render());
        }

        #[test]
        fn identity_agrees_with_equality(a in param_type(), b in param_type()) {
            let mut pool = TypePool::new();
            let ia = pool.intern(a.clone());
            let ib = pool.intern(b.clone());
            prop_assert_eq!(Rc::ptr_eq(&ia, &ib), a.equals(&b));
        }

        #[test]
        fn equality_is_reflexive_and_symmetric(a in param_type(), b in param_type()) {
            prop_assert!(a.equals(&a));
            prop_assert!(a.equals(&rebuild(&a)));
            prop_assert_eq!(a.equals(&b), b.equals(&a));
            if a.equals(&b) {
                prop_assert_eq!(a.render(), b.render());
                prop_assert_eq!(a.kind(), b.kind());
            }
        }

        #[test]
        fn equality_is_transitive(a in param_type()) {
            let b = rebuild(&a);
            let c = rebuild(&b);
            prop_assert!(a.equals(&b) && b.equals(&c));
            prop_assert!(a.equals(&c));
        }

        #[test]
        fn rendering_is_deterministic(ty in param_type()) {
            prop_assert_eq!(ty.render(), ty.render());
            prop_assert_eq!(ty.render(), rebuild(&ty).render());
        }
    }
}
