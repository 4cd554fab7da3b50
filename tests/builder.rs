use wagen::*;

fn ref_field(null: Nullability, heap: HeapType) -> FieldType {
    FieldType(
        Mut::Const,
        StorageType::ValType(ValType::Ref(RefType { null, heap })),
    )
}

fn i32_field() -> FieldType {
    FieldType(Mut::Const, StorageType::ValType(ValType::Num(NumType::Int32)))
}

fn empty_struct() -> CompType {
    CompType::Struct(Vec::new())
}

fn idx(i: u32) -> HeapType {
    HeapType::Idx(TypeIdx(i))
}

#[test]
fn it_rejects_unfilled_slots() {
    let err = TypeBuilder::new(1).build().expect_err("slot 0 is unfilled");
    assert!(matches!(err, BuildError::UnfilledSlot(0)));
}

#[test]
fn it_rejects_references_past_the_rec_group_end() {
    // Two singleton groups; type 0 may not reference type 1.
    let mut builder = TypeBuilder::new(2);
    builder.set_comp(
        0,
        CompType::Struct(vec![ref_field(Nullability::Nullable, idx(1))]),
    );
    builder.set_comp(1, empty_struct());

    let err = builder.build().expect_err("forward reference crosses a group boundary");

    match err {
        BuildError::OutOfScopeReference { index, referenced } => {
            assert_eq!(index, 0);
            assert_eq!(referenced, 1);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn it_accepts_back_edges_within_a_rec_group() {
    // Same shape as above, but both types share one group, making the forward
    // reference (and even a self reference) legal.
    let mut builder = TypeBuilder::new(2);
    builder.set_comp(
        0,
        CompType::Struct(vec![ref_field(Nullability::Nullable, idx(1))]),
    );
    builder.set_comp(
        1,
        CompType::Struct(vec![ref_field(Nullability::Nullable, idx(1))]),
    );
    builder.create_rec_group(0, 2);

    builder.build().expect("mutual references within a group are valid");
}

#[test]
fn it_rejects_overlapping_rec_groups() {
    let mut builder = TypeBuilder::new(3);
    for i in 0..3 {
        builder.set_comp(i, empty_struct());
    }
    builder.create_rec_group(0, 2);
    builder.create_rec_group(1, 2);

    let err = builder.build().expect_err("groups overlap at type 1");
    assert!(matches!(err, BuildError::InvalidRecGroup { start: 1, len: 2 }));
}

#[test]
fn it_rejects_out_of_bounds_rec_groups() {
    let mut builder = TypeBuilder::new(1);
    builder.set_comp(0, empty_struct());
    builder.create_rec_group(0, 2);

    let err = builder.build().expect_err("group extends past the builder");
    assert!(matches!(err, BuildError::InvalidRecGroup { start: 0, len: 2 }));
}

#[test]
fn it_rejects_supertypes_that_do_not_precede_their_subtype() {
    let mut builder = TypeBuilder::new(2);
    builder.set_comp(0, empty_struct());
    builder.set_comp(1, empty_struct());
    builder.set_open(1, true);
    builder.sub_type_of(0, TypeIdx(1));
    builder.create_rec_group(0, 2);

    let err = builder.build().expect_err("supertype comes after the subtype");
    assert!(matches!(
        err,
        BuildError::ForwardSupertype { index: 0, supertype: 1 }
    ));
}

#[test]
fn it_rejects_subtypes_of_final_types() {
    let mut builder = TypeBuilder::new(2);
    builder.set_comp(0, empty_struct());
    // Type 0 is left final (not open).
    builder.set_comp(1, empty_struct());
    builder.sub_type_of(1, TypeIdx(0));

    let err = builder.build().expect_err("the supertype is final");
    assert!(matches!(
        err,
        BuildError::FinalSupertype { index: 1, supertype: 0 }
    ));
}

#[test]
fn it_rejects_subtypes_of_a_different_kind() {
    let mut builder = TypeBuilder::new(2);
    builder.set_comp(0, empty_struct());
    builder.set_open(0, true);
    builder.set_comp(1, CompType::Array(i32_field()));
    builder.sub_type_of(1, TypeIdx(0));

    let err = builder.build().expect_err("an array cannot extend a struct");
    assert!(matches!(
        err,
        BuildError::KindMismatch { index: 1, supertype: 0 }
    ));
}

#[test]
fn it_rejects_subtypes_with_a_different_shareability() {
    let mut builder = TypeBuilder::new(2);
    builder.set_comp(0, empty_struct());
    builder.set_open(0, true);
    builder.set_shared(0, Shareability::Shared);
    builder.set_comp(1, empty_struct());
    builder.sub_type_of(1, TypeIdx(0));

    let err = builder.build().expect_err("shareability must match the supertype");
    assert!(matches!(
        err,
        BuildError::ShareabilityMismatch { index: 1, supertype: 0 }
    ));
}

#[test]
fn it_rejects_structs_that_drop_parent_fields() {
    let mut builder = TypeBuilder::new(2);
    builder.set_comp(0, CompType::Struct(vec![i32_field()]));
    builder.set_open(0, true);
    builder.set_comp(1, empty_struct());
    builder.sub_type_of(1, TypeIdx(0));

    let err = builder.build().expect_err("subtype is missing the parent field");
    assert!(matches!(
        err,
        BuildError::InvalidSubtyping { index: 1, supertype: 0 }
    ));
}

#[test]
fn it_rejects_mutable_field_variance() {
    let eq_ref = RefType {
        null: Nullability::Nullable,
        heap: HeapType::Abs(AbsHeapType::Eq, Shareability::Unshared),
    };
    let none_ref = RefType {
        null: Nullability::Nullable,
        heap: HeapType::Abs(AbsHeapType::None, Shareability::Unshared),
    };

    let mut builder = TypeBuilder::new(2);
    builder.set_comp(
        0,
        CompType::Struct(vec![FieldType(
            Mut::Var,
            StorageType::ValType(ValType::Ref(eq_ref)),
        )]),
    );
    builder.set_open(0, true);
    // Narrowing a mutable field is invalid even though none <: eq.
    builder.set_comp(
        1,
        CompType::Struct(vec![FieldType(
            Mut::Var,
            StorageType::ValType(ValType::Ref(none_ref)),
        )]),
    );
    builder.sub_type_of(1, TypeIdx(0));

    let err = builder.build().expect_err("mutable fields are invariant");
    assert!(matches!(
        err,
        BuildError::InvalidSubtyping { index: 1, supertype: 0 }
    ));
}

#[test]
fn it_rejects_shared_types_referencing_unshared_heap_types() {
    let mut builder = TypeBuilder::new(1);
    builder.set_comp(
        0,
        CompType::Struct(vec![ref_field(
            Nullability::Nullable,
            HeapType::Abs(AbsHeapType::Any, Shareability::Unshared),
        )]),
    );
    builder.set_shared(0, Shareability::Shared);

    let err = builder.build().expect_err("shared types may only reference shared types");
    assert!(matches!(err, BuildError::UnsharedReference { index: 0 }));
}

#[test]
fn it_accepts_contravariant_params_and_covariant_results() {
    let any_ref = |null| RefType {
        null,
        heap: HeapType::Abs(AbsHeapType::Any, Shareability::Unshared),
    };
    let eq_ref = |null| RefType {
        null,
        heap: HeapType::Abs(AbsHeapType::Eq, Shareability::Unshared),
    };

    let mut builder = TypeBuilder::new(2);
    builder.set_comp(
        0,
        CompType::Func {
            parameters: vec![ValType::Ref(eq_ref(Nullability::Nullable))],
            results: vec![ValType::Ref(eq_ref(Nullability::Nullable))],
        },
    );
    builder.set_open(0, true);
    // Widen the parameter to (ref null any), narrow the result to (ref eq).
    builder.set_comp(
        1,
        CompType::Func {
            parameters: vec![ValType::Ref(any_ref(Nullability::Nullable))],
            results: vec![ValType::Ref(eq_ref(Nullability::NonNullable))],
        },
    );
    builder.sub_type_of(1, TypeIdx(0));

    builder.build().expect("function variance should be accepted");
}

#[test]
fn it_accepts_depth_and_width_struct_subtyping() {
    let mut builder = TypeBuilder::new(3);
    builder.set_comp(
        0,
        CompType::Struct(vec![ref_field(
            Nullability::Nullable,
            HeapType::Abs(AbsHeapType::Eq, Shareability::Unshared),
        )]),
    );
    builder.set_open(0, true);
    builder.set_comp(
        1,
        CompType::Struct(vec![
            ref_field(Nullability::NonNullable, idx(0)),
            i32_field(),
        ]),
    );
    builder.set_open(1, true);
    builder.sub_type_of(1, TypeIdx(0));
    builder.set_comp(
        2,
        CompType::Array(FieldType(
            Mut::Const,
            StorageType::ValType(ValType::Ref(RefType {
                null: Nullability::Nullable,
                heap: idx(1),
            })),
        )),
    );

    builder.build().expect("struct refinement should be accepted");
}

#[test]
fn it_indexes_transitive_subtypes_with_depths() {
    let mut builder = TypeBuilder::new(4);
    for i in 0..4 {
        builder.set_comp(i, empty_struct());
        builder.set_open(i, true);
    }
    // 0 <- 1 <- 3 and 0 <- 2.
    builder.sub_type_of(1, TypeIdx(0));
    builder.sub_type_of(2, TypeIdx(0));
    builder.sub_type_of(3, TypeIdx(1));
    let graph = builder.build().unwrap();

    let subtypes = SubTypes::new(&graph);
    assert_eq!(subtypes.direct_sub_types(TypeIdx(0)), &[TypeIdx(1), TypeIdx(2)]);

    let mut seen = Vec::new();
    subtypes.iter_sub_types(TypeIdx(0), |ty, depth| seen.push((ty, depth)));
    assert_eq!(
        seen,
        vec![
            (TypeIdx(0), 0),
            (TypeIdx(1), 1),
            (TypeIdx(2), 1),
            (TypeIdx(3), 2),
        ]
    );
}
