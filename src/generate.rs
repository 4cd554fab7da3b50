//! Random generation of mutually recursive heap-type graphs.
//!
//! Generation runs in two phases over a fixed number of builder slots. The *plan* phase carves
//! the slots into recursion groups and fixes each slot's top-level kind, shareability and
//! optional supertype before any payload exists. The *populate* phase then fills each slot in
//! order, either from scratch or as a valid subtype of its already-populated supertype.
//! Because kinds are planned up front, a child reference may denote any slot up to the end of
//! the current recursion group even when that slot's payload has not been generated yet.
use crate::builder::TypeBuilder;
use crate::features::FeatureSet;
use crate::params::FuzzParams;
use crate::random::{FeatureOptions, Random};
use crate::types::{
    AbsHeapType, CompType, FieldType, HeapType, Mut, Nullability, NumType, PackType, RefType,
    Shareability, StorageType, TypeIdx, ValType, VecType,
};

/// The output of the plan and populate phases: a filled builder ready for its terminal
/// `build()` call, plus, for each slot, the slot itself and the slots that declared it as their
/// immediate supertype.
pub struct HeapTypeGenerator {
    pub builder: TypeBuilder,
    pub subtype_indices: Vec<Vec<TypeIdx>>,
}

impl HeapTypeGenerator {
    /// Plans and populates `n` interrelated type definitions drawn from `rand`.
    pub fn create(rand: &mut Random, features: FeatureSet, n: usize) -> HeapTypeGenerator {
        let mut generator = Generator {
            builder: TypeBuilder::new(n),
            subtype_indices: vec![Vec::new(); n],
            supertype_indices: vec![None; n],
            type_kinds: Vec::with_capacity(n),
            rec_group_ends: Vec::with_capacity(n),
            index: 0,
            rand,
            features,
            params: FuzzParams::default(),
        };
        generator.plan();
        generator.populate();
        HeapTypeGenerator {
            builder: generator.builder,
            subtype_indices: generator.subtype_indices,
        }
    }
}

/// Top-level kinds, chosen during planning before any payload exists. Keeping these apart from
/// the payloads is what lets child choosers select slots that are not populated yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeKind {
    Signature,
    Struct,
    Array,
}

struct Generator<'a> {
    builder: TypeBuilder,
    subtype_indices: Vec<Vec<TypeIdx>>,
    supertype_indices: Vec<Option<usize>>,
    type_kinds: Vec<TypeKind>,
    /// For each slot, one past the end of its recursion group; the bound on what its children
    /// may reference.
    rec_group_ends: Vec<usize>,
    /// The slot currently being populated.
    index: usize,
    rand: &'a mut Random,
    features: FeatureSet,
    params: FuzzParams,
}

impl Generator<'_> {
    fn plan(&mut self) {
        let n = self.builder.len();

        // Leading indices that get no supertype regardless of later dice, so every graph has at
        // least one root.
        let num_roots = 1 + self.rand.up_to(n);

        // Mean group length for the geometric distribution below.
        let expected_group_size = 1 + self.rand.up_to(n);

        let mut i = 0;
        while i < n {
            i += self.plan_group(i, num_roots, expected_group_size);
        }
        debug_assert_eq!(self.rec_group_ends.len(), n);
    }

    fn plan_group(&mut self, start: usize, num_roots: usize, expected_group_size: usize) -> usize {
        let max_size = self.builder.len() - start;
        let mut size = 1;
        while size < max_size {
            if self.rand.one_in(expected_group_size) {
                break;
            }
            size += 1;
        }
        self.builder.create_rec_group(start, size);

        let end = start + size;
        for i in start..end {
            self.rec_group_ends.push(end);
            self.plan_type(i, num_roots);
        }
        size
    }

    fn plan_type(&mut self, i: usize, num_roots: usize) {
        // Every type is a subtype of itself.
        self.subtype_indices[i].push(TypeIdx(i as u32));

        if i < num_roots || self.rand.one_in(2) {
            // A root type with no supertype. Choose its kind and shareability.
            let kind = self.generate_heap_type_kind();
            self.type_kinds.push(kind);
            let share = if !self.features.has_shared_everything() || self.rand.one_in(2) {
                Shareability::Unshared
            } else {
                Shareability::Shared
            };
            self.builder.set_shared(i, share);
        } else {
            // A subtype of one of the previously planned types, inheriting its kind and
            // shareability.
            let supertype = self.rand.up_to(i);
            self.builder.sub_type_of(i, TypeIdx(supertype as u32));
            let share = self.builder.share_of(supertype);
            self.builder.set_shared(i, share);
            self.supertype_indices[i] = Some(supertype);
            self.subtype_indices[supertype].push(TypeIdx(i as u32));
            let kind = self.type_kinds[supertype];
            self.type_kinds.push(kind);
        }
    }

    fn populate(&mut self) {
        for index in 0..self.builder.len() {
            self.index = index;

            // Types without nontrivial subtypes may still be left open.
            let open = self.subtype_indices[index].len() > 1 || self.rand.one_in(2);
            self.builder.set_open(index, open);

            let share = self.builder.share_of(index);
            let comp = match self.supertype_indices[index] {
                None => match self.type_kinds[index] {
                    TypeKind::Signature => self.generate_signature(share),
                    TypeKind::Struct => self.generate_struct(share),
                    TypeKind::Array => self.generate_array(share),
                },
                Some(super_index) => {
                    let super_comp = self
                        .builder
                        .comp(super_index)
                        .expect("supertypes are populated before their subtypes")
                        .clone();
                    match super_comp {
                        CompType::Func {
                            parameters,
                            results,
                        } => self.generate_sub_signature(&parameters, &results),
                        CompType::Struct(fields) => self.generate_sub_struct(&fields, share),
                        CompType::Array(element) => self.generate_sub_array(element),
                    }
                }
            };
            self.builder.set_comp(index, comp);
        }
    }

    fn generate_heap_type_kind(&mut self) -> TypeKind {
        match self.rand.up_to(3) {
            0 => TypeKind::Signature,
            1 => TypeKind::Struct,
            2 => TypeKind::Array,
            _ => unreachable!("unexpected kind index"),
        }
    }

    fn generate_basic_heap_type(&mut self, share: Shareability) -> HeapType {
        // Choose bottom types more rarely.
        if self.rand.one_in(16) {
            let ty = self.rand.pick(&[
                AbsHeapType::NoExtern,
                AbsHeapType::NoFunc,
                AbsHeapType::None,
            ]);
            return HeapType::Abs(ty, share);
        }

        let mut options = vec![
            AbsHeapType::Func,
            AbsHeapType::Extern,
            AbsHeapType::Any,
            AbsHeapType::Eq,
            AbsHeapType::I31,
            AbsHeapType::Struct,
            AbsHeapType::Array,
        ];
        // Shared exn references cannot be instantiated, so never offer them.
        if self.features.has_exception_handling() && share == Shareability::Unshared {
            options.push(AbsHeapType::Exn);
        }
        let ty = self.rand.pick(&options);

        let mut share = share;
        if share == Shareability::Unshared
            && self.features.has_shared_everything()
            && ty != AbsHeapType::Exn
            && self.rand.one_in(2)
        {
            share = Shareability::Shared;
        }
        HeapType::Abs(ty, share)
    }

    fn generate_basic_type(&mut self) -> ValType {
        let options = FeatureOptions::new()
            .add(
                FeatureSet::MVP,
                &[
                    ValType::Num(NumType::Int32),
                    ValType::Num(NumType::Int64),
                    ValType::Num(NumType::Float32),
                    ValType::Num(NumType::Float64),
                ],
            )
            .add(FeatureSet::SIMD, &[ValType::Vec(VecType::V128)]);
        self.rand.feature_pick(self.features, &options)
    }

    fn generate_heap_type(&mut self, share: Shareability) -> HeapType {
        if self.rand.one_in(4) {
            return self.generate_basic_heap_type(share);
        }
        let end = self.rec_group_ends[self.index];
        if share == Shareability::Shared {
            // A shared type may only reference other shared types.
            let eligible: Vec<HeapType> = (0..end)
                .filter(|&i| self.builder.share_of(i) == Shareability::Shared)
                .map(|i| HeapType::Idx(TypeIdx(i as u32)))
                .collect();
            if eligible.is_empty() {
                return self.generate_basic_heap_type(share);
            }
            return self.rand.pick(&eligible);
        }
        // Any heap type can be referenced in an unshared context.
        HeapType::Idx(TypeIdx(self.rand.up_to(end) as u32))
    }

    fn generate_ref_type(&mut self, share: Shareability) -> RefType {
        let heap = self.generate_heap_type(share);
        // Non-nullable exnrefs cannot be created in wasm nor imported from JS, so the
        // surrounding fuzzer could never instantiate one in a global position.
        let null = if heap.is_maybe_shared(AbsHeapType::Exn) {
            Nullability::Nullable
        } else if self.rand.one_in(2) {
            Nullability::Nullable
        } else {
            Nullability::NonNullable
        };
        RefType { null, heap }
    }

    fn generate_single_type(&mut self, share: Shareability) -> ValType {
        match self.rand.up_to(2) {
            0 => self.generate_basic_type(),
            1 => ValType::Ref(self.generate_ref_type(share)),
            _ => unreachable!("unexpected type index"),
        }
    }

    fn generate_result_types(&mut self, share: Shareability) -> Vec<ValType> {
        if self.rand.one_in(6) {
            Vec::new()
        } else if self.features.has_multivalue() && self.rand.one_in(5) {
            let len = 2 + self.rand.up_to(self.params.max_tuple_size - 1);
            (0..len).map(|_| self.generate_single_type(share)).collect()
        } else {
            vec![self.generate_single_type(share)]
        }
    }

    fn generate_signature(&mut self, share: Shareability) -> CompType {
        let len = self.rand.up_to_squared(self.params.max_params);
        let parameters = (0..len).map(|_| self.generate_single_type(share)).collect();
        let results = self.generate_result_types(share);
        CompType::Func {
            parameters,
            results,
        }
    }

    fn generate_field(&mut self, share: Shareability) -> FieldType {
        let mutability = if self.rand.one_in(2) {
            Mut::Var
        } else {
            Mut::Const
        };
        if self.rand.one_in(6) {
            let pack = if self.rand.one_in(2) {
                PackType::I8
            } else {
                PackType::I16
            };
            FieldType(mutability, StorageType::PackType(pack))
        } else {
            FieldType(
                mutability,
                StorageType::ValType(self.generate_single_type(share)),
            )
        }
    }

    fn generate_struct(&mut self, share: Shareability) -> CompType {
        let len = self.rand.up_to(self.params.max_struct_size + 1);
        CompType::Struct((0..len).map(|_| self.generate_field(share)).collect())
    }

    fn generate_array(&mut self, share: Shareability) -> CompType {
        CompType::Array(self.generate_field(share))
    }

    /// Planned slots of the given kind and shareability that a child of the current slot may
    /// reference.
    fn kind_candidates(&self, kind: TypeKind, share: Shareability) -> Vec<HeapType> {
        (0..self.rec_group_ends[self.index])
            .filter(|&i| self.type_kinds[i] == kind && self.builder.share_of(i) == share)
            .map(|i| HeapType::Idx(TypeIdx(i as u32)))
            .collect()
    }

    fn pick_kind(&mut self, kind: TypeKind, share: Shareability) -> Option<HeapType> {
        let candidates = self.kind_candidates(kind, share);
        if candidates.is_empty() {
            None
        } else {
            Some(self.rand.pick(&candidates))
        }
    }

    fn pick_sub_func(&mut self, share: Shareability) -> HeapType {
        let choice = self.rand.up_to(8);
        match choice {
            0 => HeapType::Abs(AbsHeapType::Func, share),
            1 => HeapType::Abs(AbsHeapType::NoFunc, share),
            _ => {
                if let Some(ty) = self.pick_kind(TypeKind::Signature, share) {
                    return ty;
                }
                let ty = if choice % 2 == 1 {
                    AbsHeapType::Func
                } else {
                    AbsHeapType::NoFunc
                };
                HeapType::Abs(ty, share)
            }
        }
    }

    fn pick_sub_struct(&mut self, share: Shareability) -> HeapType {
        let choice = self.rand.up_to(8);
        match choice {
            0 => HeapType::Abs(AbsHeapType::Struct, share),
            1 => HeapType::Abs(AbsHeapType::None, share),
            _ => {
                if let Some(ty) = self.pick_kind(TypeKind::Struct, share) {
                    return ty;
                }
                let ty = if choice % 2 == 1 {
                    AbsHeapType::Struct
                } else {
                    AbsHeapType::None
                };
                HeapType::Abs(ty, share)
            }
        }
    }

    fn pick_sub_array(&mut self, share: Shareability) -> HeapType {
        let choice = self.rand.up_to(8);
        match choice {
            0 => HeapType::Abs(AbsHeapType::Array, share),
            1 => HeapType::Abs(AbsHeapType::None, share),
            _ => {
                if let Some(ty) = self.pick_kind(TypeKind::Array, share) {
                    return ty;
                }
                let ty = if choice % 2 == 1 {
                    AbsHeapType::Array
                } else {
                    AbsHeapType::None
                };
                HeapType::Abs(ty, share)
            }
        }
    }

    fn pick_sub_eq(&mut self, share: Shareability) -> HeapType {
        let choice = self.rand.up_to(16);
        let ty = match choice {
            0 => AbsHeapType::Eq,
            1 => AbsHeapType::Array,
            2 => AbsHeapType::Struct,
            3 => AbsHeapType::None,
            _ => {
                let mut candidates = self.kind_candidates(TypeKind::Struct, share);
                candidates.extend(self.kind_candidates(TypeKind::Array, share));
                if !candidates.is_empty() {
                    return self.rand.pick(&candidates);
                }
                match choice >> 2 {
                    0 => AbsHeapType::Eq,
                    1 => AbsHeapType::Array,
                    2 => AbsHeapType::Struct,
                    3 => AbsHeapType::None,
                    _ => unreachable!("unexpected index"),
                }
            }
        };
        HeapType::Abs(ty, share)
    }

    fn pick_sub_any(&mut self, share: Shareability) -> HeapType {
        match self.rand.up_to(8) {
            0 => HeapType::Abs(AbsHeapType::Any, share),
            1 => HeapType::Abs(AbsHeapType::None, share),
            _ => self.pick_sub_eq(share),
        }
    }

    /// A heap type that is a subtype of `ty` and visible from the current slot.
    fn pick_sub_heap_type(&mut self, ty: HeapType) -> HeapType {
        match ty {
            HeapType::Idx(idx) => {
                let share = self.builder.share_of(idx.0 as usize);
                // This is a planned type, so we know where its subtypes are, but we can only
                // choose those defined before the end of the current recursion group.
                let end = self.rec_group_ends[self.index];
                let candidates: Vec<HeapType> = self.subtype_indices[idx.0 as usize]
                    .iter()
                    .filter(|sub| (sub.0 as usize) < end)
                    .map(|&sub| HeapType::Idx(sub))
                    .collect();
                // Very rarely choose the relevant bottom type instead. one_in(0) is always
                // true, so an empty candidate list also ends up here.
                if self.rand.one_in(candidates.len() * 8) {
                    let bottom = match self.type_kinds[idx.0 as usize] {
                        TypeKind::Signature => AbsHeapType::NoFunc,
                        TypeKind::Struct | TypeKind::Array => AbsHeapType::None,
                    };
                    return HeapType::Abs(bottom, share);
                }
                self.rand.pick(&candidates)
            }
            HeapType::Abs(basic, share) => {
                if self.rand.one_in(8) {
                    return HeapType::Abs(basic.bottom(), share);
                }
                match basic {
                    AbsHeapType::Func => self.pick_sub_func(share),
                    AbsHeapType::Cont => unimplemented!("continuation types"),
                    AbsHeapType::Any => self.pick_sub_any(share),
                    AbsHeapType::Eq => self.pick_sub_eq(share),
                    AbsHeapType::I31 => HeapType::Abs(AbsHeapType::I31, share),
                    AbsHeapType::Struct => self.pick_sub_struct(share),
                    AbsHeapType::Array => self.pick_sub_array(share),
                    AbsHeapType::Extern
                    | AbsHeapType::Exn
                    | AbsHeapType::String
                    | AbsHeapType::None
                    | AbsHeapType::NoExtern
                    | AbsHeapType::NoFunc
                    | AbsHeapType::NoCont
                    | AbsHeapType::NoExn => ty,
                }
            }
        }
    }

    /// A heap type that is a supertype of `ty`.
    fn pick_super_heap_type(&mut self, ty: HeapType) -> HeapType {
        match ty {
            HeapType::Idx(idx) => {
                let share = self.builder.share_of(idx.0 as usize);
                // The whole ancestor chain plus the kind's abstract tops are candidates.
                let mut candidates = Vec::new();
                let mut curr = Some(idx.0 as usize);
                while let Some(i) = curr {
                    candidates.push(HeapType::Idx(TypeIdx(i as u32)));
                    curr = self.supertype_indices[i];
                }
                let tops: &[AbsHeapType] = match self.type_kinds[idx.0 as usize] {
                    TypeKind::Signature => &[AbsHeapType::Func],
                    TypeKind::Struct => {
                        &[AbsHeapType::Struct, AbsHeapType::Eq, AbsHeapType::Any]
                    }
                    TypeKind::Array => &[AbsHeapType::Array, AbsHeapType::Eq, AbsHeapType::Any],
                };
                candidates.extend(tops.iter().map(|&t| HeapType::Abs(t, share)));
                self.rand.pick(&candidates)
            }
            HeapType::Abs(basic, share) => {
                let mut candidates = vec![ty];
                match basic {
                    AbsHeapType::Extern
                    | AbsHeapType::Func
                    | AbsHeapType::Exn
                    | AbsHeapType::Cont
                    | AbsHeapType::Any => {}
                    AbsHeapType::Eq => candidates.push(HeapType::Abs(AbsHeapType::Any, share)),
                    AbsHeapType::I31 | AbsHeapType::Struct | AbsHeapType::Array => {
                        candidates.push(HeapType::Abs(AbsHeapType::Eq, share));
                        candidates.push(HeapType::Abs(AbsHeapType::Any, share));
                    }
                    AbsHeapType::String => {
                        candidates.push(HeapType::Abs(AbsHeapType::Extern, share));
                    }
                    // A bottom has its entire hierarchy above it; any inhabited member of the
                    // hierarchy will do.
                    AbsHeapType::None => return self.pick_sub_any(share),
                    AbsHeapType::NoFunc => return self.pick_sub_func(share),
                    AbsHeapType::NoCont => unimplemented!("continuation types"),
                    AbsHeapType::NoExtern => {
                        candidates.push(HeapType::Abs(AbsHeapType::Extern, share));
                    }
                    AbsHeapType::NoExn => {
                        candidates.push(HeapType::Abs(AbsHeapType::Exn, share));
                    }
                }
                self.rand.pick(&candidates)
            }
        }
    }

    fn generate_sub_ref(&mut self, sup: RefType) -> RefType {
        // Exn references stay nullable and have no subtypes to vary, so there is nothing to do.
        if sup.heap.is_maybe_shared(AbsHeapType::Exn) {
            return sup;
        }
        let null = if sup.null == Nullability::NonNullable {
            Nullability::NonNullable
        } else if self.rand.one_in(2) {
            Nullability::Nullable
        } else {
            Nullability::NonNullable
        };
        RefType {
            null,
            heap: self.pick_sub_heap_type(sup.heap),
        }
    }

    fn generate_super_ref(&mut self, sub: RefType) -> RefType {
        let null = if sub.null == Nullability::Nullable {
            Nullability::Nullable
        } else if self.rand.one_in(2) {
            Nullability::Nullable
        } else {
            Nullability::NonNullable
        };
        RefType {
            null,
            heap: self.pick_super_heap_type(sub.heap),
        }
    }

    fn generate_subtype(&mut self, ty: ValType) -> ValType {
        match ty {
            ValType::Ref(r) => ValType::Ref(self.generate_sub_ref(r)),
            // Non-reference types have no nontrivial subtypes.
            ValType::Num(_) | ValType::Vec(_) => ty,
        }
    }

    fn generate_supertype(&mut self, ty: ValType) -> ValType {
        match ty {
            ValType::Ref(r) => ValType::Ref(self.generate_super_ref(r)),
            // Non-reference types have no nontrivial supertypes.
            ValType::Num(_) | ValType::Vec(_) => ty,
        }
    }

    fn generate_sub_signature(
        &mut self,
        sup_parameters: &[ValType],
        sup_results: &[ValType],
    ) -> CompType {
        // Parameters are contravariant, results covariant.
        let parameters = sup_parameters
            .iter()
            .map(|&t| self.generate_supertype(t))
            .collect();
        let results = sup_results.iter().map(|&t| self.generate_subtype(t)).collect();
        CompType::Func {
            parameters,
            results,
        }
    }

    fn generate_sub_field(&mut self, sup: FieldType) -> FieldType {
        if sup.0 == Mut::Var {
            // Only immutable fields support subtyping.
            return sup;
        }
        match sup.1 {
            // No other subtypes of i8 or i16.
            StorageType::PackType(_) => sup,
            StorageType::ValType(ty) => {
                FieldType(Mut::Const, StorageType::ValType(self.generate_subtype(ty)))
            }
        }
    }

    fn generate_sub_struct(&mut self, sup_fields: &[FieldType], share: Shareability) -> CompType {
        // Depth subtyping over the parent's fields.
        let mut fields: Vec<FieldType> = sup_fields
            .iter()
            .map(|&f| self.generate_sub_field(f))
            .collect();
        // Width subtyping: append fresh fields.
        let extra = self.rand.up_to(self.params.max_struct_size + 1 - fields.len());
        for _ in 0..extra {
            fields.push(self.generate_field(share));
        }
        CompType::Struct(fields)
    }

    fn generate_sub_array(&mut self, sup_element: FieldType) -> CompType {
        CompType::Array(self.generate_sub_field(sup_element))
    }
}
