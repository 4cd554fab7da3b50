//! The built, immutable form of a collection of defined heap types.
//!
//! A [`TypeGraph`] is produced by a successful `TypeBuilder::build()` call and is never mutated
//! afterwards. Defined types refer to each other by [`TypeIdx`] into the same graph; recursion
//! groups are recorded as index ranges so that the original grouping is recoverable.
use super::comptype::{CompType, FieldType, Mut, StorageType};
use super::heaptype::{AbsHeapType, HeapType, Shareability};
use super::reftype::{Nullability, RefType};
use super::valtype::ValType;

/// Index of a defined type within its [`TypeGraph`] and within the builder that produced it.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, PartialOrd, Ord)]
pub struct TypeIdx(pub u32);

/// A finalised defined heap type: the composite payload plus the subtyping, shareability and
/// grouping attributes declared for it.
#[derive(Debug, PartialEq, Clone)]
pub struct DefType {
    pub comp: CompType,
    pub supertype: Option<TypeIdx>,
    pub is_open: bool,
    pub share: Shareability,
    /// First index of this type's recursion group.
    pub rec_group_start: u32,
    /// One past the last index of this type's recursion group. Children of this type may only
    /// denote defined types below this index.
    pub rec_group_end: u32,
}

impl DefType {
    pub fn is_signature(&self) -> bool {
        matches!(self.comp, CompType::Func { .. })
    }

    /// The ordered reference children of this type: struct fields in order, the array element at
    /// position 0, or function parameters followed by results. Positions that do not hold a
    /// reference yield `None`.
    pub fn ref_children(&self) -> Vec<Option<RefType>> {
        match &self.comp {
            CompType::Struct(fields) => fields.iter().map(FieldType::ref_type).collect(),
            CompType::Array(element) => vec![element.ref_type()],
            CompType::Func {
                parameters,
                results,
            } => parameters
                .iter()
                .chain(results.iter())
                .map(ValType::ref_type)
                .collect(),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Default)]
pub struct TypeGraph {
    pub defs: Vec<DefType>,
}

impl TypeGraph {
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// The recursion-group partition as `(start, end)` index ranges, in order.
    pub fn rec_groups(&self) -> Vec<(usize, usize)> {
        let mut groups = Vec::new();
        let mut start = 0;
        while start < self.defs.len() {
            let end = self.defs[start].rec_group_end as usize;
            groups.push((start, end));
            start = end;
        }
        groups
    }

    pub fn share_of(&self, ty: HeapType) -> Shareability {
        match ty {
            HeapType::Abs(_, share) => share,
            HeapType::Idx(idx) => self[idx].share,
        }
    }

    /// Whether `sub` matches `sup` under heap-type subtyping: equal types, the abstract
    /// hierarchies, bottoms below every member of their hierarchy, defined types below their
    /// kind's abstract tops, and declared supertype chains. Shareabilities must agree.
    pub fn is_sub_heap_type(&self, sub: HeapType, sup: HeapType) -> bool {
        if self.share_of(sub) != self.share_of(sup) {
            return false;
        }
        match (sub, sup) {
            (HeapType::Abs(a, _), HeapType::Abs(b, _)) => a == b || abs_subtype(a, b),
            (HeapType::Abs(a, _), HeapType::Idx(idx)) => {
                // Only the bottom of the hierarchy sits below a defined type.
                if self[idx].is_signature() {
                    a == AbsHeapType::NoFunc
                } else {
                    a == AbsHeapType::None
                }
            }
            (HeapType::Idx(idx), HeapType::Abs(b, _)) => match self[idx].comp {
                CompType::Func { .. } => b == AbsHeapType::Func,
                CompType::Struct(_) => {
                    matches!(b, AbsHeapType::Struct | AbsHeapType::Eq | AbsHeapType::Any)
                }
                CompType::Array(_) => {
                    matches!(b, AbsHeapType::Array | AbsHeapType::Eq | AbsHeapType::Any)
                }
            },
            (HeapType::Idx(a), HeapType::Idx(b)) => {
                let mut curr = Some(a);
                while let Some(idx) = curr {
                    if idx == b {
                        return true;
                    }
                    curr = self[idx].supertype;
                }
                false
            }
        }
    }

    pub fn is_sub_ref_type(&self, sub: RefType, sup: RefType) -> bool {
        let null_ok = sup.null == Nullability::Nullable || sub.null == Nullability::NonNullable;
        null_ok && self.is_sub_heap_type(sub.heap, sup.heap)
    }

    pub fn is_sub_val_type(&self, sub: ValType, sup: ValType) -> bool {
        match (sub, sup) {
            (ValType::Ref(a), ValType::Ref(b)) => self.is_sub_ref_type(a, b),
            _ => sub == sup,
        }
    }

    /// Field subtyping: mutable fields are invariant, immutable fields are covariant, packed
    /// widths must match exactly.
    pub fn field_matches(&self, sub: FieldType, sup: FieldType) -> bool {
        if sup.0 == Mut::Var {
            return sub == sup;
        }
        if sub.0 != Mut::Const {
            return false;
        }
        match (sub.1, sup.1) {
            (StorageType::PackType(a), StorageType::PackType(b)) => a == b,
            (StorageType::ValType(a), StorageType::ValType(b)) => self.is_sub_val_type(a, b),
            _ => false,
        }
    }

    /// Composite subtyping: function parameters are contravariant and results covariant; struct
    /// subtypes refine a prefix of the parent's fields and may append more; array elements
    /// follow field subtyping.
    pub fn comp_matches(&self, sub: &CompType, sup: &CompType) -> bool {
        match (sub, sup) {
            (
                CompType::Func {
                    parameters: sub_params,
                    results: sub_results,
                },
                CompType::Func {
                    parameters: sup_params,
                    results: sup_results,
                },
            ) => {
                sub_params.len() == sup_params.len()
                    && sub_results.len() == sup_results.len()
                    && sub_params
                        .iter()
                        .zip(sup_params)
                        .all(|(s, p)| self.is_sub_val_type(*p, *s))
                    && sub_results
                        .iter()
                        .zip(sup_results)
                        .all(|(s, p)| self.is_sub_val_type(*s, *p))
            }
            (CompType::Struct(sub_fields), CompType::Struct(sup_fields)) => {
                sub_fields.len() >= sup_fields.len()
                    && sub_fields
                        .iter()
                        .zip(sup_fields)
                        .all(|(s, p)| self.field_matches(*s, *p))
            }
            (CompType::Array(sub_element), CompType::Array(sup_element)) => {
                self.field_matches(*sub_element, *sup_element)
            }
            _ => false,
        }
    }
}

impl std::ops::Index<TypeIdx> for TypeGraph {
    type Output = DefType;

    fn index(&self, idx: TypeIdx) -> &DefType {
        &self.defs[idx.0 as usize]
    }
}

// The strict part of the abstract partial order; reflexivity is handled by the caller.
fn abs_subtype(sub: AbsHeapType, sup: AbsHeapType) -> bool {
    use AbsHeapType as A;
    match sub {
        A::None => matches!(sup, A::Any | A::Eq | A::I31 | A::Struct | A::Array),
        A::NoFunc => sup == A::Func,
        A::NoExtern => matches!(sup, A::Extern | A::String),
        A::NoExn => sup == A::Exn,
        A::NoCont => sup == A::Cont,
        A::I31 | A::Struct | A::Array => matches!(sup, A::Eq | A::Any),
        A::Eq => sup == A::Any,
        A::String => sup == A::Extern,
        A::Exn | A::Any | A::Extern | A::Func | A::Cont => false,
    }
}
