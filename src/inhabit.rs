//! Repair of uninhabitable type collections.
//!
//! Two root causes make a type impossible to construct: a non-null reference to a bottom heap
//! type has no inhabitants at all, and a cycle of non-null references through struct or array
//! fields cannot be bootstrapped one value at a time. Types that merely reference an
//! uninhabitable type through a non-null reference become constructible once the root causes
//! are fixed, so it suffices to make non-null references to bottom (and extern) heap types
//! nullable and to break every cycle of non-null references by making one reference in it
//! nullable. To keep subtyping valid, a field made nullable must also be made nullable in
//! related types according to its variance: in all supertypes for a covariant (immutable)
//! field, in every subtype of the topmost ancestor carrying the field for an invariant
//! (mutable) one.
use crate::builder::TypeBuilder;
use crate::generate::HeapTypeGenerator;
use crate::subtypes::SubTypes;
use crate::types::{
    AbsHeapType, CompType, HeapType, Mut, Nullability, RefType, StorageType, TypeGraph, TypeIdx,
    ValType,
};
use std::collections::HashSet;

impl HeapTypeGenerator {
    /// Rewrites the given heap types so that every one of them is constructible. The returned
    /// graph has the same size, kinds, field layouts, recursion groups, supertypes, openness
    /// and shareability as the input graph; only the nullability of references may change, from
    /// non-nullable to nullable. The returned vector mirrors `types` position for position,
    /// with basic heap types passed through untouched.
    pub fn make_inhabitable(graph: &TypeGraph, types: &[HeapType]) -> (TypeGraph, Vec<HeapType>) {
        if types.is_empty() {
            return (graph.clone(), Vec::new());
        }

        // Skip basic heap types and duplicate indices. Output positions are unaffected because
        // the rebuilt graph keeps every index where it was.
        let mut seen = HashSet::new();
        let mut deduplicated = Vec::new();
        for &ty in types {
            if let HeapType::Idx(idx) = ty {
                if seen.insert(idx) {
                    deduplicated.push(idx);
                }
            }
        }

        let mut inhabitator = Inhabitator {
            graph,
            types: deduplicated,
            nullables: HashSet::new(),
            subtypes: SubTypes::new(graph),
        };
        inhabitator.mark_bottom_refs_nullable();
        inhabitator.mark_extern_refs_nullable();
        inhabitator.break_non_nullable_cycles();
        let rebuilt = inhabitator.build();

        (rebuilt, types.to_vec())
    }

    /// Filters `types` down to those that are constructible as they are: no non-null reference
    /// to a bottom or extern heap type, and no participation in a cycle of non-null references
    /// through struct or array fields. Shares its uninhabitability predicate with
    /// [`make_inhabitable`](Self::make_inhabitable).
    pub fn get_inhabitable(graph: &TypeGraph, types: &[HeapType]) -> Vec<HeapType> {
        let mut visited = HashSet::new();
        let mut visiting = HashSet::new();
        types
            .iter()
            .copied()
            .filter(|&ty| !is_uninhabitable_heap_type(graph, ty, &mut visited, &mut visiting))
            .collect()
    }
}

/// A field position: a defined type and the index of one of its reference children.
type FieldPos = (TypeIdx, usize);

/// How the type of a field position may change in subtypes of its enclosing type. An invariant
/// field must keep exactly its type; a covariant field may narrow it.
enum Variance {
    Invariant,
    Covariant,
}

struct Inhabitator<'a> {
    graph: &'a TypeGraph,
    /// Deduplicated defined input types, in first-appearance order.
    types: Vec<TypeIdx>,
    /// Field positions scheduled to be made nullable.
    nullables: HashSet<FieldPos>,
    subtypes: SubTypes,
}

impl Inhabitator<'_> {
    fn variance(&self, pos: FieldPos) -> Variance {
        let (ty, idx) = pos;
        let mutability = match &self.graph[ty].comp {
            CompType::Struct(fields) => fields[idx].0,
            CompType::Array(element) => element.0,
            CompType::Func { .. } => unreachable!("signatures have no field variance"),
        };
        match mutability {
            Mut::Var => Variance::Invariant,
            Mut::Const => Variance::Covariant,
        }
    }

    /// Schedules the reference at `pos` to become nullable, along with the same position in
    /// whatever other types must change to keep subtyping valid.
    fn mark_nullable(&mut self, pos: FieldPos) {
        self.nullables.insert(pos);
        let (ty, idx) = pos;
        match self.variance(pos) {
            Variance::Covariant => {
                // Mark the field nullable in all supertypes. A supertype where the field is
                // already nullable or does not exist is simply unaffected by the mark.
                let mut curr = ty;
                while let Some(sup) = self.graph[curr].supertype {
                    self.nullables.insert((sup, idx));
                    curr = sup;
                }
            }
            Variance::Invariant => {
                // Find the topmost ancestor that still has this field, then mark the field
                // nullable in all of that ancestor's subtypes. Arrays share their single
                // element with every ancestor; structs may have more fields than their parent.
                let mut top = ty;
                match &self.graph[top].comp {
                    CompType::Array(_) => {
                        while let Some(sup) = self.graph[top].supertype {
                            top = sup;
                        }
                    }
                    CompType::Struct(_) => {
                        while let Some(sup) = self.graph[top].supertype {
                            let CompType::Struct(fields) = &self.graph[sup].comp else {
                                break;
                            };
                            if fields.len() <= idx {
                                break;
                            }
                            top = sup;
                        }
                    }
                    CompType::Func { .. } => unreachable!("signatures have no field variance"),
                }
                let nullables = &mut self.nullables;
                self.subtypes.iter_sub_types(top, |sub, _depth| {
                    nullables.insert((sub, idx));
                });
            }
        }
    }

    fn mark_bottom_refs_nullable(&mut self) {
        for i in 0..self.types.len() {
            let ty = self.types[i];
            // Functions can always be instantiated, even if their types refer to uninhabitable
            // types.
            if self.graph[ty].is_signature() {
                continue;
            }
            for (idx, child) in self.graph[ty].ref_children().into_iter().enumerate() {
                let Some(child) = child else { continue };
                if child.null == Nullability::NonNullable && child.heap.is_bottom() {
                    self.mark_nullable((ty, idx));
                }
            }
        }
    }

    fn mark_extern_refs_nullable(&mut self) {
        // The surrounding fuzzer cannot instantiate non-nullable externrefs, so relax them all.
        // TODO: drop this pass once the fuzzer imports externref globals or gets some other way
        // to produce extern values.
        for i in 0..self.types.len() {
            let ty = self.types[i];
            if self.graph[ty].is_signature() {
                continue;
            }
            for (idx, child) in self.graph[ty].ref_children().into_iter().enumerate() {
                let Some(child) = child else { continue };
                if child.null == Nullability::NonNullable
                    && child.heap.is_maybe_shared(AbsHeapType::Extern)
                {
                    self.mark_nullable((ty, idx));
                }
            }
        }
    }

    /// Depth-first search for cycles of non-null references, marking the last reference found
    /// in each cycle to be made nullable.
    fn break_non_nullable_cycles(&mut self) {
        struct Frame {
            ty: TypeIdx,
            children: Vec<Option<RefType>>,
            next: usize,
        }

        // Types we have finished visiting; nothing reachable from them loops back into an
        // ongoing search.
        let mut visited: HashSet<TypeIdx> = HashSet::new();

        for r in 0..self.types.len() {
            let root = self.types[r];
            if visited.contains(&root) {
                continue;
            }

            // The path of types currently being visited. A non-null reference back into this
            // path is a cycle.
            let mut visiting: Vec<Frame> = Vec::new();
            let mut on_path: HashSet<TypeIdx> = HashSet::new();
            visiting.push(Frame {
                ty: root,
                children: self.graph[root].ref_children(),
                next: 0,
            });
            on_path.insert(root);

            while let Some(frame) = visiting.last_mut() {
                let mut descend = None;
                while frame.next < frame.children.len() {
                    let pos = frame.next;
                    frame.next += 1;
                    // Non-reference children cannot refer to other types.
                    let Some(child) = frame.children[pos] else {
                        continue;
                    };
                    // Nullable references do not cause uninhabitable cycles.
                    if child.null == Nullability::Nullable {
                        continue;
                    }
                    // Skip references we have already marked nullable to satisfy subtyping
                    // constraints.
                    // TODO: such references could be taken into account when detecting cycles
                    // by tracking where along the current search path they were made nullable.
                    if self.nullables.contains(&(frame.ty, pos)) {
                        continue;
                    }
                    // Abstract heap types have no fields to recurse into.
                    let HeapType::Idx(next_ty) = child.heap else {
                        continue;
                    };
                    if visited.contains(&next_ty) {
                        continue;
                    }
                    // Function references break cycles: a function can be created even with
                    // uninhabitable params or results.
                    if self.graph[next_ty].is_signature() {
                        continue;
                    }
                    if on_path.contains(&next_ty) {
                        let ty = frame.ty;
                        self.mark_nullable((ty, pos));
                        continue;
                    }
                    descend = Some(next_ty);
                    break;
                }

                match descend {
                    Some(next_ty) => {
                        on_path.insert(next_ty);
                        visiting.push(Frame {
                            ty: next_ty,
                            children: self.graph[next_ty].ref_children(),
                            next: 0,
                        });
                    }
                    None => {
                        // Finished this type; resume the search in its parent frame.
                        let done = visiting.pop().expect("a frame is on the stack");
                        on_path.remove(&done.ty);
                        visited.insert(done.ty);
                    }
                }
            }
        }
    }

    /// Copies the graph into a fresh builder, forcing references at marked positions to be
    /// nullable, and rebuilds it with the original grouping, supertypes, openness and
    /// shareability.
    fn build(&self) -> TypeGraph {
        let mut builder = TypeBuilder::new(self.graph.len());
        for (i, def) in self.graph.defs.iter().enumerate() {
            let ty = TypeIdx(i as u32);
            let mut comp = def.comp.clone();
            match &mut comp {
                CompType::Struct(fields) => {
                    for (pos, field) in fields.iter_mut().enumerate() {
                        if self.nullables.contains(&(ty, pos)) {
                            if let StorageType::ValType(ValType::Ref(r)) = &mut field.1 {
                                r.null = Nullability::Nullable;
                            }
                        }
                    }
                }
                CompType::Array(element) => {
                    if self.nullables.contains(&(ty, 0)) {
                        if let StorageType::ValType(ValType::Ref(r)) = &mut element.1 {
                            r.null = Nullability::Nullable;
                        }
                    }
                }
                // Signatures never accumulate nullable positions.
                CompType::Func { .. } => {}
            }
            builder.set_comp(i, comp);
        }

        for (start, end) in self.graph.rec_groups() {
            builder.create_rec_group(start, end - start);
        }

        for (i, def) in self.graph.defs.iter().enumerate() {
            if let Some(sup) = def.supertype {
                builder.sub_type_of(i, sup);
            }
            builder.set_open(i, def.is_open);
            builder.set_shared(i, def.share);
        }

        builder
            .build()
            .expect("repaired type graph should be valid")
    }
}

fn is_uninhabitable_heap_type(
    graph: &TypeGraph,
    ty: HeapType,
    visited: &mut HashSet<TypeIdx>,
    visiting: &mut HashSet<TypeIdx>,
) -> bool {
    match ty {
        // A basic heap type on its own is always inhabitable (or irrelevant to the caller).
        HeapType::Abs(..) => false,
        HeapType::Idx(idx) => is_uninhabitable_def(graph, idx, visited, visiting),
    }
}

// Simple recursive DFS through non-nullable references looking for bottoms, externs and cycles.
fn is_uninhabitable_def(
    graph: &TypeGraph,
    idx: TypeIdx,
    visited: &mut HashSet<TypeIdx>,
    visiting: &mut HashSet<TypeIdx>,
) -> bool {
    // Function types are always inhabitable.
    if graph[idx].is_signature() {
        return false;
    }
    if visited.contains(&idx) {
        return false;
    }
    if !visiting.insert(idx) {
        return true;
    }
    for child in graph[idx].ref_children().into_iter().flatten() {
        if is_uninhabitable_ref(graph, child, visited, visiting) {
            return true;
        }
    }
    visiting.remove(&idx);
    visited.insert(idx);
    false
}

fn is_uninhabitable_ref(
    graph: &TypeGraph,
    child: RefType,
    visited: &mut HashSet<TypeIdx>,
    visiting: &mut HashSet<TypeIdx>,
) -> bool {
    if child.null != Nullability::NonNullable {
        return false;
    }
    if child.heap.is_bottom() || child.heap.is_maybe_shared(AbsHeapType::Extern) {
        return true;
    }
    match child.heap {
        HeapType::Idx(idx) => is_uninhabitable_def(graph, idx, visited, visiting),
        HeapType::Abs(..) => false,
    }
}
