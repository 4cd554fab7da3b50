//! Accumulates partially constructed type definitions and resolves them into a [`TypeGraph`].
//!
//! A builder is created with a fixed number of slots. Slots are filled in any order with
//! composite payloads and per-slot attributes; children may reference slots by index before
//! those slots are filled, which is what makes mutually recursive groups expressible. The
//! single terminal [`build`](TypeBuilder::build) call checks the whole graph: scoping against
//! recursion groups, declared-supertype validity under the GC subtyping rules, and shareability
//! propagation.
use crate::types::{CompType, DefType, HeapType, Shareability, TypeGraph, TypeIdx};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("type slot {0} was never assigned a composite type")]
    UnfilledSlot(usize),

    #[error("recursion group at {start} with length {len} is out of bounds or overlaps another")]
    InvalidRecGroup { start: usize, len: usize },

    #[error("type {index} references type {referenced} past the end of its recursion group")]
    OutOfScopeReference { index: usize, referenced: usize },

    #[error("type {index} declares supertype {supertype}, which does not precede it")]
    ForwardSupertype { index: usize, supertype: usize },

    #[error("type {index} declares final type {supertype} as its supertype")]
    FinalSupertype { index: usize, supertype: usize },

    #[error("type {index} has a different top-level kind than its supertype {supertype}")]
    KindMismatch { index: usize, supertype: usize },

    #[error("type {index} has a different shareability than its supertype {supertype}")]
    ShareabilityMismatch { index: usize, supertype: usize },

    #[error("type {index} does not match its declared supertype {supertype}")]
    InvalidSubtyping { index: usize, supertype: usize },

    #[error("shared type {index} references an unshared heap type")]
    UnsharedReference { index: usize },
}

#[derive(Debug, Clone)]
struct Slot {
    comp: Option<CompType>,
    supertype: Option<TypeIdx>,
    is_open: bool,
    share: Shareability,
}

impl Default for Slot {
    fn default() -> Self {
        Self {
            comp: None,
            supertype: None,
            is_open: false,
            share: Shareability::Unshared,
        }
    }
}

#[derive(Debug)]
pub struct TypeBuilder {
    slots: Vec<Slot>,
    groups: Vec<(usize, usize)>,
}

impl TypeBuilder {
    pub fn new(size: usize) -> Self {
        Self {
            slots: vec![Slot::default(); size],
            groups: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn set_comp(&mut self, index: usize, comp: CompType) {
        self.slots[index].comp = Some(comp);
    }

    pub fn set_open(&mut self, index: usize, open: bool) {
        self.slots[index].is_open = open;
    }

    pub fn set_shared(&mut self, index: usize, share: Shareability) {
        self.slots[index].share = share;
    }

    pub fn sub_type_of(&mut self, index: usize, supertype: TypeIdx) {
        self.slots[index].supertype = Some(supertype);
    }

    pub fn share_of(&self, index: usize) -> Shareability {
        self.slots[index].share
    }

    pub fn comp(&self, index: usize) -> Option<&CompType> {
        self.slots[index].comp.as_ref()
    }

    /// Declares the slots `[start, start + len)` to form one recursion group. Slots not covered
    /// by any declared group become singleton groups at build time.
    pub fn create_rec_group(&mut self, start: usize, len: usize) {
        self.groups.push((start, len));
    }

    /// Resolves and validates the accumulated definitions. Consumes the builder; this is the
    /// only way to obtain a [`TypeGraph`].
    pub fn build(self) -> Result<TypeGraph, BuildError> {
        let size = self.slots.len();

        // Resolve the recursion-group partition, filling gaps with singleton groups.
        let mut spans: Vec<Option<(usize, usize)>> = vec![None; size];
        for &(start, len) in &self.groups {
            if len == 0 || start + len > size {
                return Err(BuildError::InvalidRecGroup { start, len });
            }
            for span in &mut spans[start..start + len] {
                if span.is_some() {
                    return Err(BuildError::InvalidRecGroup { start, len });
                }
                *span = Some((start, start + len));
            }
        }

        let mut defs = Vec::with_capacity(size);
        for (index, slot) in self.slots.into_iter().enumerate() {
            let comp = slot.comp.ok_or(BuildError::UnfilledSlot(index))?;
            let (start, end) = spans[index].unwrap_or((index, index + 1));
            defs.push(DefType {
                comp,
                supertype: slot.supertype,
                is_open: slot.is_open,
                share: slot.share,
                rec_group_start: start as u32,
                rec_group_end: end as u32,
            });
        }

        let graph = TypeGraph { defs };
        validate(&graph)?;
        Ok(graph)
    }
}

fn validate(graph: &TypeGraph) -> Result<(), BuildError> {
    for (index, def) in graph.defs.iter().enumerate() {
        for child in def.ref_children().into_iter().flatten() {
            if let HeapType::Idx(idx) = child.heap {
                if idx.0 >= def.rec_group_end {
                    return Err(BuildError::OutOfScopeReference {
                        index,
                        referenced: idx.0 as usize,
                    });
                }
            }
            if def.share == Shareability::Shared
                && graph.share_of(child.heap) != Shareability::Shared
            {
                return Err(BuildError::UnsharedReference { index });
            }
        }

        let Some(super_idx) = def.supertype else {
            continue;
        };
        let supertype = super_idx.0 as usize;
        if supertype >= index {
            return Err(BuildError::ForwardSupertype { index, supertype });
        }
        let super_def = &graph[super_idx];
        if !super_def.is_open {
            return Err(BuildError::FinalSupertype { index, supertype });
        }
        if super_def.share != def.share {
            return Err(BuildError::ShareabilityMismatch { index, supertype });
        }
        if std::mem::discriminant(&super_def.comp) != std::mem::discriminant(&def.comp) {
            return Err(BuildError::KindMismatch { index, supertype });
        }
        if !graph.comp_matches(&def.comp, &super_def.comp) {
            return Err(BuildError::InvalidSubtyping { index, supertype });
        }
    }
    Ok(())
}
