//! Heap types classify objects in the runtime store. There are three disjoint hierarchies of heap
//! types:
//!
//! - function types classify functions,
//! - aggregate types classify dynamically allocated managed data,
//!   such as structures, arrays, or unboxed scalars,
//! - external types classify external references possibly owned by the embedder.
//!
//! A heap type is either abstract or concrete. A concrete heap type is an index denoting a
//! structure, array or function type defined in the graph being built. Abstract types are denoted
//! by individual keywords.
//!
//! Every hierarchy has a top (𝖺𝗇𝗒, 𝖿𝗎𝗇𝖼, 𝖾𝗑𝗍𝖾𝗋𝗇, 𝖾𝗑𝗇) and a bottom (𝗇𝗈𝗇𝖾, 𝗇𝗈𝖿𝗎𝗇𝖼, 𝗇𝗈𝖾𝗑𝗍𝖾𝗋𝗇,
//! 𝗇𝗈𝖾𝗑𝗇). The bottoms have no values, so a non-null reference to one of them is uninhabitable.
//!
//! Under the shared-everything proposal every heap type additionally carries a shareability,
//! distinguishing thread-shared from thread-local instantiations.
//!
//! <https://webassembly.github.io/gc/core/syntax/types.html#heap-types>
use super::graph::TypeIdx;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeapType {
    Abs(AbsHeapType, Shareability),
    Idx(TypeIdx),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AbsHeapType {
    Exn,
    Array,
    Struct,
    I31,
    Eq,
    Any,
    Extern,
    Func,
    Cont,
    String,
    None,
    NoExtern,
    NoFunc,
    NoExn,
    NoCont,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shareability {
    Shared,
    Unshared,
}

impl AbsHeapType {
    /// The least element of this type's hierarchy.
    pub fn bottom(self) -> AbsHeapType {
        match self {
            Self::Func | Self::NoFunc => Self::NoFunc,
            Self::Cont | Self::NoCont => Self::NoCont,
            Self::Extern | Self::String | Self::NoExtern => Self::NoExtern,
            Self::Exn | Self::NoExn => Self::NoExn,
            Self::Any | Self::Eq | Self::I31 | Self::Struct | Self::Array | Self::None => {
                Self::None
            }
        }
    }

    pub fn is_bottom(self) -> bool {
        matches!(
            self,
            Self::None | Self::NoFunc | Self::NoExtern | Self::NoExn | Self::NoCont
        )
    }
}

impl HeapType {
    pub fn is_bottom(self) -> bool {
        matches!(self, Self::Abs(t, _) if t.is_bottom())
    }

    /// Whether this is the given abstract type at any shareability.
    pub fn is_maybe_shared(self, ty: AbsHeapType) -> bool {
        matches!(self, Self::Abs(t, _) if t == ty)
    }
}
