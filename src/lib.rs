//! A random generator of WebAssembly GC heap-type graphs.
//!
//! From a seed, [`HeapTypeGenerator::create`] plans and populates a collection of mutually
//! recursive function, struct and array types with valid subtyping, shareability, finality and
//! recursion-group structure, ready to be resolved by [`TypeBuilder::build`]. The companion
//! repair pass, [`HeapTypeGenerator::make_inhabitable`], rewrites an arbitrary collection of
//! such types into one where every type can actually be constructed, by relaxing non-null
//! references to bottom or extern heap types and breaking cycles of non-null references, while
//! preserving valid subtyping. [`HeapTypeGenerator::get_inhabitable`] filters by the same
//! predicate without rewriting.
//!
//! Generation is deterministic: the same seed, feature set and count produce the same graph.
//!
//! <https://webassembly.github.io/gc/core/syntax/types.html#types>
#![forbid(unsafe_code)]

pub mod builder;
pub use builder::{BuildError, TypeBuilder};

pub mod features;
pub use features::FeatureSet;

pub mod generate;
pub use generate::HeapTypeGenerator;

mod inhabit;

pub mod params;
pub use params::FuzzParams;

pub mod random;
pub use random::{FeatureOptions, Random};

pub mod subtypes;
pub use subtypes::SubTypes;

mod text;

pub mod types;
pub use types::{
    AbsHeapType, CompType, DefType, FieldType, HeapType, Mut, Nullability, NumType, PackType,
    RefType, Shareability, StorageType, TypeGraph, TypeIdx, ValType, VecType,
};
