//! Type definitions for WebAssembly GC heap types.
//!
//! <https://webassembly.github.io/gc/core/syntax/types.html#types>
pub mod comptype;
pub use comptype::{CompType, FieldType, Mut, PackType, StorageType};

pub mod graph;
pub use graph::{DefType, TypeGraph, TypeIdx};

pub mod heaptype;
pub use heaptype::{AbsHeapType, HeapType, Shareability};

pub mod numtype;
pub use numtype::NumType;

pub mod reftype;
pub use reftype::{Nullability, RefType};

pub mod valtype;
pub use valtype::ValType;

pub mod vectype;
pub use vectype::VecType;
