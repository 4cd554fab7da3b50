use super::heaptype::HeapType;

/// Reference types classify first-class references to objects in the runtime store. A reference
/// is typed by the heap type it points into and by whether the null reference is included.
///
/// `(ref null H)` is a supertype of `(ref H)`: forbidding null shrinks the set of values.
///
/// Reference types are opaque, meaning that neither their size nor their bit pattern can be
/// observed.
///
/// <https://webassembly.github.io/gc/core/syntax/types.html#reference-types>
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct RefType {
    pub null: Nullability,
    pub heap: HeapType,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Nullability {
    Nullable,
    NonNullable,
}
