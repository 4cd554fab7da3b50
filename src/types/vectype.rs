/// Vector types classify vectors of numeric values processed by vector instructions (also
/// known as SIMD instructions, single instruction multiple data).
///
/// The type v128 corresponds to a 128 bit vector of packed integer or floating-point data.
///
/// <https://webassembly.github.io/gc/core/syntax/types.html#vector-types>
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub enum VecType {
    V128,
}
