/// Number types classify numeric values.
///
/// The types i32 and i64 classify 32 and 64 bit integers, respectively. Integers are not
/// inherently signed or unsigned, their interpretation is determined by individual operations.
///
/// The types f32 and f64 classify 32 and 64 bit floating-point data, respectively, as defined by
/// the IEEE 754 standard.
///
/// <https://webassembly.github.io/gc/core/syntax/types.html#number-types>
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub enum NumType {
    Int32,
    Int64,
    Float32,
    Float64,
}
