use super::numtype::NumType;
use super::reftype::RefType;
use super::vectype::VecType;

/// Value types classify the individual values that WebAssembly code can compute with and
/// the values that a variable accepts. They are either number types, vector types, or
/// reference types.
///
/// <https://webassembly.github.io/gc/core/syntax/types.html#value-types>
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub enum ValType {
    Num(NumType),
    Vec(VecType),
    Ref(RefType),
}

impl ValType {
    pub fn ref_type(&self) -> Option<RefType> {
        match self {
            Self::Ref(r) => Some(*r),
            Self::Num(_) | Self::Vec(_) => None,
        }
    }
}
