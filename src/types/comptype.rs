use super::reftype::RefType;
use super::valtype::ValType;

/// Composite types are all types composed from simpler types, including function types, structure
/// types and array types.
///
/// <https://webassembly.github.io/gc/core/syntax/types.html#composite-types>
#[derive(Debug, PartialEq, Clone)]
pub enum CompType {
    Struct(Vec<FieldType>),
    Array(FieldType),
    Func {
        parameters: Vec<ValType>,
        results: Vec<ValType>,
    },
}

#[derive(Debug, PartialEq, Copy, Clone)]
pub struct FieldType(pub Mut, pub StorageType);

#[derive(Debug, PartialEq, Copy, Clone)]
pub enum StorageType {
    ValType(ValType),
    PackType(PackType),
}

#[derive(Debug, PartialEq, Copy, Clone)]
pub enum PackType {
    I8,
    I16,
}

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Mut {
    Const,
    Var,
}

impl FieldType {
    /// The reference held by this field, if its storage is a reference. Packed fields never hold
    /// references.
    pub fn ref_type(&self) -> Option<RefType> {
        match self.1 {
            StorageType::ValType(v) => v.ref_type(),
            StorageType::PackType(_) => None,
        }
    }
}
