//! Wat-like text rendering of built type graphs.
//!
//! The output is meant for eyeballing and debugging generated graphs, not for feeding to other
//! tools; no parser for it exists here.
use crate::types::{
    AbsHeapType, CompType, DefType, FieldType, HeapType, Mut, Nullability, NumType, PackType,
    RefType, Shareability, StorageType, TypeGraph, ValType, VecType,
};
use std::fmt;

impl fmt::Display for TypeGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (start, end) in self.rec_groups() {
            if end - start > 1 {
                writeln!(f, "(rec")?;
                for index in start..end {
                    write_def(f, &self.defs[index], index, "  ")?;
                }
                writeln!(f, ")")?;
            } else {
                write_def(f, &self.defs[start], start, "")?;
            }
        }
        Ok(())
    }
}

fn write_def(f: &mut fmt::Formatter<'_>, def: &DefType, index: usize, indent: &str) -> fmt::Result {
    write!(f, "{indent}(type $t{index} ")?;
    if def.supertype.is_some() || def.is_open {
        write!(f, "(sub ")?;
        if !def.is_open {
            write!(f, "final ")?;
        }
        if let Some(supertype) = def.supertype {
            write!(f, "$t{} ", supertype.0)?;
        }
        write_comp(f, def)?;
        write!(f, ")")?;
    } else {
        write_comp(f, def)?;
    }
    writeln!(f, ")")
}

fn write_comp(f: &mut fmt::Formatter<'_>, def: &DefType) -> fmt::Result {
    if def.share == Shareability::Shared {
        write!(f, "(shared ")?;
    }
    match &def.comp {
        CompType::Struct(fields) => {
            write!(f, "(struct")?;
            for field in fields {
                write!(f, " (field ")?;
                write_field(f, field)?;
                write!(f, ")")?;
            }
            write!(f, ")")?;
        }
        CompType::Array(element) => {
            write!(f, "(array ")?;
            write_field(f, element)?;
            write!(f, ")")?;
        }
        CompType::Func {
            parameters,
            results,
        } => {
            write!(f, "(func")?;
            for parameter in parameters {
                write!(f, " (param {parameter})")?;
            }
            for result in results {
                write!(f, " (result {result})")?;
            }
            write!(f, ")")?;
        }
    }
    if def.share == Shareability::Shared {
        write!(f, ")")?;
    }
    Ok(())
}

fn write_field(f: &mut fmt::Formatter<'_>, field: &FieldType) -> fmt::Result {
    if field.0 == Mut::Var {
        write!(f, "(mut ")?;
        write_storage(f, field.1)?;
        write!(f, ")")
    } else {
        write_storage(f, field.1)
    }
}

fn write_storage(f: &mut fmt::Formatter<'_>, storage: StorageType) -> fmt::Result {
    match storage {
        StorageType::PackType(PackType::I8) => write!(f, "i8"),
        StorageType::PackType(PackType::I16) => write!(f, "i16"),
        StorageType::ValType(ty) => write!(f, "{ty}"),
    }
}

impl fmt::Display for ValType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValType::Num(NumType::Int32) => write!(f, "i32"),
            ValType::Num(NumType::Int64) => write!(f, "i64"),
            ValType::Num(NumType::Float32) => write!(f, "f32"),
            ValType::Num(NumType::Float64) => write!(f, "f64"),
            ValType::Vec(VecType::V128) => write!(f, "v128"),
            ValType::Ref(r) => write!(f, "{r}"),
        }
    }
}

impl fmt::Display for RefType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.null == Nullability::Nullable {
            write!(f, "(ref null {})", self.heap)
        } else {
            write!(f, "(ref {})", self.heap)
        }
    }
}

impl fmt::Display for HeapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeapType::Idx(idx) => write!(f, "$t{}", idx.0),
            HeapType::Abs(ty, Shareability::Shared) => write!(f, "(shared {})", abs_name(*ty)),
            HeapType::Abs(ty, Shareability::Unshared) => write!(f, "{}", abs_name(*ty)),
        }
    }
}

fn abs_name(ty: AbsHeapType) -> &'static str {
    match ty {
        AbsHeapType::Exn => "exn",
        AbsHeapType::Array => "array",
        AbsHeapType::Struct => "struct",
        AbsHeapType::I31 => "i31",
        AbsHeapType::Eq => "eq",
        AbsHeapType::Any => "any",
        AbsHeapType::Extern => "extern",
        AbsHeapType::Func => "func",
        AbsHeapType::Cont => "cont",
        AbsHeapType::String => "string",
        AbsHeapType::None => "none",
        AbsHeapType::NoExtern => "noextern",
        AbsHeapType::NoFunc => "nofunc",
        AbsHeapType::NoExn => "noexn",
        AbsHeapType::NoCont => "nocont",
    }
}

#[cfg(test)]
mod tests {
    use crate::builder::TypeBuilder;
    use crate::types::*;

    #[test]
    fn it_prints_every_field_and_reference() {
        let mut builder = TypeBuilder::new(3);
        builder.set_comp(
            0,
            CompType::Struct(vec![
                FieldType(Mut::Var, StorageType::PackType(PackType::I8)),
                FieldType(
                    Mut::Const,
                    StorageType::ValType(ValType::Ref(RefType {
                        null: Nullability::Nullable,
                        heap: HeapType::Idx(TypeIdx(1)),
                    })),
                ),
            ]),
        );
        builder.set_open(0, true);
        builder.set_comp(
            1,
            CompType::Array(FieldType(
                Mut::Const,
                StorageType::ValType(ValType::Num(NumType::Float64)),
            )),
        );
        builder.set_comp(
            2,
            CompType::Func {
                parameters: vec![ValType::Num(NumType::Int32)],
                results: vec![ValType::Ref(RefType {
                    null: Nullability::NonNullable,
                    heap: HeapType::Abs(AbsHeapType::Any, Shareability::Unshared),
                })],
            },
        );
        builder.create_rec_group(0, 2);
        let graph = builder.build().unwrap();

        let printed = graph.to_string();
        assert_eq!(
            printed,
            "(rec\n  \
               (type $t0 (sub (struct (field (mut i8)) (field (ref null $t1)))))\n  \
               (type $t1 (array f64))\n\
             )\n\
             (type $t2 (func (param i32) (result (ref any))))\n"
        );
    }
}
