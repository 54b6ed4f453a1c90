//! Lowering interned types to C types.
//!
//! Slices, vectors, optionals, error-results, and aggregates have no direct
//! C spelling; each becomes an anonymous struct (`anon0`, `anon1`, ...)
//! accumulated on the [`AnonTable`] and emitted once as forward typedefs
//! before the declarations that reference them.

use rill_core::NameTable;

use crate::types::{TypeId, TypeKind, TypeTree};

use super::ctype::CType;

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum LowerError {
    #[error("map types are not supported by the C back-end")]
    MapUnsupported,
    #[error("cannot lower the void type")]
    VoidType,
}

#[derive(Debug, Clone)]
pub struct AnonStruct {
    pub is_union: bool,
    pub members: Vec<(String, CType)>,
}

/// Anonymous aggregates accumulated while lowering types, in creation order
/// (inner aggregates precede the aggregates that use them).
#[derive(Debug, Clone, Default)]
pub struct AnonTable {
    structs: Vec<AnonStruct>,
}

impl AnonTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn add(&mut self, anon: AnonStruct) -> String {
        self.structs.push(anon);
        format!("anon{}", self.structs.len() - 1)
    }

    pub fn is_empty(&self) -> bool {
        self.structs.is_empty()
    }

    /// Renders the typedef block for every accumulated aggregate.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (i, anon) in self.structs.iter().enumerate() {
            let keyword = if anon.is_union { "union" } else { "struct" };
            out.push_str(&format!("typedef {keyword} {{\n"));
            for (name, ty) in &anon.members {
                out.push_str("    ");
                out.push_str(&ty.render(Some(name)));
                out.push_str(";\n");
            }
            out.push_str(&format!("}} anon{i};\n\n"));
        }
        out
    }
}

/// Lowers `id` to a C type, accumulating anonymous aggregates on `anons`.
pub fn build_type(
    types: &TypeTree,
    names: &NameTable,
    anons: &mut AnonTable,
    id: TypeId,
) -> Result<CType, LowerError> {
    match types.kind(id) {
        TypeKind::Void => Ok(CType::new("void")),

        TypeKind::Name(name) => {
            let resolved = types.resolve_alias(id);
            if resolved == id {
                return Ok(CType::new(map_primitive(names.resolve(*name))));
            }
            match types.kind(resolved) {
                // the chain ended on another name; spell that one out
                TypeKind::Name(target) => {
                    Ok(CType::new(map_primitive(names.resolve(*target))))
                }
                _ => build_type(types, names, anons, resolved),
            }
        }

        TypeKind::Ptr | TypeKind::Addr => {
            let parent = types.parent(id).ok_or(LowerError::VoidType)?;
            let mut inner = build_type(types, names, anons, parent)?;
            inner.add_ptr(false);
            Ok(inner)
        }

        TypeKind::Arr(size) => {
            let size = *size;
            let parent = types.parent(id).ok_or(LowerError::VoidType)?;
            let mut inner = build_type(types, names, anons, parent)?;
            inner.add_arr(size);
            Ok(inner)
        }

        TypeKind::Slice => {
            let parent = types.parent(id).ok_or(LowerError::VoidType)?;
            let mut arr = build_type(types, names, anons, parent)?;
            arr.add_ptr(false);

            let name = anons.add(AnonStruct {
                is_union: false,
                members: vec![
                    ("arr".to_owned(), arr),
                    ("len".to_owned(), CType::new("size_t")),
                ],
            });
            Ok(CType::new(name))
        }

        TypeKind::Vec => {
            let parent = types.parent(id).ok_or(LowerError::VoidType)?;
            let mut arr = build_type(types, names, anons, parent)?;
            arr.add_ptr(false);

            let name = anons.add(AnonStruct {
                is_union: false,
                members: vec![
                    ("arr".to_owned(), arr),
                    ("cap".to_owned(), CType::new("size_t")),
                    ("len".to_owned(), CType::new("size_t")),
                ],
            });
            Ok(CType::new(name))
        }

        TypeKind::Opt | TypeKind::Err => {
            let parent = types.parent(id).ok_or(LowerError::VoidType)?;
            let mut opt = build_type(types, names, anons, parent)?;
            opt.add_ptr(false);

            let name = anons.add(AnonStruct {
                is_union: false,
                members: vec![
                    ("is_valid".to_owned(), CType::new("bool")),
                    ("opt".to_owned(), opt),
                ],
            });
            Ok(CType::new(name))
        }

        TypeKind::Fn { ret, params } => {
            let mut ctype = build_type(types, names, anons, *ret)?;
            let lowered: Result<Vec<CType>, LowerError> = params
                .iter()
                .map(|&param| build_type(types, names, anons, param))
                .collect();
            ctype.make_fn_ptr(lowered?);
            Ok(ctype)
        }

        TypeKind::Struct(members) | TypeKind::Union(members) => {
            let is_union = matches!(types.kind(id), TypeKind::Union(_));
            let mut lowered = Vec::with_capacity(members.len());
            for member in members {
                lowered.push((
                    names.resolve(member.name).to_owned(),
                    build_type(types, names, anons, member.ty)?,
                ));
            }
            let name = anons.add(AnonStruct {
                is_union,
                members: lowered,
            });
            Ok(CType::new(name))
        }

        TypeKind::Map { .. } => Err(LowerError::MapUnsupported),
    }
}

/// Source primitive names to their C spellings; user names pass through.
fn map_primitive(name: &str) -> String {
    match name {
        "int" => "long".to_owned(),
        "float" => "float".to_owned(),
        "dooble" => "double".to_owned(),
        "bool" => "bool".to_owned(),
        "string" => "char *".to_owned(),
        "char" => "char".to_owned(),
        "null" => "void *".to_owned(),
        other => other.to_owned(),
    }
}
