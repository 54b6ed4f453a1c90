use rill_core::{Diagnostics, NameTable};

use crate::ast::Node;
use crate::lexer::lex;
use crate::types::{Primitive, TypeId, TypeTree};

use super::parse;

struct Parsed {
    types: TypeTree,
    names: NameTable,
    diag: Diagnostics,
    decl_types: Vec<Option<TypeId>>,
}

fn parse_decls(source: &str) -> Parsed {
    let mut diag = Diagnostics::new();
    let mut names = NameTable::new();
    let mut types = TypeTree::new(&mut names);

    let tokens = lex(source, &mut diag);
    let result = parse(tokens, &mut types, &mut names, &mut diag);

    let decl_types = result
        .ast
        .root_stmts()
        .iter()
        .map(|&id| match result.ast.node(id) {
            Node::Decl(decl) => decl.ty,
            _ => None,
        })
        .collect();

    Parsed {
        types,
        names,
        diag,
        decl_types,
    }
}

fn single_type(source: &str) -> (Parsed, TypeId) {
    let parsed = parse_decls(source);
    assert!(
        !parsed.diag.has_errors(),
        "unexpected errors:\n{}",
        parsed.diag.printer().source(source).render()
    );
    let ty = parsed.decl_types[0].expect("declaration has a type");
    (parsed, ty)
}

#[test]
fn bare_primitive_is_the_interned_primitive() {
    let (parsed, ty) = single_type("x : int\n");
    assert_eq!(ty, parsed.types.basic_type(Primitive::Int));
}

#[test]
fn modifier_chains_display_in_source_order() {
    let (parsed, ty) = single_type("x : ?*[10]int\n");
    assert_eq!(parsed.types.display(ty, &parsed.names), "?*[10]int");
}

#[test]
fn equal_annotations_share_one_typeid() {
    let parsed = parse_decls("a : *[3]bool\nb : *[3]bool\nc : *[4]bool\n");
    assert!(!parsed.diag.has_errors());

    assert_eq!(parsed.decl_types[0], parsed.decl_types[1]);
    assert_ne!(parsed.decl_types[0], parsed.decl_types[2]);
}

#[test]
fn slice_vec_and_fixed_arrays() {
    let (parsed, slice) = single_type("s : []int\n");
    assert_eq!(parsed.types.display(slice, &parsed.names), "[]int");

    let (parsed, vec) = single_type("v : [vec]int\n");
    assert_eq!(parsed.types.display(vec, &parsed.names), "[vec]int");

    let (parsed, arr) = single_type("a : [32]int\n");
    assert_eq!(parsed.types.display(arr, &parsed.names), "[32]int");
}

#[test]
fn function_types() {
    let (parsed, ty) = single_type("f : (int, bool) -> string\n");
    assert_eq!(
        parsed.types.display(ty, &parsed.names),
        "(int,bool) -> string"
    );

    let (parsed, ty) = single_type("thunk : ()\n");
    assert_eq!(parsed.types.display(ty, &parsed.names), "()");
}

#[test]
fn map_types() {
    let (parsed, ty) = single_type("m : map[string, int]\n");
    assert_eq!(parsed.types.display(ty, &parsed.names), "map[string,int]");
}

#[test]
fn error_result_wrapper() {
    let (parsed, ty) = single_type("r : !int\n");
    assert_eq!(parsed.types.display(ty, &parsed.names), "!int");
}

#[test]
fn optional_alone_is_legal() {
    // Opt may transition straight to the terminator
    let parsed = parse_decls("x : ? = nil\n");
    assert!(
        !parsed.diag.has_errors(),
        "{}",
        parsed.diag.printer().render()
    );
    assert!(parsed.decl_types[0].is_some());
}

#[test]
fn double_optional_is_a_disallowed_transition() {
    let parsed = parse_decls("x : ??int\n");
    assert!(
        parsed
            .diag
            .iter()
            .any(|d| d.message().contains("disallowed type transition"))
    );
}

#[test]
fn result_after_optional_is_a_disallowed_transition() {
    let parsed = parse_decls("x : ?!int\n");
    assert!(
        parsed
            .diag
            .iter()
            .any(|d| d.message().contains("disallowed type transition"))
    );
}

#[test]
fn dangling_pointer_modifier_cannot_end_a_type() {
    let parsed = parse_decls("x : * = 1\n");
    assert!(
        parsed
            .diag
            .iter()
            .any(|d| d.message().contains("disallowed type transition"))
    );
}

#[test]
fn dangling_array_modifier_cannot_end_a_type() {
    let parsed = parse_decls("x : [3] = 1\n");
    assert!(
        parsed
            .diag
            .iter()
            .any(|d| d.message().contains("disallowed type transition"))
    );
}

#[test]
fn inline_struct_members_keep_declaration_order() {
    let (parsed, ty) = single_type("p : struct { x: int; y: bool }\n");

    let crate::types::TypeKind::Struct(members) = parsed.types.kind(ty) else {
        panic!("expected a struct leaf");
    };
    let rendered: Vec<(&str, String)> = members
        .iter()
        .map(|m| {
            (
                parsed.names.resolve(m.name),
                parsed.types.display(m.ty, &parsed.names),
            )
        })
        .collect();
    assert_eq!(
        rendered,
        [("x", "int".to_owned()), ("y", "bool".to_owned())]
    );
}

#[test]
fn nested_modifiers_around_a_function_type() {
    let (parsed, ty) = single_type("cb : ?(int) -> bool\n");
    assert_eq!(parsed.types.display(ty, &parsed.names), "?(int) -> bool");
}
