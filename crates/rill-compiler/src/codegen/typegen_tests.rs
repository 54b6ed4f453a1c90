use rill_core::NameTable;

use crate::types::{Member, Primitive, TypeKind, TypeTree};

use super::typegen::{AnonTable, LowerError, build_type};

fn fresh() -> (TypeTree, NameTable) {
    let mut names = NameTable::new();
    let tree = TypeTree::new(&mut names);
    (tree, names)
}

#[test]
fn primitives_map_to_c_spellings() {
    let (tree, names) = fresh();
    let mut anons = AnonTable::new();

    let int = tree.basic_type(Primitive::Int);
    let ctype = build_type(&tree, &names, &mut anons, int).unwrap();
    assert_eq!(ctype.render(Some("x")), "long x");

    let dooble = tree.basic_type(Primitive::Dooble);
    let ctype = build_type(&tree, &names, &mut anons, dooble).unwrap();
    assert_eq!(ctype.render(Some("d")), "double d");

    assert!(anons.is_empty());
}

#[test]
fn pointers_and_arrays() {
    let (mut tree, names) = fresh();
    let mut anons = AnonTable::new();
    let int = tree.basic_type(Primitive::Int);

    let ptr = tree.as_pointer(int);
    let ctype = build_type(&tree, &names, &mut anons, ptr).unwrap();
    assert_eq!(ctype.render(Some("p")), "long *p");

    let arr = tree.get_leaf(Some(int), TypeKind::Arr(16));
    let ctype = build_type(&tree, &names, &mut anons, arr).unwrap();
    assert_eq!(ctype.render(Some("a")), "long a[16]");
}

#[test]
fn slices_become_anonymous_structs() {
    let (mut tree, names) = fresh();
    let mut anons = AnonTable::new();
    let int = tree.basic_type(Primitive::Int);

    let slice = tree.get_leaf(Some(int), TypeKind::Slice);
    let ctype = build_type(&tree, &names, &mut anons, slice).unwrap();
    assert_eq!(ctype.render(Some("s")), "anon0 s");

    insta::assert_snapshot!(anons.render(), @r"
    typedef struct {
        long *arr;
        size_t len;
    } anon0;
    ");
}

#[test]
fn vectors_carry_cap_and_len() {
    let (mut tree, names) = fresh();
    let mut anons = AnonTable::new();
    let int = tree.basic_type(Primitive::Int);

    let vec = tree.get_leaf(Some(int), TypeKind::Vec);
    build_type(&tree, &names, &mut anons, vec).unwrap();

    insta::assert_snapshot!(anons.render(), @r"
    typedef struct {
        long *arr;
        size_t cap;
        size_t len;
    } anon0;
    ");
}

#[test]
fn optionals_wrap_a_validity_flag() {
    let (mut tree, names) = fresh();
    let mut anons = AnonTable::new();
    let bool_ty = tree.basic_type(Primitive::Bool);

    let opt = tree.get_leaf(Some(bool_ty), TypeKind::Opt);
    build_type(&tree, &names, &mut anons, opt).unwrap();

    insta::assert_snapshot!(anons.render(), @r"
    typedef struct {
        bool is_valid;
        bool *opt;
    } anon0;
    ");
}

#[test]
fn aggregates_lower_member_by_member() {
    let (mut tree, mut names) = fresh();
    let mut anons = AnonTable::new();
    let int = tree.basic_type(Primitive::Int);

    let x = names.intern("x");
    let y = names.intern("y");
    let point = tree.get_leaf(
        None,
        TypeKind::Struct(vec![
            Member { name: x, ty: int },
            Member { name: y, ty: int },
        ]),
    );
    let ctype = build_type(&tree, &names, &mut anons, point).unwrap();
    assert_eq!(ctype.render(Some("p")), "anon0 p");

    insta::assert_snapshot!(anons.render(), @r"
    typedef struct {
        long x;
        long y;
    } anon0;
    ");
}

#[test]
fn unions_use_the_union_keyword() {
    let (mut tree, mut names) = fresh();
    let mut anons = AnonTable::new();
    let int = tree.basic_type(Primitive::Int);

    let tag = names.intern("whole");
    let variant = tree.get_leaf(
        None,
        TypeKind::Union(vec![Member { name: tag, ty: int }]),
    );
    build_type(&tree, &names, &mut anons, variant).unwrap();

    assert!(anons.render().starts_with("typedef union {"));
}

#[test]
fn function_types_render_as_function_pointers() {
    let (mut tree, names) = fresh();
    let mut anons = AnonTable::new();
    let int = tree.basic_type(Primitive::Int);
    let bool_ty = tree.basic_type(Primitive::Bool);

    let func = tree.get_leaf(
        None,
        TypeKind::Fn {
            ret: int,
            params: vec![int, bool_ty],
        },
    );
    let ctype = build_type(&tree, &names, &mut anons, func).unwrap();
    assert_eq!(ctype.render(Some("cb")), "long (cb)(long,bool)");
}

#[test]
fn maps_are_not_lowerable() {
    let (mut tree, names) = fresh();
    let mut anons = AnonTable::new();
    let int = tree.basic_type(Primitive::Int);
    let string = tree.basic_type(Primitive::String);

    let map = tree.get_leaf(
        None,
        TypeKind::Map {
            key: string,
            value: int,
        },
    );
    let err = build_type(&tree, &names, &mut anons, map).unwrap_err();
    assert_eq!(err, LowerError::MapUnsupported);
}

#[test]
fn aliases_lower_to_their_targets() {
    let (mut tree, mut names) = fresh();
    let mut anons = AnonTable::new();
    let int = tree.basic_type(Primitive::Int);

    let id = tree.get_leaf(None, TypeKind::Name(names.intern("Id")));
    tree.add_typedef(id, int);

    let ctype = build_type(&tree, &names, &mut anons, id).unwrap();
    assert_eq!(ctype.render(Some("n")), "long n");
}
