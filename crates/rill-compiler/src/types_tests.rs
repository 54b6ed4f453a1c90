use rill_core::NameTable;

use super::types::{Member, Primitive, TypeKind, TypeTree, VOID};

fn fresh() -> (TypeTree, NameTable) {
    let mut names = NameTable::new();
    let tree = TypeTree::new(&mut names);
    (tree, names)
}

#[test]
fn primitives_are_root_name_leaves() {
    let (tree, mut names) = fresh();

    for primitive in Primitive::ALL {
        let id = tree.basic_type(primitive);
        assert_ne!(id, VOID);
        let name = names.intern(primitive.name());
        assert_eq!(tree.kind(id), &TypeKind::Name(name));
        assert_eq!(tree.parent(id), None);
    }
}

#[test]
fn equal_templates_intern_to_the_same_id() {
    let (mut tree, _names) = fresh();
    let int = tree.basic_type(Primitive::Int);

    let a = tree.get_leaf(Some(int), TypeKind::Arr(10));
    let b = tree.get_leaf(Some(int), TypeKind::Arr(10));
    let c = tree.get_leaf(Some(int), TypeKind::Arr(11));

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert!(tree.leaf_exists(Some(int), &TypeKind::Arr(10)));
    assert!(!tree.leaf_exists(Some(int), &TypeKind::Arr(12)));
}

#[test]
fn a_bare_name_annotation_is_the_primitive() {
    let (mut tree, mut names) = fresh();
    let int_name = names.intern("int");

    let id = tree.get_leaf(None, TypeKind::Name(int_name));
    assert_eq!(id, tree.basic_type(Primitive::Int));
}

#[test]
fn interning_is_per_parent() {
    let (mut tree, mut names) = fresh();
    let int_name = names.intern("int");
    let int = tree.basic_type(Primitive::Int);

    // Name(int) under an Opt parent is a different leaf than the root one
    let opt = tree.get_leaf(None, TypeKind::Opt);
    let nested = tree.get_leaf(Some(opt), TypeKind::Name(int_name));
    assert_ne!(nested, int);
}

#[test]
fn aggregates_are_never_deduplicated() {
    let (mut tree, mut names) = fresh();
    let x = names.intern("x");
    let int = tree.basic_type(Primitive::Int);

    let members = vec![Member { name: x, ty: int }];
    let a = tree.get_leaf(None, TypeKind::Struct(members.clone()));
    let b = tree.get_leaf(None, TypeKind::Struct(members));

    assert_ne!(a, b);
}

#[test]
fn fn_types_compare_by_signature() {
    let (mut tree, _names) = fresh();
    let int = tree.basic_type(Primitive::Int);
    let bool_ty = tree.basic_type(Primitive::Bool);

    let a = tree.get_leaf(
        None,
        TypeKind::Fn {
            ret: int,
            params: vec![int, bool_ty],
        },
    );
    let b = tree.get_leaf(
        None,
        TypeKind::Fn {
            ret: int,
            params: vec![int, bool_ty],
        },
    );
    let c = tree.get_leaf(
        None,
        TypeKind::Fn {
            ret: int,
            params: vec![bool_ty, int],
        },
    );

    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn aliases_resolve_to_a_fixed_point() {
    let (mut tree, mut names) = fresh();
    let int = tree.basic_type(Primitive::Int);

    let a = tree.get_leaf(None, TypeKind::Name(names.intern("A")));
    let b = tree.get_leaf(None, TypeKind::Name(names.intern("B")));

    assert!(tree.add_typedef(b, int));
    assert!(tree.add_typedef(a, b));
    // duplicate alias is refused
    assert!(!tree.add_typedef(a, int));

    assert_eq!(tree.resolve_alias(a), int);
    assert_eq!(tree.resolve_alias(b), int);
    assert_eq!(tree.resolve_alias(int), int);
}

#[test]
fn alias_cycles_terminate() {
    let (mut tree, mut names) = fresh();

    let a = tree.get_leaf(None, TypeKind::Name(names.intern("A")));
    let b = tree.get_leaf(None, TypeKind::Name(names.intern("B")));
    tree.add_typedef(a, b);
    tree.add_typedef(b, a);

    // no fixed point exists; resolution stops instead of looping
    let resolved = tree.resolve_alias(a);
    assert!(resolved == a || resolved == b);
}

#[test]
fn pointer_and_address_wrap_identically_per_base() {
    let (mut tree, _names) = fresh();
    let int = tree.basic_type(Primitive::Int);
    let bool_ty = tree.basic_type(Primitive::Bool);

    let p1 = tree.as_pointer(int);
    let p2 = tree.as_pointer(int);
    let p3 = tree.as_pointer(bool_ty);
    assert_eq!(p1, p2);
    assert_ne!(p1, p3);

    let a1 = tree.as_address(int);
    assert_ne!(a1, p1);
    assert_eq!(a1, tree.as_address(int));
}

#[test]
fn display_renders_source_order() {
    let (mut tree, names) = fresh();
    let int = tree.basic_type(Primitive::Int);

    let arr = tree.get_leaf(Some(int), TypeKind::Arr(10));
    let opt = tree.get_leaf(Some(arr), TypeKind::Opt);

    assert_eq!(tree.display(opt, &names), "?[10]int");
    assert_eq!(tree.display(VOID, &names), "void");

    let string = tree.basic_type(Primitive::String);
    let map = tree.get_leaf(
        None,
        TypeKind::Map {
            key: string,
            value: int,
        },
    );
    assert_eq!(tree.display(map, &names), "map[string,int]");
}
