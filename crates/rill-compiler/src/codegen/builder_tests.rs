use super::builder::{BuildError, CodeBuilder};
use super::ctype::CType;

#[test]
fn function_with_call_and_return() {
    let mut builder = CodeBuilder::new();

    builder
        .emit_function("hello", false, CType::new("int"), vec![])
        .unwrap();
    builder.emit_call("printf", 1);
    builder.emit_atomic("hello world\n");
    builder.emit_statement();
    builder.emit_retval(5);
    builder.emit_scope_end().unwrap();

    let output = builder.get_generated().unwrap();
    insta::assert_snapshot!(output, @r#"
    int hello(void) {
        printf("hello world\n");
        return 5;
    }
    "#);
}

#[test]
fn reserved_identifiers_are_refused() {
    let mut builder = CodeBuilder::new();
    builder.emit_scope();

    let err = builder
        .emit_identifier("typeof", CType::new("int"), false, false)
        .unwrap_err();
    assert_eq!(err, BuildError::ReservedWord("typeof".to_owned()));

    let err = builder
        .emit_identifier("NULL", CType::new("int"), false, false)
        .unwrap_err();
    assert_eq!(err, BuildError::ReservedWord("NULL".to_owned()));
}

#[test]
fn identifiers_need_an_active_scope() {
    let mut builder = CodeBuilder::new();
    let err = builder
        .emit_identifier("x", CType::new("int"), false, false)
        .unwrap_err();
    assert_eq!(err, BuildError::NoActiveScope("x".to_owned()));
}

#[test]
fn scope_identifiers_render_at_the_top() {
    let mut builder = CodeBuilder::new();

    builder
        .emit_function("init", true, CType::new("void"), vec![])
        .unwrap();
    let mut ptr = CType::new("char");
    ptr.add_ptr(false);
    builder.emit_identifier("buffer", ptr, false, false).unwrap();
    builder.emit_expression("buffer = 0");
    builder.emit_statement();
    builder.emit_scope_end().unwrap();

    let output = builder.get_generated().unwrap();
    insta::assert_snapshot!(output, @r"
    static void init(void) {
        char *buffer;
        buffer = 0;
    }
    ");
}

#[test]
fn expression_placeholders_consume_in_order() {
    let mut builder = CodeBuilder::new();

    builder.emit_expression("$ + $");
    builder.emit_expression("$ + $");
    builder.emit_expression("4");
    builder.emit_expression("2");
    builder.emit_expression("5");

    let output = builder.get_generated().unwrap();
    assert_eq!(output, "4 + 2 + 5");
}

#[test]
fn calls_consume_their_argument_count() {
    let mut builder = CodeBuilder::new();

    builder.emit_call("add", 2);
    builder.emit_expression("1");
    builder.emit_call("mul", 2);
    builder.emit_expression("2");
    builder.emit_expression("3");

    let output = builder.get_generated().unwrap();
    assert_eq!(output, "add(1, mul(2, 3))");
}

#[test]
fn unbalanced_scope_end_is_an_error() {
    let mut builder = CodeBuilder::new();
    assert_eq!(builder.emit_scope_end(), Err(BuildError::UnbalancedScope));
}

#[test]
fn unclosed_scope_fails_generation() {
    let mut builder = CodeBuilder::new();
    builder.emit_scope();
    assert_eq!(builder.get_generated(), Err(BuildError::UnclosedScope));
}

#[test]
fn nested_scopes_restore_the_active_scope() {
    let mut builder = CodeBuilder::new();

    builder.emit_scope();
    builder.emit_scope();
    builder.emit_scope_end().unwrap();
    // back in the outer scope; identifiers still attach
    builder
        .emit_identifier("x", CType::new("int"), false, false)
        .unwrap();
    builder.emit_scope_end().unwrap();

    let output = builder.get_generated().unwrap();
    insta::assert_snapshot!(output, @r"
     {
        int x;
         {
        }
    }
    ");
}

#[test]
fn the_builder_is_empty_after_generation() {
    let mut builder = CodeBuilder::new();
    builder.emit_expression("1");
    let _ = builder.get_generated().unwrap();
    assert!(builder.is_empty());
}

#[test]
fn function_parameters_render_in_the_declarator() {
    use super::builder::CIdent;

    let mut builder = CodeBuilder::new();
    builder
        .emit_function(
            "add",
            false,
            CType::new("long"),
            vec![
                CIdent {
                    name: "a".to_owned(),
                    ty: CType::new("long"),
                    is_static: false,
                    is_extern: false,
                },
                CIdent {
                    name: "b".to_owned(),
                    ty: CType::new("long"),
                    is_static: false,
                    is_extern: false,
                },
            ],
        )
        .unwrap();
    builder.emit_expression("return a + b");
    builder.emit_statement();
    builder.emit_scope_end().unwrap();

    let output = builder.get_generated().unwrap();
    insta::assert_snapshot!(output, @r"
    long add(long a, long b) {
        return a + b;
    }
    ");
}
