use rill_core::{Diagnostics, NameTable};

use crate::analyze::Analysis;
use crate::lexer::lex;
use crate::parser::parse;
use crate::types::TypeTree;

use super::cgen::{GenError, generate_c};

fn compile(source: &str) -> Result<String, GenError> {
    let mut diag = Diagnostics::new();
    let mut names = NameTable::new();
    let mut types = TypeTree::new(&mut names);
    let mut analysis = Analysis::new();

    let tokens = lex(source, &mut diag);
    let result = parse(tokens, &mut types, &mut names, &mut diag);
    assert!(analysis.add_unit(result, &mut diag));
    assert!(
        analysis.run(&mut types, &names, &mut diag),
        "analysis failed:\n{}",
        diag.printer().source(source).render()
    );

    generate_c(&analysis, &types, &names)
}

fn compile_ok(source: &str) -> String {
    compile(source).expect("emission succeeds")
}

#[test]
fn constants_and_functions_in_topological_order() {
    let output = compile_ok("PI :: 3.141592\nadd :: (a: int, b: int) -> int {\n\ta + b\n}\n");
    insta::assert_snapshot!(output, @r"
    #include <stdbool.h>
    #include <stddef.h>

    const double PI = 3.141592;
    long add(long a, long b) {
        (a + b);
    }
    ");
}

#[test]
fn dependencies_emit_before_dependents() {
    let output = compile_ok("AREA :: PI * PI\nPI :: 3.0\n");
    let pi = output.find("const double PI").unwrap();
    let area = output.find("const double AREA").unwrap();
    assert!(pi < area);
}

#[test]
fn locals_attach_to_their_scope() {
    let output = compile_ok("check :: (flag: bool) -> int {\n\tn := 1\n\tif flag {\n\t\tn\n\t}\n\tn\n}\n");
    insta::assert_snapshot!(output, @r"
    #include <stdbool.h>
    #include <stddef.h>

    long check(bool flag) {
        long n;
        n = 1;
        if (flag) {
            n;
        }
        n;
    }
    ");
}

#[test]
fn range_loops_lower_to_for() {
    let output = compile_ok("count :: () -> int {\n\ttotal := 0\n\tfor i in 0..3 {\n\t\ttotal\n\t}\n\ttotal\n}\n");
    insta::assert_snapshot!(output, @r"
    #include <stdbool.h>
    #include <stddef.h>

    long count(void) {
        long total;
        total = 0;
        for (long i = 0; i < 3; i++) {
            total;
        }
        total;
    }
    ");
}

#[test]
fn while_loop_flavors() {
    let output = compile_ok(
        "spin :: (go: bool) {\n\tfor go {\n\t\t...\n\t}\n\tdo { ... } for go\n\tdon't { ... } for go\n}\n",
    );
    insta::assert_snapshot!(output, @r"
    #include <stdbool.h>
    #include <stddef.h>

    void spin(bool go) {
        while (go) {
            ;
        }
        do {
            ;
        }
        while (go);
        while (!(go)) {
            ;
        }
    }
    ");
}

#[test]
fn calls_and_string_literals() {
    let output = compile_ok("greet :: () -> string {\n\t'hello'\n}\nMSG :: greet()\n");
    insta::assert_snapshot!(output, @r#"
    #include <stdbool.h>
    #include <stddef.h>

    char * greet(void) {
        "hello";
    }
    const char * MSG = greet();
    "#);
}

#[test]
fn struct_typed_locals_pull_in_their_typedefs() {
    let output = compile_ok(
        "Point :: struct {\n\tx: int\n\ty: int\n}\nf :: () -> int {\n\tp : Point\n\tp.x\n}\n",
    );
    insta::assert_snapshot!(output, @r"
    #include <stdbool.h>
    #include <stddef.h>

    typedef struct {
        long x;
        long y;
    } anon0;

    long f(void) {
        anon0 p;
        p.x;
    }
    ");
}

#[test]
fn reserved_identifiers_are_refused_end_to_end() {
    let err = compile("f :: () {\n\tswitch := 1\n\tswitch\n}\n").unwrap_err();
    assert!(matches!(err, GenError::Build(_)));
}

#[test]
fn nested_function_literals_are_rejected() {
    let err = compile("f :: () {\n\tg := () {}\n\tg\n}\n").unwrap_err();
    assert_eq!(err, GenError::NestedFunction);
}
