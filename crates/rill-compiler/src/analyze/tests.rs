use indoc::indoc;
use rill_core::{Diagnostics, NameTable};

use crate::lexer::lex;
use crate::parser::parse;
use crate::types::{Primitive, TypeTree};

use super::Analysis;

struct Analyzed {
    analysis: Analysis,
    types: TypeTree,
    names: NameTable,
    diag: Diagnostics,
    ok: bool,
}

fn analyze(source: &str) -> Analyzed {
    analyze_units(&[source])
}

fn analyze_units(sources: &[&str]) -> Analyzed {
    let mut diag = Diagnostics::new();
    let mut names = NameTable::new();
    let mut types = TypeTree::new(&mut names);
    let mut analysis = Analysis::new();

    for source in sources {
        let tokens = lex(source, &mut diag);
        let result = parse(tokens, &mut types, &mut names, &mut diag);
        assert!(analysis.add_unit(result, &mut diag), "unit failed to parse");
    }

    let ok = analysis.run(&mut types, &names, &mut diag);
    Analyzed {
        analysis,
        types,
        names,
        diag,
        ok,
    }
}

fn expect_ok(source: &str) -> Analyzed {
    let analyzed = analyze(source);
    assert!(
        analyzed.ok,
        "analysis failed:\n{}",
        analyzed.diag.printer().source(source).render()
    );
    analyzed
}

fn expect_err(source: &str, needle: &str) -> Analyzed {
    let analyzed = analyze(source);
    assert!(!analyzed.ok, "analysis unexpectedly succeeded");
    assert!(
        analyzed.diag.iter().any(|d| d.message().contains(needle)),
        "no diagnostic contains {needle:?}:\n{}",
        analyzed.diag.printer().render()
    );
    analyzed
}

fn position(analyzed: &Analyzed, name: &str) -> usize {
    let name = analyzed.names.get(name).expect("name was interned");
    analyzed
        .analysis
        .order
        .iter()
        .position(|&n| n == name)
        .expect("symbol is in the order")
}

#[test]
fn dependencies_precede_dependents() {
    let analyzed = expect_ok("A :: B + C\nB :: 1\nC :: 2\n");

    assert_eq!(analyzed.analysis.order.len(), 3);
    assert!(position(&analyzed, "B") < position(&analyzed, "A"));
    assert!(position(&analyzed, "C") < position(&analyzed, "A"));
}

#[test]
fn transitive_chains_order_deepest_first() {
    let analyzed = expect_ok("A :: B\nB :: C\nC :: D\nD :: 1\n");

    assert!(position(&analyzed, "D") < position(&analyzed, "C"));
    assert!(position(&analyzed, "C") < position(&analyzed, "B"));
    assert!(position(&analyzed, "B") < position(&analyzed, "A"));
}

#[test]
fn cycle_fails_with_both_names() {
    let analyzed = analyze("A :: B\nB :: A\n");

    assert!(!analyzed.ok);
    assert!(analyzed.analysis.order.is_empty(), "no order on cycle");
    assert!(analyzed.diag.iter().any(|d| {
        d.message()
            .contains("circular variable dependency: A referenced in B")
    }));
}

#[test]
fn self_reference_is_a_cycle() {
    expect_err("A :: A + 1\n", "circular variable dependency");
}

#[test]
fn globals_infer_in_dependency_order() {
    let analyzed = expect_ok("TWO_PI :: PI + PI\nPI :: 3.141592\n");

    let pi = analyzed.names.get("PI").unwrap();
    let two_pi = analyzed.names.get("TWO_PI").unwrap();
    let dooble = analyzed.types.basic_type(Primitive::Dooble);

    assert_eq!(analyzed.analysis.symbols[&pi].ty, Some(dooble));
    assert_eq!(analyzed.analysis.symbols[&two_pi].ty, Some(dooble));
}

#[test]
fn literal_types() {
    let analyzed = expect_ok("I :: 1\nS :: 'text'\nB :: true\nN :: nil\n");

    let ty_of = |name: &str| {
        let name = analyzed.names.get(name).unwrap();
        analyzed.analysis.symbols[&name].ty.unwrap()
    };

    assert_eq!(ty_of("I"), analyzed.types.basic_type(Primitive::Int));
    assert_eq!(ty_of("S"), analyzed.types.basic_type(Primitive::String));
    assert_eq!(ty_of("B"), analyzed.types.basic_type(Primitive::Bool));
    assert_eq!(ty_of("N"), analyzed.types.basic_type(Primitive::Null));
}

#[test]
fn function_constants_get_function_types() {
    let analyzed = expect_ok("add :: (a: int, b: int) -> int {\n\ta + b\n}\nSUM :: add(1, 2)\n");

    let sum = analyzed.names.get("SUM").unwrap();
    assert_eq!(
        analyzed.analysis.symbols[&sum].ty,
        Some(analyzed.types.basic_type(Primitive::Int))
    );
}

#[test]
fn call_of_non_function_is_an_error() {
    expect_err("X :: 1\nY :: X(2)\n", "call of a non-function value");
}

#[test]
fn undefined_identifier_is_an_error() {
    expect_err("X :: missing_thing\n", "undefined identifier 'missing_thing'");
}

#[test]
fn duplicate_global_is_an_error() {
    expect_err("A :: 1\nA :: 2\n", "duplicate global declaration");
}

#[test]
fn mismatched_operand_types() {
    expect_err("X :: 1 + 'one'\n", "mismatched types in expression");
}

#[test]
fn and_requires_booleans() {
    expect_err("X :: 1 and 2\n", "not boolean expressions");
}

#[test]
fn not_requires_a_boolean() {
    expect_err(
        "f :: () -> bool {\n\tr := not 5\n\tr\n}\n",
        "'not' operator must be followed by a boolean expression",
    );
}

#[test]
fn comparisons_yield_bool() {
    expect_ok("f :: () {\n\tif 1 < 2 { ... }\n}\n");
}

#[test]
fn conditions_must_be_boolean() {
    expect_err(
        "f :: () {\n\tif 1 { ... }\n}\n",
        "condition must be a boolean expression",
    );
}

#[test]
fn for_in_requires_a_range() {
    expect_err(
        "f :: () {\n\tfor x in 5 { ... }\n}\n",
        "expects a '..' range expression",
    );
}

#[test]
fn loop_variable_is_scoped_to_the_body() {
    expect_ok(indoc! {"
        f :: () {
            for x in 0..3 {
                y := x + 1
                y
            }
        }
    "});
    expect_err(
        indoc! {"
            f :: () {
                for x in 0..3 { ... }
                x
            }
        "},
        "undefined identifier 'x'",
    );
}

#[test]
fn inner_scopes_close_on_block_exit() {
    expect_err(
        indoc! {"
            f :: () {
                {
                    inner := 1
                    inner
                }
                inner
            }
        "},
        "undefined identifier 'inner'",
    );
}

#[test]
fn member_access_through_an_alias() {
    expect_ok(indoc! {"
        Point :: struct {
            x: int
            y: int
        }
        f :: () {
            p : Point
            q := p.x + 1
            q
        }
    "});
}

#[test]
fn missing_member_is_an_error() {
    expect_err(
        indoc! {"
            Point :: struct {
                x: int
            }
            f :: () {
                p : Point
                p.z
            }
        "},
        "no member 'z' on type Point",
    );
}

#[test]
fn member_access_on_a_scalar_is_an_error() {
    expect_err(
        "f :: () {\n\tn := 1\n\tn.x\n}\n",
        "type int has no members",
    );
}

#[test]
fn unknown_type_names_are_reported() {
    expect_err("x : Foo\n", "unknown type name 'Foo'");
}

#[test]
fn aliased_type_names_pass_phase_one() {
    expect_ok("Id :: alias int\nx : Id = 3\n");
}

#[test]
fn circular_type_aliases_are_reported() {
    expect_err("A :: alias B\nB :: alias A\n", "circular type alias");
}

#[test]
fn declared_and_inferred_types_must_agree() {
    expect_err("x : bool = 1\n", "mismatched types in declaration");
}

#[test]
fn globals_are_visible_across_units() {
    let analyzed = analyze_units(&["BASE :: 10\n", "DOUBLE :: BASE + BASE\n"]);
    assert!(
        analyzed.ok,
        "cross-unit analysis failed:\n{}",
        analyzed.diag.printer().render()
    );

    let double = analyzed.names.get("DOUBLE").unwrap();
    assert_eq!(
        analyzed.analysis.symbols[&double].ty,
        Some(analyzed.types.basic_type(Primitive::Int))
    );
}
