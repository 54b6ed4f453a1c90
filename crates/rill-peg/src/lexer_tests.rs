use rill_core::Diagnostics;

use super::lexer::{PegTokenKind, scan};

fn kinds(source: &str) -> (Vec<PegTokenKind>, Diagnostics) {
    let mut diag = Diagnostics::new();
    let tokens = scan(source, &mut diag);
    (tokens.into_iter().map(|t| t.kind).collect(), diag)
}

#[test]
fn punctuation_and_operators() {
    let (tokens, diag) = kinds("-> | ( ) * + ? ;");
    assert!(!diag.has_errors());
    assert_eq!(
        tokens,
        [
            PegTokenKind::Arrow,
            PegTokenKind::Or,
            PegTokenKind::LParen,
            PegTokenKind::RParen,
            PegTokenKind::Star,
            PegTokenKind::Plus,
            PegTokenKind::Question,
            PegTokenKind::Semi,
            PegTokenKind::End,
        ]
    );
}

#[test]
fn atoms_carry_their_text() {
    let (tokens, diag) = kinds("rule 'let' /[a-z]+/");
    assert!(!diag.has_errors());
    assert_eq!(
        tokens,
        [
            PegTokenKind::Ident("rule".to_owned()),
            PegTokenKind::Str("let".to_owned()),
            PegTokenKind::Regex("[a-z]+".to_owned()),
            PegTokenKind::End,
        ]
    );
}

#[test]
fn comments_run_to_end_of_line() {
    let (tokens, diag) = kinds("# a comment\n=== section ===\nrule");
    assert!(!diag.has_errors());
    assert_eq!(
        tokens,
        [PegTokenKind::Ident("rule".to_owned()), PegTokenKind::End]
    );
}

#[test]
fn dangling_dash_gets_a_hint() {
    let (tokens, diag) = kinds("a - b");
    assert_eq!(diag.error_count(), 1);
    assert!(
        diag.iter()
            .any(|d| d.message().contains("did you mean '->'"))
    );
    // the scan continues past the bad character
    assert_eq!(tokens.len(), 3);
}

#[test]
fn bad_characters_are_reported_and_skipped() {
    let (tokens, diag) = kinds("a @ b");
    assert!(diag.has_errors());
    assert_eq!(
        tokens,
        [
            PegTokenKind::Ident("a".to_owned()),
            PegTokenKind::Ident("b".to_owned()),
            PegTokenKind::End,
        ]
    );
}
