use rill_core::Diagnostics;

use super::emit::EmitError;
use super::generate;

fn generate_ok(source: &str) -> super::GeneratedParser {
    let mut diag = Diagnostics::new();
    generate(source, &mut diag).expect("generation succeeds")
}

#[test]
fn token_file_enumerates_literals_then_regexes() {
    let generated = generate_ok("list -> item ( ',' item ) * ;\nitem -> /[a-z]+/ -> 'nil' ;");

    insta::assert_snapshot!(generated.tokens_source, @r#"
    //! Token kinds and matcher. Generated by rill-peg, do not edit.

    use once_cell::sync::Lazy;
    use regex::Regex;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum TokenKind {
        Tok000,
        Tok001,
        Tok002,
    }

    static REGEXES: Lazy<Vec<Regex>> = Lazy::new(|| {
        vec![
            Regex::new("^(?:[a-z]+)").expect("generated pattern compiles"),
        ]
    });

    /// Longest match at the start of `input`.
    pub fn match_token(input: &str) -> Option<(TokenKind, usize)> {
        let mut best: Option<(TokenKind, usize)> = None;
        let literals = [
            (",", TokenKind::Tok000),
            ("nil", TokenKind::Tok001),
        ];
        for (text, kind) in literals {
            if input.starts_with(text) && best.is_none_or(|(_, len)| text.len() > len) {
                best = Some((kind, text.len()));
            }
        }
        let regex_kinds = [TokenKind::Tok002];
        for (re, kind) in REGEXES.iter().zip(regex_kinds) {
            if let Some(m) = re.find(input) {
                if best.is_none_or(|(_, len)| m.end() > len) {
                    best = Some((kind, m.end()));
                }
            }
        }
        best.filter(|&(_, len)| len > 0)
    }

    /// Whole-input tokenization, skipping whitespace. `None` on the first
    /// unmatchable byte.
    pub fn tokenize(source: &str) -> Option<Vec<TokenKind>> {
        let mut tokens = Vec::new();
        let mut rest = source.trim_start();
        while !rest.is_empty() {
            let (kind, len) = match_token(rest)?;
            tokens.push(kind);
            rest = rest[len..].trim_start();
        }
        Some(tokens)
    }
    "#);
}

#[test]
fn rule_file_has_one_parse_function_per_rule() {
    let generated = generate_ok("list -> item ( ',' item ) * ;\nitem -> /[a-z]+/ -> 'nil' ;");

    insta::assert_snapshot!(generated.rules_source, @r"
    //! Rule parsers. Generated by rill-peg, do not edit.

    use super::tokens::TokenKind;

    fn eat(tokens: &[TokenKind], pos: &mut usize, kind: TokenKind) -> bool {
        if tokens.get(*pos) == Some(&kind) {
            *pos += 1;
            true
        } else {
            false
        }
    }

    pub fn parse_list(tokens: &[TokenKind], pos: &mut usize) -> bool {
        let start = *pos;
        if list_part2(tokens, pos) {
            return true;
        }
        *pos = start;
        false
    }

    fn list_part0(tokens: &[TokenKind], pos: &mut usize) -> bool {
        let start = *pos;
        if !eat(tokens, pos, TokenKind::Tok000) {
            *pos = start;
            return false;
        }
        if !parse_item(tokens, pos) {
            *pos = start;
            return false;
        }
        true
    }

    fn list_part1(tokens: &[TokenKind], pos: &mut usize) -> bool {
        while list_part0(tokens, pos) {}
        true
    }

    fn list_part2(tokens: &[TokenKind], pos: &mut usize) -> bool {
        let start = *pos;
        if !parse_item(tokens, pos) {
            *pos = start;
            return false;
        }
        if !list_part1(tokens, pos) {
            *pos = start;
            return false;
        }
        true
    }

    pub fn parse_item(tokens: &[TokenKind], pos: &mut usize) -> bool {
        let start = *pos;
        if eat(tokens, pos, TokenKind::Tok002) {
            return true;
        }
        *pos = start;
        if eat(tokens, pos, TokenKind::Tok001) {
            return true;
        }
        *pos = start;
        false
    }
    ");
}

#[test]
fn choices_backtrack_between_options() {
    let generated = generate_ok("sign -> ( '+' | '-' ) /[0-9]+/ ;");

    assert!(generated.rules_source.contains("pub fn parse_sign"));
    // the choice helper tries each option from the same start
    assert!(generated.rules_source.contains("*pos = start;"));
    assert!(
        generated
            .rules_source
            .contains("eat(tokens, pos, TokenKind::Tok000)")
    );
}

#[test]
fn plus_requires_at_least_one_match() {
    let generated = generate_ok("digits -> /[0-9]/ + ;");
    assert!(generated.rules_source.contains("return false"));
    assert!(generated.rules_source.contains("while "));
}

#[test]
fn unknown_rule_references_fail_emission() {
    let mut diag = Diagnostics::new();
    let err = generate("a -> missing ;", &mut diag).unwrap_err();
    assert_eq!(
        err,
        super::Error::Emit(EmitError::UnknownRule("missing".to_owned()))
    );
}

#[test]
fn duplicate_rules_fail_emission() {
    let mut diag = Diagnostics::new();
    let err = generate("a -> 'x' ;\na -> 'y' ;", &mut diag).unwrap_err();
    assert_eq!(
        err,
        super::Error::Emit(EmitError::DuplicateRule("a".to_owned()))
    );
}

#[test]
fn syntax_errors_stop_before_emission() {
    let mut diag = Diagnostics::new();
    let err = generate("a -> ;", &mut diag).unwrap_err();
    assert_eq!(err, super::Error::Parse);
    assert!(diag.has_errors());
}
