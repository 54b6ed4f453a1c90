//! The type parser: a deterministic state machine over type elements.
//!
//! Reading order is outermost-first (`?[10]int` reads Opt, Arr, Name); the
//! collected elements are interned base-first so the chain roots at the base
//! and the returned [`TypeId`] is the outermost leaf. A bare name therefore
//! interns to the same id as the matching primitive.

use crate::lexer::TokenKind;
use crate::types::{Member, TypeId, TypeKind, VOID};

use super::Parser;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum TypeState {
    None,
    Opt,
    Res,
    Ptr,
    Arr,
    Func,
    Name,
    Struct,
    Sum,
}

impl TypeState {
    fn is_terminal(self) -> bool {
        matches!(
            self,
            TypeState::Func | TypeState::Name | TypeState::Struct | TypeState::Sum
        )
    }

    /// May the chain stop in this state? `Ptr` and `Arr` dangle.
    fn may_end(self) -> bool {
        !matches!(self, TypeState::Ptr | TypeState::Arr)
    }
}

/// The transition set of the machine.
fn allowed(from: TypeState, to: TypeState) -> bool {
    use TypeState::*;
    match from {
        None => matches!(to, Opt | Res | Ptr | Arr | Func | Name | Struct | Sum),
        Res => matches!(to, Opt | Ptr | Arr | Func | Name | Struct | Sum),
        Opt => matches!(to, Ptr | Arr | Func | Name | Struct | Sum),
        Ptr => matches!(to, Opt | Ptr | Arr | Func | Name | Struct | Sum),
        Arr => matches!(to, Opt | Ptr | Arr | Func | Name | Struct | Sum),
        Func | Name | Struct | Sum => false,
    }
}

impl Parser<'_> {
    /// Parses a type chain at the current position. `None` when no type is
    /// present (the next token is a terminator or not a type element).
    pub(crate) fn parse_type(&mut self) -> Option<TypeId> {
        let mut state = TypeState::None;
        let mut elements: Vec<TypeKind> = Vec::new();

        loop {
            let Some(next) = self.classify() else {
                break;
            };
            if !allowed(state, next) {
                self.error("disallowed type transition");
                return None;
            }

            let kind = self.type_element(next)?;
            elements.push(kind);
            state = next;

            if state.is_terminal() {
                break;
            }
        }

        if !state.may_end() {
            self.error("disallowed type transition");
            return None;
        }
        if elements.is_empty() {
            return None;
        }

        let mut parent = None;
        for kind in elements.into_iter().rev() {
            parent = Some(self.types.get_leaf(parent, kind));
        }
        parent
    }

    /// What element the current token begins, if any. Pure lookahead.
    fn classify(&self) -> Option<TypeState> {
        match self.current() {
            TokenKind::Question => Some(TypeState::Opt),
            TokenKind::Bang => Some(TypeState::Res),
            TokenKind::Star => Some(TypeState::Ptr),
            TokenKind::LBracket => Some(TypeState::Arr),
            TokenKind::LParen => Some(TypeState::Func),
            TokenKind::Struct => Some(TypeState::Struct),
            TokenKind::Sumtype => Some(TypeState::Sum),
            // `map[K,V]` is terminal like a name
            TokenKind::Ident(_) | TokenKind::Map => Some(TypeState::Name),
            _ => None,
        }
    }

    /// Consumes the tokens of one element and produces its leaf payload.
    fn type_element(&mut self, state: TypeState) -> Option<TypeKind> {
        match state {
            TypeState::Opt => {
                self.bump();
                Some(TypeKind::Opt)
            }
            TypeState::Res => {
                self.bump();
                Some(TypeKind::Err)
            }
            TypeState::Ptr => {
                self.bump();
                Some(TypeKind::Ptr)
            }
            TypeState::Arr => self.array_element(),
            TypeState::Func => self.fn_element(),
            TypeState::Name => match self.bump().kind {
                TokenKind::Ident(text) => Some(TypeKind::Name(self.names.intern(&text))),
                TokenKind::Map => self.map_element(),
                _ => unreachable!("classify checked the token"),
            },
            TypeState::Struct => {
                self.bump();
                Some(TypeKind::Struct(self.aggregate_members()?))
            }
            TypeState::Sum => {
                self.bump();
                Some(TypeKind::Union(self.aggregate_members()?))
            }
            TypeState::None => unreachable!("None is never an element"),
        }
    }

    /// `[N]` fixed, `[vec]` growable, `[]` slice.
    fn array_element(&mut self) -> Option<TypeKind> {
        self.bump(); // `[`

        let kind = match self.current() {
            TokenKind::RBracket => TypeKind::Slice,
            TokenKind::Vec => {
                self.bump();
                TypeKind::Vec
            }
            TokenKind::Int(size) => {
                let size = *size;
                self.bump();
                if size < 0 {
                    self.error("array size cannot be negative");
                    return None;
                }
                TypeKind::Arr(size as u64)
            }
            _ => {
                self.error("expected array size, 'vec', or ']'");
                return None;
            }
        };

        self.expect(&TokenKind::RBracket, "']'")
            .then_some(kind)
    }

    /// `'(' (type),* ')' ('->' type)?`
    fn fn_element(&mut self) -> Option<TypeKind> {
        self.bump(); // `(`

        let mut params = Vec::new();
        while !self.at(&TokenKind::RParen) && !self.at_eof() {
            match self.parse_type() {
                Some(ty) => params.push(ty),
                None => {
                    self.error("expected parameter type");
                    return None;
                }
            }
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen, "')'");

        let ret = if self.eat(&TokenKind::Arrow) {
            match self.parse_type() {
                Some(ty) => ty,
                None => {
                    self.error("expected return type after '->'");
                    VOID
                }
            }
        } else {
            VOID
        };

        Some(TypeKind::Fn { ret, params })
    }

    /// `map '[' type ',' type ']'`, already past `map`.
    fn map_element(&mut self) -> Option<TypeKind> {
        self.expect(&TokenKind::LBracket, "'['");
        let key = self.parse_type().or_else(|| {
            self.error("expected map key type");
            None
        })?;
        self.expect(&TokenKind::Comma, "','");
        let value = self.parse_type().or_else(|| {
            self.error("expected map value type");
            None
        })?;
        self.expect(&TokenKind::RBracket, "']'");
        Some(TypeKind::Map { key, value })
    }

    /// `'{' (IDENT ':' type ';'?)* '}'` - member order is declaration order.
    fn aggregate_members(&mut self) -> Option<Vec<Member>> {
        self.expect(&TokenKind::LBrace, "'{'");

        let mut members = Vec::new();
        while !self.at(&TokenKind::RBrace) && !self.at_eof() {
            if self.eat(&TokenKind::Semi) {
                continue;
            }

            let name = match self.bump().kind {
                TokenKind::Ident(text) => self.names.intern(&text),
                _ => {
                    self.error("expected member name");
                    self.sync_to_stmt_boundary();
                    continue;
                }
            };
            self.expect(&TokenKind::Colon, "':'");
            let Some(ty) = self.parse_type() else {
                self.error("expected member type");
                self.sync_to_stmt_boundary();
                continue;
            };
            members.push(Member { name, ty });
        }

        self.expect(&TokenKind::RBrace, "'}'");
        Some(members)
    }
}
