//! A pre-lexed token stream primitive (§9, stated for completeness, not
//! exercised by this crate's own grammars).
//!
//! Every other primitive in this crate parses `&str`. `token` is different:
//! it matches against an already-tokenized `&[ParseTree<'static>]`, for a
//! grammar built in two passes (lex into tags, then parse the tag stream).
//! Its `ParseFn` is over tokens rather than bytes, so it does not compose
//! with [`Parser`](crate::Parser) directly; it is a small, self-contained
//! entry point rather than a reason to generalize the whole engine over an
//! input trait it otherwise never needs.

use std::rc::Rc;

use crate::error::expected_parser;
use crate::{ParseError, ParseTree};

/// The state threaded through a token-stream parse: how many tokens have
/// been consumed so far.
#[derive(Clone, Copy, Debug)]
pub struct TokenState {
    pub position: usize,
}

impl TokenState {
    pub fn start() -> Self {
        TokenState { position: 0 }
    }
}

type TokenParseFn = dyn Fn(TokenState, &[ParseTree<'static>]) -> Result<(TokenState, ParseTree<'static>), ParseError>;

/// A parser over a slice of already-produced [`ParseTree`]s rather than
/// over `&str`.
#[derive(Clone)]
pub struct TokenParser {
    name: Rc<str>,
    func: Rc<TokenParseFn>,
}

impl TokenParser {
    pub fn parse(&self, tokens: &[ParseTree<'static>]) -> Result<ParseTree<'static>, ParseError> {
        (self.func)(TokenState::start(), tokens).map(|(_, tree)| tree)
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Matches one token against `expected_tag`: compares the token's own `tag`
/// first, falling back to comparing its value (as text) against
/// `expected_tag` when the token carries no tag (`yapcl.combinators.token`).
pub fn token(expected_tag: &'static str) -> TokenParser {
    let name: Rc<str> = format!("token({expected_tag:?})").into();
    TokenParser {
        name: name.clone(),
        func: Rc::new(move |state, tokens| match tokens.get(state.position) {
            Some(tree) if tree.tag == Some(expected_tag) => Ok((
                TokenState {
                    position: state.position + 1,
                },
                tree.clone(),
            )),
            Some(tree) if tree.tag.is_none() && tree.value.as_text() == Some(expected_tag) => Ok((
                TokenState {
                    position: state.position + 1,
                },
                tree.clone(),
            )),
            _ => Err(expected_parser(name.clone(), state.position)),
        }),
    }
}
