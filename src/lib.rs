//! > Tagparse. A parser combinator library built around a single tagged
//! > result triple.
//!
//! Every parser is a value wrapping a pure function from `(state, input)` to
//! `state`, where `state` is the triple `(value, tag, position)` described in
//! the crate's design notes. Parsers compose by constructing new parsers:
//! [`seq`](sequence::seq) and [`either`](branch::either) for sequencing and
//! alternation, [`many`]/[`sepby`]/[`leftassoc`](repeat) for repetition, and
//! the small transforms in [`combinator`] for mapping, tagging, and
//! discarding results.
//!
//! Two cross-cutting facilities live alongside the algebra: a
//! per-construction-scope [`cache`] that memoizes parser calls to tame
//! exponential backtracking in recursive grammars, and an ambient
//! [`context`] that lets a grammar declare "memoize parsers built in this
//! block" once for every parser built under it, or "skip this whitespace
//! between tokens" for every `seq` that runs while the scope is active.
//!
//! Grammars that refer to themselves (a factor that refers to a value that
//! refers to a parenthesized term that refers back to a factor) are tied
//! together with a [`RecursionContainer`](recursion::RecursionContainer)
//! instead of forward declarations.

pub mod branch;
pub mod cache;
pub mod combinator;
pub mod context;
pub mod debug;
pub mod error;
pub mod primitives;
pub mod recursion;
pub mod repeat;
pub mod sequence;
pub mod token;
pub mod util;
pub mod value;

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

pub use error::{Expected, ParseError};
pub use value::{CustomValue, ParseTree, Value};

pub use branch::either;
pub use combinator::{concat, discard, error_message, lookahead, map, tag};
pub use primitives::{copy_last, eof, fail, lit, regex, success};
pub use recursion::RecursionContainer;
pub use repeat::{leftassoc, many, sepby};
pub use sequence::{seq, seq_capture};

/// A stable, process-wide identity assigned to a parser at construction
/// time. The cache uses this (together with input identity and incoming
/// position) to key memoized calls; two `Parser` values are "the same
/// parser" for caching purposes iff they share an id.
pub type ParserId = u64;

fn next_parser_id() -> ParserId {
    static NEXT: AtomicU64 = AtomicU64::new(1);
    NEXT.fetch_add(1, Ordering::Relaxed)
}

/// The function a [`Parser`] wraps: given the incoming state and the whole
/// input, produce the outgoing state or fail. Quantified over every
/// possible input lifetime `'s` so that a `Parser` value itself carries no
/// lifetime and can be built once, stored in a [`RecursionContainer`], and
/// reused across many calls to [`Parser::parse`] with different inputs.
pub type ParseFn = dyn for<'s> Fn(&ParseTree<'s>, &'s str) -> Result<ParseTree<'s>, ParseError>;

/// The sub-variants of the tagged parser union used to let a handful of
/// combinators extend their own algebraic operators at the instance level
/// (§"Per-parser method overrides" in the design notes), without runtime
/// monkey-patching: `either(a, b) | c` flattens into a three-way `either`
/// rather than nesting, and similarly for `seq`'s `+`/`>>`/`<<`.
#[derive(Clone)]
pub(crate) enum Shape {
    Plain,
    Either(Vec<Parser>),
    Seq {
        children: Vec<Parser>,
        capture: Option<usize>,
        auto_capture: bool,
    },
    Discard(Box<Parser>),
}

/// A parser: an opaque value wrapping a pure function `(state, input) ->
/// state`, plus a display name and a stable identity (§3). Cloning a
/// `Parser` is cheap (an `Rc` clone); all combinators return new `Parser`
/// values rather than mutating their children.
#[derive(Clone)]
pub struct Parser {
    id: ParserId,
    name: Rc<str>,
    pub(crate) shape: Rc<Shape>,
    func: Rc<ParseFn>,
}

impl fmt::Debug for Parser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl fmt::Display for Parser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl Parser {
    /// Builds a new parser from its raw parsing function. This is the one
    /// place construction-time ambient context is applied: if a `trace()`
    /// scope is active and this call site lies in the traced file, the
    /// function is wrapped by the registered [`debug::TraceHook`] first;
    /// the result is then wrapped by the active `cache_size` scope's cache,
    /// if any (§4.3, caching sits outside tracing, so a cache hit skips
    /// the hook entirely).
    #[track_caller]
    pub(crate) fn build<F>(name: impl Into<Rc<str>>, shape: Shape, func: F) -> Parser
    where
        F: for<'s> Fn(&ParseTree<'s>, &'s str) -> Result<ParseTree<'s>, ParseError> + 'static,
    {
        let id = next_parser_id();
        let name = name.into();
        let traced: Rc<ParseFn> = debug::wrap_if_traced(id, name.clone(), Rc::new(func));
        let cached = cache::wrap_if_cached(id, traced);
        Parser {
            id,
            name,
            shape: Rc::new(shape),
            func: cached,
        }
    }

    pub fn id(&self) -> ParserId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn call<'s>(&self, state: &ParseTree<'s>, input: &'s str) -> Result<ParseTree<'s>, ParseError> {
        (self.func)(state, input)
    }

    /// Top-level entry point (§6): parses `input` from the start and
    /// returns the result triple or a [`ParseError`].
    pub fn parse<'s>(&self, input: &'s str) -> Result<ParseTree<'s>, ParseError> {
        self.call(&ParseTree::start(), input)
    }

    /// `a == t` in the source's DSL: tags `a`'s result with `t`, wrapping an
    /// already-tagged result instead of overwriting it (§4.2).
    pub fn tag(&self, new_tag: &'static str) -> Parser {
        combinator::tag(self.clone(), new_tag)
    }

    pub fn map<F>(&self, func: F) -> Parser
    where
        F: for<'s> Fn(Value<'s>) -> Value<'s> + 'static,
    {
        combinator::map(self.clone(), func)
    }

    /// `discard(should_discard)`: when `should_discard` is true, runs this
    /// parser for its position effect only. Calling `.discard(true)` again
    /// on an already-discarded parser is a no-op (idempotent), and
    /// `.discard(false)` reveals the original parser, the one runtime
    /// "override" the source's `Parser.discard` method performs.
    pub fn discard(&self, should_discard: bool) -> Parser {
        match (&*self.shape, should_discard) {
            (Shape::Discard(_), true) => self.clone(),
            (Shape::Discard(inner), false) => (**inner).clone(),
            (_, true) => combinator::discard(self.clone()),
            (_, false) => self.clone(),
        }
    }

    pub fn concat(&self, other: impl IntoParser) -> Parser {
        combinator::concat(vec![self.clone(), other.into_parser()])
    }

    pub fn many(&self, min: usize, max: usize) -> Parser {
        repeat::many(self.clone(), min, max)
    }

    pub fn repeat(&self, count: usize) -> Parser {
        repeat::many(self.clone(), count, count)
    }

    pub fn sepby(&self, separator: impl IntoParser) -> Parser {
        repeat::sepby(self.clone(), separator.into_parser(), 0, usize::MAX)
    }

    pub fn sepby_bounded(&self, separator: impl IntoParser, min: usize, max: usize) -> Parser {
        repeat::sepby(self.clone(), separator.into_parser(), min, max)
    }

    /// `a[p]` in the source's DSL: builds a left-leaning tree out of
    /// repeated applications of `p` after one application of `a` (§4.2).
    pub fn fold(&self, tail: impl IntoParser) -> Parser {
        repeat::leftassoc(self.clone(), tail.into_parser(), 0, usize::MAX)
    }

    /// `a[p, q, ...]`: folds over whichever of several tail parsers
    /// matches at each step.
    pub fn fold_any(&self, tails: impl IntoIterator<Item = Parser>) -> Parser {
        repeat::leftassoc(self.clone(), branch::either(tails), 0, usize::MAX)
    }

    pub fn ahead(&self, other: impl IntoParser) -> Parser {
        combinator::lookahead(self.clone(), other.into_parser())
    }

    pub fn error_message(&self, message: impl Into<Rc<str>>) -> Parser {
        combinator::error_message(self.clone(), message)
    }

    pub fn deep_join(&self) -> Parser {
        util::deep_join(self.clone())
    }
}

impl std::ops::Add<Parser> for Parser {
    type Output = Parser;

    /// `a + b`: `seq(a, b)`. Extending an existing plain `seq` appends
    /// rather than nesting, the same flattening the source's
    /// `sequence_parser.__add__` override performs.
    fn add(self, rhs: Parser) -> Parser {
        if let Shape::Seq {
            children,
            capture: None,
            auto_capture,
        } = &*self.shape
        {
            let mut children = children.clone();
            children.push(rhs);
            return sequence::seq_with(children, None, *auto_capture);
        }
        sequence::seq(vec![self, rhs])
    }
}

impl std::ops::Add<&str> for Parser {
    type Output = Parser;

    fn add(self, rhs: &str) -> Parser {
        self + primitives::lit(rhs)
    }
}

impl std::ops::BitOr<Parser> for Parser {
    type Output = Parser;

    /// `a | b`: `either(a, b)`, flattening an existing `either` (the
    /// source's `either_parser.__or__` override).
    fn bitor(self, rhs: Parser) -> Parser {
        if let Shape::Either(alternatives) = &*self.shape {
            let mut alternatives = alternatives.clone();
            alternatives.push(rhs);
            return branch::either(alternatives);
        }
        branch::either(vec![self, rhs])
    }
}

impl std::ops::BitOr<&str> for Parser {
    type Output = Parser;

    fn bitor(self, rhs: &str) -> Parser {
        self | primitives::lit(rhs)
    }
}

impl std::ops::Shr<Parser> for Parser {
    type Output = Parser;

    /// `a >> b`: discard `a`'s result, keep `b`'s. Extending an existing
    /// `seq` discards its last child and appends `b`, matching the
    /// source's `sequence_parser.__rshift__` override.
    fn shr(self, rhs: Parser) -> Parser {
        if let Shape::Seq {
            children,
            capture: None,
            ..
        } = &*self.shape
        {
            if let Some((last, rest)) = children.split_last() {
                let mut children = rest.to_vec();
                children.push(last.clone().discard(true));
                children.push(rhs);
                return sequence::seq_with(children, None, true);
            }
        }
        sequence::seq_with(vec![self.discard(true), rhs], None, true)
    }
}

impl std::ops::Shr<&str> for Parser {
    type Output = Parser;

    fn shr(self, rhs: &str) -> Parser {
        self >> primitives::lit(rhs)
    }
}

impl std::ops::Shl<Parser> for Parser {
    type Output = Parser;

    /// `a << b`: keep `a`'s result, discard `b`'s.
    fn shl(self, rhs: Parser) -> Parser {
        if let Shape::Seq {
            children,
            capture: None,
            ..
        } = &*self.shape
        {
            let mut children = children.clone();
            children.push(rhs.discard(true));
            return sequence::seq_with(children, None, true);
        }
        sequence::seq_with(vec![self, rhs.discard(true)], None, true)
    }
}

impl std::ops::Shl<&str> for Parser {
    type Output = Parser;

    fn shl(self, rhs: &str) -> Parser {
        self << primitives::lit(rhs)
    }
}

/// Converts a DSL-surface value (a literal string or an already-built
/// `Parser`) into a `Parser`, the way the source's `_make_parser` does for
/// string literals appearing inside `seq`/`either`/operators.
pub trait IntoParser {
    fn into_parser(self) -> Parser;
}

impl IntoParser for Parser {
    fn into_parser(self) -> Parser {
        self
    }
}

impl IntoParser for &Parser {
    fn into_parser(self) -> Parser {
        self.clone()
    }
}

impl IntoParser for &str {
    fn into_parser(self) -> Parser {
        primitives::lit(self)
    }
}

impl IntoParser for String {
    fn into_parser(self) -> Parser {
        primitives::lit(&self)
    }
}
