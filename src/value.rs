//! The result triple shared by every parser: `(value, tag, position)`.
//!
//! A single type serves double duty as both the "incoming state" threaded
//! into a child parse and the "result" handed back out, exactly as in the
//! source this crate generalizes: a sequencing combinator reads `position`
//! out of whatever triple it was given and writes a new triple when it's
//! done, without caring whether that triple came from `ParseTree::start()`
//! or from the previous child's result.

use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;

/// A value produced by [`map`](crate::combinator::map) that doesn't fit the
/// closed leaf/list/tree vocabulary below. Implemented for any `Debug + 'static`
/// type via the blanket impl, so `.map(|v| ...)` can return arbitrary data
/// (an integer, a small struct) the way the dynamically typed source allows.
pub trait CustomValue {
    fn as_any(&self) -> &dyn Any;

    /// Forwards to the concrete type's own `Debug` impl. `dyn CustomValue`
    /// can't inherit that impl automatically (a trait object doesn't carry
    /// its supertrait's vtable slot), so this method does the forwarding
    /// the blanket impl below fills in for every concrete type.
    fn fmt_debug(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

impl<T: fmt::Debug + 'static> CustomValue for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn fmt_debug(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl fmt::Debug for dyn CustomValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_debug(f)
    }
}

/// The value carried by a [`ParseTree`].
///
/// Mirrors §3's "one of: a string, Discarded, another triple, or an ordered
/// sequence of triples", plus [`Value::Custom`] for `map`'s arbitrary output
/// and [`Value::Unit`] for parsers (`eof`, the initial state) that carry no
/// meaningful payload.
#[derive(Clone, Debug)]
pub enum Value<'a> {
    /// Text consumed by a primitive. Borrowed from the input when possible;
    /// owned when reconstructed from a cache entry (see `cache.rs`).
    Text(Cow<'a, str>),
    /// The ordered children of a `seq`/`concat`/`many`/`sepby` result.
    List(Vec<ParseTree<'a>>),
    /// A nested triple, produced by [`tag`](crate::combinator::tag) wrapping
    /// an already-tagged child.
    Tree(Box<ParseTree<'a>>),
    /// The sentinel meaning "omit from an enclosing composite, keep the
    /// position advance" (§3, invariant 3: never escapes `parse`).
    Discarded,
    /// No payload (e.g. `eof`, the parser's starting state).
    Unit,
    /// An arbitrary value produced by `map`.
    Custom(Rc<dyn CustomValue>),
}

impl<'a> Value<'a> {
    pub fn text(s: impl Into<Cow<'a, str>>) -> Self {
        Value::Text(s.into())
    }

    pub fn custom<T: fmt::Debug + 'static>(value: T) -> Self {
        Value::Custom(Rc::new(value))
    }

    pub fn is_discarded(&self) -> bool {
        matches!(self, Value::Discarded)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_ref()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ParseTree<'a>]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Converts borrowed text anywhere in this value into owned text, so the
    /// result no longer depends on the `'a` it was built with. Used by the
    /// cache to store entries that outlive any single `parse` call's input.
    pub fn into_owned(self) -> Value<'static> {
        match self {
            Value::Text(s) => Value::Text(Cow::Owned(s.into_owned())),
            Value::List(items) => Value::List(items.into_iter().map(ParseTree::into_owned).collect()),
            Value::Tree(t) => Value::Tree(Box::new(t.into_owned())),
            Value::Discarded => Value::Discarded,
            Value::Unit => Value::Unit,
            Value::Custom(c) => Value::Custom(c),
        }
    }
}

/// The result triple `(value, tag, position)` from §3.
///
/// `tag` discriminates a subtree for later interpretation; `position` is the
/// input index immediately past the last consumed character and is
/// monotonically non-decreasing along any successful parse path (§3,
/// invariant 1).
#[derive(Clone, Debug)]
pub struct ParseTree<'a> {
    pub value: Value<'a>,
    pub tag: Option<&'static str>,
    pub position: usize,
}

impl<'a> ParseTree<'a> {
    /// The state a top-level parse begins with: `(None, None, 0)`.
    pub fn start() -> Self {
        ParseTree {
            value: Value::Unit,
            tag: None,
            position: 0,
        }
    }

    pub fn new(value: Value<'a>, tag: Option<&'static str>, position: usize) -> Self {
        ParseTree { value, tag, position }
    }

    pub fn is_discarded(&self) -> bool {
        self.value.is_discarded()
    }

    pub fn into_owned(self) -> ParseTree<'static> {
        ParseTree {
            value: self.value.into_owned(),
            tag: self.tag,
            position: self.position,
        }
    }
}
