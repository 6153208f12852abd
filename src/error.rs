use std::error::Error;
use std::fmt::{self, Display};
use std::rc::Rc;

use smallvec::{smallvec, SmallVec};

/// What a failing parser expected, either a single descriptor or the
/// ordered sub-failures of an `either` that exhausted every alternative
/// (§3). A `SmallVec` keeps the common case of two or three alternatives
/// from allocating, the same reasoning the teacher crate applies to its
/// error location stack.
#[derive(Clone, Debug)]
pub enum Expected {
    Named(Rc<str>),
    OneOf(SmallVec<[Expected; 2]>),
}

impl Expected {
    pub fn named(name: impl Into<Rc<str>>) -> Self {
        Expected::Named(name.into())
    }

    pub fn one_of(alternatives: impl IntoIterator<Item = Expected>) -> Self {
        Expected::OneOf(alternatives.into_iter().collect())
    }
}

impl Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Named(name) => f.write_str(name),
            Expected::OneOf(alts) => {
                let mut first = true;
                for alt in alts {
                    if !first {
                        f.write_str(" or ")?;
                    }
                    first = false;
                    write!(f, "{alt}")?;
                }
                Ok(())
            }
        }
    }
}

/// The single parser-error kind from §6/§7. Recoverable: caught by
/// `either` and by `many`/`sepby`/`leftassoc` once their minimum count is
/// satisfied.
#[derive(Clone, Debug)]
pub struct ParseError {
    pub expected: Expected,
    pub position: usize,
    pub message: Option<Rc<str>>,
}

impl ParseError {
    pub fn new(expected: Expected, position: usize) -> Self {
        ParseError {
            expected,
            position,
            message: None,
        }
    }

    pub fn with_message(expected: Expected, position: usize, message: impl Into<Rc<str>>) -> Self {
        ParseError {
            expected,
            position,
            message: Some(message.into()),
        }
    }

    /// Attaches a message, overriding any previously attached one. Used by
    /// `error_message` (§4.2), which transparently forwards its child's
    /// result and only touches the error path.
    pub fn set_message(&mut self, message: impl Into<Rc<str>>) {
        self.message = Some(message.into());
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(message) = &self.message {
            write!(f, "{message}\nat index {}", self.position)
        } else {
            write!(f, "expected {} at index {}", self.expected, self.position)
        }
    }
}

impl Error for ParseError {}

/// Convenience constructor mirroring the common single-alternative case,
/// kept as a free function since almost every primitive needs exactly this.
pub fn expected_parser(name: impl Into<Rc<str>>, position: usize) -> ParseError {
    ParseError::new(Expected::Named(name.into()), position)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn display_without_message() {
        let err = expected_parser("lit(\"a\")", 3);
        assert_eq!(err.to_string(), "expected lit(\"a\") at index 3");
    }

    #[test]
    fn display_with_message() {
        let mut err = expected_parser("eof", 2);
        err.set_message("unexpected token");
        assert_eq!(err.to_string(), "unexpected token\nat index 2");
    }

    #[test]
    fn one_of_joins_alternatives() {
        let err = ParseError::new(
            Expected::one_of(vec![Expected::named("a"), Expected::named("b")]),
            0,
        );
        assert_eq!(err.to_string(), "expected a or b at index 0");
    }

    #[test]
    fn one_of_is_a_smallvec_not_boxed_individually() {
        // two alternatives should not spill to the heap
        let alts: SmallVec<[Expected; 2]> = smallvec![Expected::named("a"), Expected::named("b")];
        assert!(!alts.spilled());
    }
}
