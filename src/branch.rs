//! Alternation: try each parser in order, keep the first success.

use crate::error::Expected;
use crate::{ParseError, Parser, Shape};

/// Tries each of `parsers` in order against the same incoming state,
/// returning the first success (§4.2, §8 "Either left-bias": a success at
/// position `i` is unaffected by any later alternative). If every
/// alternative fails, the reported error folds every alternative's
/// expectation into a single [`Expected::OneOf`] (listed order preserved)
/// and is raised at the starting position, per §4.2 and §7, not at
/// whichever alternative consumed the most input, since alternatives run
/// from the same start state and none of them is "more correct" than
/// another once all have failed.
///
/// `a | b` on two already-built parsers calls this; extending an existing
/// `either` with another `|` flattens into one `either` rather than
/// nesting (see the `BitOr` impl on [`Parser`](crate::Parser)).
#[track_caller]
pub fn either(parsers: impl IntoIterator<Item = Parser>) -> Parser {
    let parsers: Vec<Parser> = parsers.into_iter().collect();
    assert!(!parsers.is_empty(), "either() requires at least one alternative");
    let name: std::rc::Rc<str> = format!(
        "either({})",
        parsers.iter().map(|p| p.name().to_string()).collect::<Vec<_>>().join(", ")
    )
    .into();
    let children = parsers.clone();
    Parser::build(name, Shape::Either(children), move |state, input| {
        for parser in &parsers {
            if let Ok(result) = parser.call(state, input) {
                return Ok(result);
            }
        }
        Err(ParseError::new(
            Expected::one_of(parsers.iter().map(|p| Expected::named(p.name().to_string()))),
            state.position,
        ))
    })
}
