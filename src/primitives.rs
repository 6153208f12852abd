//! Leaf parsers: the combinators in [`branch`], [`sequence`], [`repeat`],
//! and [`combinator`] all eventually bottom out in one of these.

use std::borrow::Cow;

use regex::Regex;

use crate::error::{expected_parser, Expected};
use crate::{ParseError, ParseTree, Parser, Shape, Value};

/// Matches the compiled `pattern` anchored at the current position,
/// consuming the match and producing its text (§4.1). The pattern is
/// compiled once, at construction time; an invalid pattern is a programmer
/// error and panics immediately rather than surfacing as a `ParseError`.
#[track_caller]
pub fn regex(pattern: &str) -> Parser {
    let anchored = Regex::new(&format!("\\A(?:{pattern})")).expect("invalid regex pattern passed to regex()");
    let name: std::rc::Rc<str> = format!("regex({pattern:?})").into();
    Parser::build(name.clone(), Shape::Plain, move |state, input| {
        let rest = &input[state.position..];
        match anchored.find(rest) {
            Some(m) => Ok(ParseTree::new(
                Value::Text(Cow::Borrowed(m.as_str())),
                None,
                state.position + m.end(),
            )),
            None => Err(expected_parser(name.clone(), state.position)),
        }
    })
}

/// Matches `text` verbatim at the current position (§4.1).
#[track_caller]
pub fn lit(text: &str) -> Parser {
    let text = text.to_owned();
    let name: std::rc::Rc<str> = format!("lit({text:?})").into();
    Parser::build(name.clone(), Shape::Plain, move |state, input| {
        let rest = &input[state.position..];
        if rest.starts_with(text.as_str()) {
            Ok(ParseTree::new(
                Value::Text(Cow::Borrowed(&input[state.position..state.position + text.len()])),
                None,
                state.position + text.len(),
            ))
        } else {
            Err(expected_parser(name.clone(), state.position))
        }
    })
}

/// Succeeds only at the end of input, producing no value (§4.1).
#[track_caller]
pub fn eof() -> Parser {
    Parser::build("eof", Shape::Plain, |state, input| {
        if state.position >= input.len() {
            Ok(ParseTree::new(Value::Unit, None, state.position))
        } else {
            Err(expected_parser("eof", state.position))
        }
    })
}

/// Always succeeds without consuming input, replacing the value and tag
/// with `value`/`tag` (§4.1). Distinct from [`copy_last`], which forwards
/// whatever was already threaded in.
#[track_caller]
pub fn success(value: Value<'static>, tag: Option<&'static str>) -> Parser {
    Parser::build("success", Shape::Plain, move |state, _input| {
        Ok(ParseTree::new(value.clone(), tag, state.position))
    })
}

/// Always fails, reporting `expected` as what was wanted (§4.1).
#[track_caller]
pub fn fail(expected: impl Into<String>) -> Parser {
    let expected = expected.into();
    Parser::build("fail", Shape::Plain, move |state, _input| {
        Err(ParseError::new(Expected::named(expected.clone()), state.position))
    })
}

/// Succeeds immediately, returning the incoming state unchanged. An
/// explicit no-op distinct from [`success`], which resets value and tag
/// (`yapcl.combinators.copy_last`).
#[track_caller]
pub fn copy_last() -> Parser {
    Parser::build("copy_last", Shape::Plain, |state, _input| Ok(state.clone()))
}
