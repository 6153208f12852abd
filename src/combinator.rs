//! Single-child transforms: `map`, `tag`, `discard`, `concat`,
//! `error_message`, `lookahead` (§4.2).

use crate::{sequence, ParseTree, Parser, Shape, Value};

/// Transforms `p`'s value with `func`, leaving tag and position untouched
/// (§4.2). The escape hatch for grammars that need an arbitrary output type
/// (see [`Value::Custom`]) rather than the closed leaf/list/tree
/// vocabulary.
#[track_caller]
pub fn map<F>(p: Parser, func: F) -> Parser
where
    F: for<'s> Fn(Value<'s>) -> Value<'s> + 'static,
{
    let name: std::rc::Rc<str> = format!("map({})", p.name()).into();
    Parser::build(name, Shape::Plain, move |state, input| {
        let result = p.call(state, input)?;
        Ok(ParseTree::new(func(result.value), result.tag, result.position))
    })
}

/// Tags `p`'s result with `new_tag`. If `p`'s result already carries a tag,
/// the whole previous triple is nested under [`Value::Tree`] rather than
/// overwritten, so a chain of `.tag(...)` calls builds up nested tagged
/// subtrees instead of losing the earlier tag (§4.2).
#[track_caller]
pub fn tag(p: Parser, new_tag: &'static str) -> Parser {
    let name: std::rc::Rc<str> = format!("tag({}, {new_tag:?})", p.name()).into();
    Parser::build(name, Shape::Plain, move |state, input| {
        let result = p.call(state, input)?;
        let value = if result.tag.is_some() {
            Value::Tree(Box::new(result.clone()))
        } else {
            result.value
        };
        Ok(ParseTree::new(value, Some(new_tag), result.position))
    })
}

/// Runs `p` for its position effect only, replacing its value with
/// [`Value::Discarded`] so an enclosing `seq` omits it from the composite
/// result (§3, §4.2).
#[track_caller]
pub fn discard(p: Parser) -> Parser {
    let name: std::rc::Rc<str> = format!("discard({})", p.name()).into();
    Parser::build(name, Shape::Discard(Box::new(p.clone())), move |state, input| {
        let result = p.call(state, input)?;
        Ok(ParseTree::new(Value::Discarded, None, result.position))
    })
}

/// Runs `parsers` in sequence like [`sequence::seq`], but a child whose own
/// result is sequence-shaped has its list of results spliced into the
/// output list in place of a single nested entry (§4.2). Used to keep a
/// grammar's result lists flat when one rule is built out of several
/// smaller `seq`s that should read as one level, not a tree of singleton
/// lists.
#[track_caller]
pub fn concat(parsers: Vec<Parser>) -> Parser {
    sequence::concat(parsers)
}

/// Runs `p`; on failure, overrides the error's message with `message`,
/// leaving `expected` and `position` as `p` reported them (§4.2).
#[track_caller]
pub fn error_message(p: Parser, message: impl Into<std::rc::Rc<str>>) -> Parser {
    let message = message.into();
    let name: std::rc::Rc<str> = format!("error_message({}, {message:?})", p.name()).into();
    Parser::build(name, Shape::Plain, move |state, input| {
        p.call(state, input).map_err(|mut err| {
            err.set_message(message.clone());
            err
        })
    })
}

/// Runs `p`, then peeks that `following` would also succeed immediately
/// after, without consuming it. `p`'s result and position are returned
/// unchanged; `following` is a pure guard (§4.2).
#[track_caller]
pub fn lookahead(p: Parser, following: Parser) -> Parser {
    let name: std::rc::Rc<str> = format!("lookahead({}, {})", p.name(), following.name()).into();
    Parser::build(name, Shape::Plain, move |state, input| {
        let result = p.call(state, input)?;
        following.call(&result, input)?;
        Ok(result)
    })
}
