//! Sequencing: run parsers one after another, threading position forward.

use crate::{context, IntoParser, ParseTree, Parser, Shape, Value};

/// Runs `parsers` in order against the same input, skipping whatever the
/// active [`context::ignore`] scope names before each element, and
/// collecting the non-[`Discarded`](Value::Discarded) results into a
/// [`Value::List`] (§4.2). Fails on the first child that fails.
///
/// `a + b` on two already-built parsers calls this; extending an existing
/// plain `seq` with another `+` appends rather than nesting (see the `Add`
/// impl on [`Parser`](crate::Parser)).
#[track_caller]
pub fn seq(parsers: impl IntoIterator<Item = impl IntoParser>) -> Parser {
    seq_with(parsers.into_iter().map(IntoParser::into_parser).collect(), None, false)
}

/// Like [`seq`], but the result is child `index`'s value and tag alone
/// (unwrapped from the list the plain form would have built), position
/// still threaded through the whole sequence (§4.2's `capture` option). A
/// missing index (out of range, or discarded away) captures `Value::Unit`
/// with no tag rather than failing the parse.
#[track_caller]
pub fn seq_capture(parsers: impl IntoIterator<Item = impl IntoParser>, index: usize) -> Parser {
    seq_with(
        parsers.into_iter().map(IntoParser::into_parser).collect(),
        Some(index),
        false,
    )
}

#[track_caller]
pub(crate) fn seq_with(children: Vec<Parser>, capture: Option<usize>, auto_capture: bool) -> Parser {
    seq_impl("seq", children, capture, auto_capture, false)
}

/// Shared engine for `seq` and [`concat`](crate::combinator::concat): runs
/// `children` in order, skipping the active ignore parser before each child
/// and once more after the last (§4.5), then assembles the surviving
/// (non-[`Discarded`](Value::Discarded)) results into the final value.
///
/// When `flatten` is set, a child whose *source* is statically
/// sequence-shaped (built as a `seq`/`concat`, i.e. `Shape::Seq`) has its
/// list spliced into the output in place of a single nested entry, the
/// distinction between `concat` and `seq` from §4.2. This is decided by the
/// child parser's own shape, not by the value it happens to return: an
/// `either` child that returns a `Value::List` result (because one of its
/// alternatives is itself a `seq`) is not sequence-shaped and stays nested.
#[track_caller]
fn seq_impl(label: &str, children: Vec<Parser>, capture: Option<usize>, auto_capture: bool, flatten: bool) -> Parser {
    assert!(!children.is_empty(), "{label}() requires at least one element");
    let name: std::rc::Rc<str> = format!(
        "{label}({})",
        children.iter().map(|p| p.name().to_string()).collect::<Vec<_>>().join(", ")
    )
    .into();
    let shape_children = children.clone();
    Parser::build(
        name,
        Shape::Seq {
            children: shape_children,
            capture,
            auto_capture,
        },
        move |state, input| {
            let mut cursor = state.clone();
            let mut results: Vec<ParseTree> = Vec::with_capacity(children.len());
            for child in &children {
                context::skip_ignore(&mut cursor, input);
                let next = child.call(&cursor, input)?;
                cursor = next.clone();
                if flatten && matches!(&*child.shape, Shape::Seq { .. }) {
                    if let Value::List(items) = &next.value {
                        results.extend(items.iter().cloned().filter(|r| !r.is_discarded()));
                        continue;
                    }
                }
                results.push(next);
            }
            context::skip_ignore(&mut cursor, input);
            let results: Vec<ParseTree> = results.into_iter().filter(|r| !r.is_discarded()).collect();
            if let Some(index) = capture {
                return Ok(match results.get(index) {
                    Some(tree) => ParseTree::new(tree.value.clone(), tree.tag, cursor.position),
                    None => ParseTree::new(Value::Unit, None, cursor.position),
                });
            }
            if auto_capture && results.len() == 1 {
                // `>>`/`<<` chains are meant to feel like "this sequence IS
                // its one surviving child", tag included, not a fresh
                // untagged node wrapping that child's value.
                let mut only = results.into_iter().next().unwrap();
                only.position = cursor.position;
                return Ok(only);
            }
            Ok(ParseTree::new(Value::List(results), None, cursor.position))
        },
    )
}

/// Like [`seq`] but children whose own source is sequence-shaped have their
/// result lists spliced into the output list rather than nested (§4.2).
#[track_caller]
pub(crate) fn concat(children: Vec<Parser>) -> Parser {
    seq_impl("concat", children, None, false, true)
}
