//! Repetition: `many`, `sepby`, and `leftassoc` (§4.2).

use crate::{context, ParseTree, Parser, Shape, Value};

/// Applies `p` between `min` and `max` times (inclusive), collecting the
/// non-discarded results into a [`Value::List`]. Fails with `p`'s last
/// error if fewer than `min` repetitions succeeded; otherwise stops at the
/// first failure (or at `max`) and succeeds with whatever was collected so
/// far, positioned just past the last successful repetition. The active
/// ignore parser (§4.5) runs before each attempt and once more after the
/// last.
#[track_caller]
pub fn many(p: Parser, min: usize, max: usize) -> Parser {
    let name: std::rc::Rc<str> = format!("many({}, {min}, {max})", p.name()).into();
    Parser::build(name, Shape::Plain, move |state, input| {
        let mut cursor = state.clone();
        let mut results = Vec::new();
        let mut count = 0;
        let mut last_err = None;
        while count < max {
            context::skip_ignore(&mut cursor, input);
            match p.call(&cursor, input) {
                Ok(next) => {
                    cursor = next.clone();
                    if !next.is_discarded() {
                        results.push(next);
                    }
                    count += 1;
                }
                Err(err) => {
                    last_err = Some(err);
                    break;
                }
            }
        }
        if count < min {
            return Err(last_err.unwrap_or_else(|| crate::error::expected_parser(p.name().to_string(), cursor.position)));
        }
        context::skip_ignore(&mut cursor, input);
        Ok(ParseTree::new(Value::List(results), None, cursor.position))
    })
}

/// Applies `p` separated by `separator`, between `min` and `max` times.
///
/// A trailing separator with no following `p` ends the repetition at the
/// last successful `p` without rewinding past the consumed separator. This
/// is the original implementation's actual behavior, not a bug fixed here:
/// once `min` repetitions are already satisfied, a separator match that
/// turns out to lead nowhere is simply absorbed into the final position.
#[track_caller]
pub fn sepby(p: Parser, separator: Parser, min: usize, max: usize) -> Parser {
    let name: std::rc::Rc<str> = format!("sepby({}, {}, {min}, {max})", p.name(), separator.name()).into();
    Parser::build(name, Shape::Plain, move |state, input| {
        let mut cursor = state.clone();
        let mut results = Vec::new();
        let mut count = 0;
        loop {
            if count >= max {
                break;
            }
            context::skip_ignore(&mut cursor, input);
            match p.call(&cursor, input) {
                Ok(next) => {
                    cursor = next.clone();
                    if !next.is_discarded() {
                        results.push(next);
                    }
                    count += 1;
                }
                Err(err) => {
                    if count < min {
                        return Err(err);
                    }
                    break;
                }
            }
            context::skip_ignore(&mut cursor, input);
            match separator.call(&cursor, input) {
                Ok(next) => cursor = next,
                Err(_) => break,
            }
        }
        context::skip_ignore(&mut cursor, input);
        Ok(ParseTree::new(Value::List(results), None, cursor.position))
    })
}

/// Unwraps one level of `tag`'s nesting convention to recover the leaf a
/// `leftassoc` rebuild should store for a tail result `t`: if `t`'s tag
/// operator wrapped an already-tagged child (`Value::Tree`), that child
/// triple *is* the leaf (its own tag and position intact); otherwise `t`
/// carried no prior tag to preserve, so the leaf is a fresh, untagged
/// triple over `t`'s own value. This mirrors `yapcl.combinators.leftassoc`,
/// which rebuilds its accumulator from the *unpacked* `result` field of
/// `tail`'s return value rather than from the whole triple, the reason a
/// chain like `value[... '*' >> value == 'mul' ...]` ends up with `mul`'s
/// two children each carrying their own `int`/`id`/... tag instead of both
/// being stamped `mul`.
fn leaf_for_leftassoc<'s>(t: &ParseTree<'s>) -> ParseTree<'s> {
    match &t.value {
        Value::Tree(inner) => (**inner).clone(),
        other => ParseTree::new(other.clone(), None, t.position),
    }
}

/// Builds a left-leaning chain: one application of `head`, then repeated
/// applications of `tail` threaded against the running result, between
/// `min` and `max` times (§4.2, the source's `a[p]` sugar). Each successful
/// non-`Discarded` `tail` result rebuilds the running accumulator as
/// `([accumulator, leaf], tail_tag, tail_position)`, a left-leaning binary
/// tree, where `leaf` is [`leaf_for_leftassoc`]'s unwrap of the tail
/// result and `accumulator` is the previous iteration's whole triple, so
/// the tree's leaves preserve their own original tags all the way down.
/// That rebuilt triple is what the *next* `tail` application sees as its
/// incoming state, so a binary-operator `tail` parser can read its left
/// operand back out of the state it's called with.
///
/// Once `min` applications are satisfied, a failing `tail` simply ends the
/// chain; there is no unbound "last error" to report, since `head` alone
/// already satisfies a `min` of zero (§9, the source's unbound-`error`
/// hazard resolved as "succeed without an error value").
#[track_caller]
pub fn leftassoc(head: Parser, tail: Parser, min: usize, max: usize) -> Parser {
    let name: std::rc::Rc<str> = format!("leftassoc({}, {}, {min}, {max})", head.name(), tail.name()).into();
    Parser::build(name, Shape::Plain, move |state, input| {
        let mut accumulator = head.call(state, input)?;
        let mut count = 0;
        while count < max {
            context::skip_ignore(&mut accumulator, input);
            match tail.call(&accumulator, input) {
                Ok(t) => {
                    count += 1;
                    if t.is_discarded() {
                        accumulator.position = t.position;
                    } else {
                        let leaf = leaf_for_leftassoc(&t);
                        accumulator = ParseTree::new(Value::List(vec![accumulator, leaf]), t.tag, t.position);
                    }
                }
                Err(err) => {
                    if count < min {
                        return Err(err);
                    }
                    break;
                }
            }
        }
        context::skip_ignore(&mut accumulator, input);
        Ok(accumulator)
    })
}
