use std::cell::RefCell;
use std::rc::Rc;

use tagparse::{concat, context, either, eof, leftassoc, lit, many, regex, seq_capture, sepby, RecursionContainer};

#[test]
fn lit_consumes_prefix_and_advances_position() {
    let p = lit("foo");
    let result = p.parse("foobar").unwrap();
    assert_eq!(result.value.as_text(), Some("foo"));
    assert_eq!(result.position, 3);
}

#[test]
fn lit_fails_on_mismatch_without_panicking() {
    let p = lit("foo");
    let err = p.parse("bar").unwrap_err();
    assert_eq!(err.position, 0);
}

#[test]
fn regex_matches_anchored_at_position() {
    let digits = regex(r"[0-9]+");
    let result = digits.parse("42abc").unwrap();
    assert_eq!(result.value.as_text(), Some("42"));
    assert_eq!(result.position, 2);
}

#[test]
fn regex_does_not_match_mid_string() {
    let digits = regex(r"[0-9]+");
    assert!(digits.parse("abc42").is_err());
}

#[test]
fn eof_only_succeeds_at_end() {
    assert!(eof().parse("").is_ok());
    assert!(eof().parse("x").is_err());
}

#[test]
fn either_tries_alternatives_in_order() {
    let p = either(vec![lit("a"), lit("b")]);
    assert!(p.parse("a").is_ok());
    assert!(p.parse("b").is_ok());
    assert!(p.parse("c").is_err());
}

#[test]
fn either_reports_error_at_the_starting_position() {
    let p = either(vec![lit("aa"), lit("b")]);
    let err = p.parse("ab").unwrap_err();
    // both alternatives are tried from the same start state, so the
    // reported position is that start, not however far either one got.
    assert_eq!(err.position, 0);
}

#[test]
fn bitor_flattens_into_single_either() {
    let p = lit("a") | lit("b") | lit("c");
    assert!(p.parse("c").is_ok());
}

#[test]
fn seq_collects_results_and_threads_position() {
    let p = lit("a") + lit("b");
    let result = p.parse("ab").unwrap();
    assert_eq!(result.value.as_list().unwrap().len(), 2);
    assert_eq!(result.position, 2);
}

#[test]
fn shr_discards_left_and_keeps_right() {
    let p = lit("(") >> lit("x");
    let result = p.parse("(x").unwrap();
    assert_eq!(result.value.as_text(), Some("x"));
}

#[test]
fn shl_keeps_left_and_discards_right() {
    let p = lit("x") << lit(")");
    let result = p.parse("x)").unwrap();
    assert_eq!(result.value.as_text(), Some("x"));
}

#[test]
fn many_respects_min_and_max() {
    let digit = regex(r"[0-9]");
    let p = many(digit.clone(), 1, 3);
    assert!(p.parse("").is_err());
    let result = p.parse("12345").unwrap();
    assert_eq!(result.position, 3);
}

#[test]
fn sepby_collects_comma_separated_items() {
    let item = regex(r"[0-9]+");
    let p = sepby(item, lit(","), 0, usize::MAX);
    let result = p.parse("1,22,333").unwrap();
    assert_eq!(result.value.as_list().unwrap().len(), 3);
    assert_eq!(result.position, 8);
}

#[test]
fn sepby_absorbs_trailing_separator_without_rewinding() {
    let item = regex(r"[0-9]+");
    let p = sepby(item, lit(","), 0, usize::MAX);
    let result = p.parse("1,2,").unwrap();
    assert_eq!(result.value.as_list().unwrap().len(), 2);
    assert_eq!(result.position, 4);
}

#[test]
fn leftassoc_builds_left_leaning_chain() {
    // tail reads nothing from the running value here; it just keeps
    // matching "+1" while it can, like a trivial counter.
    let head = lit("1");
    let tail = lit("+1");
    let p = leftassoc(head, tail, 0, usize::MAX);
    let result = p.parse("1+1+1").unwrap();
    assert_eq!(result.position, 5);
}

#[test]
fn tag_wraps_retagged_results_instead_of_overwriting() {
    let p = lit("x").tag("inner").tag("outer");
    let result = p.parse("x").unwrap();
    assert_eq!(result.tag, Some("outer"));
    match result.value {
        tagparse::Value::Tree(inner) => assert_eq!(inner.tag, Some("inner")),
        other => panic!("expected a nested tree, got {other:?}"),
    }
}

#[test]
fn map_transforms_value_without_touching_position() {
    let p = regex(r"[0-9]+").map(|v| tagparse::Value::custom(v.as_text().unwrap().parse::<i64>().unwrap()));
    let result = p.parse("42").unwrap();
    assert_eq!(result.position, 2);
}

#[test]
fn error_message_overrides_display_but_keeps_position() {
    let p = lit("x").error_message("expected an x here");
    let err = p.parse("y").unwrap_err();
    assert_eq!(err.position, 0);
    assert_eq!(err.to_string(), "expected an x here\nat index 0");
}

#[test]
fn lookahead_peeks_without_consuming() {
    let p = lit("x").ahead(lit("y"));
    let result = p.parse("xy").unwrap();
    assert_eq!(result.position, 1);
    assert!(lit("x").ahead(lit("z")).parse("xy").is_err());
}

#[test]
fn deep_join_collapses_repeated_chars_into_one_string() {
    let word = many(regex(r"[a-z]"), 1, usize::MAX).deep_join();
    let result = word.parse("hello world").unwrap();
    assert_eq!(result.value.as_text(), Some("hello"));
}

#[test]
fn recursion_container_resolves_forward_reference() {
    let container = RecursionContainer::new();
    let expr = container.declare("expr");
    let parenthesized = lit("(") >> expr.clone() << lit(")");
    let atom = regex(r"[0-9]+") | parenthesized;
    container.define("expr", atom);
    let resolved = container.declare("expr");
    assert!(resolved.parse("((1))").is_ok());
}

#[test]
#[should_panic(expected = "called before being defined")]
fn recursion_container_panics_on_unresolved_slot() {
    let container = RecursionContainer::new();
    let promise = container.declare("never_defined");
    let _ = promise.parse("anything");
}

#[test]
fn ignore_scope_skips_whitespace_between_seq_elements() {
    let sum = lit("1") + lit("+") + lit("2");
    let result = context::ignore(vec![regex(r"\s+")], || sum.parse("1 + 2")).unwrap();
    assert_eq!(result.position, 5);
}

#[test]
fn token_matches_by_tag_first_then_falls_back_to_value_equality() {
    use tagparse::token::token;
    use tagparse::{ParseTree, Value};

    let tagged: ParseTree<'static> = ParseTree::new(Value::text("whatever"), Some("plus"), 1);
    let untagged: ParseTree<'static> = ParseTree::new(Value::text("plus"), None, 1);
    let mismatched: ParseTree<'static> = ParseTree::new(Value::text("minus"), None, 1);

    let p = token("plus");
    assert!(p.parse(&[tagged.clone()]).is_ok());
    assert!(p.parse(&[untagged.clone()]).is_ok());
    assert!(p.parse(&[mismatched]).is_err());
}

#[test]
fn trace_scope_invokes_hook_for_parsers_built_in_this_file() {
    let calls = Rc::new(RefCell::new(0usize));
    let calls_clone = calls.clone();
    tagparse::debug::set_trace_hook(move |_event: &tagparse::debug::TraceEvent| {
        *calls_clone.borrow_mut() += 1;
    });
    let p = context::trace(0, 0, || lit("x"));
    assert!(p.parse("x").is_ok());
    assert!(*calls.borrow() >= 1);
    tagparse::debug::clear_trace_hook();
}

#[test]
fn seq_capture_unwraps_one_childs_value_and_tag() {
    let p = seq_capture(vec![lit("("), lit("x").tag("inner"), lit(")")], 1);
    let result = p.parse("(x)").unwrap();
    assert_eq!(result.tag, Some("inner"));
    assert_eq!(result.value.as_text(), Some("x"));
    assert_eq!(result.position, 3);
}

#[test]
fn concat_flattens_only_seq_shaped_children_not_either_shaped_ones() {
    // `either`'s own result can be list-shaped (one of its alternatives is a
    // `seq`), but `either` itself is not sequence-shaped, so it must stay
    // nested rather than get spliced the way a `seq`/`concat` child would.
    let seq_child = lit("a") + lit("b");
    let either_child = either(vec![lit("c") + lit("d"), lit("e")]);
    let p = concat(vec![seq_child, either_child]);
    let result = p.parse("abcd").unwrap();
    let items = result.value.as_list().unwrap();
    // the seq child's two elements are spliced in, then the either child's
    // whole (list-shaped) result is kept as one nested entry.
    assert_eq!(items.len(), 3);
    assert!(items[2].value.as_list().is_some());
}

#[test]
fn cache_size_memoizes_repeated_calls_at_the_same_position() {
    context::cache_size(8, |stats| {
        let digits = regex(r"[0-9]+");
        let repeated = either(vec![digits.clone() + digits.clone(), digits]);
        assert!(repeated.parse("123").is_ok());
        assert!(stats.hits() >= 1);
        stats.erase();
        assert_eq!(stats.len(), 0);
    });
}
