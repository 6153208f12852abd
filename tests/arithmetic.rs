//! End-to-end arithmetic grammar scenarios (§8), ported from
//! `original_source/example_math.py`'s worked grammar: integers, floats,
//! identifiers, negation, `*`/`/` factor ops, `+`/`-` term ops,
//! parentheses, function definitions, and function calls, all built under
//! one `ignore(whitespace)` scope.
//!
//! This crate stops at the parse tree (§1's "Deliberately OUT of scope"
//! excludes the interpreter); these tests check tree *shape* — tags and
//! children — the way `example_math.py`'s `interpret` would have dispatched
//! on them, without actually evaluating anything.

use tagparse::{context, eof, lit, regex, Parser, RecursionContainer, Value};

struct Grammar {
    main: Parser,
}

fn build() -> Grammar {
    let integer = regex(r"\d+").tag("int");
    let float_val = regex(r"\d+\.\d+").tag("float");
    let id = regex("[a-zA-Z_]+[a-zA-Z_0-9]*").tag("id");

    let r = RecursionContainer::new();
    let funccall_ref = r.declare("funccall");
    let parenthesis_ref = r.declare("parenthesis");

    let value = float_val | integer | funccall_ref | id.clone() | parenthesis_ref;
    let negate = (lit("-") >> value.clone()).tag("negate");
    let value = negate | value;

    let factor = value.clone().fold_any(vec![
        (lit("*") >> value.clone()).tag("mul"),
        (lit("/") >> value.clone()).tag("div"),
    ]);

    let term = factor.clone().fold_any(vec![
        (lit("+") >> factor.clone()).tag("add"),
        (lit("-") >> factor.clone()).tag("sub"),
    ]);

    let parenthesis = lit("(") >> term.clone() << lit(")");
    r.define("parenthesis", parenthesis);

    let paramlist = id.clone().sepby(lit(",")).tag("paramlist");
    let funcdef = (id.clone() << "(" >> paramlist << ")" << "=" >> term.clone()).tag("funcdef");

    let arglist = term.clone().sepby(lit(",")).tag("arglist");
    let funccall = (id << "(" >> arglist << ")").tag("funccall");
    r.define("funccall", funccall);

    // `funcdef` must be tried before `term`: a definition's head (`f(x,y)=...`)
    // is also a prefix a bare `term` parses happily as a `funccall` value, and
    // `either` commits to whichever alternative succeeds first with no
    // backtracking once the trailing `eof` check fails.
    let main = (funcdef | term) << eof().error_message("unexpected token");

    Grammar { main }
}

fn parse<'s>(grammar: &Grammar, input: &'s str) -> Result<tagparse::ParseTree<'s>, tagparse::ParseError> {
    let whitespace = regex(r"\s+");
    context::ignore(vec![whitespace], || grammar.main.parse(input))
}

fn children<'a>(tree: &'a tagparse::ParseTree) -> &'a [tagparse::ParseTree<'a>] {
    tree.value.as_list().expect("expected a list-shaped result")
}

#[test]
fn one_plus_two_tags_add_of_two_ints() {
    let grammar = build();
    let tree = parse(&grammar, "1+2").unwrap();
    assert_eq!(tree.tag, Some("add"));
    let kids = children(&tree);
    assert_eq!(kids.len(), 2);
    assert_eq!(kids[0].tag, Some("int"));
    assert_eq!(kids[0].value.as_text(), Some("1"));
    assert_eq!(kids[1].tag, Some("int"));
    assert_eq!(kids[1].value.as_text(), Some("2"));
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    let grammar = build();
    let tree = parse(&grammar, "1+2*3").unwrap();
    assert_eq!(tree.tag, Some("add"));
    let kids = children(&tree);
    assert_eq!(kids[0].tag, Some("int"));
    assert_eq!(kids[1].tag, Some("mul"));
    let mul_kids = children(&kids[1]);
    assert_eq!(mul_kids[0].value.as_text(), Some("2"));
    assert_eq!(mul_kids[1].value.as_text(), Some("3"));
}

#[test]
fn parentheses_override_precedence() {
    let grammar = build();
    let tree = parse(&grammar, "(1+2)*3").unwrap();
    assert_eq!(tree.tag, Some("mul"));
    let kids = children(&tree);
    assert_eq!(kids[0].tag, Some("add"));
    assert_eq!(kids[1].value.as_text(), Some("3"));
}

#[test]
fn unary_minus_tags_negate() {
    let grammar = build();
    let tree = parse(&grammar, "-1+2").unwrap();
    assert_eq!(tree.tag, Some("add"));
    let kids = children(&tree);
    assert_eq!(kids[0].tag, Some("negate"));
    let negated = match &kids[0].value {
        Value::Tree(inner) => inner,
        other => panic!("expected negate to wrap a tagged triple, got {other:?}"),
    };
    assert_eq!(negated.tag, Some("int"));
    assert_eq!(negated.value.as_text(), Some("1"));
    assert_eq!(kids[1].tag, Some("int"));
}

#[test]
fn function_definition_captures_name_params_and_body() {
    let grammar = build();
    let tree = parse(&grammar, "f(x,y)=x+y").unwrap();
    assert_eq!(tree.tag, Some("funcdef"));
    let kids = children(&tree);
    assert_eq!(kids.len(), 3);
    assert_eq!(kids[0].tag, Some("id"));
    assert_eq!(kids[0].value.as_text(), Some("f"));
    assert_eq!(kids[1].tag, Some("paramlist"));
    let params = children(&kids[1]);
    assert_eq!(params.len(), 2);
    assert_eq!(params[0].value.as_text(), Some("x"));
    assert_eq!(params[1].value.as_text(), Some("y"));
    assert_eq!(kids[2].tag, Some("add"));
    let body = children(&kids[2]);
    assert_eq!(body[0].tag, Some("id"));
    assert_eq!(body[0].value.as_text(), Some("x"));
    assert_eq!(body[1].tag, Some("id"));
    assert_eq!(body[1].value.as_text(), Some("y"));
}

/// §8 scenario 6, adjusted per `DESIGN.md`'s resolved-behavior entry for
/// `leftassoc`'s `min == 0` swallowing: because `term`'s `+`/`-` tail is
/// optional (`min == 0`), a trailing `+` with nothing after it does not
/// make `term` itself fail — `term` simply stops at the `1` it already
/// has, the same way a bare `"1"` is a perfectly good term. The parse
/// error surfaces one level up, from `main`'s trailing `eof` check, which
/// fails right where `term` left off (position 1, just after the `1`),
/// not at the position the swallowed inner failure reached.
#[test]
fn trailing_operator_with_nothing_after_fails_at_eof_not_mid_expression() {
    let grammar = build();
    let err = parse(&grammar, "1+").unwrap_err();
    assert_eq!(err.position, 1);
    assert_eq!(err.to_string(), "unexpected token\nat index 1");
}

#[test]
fn function_call_parses_as_value() {
    let grammar = build();
    let tree = parse(&grammar, "f(1,2+3)").unwrap();
    assert_eq!(tree.tag, Some("funccall"));
    let kids = children(&tree);
    assert_eq!(kids[0].value.as_text(), Some("f"));
    assert_eq!(kids[1].tag, Some("arglist"));
    let args = children(&kids[1]);
    assert_eq!(args.len(), 2);
    assert_eq!(args[1].tag, Some("add"));
}

/// `value`'s `id` alternative and `funccall`'s leading `id` are the exact
/// same parser object built under this cache scope, so an argument that
/// turns out to be a bare identifier — not itself a call — makes `value`
/// match `id` twice at the same position: once inside the `funccall`
/// attempt that fails when no `(` follows, and once more when `either`
/// falls through to the plain `id` alternative. That's the cache hit this
/// test exercises; the spec's own "parse `f(f(f(f(1))))`" example never
/// backtracks this way, since every argument there actually is a nested
/// call, so this test swaps the innermost argument for a bare identifier.
#[test]
fn recursive_function_calls_parse_and_hit_the_cache() {
    context::cache_size(16, |stats| {
        let grammar = build();
        let whitespace = regex(r"\s+");
        let result = context::ignore(vec![whitespace], || grammar.main.parse("f(f(f(f(x))))"));
        assert!(result.is_ok());
        let total_calls = stats.hits() + stats.misses();
        assert!(stats.hits() > 0);
        assert!(total_calls >= stats.hits());
    });
}
