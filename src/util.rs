//! Small standalone helpers that don't belong to any one combinator family.

use crate::{ParseTree, Parser, Shape, Value};

/// Depth-first joins every leaf `Text` in `value` into one string, skipping
/// `Discarded`/`Unit` nodes entirely (`yapcl.combinators.deepjoin`).
fn join_value(value: &Value) -> String {
    match value {
        Value::Text(s) => s.to_string(),
        Value::List(items) => items.iter().map(|tree| join_value(&tree.value)).collect(),
        Value::Tree(tree) => join_value(&tree.value),
        Value::Discarded | Value::Unit => String::new(),
        Value::Custom(custom) => format!("{custom:?}"),
    }
}

/// Wraps `p` so its result's value is replaced by the depth-first join of
/// its leaf text, collapsing a `many`/`seq` subtree of characters back into
/// a single token string.
#[track_caller]
pub fn deep_join(p: Parser) -> Parser {
    let name: std::rc::Rc<str> = format!("deep_join({})", p.name()).into();
    Parser::build(name, Shape::Plain, move |state, input| {
        let result = p.call(state, input)?;
        let joined = join_value(&result.value);
        Ok(ParseTree::new(Value::text(joined), result.tag, result.position))
    })
}
