use crate::dynamic::Dynamic;
use crate::errors::Result;
use crate::expression;
use serde_json::Value;
use tracing::debug;

/// =========================
/// Public API (Library funcs)
/// =========================

#[derive(Debug, Default, Clone)]
pub struct EvalOptions {
    /// Substituted when an expression evaluates to a missing field.
    pub default: Option<Value>,
}

/// Evaluate a navigation expression such as `$.order.lines.Count()`
/// against `doc`.
pub fn eval(doc: &Value, expr: &str) -> Result<Dynamic> {
    eval_with(doc, expr, &EvalOptions::default())
}

pub fn eval_with(doc: &Value, expr: &str, opts: &EvalOptions) -> Result<Dynamic> {
    let ast = expression::parse_expr(expr)?;
    debug!(expr, "evaluating");
    let root = Dynamic::from(doc.clone());
    let out = expression::eval_ast(&ast, &root)?;
    Ok(match &opts.default {
        Some(default) => or_default(out, default.clone()),
        None => out,
    })
}

/// Convenience: parse a JSON string and evaluate `expr` against it.
pub fn from_json(json_str: &str, expr: &str) -> Result<Dynamic> {
    let data: Value = serde_json::from_str(json_str)?;
    eval(&data, expr)
}

/// If `value` is missing, return `default`; else `value`.
pub fn or_default(value: Dynamic, default: Value) -> Dynamic {
    if value.is_null() {
        Dynamic::from(default)
    } else {
        value
    }
}
