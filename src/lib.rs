pub mod auth;
pub mod coerce;
pub mod dynamic;
pub mod engine;
pub mod errors;
pub mod null_object;
mod comparison;
mod expression;
mod parser;

use serde_json::Value;

pub use coerce::{Coerce, Target};
pub use dynamic::Dynamic;
pub use engine::{eval, eval_with, from_json, or_default, EvalOptions};
pub use errors::{NavError, Result};
pub use null_object::{BinaryOp, NullFieldProxy, Operation};

/// Evaluates navigation expressions with a fixed set of options.
#[derive(Debug, Default, Clone)]
pub struct Evaluator {
    opts: EvalOptions,
}

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(mut self, opts: EvalOptions) -> Self {
        self.opts = opts;
        self
    }

    pub fn eval(&self, doc: &Value, expr: &str) -> Result<Dynamic> {
        engine::eval_with(doc, expr, &self.opts)
    }

    /// Evaluates and coerces the result; missing fields become the
    /// target's zero value (or `None`).
    pub fn eval_as<T>(&self, doc: &Value, expr: &str) -> Result<T>
    where
        T: Coerce + serde::de::DeserializeOwned,
    {
        self.eval(doc, expr)?.coerce()
    }
}
