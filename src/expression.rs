// src/expression.rs
use crate::dynamic::Dynamic;
use crate::errors::{NavError, Result};
use crate::null_object::BinaryOp;
use crate::parser::{ParseError, Parser};
use serde_json::Value;
use tracing::trace;

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Member(String),
    Index(Vec<ENode>),
    Invoke(Vec<ENode>),
    InvokeMember { name: String, args: Vec<ENode> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ENode {
    Literal(Value),
    Path(Vec<Step>),
    Binary {
        op: BinaryOp,
        left: Box<ENode>,
        right: Box<ENode>,
    },
}

pub fn parse_expr(input: &str) -> Result<ENode> {
    let mut p = EParser::new(input);
    p.parse_expr().map_err(|e| NavError::Parse(e.to_string()))
}

struct EParser<'a> {
    parser: Parser<'a>,
}

// Longer symbols first so "<=" is not read as "<".
const OPERATORS: [(&str, BinaryOp); 10] = [
    ("==", BinaryOp::Eq),
    ("!=", BinaryOp::Ne),
    ("<=", BinaryOp::Le),
    (">=", BinaryOp::Ge),
    ("<", BinaryOp::Lt),
    (">", BinaryOp::Gt),
    ("+", BinaryOp::Add),
    ("-", BinaryOp::Sub),
    ("*", BinaryOp::Mul),
    ("/", BinaryOp::Div),
];

impl<'a> EParser<'a> {
    fn new(s: &'a str) -> Self {
        Self {
            parser: Parser::new(s),
        }
    }

    fn parse_expr(&mut self) -> std::result::Result<ENode, ParseError> {
        let left = self.parse_node()?;
        self.parser.skip_ws();
        let node = match self.parse_operator() {
            Some(op) => ENode::Binary {
                op,
                left: Box::new(left),
                right: Box::new(self.parse_node()?),
            },
            None => left,
        };
        self.parser.skip_ws();
        if !self.parser.eof() {
            return Err(self.parser.error("trailing input"));
        }
        Ok(node)
    }

    fn parse_operator(&mut self) -> Option<BinaryOp> {
        OPERATORS
            .iter()
            .find(|(sym, _)| self.parser.consume_str(sym))
            .map(|(_, op)| *op)
    }

    fn parse_node(&mut self) -> std::result::Result<ENode, ParseError> {
        self.parser.skip_ws();
        match self.parser.peek_char() {
            Some('$') => self.parse_path(),
            Some('"' | '\'') => Ok(ENode::Literal(Value::String(
                self.parser.parse_quoted_string()?,
            ))),
            Some(c) if c == '-' || c.is_ascii_digit() => {
                Ok(ENode::Literal(self.parser.parse_number_literal()?))
            }
            _ => {
                if self.parser.consume_str("true") {
                    Ok(ENode::Literal(Value::Bool(true)))
                } else if self.parser.consume_str("false") {
                    Ok(ENode::Literal(Value::Bool(false)))
                } else if self.parser.consume_str("null") {
                    Ok(ENode::Literal(Value::Null))
                } else {
                    Err(self.parser.error("expected '$' path or literal"))
                }
            }
        }
    }

    fn parse_path(&mut self) -> std::result::Result<ENode, ParseError> {
        self.parser.expect('$')?;
        let mut steps = Vec::new();
        loop {
            self.parser.skip_ws();
            if self.parser.consume_char('.') {
                let name = self.parser.parse_identifier()?;
                self.parser.skip_ws();
                if self.parser.consume_char('(') {
                    let args = self.parse_args(')')?;
                    steps.push(Step::InvokeMember { name, args });
                } else {
                    steps.push(Step::Member(name));
                }
            } else if self.parser.consume_char('[') {
                steps.push(Step::Index(self.parse_args(']')?));
            } else if self.parser.consume_char('(') {
                steps.push(Step::Invoke(self.parse_args(')')?));
            } else {
                break;
            }
        }
        Ok(ENode::Path(steps))
    }

    fn parse_args(&mut self, close: char) -> std::result::Result<Vec<ENode>, ParseError> {
        let mut out = Vec::new();
        self.parser.skip_ws();
        if self.parser.consume_char(close) {
            return Ok(out);
        }
        loop {
            out.push(self.parse_node()?);
            self.parser.skip_ws();
            if self.parser.consume_char(',') {
                continue;
            }
            self.parser.expect(close)?;
            return Ok(out);
        }
    }
}

/// Evaluate AST node against the document root.
pub fn eval_ast(node: &ENode, root: &Dynamic) -> Result<Dynamic> {
    match node {
        ENode::Literal(v) => Ok(Dynamic::from(v.clone())),
        ENode::Path(steps) => {
            let mut current = root.clone();
            for step in steps {
                trace!(?step, kind = current.kind(), "navigating");
                current = match step {
                    Step::Member(name) => current.member(name)?,
                    Step::Index(args) => current.index(&eval_args(args, root)?)?,
                    Step::Invoke(args) => current.invoke(&eval_args(args, root)?)?,
                    Step::InvokeMember { name, args } => {
                        current.invoke_member(name, &eval_args(args, root)?)?
                    }
                };
            }
            Ok(current)
        }
        ENode::Binary { op, left, right } => {
            let l = eval_ast(left, root)?;
            let r = eval_ast(right, root)?;
            l.binary_op(*op, &r)
        }
    }
}

fn eval_args(args: &[ENode], root: &Dynamic) -> Result<Vec<Dynamic>> {
    args.iter().map(|a| eval_ast(a, root)).collect()
}
