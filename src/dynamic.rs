// src/dynamic.rs

use std::cmp::Ordering;
use std::fmt;
use std::slice;

use itertools::Itertools;
use serde::de::DeserializeOwned;
use serde_json::{Number, Value};
use tracing::trace;

use crate::coerce::Coerce;
use crate::comparison::{cmp_values, values_equal};
use crate::errors::{NavError, Result};
use crate::null_object::{BinaryOp, NullFieldProxy, COUNT, DEFAULT_IF_EMPTY};

/// A navigated value: a concrete JSON value, a sentinel standing in for a
/// missing field, or a sequence synthesized by an idiom such as
/// `DefaultIfEmpty`.
#[derive(Debug, Clone)]
pub enum Dynamic {
    Null(NullFieldProxy),
    Value(Value),
    List(Vec<Dynamic>),
}

impl Dynamic {
    pub fn missing() -> Self {
        Dynamic::Null(NullFieldProxy::new())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Dynamic::Null(_) | Dynamic::Value(Value::Null))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Dynamic::Null(_) => "NullFieldProxy",
            Dynamic::List(_) => "list",
            Dynamic::Value(v) => match v {
                Value::Null => "null",
                Value::Bool(_) => "bool",
                Value::Number(_) => "number",
                Value::String(_) => "string",
                Value::Array(_) => "array",
                Value::Object(_) => "object",
            },
        }
    }

    /// Renders the value back to JSON; sentinels become `null`.
    pub fn to_json(&self) -> Value {
        match self {
            Dynamic::Null(_) => Value::Null,
            Dynamic::Value(v) => v.clone(),
            Dynamic::List(items) => Value::Array(items.iter().map(Dynamic::to_json).collect()),
        }
    }

    pub fn member(&self, name: &str) -> Result<Dynamic> {
        match self {
            Dynamic::Null(p) => Ok(p.get_member(name).into()),
            Dynamic::Value(Value::Null) => Ok(NullFieldProxy::new().get_member(name).into()),
            Dynamic::Value(Value::Object(map)) => Ok(match map.get(name) {
                Some(v) => Dynamic::from(v.clone()),
                None => {
                    trace!(member = name, "field not found");
                    Dynamic::missing()
                }
            }),
            other => Err(NavError::MemberNotFound {
                receiver: other.kind(),
                name: name.to_string(),
            }),
        }
    }

    pub fn index(&self, indexes: &[Dynamic]) -> Result<Dynamic> {
        if let Dynamic::Null(p) = self {
            return Ok(p.get_index(indexes).into());
        }
        if self.is_null() {
            return Ok(NullFieldProxy::new().get_index(indexes).into());
        }
        let invalid = || NavError::InvalidIndex {
            receiver: self.kind(),
            index: indexes.iter().map(Dynamic::to_json).join(", "),
        };
        let [index] = indexes else {
            return Err(invalid());
        };
        match (self, index) {
            (Dynamic::Value(Value::Array(items)), Dynamic::Value(Value::Number(n))) => {
                let i = position(n).ok_or_else(invalid)?;
                Ok(i.and_then(|i| items.get(i))
                    .map(|v| Dynamic::from(v.clone()))
                    .unwrap_or_else(Dynamic::missing))
            }
            (Dynamic::List(items), Dynamic::Value(Value::Number(n))) => {
                let i = position(n).ok_or_else(invalid)?;
                Ok(i.and_then(|i| items.get(i))
                    .cloned()
                    .unwrap_or_else(Dynamic::missing))
            }
            (Dynamic::Value(Value::Object(_)), Dynamic::Value(Value::String(key))) => {
                self.member(key)
            }
            _ => Err(invalid()),
        }
    }

    /// Named method call. Sequences answer the same idioms the sentinel does.
    pub fn invoke_member(&self, name: &str, args: &[Dynamic]) -> Result<Dynamic> {
        match self {
            Dynamic::Null(p) => p.invoke_member(name, args),
            Dynamic::Value(Value::Null) => NullFieldProxy::new().invoke_member(name, args),
            Dynamic::Value(Value::Array(_)) | Dynamic::List(_) => match name {
                COUNT => Ok(Dynamic::from(self.iter()?.count() as u64)),
                DEFAULT_IF_EMPTY => {
                    let items: Vec<Dynamic> = self.iter()?.collect();
                    if items.is_empty() {
                        Ok(Dynamic::List(vec![Dynamic::missing()]))
                    } else {
                        Ok(Dynamic::List(items))
                    }
                }
                _ => Err(NavError::MemberNotFound {
                    receiver: self.kind(),
                    name: name.to_string(),
                }),
            },
            other => Err(NavError::MemberNotFound {
                receiver: other.kind(),
                name: name.to_string(),
            }),
        }
    }

    pub fn invoke(&self, args: &[Dynamic]) -> Result<Dynamic> {
        match self {
            Dynamic::Null(p) => Ok(p.invoke(args).into()),
            Dynamic::Value(Value::Null) => Ok(NullFieldProxy::new().invoke(args).into()),
            other => Err(NavError::NotCallable(other.kind())),
        }
    }

    pub fn iter(&self) -> Result<Iter<'_>> {
        match self {
            Dynamic::Null(_) | Dynamic::Value(Value::Null) => Ok(Iter::Empty),
            Dynamic::Value(Value::Array(items)) => Ok(Iter::Values(items.iter())),
            Dynamic::List(items) => Ok(Iter::Items(items.iter())),
            other => Err(NavError::NotIterable(other.kind())),
        }
    }

    /// Applies `op` with `self` on the left. A sentinel on either side
    /// follows the sentinel's rules. `==`/`!=` are strict (numbers by value,
    /// `"10" != 10`), the ordering operators also read numeric strings.
    pub fn binary_op(&self, op: BinaryOp, rhs: &Dynamic) -> Result<Dynamic> {
        if let Dynamic::Null(p) = self {
            return Ok(p.binary_op(op, rhs));
        }
        if let Dynamic::Null(p) = rhs {
            return Ok(p.binary_op(op, self));
        }
        if self.is_null() || rhs.is_null() {
            return Ok(NullFieldProxy::new().binary_op(op, if self.is_null() { rhs } else { self }));
        }
        let unsupported = || NavError::UnsupportedOperation {
            op,
            left: self.kind(),
            right: rhs.kind(),
        };
        let (a, b) = (self.to_json(), rhs.to_json());
        match op {
            BinaryOp::Eq => Ok(Dynamic::from(values_equal(&a, &b))),
            BinaryOp::Ne => Ok(Dynamic::from(!values_equal(&a, &b))),
            BinaryOp::Lt => Ok(Dynamic::from(cmp_values(&a, &b) == Ordering::Less)),
            BinaryOp::Le => Ok(Dynamic::from(cmp_values(&a, &b) != Ordering::Greater)),
            BinaryOp::Gt => Ok(Dynamic::from(cmp_values(&a, &b) == Ordering::Greater)),
            BinaryOp::Ge => Ok(Dynamic::from(cmp_values(&a, &b) != Ordering::Less)),
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => match (&a, &b) {
                (Value::Number(x), Value::Number(y)) => {
                    arithmetic(op, x, y).map(Dynamic::Value).ok_or_else(unsupported)
                }
                (Value::String(x), Value::String(y)) if op == BinaryOp::Add => {
                    Ok(Dynamic::from(format!("{x}{y}")))
                }
                _ => Err(unsupported()),
            },
        }
    }

    /// Converts to `T`: sentinels become `T`'s zero value, concrete values
    /// are deserialized.
    pub fn coerce<T>(&self) -> Result<T>
    where
        T: Coerce + DeserializeOwned,
    {
        match self {
            Dynamic::Null(p) => Ok(T::from_null_field(p)),
            Dynamic::Value(Value::Null) => Ok(T::from_null_field(&NullFieldProxy::explicit())),
            other => serde_json::from_value(other.to_json()).map_err(|source| NavError::Coercion {
                target: std::any::type_name::<T>(),
                found: other.kind(),
                source,
            }),
        }
    }
}

/// `None` for a non-integral index, `Some(None)` for one that is out of range.
fn position(n: &Number) -> Option<Option<usize>> {
    if let Some(u) = n.as_u64() {
        return Some(usize::try_from(u).ok());
    }
    n.as_i64().map(|_| None)
}

fn arithmetic(op: BinaryOp, x: &Number, y: &Number) -> Option<Value> {
    if let (Some(a), Some(b)) = (x.as_i64(), y.as_i64()) {
        let exact = match op {
            BinaryOp::Add => a.checked_add(b),
            BinaryOp::Sub => a.checked_sub(b),
            BinaryOp::Mul => a.checked_mul(b),
            _ => None,
        };
        if let Some(v) = exact {
            return Some(Value::from(v));
        }
    }
    let (a, b) = (x.as_f64()?, y.as_f64()?);
    let out = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => a / b,
        _ => return None,
    };
    Number::from_f64(out).map(Value::Number)
}

/// Iterator over the elements of a navigated sequence.
#[derive(Debug, Clone)]
pub enum Iter<'a> {
    Empty,
    Values(slice::Iter<'a, Value>),
    Items(slice::Iter<'a, Dynamic>),
}

impl Iterator for Iter<'_> {
    type Item = Dynamic;

    fn next(&mut self) -> Option<Dynamic> {
        match self {
            Iter::Empty => None,
            Iter::Values(it) => it.next().map(|v| Dynamic::from(v.clone())),
            Iter::Items(it) => it.next().cloned(),
        }
    }
}

impl From<Value> for Dynamic {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => Dynamic::Null(NullFieldProxy::explicit()),
            v => Dynamic::Value(v),
        }
    }
}

impl From<NullFieldProxy> for Dynamic {
    fn from(p: NullFieldProxy) -> Self {
        Dynamic::Null(p)
    }
}

macro_rules! dynamic_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Dynamic {
                fn from(v: $ty) -> Self {
                    Dynamic::from(Value::from(v))
                }
            }
        )*
    };
}

dynamic_from!(bool, i32, i64, u64, f64, &str, String);

impl PartialEq for Dynamic {
    fn eq(&self, other: &Self) -> bool {
        match (self.is_null(), other.is_null()) {
            (true, true) => true,
            (false, false) => values_equal(&self.to_json(), &other.to_json()),
            _ => false,
        }
    }
}

impl PartialEq<Value> for Dynamic {
    fn eq(&self, other: &Value) -> bool {
        if self.is_null() {
            other.is_null()
        } else {
            values_equal(&self.to_json(), other)
        }
    }
}

impl PartialEq<NullFieldProxy> for Dynamic {
    fn eq(&self, _other: &NullFieldProxy) -> bool {
        self.is_null()
    }
}

impl PartialEq<Dynamic> for NullFieldProxy {
    fn eq(&self, other: &Dynamic) -> bool {
        other.is_null()
    }
}

impl fmt::Display for Dynamic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dynamic::Null(p) => p.fmt(f),
            Dynamic::Value(Value::Null) => Ok(()),
            Dynamic::Value(Value::String(s)) => f.write_str(s),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn order() -> Dynamic {
        Dynamic::from(json!({
            "id": "orders/1",
            "customer": { "name": "Ada", "email": null },
            "lines": [
                { "sku": "A-1", "qty": 2, "price": 9.5 },
                { "sku": "B-7", "qty": 1, "price": 20 }
            ],
            "tags": []
        }))
    }

    #[test]
    fn member_found_missing_and_explicit_null() {
        let doc = order();
        assert_eq!(doc.member("id").unwrap(), json!("orders/1"));

        let email = doc.member("customer").unwrap().member("email").unwrap();
        match email {
            Dynamic::Null(p) => assert!(p.is_explicit_null()),
            other => panic!("expected sentinel, got {other:?}"),
        }

        let missing = doc.member("shipping").unwrap();
        match missing {
            Dynamic::Null(p) => assert!(!p.is_explicit_null()),
            other => panic!("expected sentinel, got {other:?}"),
        }
    }

    #[test]
    fn member_on_scalar_is_an_error() {
        let err = order().member("id").unwrap().member("len").unwrap_err();
        assert!(matches!(err, NavError::MemberNotFound { receiver: "string", .. }));
    }

    #[test]
    fn index_in_and_out_of_range() {
        let lines = order().member("lines").unwrap();
        let second = lines.index(&[Dynamic::from(1)]).unwrap();
        assert_eq!(second.member("sku").unwrap(), json!("B-7"));
        assert!(lines.index(&[Dynamic::from(9)]).unwrap().is_null());
        assert!(lines.index(&[Dynamic::from(-1)]).unwrap().is_null());
        assert!(lines.index(&[Dynamic::from("sku")]).is_err());
        assert!(lines.index(&[Dynamic::from(1.5)]).is_err());
    }

    #[test]
    fn index_object_by_key() {
        let name = order()
            .member("customer")
            .unwrap()
            .index(&[Dynamic::from("name")])
            .unwrap();
        assert_eq!(name, json!("Ada"));
    }

    #[test]
    fn sequence_idioms() {
        let doc = order();
        let lines = doc.member("lines").unwrap();
        assert_eq!(lines.invoke_member(COUNT, &[]).unwrap(), json!(2));
        let tags = doc.member("tags").unwrap();
        let defaulted = tags.invoke_member(DEFAULT_IF_EMPTY, &[]).unwrap();
        assert_eq!(defaulted.iter().unwrap().count(), 1);
        assert!(defaulted.iter().unwrap().all(|d| d.is_null()));
        assert!(lines.invoke_member("Sum", &[]).is_err());
    }

    #[test]
    fn iteration() {
        let doc = order();
        let skus: Vec<String> = doc
            .member("lines")
            .unwrap()
            .iter()
            .unwrap()
            .map(|line| line.member("sku").unwrap().to_string())
            .collect();
        assert_eq!(skus, vec!["A-1", "B-7"]);
        assert_eq!(doc.member("nope").unwrap().iter().unwrap().count(), 0);
        assert!(matches!(doc.iter(), Err(NavError::NotIterable("object"))));
    }

    #[test]
    fn comparisons_are_symmetric_around_sentinels() {
        let missing = Dynamic::missing();
        let zero = Dynamic::from(0);
        for (l, r) in [(&missing, &zero), (&zero, &missing)] {
            assert_eq!(l.binary_op(BinaryOp::Eq, r).unwrap(), json!(false));
            assert_eq!(l.binary_op(BinaryOp::Ne, r).unwrap(), json!(true));
        }
        let explicit = Dynamic::from(Value::Null);
        assert_eq!(
            explicit.binary_op(BinaryOp::Eq, &missing).unwrap(),
            json!(true)
        );
        assert!(zero.binary_op(BinaryOp::Add, &missing).unwrap().is_null());
    }

    #[test]
    fn concrete_operators() {
        let two = Dynamic::from(2);
        let half = Dynamic::from(0.5);
        assert_eq!(two.binary_op(BinaryOp::Add, &Dynamic::from(3)).unwrap(), json!(5));
        assert_eq!(two.binary_op(BinaryOp::Mul, &half).unwrap(), json!(1.0));
        assert_eq!(two.binary_op(BinaryOp::Div, &Dynamic::from(4)).unwrap(), json!(0.5));
        assert_eq!(two.binary_op(BinaryOp::Gt, &half).unwrap(), json!(true));
        assert_eq!(
            Dynamic::from("a").binary_op(BinaryOp::Add, &Dynamic::from("b")).unwrap(),
            json!("ab")
        );
        assert!(two.binary_op(BinaryOp::Div, &Dynamic::from(0)).is_err());
        assert!(Dynamic::from(true)
            .binary_op(BinaryOp::Sub, &Dynamic::from(1))
            .is_err());
    }

    #[test]
    fn coerce_present_and_missing() {
        let doc = order();
        let qty: i32 = doc
            .member("lines")
            .unwrap()
            .index(&[Dynamic::from(0)])
            .unwrap()
            .member("qty")
            .unwrap()
            .coerce()
            .unwrap();
        assert_eq!(qty, 2);
        let discount: f64 = doc.member("discount").unwrap().coerce().unwrap();
        assert_eq!(discount, 0.0);
        let note: Option<String> = doc.member("note").unwrap().coerce().unwrap();
        assert_eq!(note, None);
        assert!(doc.member("id").unwrap().coerce::<i32>().is_err());
    }

    #[test]
    fn eq_operator_agrees_with_partial_eq() {
        let pairs = [
            (Dynamic::from("10"), Dynamic::from(10)),
            (Dynamic::from(2), Dynamic::from(2.0)),
            (Dynamic::from(json!([1, {"a": 2}])), Dynamic::from(json!([1.0, {"a": 2.0}]))),
            (Dynamic::from(9_007_199_254_740_992_i64), Dynamic::from(9_007_199_254_740_993_i64)),
            (Dynamic::from(true), Dynamic::from(1)),
        ];
        for (l, r) in &pairs {
            let op = l.binary_op(BinaryOp::Eq, r).unwrap();
            assert_eq!(op, Dynamic::from(l == r), "{l} == {r}");
        }
        assert!(Dynamic::from("10") != Dynamic::from(10));
        assert!(Dynamic::from(2) == json!(2.0));
    }

    #[test]
    fn index_error_renders_arguments_as_json() {
        let lines = order().member("lines").unwrap();
        let err = lines.index(&[Dynamic::missing()]).unwrap_err();
        assert_eq!(err.to_string(), "cannot index array with [null]");
        let err = lines.index(&[Dynamic::from("sku"), Dynamic::from(1)]).unwrap_err();
        assert_eq!(err.to_string(), "cannot index array with [\"sku\", 1]");
    }

    #[test]
    fn display() {
        let doc = order();
        assert_eq!(doc.member("missing").unwrap().to_string(), "");
        assert_eq!(doc.member("id").unwrap().to_string(), "orders/1");
        assert_eq!(doc.member("tags").unwrap().to_string(), "[]");
    }
}
