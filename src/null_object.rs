// src/null_object.rs

use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter;

use serde_json::Value;
use tracing::{debug, trace};

use crate::dynamic::Dynamic;
use crate::errors::{NavError, Result};

/// Query-library method names answered by the sentinel itself.
///
/// Anything not listed here surfaces [`NavError::MemberNotFound`]. New idioms
/// must be added explicitly.
pub const IDIOMS: [&str; 2] = [COUNT, DEFAULT_IF_EMPTY];

pub const COUNT: &str = "Count";
pub const DEFAULT_IF_EMPTY: &str = "DefaultIfEmpty";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// One dynamic operation a query expression can perform on a value.
#[derive(Debug, Clone, Copy)]
pub enum Operation<'a> {
    GetMember(&'a str),
    GetIndex(&'a [Dynamic]),
    Invoke(&'a [Dynamic]),
    InvokeMember { name: &'a str, args: &'a [Dynamic] },
    Binary(BinaryOp, &'a Dynamic),
}

/// Placeholder for a missing or explicitly-null document field.
///
/// All instances are interchangeable: they compare equal to each other and
/// to JSON `null`/`None`, hash identically, and never compare equal to a
/// concrete value.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullFieldProxy {
    is_explicit_null: bool,
}

impl NullFieldProxy {
    /// A field that never existed.
    pub const fn new() -> Self {
        Self {
            is_explicit_null: false,
        }
    }

    /// A field present in the document with a `null` value.
    pub const fn explicit() -> Self {
        Self {
            is_explicit_null: true,
        }
    }

    /// Informational only; no operation depends on it.
    pub const fn is_explicit_null(&self) -> bool {
        self.is_explicit_null
    }

    pub fn dispatch(&self, op: Operation<'_>) -> Result<Dynamic> {
        match op {
            Operation::GetMember(name) => Ok(self.get_member(name).into()),
            Operation::GetIndex(indexes) => Ok(self.get_index(indexes).into()),
            Operation::Invoke(args) => Ok(self.invoke(args).into()),
            Operation::InvokeMember { name, args } => self.invoke_member(name, args),
            Operation::Binary(op, rhs) => Ok(self.binary_op(op, rhs)),
        }
    }

    pub fn get_member(&self, name: &str) -> NullFieldProxy {
        trace!(member = name, "member access on missing field");
        NullFieldProxy::new()
    }

    pub fn get_index(&self, indexes: &[Dynamic]) -> NullFieldProxy {
        trace!(arity = indexes.len(), "index access on missing field");
        NullFieldProxy::new()
    }

    /// Calling the missing field as if it were a function.
    pub fn invoke(&self, args: &[Dynamic]) -> NullFieldProxy {
        trace!(arity = args.len(), "invocation of missing field");
        NullFieldProxy::new()
    }

    /// Named method call. Only the [`IDIOMS`] are answered; arguments are ignored.
    pub fn invoke_member(&self, name: &str, args: &[Dynamic]) -> Result<Dynamic> {
        match name {
            COUNT => Ok(Dynamic::from(0)),
            DEFAULT_IF_EMPTY => Ok(Dynamic::List(vec![Dynamic::Null(NullFieldProxy::new())])),
            _ => {
                debug!(
                    method = name,
                    arity = args.len(),
                    "unrecognized invocation on missing field"
                );
                Err(NavError::MemberNotFound {
                    receiver: "NullFieldProxy",
                    name: name.to_string(),
                })
            }
        }
    }

    /// `==` and `!=` answer whether `rhs` is also "nothing"; every other
    /// operator keeps the result missing.
    pub fn binary_op(&self, op: BinaryOp, rhs: &Dynamic) -> Dynamic {
        match op {
            BinaryOp::Eq => Dynamic::from(rhs.is_null()),
            BinaryOp::Ne => Dynamic::from(!rhs.is_null()),
            _ => Dynamic::Null(*self),
        }
    }

    /// Zero elements, every time.
    pub fn iter(&self) -> iter::Empty<Dynamic> {
        iter::empty()
    }
}

impl fmt::Display for NullFieldProxy {
    fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Ok(())
    }
}

impl IntoIterator for NullFieldProxy {
    type Item = Dynamic;
    type IntoIter = iter::Empty<Dynamic>;

    fn into_iter(self) -> Self::IntoIter {
        iter::empty()
    }
}

impl IntoIterator for &NullFieldProxy {
    type Item = Dynamic;
    type IntoIter = iter::Empty<Dynamic>;

    fn into_iter(self) -> Self::IntoIter {
        iter::empty()
    }
}

// The flag does not take part in equality.
impl PartialEq for NullFieldProxy {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for NullFieldProxy {}

impl Hash for NullFieldProxy {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(0);
    }
}

impl PartialEq<Value> for NullFieldProxy {
    fn eq(&self, other: &Value) -> bool {
        other.is_null()
    }
}

impl PartialEq<NullFieldProxy> for Value {
    fn eq(&self, _other: &NullFieldProxy) -> bool {
        self.is_null()
    }
}

impl<T> PartialEq<Option<T>> for NullFieldProxy {
    fn eq(&self, other: &Option<T>) -> bool {
        other.is_none()
    }
}

impl<T> PartialEq<NullFieldProxy> for Option<T> {
    fn eq(&self, _other: &NullFieldProxy) -> bool {
        self.is_none()
    }
}

// A concrete value is never "nothing", whatever its zero value.
macro_rules! never_equal {
    ($($ty:ty),* $(,)?) => {
        $(
            impl PartialEq<$ty> for NullFieldProxy {
                fn eq(&self, _other: &$ty) -> bool {
                    false
                }
            }

            impl PartialEq<NullFieldProxy> for $ty {
                fn eq(&self, _other: &NullFieldProxy) -> bool {
                    false
                }
            }
        )*
    };
}

never_equal!(bool, char, u8, i8, u16, i16, u32, i32, u64, i64, f32, f64, str, String);

impl PartialEq<&str> for NullFieldProxy {
    fn eq(&self, _other: &&str) -> bool {
        false
    }
}

impl PartialEq<NullFieldProxy> for &str {
    fn eq(&self, _other: &NullFieldProxy) -> bool {
        false
    }
}
