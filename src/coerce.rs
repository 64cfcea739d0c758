// src/coerce.rs
//
// Each row of the table maps a target type to the value a missing field
// turns into: the type's zero for plain targets, `None` for `Option`
// targets. String has no plain row; `Option<String>` is `None`, while
// `Display` renders the sentinel as `""`.

use std::sync::LazyLock;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::dynamic::Dynamic;
use crate::errors::Result;
use crate::null_object::NullFieldProxy;

/// `0001-01-01T00:00:00`, the .NET-style `DateTime.MinValue`.
pub static MIN_DATE_TIME: LazyLock<NaiveDateTime> = LazyLock::new(|| {
    NaiveDate::from_ymd_opt(1, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("0001-01-01T00:00:00 is a valid date/time")
});

/// `0001-01-01T00:00:00+00:00`.
pub static MIN_DATE_TIME_OFFSET: LazyLock<DateTime<FixedOffset>> = LazyLock::new(|| {
    FixedOffset::east_opt(0)
        .expect("zero offset is valid")
        .from_utc_datetime(&MIN_DATE_TIME)
});

/// The value a type takes when coerced from a missing field.
pub trait Coerce: Sized {
    fn from_null_field(proxy: &NullFieldProxy) -> Self;
}

impl NullFieldProxy {
    pub fn coerce<T: Coerce>(&self) -> T {
        T::from_null_field(self)
    }

    pub fn to_bool(&self) -> bool {
        self.coerce()
    }

    pub fn to_i32(&self) -> i32 {
        self.coerce()
    }

    pub fn to_i64(&self) -> i64 {
        self.coerce()
    }

    pub fn to_f64(&self) -> f64 {
        self.coerce()
    }

    pub fn to_decimal(&self) -> Decimal {
        self.coerce()
    }

    pub fn to_date_time(&self) -> NaiveDateTime {
        self.coerce()
    }

    pub fn to_uuid(&self) -> Uuid {
        self.coerce()
    }

    /// The nullable string coercion. Unlike `to_string()`, this is `None`.
    pub fn to_string_opt(&self) -> Option<String> {
        None
    }
}

macro_rules! coercion_table {
    ($($ty:ty => $zero:expr),* $(,)?) => {
        $(
            impl Coerce for $ty {
                fn from_null_field(_proxy: &NullFieldProxy) -> Self {
                    $zero
                }
            }

            impl Coerce for Option<$ty> {
                fn from_null_field(_proxy: &NullFieldProxy) -> Self {
                    None
                }
            }

            impl From<NullFieldProxy> for $ty {
                fn from(proxy: NullFieldProxy) -> Self {
                    <$ty as Coerce>::from_null_field(&proxy)
                }
            }

            impl From<NullFieldProxy> for Option<$ty> {
                fn from(_proxy: NullFieldProxy) -> Self {
                    None
                }
            }
        )*
    };
}

coercion_table! {
    bool => false,
    u8 => 0,
    i8 => 0,
    u16 => 0,
    i16 => 0,
    u32 => 0,
    i32 => 0,
    u64 => 0,
    i64 => 0,
    f32 => 0.0,
    f64 => 0.0,
    Decimal => Decimal::ZERO,
    char => '\0',
    NaiveDateTime => *MIN_DATE_TIME,
    DateTime<FixedOffset> => *MIN_DATE_TIME_OFFSET,
    Duration => Duration::ZERO,
    Uuid => Uuid::nil(),
}

impl Coerce for Option<String> {
    fn from_null_field(_proxy: &NullFieldProxy) -> Self {
        None
    }
}

impl From<NullFieldProxy> for Option<String> {
    fn from(_proxy: NullFieldProxy) -> Self {
        None
    }
}

/// Coercion targets selectable at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Bool,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Decimal,
    String,
    Char,
    DateTime,
    DateTimeOffset,
    TimeSpan,
    Guid,
}

/// Coerces `value` to `target` (or its nullable form) and renders the
/// typed result back as JSON.
pub fn coerce_to_json(value: &Dynamic, target: Target, nullable: bool) -> Result<Value> {
    fn render<T>(value: &Dynamic, nullable: bool) -> Result<Value>
    where
        T: Coerce + serde::de::DeserializeOwned + Serialize,
        Option<T>: Coerce,
    {
        let out = if nullable {
            serde_json::to_value(value.coerce::<Option<T>>()?)
        } else {
            serde_json::to_value(value.coerce::<T>()?)
        };
        Ok(out?)
    }

    match target {
        Target::Bool => render::<bool>(value, nullable),
        Target::Byte => render::<u8>(value, nullable),
        Target::Short => render::<i16>(value, nullable),
        Target::Int => render::<i32>(value, nullable),
        Target::Long => render::<i64>(value, nullable),
        Target::Float => render::<f32>(value, nullable),
        Target::Double => render::<f64>(value, nullable),
        Target::Decimal => render::<Decimal>(value, nullable),
        // Strings only have the nullable form.
        Target::String => Ok(serde_json::to_value(value.coerce::<Option<String>>()?)?),
        Target::Char => render::<char>(value, nullable),
        Target::DateTime => render::<NaiveDateTime>(value, nullable),
        Target::DateTimeOffset => render::<DateTime<FixedOffset>>(value, nullable),
        Target::TimeSpan => render::<Duration>(value, nullable),
        Target::Guid => render::<Uuid>(value, nullable),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn plain_targets_get_zero_values() {
        let p = NullFieldProxy::new();
        assert!(!p.to_bool());
        assert_eq!(p.to_i32(), 0);
        assert_eq!(p.to_i64(), 0);
        assert_eq!(p.to_f64(), 0.0);
        assert_eq!(p.to_decimal(), Decimal::ZERO);
        assert_eq!(p.coerce::<u8>(), 0);
        assert_eq!(p.coerce::<i16>(), 0);
        assert_eq!(p.coerce::<f32>(), 0.0);
        assert_eq!(p.coerce::<char>(), '\0');
        assert_eq!(p.coerce::<Duration>(), Duration::ZERO);
        assert_eq!(p.to_uuid(), Uuid::nil());
        assert_eq!(
            p.to_date_time().to_string(),
            "0001-01-01 00:00:00"
        );
        assert_eq!(
            p.coerce::<DateTime<FixedOffset>>().to_rfc3339(),
            "0001-01-01T00:00:00+00:00"
        );
    }

    #[test]
    fn nullable_targets_get_none() {
        let p = NullFieldProxy::explicit();
        assert_eq!(p.coerce::<Option<bool>>(), None);
        assert_eq!(p.coerce::<Option<i32>>(), None);
        assert_eq!(p.coerce::<Option<u64>>(), None);
        assert_eq!(p.coerce::<Option<Decimal>>(), None);
        assert_eq!(p.coerce::<Option<NaiveDateTime>>(), None);
        assert_eq!(p.coerce::<Option<Uuid>>(), None);
        assert_eq!(p.coerce::<Option<String>>(), None);
        assert_eq!(p.to_string_opt(), None);
        assert_eq!(p.to_string(), "");
    }

    #[test]
    fn reads_like_an_implicit_conversion() {
        let p = NullFieldProxy::new();
        let flag: bool = p.into();
        let count: i64 = p.into();
        let maybe: Option<i64> = p.into();
        let name: Option<String> = p.into();
        assert!(!flag);
        assert_eq!(count, 0);
        assert_eq!(maybe, None);
        assert_eq!(name, None);
    }

    #[test]
    fn runtime_table() {
        let missing = Dynamic::missing();
        assert_eq!(coerce_to_json(&missing, Target::Int, false).unwrap(), json!(0));
        assert_eq!(coerce_to_json(&missing, Target::Int, true).unwrap(), json!(null));
        assert_eq!(coerce_to_json(&missing, Target::Bool, false).unwrap(), json!(false));
        assert_eq!(coerce_to_json(&missing, Target::String, false).unwrap(), json!(null));
        assert_eq!(
            coerce_to_json(&missing, Target::Guid, false).unwrap(),
            json!("00000000-0000-0000-0000-000000000000")
        );

        let present = Dynamic::from(json!("3f2504e0-4f89-11d3-9a0c-0305e82c3301"));
        assert_eq!(
            coerce_to_json(&present, Target::Guid, true).unwrap(),
            json!("3f2504e0-4f89-11d3-9a0c-0305e82c3301")
        );
        assert!(coerce_to_json(&present, Target::Long, false).is_err());
    }
}
