use serde_json::{Number, Value};
use std::cmp::Ordering;

/// Orders two concrete JSON values. Numbers compare numerically, also
/// against numeric strings; mismatched kinds fall back to their JSON text.
pub fn cmp_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::String(sa), Value::String(sb)) => sa.cmp(sb),
        (Value::Number(na), Value::Number(nb)) => cmp_numbers(na, nb),
        (Value::Bool(ba), Value::Bool(bb)) => ba.cmp(bb),
        (Value::Number(na), Value::String(sb)) => match parse_number(sb) {
            Some(nb) => cmp_numbers(na, &nb),
            None => a.to_string().cmp(&b.to_string()),
        },
        (Value::String(sa), Value::Number(nb)) => match parse_number(sa) {
            Some(na) => cmp_numbers(&na, nb),
            None => a.to_string().cmp(&b.to_string()),
        },
        _ => a.to_string().cmp(&b.to_string()),
    }
}

/// Strict equality: kinds must match, numbers compare by value
/// (`2 == 2.0`), containers compare element by element.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(na), Value::Number(nb)) => cmp_numbers(na, nb) == Ordering::Equal,
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| values_equal(x, y)))
        }
        _ => a == b,
    }
}

/// Integers compare exactly; only mixed or fractional values go through `f64`.
fn cmp_numbers(na: &Number, nb: &Number) -> Ordering {
    if let (Some(ia), Some(ib)) = (na.as_i64(), nb.as_i64()) {
        return ia.cmp(&ib);
    }
    if let (Some(ua), Some(ub)) = (na.as_u64(), nb.as_u64()) {
        return ua.cmp(&ub);
    }
    // One side is a negative i64 and the other a u64 above i64::MAX.
    if na.as_i64().is_some() && nb.as_u64().is_some() {
        return Ordering::Less;
    }
    if na.as_u64().is_some() && nb.as_i64().is_some() {
        return Ordering::Greater;
    }
    match (na.as_f64(), nb.as_f64()) {
        (Some(da), Some(db)) => da.partial_cmp(&db).unwrap_or(Ordering::Equal),
        _ => na.to_string().cmp(&nb.to_string()),
    }
}

fn parse_number(s: &str) -> Option<Number> {
    let t = s.trim();
    if let Ok(i) = t.parse::<i64>() {
        return Some(Number::from(i));
    }
    if let Ok(u) = t.parse::<u64>() {
        return Some(Number::from(u));
    }
    t.parse::<f64>().ok().and_then(Number::from_f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn numbers_compare_numerically() {
        assert_eq!(cmp_values(&json!(2), &json!(10)), Ordering::Less);
        assert_eq!(cmp_values(&json!(2), &json!(2.0)), Ordering::Equal);
        assert_eq!(cmp_values(&json!("10"), &json!(9)), Ordering::Greater);
        assert_eq!(cmp_values(&json!(-1), &json!(u64::MAX)), Ordering::Less);
        assert_eq!(cmp_values(&json!(u64::MAX), &json!(-1)), Ordering::Greater);
    }

    #[test]
    fn large_integers_compare_exactly() {
        let a = json!(9_007_199_254_740_992_i64);
        let b = json!(9_007_199_254_740_993_i64);
        assert_eq!(cmp_values(&a, &b), Ordering::Less);
        assert!(!values_equal(&a, &b));
        assert_eq!(
            cmp_values(&json!(u64::MAX - 1), &json!(u64::MAX)),
            Ordering::Less
        );
        assert_eq!(
            cmp_values(&json!("9007199254740993"), &a),
            Ordering::Greater
        );
    }

    #[test]
    fn tiny_floats_are_not_zero() {
        assert_eq!(cmp_values(&json!(1e-17), &json!(0)), Ordering::Greater);
        assert_eq!(cmp_values(&json!(-1e-17), &json!(0)), Ordering::Less);
        assert!(!values_equal(&json!(1e-17), &json!(0)));
        assert_eq!(cmp_values(&json!(0.1), &json!(0.1)), Ordering::Equal);
    }

    #[test]
    fn strict_equality() {
        assert!(values_equal(&json!(2), &json!(2.0)));
        assert!(!values_equal(&json!("10"), &json!(10)));
        assert!(values_equal(&json!({"a": [1, 2.0]}), &json!({"a": [1.0, 2]})));
        assert!(!values_equal(&json!([1]), &json!([1, 2])));
        assert!(!values_equal(&json!({"a": 1}), &json!({"b": 1})));
    }

    #[test]
    fn mixed_kinds_use_json_text() {
        assert_eq!(cmp_values(&json!("a"), &json!("b")), Ordering::Less);
        assert_eq!(cmp_values(&json!(false), &json!(true)), Ordering::Less);
        assert_eq!(cmp_values(&json!([1]), &json!([1])), Ordering::Equal);
        assert_ne!(cmp_values(&json!(true), &json!(1)), Ordering::Equal);
    }
}
