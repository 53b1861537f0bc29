use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

/// A single column-addressable value of a record.
///
/// Scalars are totally ordered so that distinct values of a column can be
/// sorted: values of different kinds order by kind, numbers compare exactly
/// by value across `Int` and `Float`.
#[derive(Debug, Clone)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Date(DateTime<Utc>),
}

impl Scalar {
    fn rank(&self) -> u8 {
        match self {
            Scalar::Null => 0,
            Scalar::Bool(_) => 1,
            Scalar::Int(_) | Scalar::Float(_) => 2,
            Scalar::Str(_) => 3,
            Scalar::Date(_) => 4,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Int(value) => Some(*value as f64),
            Scalar::Float(value) => Some(*value),
            _ => None,
        }
    }
}

impl Ord for Scalar {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Scalar::Null, Scalar::Null) => Ordering::Equal,
            (Scalar::Bool(a), Scalar::Bool(b)) => a.cmp(b),
            (Scalar::Int(a), Scalar::Int(b)) => a.cmp(b),
            (Scalar::Str(a), Scalar::Str(b)) => a.cmp(b),
            (Scalar::Date(a), Scalar::Date(b)) => a.cmp(b),
            (Scalar::Float(a), Scalar::Float(b)) => cmp_floats(*a, *b),
            (Scalar::Int(a), Scalar::Float(b)) => cmp_int_float(*a, *b),
            (Scalar::Float(a), Scalar::Int(b)) => cmp_int_float(*b, *a).reverse(),
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }
}

/// Numeric order, with `0.0 == -0.0`. NaNs sort below (negative sign) or
/// above (positive sign) every number.
fn cmp_floats(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or_else(|| a.total_cmp(&b))
}

/// Exact comparison of an integer with a float, without rounding the
/// integer through `f64`.
fn cmp_int_float(a: i64, b: f64) -> Ordering {
    // 2^63 is exactly representable; i64 covers [-2^63, 2^63).
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if b.is_nan() {
        return if b.is_sign_negative() {
            Ordering::Greater
        } else {
            Ordering::Less
        };
    }
    if b >= LIMIT {
        return Ordering::Less;
    }
    if b < -LIMIT {
        return Ordering::Greater;
    }
    let whole = b.trunc();
    match a.cmp(&(whole as i64)) {
        Ordering::Equal => cmp_floats(whole, b),
        other => other,
    }
}

impl PartialOrd for Scalar {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Scalar {}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => Ok(()),
            Scalar::Bool(value) => write!(f, "{}", value),
            Scalar::Int(value) => write!(f, "{}", value),
            Scalar::Float(value) => write!(f, "{}", value),
            Scalar::Str(value) => f.write_str(value),
            Scalar::Date(value) => f.write_str(&value.to_rfc3339_opts(SecondsFormat::Secs, true)),
        }
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Scalar::Null => serializer.serialize_none(),
            Scalar::Bool(value) => serializer.serialize_bool(*value),
            Scalar::Int(value) => serializer.serialize_i64(*value),
            Scalar::Float(value) if value.is_finite() => serializer.serialize_f64(*value),
            Scalar::Float(_) => serializer.serialize_none(),
            Scalar::Str(value) => serializer.serialize_str(value),
            Scalar::Date(value) => {
                serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Secs, true))
            }
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Str(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Str(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl From<DateTime<Utc>> for Scalar {
    fn from(value: DateTime<Utc>) -> Self {
        Scalar::Date(value)
    }
}

impl<T: Into<Scalar>> From<Option<T>> for Scalar {
    fn from(value: Option<T>) -> Self {
        value.map_or(Scalar::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixed_numbers_compare_by_value() {
        assert!(Scalar::Int(2) < Scalar::Float(2.5));
        assert_eq!(Scalar::Int(3), Scalar::Float(3.0));
    }

    #[test]
    fn large_integers_compare_exactly_with_floats() {
        let big = 1i64 << 53;
        let float = Scalar::Float(big as f64);
        assert_eq!(Scalar::Int(big), float);
        assert!(Scalar::Int(big + 1) > float);
        assert!(Scalar::Int(big) < Scalar::Int(big + 1));
        assert!(Scalar::Int(i64::MAX) < Scalar::Float(9.3e18));
        assert!(Scalar::Int(-2) < Scalar::Float(-1.5));
        assert!(Scalar::Int(-1) > Scalar::Float(-1.5));
        assert_eq!(Scalar::Float(0.0), Scalar::Float(-0.0));
        assert!(Scalar::Int(i64::MIN) > Scalar::Float(f64::NEG_INFINITY));
        assert!(Scalar::Int(i64::MAX) < Scalar::Float(f64::NAN));
    }

    #[test]
    fn distinct_set_keeps_neighbouring_large_integers() {
        let big = 1i64 << 53;
        let set: std::collections::BTreeSet<Scalar> = [
            Scalar::Int(big + 1),
            Scalar::Float(big as f64),
            Scalar::Int(big),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            set.into_iter().collect::<Vec<_>>(),
            vec![Scalar::Int(big), Scalar::Int(big + 1)]
        );
    }

    #[test]
    fn kinds_order_by_rank() {
        let mut values = vec![
            Scalar::from("b"),
            Scalar::Null,
            Scalar::Int(10),
            Scalar::from("a"),
        ];
        values.sort();
        assert_eq!(
            values,
            vec![Scalar::Null, Scalar::Int(10), Scalar::from("a"), Scalar::from("b")]
        );
    }

    #[test]
    fn non_finite_floats_serialize_as_null() {
        let json = serde_json::to_string(&vec![Scalar::Float(f64::NAN), Scalar::Int(1)]).unwrap();
        assert_eq!(json, "[null,1]");
    }
}
