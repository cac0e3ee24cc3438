//! Predicate AST for `$filter`
//!
//! Predicates are plain values built with a small fluent API:
//!
//! ```ignore
//! use service_layer::api::query::field;
//!
//! let code = "B-T203";
//! let predicate = field("ItemCode").eq(code).and(field("ItemName").ne("a"));
//! ```
//!
//! Right-hand operands that are not a [`Filter`] become literal values at
//! construction time, so a captured local variable is always rendered as a
//! literal while `field(..)` is always rendered as a field reference.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::api::constants::DATETIME_FORMAT;

/// A literal value inside a predicate or key predicate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FilterValue {
    Null,
    String(String),
    Integer(i64),
    /// Unsigned values wider than `i64` can hold
    Unsigned(u64),
    Float(f64),
    Boolean(bool),
    DateTime(NaiveDateTime),
}

impl FilterValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FilterValue::Null)
    }

    /// Render as an API literal: strings single-quoted with embedded quotes
    /// doubled, date/times as `yyyy-MM-ddTHH:mm:ss`, everything else as text
    pub fn to_literal(&self) -> String {
        match self {
            FilterValue::Null => "null".to_string(),
            FilterValue::String(s) => format!("'{}'", s.replace('\'', "''")),
            FilterValue::Integer(n) => n.to_string(),
            FilterValue::Unsigned(n) => n.to_string(),
            FilterValue::Float(n) => n.to_string(),
            FilterValue::Boolean(b) => b.to_string(),
            FilterValue::DateTime(dt) => dt.format(DATETIME_FORMAT).to_string(),
        }
    }

    /// Like [`to_literal`](Self::to_literal), with string contents
    /// percent-encoded for use inside a URL query or path segment
    pub fn to_uri_literal(&self) -> String {
        match self {
            FilterValue::String(s) => {
                format!("'{}'", urlencoding::encode(&s.replace('\'', "''")))
            }
            other => other.to_literal(),
        }
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_literal())
    }
}

macro_rules! filter_value_from {
    ($($ty:ty => |$v:ident| $conv:expr),* $(,)?) => {
        $(
            impl From<$ty> for FilterValue {
                fn from($v: $ty) -> Self {
                    $conv
                }
            }
        )*
    };
}

filter_value_from! {
    &str => |v| FilterValue::String(v.to_string()),
    String => |v| FilterValue::String(v),
    &String => |v| FilterValue::String(v.clone()),
    i8 => |v| FilterValue::Integer(v as i64),
    i16 => |v| FilterValue::Integer(v as i64),
    i32 => |v| FilterValue::Integer(v as i64),
    i64 => |v| FilterValue::Integer(v),
    isize => |v| FilterValue::Integer(v as i64),
    u8 => |v| FilterValue::Integer(v as i64),
    u16 => |v| FilterValue::Integer(v as i64),
    u32 => |v| FilterValue::Integer(v as i64),
    u64 => |v| FilterValue::Unsigned(v),
    usize => |v| FilterValue::Unsigned(v as u64),
    f32 => |v| FilterValue::Float(v as f64),
    f64 => |v| FilterValue::Float(v),
    bool => |v| FilterValue::Boolean(v),
    NaiveDateTime => |v| FilterValue::DateTime(v),
    NaiveDate => |v| FilterValue::DateTime(v.and_time(chrono::NaiveTime::MIN)),
    DateTime<Utc> => |v| FilterValue::DateTime(v.naive_utc()),
}

impl<T: Into<FilterValue>> From<Option<T>> for FilterValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FilterValue::Null)
    }
}

/// Binary operators a predicate can carry.
///
/// Only the comparison and logical operators exist in the API's filter
/// grammar; the arithmetic ones are representable so that callers get a
/// precise [`UnsupportedOperator`](crate::Error::UnsupportedOperator) error
/// instead of a silently wrong query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOperator {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    /// Non-short-circuit and (`&`)
    And,
    /// Short-circuit and (`&&`)
    AndAlso,
    /// Non-short-circuit or (`|`)
    Or,
    /// Short-circuit or (`||`)
    OrElse,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    ExclusiveOr,
    Coalesce,
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A predicate expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Filter {
    /// Reference to a field of the queried entity
    Field(String),
    /// Literal known at construction time
    Value(FilterValue),
    Binary {
        left: Box<Filter>,
        op: BinaryOperator,
        right: Box<Filter>,
    },
    Not(Box<Filter>),
    /// Function call on a field, e.g. `startswith`
    Call {
        function: String,
        target: Box<Filter>,
        args: Vec<Filter>,
    },
}

/// Reference a field of the queried entity
pub fn field(name: impl Into<String>) -> Filter {
    Filter::Field(name.into())
}

/// Wrap a literal value
pub fn value(value: impl Into<FilterValue>) -> Filter {
    Filter::Value(value.into())
}

impl Filter {
    pub fn binary(left: impl Into<Filter>, op: BinaryOperator, right: impl Into<Filter>) -> Self {
        Filter::Binary {
            left: Box::new(left.into()),
            op,
            right: Box::new(right.into()),
        }
    }

    pub fn call(function: impl Into<String>, target: impl Into<Filter>, args: Vec<Filter>) -> Self {
        Filter::Call {
            function: function.into(),
            target: Box::new(target.into()),
            args,
        }
    }

    pub fn eq(self, rhs: impl Into<Filter>) -> Self {
        Self::binary(self, BinaryOperator::Equal, rhs)
    }

    pub fn ne(self, rhs: impl Into<Filter>) -> Self {
        Self::binary(self, BinaryOperator::NotEqual, rhs)
    }

    pub fn lt(self, rhs: impl Into<Filter>) -> Self {
        Self::binary(self, BinaryOperator::LessThan, rhs)
    }

    pub fn le(self, rhs: impl Into<Filter>) -> Self {
        Self::binary(self, BinaryOperator::LessThanOrEqual, rhs)
    }

    pub fn gt(self, rhs: impl Into<Filter>) -> Self {
        Self::binary(self, BinaryOperator::GreaterThan, rhs)
    }

    pub fn ge(self, rhs: impl Into<Filter>) -> Self {
        Self::binary(self, BinaryOperator::GreaterThanOrEqual, rhs)
    }

    /// Short-circuit conjunction
    pub fn and(self, rhs: impl Into<Filter>) -> Self {
        Self::binary(self, BinaryOperator::AndAlso, rhs)
    }

    /// Short-circuit disjunction
    pub fn or(self, rhs: impl Into<Filter>) -> Self {
        Self::binary(self, BinaryOperator::OrElse, rhs)
    }

    pub fn starts_with(self, prefix: impl Into<FilterValue>) -> Self {
        Self::call("startswith", self, vec![Filter::Value(prefix.into())])
    }

    pub fn ends_with(self, suffix: impl Into<FilterValue>) -> Self {
        Self::call("endswith", self, vec![Filter::Value(suffix.into())])
    }

    pub fn contains(self, needle: impl Into<FilterValue>) -> Self {
        Self::call("contains", self, vec![Filter::Value(needle.into())])
    }

    /// Field names referenced anywhere in the expression, in visitation order
    pub fn fields(&self) -> Vec<&str> {
        let mut names = Vec::new();
        collect_fields(self, &mut names);
        names
    }
}

fn collect_fields<'a>(filter: &'a Filter, names: &mut Vec<&'a str>) {
    match filter {
        Filter::Field(name) => names.push(name),
        Filter::Value(_) => {}
        Filter::Binary { left, right, .. } => {
            collect_fields(left, names);
            collect_fields(right, names);
        }
        Filter::Not(inner) => collect_fields(inner, names),
        Filter::Call { target, args, .. } => {
            collect_fields(target, names);
            for arg in args {
                collect_fields(arg, names);
            }
        }
    }
}

impl std::ops::Not for Filter {
    type Output = Filter;

    fn not(self) -> Filter {
        Filter::Not(Box::new(self))
    }
}

impl std::ops::BitAnd for Filter {
    type Output = Filter;

    fn bitand(self, rhs: Filter) -> Filter {
        Filter::binary(self, BinaryOperator::And, rhs)
    }
}

impl std::ops::BitOr for Filter {
    type Output = Filter;

    fn bitor(self, rhs: Filter) -> Filter {
        Filter::binary(self, BinaryOperator::Or, rhs)
    }
}

impl From<FilterValue> for Filter {
    fn from(value: FilterValue) -> Self {
        Filter::Value(value)
    }
}

macro_rules! filter_from_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Filter {
                fn from(v: $ty) -> Self {
                    Filter::Value(FilterValue::from(v))
                }
            }
        )*
    };
}

filter_from_value!(
    &str,
    String,
    &String,
    i8,
    i16,
    i32,
    i64,
    isize,
    u8,
    u16,
    u32,
    u64,
    usize,
    f32,
    f64,
    bool,
    NaiveDateTime,
    NaiveDate,
    DateTime<Utc>,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rhs_literal_vs_field() {
        let captured = String::from("B-T203");
        let literal = field("ItemCode").eq(&captured);
        let reference = field("ItemCode").eq(field("ForeignName"));

        match literal {
            Filter::Binary { right, .. } => {
                assert_eq!(*right, Filter::Value(FilterValue::String("B-T203".into())))
            }
            other => panic!("unexpected {:?}", other),
        }
        match reference {
            Filter::Binary { right, .. } => assert_eq!(*right, Filter::Field("ForeignName".into())),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_operator_forms() {
        let short = field("A").eq(1).and(field("B").eq(2));
        let long = field("A").eq(1) & field("B").eq(2);
        assert!(matches!(short, Filter::Binary { op: BinaryOperator::AndAlso, .. }));
        assert!(matches!(long, Filter::Binary { op: BinaryOperator::And, .. }));

        let either = field("A").eq(1) | field("B").eq(2);
        assert!(matches!(either, Filter::Binary { op: BinaryOperator::Or, .. }));
    }

    #[test]
    fn test_literals() {
        assert_eq!(FilterValue::from("O'Brien").to_literal(), "'O''Brien'");
        assert_eq!(FilterValue::from(42).to_literal(), "42");
        assert_eq!(FilterValue::from(2.5).to_literal(), "2.5");
        assert_eq!(FilterValue::from(true).to_literal(), "true");
        assert_eq!(FilterValue::from(None::<String>).to_literal(), "null");

        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(FilterValue::from(date).to_literal(), "2024-03-09T00:00:00");
        let stamp = date.and_hms_opt(14, 5, 7).unwrap();
        assert_eq!(FilterValue::from(stamp).to_literal(), "2024-03-09T14:05:07");
    }

    #[test]
    fn test_integer_widths() {
        assert_eq!(FilterValue::from(7u8), FilterValue::Integer(7));
        assert_eq!(FilterValue::from(-3i8), FilterValue::Integer(-3));
        assert_eq!(FilterValue::from(12isize), FilterValue::Integer(12));
        assert_eq!(FilterValue::from(5usize), FilterValue::Unsigned(5));
        assert_eq!(FilterValue::from(u64::MAX).to_literal(), "18446744073709551615");
    }

    #[test]
    fn test_uri_literals() {
        assert_eq!(
            FilterValue::from("Nuts & Bolts #5 50%").to_uri_literal(),
            "'Nuts%20%26%20Bolts%20%235%2050%25'"
        );
        assert_eq!(FilterValue::from("a/b+c").to_uri_literal(), "'a%2Fb%2Bc'");
        assert_eq!(FilterValue::from("O'Brien").to_uri_literal(), "'O%27%27Brien'");
        assert_eq!(FilterValue::from("B-T203").to_uri_literal(), "'B-T203'");
        assert_eq!(FilterValue::from(42).to_uri_literal(), "42");
    }

    #[test]
    fn test_fields_collected_in_order() {
        let predicate = field("CardCode")
            .starts_with("C")
            .and(!field("Frozen").eq(true))
            .or(field("Balance").gt(field("CreditLimit")));
        assert_eq!(
            predicate.fields(),
            vec!["CardCode", "Frozen", "Balance", "CreditLimit"]
        );
    }
}
