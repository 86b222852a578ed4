//! Flat per-field predicates: a query is a conjunction of these, applied
//! as a sequential reduction over candidate rows.

use serde_json::Value;
use std::cmp::Ordering;

/// One predicate against one field.
#[derive(Debug, Clone)]
pub struct QueryFilter {
    pub field: String,
    pub op: FilterOp,
}

impl QueryFilter {
    pub fn new(field: impl Into<String>, op: FilterOp) -> Self {
        Self {
            field: field.into(),
            op,
        }
    }
}

/// The closed operator set. Ordering operators compare numbers
/// numerically and strings lexicographically; mixed types never match.
/// Containment operators only apply to string cells.
#[derive(Debug, Clone)]
pub enum FilterOp {
    Equals(Value),
    NotEquals(Value),
    GreaterThan(Value),
    LessThan(Value),
    GreaterThanOrEqual(Value),
    LessThanOrEqual(Value),
    Contains(String),
    NotContains(String),
    IsContained(String),
    IsNotContained(String),
}

impl FilterOp {
    /// Evaluate against a cell. `None` (column shorter than the candidate
    /// row set), `Null`, and the empty string (how the service renders a
    /// blank cell inside a populated range) are missing values, and a
    /// missing value satisfies no operator, negated ones included.
    pub fn matches(&self, cell: Option<&Value>) -> bool {
        let cell = match cell {
            Some(Value::Null) | None => return false,
            Some(Value::String(s)) if s.is_empty() => return false,
            Some(cell) => cell,
        };

        match self {
            FilterOp::Equals(expected) => loose_eq(cell, expected),
            FilterOp::NotEquals(expected) => !loose_eq(cell, expected),
            FilterOp::GreaterThan(bound) => {
                compare(cell, bound) == Some(Ordering::Greater)
            }
            FilterOp::LessThan(bound) => compare(cell, bound) == Some(Ordering::Less),
            FilterOp::GreaterThanOrEqual(bound) => {
                matches!(compare(cell, bound), Some(Ordering::Greater | Ordering::Equal))
            }
            FilterOp::LessThanOrEqual(bound) => {
                matches!(compare(cell, bound), Some(Ordering::Less | Ordering::Equal))
            }
            FilterOp::Contains(needle) => {
                cell.as_str().is_some_and(|s| s.contains(needle.as_str()))
            }
            FilterOp::NotContains(needle) => {
                cell.as_str().is_some_and(|s| !s.contains(needle.as_str()))
            }
            FilterOp::IsContained(haystack) => {
                cell.as_str().is_some_and(|s| haystack.contains(s))
            }
            FilterOp::IsNotContained(haystack) => {
                cell.as_str().is_some_and(|s| !haystack.contains(s))
            }
        }
    }
}

/// Equality across the numeric JSON variants (the service renders `28`
/// and `28.0` interchangeably); everything else is strict equality.
fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    if let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) {
        return x.partial_cmp(&y);
    }
    if let (Some(x), Some(y)) = (a.as_str(), b.as_str()) {
        return Some(x.cmp(y));
    }
    None
}
