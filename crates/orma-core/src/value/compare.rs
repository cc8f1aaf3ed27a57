use crate::value::Value;
use std::cmp::Ordering;

/// Total canonical comparator used by cache keys and persistence-context lookups.
///
/// Ordering rules:
/// 1. Canonical variant tag
/// 2. Variant-specific comparison for same-tagged values
///
/// Floats compare by IEEE total order so every value has a stable position.
#[must_use]
pub fn canonical_cmp(left: &Value, right: &Value) -> Ordering {
    let rank = left.tag().to_u8().cmp(&right.tag().to_u8());
    if rank != Ordering::Equal {
        return rank;
    }

    canonical_cmp_same_tag(left, right)
}

fn canonical_cmp_same_tag(left: &Value, right: &Value) -> Ordering {
    #[allow(clippy::match_same_arms)]
    match (left, right) {
        (Value::Blob(a), Value::Blob(b)) => a.cmp(b),
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Entity(a), Value::Entity(b)) => a.cmp(b),
        (Value::Float64(a), Value::Float64(b)) => a.total_cmp(b),
        (Value::Int(a), Value::Int(b)) => a.cmp(b),
        (Value::List(a), Value::List(b)) => canonical_cmp_list(a, b),
        (Value::Text(a), Value::Text(b)) => a.cmp(b),
        (Value::Timestamp(a), Value::Timestamp(b)) => a.cmp(b),
        (Value::Uint(a), Value::Uint(b)) => a.cmp(b),
        (Value::Ulid(a), Value::Ulid(b)) => a.cmp(b),
        (Value::Null, Value::Null) => Ordering::Equal,
        _ => Ordering::Equal,
    }
}

/// Lexicographic canonical comparison of two value sequences.
#[must_use]
pub fn canonical_cmp_list(left: &[Value], right: &[Value]) -> Ordering {
    for (left, right) in left.iter().zip(right.iter()) {
        let cmp = canonical_cmp(left, right);
        if cmp != Ordering::Equal {
            return cmp;
        }
    }

    left.len().cmp(&right.len())
}
