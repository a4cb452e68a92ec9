//! Collection values: constructors and set arithmetic

use crate::error::{FoldError, FoldResult};
use sqltype_types::{TypeTag, Value};

/// Build a collection value of the given kind; SET drops duplicates
pub fn make_collection(tag: TypeTag, mut items: Vec<Value>) -> Value {
    match tag {
        TypeTag::Set => {
            dedup_in_order(&mut items);
            Value::Set(items)
        }
        TypeTag::Multiset => Value::Multiset(items),
        _ => Value::Sequence(items),
    }
}

fn dedup_in_order(items: &mut Vec<Value>) {
    let mut seen: Vec<Value> = Vec::with_capacity(items.len());
    items.retain(|item| {
        if seen.contains(item) {
            false
        } else {
            seen.push(item.clone());
            true
        }
    });
}

fn items<'a>(value: &'a Value, operation: &str) -> FoldResult<&'a [Value]> {
    value
        .as_collection()
        .ok_or_else(|| FoldError::invalid_argument(operation, format!("{} is not a collection", value.type_tag())))
}

/// `a + b` on collections
pub fn union(a: &Value, b: &Value, result: TypeTag) -> FoldResult<Value> {
    let mut merged = items(a, "+")?.to_vec();
    merged.extend_from_slice(items(b, "+")?);
    Ok(make_collection(result, merged))
}

/// `a - b` on collections; each element of `b` removes one occurrence
pub fn difference(a: &Value, b: &Value, result: TypeTag) -> FoldResult<Value> {
    let mut remaining = items(a, "-")?.to_vec();
    for item in items(b, "-")? {
        if let Some(pos) = remaining.iter().position(|v| v == item) {
            remaining.remove(pos);
        }
    }
    Ok(make_collection(result, remaining))
}

/// `a * b` on collections
pub fn intersection(a: &Value, b: &Value, result: TypeTag) -> FoldResult<Value> {
    let mut pool = items(b, "*")?.to_vec();
    let mut common = Vec::new();
    for item in items(a, "*")? {
        if let Some(pos) = pool.iter().position(|v| v == item) {
            common.push(pool.remove(pos));
        }
    }
    Ok(make_collection(result, common))
}

/// Every element of `a` occurs in `b`
pub fn is_subset_eq(a: &Value, b: &Value) -> FoldResult<bool> {
    let inner = items(b, "SUBSETEQ")?;
    Ok(items(a, "SUBSETEQ")?.iter().all(|item| inner.contains(item)))
}

/// Proper subset
pub fn is_subset(a: &Value, b: &Value) -> FoldResult<bool> {
    Ok(is_subset_eq(a, b)? && !is_subset_eq(b, a)?)
}

/// Number of elements
pub fn cardinality(value: &Value) -> FoldResult<usize> {
    items(value, "CARDINALITY").map(<[Value]>::len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn seq(values: &[i32]) -> Value {
        Value::Sequence(values.iter().copied().map(Value::Integer).collect())
    }

    #[test]
    fn test_set_constructor_drops_duplicates() {
        let set = make_collection(TypeTag::Set, vec![Value::Integer(1), Value::Integer(1), Value::Integer(2)]);
        assert_eq!(set, Value::Set(vec![Value::Integer(1), Value::Integer(2)]));
    }

    #[test]
    fn test_multiset_arithmetic() {
        let a = seq(&[1, 2, 2, 3]);
        let b = seq(&[2, 4]);
        assert_eq!(
            difference(&a, &b, TypeTag::Multiset).unwrap(),
            Value::Multiset(vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)])
        );
        assert_eq!(
            intersection(&a, &b, TypeTag::Multiset).unwrap(),
            Value::Multiset(vec![Value::Integer(2)])
        );
        assert_eq!(cardinality(&union(&a, &b, TypeTag::Sequence).unwrap()).unwrap(), 6);
    }

    #[test]
    fn test_subset() {
        assert!(is_subset(&seq(&[1]), &seq(&[1, 2])).unwrap());
        assert!(!is_subset(&seq(&[1, 2]), &seq(&[2, 1])).unwrap());
        assert!(is_subset_eq(&seq(&[1, 2]), &seq(&[2, 1])).unwrap());
        assert!(is_subset(&Value::Integer(1), &seq(&[1])).is_err());
    }
}
