//! Duplicate-free set operations over lists of plain data.
//!
//! Values are matched by [`get_hash`], so objects that differ only in key
//! order count as the same value. First occurrences keep their order.

use std::collections::HashSet;

use serde_json::Value;

use super::compare::get_hash;

/// `items` without duplicates.
pub fn unique(items: &[Value]) -> Vec<Value> {
    array_union(&[items])
}

/// Every value that appears in any of `arrays`, once.
pub fn array_union(arrays: &[&[Value]]) -> Vec<Value> {
    let mut seen = HashSet::new();
    arrays
        .iter()
        .flat_map(|items| items.iter())
        .filter(|v| seen.insert(get_hash(v)))
        .cloned()
        .collect()
}

/// Values of `a` that also appear in `b`.
pub fn array_intersection(a: &[Value], b: &[Value]) -> Vec<Value> {
    combine(a, b, true)
}

/// Values of `a` that do not appear in `b`.
pub fn array_difference(a: &[Value], b: &[Value]) -> Vec<Value> {
    combine(a, b, false)
}

fn combine(a: &[Value], b: &[Value], in_b: bool) -> Vec<Value> {
    let b: HashSet<String> = b.iter().map(get_hash).collect();
    a.iter()
        .filter(|v| b.contains(&get_hash(v)) == in_b)
        .cloned()
        .collect()
}
