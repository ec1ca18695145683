use std::{collections::HashMap, hash::Hash};
use tracing::warn;

use crate::error::JoinCardinalityWarning;

/// Row indices of `rows` grouped by key, in row order.
pub fn index_by<'a, R, K, F>(rows: &'a [R], key: F) -> HashMap<K, Vec<usize>>
where
    K: Hash + Eq,
    F: Fn(&'a R) -> K,
{
    let mut idx: HashMap<K, Vec<usize>> = HashMap::with_capacity(rows.len());
    for (i, r) in rows.iter().enumerate() {
        idx.entry(key(r)).or_default().push(i);
    }
    idx
}

/// Result of a [`left_join`]: one pair per left row per matching right
/// row, or `(left, None)` when nothing matched.
pub struct Joined<'a, L, R> {
    pub pairs: Vec<(&'a L, Option<&'a R>)>,
    pub warning: Option<JoinCardinalityWarning>,
}

/// Left join on equal keys, preserving left order. Duplicate right keys
/// fan out the left row, which is reported through the returned warning.
pub fn left_join<'a, L, R, K, FL, FR>(
    join: &'static str,
    left: &'a [L],
    right: &'a [R],
    left_key: FL,
    right_key: FR,
) -> Joined<'a, L, R>
where
    K: Hash + Eq,
    FL: Fn(&'a L) -> K,
    FR: Fn(&'a R) -> K,
{
    let idx = index_by(right, right_key);
    let mut pairs = Vec::with_capacity(left.len());
    for l in left {
        match idx.get(&left_key(l)) {
            Some(matches) => pairs.extend(matches.iter().map(|&i| (l, Some(&right[i])))),
            None => pairs.push((l, None)),
        }
    }
    let warning = check_cardinality(join, left.len(), pairs.len());
    Joined { pairs, warning }
}

/// Log and return a warning when a join changed the row count.
pub fn check_cardinality(
    join: &'static str,
    left_rows: usize,
    output_rows: usize,
) -> Option<JoinCardinalityWarning> {
    if left_rows == output_rows {
        return None;
    }
    let w = JoinCardinalityWarning {
        join,
        left_rows,
        output_rows,
    };
    warn!(join, left_rows, output_rows, "join cardinality changed: {}", w);
    Some(w)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmatched_left_rows_survive() {
        let left = [("a", 1), ("b", 2)];
        let right = [("a", 10)];
        let j = left_join("t", &left, &right, |l| l.0, |r| r.0);
        assert_eq!(j.pairs.len(), 2);
        assert_eq!(j.pairs[0].1.map(|r| r.1), Some(10));
        assert!(j.pairs[1].1.is_none());
        assert!(j.warning.is_none());
    }

    #[test]
    fn duplicate_right_keys_fan_out_and_warn() {
        let left = [("a", 1)];
        let right = [("a", 10), ("a", 11)];
        let j = left_join("dup", &left, &right, |l| l.0, |r| r.0);
        assert_eq!(j.pairs.len(), 2);
        assert_eq!(
            j.warning,
            Some(JoinCardinalityWarning {
                join: "dup",
                left_rows: 1,
                output_rows: 2
            })
        );
    }
}
