use std::collections::BTreeMap;

/// Group `rows` by `key` and sum one metric. `None` values are skipped, so
/// a group whose values are all missing sums to 0.
///
/// Confirmed and deaths are each summed in their own pass and joined
/// afterwards, keeping missing-value handling independent per metric.
pub fn sum_by<'a, R, K, FK, FV>(rows: &'a [R], key: FK, value: FV) -> BTreeMap<K, i64>
where
    K: Ord,
    FK: Fn(&'a R) -> K,
    FV: Fn(&'a R) -> Option<i64>,
{
    let mut sums: BTreeMap<K, i64> = BTreeMap::new();
    for r in rows {
        let total = sums.entry(key(r)).or_insert(0);
        if let Some(v) = value(r) {
            *total += v;
        }
    }
    sums
}

/// Join two per-key sums on their keys; keys missing from `right` get `None`.
pub fn zip_sums<K: Ord + Clone>(
    left: BTreeMap<K, i64>,
    right: &BTreeMap<K, i64>,
) -> Vec<(K, i64, Option<i64>)> {
    left.into_iter()
        .map(|(k, l)| {
            let r = right.get(&k).copied();
            (k, l, r)
        })
        .collect()
}
