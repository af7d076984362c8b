//! Ordered group-by for flat catalog rows.
//!
//! Index and foreign key catalogs return one row per (entity, column). These
//! helpers fold them back into one entry per key, keeping groups in first-seen
//! order and members in row order.

use std::collections::HashMap;
use std::hash::Hash;

/// Group `rows` by `key`, mapping each row to a member with `member`.
pub fn group_ordered<R, K, V>(
    rows: impl IntoIterator<Item = R>,
    key: impl Fn(&R) -> K,
    member: impl Fn(R) -> V,
) -> Vec<(K, Vec<V>)>
where
    K: Eq + Hash + Clone,
{
    let mut groups: Vec<(K, Vec<V>)> = Vec::new();
    let mut positions: HashMap<K, usize> = HashMap::new();

    for row in rows {
        let k = key(&row);
        let value = member(row);
        match positions.get(&k) {
            Some(&idx) => groups[idx].1.push(value),
            None => {
                positions.insert(k.clone(), groups.len());
                groups.push((k, vec![value]));
            }
        }
    }

    groups
}
