//! Cycle prevention for category reparenting.

use crate::error::StoreError;
use crate::ids::CategoryId;
use crate::store::CategoryStore;

/// Returns whether making `proposed_parent` the parent of `node` would close a cycle.
///
/// Walks the ancestor chain upward from `proposed_parent`. The answer is `true`
/// when `node` is met on the way (including `proposed_parent == node`) or when
/// the walk exceeds `max_depth` hops without reaching a root. A dangling
/// parent pointer ends the walk like a root does.
///
/// Run this inside the same transaction as the parent write it guards.
pub fn would_create_cycle<S: CategoryStore + ?Sized>(
    store: &S,
    node: CategoryId,
    proposed_parent: CategoryId,
    max_depth: usize,
) -> Result<bool, StoreError> {
    let mut current = proposed_parent;
    for _ in 0..=max_depth {
        if current == node {
            return Ok(true);
        }
        match store.get_category(current)?.and_then(|c| c.parent_id) {
            Some(parent) => current = parent,
            None => return Ok(false),
        }
    }

    tracing::warn!(
        node = node.get(),
        proposed_parent = proposed_parent.get(),
        max_depth,
        "Ancestor walk exceeded depth cap, treating as cycle"
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;
    use crate::store::{CategoryStore, Tables};
    use chrono::Utc;
    use ntest::timeout;

    fn add(tables: &mut Tables, name: &str, parent: Option<CategoryId>) -> CategoryId {
        let now = Utc::now();
        tables
            .create_category(Category {
                id: CategoryId(0),
                name: name.to_string(),
                description: String::new(),
                parent_id: parent,
                icon: String::new(),
                color: String::new(),
                sort: 0,
                is_active: true,
                created_at: now,
                updated_at: now,
            })
            .unwrap()
    }

    /// A -> B -> C plus an unrelated root D.
    fn chain() -> (Tables, [CategoryId; 4]) {
        let mut tables = Tables::default();
        let a = add(&mut tables, "A", None);
        let b = add(&mut tables, "B", Some(a));
        let c = add(&mut tables, "C", Some(b));
        let d = add(&mut tables, "D", None);
        (tables, [a, b, c, d])
    }

    #[timeout(1000)]
    #[test]
    fn test_descendant_as_parent_is_cycle() {
        let (tables, [a, b, c, _]) = chain();
        assert!(would_create_cycle(&tables, a, c, 1024).unwrap());
        assert!(would_create_cycle(&tables, a, b, 1024).unwrap());
        assert!(would_create_cycle(&tables, b, c, 1024).unwrap());
    }

    #[timeout(1000)]
    #[test]
    fn test_unrelated_or_ancestor_parent_is_fine() {
        let (tables, [a, b, c, d]) = chain();
        assert!(!would_create_cycle(&tables, a, d, 1024).unwrap());
        assert!(!would_create_cycle(&tables, c, a, 1024).unwrap());
        assert!(!would_create_cycle(&tables, d, b, 1024).unwrap());
    }

    #[timeout(1000)]
    #[test]
    fn test_self_parent_is_cycle() {
        let (tables, [a, _, _, d]) = chain();
        assert!(would_create_cycle(&tables, a, a, 1024).unwrap());
        assert!(would_create_cycle(&tables, d, d, 0).unwrap());
    }

    #[timeout(1000)]
    #[test]
    fn test_depth_cap_answers_cycle() {
        let (tables, [a, _, c, d]) = chain();
        // C -> B -> A is two hops
        assert!(!would_create_cycle(&tables, d, c, 2).unwrap());
        assert!(would_create_cycle(&tables, d, c, 1).unwrap());
        assert!(!would_create_cycle(&tables, d, a, 0).unwrap());
    }

    #[timeout(1000)]
    #[test]
    fn test_corrupt_loop_terminates() {
        let (mut tables, [a, b, c, d]) = chain();
        let mut root = tables.get_category(a).unwrap().unwrap();
        root.parent_id = Some(c);
        tables.replace_category(root).unwrap();

        assert!(would_create_cycle(&tables, d, b, 64).unwrap());
    }
}
