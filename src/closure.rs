/*!
 * Resolve the set of fires that merged into a fire.
 *
 * When connectfire joins two fires, the smaller one is marked as `merged_into` the other. Those
 * records form a forest, and the merge closure of a fire is the subtree rooted at it: every fire
 * whose chain of `merged_into` links eventually reaches the root.
 */

use crate::{store::FireStore, FireId, FirePowerResult};
use log::{debug, warn};
use rustc_hash::FxHashSet as HashSet;

/// The root fire and every fire that merged into it, directly or transitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeClosure {
    root: FireId,
    /// Sorted ascending, no duplicates.
    members: Vec<FireId>,
}

impl MergeClosure {
    /// The fire the closure was resolved for.
    pub fn root(&self) -> FireId {
        self.root
    }

    /// All the fire ids in the closure in ascending order.
    pub fn members(&self) -> &[FireId] {
        &self.members
    }

    /// Is `fire_id` part of this closure?
    pub fn contains(&self, fire_id: FireId) -> bool {
        self.members.binary_search(&fire_id).is_ok()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// An empty closure means the root fire does not exist.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = FireId> + '_ {
        self.members.iter().copied()
    }
}

/// Find every fire that merged into `root`, including `root` itself.
///
/// The search expands a frontier over the inverse of the `merged_into` relation until no new ids
/// turn up. If `root` is not in the store, the closure is empty. A fire that shows up a second
/// time means the merge records contain a cycle; it is logged and not expanded again.
pub fn resolve_closure<S: FireStore + ?Sized>(
    store: &S,
    root: FireId,
) -> FirePowerResult<MergeClosure> {
    if store.fire(root)?.is_none() {
        debug!(target: "closure", "fire {} not found", root);
        return Ok(MergeClosure {
            root,
            members: vec![],
        });
    }

    let mut visited: HashSet<FireId> = HashSet::default();
    visited.insert(root);

    let mut frontier = vec![root];
    while !frontier.is_empty() {
        let mut next = Vec::with_capacity(frontier.len());

        for fire in store.fires_merged_into(&frontier)? {
            if visited.insert(fire.fire_id) {
                next.push(fire.fire_id);
            } else {
                warn!(
                    target: "closure",
                    "malformed merge chain: fire {} reached twice while resolving fire {}",
                    fire.fire_id,
                    root
                );
            }
        }

        frontier = next;
    }

    let mut members: Vec<FireId> = visited.into_iter().collect();
    members.sort_unstable();

    debug!(target: "closure", "fire {} has {} members in its merge closure", root, members.len());

    Ok(MergeClosure { root, members })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{store::FireRecord, FireArena};

    fn chain() -> FireArena {
        // 3 -> 2 -> 1
        let mut arena = FireArena::new();
        arena.add_fire(FireRecord::new(1, "G17"));
        arena.add_fire(FireRecord::new(2, "G17").merged_into(1));
        arena.add_fire(FireRecord::new(3, "G17").merged_into(2));
        arena
    }

    #[test]
    fn test_unmerged_fire_is_its_own_closure() {
        let mut arena = FireArena::new();
        arena.add_fire(FireRecord::new(5, "G16"));
        arena.add_fire(FireRecord::new(6, "G16"));

        let closure = resolve_closure(&arena, 5).unwrap();
        assert_eq!(closure.members(), &[5]);
        assert_eq!(closure.root(), 5);
    }

    #[test]
    fn test_chain() {
        let arena = chain();

        assert_eq!(resolve_closure(&arena, 1).unwrap().members(), &[1, 2, 3]);
        assert_eq!(resolve_closure(&arena, 2).unwrap().members(), &[2, 3]);
        assert_eq!(resolve_closure(&arena, 3).unwrap().members(), &[3]);
    }

    #[test]
    fn test_tree_is_sorted() {
        let mut arena = FireArena::new();
        arena.add_fire(FireRecord::new(10, "G17"));
        arena.add_fire(FireRecord::new(40, "G17").merged_into(10));
        arena.add_fire(FireRecord::new(20, "G17").merged_into(10));
        arena.add_fire(FireRecord::new(30, "G17").merged_into(40));
        arena.add_fire(FireRecord::new(5, "G17").merged_into(20));
        arena.add_fire(FireRecord::new(99, "G17"));

        let closure = resolve_closure(&arena, 10).unwrap();
        assert_eq!(closure.members(), &[5, 10, 20, 30, 40]);
        assert!(closure.contains(30));
        assert!(!closure.contains(99));
        assert_eq!(closure.iter().count(), closure.len());
    }

    #[test]
    fn test_missing_root_is_empty() {
        let arena = chain();

        let closure = resolve_closure(&arena, 77).unwrap();
        assert!(closure.is_empty());
        assert_eq!(closure.root(), 77);
    }

    #[test]
    fn test_cycle_terminates() {
        let mut arena = FireArena::new();
        arena.add_fire(FireRecord::new(1, "G17").merged_into(3));
        arena.add_fire(FireRecord::new(2, "G17").merged_into(1));
        arena.add_fire(FireRecord::new(3, "G17").merged_into(2));

        assert_eq!(resolve_closure(&arena, 1).unwrap().members(), &[1, 2, 3]);
        assert_eq!(resolve_closure(&arena, 2).unwrap().members(), &[1, 2, 3]);
    }

    #[test]
    fn test_self_merge_terminates() {
        let mut arena = FireArena::new();
        arena.add_fire(FireRecord::new(4, "G16").merged_into(4));

        assert_eq!(resolve_closure(&arena, 4).unwrap().members(), &[4]);
    }
}
