//! Chooses which migrations a run executes, and in which order.

use super::registry::MigrationRegistry;
use super::types::{AppliedLookup, Migration, MigrationDirection};
use std::sync::Arc;

/// Compute the plan for `direction`.
///
/// Up runs every pending version ascending; down rolls back every applied
/// version descending. A positive `run_count` keeps only the `run_count`
/// highest eligible versions, selected before the down list is reversed.
/// A count larger than the candidate set keeps all of them.
pub fn collect_migrations(
    registry: &MigrationRegistry,
    applied: &AppliedLookup,
    direction: MigrationDirection,
    run_count: usize,
) -> Vec<Arc<Migration>> {
    // Registry iteration is already ascending by version
    let mut plan: Vec<Arc<Migration>> = registry
        .iter()
        .filter(|m| {
            let is_applied = applied.contains_key(&m.version);
            match direction {
                MigrationDirection::Up => !is_applied,
                MigrationDirection::Down => is_applied,
            }
        })
        .cloned()
        .collect();

    if run_count > 0 && run_count < plan.len() {
        let skip = plan.len() - run_count;
        plan.drain(..skip);
    }

    if direction == MigrationDirection::Down {
        plan.reverse();
    }

    plan
}
