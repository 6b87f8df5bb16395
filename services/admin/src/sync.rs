//! Reconciliation of user association edges against a requested id set

use std::collections::BTreeSet;
use tracing::debug;

use crate::error::AdminResult;
use crate::models::Association;
use crate::store::UserStore;

/// How an association's edges are brought in line with a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStrategy {
    /// Insert only missing edges and delete only stale ones
    ByDiff,
    /// Delete every existing edge, then insert the requested set
    ByReplace,
}

/// Edges touched by one sync
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub inserted: Vec<i64>,
    pub removed: Vec<i64>,
}

/// Make the user's `association` edges equal to `requested`.
///
/// Duplicate ids in `requested` collapse to one edge.
pub async fn sync_edges<S: UserStore>(
    store: &mut S,
    association: Association,
    user_id: i64,
    requested: &[i64],
    strategy: SyncStrategy,
) -> AdminResult<SyncReport> {
    let requested: BTreeSet<i64> = requested.iter().copied().collect();
    let existing: BTreeSet<i64> = store
        .edge_targets(association, user_id)
        .await?
        .into_iter()
        .collect();

    let report = match strategy {
        SyncStrategy::ByDiff => sync_by_diff(store, association, user_id, &requested, &existing).await?,
        SyncStrategy::ByReplace => {
            sync_by_replace(store, association, user_id, &requested, &existing).await?
        }
    };

    debug!(
        "Synced {:?} for user {}: +{:?} -{:?}",
        association, user_id, report.inserted, report.removed
    );

    Ok(report)
}

async fn sync_by_diff<S: UserStore>(
    store: &mut S,
    association: Association,
    user_id: i64,
    requested: &BTreeSet<i64>,
    existing: &BTreeSet<i64>,
) -> AdminResult<SyncReport> {
    if requested.is_empty() {
        store.delete_all_edges(association, user_id).await?;
        return Ok(SyncReport {
            inserted: Vec::new(),
            removed: existing.iter().copied().collect(),
        });
    }

    let inserted: Vec<i64> = requested.difference(existing).copied().collect();
    for target_id in &inserted {
        store
            .first_or_create_edge(association, user_id, *target_id)
            .await?;
    }

    let removed: Vec<i64> = existing.difference(requested).copied().collect();
    if !removed.is_empty() {
        store.delete_edges(association, user_id, &removed).await?;
    }

    Ok(SyncReport { inserted, removed })
}

async fn sync_by_replace<S: UserStore>(
    store: &mut S,
    association: Association,
    user_id: i64,
    requested: &BTreeSet<i64>,
    existing: &BTreeSet<i64>,
) -> AdminResult<SyncReport> {
    store.delete_all_edges(association, user_id).await?;

    for target_id in requested {
        store
            .first_or_create_edge(association, user_id, *target_id)
            .await?;
    }

    Ok(SyncReport {
        inserted: requested.iter().copied().collect(),
        removed: existing.iter().copied().collect(),
    })
}
