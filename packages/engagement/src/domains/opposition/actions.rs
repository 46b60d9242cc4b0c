//! Opposition link actions.
//!
//! A link touches two content items and the store has no multi-record
//! transaction. The opposing item is written first, then the opposed item.
//! If the second write fails, the first is reverted with a compensating
//! write and the pair is retried up to the write policy's bound before
//! `PartialFailure` surfaces.

use futures::future::join_all;
use tracing::{debug, error, info, instrument, warn};

use super::engine;
use super::models::{EdgeDirection, OppositionEdge, ResolvedOpposition};
use crate::common::{ContentItemId, EngagementError, EngagementResult};
use crate::domains::content::ContentItem;
use crate::domains::events::EngagementEvent;
use crate::kernel::write::{load_item, mutate_item};
use crate::kernel::EngagementDeps;

#[derive(Debug, Clone)]
pub struct OppositionOutcome {
    pub opposing: ContentItem,
    pub opposed: ContentItem,
    pub changed: bool,
}

/// What to do after the second half of a pair write failed.
enum PairFailure {
    Retry,
    Fail(EngagementError),
}

fn settle_pair_failure(
    err: EngagementError,
    compensated: bool,
    round: u32,
    rounds: u32,
    first: ContentItemId,
    second: ContentItemId,
) -> PairFailure {
    if compensated {
        // The second item vanished: report it as such, nothing is left behind
        if matches!(err, EngagementError::NotFound { .. }) {
            return PairFailure::Fail(err);
        }
        if round < rounds {
            warn!(%first, %second, round, error = %err, "second write failed, retrying pair");
            return PairFailure::Retry;
        }
    }

    PairFailure::Fail(EngagementError::PartialFailure {
        first,
        second,
        compensated,
        cause: err.to_string(),
    })
}

/// Link `opposing_id -> opposed_id` with the mirror edge on the opposed item.
///
/// Adding an existing link is a no-op, except that a missing or stale mirror
/// edge is brought in line with the opposing side.
#[instrument(skip(deps))]
pub async fn add_opposition(
    deps: &EngagementDeps,
    opposing_id: ContentItemId,
    opposed_id: ContentItemId,
    description: &str,
) -> EngagementResult<OppositionOutcome> {
    let rounds = deps.policy.max_attempts;

    for round in 1..=rounds {
        let opposing = load_item(deps, opposing_id).await?;
        let opposed = load_item(deps, opposed_id).await?;
        engine::ensure_distinct_authors(&opposing, &opposed)?;

        let first = mutate_item(deps, opposing_id, |item, now| {
            Ok(engine::link_outgoing(item, opposed_id, description, now))
        })
        .await?;

        // Mirror whatever description the committed edge carries
        let mirror_description = first
            .item
            .opposition_links
            .iter()
            .find(|e| e.target_id == opposed_id)
            .map(|e| e.description.clone())
            .unwrap_or_else(|| description.to_string());

        let second = mutate_item(deps, opposed_id, |item, now| {
            Ok(engine::link_incoming(item, opposing_id, &mirror_description, now))
        })
        .await;

        match second {
            Ok(second) => {
                let changed = first.changed || second.changed;
                if changed {
                    info!(round, "opposition linked");
                    deps.notify(EngagementEvent::OppositionAdded {
                        opposing_id,
                        opposed_id,
                        opposed_author_id: second.item.author_id,
                        description: mirror_description,
                    })
                    .await;
                }
                return Ok(OppositionOutcome {
                    opposing: first.item,
                    opposed: second.item,
                    changed,
                });
            }
            Err(err) if !first.changed => return Err(err),
            Err(err) => {
                let compensated = mutate_item(deps, opposing_id, |item, _now| {
                    Ok(engine::unlink_outgoing(item, opposed_id))
                })
                .await
                .map_err(|e| error!(%opposing_id, error = %e, "failed to revert opposition edge"))
                .is_ok();

                match settle_pair_failure(err, compensated, round, rounds, opposing_id, opposed_id)
                {
                    PairFailure::Retry => continue,
                    PairFailure::Fail(e) => return Err(e),
                }
            }
        }
    }

    // Only reachable with a zero-round policy, which WritePolicy forbids
    Err(EngagementError::Contention { attempts: rounds })
}

/// Remove every edge between the two items, in both directions and on both
/// sides. Removing a link that does not exist is a no-op.
#[instrument(skip(deps))]
pub async fn remove_opposition(
    deps: &EngagementDeps,
    opposing_id: ContentItemId,
    opposed_id: ContentItemId,
) -> EngagementResult<OppositionOutcome> {
    let rounds = deps.policy.max_attempts;

    for round in 1..=rounds {
        load_item(deps, opposing_id).await?;
        load_item(deps, opposed_id).await?;

        let mut stripped = engine::StrippedEdges::default();
        let first = mutate_item(deps, opposing_id, |item, _now| {
            stripped = engine::strip_edges(item, opposed_id);
            Ok(!stripped.is_empty())
        })
        .await?;

        let second = mutate_item(deps, opposed_id, |item, _now| {
            Ok(!engine::strip_edges(item, opposing_id).is_empty())
        })
        .await;

        match second {
            Ok(second) => {
                let changed = first.changed || second.changed;
                if changed {
                    info!(round, "opposition unlinked");
                    deps.notify(EngagementEvent::OppositionRemoved {
                        opposing_id,
                        opposed_id,
                    })
                    .await;
                }
                return Ok(OppositionOutcome {
                    opposing: first.item,
                    opposed: second.item,
                    changed,
                });
            }
            Err(err) if !first.changed => return Err(err),
            Err(err) => {
                let compensated = mutate_item(deps, opposing_id, |item, _now| {
                    Ok(engine::restore_edges(item, &stripped))
                })
                .await
                .map_err(|e| error!(%opposing_id, error = %e, "failed to restore opposition edges"))
                .is_ok();

                match settle_pair_failure(err, compensated, round, rounds, opposing_id, opposed_id)
                {
                    PairFailure::Retry => continue,
                    PairFailure::Fail(e) => return Err(e),
                }
            }
        }
    }

    Err(EngagementError::Contention { attempts: rounds })
}

/// List an item's edges whose targets still resolve.
pub async fn list_oppositions(
    deps: &EngagementDeps,
    item_id: ContentItemId,
    direction: EdgeDirection,
) -> EngagementResult<Vec<ResolvedOpposition>> {
    list_visible_oppositions(deps, item_id, direction, |_| true).await
}

/// Like [`list_oppositions`], additionally dropping targets the caller may
/// not see.
///
/// Edges to missing, soft-deleted, unreadable or hidden targets are left out
/// of the result but never removed from storage, so they reappear if the
/// target comes back.
pub async fn list_visible_oppositions<F>(
    deps: &EngagementDeps,
    item_id: ContentItemId,
    direction: EdgeDirection,
    is_visible: F,
) -> EngagementResult<Vec<ResolvedOpposition>>
where
    F: Fn(&ContentItem) -> bool,
{
    let item = load_item(deps, item_id).await?;
    let edges: Vec<OppositionEdge> = match direction {
        EdgeDirection::Opposes => item.opposition_links,
        EdgeDirection::OpposedBy => item.opposed_by_links,
    };

    let targets = join_all(edges.iter().map(|e| deps.store.load(e.target_id))).await;

    let mut resolved = Vec::with_capacity(edges.len());
    for (edge, target) in edges.into_iter().zip(targets) {
        match target {
            Ok(Some(target)) if !target.is_deleted() && is_visible(&target) => {
                resolved.push(ResolvedOpposition { edge, target });
            }
            Ok(_) => {
                debug!(%item_id, target_id = %edge.target_id, "filtered unresolvable opposition target");
            }
            Err(e) => {
                warn!(%item_id, target_id = %edge.target_id, error = %e, "opposition target fetch failed, filtering");
            }
        }
    }

    Ok(resolved)
}
