//! Invariant checks over a stored content item.
//!
//! The engines never produce these violations themselves. The checks exist
//! to catch records written by anything else (imports, manual edits) and to
//! back the `engagement audit` command.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::common::{MemberId, PollOptionId};
use crate::domains::content::ContentItem;
use crate::domains::interactions::models::BucketName;
use crate::domains::orientation::median;
use crate::domains::orientation::models::{Orientation, OrientationTally};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "violation", rename_all = "snake_case")]
pub enum InvariantViolation {
    BucketCountDrift {
        bucket: BucketName,
        stored: u32,
        members: u32,
    },
    DuplicateBucketMember {
        bucket: BucketName,
        user_id: MemberId,
    },
    DuplicateOrientationBallot {
        user_id: MemberId,
    },
    TallyDrift {
        category: Orientation,
        stored: u32,
        actual: u32,
    },
    ResolvedViewDrift {
        stored: Orientation,
        expected: Orientation,
    },
    DuplicatePollBallot {
        user_id: MemberId,
    },
    EmptyPollBallot {
        user_id: MemberId,
    },
    UnknownPollOption {
        user_id: MemberId,
        option_id: PollOptionId,
    },
    PollCountDrift {
        option_id: PollOptionId,
        stored: u32,
        actual: u32,
    },
    PollTotalDrift {
        stored: u32,
        actual: u32,
    },
}

/// Every invariant the item currently violates. Empty when healthy.
pub fn check(item: &ContentItem) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    check_buckets(item, &mut violations);
    check_orientation(item, &mut violations);
    check_poll(item, &mut violations);
    violations
}

fn check_buckets(item: &ContentItem, out: &mut Vec<InvariantViolation>) {
    for bucket in BucketName::ALL {
        let b = item.interactions.get(bucket);
        let members = b.members().len() as u32;
        if b.count() != members {
            out.push(InvariantViolation::BucketCountDrift {
                bucket,
                stored: b.count(),
                members,
            });
        }
        for user_id in duplicates(b.members().iter().map(|m| m.user_id)) {
            out.push(InvariantViolation::DuplicateBucketMember { bucket, user_id });
        }
    }
}

fn check_orientation(item: &ContentItem, out: &mut Vec<InvariantViolation>) {
    let ballot = &item.orientation;

    for user_id in duplicates(ballot.ballots().iter().map(|b| b.user_id)) {
        out.push(InvariantViolation::DuplicateOrientationBallot { user_id });
    }

    let mut counts = [0u32; 5];
    for vote in ballot.ballots() {
        counts[vote.category.index()] += 1;
    }
    let actual = OrientationTally::from_frequencies(counts);

    for category in Orientation::ALL {
        let stored = ballot.tally().get(category);
        if stored != actual.get(category) {
            out.push(InvariantViolation::TallyDrift {
                category,
                stored,
                actual: actual.get(category),
            });
        }
    }

    let expected = median::resolve(&actual);
    if ballot.resolved_view() != expected {
        out.push(InvariantViolation::ResolvedViewDrift {
            stored: ballot.resolved_view(),
            expected,
        });
    }
}

fn check_poll(item: &ContentItem, out: &mut Vec<InvariantViolation>) {
    let Some(poll) = item.poll.as_ref() else {
        return;
    };

    for user_id in duplicates(poll.ballots().iter().map(|b| b.user_id)) {
        out.push(InvariantViolation::DuplicatePollBallot { user_id });
    }

    for vote in poll.ballots() {
        if vote.option_ids.is_empty() {
            out.push(InvariantViolation::EmptyPollBallot {
                user_id: vote.user_id,
            });
        }
        for option_id in &vote.option_ids {
            if poll.option(*option_id).is_none() {
                out.push(InvariantViolation::UnknownPollOption {
                    user_id: vote.user_id,
                    option_id: *option_id,
                });
            }
        }
    }

    let mut total = 0u32;
    for option in poll.options() {
        let actual = poll
            .ballots()
            .iter()
            .filter(|b| b.option_ids.contains(&option.id))
            .count() as u32;
        total += actual;
        if option.vote_count != actual {
            out.push(InvariantViolation::PollCountDrift {
                option_id: option.id,
                stored: option.vote_count,
                actual,
            });
        }
    }

    if poll.total_votes() != total {
        out.push(InvariantViolation::PollTotalDrift {
            stored: poll.total_votes(),
            actual: total,
        });
    }
}

fn duplicates(ids: impl Iterator<Item = MemberId>) -> Vec<MemberId> {
    let mut seen = BTreeSet::new();
    let mut dupes = BTreeSet::new();
    for id in ids {
        if !seen.insert(id) {
            dupes.insert(id);
        }
    }
    dupes.into_iter().collect()
}
