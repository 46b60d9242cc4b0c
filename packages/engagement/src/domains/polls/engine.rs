//! Pure poll voting logic. Every vote fully replaces the member's previous
//! ballot and every change recounts from the ballot set.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use super::models::{PollBallot, PollVote};
use crate::common::{EngagementError, EngagementResult, MemberId, PollOptionId};

/// Check a ballot without touching the poll.
pub fn validate(
    poll: &PollBallot,
    option_ids: &BTreeSet<PollOptionId>,
    now: DateTime<Utc>,
) -> EngagementResult<()> {
    if let Some(expired_at) = poll.expires_at.filter(|_| poll.is_expired(now)) {
        return Err(EngagementError::PollExpired { expired_at });
    }

    if option_ids.is_empty() {
        return Err(EngagementError::InvalidVote(
            "at least one option must be chosen".to_string(),
        ));
    }

    if !poll.is_multiple_choice && option_ids.len() != 1 {
        return Err(EngagementError::InvalidVote(format!(
            "single-choice poll accepts exactly one option, got {}",
            option_ids.len()
        )));
    }

    if let Some(unknown) = option_ids.iter().find(|id| poll.option(**id).is_none()) {
        return Err(EngagementError::InvalidVote(format!(
            "unknown poll option: {}",
            unknown
        )));
    }

    Ok(())
}

/// Record `user_id`'s choice. Re-submitting the identical set is a no-op,
/// also on a closed poll.
pub fn cast(
    poll: &mut PollBallot,
    user_id: MemberId,
    option_ids: BTreeSet<PollOptionId>,
    now: DateTime<Utc>,
) -> EngagementResult<bool> {
    if poll.ballot_for(user_id).map(|b| &b.option_ids) == Some(&option_ids) {
        return Ok(false);
    }

    validate(poll, &option_ids, now)?;

    poll.ballots.retain(|b| b.user_id != user_id);
    poll.ballots.push(PollVote {
        user_id,
        option_ids,
        voted_at: now,
    });
    recompute(poll);
    Ok(true)
}

/// Remove `user_id`'s ballot. Absent ballots are a no-op even on a closed
/// poll; removing a real ballot from a closed poll is rejected.
pub fn retract(poll: &mut PollBallot, user_id: MemberId, now: DateTime<Utc>) -> EngagementResult<bool> {
    if poll.ballot_for(user_id).is_none() {
        return Ok(false);
    }
    if let Some(expired_at) = poll.expires_at.filter(|_| poll.is_expired(now)) {
        return Err(EngagementError::PollExpired { expired_at });
    }

    poll.ballots.retain(|b| b.user_id != user_id);
    recompute(poll);
    Ok(true)
}

/// Rebuild every option count and the total from the ballots.
pub fn recompute(poll: &mut PollBallot) {
    for option in poll.options.iter_mut() {
        option.vote_count = poll
            .ballots
            .iter()
            .filter(|b| b.option_ids.contains(&option.id))
            .count() as u32;
    }
    poll.total_votes = poll.options.iter().map(|o| o.vote_count).sum();
}
