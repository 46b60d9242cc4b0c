use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{EngagementError, EngagementResult, MemberId, PollOptionId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollOption {
    pub id: PollOptionId,
    pub text: String,
    /// Derived from the ballots; rewritten on every vote change.
    pub vote_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollVote {
    pub user_id: MemberId,
    pub option_ids: BTreeSet<PollOptionId>,
    pub voted_at: DateTime<Utc>,
}

/// Poll definition plus every member's current choice.
///
/// `ballots` is the only source of truth. Option counts and `total_votes`
/// are recomputed from it after each change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollBallot {
    pub(crate) options: Vec<PollOption>,
    pub(crate) ballots: Vec<PollVote>,
    pub(crate) total_votes: u32,
    pub is_multiple_choice: bool,
    pub expires_at: Option<DateTime<Utc>>,
}

impl PollBallot {
    /// Build an empty poll from its definition.
    pub fn from_spec(spec: &PollSpec) -> EngagementResult<Self> {
        if spec.options.len() < 2 {
            return Err(EngagementError::InvalidVote(
                "a poll needs at least two options".to_string(),
            ));
        }

        let mut seen = BTreeSet::new();
        let mut options = Vec::with_capacity(spec.options.len());
        for text in &spec.options {
            let text = text.trim();
            if text.is_empty() {
                return Err(EngagementError::InvalidVote(
                    "poll options cannot be blank".to_string(),
                ));
            }
            if !seen.insert(text.to_lowercase()) {
                return Err(EngagementError::InvalidVote(format!(
                    "duplicate poll option: {}",
                    text
                )));
            }
            options.push(PollOption {
                id: PollOptionId::new(),
                text: text.to_string(),
                vote_count: 0,
            });
        }

        Ok(Self {
            options,
            ballots: Vec::new(),
            total_votes: 0,
            is_multiple_choice: spec.is_multiple_choice,
            expires_at: spec.expires_at,
        })
    }

    pub fn options(&self) -> &[PollOption] {
        &self.options
    }

    pub fn option(&self, id: PollOptionId) -> Option<&PollOption> {
        self.options.iter().find(|o| o.id == id)
    }

    pub fn ballots(&self) -> &[PollVote] {
        &self.ballots
    }

    pub fn total_votes(&self) -> u32 {
        self.total_votes
    }

    /// Number of members with a ballot. Differs from `total_votes` on
    /// multiple-choice polls.
    pub fn voter_count(&self) -> u32 {
        self.ballots.len() as u32
    }

    pub fn ballot_for(&self, user_id: MemberId) -> Option<&PollVote> {
        self.ballots.iter().find(|b| b.user_id == user_id)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|at| at <= now).unwrap_or(false)
    }
}

/// Definition of a poll attached at item creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollSpec {
    pub options: Vec<String>,
    #[serde(default)]
    pub is_multiple_choice: bool,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Read views
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PollOptionResult {
    pub id: PollOptionId,
    pub text: String,
    pub vote_count: u32,
    /// Share of `total_votes`, 0.0..=100.0, one decimal place.
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PollResults {
    pub options: Vec<PollOptionResult>,
    pub total_votes: u32,
    pub voter_count: u32,
    pub is_multiple_choice: bool,
    pub is_expired: bool,
    pub viewer_choice: Option<BTreeSet<PollOptionId>>,
}

impl PollResults {
    pub fn for_viewer(poll: &PollBallot, viewer: Option<MemberId>, now: DateTime<Utc>) -> Self {
        let total = poll.total_votes();
        let options = poll
            .options()
            .iter()
            .map(|o| PollOptionResult {
                id: o.id,
                text: o.text.clone(),
                vote_count: o.vote_count,
                percentage: percentage(o.vote_count, total),
            })
            .collect();

        Self {
            options,
            total_votes: total,
            voter_count: poll.voter_count(),
            is_multiple_choice: poll.is_multiple_choice,
            is_expired: poll.is_expired(now),
            viewer_choice: viewer
                .and_then(|v| poll.ballot_for(v))
                .map(|b| b.option_ids.clone()),
        }
    }
}

fn percentage(count: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (f64::from(count) * 1000.0 / f64::from(total)).round() / 10.0
}
