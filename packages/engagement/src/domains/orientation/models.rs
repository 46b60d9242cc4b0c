use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::median;
use crate::common::{EngagementError, MemberId};

// =============================================================================
// Orientation
// =============================================================================

/// Five-point ordinal political orientation, scored -2..=2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    ExtremelyConservative,
    Conservative,
    Neutral,
    Progressive,
    ExtremelyProgressive,
}

impl Orientation {
    /// Ordered low to high.
    pub const ALL: [Orientation; 5] = [
        Orientation::ExtremelyConservative,
        Orientation::Conservative,
        Orientation::Neutral,
        Orientation::Progressive,
        Orientation::ExtremelyProgressive,
    ];

    pub fn score(&self) -> i8 {
        match self {
            Orientation::ExtremelyConservative => -2,
            Orientation::Conservative => -1,
            Orientation::Neutral => 0,
            Orientation::Progressive => 1,
            Orientation::ExtremelyProgressive => 2,
        }
    }

    pub fn from_score(score: i8) -> Option<Self> {
        match score {
            -2 => Some(Orientation::ExtremelyConservative),
            -1 => Some(Orientation::Conservative),
            0 => Some(Orientation::Neutral),
            1 => Some(Orientation::Progressive),
            2 => Some(Orientation::ExtremelyProgressive),
            _ => None,
        }
    }

    /// Position in [`Orientation::ALL`].
    pub fn index(&self) -> usize {
        (self.score() + 2) as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::ExtremelyConservative => "extremely_conservative",
            Orientation::Conservative => "conservative",
            Orientation::Neutral => "neutral",
            Orientation::Progressive => "progressive",
            Orientation::ExtremelyProgressive => "extremely_progressive",
        }
    }
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Orientation {
    type Err = EngagementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "extremely_conservative" | "extremelyConservative" => {
                Ok(Orientation::ExtremelyConservative)
            }
            "conservative" => Ok(Orientation::Conservative),
            "neutral" => Ok(Orientation::Neutral),
            "progressive" => Ok(Orientation::Progressive),
            "extremely_progressive" | "extremelyProgressive" => {
                Ok(Orientation::ExtremelyProgressive)
            }
            _ => Err(EngagementError::InvalidCategory(s.to_string())),
        }
    }
}

// =============================================================================
// Tally
// =============================================================================

/// Vote counts per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrientationTally {
    pub extremely_conservative: u32,
    pub conservative: u32,
    pub neutral: u32,
    pub progressive: u32,
    pub extremely_progressive: u32,
}

impl OrientationTally {
    /// Build from counts ordered low to high.
    pub fn from_frequencies(counts: [u32; 5]) -> Self {
        let [extremely_conservative, conservative, neutral, progressive, extremely_progressive] =
            counts;
        Self {
            extremely_conservative,
            conservative,
            neutral,
            progressive,
            extremely_progressive,
        }
    }

    /// Counts ordered low to high.
    pub fn frequencies(&self) -> [u32; 5] {
        [
            self.extremely_conservative,
            self.conservative,
            self.neutral,
            self.progressive,
            self.extremely_progressive,
        ]
    }

    pub fn get(&self, category: Orientation) -> u32 {
        self.frequencies()[category.index()]
    }

    pub fn total(&self) -> u32 {
        self.frequencies().iter().sum()
    }
}

// =============================================================================
// Ballot
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrientationVote {
    pub user_id: MemberId,
    pub category: Orientation,
    pub voted_at: DateTime<Utc>,
}

/// One vote per member, the tally over those votes, and the median view.
///
/// `tally` and `resolved_view` are derived: both are rebuilt from `ballots`
/// after every change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrientationBallot {
    tally: OrientationTally,
    ballots: Vec<OrientationVote>,
    resolved_view: Orientation,
}

impl Default for OrientationBallot {
    fn default() -> Self {
        Self {
            tally: OrientationTally::default(),
            ballots: Vec::new(),
            resolved_view: Orientation::Neutral,
        }
    }
}

impl OrientationBallot {
    pub fn tally(&self) -> &OrientationTally {
        &self.tally
    }

    pub fn ballots(&self) -> &[OrientationVote] {
        &self.ballots
    }

    pub fn resolved_view(&self) -> Orientation {
        self.resolved_view
    }

    pub fn ballot_for(&self, user_id: MemberId) -> Option<&OrientationVote> {
        self.ballots.iter().find(|b| b.user_id == user_id)
    }

    /// Record `user_id`'s vote. Re-voting the same category is a no-op;
    /// a different category replaces the previous vote.
    pub(crate) fn cast(
        &mut self,
        user_id: MemberId,
        category: Orientation,
        now: DateTime<Utc>,
    ) -> bool {
        if self.ballot_for(user_id).map(|b| b.category) == Some(category) {
            return false;
        }
        self.ballots.retain(|b| b.user_id != user_id);
        self.ballots.push(OrientationVote {
            user_id,
            category,
            voted_at: now,
        });
        self.recompute();
        true
    }

    pub(crate) fn retract(&mut self, user_id: MemberId) -> bool {
        let before = self.ballots.len();
        self.ballots.retain(|b| b.user_id != user_id);
        if self.ballots.len() == before {
            return false;
        }
        self.recompute();
        true
    }

    fn recompute(&mut self) {
        let mut counts = [0u32; 5];
        for ballot in &self.ballots {
            counts[ballot.category.index()] += 1;
        }
        self.tally = OrientationTally::from_frequencies(counts);
        self.resolved_view = median::resolve(&self.tally);
    }
}

// =============================================================================
// Read views
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrientationSummary {
    pub tally: OrientationTally,
    pub total_votes: u32,
    pub resolved_view: Orientation,
    /// What the author declared; independent of the votes.
    pub declared_orientation: Option<Orientation>,
    pub viewer_vote: Option<Orientation>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scores_are_fixed() {
        let scores: Vec<i8> = Orientation::ALL.iter().map(|o| o.score()).collect();
        assert_eq!(scores, vec![-2, -1, 0, 1, 2]);
        for o in Orientation::ALL {
            assert_eq!(Orientation::from_score(o.score()), Some(o));
        }
        assert_eq!(Orientation::from_score(3), None);
    }

    #[test]
    fn categories_parse_in_both_spellings() {
        assert_eq!(
            "extremelyProgressive".parse::<Orientation>().unwrap(),
            Orientation::ExtremelyProgressive
        );
        assert_eq!(
            "extremely_conservative".parse::<Orientation>().unwrap(),
            Orientation::ExtremelyConservative
        );
        assert!(matches!(
            "centrist".parse::<Orientation>(),
            Err(EngagementError::InvalidCategory(_))
        ));
    }

    #[test]
    fn revote_replaces_previous_category() {
        let mut ballot = OrientationBallot::default();
        let user = MemberId::new();
        let now = Utc::now();

        assert!(ballot.cast(user, Orientation::Conservative, now));
        assert!(ballot.cast(user, Orientation::Progressive, now));

        assert_eq!(ballot.ballots().len(), 1);
        assert_eq!(ballot.tally().get(Orientation::Conservative), 0);
        assert_eq!(ballot.tally().get(Orientation::Progressive), 1);
        assert_eq!(ballot.resolved_view(), Orientation::Progressive);
    }

    #[test]
    fn same_category_is_a_noop() {
        let mut ballot = OrientationBallot::default();
        let user = MemberId::new();

        assert!(ballot.cast(user, Orientation::Neutral, Utc::now()));
        let snapshot = ballot.clone();
        assert!(!ballot.cast(user, Orientation::Neutral, Utc::now()));
        assert_eq!(ballot, snapshot);
    }

    #[test]
    fn retract_restores_empty_state() {
        let mut ballot = OrientationBallot::default();
        let user = MemberId::new();

        ballot.cast(user, Orientation::ExtremelyConservative, Utc::now());
        assert_eq!(ballot.resolved_view(), Orientation::ExtremelyConservative);

        assert!(ballot.retract(user));
        assert!(!ballot.retract(user));
        assert_eq!(ballot.tally().total(), 0);
        assert_eq!(ballot.resolved_view(), Orientation::Neutral);
    }
}
