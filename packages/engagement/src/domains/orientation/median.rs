//! Median resolution over the ordinal tally.
//!
//! Walk cumulative counts from the most conservative category upward and
//! stop at the first category whose cumulative count exceeds half the total.
//! When the total is even and the cumulative count lands exactly on half,
//! the median sits between that category and the next non-empty one: average
//! their scores and truncate toward zero, which resolves toward neutral.

use super::models::{Orientation, OrientationTally};

pub fn resolve(tally: &OrientationTally) -> Orientation {
    let frequencies = tally.frequencies();
    let total: u32 = frequencies.iter().sum();
    if total == 0 {
        return Orientation::Neutral;
    }

    // Doubled to stay in integers: cumulative > total / 2  <=>  2 * cumulative > total
    let total = u64::from(total);
    let mut cumulative: u64 = 0;

    for (i, &count) in frequencies.iter().enumerate() {
        cumulative += u64::from(count);

        if total % 2 == 0 && 2 * cumulative == total {
            let upper = frequencies
                .iter()
                .enumerate()
                .skip(i + 1)
                .find(|(_, c)| **c > 0)
                .map(|(j, _)| j);

            if let Some(j) = upper {
                let lower = Orientation::ALL[i].score();
                let upper = Orientation::ALL[j].score();
                // Integer division truncates toward zero
                let midpoint = (lower + upper) / 2;
                return Orientation::from_score(midpoint).unwrap_or(Orientation::Neutral);
            }
        }

        if 2 * cumulative > total {
            return Orientation::ALL[i];
        }
    }

    Orientation::Neutral
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve_counts(counts: [u32; 5]) -> Orientation {
        resolve(&OrientationTally::from_frequencies(counts))
    }

    #[test]
    fn empty_tally_is_neutral() {
        assert_eq!(resolve_counts([0, 0, 0, 0, 0]), Orientation::Neutral);
    }

    #[test]
    fn split_between_extremes_resolves_to_neutral() {
        // -2 and +2 average to 0
        assert_eq!(resolve_counts([1, 0, 0, 0, 1]), Orientation::Neutral);
    }

    #[test]
    fn conservative_and_neutral_pair_resolves_to_neutral() {
        assert_eq!(resolve_counts([0, 1, 1, 0, 0]), Orientation::Neutral);
    }

    #[test]
    fn split_rounds_toward_zero_on_the_negative_side() {
        // (-2 + -1) / 2 = -1.5 -> -1
        assert_eq!(resolve_counts([1, 1, 0, 0, 0]), Orientation::Conservative);
    }

    #[test]
    fn split_rounds_toward_zero_on_the_positive_side() {
        // (1 + 2) / 2 = 1.5 -> 1
        assert_eq!(resolve_counts([0, 0, 0, 2, 2]), Orientation::Progressive);
        // (-2 + 1) / 2 = -0.5 -> 0
        assert_eq!(resolve_counts([3, 0, 0, 3, 0]), Orientation::Neutral);
    }

    #[test]
    fn single_vote_wins() {
        for o in Orientation::ALL {
            let mut counts = [0; 5];
            counts[o.index()] = 1;
            assert_eq!(resolve_counts(counts), o);
        }
    }

    #[test]
    fn odd_total_takes_middle_vote() {
        assert_eq!(resolve_counts([2, 0, 0, 0, 1]), Orientation::ExtremelyConservative);
        assert_eq!(resolve_counts([1, 0, 1, 0, 1]), Orientation::Neutral);
        assert_eq!(resolve_counts([0, 1, 0, 4, 0]), Orientation::Progressive);
    }

    #[test]
    fn even_total_without_exact_split_uses_majority_side() {
        // cumulative 3 of 4 at conservative exceeds 2
        assert_eq!(resolve_counts([1, 2, 0, 1, 0]), Orientation::Conservative);
    }
}
