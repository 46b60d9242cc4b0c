//! Poll voting engine: single or multiple choice, full-replace ballots,
//! counts always recomputed from the ballot set.

pub mod actions;
pub mod engine;
pub mod models;

pub use actions::{cast_poll_vote, poll_results, remove_poll_vote, PollVoteOutcome};
pub use models::{PollBallot, PollOption, PollOptionResult, PollResults, PollSpec, PollVote};
