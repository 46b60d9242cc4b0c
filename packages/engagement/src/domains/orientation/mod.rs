//! Orientation voting engine: one ballot per member on a five-point scale,
//! with a median-based resolved view.

pub mod actions;
pub mod median;
pub mod models;

pub use actions::{
    cast_orientation_vote, load_orientation_summary, orientation_summary,
    retract_orientation_vote, VoteOutcome,
};
pub use models::{
    Orientation, OrientationBallot, OrientationSummary, OrientationTally, OrientationVote,
};
