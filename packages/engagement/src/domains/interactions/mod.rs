//! Interaction toggle engine: idempotent membership in named buckets
//! (likes, dislikes, bookmarks, comment flags, reports).

pub mod actions;
pub mod engine;
pub mod models;

pub use actions::{interaction_summary, set_reaction, toggle_interaction, ToggleOutcome};
pub use models::{
    BucketMember, BucketName, BucketSummary, DesiredState, InteractionBucket, InteractionBuckets,
    InteractionSummary, Reaction,
};
