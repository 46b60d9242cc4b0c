//! Opposition link manager: symmetric, paired edges between two content
//! items, written as two conditional writes plus compensation.

pub mod actions;
pub mod engine;
pub mod models;

pub use actions::{
    add_opposition, list_oppositions, list_visible_oppositions, remove_opposition,
    OppositionOutcome,
};
pub use models::{EdgeDirection, OppositionEdge, ResolvedOpposition};
