// Engagement Core
//
// Interaction buckets, orientation voting, opposition links and poll voting
// for shared content items. Every mutation is an optimistic read-modify-write
// against a versioned record; see kernel/write.rs.
//
// Engines are organized per-domain in domains/*/{models,engine,actions}.rs

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;

pub use config::*;
