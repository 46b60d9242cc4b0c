pub mod audit;
pub mod content;
pub mod events;
pub mod interactions;
pub mod opposition;
pub mod orientation;
pub mod polls;
