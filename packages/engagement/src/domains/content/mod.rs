//! The content item record shared by every engine.

pub mod actions;
pub mod models;

pub use actions::{content_item_exists, create_content_item, get_content_item};
pub use models::{ContentItem, NewContentItem};
