// Kernel - infrastructure seams shared by every engine

pub mod deps;
pub mod memory_store;
pub mod postgres_store;
pub mod store;
pub mod test_dependencies;
pub mod traits;
pub mod write;

pub use deps::{EngagementDeps, WritePolicy};
pub use memory_store::InMemoryContentStore;
pub use postgres_store::PgContentStore;
pub use store::{ContentStore, StoreError, Version};
pub use traits::{BaseNotifier, NoopNotifier};
pub use write::{load_item, mutate_item, Committed};
