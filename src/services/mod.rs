// Service exports
pub mod memory;
pub mod postgres;
pub mod store;

pub use memory::{MemoryQueueStore, MemoryState};
pub use postgres::PgQueueStore;
pub use store::{AllocationTx, QueueStore, StoreError};
