// Service exports
pub mod activity_store;
pub mod memory;
pub mod postgres;

pub use activity_store::{ActivityQuery, ActivityStore, StoreError};
pub use memory::{ActivityRecord, InMemoryActivityStore};
pub use postgres::{ConnectionProvider, PostgresActivityStore};
