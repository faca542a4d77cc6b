pub mod interactions;
pub mod store;

pub use interactions::InteractionService;
pub use store::{InMemoryStore, SeedData, SocialStore, StoreError};
