pub mod manager;
pub mod state;

#[cfg(test)]
mod manager_test;

pub use manager::{SyncManager, SUBSCRIPTION_ID};
pub use state::SyncState;
