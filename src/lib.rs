// Synchronization core for the cross-device emoji-sharing app.
//
// The sync manager owns the local entry collection and reconciles it with
// a remote record store behind the `RemoteStore` trait; presentation
// layers subscribe to its published state and call its operations.

pub mod config;
pub mod entry;
pub mod error;
pub mod logging;
pub mod push;
pub mod store;
pub mod sync;
pub mod trace;

pub use entry::{EmojiEntry, AVAILABLE_EMOJIS, ENTRY_RECORD_TYPE};
pub use error::{Result, StoreError};
pub use store::{AccountStatus, Record, RemoteStore, Subscription};
pub use sync::{SyncManager, SyncState, SUBSCRIPTION_ID};
