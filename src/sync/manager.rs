use super::state::SyncState;
use crate::entry::{EmojiEntry, ENTRY_RECORD_TYPE};
use crate::error::Result;
use crate::store::{RemoteStore, Subscription};
use crate::trace::TraceLog;
use log::{debug, error, info, warn};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

/// Well-known id of the standing push subscription; at most one per account.
pub const SUBSCRIPTION_ID: &str = "emoji-entries-subscription";

/// Owns the local entry collection and reconciles it with the remote
/// record store. All mutations of the published state go through this
/// type; presentation layers subscribe to snapshots and call operations.
///
/// Remote operations are serialized end to end by an async lock, so a
/// manual refresh overlapping a push-triggered one queues instead of
/// racing on the collection.
pub struct SyncManager {
    store: Arc<dyn RemoteStore>,
    device: String,
    state: Mutex<SyncState>,
    state_tx: watch::Sender<SyncState>,
    trace: TraceLog,
    op_lock: tokio::sync::Mutex<()>,
}

impl SyncManager {
    pub fn new(store: Arc<dyn RemoteStore>, device: impl Into<String>) -> Self {
        let (state_tx, _) = watch::channel(SyncState::default());
        SyncManager {
            store,
            device: device.into(),
            state: Mutex::new(SyncState::default()),
            state_tx,
            trace: TraceLog::new(),
            op_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Startup sequence: log the account status, make sure the standing
    /// subscription exists, then populate the collection. The first two
    /// steps are diagnostic; their failures never block the initial fetch.
    pub async fn initialize(&self) -> Result<()> {
        match self.store.account_status().await {
            Ok(status) => {
                info!("Remote account status: {status}");
                self.trace.push(format!("account status: {status}"));
            }
            Err(e) => {
                warn!("Failed to check account status: {e}");
                self.trace.push(format!("account status check failed: {e}"));
            }
        }

        if let Err(e) = self.ensure_subscription().await {
            warn!("Failed to set up subscription: {e}");
            self.trace.push(format!("subscription setup failed: {e}"));
        }

        self.fetch_all().await
    }

    /// Create the push subscription if and only if no subscription with
    /// the well-known id is already registered.
    async fn ensure_subscription(&self) -> Result<()> {
        match self.store.list_subscriptions().await {
            Ok(existing) => {
                if existing.iter().any(|s| s.id == SUBSCRIPTION_ID) {
                    debug!("Subscription already exists");
                    self.trace.push("subscription already exists");
                    return Ok(());
                }
            }
            // Listing failed; still attempt the create so a transient
            // listing error cannot leave the account unsubscribed.
            Err(e) => warn!("Failed to list subscriptions: {e}"),
        }

        let subscription = Subscription::for_record_type(SUBSCRIPTION_ID, ENTRY_RECORD_TYPE);
        self.store.create_subscription(subscription).await?;
        info!("Subscription created");
        self.trace.push("subscription created");
        Ok(())
    }

    /// Record a tap: save to the remote store, then append locally and
    /// restore newest-first order. The local collection is only touched
    /// after the remote confirms, so a failed add changes nothing.
    pub async fn add(&self, emoji: &str) -> Result<EmojiEntry> {
        let _guard = self.op_lock.lock().await;

        let entry = EmojiEntry::new(emoji, self.device.clone());
        self.update(|s| s.set_syncing());
        self.trace.push(format!("saving entry {}", entry.id));

        match self.store.save(entry.to_record()).await {
            Ok(saved) => {
                debug!("Saved record {}", saved.key);
                self.trace.push(format!("saved record {}", saved.key));
                self.update(|s| {
                    s.push_sorted(entry.clone());
                    s.set_idle();
                });
                Ok(entry)
            }
            Err(e) => {
                error!("Failed to save entry: {e}");
                self.trace.push(format!("save failed: {e}"));
                self.update(|s| s.set_error(e.to_string()));
                Err(e)
            }
        }
    }

    /// Full reconciliation: query every entry record, decode what decodes,
    /// skip what doesn't, and replace the collection wholesale. A failed
    /// query leaves the previous collection intact.
    pub async fn fetch_all(&self) -> Result<()> {
        let _guard = self.op_lock.lock().await;

        self.update(|s| s.set_syncing());
        self.trace.push("fetching entries");

        let results = match self.store.query_all(ENTRY_RECORD_TYPE).await {
            Ok(results) => results,
            Err(e) => {
                error!("Failed to fetch entries: {e}");
                self.trace.push(format!("fetch failed: {e}"));
                self.update(|s| s.set_error(e.to_string()));
                return Err(e);
            }
        };

        let mut fetched = Vec::with_capacity(results.len());
        for result in results {
            match result {
                Ok(record) => match EmojiEntry::from_record(&record) {
                    Some(entry) => fetched.push(entry),
                    None => {
                        warn!("Skipping malformed record {}", record.key);
                        self.trace.push(format!("skipped malformed record {}", record.key));
                    }
                },
                Err(e) => {
                    warn!("Skipping failed record: {e}");
                    self.trace.push(format!("skipped failed record: {e}"));
                }
            }
        }

        debug!("Fetched {} entries", fetched.len());
        self.trace.push(format!("fetched {} entries", fetched.len()));
        self.update(|s| {
            s.replace_entries(fetched);
            s.set_idle();
        });
        Ok(())
    }

    /// Remote delete keyed by entry id, then local removal. Failure leaves
    /// the local collection untouched.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let _guard = self.op_lock.lock().await;

        self.update(|s| s.set_syncing());
        self.trace.push(format!("deleting entry {id}"));

        match self.store.delete(id).await {
            Ok(()) => {
                self.update(|s| {
                    s.remove_entry(id);
                    s.set_idle();
                });
                Ok(())
            }
            Err(e) => {
                error!("Failed to delete entry {id}: {e}");
                self.trace.push(format!("delete failed: {e}"));
                self.update(|s| s.set_error(e.to_string()));
                Err(e)
            }
        }
    }

    /// Delete every known entry one at a time. Not atomic; a failure is
    /// logged and the remaining deletes still run.
    pub async fn clear_all(&self) {
        let ids: Vec<String> = self
            .state
            .lock()
            .unwrap()
            .entries
            .iter()
            .map(|e| e.id.clone())
            .collect();

        for id in ids {
            if let Err(e) = self.delete(&id).await {
                warn!("clear_all: entry {id} not deleted: {e}");
            }
        }
    }

    /// Entry point for the notification bridge: a qualifying remote change
    /// simply triggers a re-fetch.
    pub async fn handle_remote_change(&self) -> Result<()> {
        info!("Remote change signal received, fetching updated data");
        self.trace.push("remote change signal");
        self.fetch_all().await
    }

    /// Watch receiver over published state snapshots; sent on every
    /// mutation.
    pub fn subscribe(&self) -> watch::Receiver<SyncState> {
        self.state_tx.subscribe()
    }

    pub fn entries(&self) -> Vec<EmojiEntry> {
        self.state.lock().unwrap().entries.clone()
    }

    pub fn is_syncing(&self) -> bool {
        self.state.lock().unwrap().is_syncing
    }

    pub fn last_error(&self) -> Option<String> {
        self.state.lock().unwrap().last_error.clone()
    }

    pub fn state(&self) -> SyncState {
        self.state.lock().unwrap().clone()
    }

    pub fn trace(&self) -> &TraceLog {
        &self.trace
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    fn update<R>(&self, mutate: impl FnOnce(&mut SyncState) -> R) -> R {
        let mut state = self.state.lock().unwrap();
        let out = mutate(&mut state);
        // send_replace stores the snapshot even while no receiver is
        // attached, so a late subscriber still reads current state.
        self.state_tx.send_replace(state.clone());
        out
    }
}
