use super::{AccountStatus, Record, RemoteStore, Subscription};
use crate::error::{Result, StoreError};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// In-process `RemoteStore` backed by a `HashMap`. Used by the test suite
/// and as a development stand-in; faithful to the remote semantics (upsert
/// by key, unordered query, idempotent delete) and able to inject faults.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    records: HashMap<String, Record>,
    subscriptions: Vec<Subscription>,
    account_status: Option<AccountStatus>,
    fail_next_save: Option<StoreError>,
    fail_next_query: Option<StoreError>,
    fail_next_delete: Option<StoreError>,
    poisoned_keys: HashSet<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record directly, bypassing `save`. For tests that model a
    /// remote mutated by another device.
    pub fn seed(&self, record: Record) {
        let mut inner = self.inner.lock().unwrap();
        inner.records.insert(record.key.clone(), record);
    }

    pub fn remove(&self, key: &str) {
        self.inner.lock().unwrap().records.remove(key);
    }

    pub fn record_count(&self) -> usize {
        self.inner.lock().unwrap().records.len()
    }

    pub fn subscription_count(&self) -> usize {
        self.inner.lock().unwrap().subscriptions.len()
    }

    pub fn set_account_status(&self, status: AccountStatus) {
        self.inner.lock().unwrap().account_status = Some(status);
    }

    /// The next `save` call fails with `err`; the store is left unchanged.
    pub fn fail_next_save(&self, err: StoreError) {
        self.inner.lock().unwrap().fail_next_save = Some(err);
    }

    /// The next `query_all` call fails wholesale with `err`.
    pub fn fail_next_query(&self, err: StoreError) {
        self.inner.lock().unwrap().fail_next_query = Some(err);
    }

    /// The next `delete` call fails with `err`.
    pub fn fail_next_delete(&self, err: StoreError) {
        self.inner.lock().unwrap().fail_next_delete = Some(err);
    }

    /// Mark a key so queries report it as a per-record failure instead of
    /// returning its record.
    pub fn poison(&self, key: &str) {
        self.inner.lock().unwrap().poisoned_keys.insert(key.to_string());
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn save(&self, record: Record) -> Result<Record> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(err) = inner.fail_next_save.take() {
            return Err(err);
        }
        inner.records.insert(record.key.clone(), record.clone());
        Ok(record)
    }

    async fn query_all(&self, record_type: &str) -> Result<Vec<Result<Record>>> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(err) = inner.fail_next_query.take() {
            return Err(err);
        }
        let results = inner
            .records
            .values()
            .filter(|r| r.record_type == record_type)
            .map(|r| {
                if inner.poisoned_keys.contains(&r.key) {
                    Err(StoreError::Decode(format!("record {} unavailable", r.key)))
                } else {
                    Ok(r.clone())
                }
            })
            .collect();
        Ok(results)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(err) = inner.fail_next_delete.take() {
            return Err(err);
        }
        // Absent key deletes are success: idempotent by contract.
        inner.records.remove(key);
        Ok(())
    }

    async fn list_subscriptions(&self) -> Result<Vec<Subscription>> {
        Ok(self.inner.lock().unwrap().subscriptions.clone())
    }

    async fn create_subscription(&self, subscription: Subscription) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        // Subscription ids are upsert keys, so the well-known id can
        // never be registered twice.
        inner.subscriptions.retain(|s| s.id != subscription.id);
        inner.subscriptions.push(subscription);
        Ok(())
    }

    async fn account_status(&self) -> Result<AccountStatus> {
        match self.inner.lock().unwrap().account_status {
            Some(status) => Ok(status),
            None => Ok(AccountStatus::Available),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{EmojiEntry, ENTRY_RECORD_TYPE};

    #[tokio::test]
    async fn test_save_is_upsert_by_key() {
        let store = MemoryStore::new();
        let entry = EmojiEntry::new("😀", "iPhone");

        store.save(entry.to_record()).await.unwrap();
        store.save(entry.to_record()).await.unwrap();

        assert_eq!(store.record_count(), 1);
    }

    #[tokio::test]
    async fn test_delete_missing_key_is_ok() {
        let store = MemoryStore::new();
        store.delete("no-such-key").await.unwrap();
    }

    #[tokio::test]
    async fn test_poisoned_record_surfaces_as_per_record_error() {
        let store = MemoryStore::new();
        let good = EmojiEntry::new("🚀", "iPhone");
        let bad = EmojiEntry::new("🍕", "iPhone");
        store.seed(good.to_record());
        store.seed(bad.to_record());
        store.poison(&bad.id);

        let results = store.query_all(ENTRY_RECORD_TYPE).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(StoreError::Decode(_)))));
    }

    #[tokio::test]
    async fn test_create_subscription_upserts_by_id() {
        let store = MemoryStore::new();
        let sub = Subscription::for_record_type("emoji-entries-subscription", ENTRY_RECORD_TYPE);

        store.create_subscription(sub.clone()).await.unwrap();
        store.create_subscription(sub).await.unwrap();

        assert_eq!(store.subscription_count(), 1);
    }

    #[tokio::test]
    async fn test_fail_next_save_is_one_shot() {
        let store = MemoryStore::new();
        store.fail_next_save(StoreError::QuotaExceeded);

        let entry = EmojiEntry::new("😎", "iPhone");
        assert!(store.save(entry.to_record()).await.is_err());
        assert_eq!(store.record_count(), 0);

        store.save(entry.to_record()).await.unwrap();
        assert_eq!(store.record_count(), 1);
    }
}
