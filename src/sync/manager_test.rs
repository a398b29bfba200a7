#[cfg(test)]
mod tests {
    use crate::entry::EmojiEntry;
    use crate::error::StoreError;
    use crate::store::{MemoryStore, RemoteStore};
    use crate::sync::{SyncManager, SUBSCRIPTION_ID};
    use chrono::{DateTime, Duration, Utc};
    use std::sync::Arc;

    fn manager_with_store() -> (Arc<MemoryStore>, SyncManager) {
        let store = Arc::new(MemoryStore::new());
        let manager = SyncManager::new(Arc::clone(&store) as Arc<dyn RemoteStore>, "iPhone");
        (store, manager)
    }

    fn entry_at(emoji: &str, device: &str, timestamp: DateTime<Utc>) -> EmojiEntry {
        let mut entry = EmojiEntry::new(emoji, device);
        entry.timestamp = timestamp;
        entry
    }

    #[tokio::test]
    async fn test_successful_adds_sorted_newest_first() {
        let (_store, manager) = manager_with_store();

        manager.add("😀").await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        manager.add("🚀").await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        manager.add("🍕").await.unwrap();

        let entries = manager.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].emoji, "🍕");
        assert_eq!(entries[1].emoji, "🚀");
        assert_eq!(entries[2].emoji, "😀");
        assert!(entries.windows(2).all(|w| w[0].timestamp > w[1].timestamp));
        assert!(!manager.is_syncing());
        assert!(manager.last_error().is_none());
    }

    #[tokio::test]
    async fn test_failed_add_leaves_entries_unchanged() {
        let (store, manager) = manager_with_store();
        manager.add("😀").await.unwrap();
        let before = manager.entries();

        store.fail_next_save(StoreError::QuotaExceeded);
        let result = manager.add("🚀").await;

        assert!(result.is_err());
        assert_eq!(manager.entries(), before);
        assert!(!manager.is_syncing());
        assert_eq!(
            manager.last_error(),
            Some("Remote storage quota exceeded".to_string())
        );
        assert_eq!(store.record_count(), 1);
    }

    #[tokio::test]
    async fn test_fetch_all_is_idempotent_on_unchanged_remote() {
        let (store, manager) = manager_with_store();
        let base = Utc::now();
        store.seed(entry_at("😀", "iPhone", base).to_record());
        store.seed(entry_at("🚀", "Apple Watch", base + Duration::seconds(1)).to_record());

        manager.fetch_all().await.unwrap();
        let first = manager.entries();

        manager.fetch_all().await.unwrap();
        assert_eq!(manager.entries(), first);
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_previous_entries() {
        let (store, manager) = manager_with_store();
        manager.add("😎").await.unwrap();
        let before = manager.entries();

        store.fail_next_query(StoreError::Other("network unreachable".to_string()));
        assert!(manager.fetch_all().await.is_err());

        assert_eq!(manager.entries(), before);
        assert!(manager.last_error().is_some());
        assert!(!manager.is_syncing());
    }

    #[tokio::test]
    async fn test_malformed_record_is_skipped_not_fatal() {
        let (store, manager) = manager_with_store();
        let good = entry_at("🚀", "iPhone", Utc::now());
        store.seed(good.to_record());

        // Record missing its device field must not abort the batch.
        let mut malformed = entry_at("😀", "iPhone", Utc::now()).to_record();
        malformed.fields.remove("device");
        store.seed(malformed);

        manager.fetch_all().await.unwrap();

        let entries = manager.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, good.id);
    }

    #[tokio::test]
    async fn test_per_record_failure_is_skipped_not_fatal() {
        let (store, manager) = manager_with_store();
        let good = entry_at("😎", "iPhone", Utc::now());
        let bad = entry_at("🐶", "iPhone", Utc::now());
        store.seed(good.to_record());
        store.seed(bad.to_record());
        store.poison(&bad.id);

        manager.fetch_all().await.unwrap();

        let entries = manager.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, good.id);
    }

    #[tokio::test]
    async fn test_delete_then_fetch_never_resurfaces() {
        let (_store, manager) = manager_with_store();
        let doomed = manager.add("😀").await.unwrap();
        manager.add("🚀").await.unwrap();

        manager.delete(&doomed.id).await.unwrap();
        manager.fetch_all().await.unwrap();

        assert!(manager.entries().iter().all(|e| e.id != doomed.id));
        assert_eq!(manager.entries().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_delete_leaves_local_state_untouched() {
        let (store, manager) = manager_with_store();
        let entry = manager.add("🍕").await.unwrap();

        store.fail_next_delete(StoreError::Other("network unreachable".to_string()));
        assert!(manager.delete(&entry.id).await.is_err());

        assert_eq!(manager.entries().len(), 1);
        assert_eq!(store.record_count(), 1);
    }

    #[tokio::test]
    async fn test_two_device_scenario() {
        let (store, manager) = manager_with_store();
        let t1 = Utc::now();
        let t2 = t1 + Duration::seconds(10);

        let smile = entry_at("😀", "iPhone", t1);
        let rocket = entry_at("🚀", "Apple Watch", t2);
        store.save(smile.to_record()).await.unwrap();
        store.save(rocket.to_record()).await.unwrap();
        manager.fetch_all().await.unwrap();

        let entries = manager.entries();
        assert_eq!(entries[0].emoji, "🚀");
        assert_eq!(entries[1].emoji, "😀");

        manager.delete(&smile.id).await.unwrap();
        assert_eq!(manager.entries().len(), 1);
        assert_eq!(manager.entries()[0].emoji, "🚀");

        // Remote now holds only the rocket; fetch must be a no-op.
        manager.fetch_all().await.unwrap();
        let entries = manager.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, rocket.id);
    }

    #[tokio::test]
    async fn test_initialize_creates_subscription_exactly_once() {
        let (store, manager) = manager_with_store();

        manager.initialize().await.unwrap();
        assert_eq!(store.subscription_count(), 1);
        let subs = store.list_subscriptions().await.unwrap();
        assert_eq!(subs[0].id, SUBSCRIPTION_ID);
        assert!(subs[0].silent_push);
        assert!(subs[0].fires_on_create && subs[0].fires_on_update && subs[0].fires_on_delete);

        // Second initialization finds the subscription and adds none.
        manager.initialize().await.unwrap();
        assert_eq!(store.subscription_count(), 1);
    }

    #[tokio::test]
    async fn test_initialize_populates_entries() {
        let (store, manager) = manager_with_store();
        store.seed(entry_at("🐶", "Apple Watch", Utc::now()).to_record());

        manager.initialize().await.unwrap();
        assert_eq!(manager.entries().len(), 1);
    }

    #[tokio::test]
    async fn test_initialize_survives_unavailable_account() {
        let (store, manager) = manager_with_store();
        store.set_account_status(crate::store::AccountStatus::NoAccount);
        store.seed(entry_at("😎", "iPhone", Utc::now()).to_record());

        // Account status is informational only; the fetch still runs.
        manager.initialize().await.unwrap();
        assert_eq!(manager.entries().len(), 1);
    }

    #[tokio::test]
    async fn test_clear_all_deletes_every_entry() {
        let (store, manager) = manager_with_store();
        for emoji in ["😀", "😎", "🐶"] {
            manager.add(emoji).await.unwrap();
        }

        manager.clear_all().await;

        assert!(manager.entries().is_empty());
        assert_eq!(store.record_count(), 0);
    }

    #[tokio::test]
    async fn test_clear_all_continues_past_a_failed_delete() {
        let (store, manager) = manager_with_store();
        manager.add("😀").await.unwrap();
        manager.add("🚀").await.unwrap();

        store.fail_next_delete(StoreError::Other("network unreachable".to_string()));
        manager.clear_all().await;

        // One delete failed and stayed put; the other went through.
        assert_eq!(manager.entries().len(), 1);
        assert_eq!(store.record_count(), 1);
    }

    #[tokio::test]
    async fn test_subscribers_observe_state_changes() {
        let (_store, manager) = manager_with_store();
        let mut rx = manager.subscribe();

        manager.add("🍕").await.unwrap();

        rx.changed().await.unwrap();
        let state = rx.borrow_and_update().clone();
        assert_eq!(state.entries.len(), 1);
        assert!(!state.is_syncing);
        assert!(state.last_sync.is_some());
    }

    #[tokio::test]
    async fn test_late_subscriber_sees_current_state() {
        let (_store, manager) = manager_with_store();

        // Mutations land before any presentation layer attaches.
        manager.add("🚀").await.unwrap();

        let rx = manager.subscribe();
        let state = rx.borrow().clone();
        assert_eq!(state.entries.len(), 1);
        assert_eq!(state.entries[0].emoji, "🚀");
        assert!(!state.is_syncing);
    }

    #[tokio::test]
    async fn test_trace_records_remote_interactions() {
        let (store, manager) = manager_with_store();
        manager.add("😀").await.unwrap();
        store.fail_next_save(StoreError::QuotaExceeded);
        let _ = manager.add("🚀").await;

        let lines = manager.trace().snapshot();
        assert!(lines.iter().any(|l| l.contains("saved record")));
        assert!(lines.iter().any(|l| l.contains("save failed")));
    }
}
