pub mod http;
pub mod memory;

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub use http::HttpStore;
pub use memory::MemoryStore;

/// A single field value in a remote record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum FieldValue {
    Text(String),
    Instant(DateTime<Utc>),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_instant(&self) -> Option<DateTime<Utc>> {
        match self {
            FieldValue::Instant(t) => Some(*t),
            _ => None,
        }
    }
}

/// Generic remote-record representation, the wire shape shared by every
/// `RemoteStore` implementation. The key doubles as the upsert identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub record_type: String,
    pub key: String,
    pub fields: HashMap<String, FieldValue>,
}

impl Record {
    pub fn new(record_type: impl Into<String>, key: impl Into<String>) -> Self {
        Record {
            record_type: record_type.into(),
            key: key.into(),
            fields: HashMap::new(),
        }
    }

    pub fn set(&mut self, field: impl Into<String>, value: FieldValue) {
        self.fields.insert(field.into(), value);
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }
}

/// Standing server-side registration that fires a push when matching
/// records change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub record_type: String,
    pub fires_on_create: bool,
    pub fires_on_update: bool,
    pub fires_on_delete: bool,
    /// Deliver a silent content-available wake-up instead of a visible alert.
    pub silent_push: bool,
}

impl Subscription {
    /// Subscription covering every change to one record type, delivered
    /// silently.
    pub fn for_record_type(id: impl Into<String>, record_type: impl Into<String>) -> Self {
        Subscription {
            id: id.into(),
            record_type: record_type.into(),
            fires_on_create: true,
            fires_on_update: true,
            fires_on_delete: true,
            silent_push: true,
        }
    }
}

/// Remote account state, consulted once at startup for logging only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    Available,
    NoAccount,
    Restricted,
    Indeterminate,
    TemporarilyUnavailable,
}

impl std::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountStatus::Available => write!(f, "available"),
            AccountStatus::NoAccount => write!(f, "no account"),
            AccountStatus::Restricted => write!(f, "restricted"),
            AccountStatus::Indeterminate => write!(f, "indeterminate"),
            AccountStatus::TemporarilyUnavailable => write!(f, "temporarily unavailable"),
        }
    }
}

/// Contract the sync manager depends on. Implementations wrap a remote
/// record database keyed by a container identifier.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Upsert by key; returns the stored record.
    async fn save(&self, record: Record) -> Result<Record>;

    /// Fetch every record of one type the account can see. Individual
    /// records may fail to fetch or decode; those surface as per-record
    /// errors so one bad record never aborts the batch.
    async fn query_all(&self, record_type: &str) -> Result<Vec<Result<Record>>>;

    /// Delete by key. A missing record counts as success.
    async fn delete(&self, key: &str) -> Result<()>;

    async fn list_subscriptions(&self) -> Result<Vec<Subscription>>;

    async fn create_subscription(&self, subscription: Subscription) -> Result<()>;

    /// Diagnostic only; never gates an operation.
    async fn account_status(&self) -> Result<AccountStatus>;
}
