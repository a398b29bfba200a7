use crate::sync::SyncManager;
use log::{debug, info};
use serde_json::Value;

/// What the bridge decided about an inbound push payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushClassification {
    /// A query notification for the entry record type; triggers a refresh.
    QualifyingChange,
    /// Anything else; acknowledged, no action.
    Other,
}

/// Intake outcome reported back to the OS notification layer so it can
/// apply its own delivery backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntakeResult {
    NewData,
    NoData,
}

/// Classify an opaque push payload. A payload qualifies when it is a
/// query notification; a record type, when present, must match ours.
pub fn classify(payload: &Value) -> PushClassification {
    let is_query = payload
        .get("notification_type")
        .and_then(Value::as_str)
        .map(|t| t == "query")
        .unwrap_or(false);

    if !is_query {
        return PushClassification::Other;
    }

    match payload.get("record_type").and_then(Value::as_str) {
        Some(record_type) if record_type != crate::entry::ENTRY_RECORD_TYPE => {
            PushClassification::Other
        }
        _ => PushClassification::QualifyingChange,
    }
}

/// Bridge entry point invoked on push receipt. Qualifying payloads kick
/// off a refresh; everything else is acknowledged untouched.
pub async fn intake(manager: &SyncManager, payload: &Value) -> IntakeResult {
    match classify(payload) {
        PushClassification::QualifyingChange => {
            info!("Query notification received, refreshing");
            match manager.handle_remote_change().await {
                Ok(()) => IntakeResult::NewData,
                Err(_) => IntakeResult::NoData,
            }
        }
        PushClassification::Other => {
            debug!("Ignoring non-query notification");
            IntakeResult::NoData
        }
    }
}
