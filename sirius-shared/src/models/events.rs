use uuid::Uuid;

/// Emitted once a reservation is confirmed and a booking reference issued.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct ReservationConfirmedEvent {
    pub event_id: Uuid,
    pub booking_reference: String,
    pub reservation_type: String,
    pub activity: Option<String>,
    pub people: u32,
    pub total: f64,
    pub coupon_code: Option<String>,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct DraftSavedEvent {
    pub event_id: Uuid,
    pub reservation_type: Option<String>,
    pub bytes: usize,
    pub timestamp: i64,
}

/// Simulated gateway rejected the submission; the guest may retry.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct SubmissionFailedEvent {
    pub event_id: Uuid,
    pub reservation_type: String,
    pub reason: String,
    pub timestamp: i64,
}

impl ReservationConfirmedEvent {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl DraftSavedEvent {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl SubmissionFailedEvent {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Current wall clock in epoch seconds, the timestamp unit every event uses.
pub fn now_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}
