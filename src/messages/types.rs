//! Types for the per-pairing chat threads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One message in a per-pairing chat thread
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mail {
    /// Message identifier
    pub id: u64,

    /// Whether the viewer wrote this message (false means the counterpart)
    pub is_author: bool,

    /// Message body
    pub text: String,

    /// When the message was sent
    pub send_date: DateTime<Utc>,

    /// When the recipient read the message, if they have
    pub read_date: Option<DateTime<Utc>>,
}

/// Request body for the bulk mark-read endpoint
#[derive(Debug, Clone, Serialize)]
pub(crate) struct MarkRead {
    /// Identifiers of the messages to mark as read
    pub ids: Vec<u64>,
}
