//! Types for viewer identity and authorization

use serde::{Deserialize, Serialize};

/// The currently authenticated user of the page
///
/// Resolved once at startup and read-only for the page lifetime; every
/// mutating request borrows its `csrf_token`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewer {
    /// Forgery-protection token for mutating requests
    pub csrf_token: String,

    /// Whether the viewer is logged in at all
    pub is_authenticated: bool,

    /// Whether the viewer account is in good standing (false means banned)
    pub is_active: bool,

    /// Display name
    pub username: String,

    /// Avatar image reference
    pub avatar_url: String,

    /// Whether the viewer is qualified to enroll (karma threshold)
    pub can_participate: bool,

    /// Whether the backend runs in debug mode
    pub is_debug: bool,
}
