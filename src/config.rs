//! Configuration options for the Secret Santa club client

use std::time::Duration;

/// Configuration options for the Secret Santa club client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// The request timeout
    pub request_timeout: Option<Duration>,

    /// How long a profile card stays flipped before the staged data swap,
    /// and again before it flips back (two-phase reveal)
    pub reveal_swap_delay: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            request_timeout: Some(Duration::from_secs(30)),
            reveal_swap_delay: Duration::from_millis(500),
        }
    }
}

impl ClientOptions {
    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set the reveal swap delay
    pub fn with_reveal_swap_delay(mut self, value: Duration) -> Self {
        self.reveal_swap_delay = value;
        self
    }
}
