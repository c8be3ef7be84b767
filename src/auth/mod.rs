//! Viewer session resolution
//!
//! The session is resolved exactly once at startup and gates everything
//! else; authentication itself is delegated to the external login flow.

mod types;

use reqwest::Client;

use crate::error::Error;
use crate::fetch::Fetch;

pub use types::*;

/// Client for the session endpoints of the club backend
pub struct AuthClient {
    /// The base URL of the backend
    url: String,

    /// HTTP client used for requests
    client: Client,
}

impl AuthClient {
    /// Create a new AuthClient
    pub(crate) fn new(url: &str, client: Client) -> Self {
        Self {
            url: url.to_string(),
            client,
        }
    }

    fn get_backend_url(&self, path: &str) -> String {
        format!("{}/backend{}", self.url, path)
    }

    /// Fetch the current viewer's identity and authorization flags
    pub async fn info(&self) -> Result<Viewer, Error> {
        let url = self.get_backend_url("/info");

        Fetch::get(&self.client, &url).execute::<Viewer>().await
    }

    /// URL of the external login flow, returning to the profile page of
    /// the given season afterwards
    pub fn login_url(&self, year: u32) -> String {
        format!(
            "{}/backend/login?next=%2F{}%2Fprofile%2F",
            self.url, year
        )
    }
}
