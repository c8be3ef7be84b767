//! Secret Santa Club Client Library
//!
//! A Rust client library for the Secret Santa club backend, providing the
//! viewer session, season metadata, the participation lifecycle with its
//! derived card states, and the per-pairing chat threads.
//!
//! The backend owns all business logic (season lifecycle, matching,
//! validation, moderation, message persistence); everything this crate
//! holds is a refreshable copy of server state, replaced wholesale with
//! each authoritative response.

pub mod auth;
pub mod config;
pub mod error;
pub mod fetch;
pub mod messages;
pub mod profile;
pub mod seasons;

use log::debug;
use reqwest::Client;

use crate::auth::{AuthClient, Viewer};
use crate::config::ClientOptions;
use crate::error::Error;
use crate::messages::MessagesClient;
use crate::seasons::{Season, SeasonsClient};

/// The main entry point for the Secret Santa club client
pub struct SantaClub {
    /// The base URL of the backend
    pub url: String,

    /// HTTP client used for requests
    pub http_client: Client,

    /// The viewer session, once resolved
    viewer: Option<Viewer>,

    /// Client options
    pub options: ClientOptions,
}

impl SantaClub {
    /// Create a new client for the given backend
    ///
    /// # Example
    ///
    /// ```
    /// use santa_club::SantaClub;
    ///
    /// let club = SantaClub::new("https://club.example.com");
    /// ```
    pub fn new(url: &str) -> Self {
        Self::new_with_options(url, ClientOptions::default())
    }

    /// Create a new client with custom options
    ///
    /// # Example
    ///
    /// ```
    /// use santa_club::{config::ClientOptions, SantaClub};
    /// use std::time::Duration;
    ///
    /// let options = ClientOptions::default()
    ///     .with_reveal_swap_delay(Duration::from_millis(250));
    /// let club = SantaClub::new_with_options("https://club.example.com", options);
    /// ```
    pub fn new_with_options(url: &str, options: ClientOptions) -> Self {
        let http_client = match options.request_timeout {
            Some(timeout) => Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|e| {
                    debug!("falling back to a default HTTP client: {}", e);
                    Client::new()
                }),
            None => Client::new(),
        };

        Self {
            url: url.trim_end_matches('/').to_string(),
            http_client,
            viewer: None,
            options,
        }
    }

    /// Resolve the viewer session
    ///
    /// Runs once at startup and gates everything else; the resolved viewer
    /// is read-only for the rest of the page lifetime.
    pub async fn connect(&mut self) -> Result<&Viewer, Error> {
        let viewer = self.auth().info().await?;
        Ok(self.viewer.insert(viewer))
    }

    /// The resolved viewer session, if `connect` has run
    pub fn viewer(&self) -> Option<&Viewer> {
        self.viewer.as_ref()
    }

    /// Client for the session endpoints
    pub fn auth(&self) -> AuthClient {
        AuthClient::new(&self.url, self.http_client.clone())
    }

    /// Client for season and participation operations
    pub fn seasons(&self) -> SeasonsClient {
        SeasonsClient::new(
            &self.url,
            self.viewer.as_ref().map(|v| v.csrf_token.clone()),
            self.http_client.clone(),
        )
    }

    /// Client for message-level operations
    pub fn messages(&self) -> MessagesClient {
        MessagesClient::new(
            &self.url,
            self.viewer.as_ref().map(|v| v.csrf_token.clone()),
            self.http_client.clone(),
        )
    }
}

/// Route for the initial redirect once the latest season is known
///
/// Authenticated viewers land on their profile page, everyone else on the
/// season landing page.
pub fn home_redirect(viewer: &Viewer, season: &Season) -> String {
    if viewer.is_authenticated {
        format!("/{}/profile/", season.id)
    } else {
        format!("/{}/", season.id)
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::config::ClientOptions;
    pub use crate::error::Error;
    pub use crate::SantaClub;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn viewer(authenticated: bool) -> Viewer {
        Viewer {
            csrf_token: "token".to_string(),
            is_authenticated: authenticated,
            is_active: true,
            username: "grinch".to_string(),
            avatar_url: "https://example.com/avatar.png".to_string(),
            can_participate: true,
            is_debug: false,
        }
    }

    fn season() -> Season {
        Season {
            id: 2024,
            is_closed: false,
            member_count: 1,
            shipped_count: 0,
            delivered_count: 0,
            registration_open: Utc.with_ymd_and_hms(2024, 11, 1, 0, 0, 0).unwrap(),
            registration_close: Utc.with_ymd_and_hms(2024, 12, 10, 0, 0, 0).unwrap(),
            season_close: Utc.with_ymd_and_hms(2025, 1, 14, 0, 0, 0).unwrap(),
            is_registration_open: true,
            is_matched: false,
            gallery_url: None,
        }
    }

    #[test]
    fn home_redirect_depends_on_authentication() {
        assert_eq!(home_redirect(&viewer(true), &season()), "/2024/profile/");
        assert_eq!(home_redirect(&viewer(false), &season()), "/2024/");
    }

    #[test]
    fn base_url_loses_its_trailing_slash() {
        let club = SantaClub::new("https://club.example.com/");
        assert_eq!(club.url, "https://club.example.com");
    }
}
