//! Season metadata and all season-scoped operations
//!
//! Everything here is a thin typed wrapper over the REST endpoints; the
//! backend owns the season lifecycle, the matching, and all validation.
//! Responses replace local state wholesale, see [`SeasonUpdate`].

mod types;

use std::collections::HashMap;

use reqwest::Client;

use crate::error::Error;
use crate::fetch::Fetch;
use crate::messages::Mail;

pub use types::*;

/// Client for season and participation operations
pub struct SeasonsClient {
    /// The base URL of the backend
    url: String,

    /// Forgery-protection token, present once a session is resolved
    csrf_token: Option<String>,

    /// HTTP client used for requests
    client: Client,
}

impl SeasonsClient {
    /// Create a new SeasonsClient
    pub(crate) fn new(url: &str, csrf_token: Option<String>, client: Client) -> Self {
        Self {
            url: url.to_string(),
            csrf_token,
            client,
        }
    }

    fn get_api_url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.url, path)
    }

    fn csrf(&self) -> Result<&str, Error> {
        self.csrf_token.as_deref().ok_or(Error::NotAuthenticated)
    }

    /// Fetch the latest season
    ///
    /// Returns `Error::NotFound` if no season exists yet.
    pub async fn latest(&self) -> Result<Season, Error> {
        let url = self.get_api_url("/seasons/latest");

        Fetch::get(&self.client, &url).execute::<Season>().await
    }

    /// Fetch one season by year
    ///
    /// A missing year is `Error::NotFound` (the caller redirects to the
    /// not-found surface); other failures carry the server's detail text.
    pub async fn get(&self, year: u32) -> Result<Season, Error> {
        let url = self.get_api_url(&format!("/seasons/{}", year));

        Fetch::get(&self.client, &url).execute::<Season>().await
    }

    /// Fetch the address-country reference list
    pub async fn countries(&self) -> Result<Vec<Country>, Error> {
        let url = self.get_api_url("/countries");

        Fetch::get(&self.client, &url).execute::<Vec<Country>>().await
    }

    /// Fetch the viewer's enrollment record for the given season
    ///
    /// Errors here mean "not enrolled" to the profile page, not failure.
    pub async fn participation(&self, year: u32) -> Result<Participation, Error> {
        let url = self.get_api_url(&format!("/seasons/{}/participation", year));

        Fetch::get(&self.client, &url)
            .execute::<Participation>()
            .await
    }

    /// Enroll the viewer into the given season with the submitted address
    ///
    /// A rejected form comes back as `Error::Validation` carrying the
    /// per-field error map; local state must stay untouched in that case.
    pub async fn enroll(&self, year: u32, form: &AddressForm) -> Result<SeasonUpdate, Error> {
        let url = self.get_api_url(&format!("/seasons/{}/participation", year));

        let response = Fetch::post(&self.client, &url)
            .csrf(self.csrf()?)
            .json(form)?
            .execute_raw()
            .await?;

        if response.status().is_success() {
            return Ok(response.json::<SeasonUpdate>().await?);
        }

        // The rejection body is the field error map itself, not a detail
        // object; fall back to the generic path when it is neither.
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if let Ok(errors) = serde_json::from_str::<AddressFormError>(&text) {
            if !errors.is_empty() {
                return Err(Error::Validation(errors));
            }
        }
        let detail = serde_json::from_str::<serde_json::Value>(&text)
            .ok()
            .and_then(|body| {
                body.get("detail")
                    .and_then(|d| d.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| format!("request failed with status {}", status));
        Err(Error::api(detail))
    }

    /// Cancel the viewer's enrollment for the given season
    ///
    /// Only possible while registration is still open; the server is
    /// authoritative on the exact cutoff.
    pub async fn unenroll(&self, year: u32) -> Result<SeasonUpdate, Error> {
        let url = self.get_api_url(&format!("/seasons/{}/participation", year));

        Fetch::delete(&self.client, &url)
            .csrf(self.csrf()?)
            .execute::<SeasonUpdate>()
            .await
    }

    /// Tell the club the viewer has shipped their gift
    pub async fn mark_shipped(&self, year: u32) -> Result<SeasonUpdate, Error> {
        let url = self.get_api_url(&format!("/seasons/{}/mark_shipped", year));

        Fetch::post(&self.client, &url)
            .csrf(self.csrf()?)
            .execute::<SeasonUpdate>()
            .await
    }

    /// Tell the club the viewer has received their gift
    pub async fn mark_delivered(&self, year: u32) -> Result<SeasonUpdate, Error> {
        let url = self.get_api_url(&format!("/seasons/{}/mark_delivered", year));

        Fetch::post(&self.client, &url)
            .csrf(self.csrf()?)
            .execute::<SeasonUpdate>()
            .await
    }

    /// Fetch the thread between the viewer and their santa
    pub async fn santa_chat(&self, year: u32) -> Result<Vec<Mail>, Error> {
        let url = self.get_api_url(&format!("/seasons/{}/santa_chat", year));

        Fetch::get(&self.client, &url).execute::<Vec<Mail>>().await
    }

    /// Fetch the thread between the viewer and their giftee
    pub async fn giftee_chat(&self, year: u32) -> Result<Vec<Mail>, Error> {
        let url = self.get_api_url(&format!("/seasons/{}/giftee_chat", year));

        Fetch::get(&self.client, &url).execute::<Vec<Mail>>().await
    }

    /// Send a message to the viewer's santa
    ///
    /// Returns the canonical stored message, to be appended to the local
    /// thread as-is.
    pub async fn mail_santa(&self, year: u32, text: &str) -> Result<Mail, Error> {
        let url = self.get_api_url(&format!("/seasons/{}/santa_chat", year));

        self.post_mail(&url, text).await
    }

    /// Send a message to the viewer's giftee
    pub async fn mail_giftee(&self, year: u32, text: &str) -> Result<Mail, Error> {
        let url = self.get_api_url(&format!("/seasons/{}/giftee_chat", year));

        self.post_mail(&url, text).await
    }

    async fn post_mail(&self, url: &str, text: &str) -> Result<Mail, Error> {
        let mut body = HashMap::new();
        body.insert("text".to_string(), text.to_string());

        Fetch::post(&self.client, url)
            .csrf(self.csrf()?)
            .json(&body)?
            .execute::<Mail>()
            .await
    }
}
