//! Per-pairing chat threads and the bulk mark-read endpoint
//!
//! A thread is an append-only message log; the server owns read state and
//! ordering, the client only appends canonical messages it got back from
//! a send and counts unread counterpart mail.

mod types;

use reqwest::Client;

use crate::error::Error;
use crate::fetch::Fetch;

pub use types::Mail;
use types::MarkRead;

/// Client for message-level operations
pub struct MessagesClient {
    /// The base URL of the backend
    url: String,

    /// Forgery-protection token, present once a session is resolved
    csrf_token: Option<String>,

    /// HTTP client used for requests
    client: Client,
}

impl MessagesClient {
    /// Create a new MessagesClient
    pub(crate) fn new(url: &str, csrf_token: Option<String>, client: Client) -> Self {
        Self {
            url: url.to_string(),
            csrf_token,
            client,
        }
    }

    /// Mark the given messages as read
    ///
    /// Idempotent server-side; the response body carries nothing the
    /// client consumes.
    pub async fn mark_read(&self, ids: &[u64]) -> Result<(), Error> {
        let url = format!("{}/api/v1/messages/mark_read", self.url);
        let token = self.csrf_token.as_deref().ok_or(Error::NotAuthenticated)?;

        let body = MarkRead { ids: ids.to_vec() };
        Fetch::post(&self.client, &url)
            .csrf(token)
            .json(&body)?
            .execute_raw()
            .await?;
        Ok(())
    }
}

/// One ordered per-pairing message log
///
/// The two threads of a profile (santa-side, giftee-side) are wholly
/// independent; nothing in one ever affects the other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatThread {
    mails: Vec<Mail>,
}

impl ChatThread {
    /// Create a thread from a fetched message log
    pub fn new(mails: Vec<Mail>) -> Self {
        Self { mails }
    }

    /// All messages, in insertion order
    pub fn mails(&self) -> &[Mail] {
        &self.mails
    }

    /// Append the canonical message returned by a send
    ///
    /// Prior entries keep their order and content; the thread is never
    /// re-fetched after a send.
    pub fn append(&mut self, mail: Mail) {
        self.mails.push(mail);
    }

    /// Number of unread messages written by the counterpart
    ///
    /// The viewer's own messages never count, read or not.
    pub fn unread_count(&self) -> usize {
        self.unread_ids().len()
    }

    /// Identifiers of all currently-unread counterpart messages
    ///
    /// This is exactly the payload for one mark-read call when the thread
    /// view is opened.
    pub fn unread_ids(&self) -> Vec<u64> {
        self.mails
            .iter()
            .filter(|mail| mail.read_date.is_none() && !mail.is_author)
            .map(|mail| mail.id)
            .collect()
    }

    /// Number of messages in the thread
    pub fn len(&self) -> usize {
        self.mails.len()
    }

    /// Whether the thread has no messages
    pub fn is_empty(&self) -> bool {
        self.mails.is_empty()
    }
}
