//! Profile page state and its lifecycle actions
//!
//! Materializes the viewer's two cards from server snapshots and runs the
//! five mutating actions against the backend. Reconciliation is wholesale:
//! each action response replaces the local season and participation copies
//! outright, and the display state is re-derived from whatever snapshot
//! was received last.

mod state;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::debug;
use tokio::time::sleep;

use crate::auth::Viewer;
use crate::error::Error;
use crate::messages::{ChatThread, MessagesClient};
use crate::seasons::{
    AddressForm, AddressFormError, Country, Participation, Season, SeasonUpdate, SeasonsClient,
};
use crate::SantaClub;

pub use state::*;

/// Observable flip state of one profile card
///
/// A card shows its status on the front and the chat on the back; the same
/// flag also drives the staged reveal after mark-shipped/mark-delivered.
/// Handles are cheap clones sharing one flag, so a rendering layer can
/// watch the flip while an action future is still in flight.
#[derive(Debug, Clone, Default)]
pub struct FlipSignal {
    flipped: Arc<AtomicBool>,
}

impl FlipSignal {
    /// Whether the card currently shows its back
    pub fn get(&self) -> bool {
        self.flipped.load(Ordering::SeqCst)
    }

    fn set(&self, value: bool) {
        self.flipped.store(value, Ordering::SeqCst);
    }
}

/// The profile page of one season, as seen by the resolved viewer
pub struct Profile {
    seasons: SeasonsClient,
    messages: MessagesClient,
    viewer: Viewer,
    year: u32,
    reveal_swap_delay: Duration,

    season: Season,
    participation: Option<Participation>,
    santa_chat: ChatThread,
    giftee_chat: ChatThread,
    countries: Vec<Country>,
    address_errors: AddressFormError,
    santa_card: FlipSignal,
    giftee_card: FlipSignal,
}

impl Profile {
    /// Load the page state for one season
    ///
    /// Requires a resolved, authenticated viewer (the caller redirects to
    /// the landing page otherwise). A missing season propagates as
    /// `Error::NotFound`; a missing participation record and empty chat
    /// threads are normal "not yet" states, so their fetch failures are
    /// swallowed.
    pub async fn load(club: &SantaClub, year: u32) -> Result<Self, Error> {
        let viewer = club.viewer().ok_or(Error::NotAuthenticated)?;
        if !viewer.is_authenticated {
            return Err(Error::NotAuthenticated);
        }

        let seasons = club.seasons();
        let messages = club.messages();

        let season = seasons.get(year).await?;
        let participation = match seasons.participation(year).await {
            Ok(participation) => Some(participation),
            Err(e) => {
                debug!("treating failed participation fetch as not enrolled: {}", e);
                None
            }
        };
        let santa_chat = match seasons.santa_chat(year).await {
            Ok(mails) => ChatThread::new(mails),
            Err(e) => {
                debug!("treating failed santa chat fetch as empty: {}", e);
                ChatThread::default()
            }
        };
        let giftee_chat = match seasons.giftee_chat(year).await {
            Ok(mails) => ChatThread::new(mails),
            Err(e) => {
                debug!("treating failed giftee chat fetch as empty: {}", e);
                ChatThread::default()
            }
        };
        let countries = match seasons.countries().await {
            Ok(countries) => countries,
            Err(e) => {
                debug!("country list unavailable: {}", e);
                Vec::new()
            }
        };

        Ok(Self {
            seasons,
            messages,
            viewer: viewer.clone(),
            year,
            reveal_swap_delay: club.options.reveal_swap_delay,
            season,
            participation,
            santa_chat,
            giftee_chat,
            countries,
            address_errors: AddressFormError::default(),
            santa_card: FlipSignal::default(),
            giftee_card: FlipSignal::default(),
        })
    }

    /// The resolved viewer
    pub fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    /// The season year this page shows
    pub fn year(&self) -> u32 {
        self.year
    }

    /// The last season snapshot received from the backend
    pub fn season(&self) -> &Season {
        &self.season
    }

    /// The last participation snapshot, if the viewer is enrolled
    pub fn participation(&self) -> Option<&Participation> {
        self.participation.as_ref()
    }

    /// The thread with the viewer's santa
    pub fn santa_chat(&self) -> &ChatThread {
        &self.santa_chat
    }

    /// The thread with the viewer's giftee
    pub fn giftee_chat(&self) -> &ChatThread {
        &self.giftee_chat
    }

    /// The address-country reference list
    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    /// Field errors from the last rejected enrollment, if any
    pub fn address_errors(&self) -> &AddressFormError {
        &self.address_errors
    }

    /// Handle to the santa card's flip state
    pub fn santa_card(&self) -> FlipSignal {
        self.santa_card.clone()
    }

    /// Handle to the giftee card's flip state
    pub fn giftee_card(&self) -> FlipSignal {
        self.giftee_card.clone()
    }

    /// Whether the page shows an archived season
    pub fn archived(&self) -> bool {
        self.season.is_closed
    }

    /// Derive the santa-card display state from the current snapshot
    pub fn giver_state(&self, now: DateTime<Utc>) -> GiverState {
        giver_state(&self.viewer, &self.season, self.participation.as_ref(), now)
    }

    /// Derive the giftee-card display state from the current snapshot
    pub fn recipient_state(&self, now: DateTime<Utc>) -> RecipientState {
        recipient_state(&self.season, self.participation.as_ref(), now)
    }

    /// Whether submitting the given address form is currently offered
    pub fn can_enroll(&self, form: &AddressForm) -> bool {
        form.is_complete()
            && matches!(
                self.giver_state(Utc::now()),
                GiverState::NotEnrolled {
                    gate: EnrollmentGate::Open
                }
            )
    }

    /// Whether backing out of the season is currently offered
    pub fn can_unenroll(&self) -> bool {
        matches!(
            self.giver_state(Utc::now()),
            GiverState::AwaitingMatch {
                can_unenroll: true,
                ..
            }
        )
    }

    /// Whether confirming the outbound shipment is currently offered
    pub fn can_mark_shipped(&self) -> bool {
        matches!(
            self.recipient_state(Utc::now()),
            RecipientState::AwaitingShipment { .. }
        )
    }

    /// Whether confirming delivery of the inbound gift is currently offered
    pub fn can_mark_delivered(&self) -> bool {
        matches!(
            self.giver_state(Utc::now()),
            GiverState::Shipped { can_confirm: true }
        )
    }

    /// Whether the viewer can write to their santa
    pub fn can_mail_santa(&self) -> bool {
        self.has_santa() && !self.season.is_closed
    }

    /// Whether the viewer can write to their giftee
    pub fn can_mail_giftee(&self) -> bool {
        self.has_giftee() && !self.season.is_closed
    }

    fn has_santa(&self) -> bool {
        self.participation
            .as_ref()
            .and_then(|p| p.santa.as_ref())
            .is_some()
    }

    fn has_giftee(&self) -> bool {
        self.participation
            .as_ref()
            .and_then(|p| p.giftee.as_ref())
            .is_some()
    }

    // Wholesale replacement; the server response is authoritative and the
    // local copies are never field-merged.
    fn apply(&mut self, update: SeasonUpdate) {
        self.season = update.season;
        self.participation = update.participation;
    }

    /// Submit the address form and enroll the viewer into the season
    ///
    /// On success the season and participation copies are replaced and any
    /// previous field errors are cleared. A validation rejection stores
    /// the per-field error map for the form view and leaves the season and
    /// participation untouched; the viewer may correct and retry.
    pub async fn enroll(&mut self, form: &AddressForm) -> Result<(), Error> {
        if !self.can_enroll(form) {
            return Err(Error::NotPermitted("enrollment is not offered"));
        }
        match self.seasons.enroll(self.year, form).await {
            Ok(update) => {
                self.apply(update);
                self.address_errors = AddressFormError::default();
                Ok(())
            }
            Err(Error::Validation(errors)) => {
                self.address_errors = errors.clone();
                Err(Error::Validation(errors))
            }
            Err(e) => Err(e),
        }
    }

    /// Cancel the viewer's enrollment
    pub async fn unenroll(&mut self) -> Result<(), Error> {
        if !self.can_unenroll() {
            return Err(Error::NotPermitted("unenrolling is not offered"));
        }
        let update = self.seasons.unenroll(self.year).await?;
        self.apply(update);
        Ok(())
    }

    /// Confirm the outbound gift was shipped, with the staged reveal on
    /// the giftee card
    pub async fn mark_shipped(&mut self) -> Result<(), Error> {
        if !self.can_mark_shipped() {
            return Err(Error::NotPermitted("there is nothing to ship"));
        }
        let update = self.seasons.mark_shipped(self.year).await?;
        self.reveal(update, self.giftee_card.clone()).await;
        Ok(())
    }

    /// Confirm the inbound gift arrived, with the staged reveal on the
    /// santa card
    pub async fn mark_delivered(&mut self) -> Result<(), Error> {
        if !self.can_mark_delivered() {
            return Err(Error::NotPermitted("there is nothing to confirm"));
        }
        let update = self.seasons.mark_delivered(self.year).await?;
        self.reveal(update, self.santa_card.clone()).await;
        Ok(())
    }

    // Two-phase reveal: flip the card, hold, swap the staged data, hold,
    // flip back. The holds start only once the response is in hand, so the
    // flip stays visible for the full configured duration regardless of
    // network latency. Season counters update immediately; only the
    // participation swap is what the flip hides.
    async fn reveal(&mut self, update: SeasonUpdate, card: FlipSignal) {
        self.season = update.season;
        card.set(true);
        sleep(self.reveal_swap_delay).await;
        self.participation = update.participation;
        sleep(self.reveal_swap_delay).await;
        card.set(false);
    }

    /// Send a message to the viewer's santa
    ///
    /// The returned canonical message is appended to the local thread; the
    /// parent participation record is deliberately left alone (the thread
    /// is never re-fetched either).
    pub async fn mail_santa(&mut self, text: &str) -> Result<(), Error> {
        if !self.can_mail_santa() {
            return Err(Error::NotPermitted("santa chat is not available"));
        }
        let mail = self.seasons.mail_santa(self.year, text).await?;
        self.santa_chat.append(mail);
        Ok(())
    }

    /// Send a message to the viewer's giftee
    pub async fn mail_giftee(&mut self, text: &str) -> Result<(), Error> {
        if !self.can_mail_giftee() {
            return Err(Error::NotPermitted("giftee chat is not available"));
        }
        let mail = self.seasons.mail_giftee(self.year, text).await?;
        self.giftee_chat.append(mail);
        Ok(())
    }

    /// Flip the santa card between its status face and the chat face
    ///
    /// Opening a thread with unread counterpart mail fires exactly one
    /// mark-read call for the currently-unread ids. The local read state
    /// is not updated optimistically; the next full reload reconciles it,
    /// and a redundant repeat call is tolerated (idempotent server-side).
    pub async fn toggle_santa_chat(&self) {
        let unread = self.santa_chat.unread_ids();
        Self::toggle(&self.santa_card, &self.messages, unread).await;
    }

    /// Flip the giftee card between its status face and the chat face
    pub async fn toggle_giftee_chat(&self) {
        let unread = self.giftee_chat.unread_ids();
        Self::toggle(&self.giftee_card, &self.messages, unread).await;
    }

    async fn toggle(card: &FlipSignal, messages: &MessagesClient, unread: Vec<u64>) {
        let opened = !card.get();
        card.set(opened);
        if opened && !unread.is_empty() {
            if let Err(e) = messages.mark_read(&unread).await {
                debug!("mark_read failed, the next reload reconciles: {}", e);
            }
        }
    }
}
