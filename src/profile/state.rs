//! Derived display state for the two profile cards
//!
//! The wire carries no status enum; a card's state is derived from which
//! nullable fields of the snapshot are populated. The derivation is a pure
//! function of `(viewer, season, participation, now)` with a total
//! tie-break order: exactly one variant matches any snapshot, and an
//! identical snapshot always derives the identical state.

use chrono::{DateTime, Utc};

use crate::auth::Viewer;
use crate::seasons::{Participation, Season};

const SECONDS_PER_DAY: i64 = 86_400;

/// Why the enrollment form is or is not actionable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrollmentGate {
    /// The viewer is banned; a ban notice replaces the form
    Banned,

    /// Registration has closed for this season
    Closed,

    /// Registration is open but the viewer is not qualified to join
    Ineligible,

    /// The form is offered; submitting additionally requires all four
    /// address fields to be filled in
    Open,
}

/// Where the pairing stands while a relation is still absent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairingStatus {
    /// Registration still open; whole days until the draw (ceiling)
    Countdown {
        /// At least 1 while the close lies in the future
        days_left: i64,
    },

    /// The draw has run and addresses are handed out
    Matched,

    /// Registration closed but the draw has not run yet
    Pending,
}

/// Display state of the santa card: the gift the viewer is owed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GiverState {
    /// No enrollment record exists
    NotEnrolled {
        /// Which face of the enrollment card to show
        gate: EnrollmentGate,
    },

    /// Enrolled, no santa assigned yet
    AwaitingMatch {
        /// Pairing progress messaging
        pairing: PairingStatus,

        /// Whether backing out of the season is still offered
        can_unenroll: bool,
    },

    /// Santa assigned but nothing shipped yet
    AwaitingShipment,

    /// The santa shipped; the viewer confirms delivery on arrival
    Shipped {
        /// The confirm action is hidden once the season has closed
        can_confirm: bool,
    },

    /// The viewer confirmed delivery; terminal
    Delivered {
        /// Post-event gallery, when the season links one
        gallery_url: Option<String>,
    },
}

/// Display state of the giftee card: the gift the viewer owes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipientState {
    /// No giftee assigned yet
    AwaitingMatch {
        /// Pairing progress messaging
        pairing: PairingStatus,
    },

    /// Giftee assigned; the viewer still has to ship to their address
    AwaitingShipment {
        /// The season closed before the viewer shipped
        overdue: bool,
    },

    /// The viewer shipped; the giftee has not confirmed yet
    Shipped,

    /// The giftee confirmed delivery; terminal regardless of season state
    Delivered,
}

fn days_until(deadline: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let seconds = (deadline - now).num_seconds();
    if seconds <= 0 {
        0
    } else {
        (seconds + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY
    }
}

/// Pairing progress shown while the viewer waits for a relation
pub fn pairing_status(season: &Season, now: DateTime<Utc>) -> PairingStatus {
    let days_left = days_until(season.registration_close, now);
    if days_left > 0 {
        PairingStatus::Countdown { days_left }
    } else if season.is_matched {
        PairingStatus::Matched
    } else {
        PairingStatus::Pending
    }
}

/// Derive the santa-card state from a snapshot
pub fn giver_state(
    viewer: &Viewer,
    season: &Season,
    participation: Option<&Participation>,
    now: DateTime<Utc>,
) -> GiverState {
    let participation = match participation {
        Some(participation) => participation,
        None => {
            let gate = if !viewer.is_active {
                EnrollmentGate::Banned
            } else if !season.is_registration_open {
                EnrollmentGate::Closed
            } else if !viewer.can_participate {
                EnrollmentGate::Ineligible
            } else {
                EnrollmentGate::Open
            };
            return GiverState::NotEnrolled { gate };
        }
    };

    match &participation.santa {
        None => GiverState::AwaitingMatch {
            pairing: pairing_status(season, now),
            can_unenroll: season.is_registration_open,
        },
        Some(santa) => {
            if participation.gift_delivered_at.is_some() {
                GiverState::Delivered {
                    gallery_url: season.gallery_url.clone(),
                }
            } else if santa.gift_shipped_at.is_some() {
                GiverState::Shipped {
                    can_confirm: !season.is_closed,
                }
            } else {
                GiverState::AwaitingShipment
            }
        }
    }
}

/// Derive the giftee-card state from a snapshot
pub fn recipient_state(
    season: &Season,
    participation: Option<&Participation>,
    now: DateTime<Utc>,
) -> RecipientState {
    let giftee = participation.and_then(|p| p.giftee.as_ref());
    match (participation, giftee) {
        (Some(participation), Some(giftee)) => {
            if giftee.gift_delivered_at.is_some() {
                RecipientState::Delivered
            } else if participation.gift_shipped_at.is_some() {
                RecipientState::Shipped
            } else {
                RecipientState::AwaitingShipment {
                    overdue: season.is_closed,
                }
            }
        }
        _ => RecipientState::AwaitingMatch {
            pairing: pairing_status(season, now),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use crate::seasons::{Giftee, Santa};

    fn viewer() -> Viewer {
        Viewer {
            csrf_token: "token".to_string(),
            is_authenticated: true,
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
            member_count: 100,
            shipped_count: 40,
            delivered_count: 20,
            registration_open: Utc.with_ymd_and_hms(2024, 11, 1, 0, 0, 0).unwrap(),
            registration_close: Utc.with_ymd_and_hms(2024, 12, 10, 0, 0, 0).unwrap(),
            season_close: Utc.with_ymd_and_hms(2025, 1, 14, 0, 0, 0).unwrap(),
            is_registration_open: true,
            is_matched: false,
            gallery_url: None,
        }
    }

    fn participation() -> Participation {
        Participation {
            fullname: "Ivan Ivanov".to_string(),
            postcode: "101000".to_string(),
            address: "Moscow, Stroiteley 25".to_string(),
            country: "RU".to_string(),
            gift_shipped_at: None,
            gift_delivered_at: None,
            santa: None,
            giftee: None,
        }
    }

    fn giftee() -> Giftee {
        Giftee {
            fullname: "Petr Petrov".to_string(),
            postcode: "190000".to_string(),
            address: "Saint Petersburg, Nevsky 1".to_string(),
            country: "RU".to_string(),
            gift_delivered_at: None,
        }
    }

    fn ts(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 12, day, 12, 0, 0).unwrap()
    }

    #[test]
    fn derivation_is_idempotent() {
        let viewer = viewer();
        let season = season();
        let mut participation = participation();
        participation.santa = Some(Santa {
            gift_shipped_at: Some(ts(15)),
        });
        participation.giftee = Some(giftee());
        let now = ts(20);

        let first = giver_state(&viewer, &season, Some(&participation), now);
        let second = giver_state(&viewer, &season, Some(&participation), now);
        assert_eq!(first, second);

        let first = recipient_state(&season, Some(&participation), now);
        let second = recipient_state(&season, Some(&participation), now);
        assert_eq!(first, second);
    }

    #[test]
    fn enrollment_gate_order_is_banned_closed_ineligible_open() {
        let season = season();
        let now = ts(1);

        let mut banned = viewer();
        banned.is_active = false;
        banned.can_participate = false;
        assert_eq!(
            giver_state(&banned, &season, None, now),
            GiverState::NotEnrolled {
                gate: EnrollmentGate::Banned
            }
        );

        let mut closed_season = season.clone();
        closed_season.is_registration_open = false;
        let mut unqualified = viewer();
        unqualified.can_participate = false;
        assert_eq!(
            giver_state(&unqualified, &closed_season, None, now),
            GiverState::NotEnrolled {
                gate: EnrollmentGate::Closed
            }
        );

        assert_eq!(
            giver_state(&unqualified, &season, None, now),
            GiverState::NotEnrolled {
                gate: EnrollmentGate::Ineligible
            }
        );

        assert_eq!(
            giver_state(&viewer(), &season, None, now),
            GiverState::NotEnrolled {
                gate: EnrollmentGate::Open
            }
        );
    }

    #[test]
    fn enrolled_without_santa_waits_for_the_match() {
        let viewer = viewer();
        let season = season();
        let participation = participation();

        // Dec 8 noon, close Dec 10 midnight: one and a half days, rounded up.
        let state = giver_state(&viewer, &season, Some(&participation), ts(8));
        assert_eq!(
            state,
            GiverState::AwaitingMatch {
                pairing: PairingStatus::Countdown { days_left: 2 },
                can_unenroll: true,
            }
        );

        let mut after_close = season.clone();
        after_close.is_registration_open = false;
        let state = giver_state(&viewer, &after_close, Some(&participation), ts(11));
        assert_eq!(
            state,
            GiverState::AwaitingMatch {
                pairing: PairingStatus::Pending,
                can_unenroll: false,
            }
        );

        after_close.is_matched = true;
        let state = giver_state(&viewer, &after_close, Some(&participation), ts(11));
        assert_eq!(
            state,
            GiverState::AwaitingMatch {
                pairing: PairingStatus::Matched,
                can_unenroll: false,
            }
        );
    }

    #[test]
    fn santa_side_follows_ship_then_delivery_timestamps() {
        let viewer = viewer();
        let season = season();
        let mut participation = participation();
        participation.santa = Some(Santa {
            gift_shipped_at: None,
        });

        assert_eq!(
            giver_state(&viewer, &season, Some(&participation), ts(15)),
            GiverState::AwaitingShipment
        );

        participation.santa = Some(Santa {
            gift_shipped_at: Some(ts(15)),
        });
        assert_eq!(
            giver_state(&viewer, &season, Some(&participation), ts(16)),
            GiverState::Shipped { can_confirm: true }
        );

        let mut closed = season.clone();
        closed.is_closed = true;
        assert_eq!(
            giver_state(&viewer, &closed, Some(&participation), ts(16)),
            GiverState::Shipped { can_confirm: false }
        );

        participation.gift_delivered_at = Some(ts(20));
        let mut with_gallery = closed.clone();
        with_gallery.gallery_url = Some("https://example.com/gallery".to_string());
        assert_eq!(
            giver_state(&viewer, &with_gallery, Some(&participation), ts(21)),
            GiverState::Delivered {
                gallery_url: Some("https://example.com/gallery".to_string())
            }
        );
    }

    #[test]
    fn recipient_side_follows_own_ship_and_giftee_delivery() {
        let season = season();

        assert_eq!(
            recipient_state(&season, None, ts(8)),
            RecipientState::AwaitingMatch {
                pairing: PairingStatus::Countdown { days_left: 2 }
            }
        );

        let mut participation = participation();
        assert_eq!(
            recipient_state(&season, Some(&participation), ts(8)),
            RecipientState::AwaitingMatch {
                pairing: PairingStatus::Countdown { days_left: 2 }
            }
        );

        participation.giftee = Some(giftee());
        assert_eq!(
            recipient_state(&season, Some(&participation), ts(12)),
            RecipientState::AwaitingShipment { overdue: false }
        );

        let mut closed = season.clone();
        closed.is_closed = true;
        assert_eq!(
            recipient_state(&closed, Some(&participation), ts(12)),
            RecipientState::AwaitingShipment { overdue: true }
        );

        participation.gift_shipped_at = Some(ts(14));
        assert_eq!(
            recipient_state(&season, Some(&participation), ts(15)),
            RecipientState::Shipped
        );
    }

    #[test]
    fn delivered_is_terminal_regardless_of_season_close() {
        let mut participation = participation();
        participation.gift_shipped_at = Some(ts(14));
        let mut giftee = giftee();
        giftee.gift_delivered_at = Some(ts(20));
        participation.giftee = Some(giftee);

        let mut closed = season();
        closed.is_closed = true;

        assert_eq!(
            recipient_state(&closed, Some(&participation), ts(25)),
            RecipientState::Delivered
        );
        assert_eq!(
            recipient_state(&season(), Some(&participation), ts(25)),
            RecipientState::Delivered
        );
    }

    #[test]
    fn countdown_rounds_up_and_stops_at_zero() {
        let season = season();

        // 30 minutes before the close still counts as one day.
        let close_call = Utc.with_ymd_and_hms(2024, 12, 9, 23, 30, 0).unwrap();
        assert_eq!(
            pairing_status(&season, close_call),
            PairingStatus::Countdown { days_left: 1 }
        );

        // The moment it passes, the countdown is over.
        let passed = Utc.with_ymd_and_hms(2024, 12, 10, 0, 0, 1).unwrap();
        assert_eq!(pairing_status(&season, passed), PairingStatus::Pending);
    }
}
