//! Types for seasons, participation, and the address form

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One yearly run of the gift exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Season {
    /// Season identifier (the year)
    pub id: u32,

    /// Whether the season has ended and is shown as an archive
    pub is_closed: bool,

    /// Number of enrolled participants
    pub member_count: u64,

    /// Number of participants who marked their gift as shipped
    pub shipped_count: u64,

    /// Number of participants who confirmed delivery
    pub delivered_count: u64,

    /// When registration opens
    pub registration_open: DateTime<Utc>,

    /// When registration closes and the matching is drawn
    pub registration_close: DateTime<Utc>,

    /// When the season ends
    pub season_close: DateTime<Utc>,

    /// Whether enrollment is currently possible
    pub is_registration_open: bool,

    /// Whether the matching algorithm has already run
    pub is_matched: bool,

    /// Post-event photo gallery, if the season has one
    pub gallery_url: Option<String>,
}

/// The giver-relation: whoever is shopping for the viewer
///
/// Deliberately opaque; the only thing the viewer may learn about their
/// santa is whether the gift is on its way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Santa {
    /// When the santa marked the gift as shipped
    pub gift_shipped_at: Option<DateTime<Utc>>,
}

/// The recipient-relation: the person the viewer ships a gift to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Giftee {
    /// Full name to address the parcel to
    pub fullname: String,

    /// Postal code
    pub postcode: String,

    /// Free-text postal address
    pub address: String,

    /// ISO country code
    pub country: String,

    /// When the giftee confirmed delivery
    pub gift_delivered_at: Option<DateTime<Utc>>,
}

/// The viewer's enrollment record for a season
///
/// The relation address fields are populated exactly when the matching has
/// run; an absent relation means "not yet matched", never an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participation {
    /// Full name the viewer enrolled with
    pub fullname: String,

    /// Postal code the viewer enrolled with
    pub postcode: String,

    /// Free-text postal address the viewer enrolled with
    pub address: String,

    /// ISO country code the viewer enrolled with
    pub country: String,

    /// When the viewer marked their own gift as shipped
    pub gift_shipped_at: Option<DateTime<Utc>>,

    /// When the viewer confirmed receiving their own gift
    pub gift_delivered_at: Option<DateTime<Utc>>,

    /// Who is shopping for the viewer, once matched
    pub santa: Option<Santa>,

    /// Who the viewer is shopping for, once matched
    pub giftee: Option<Giftee>,
}

/// Reconciliation payload returned by every participation-mutating action
///
/// The client replaces its local copies with this wholesale; fields are
/// never merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonUpdate {
    /// Authoritative season counters and flags
    pub season: Season,

    /// Authoritative enrollment record; absent after unenrolling
    pub participation: Option<Participation>,
}

/// Entry of the address-country reference list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    /// ISO country code
    pub code: String,

    /// Display name
    pub name: String,
}

/// Transient input buffer for the enrollment form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AddressForm {
    /// Full name to ship to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fullname: Option<String>,

    /// Postal code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postcode: Option<String>,

    /// Free-text postal address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// ISO country code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl AddressForm {
    /// Create a fully filled-in form
    pub fn new(fullname: &str, postcode: &str, address: &str, country: &str) -> Self {
        Self {
            fullname: Some(fullname.to_string()),
            postcode: Some(postcode.to_string()),
            address: Some(address.to_string()),
            country: Some(country.to_string()),
        }
    }

    /// Whether all four fields are present and non-empty
    ///
    /// Enrollment is only offered once this holds; the server still
    /// validates authoritatively.
    pub fn is_complete(&self) -> bool {
        [&self.fullname, &self.postcode, &self.address, &self.country]
            .iter()
            .all(|field| !field.as_deref().unwrap_or("").is_empty())
    }
}

/// Per-field validation errors returned when enrollment is rejected
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressFormError {
    /// Messages for the full-name field
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fullname: Option<Vec<String>>,

    /// Messages for the postcode field
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postcode: Option<Vec<String>>,

    /// Messages for the address field
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Vec<String>>,
}

impl AddressFormError {
    /// Whether no field carries an error message
    pub fn is_empty(&self) -> bool {
        self.fullname.is_none() && self.postcode.is_none() && self.address.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_form_requires_all_four_fields() {
        let form = AddressForm::new("Ivan Ivanov", "101000", "Moscow, Stroiteley 25", "RU");
        assert!(form.is_complete());

        let mut missing = form.clone();
        missing.country = None;
        assert!(!missing.is_complete());

        let mut blank = form;
        blank.postcode = Some(String::new());
        assert!(!blank.is_complete());

        assert!(!AddressForm::default().is_complete());
    }

    #[test]
    fn empty_fields_are_not_serialized() {
        let mut form = AddressForm::new("Ivan", "101000", "Moscow", "RU");
        form.country = None;
        let json = serde_json::to_value(&form).unwrap();
        assert!(json.get("country").is_none());
        assert_eq!(json.get("fullname").unwrap(), "Ivan");
    }

    #[test]
    fn error_map_reports_emptiness() {
        assert!(AddressFormError::default().is_empty());

        let errors: AddressFormError =
            serde_json::from_str(r#"{"postcode": ["Enter a valid postcode."]}"#).unwrap();
        assert!(!errors.is_empty());
        assert_eq!(errors.postcode.unwrap().len(), 1);
        assert!(errors.fullname.is_none());
    }
}
