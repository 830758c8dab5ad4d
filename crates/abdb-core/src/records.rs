//! Entity references and records: the units of work and output of a harvest.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::keys::{name_key, registration_key};

/// Swedish postal code (`NNN NN`, space optional) followed by the post town.
static POSTAL_CITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{3}\s*\d{2}\s+(.+)").expect("valid postal city regex"));

/// Minimal handle to a company discovered on a listing page.
///
/// Created once by the listing enumerator and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityReference {
    pub name: String,
    #[serde(rename = "profile_url")]
    pub profile_url: String,
}

impl EntityReference {
    #[must_use]
    pub fn new(name: impl Into<String>, profile_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            profile_url: profile_url.into(),
        }
    }

    /// Lowercased, trimmed name used for checkpoint lookups.
    #[must_use]
    pub fn name_key(&self) -> String {
        name_key(&self.name)
    }
}

/// A fully (or partially) populated company record.
///
/// `city` is not settable on its own: it is always derived from
/// `postal_address` through [`EntityRecord::set_postal_address`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityRecord {
    pub name: String,
    pub profile_url: String,
    pub emails: Vec<String>,
    pub org_number: Option<String>,
    pub revenue: Option<i64>,
    pub legal_name: Option<String>,
    pub registration_date: Option<String>,
    pub company_type: Option<String>,
    pub employees: Option<String>,
    pub ceo: Option<String>,
    pub address: Option<String>,
    postal_address: Option<String>,
    city: Option<String>,
    pub share_capital: Option<String>,
    pub sni_codes: Vec<String>,
    pub business_purpose: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
}

impl EntityRecord {
    /// Promotes a reference to a record with every detail field absent.
    #[must_use]
    pub fn from_reference(reference: &EntityReference) -> Self {
        Self {
            name: reference.name.clone(),
            profile_url: reference.profile_url.clone(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn reference(&self) -> EntityReference {
        EntityReference::new(self.name.clone(), self.profile_url.clone())
    }

    #[must_use]
    pub fn postal_address(&self) -> Option<&str> {
        self.postal_address.as_deref()
    }

    #[must_use]
    pub fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }

    /// Sets the postal address and re-derives `city` from it.
    pub fn set_postal_address(&mut self, postal_address: impl Into<String>) {
        let postal_address = postal_address.into();
        self.city = derive_city(&postal_address);
        self.postal_address = Some(postal_address);
    }

    /// Clears the postal address, and with it the derived city.
    pub fn clear_postal_address(&mut self) {
        self.postal_address = None;
        self.city = None;
    }

    #[must_use]
    pub fn name_key(&self) -> String {
        name_key(&self.name)
    }

    #[must_use]
    pub fn registration_key(&self) -> String {
        registration_key(self.org_number.as_deref())
    }

    /// Website with surrounding whitespace removed, or `None` when blank.
    #[must_use]
    pub fn website_value(&self) -> Option<&str> {
        self.website
            .as_deref()
            .map(str::trim)
            .filter(|w| !w.is_empty() && !w.eq_ignore_ascii_case("nan"))
    }
}

/// Extracts the post town following a `NNN NN` postal code.
///
/// `"703 61 Örebro"` yields `Some("Örebro")`; text without a recognizable
/// postal code yields `None`.
#[must_use]
pub fn derive_city(postal_address: &str) -> Option<String> {
    POSTAL_CITY_RE
        .captures(postal_address)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_owned())
        .filter(|city| !city.is_empty())
}
