//! Checkout payload validation.
//!
//! Validation never fails fast: every field is checked independently and
//! all problems are reported together, keyed by field.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use shopfront_core::Email;

use super::fields::CheckoutField;

/// `MM/YY` with a month between 01 and 12.
static EXPIRY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(0[1-9]|1[0-2])/[0-9]{2}$").expect("Invalid regex"));

/// Three or four ASCII digits.
static CVV_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{3,4}$").expect("Invalid regex"));

/// Exactly sixteen ASCII digits.
static CARD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{16}$").expect("Invalid regex"));

/// Field-scoped validation errors.
///
/// An empty map means the payload is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<CheckoutField, String>);

impl FieldErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error for `field`, replacing any previous one.
    pub fn insert(&mut self, field: CheckoutField, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    /// The error for `field`, if any.
    #[must_use]
    pub fn get(&self, field: CheckoutField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    /// Forget the error for `field`.
    pub fn remove(&mut self, field: CheckoutField) -> Option<String> {
        self.0.remove(&field)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn contains(&self, field: CheckoutField) -> bool {
        self.0.contains_key(&field)
    }

    /// Errors in form order.
    pub fn iter(&self) -> impl Iterator<Item = (CheckoutField, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }
}

/// The complete form as submitted, with the card number in digits-only form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutPayload {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub zip_code: String,
    pub card_number: String,
    pub expiry_date: String,
    pub cvv: String,
}

impl CheckoutPayload {
    /// Value of `field`.
    #[must_use]
    pub fn get(&self, field: CheckoutField) -> &str {
        match field {
            CheckoutField::FirstName => &self.first_name,
            CheckoutField::LastName => &self.last_name,
            CheckoutField::Email => &self.email,
            CheckoutField::Phone => &self.phone,
            CheckoutField::Address => &self.address,
            CheckoutField::City => &self.city,
            CheckoutField::ZipCode => &self.zip_code,
            CheckoutField::CardNumber => &self.card_number,
            CheckoutField::ExpiryDate => &self.expiry_date,
            CheckoutField::Cvv => &self.cvv,
        }
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn required_message(field: CheckoutField) -> String {
    format!("{} is required", field.label())
}

/// Required-field checks for the shipping step.
#[must_use]
pub fn validate_shipping(payload: &CheckoutPayload) -> FieldErrors {
    let mut errors = FieldErrors::new();
    for field in CheckoutField::SHIPPING {
        if is_blank(payload.get(field)) {
            errors.insert(field, required_message(field));
        }
    }
    errors
}

/// Full validation of a checkout payload.
///
/// ```
/// use shopfront::checkout::{CheckoutPayload, validate_checkout};
///
/// let payload = CheckoutPayload {
///     first_name: "John".into(),
///     last_name: "Doe".into(),
///     email: "john@example.com".into(),
///     phone: "+15551234567".into(),
///     address: "123 Main St".into(),
///     city: "NYC".into(),
///     zip_code: "10001".into(),
///     card_number: "4111111111111111".into(),
///     expiry_date: "12/27".into(),
///     cvv: "123".into(),
/// };
/// assert!(validate_checkout(&payload).is_empty());
/// ```
#[must_use]
pub fn validate_checkout(payload: &CheckoutPayload) -> FieldErrors {
    let mut errors = validate_shipping(payload);

    if !errors.contains(CheckoutField::Email) && Email::parse(payload.email.trim()).is_err() {
        errors.insert(CheckoutField::Email, "Email is invalid");
    }

    let card = payload.card_number.trim();
    if card.is_empty() {
        errors.insert(
            CheckoutField::CardNumber,
            required_message(CheckoutField::CardNumber),
        );
    } else if !CARD_RE.is_match(card) {
        errors.insert(CheckoutField::CardNumber, "Card number must be 16 digits");
    }

    if is_blank(&payload.expiry_date) {
        errors.insert(
            CheckoutField::ExpiryDate,
            required_message(CheckoutField::ExpiryDate),
        );
    } else if !EXPIRY_RE.is_match(&payload.expiry_date) {
        errors.insert(
            CheckoutField::ExpiryDate,
            "Expiry date must be in MM/YY format",
        );
    }

    if is_blank(&payload.cvv) {
        errors.insert(CheckoutField::Cvv, required_message(CheckoutField::Cvv));
    } else if !CVV_RE.is_match(&payload.cvv) {
        errors.insert(CheckoutField::Cvv, "CVV must be 3 or 4 digits");
    }

    errors
}
