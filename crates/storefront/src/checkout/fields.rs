//! Checkout form fields and input normalization.
//!
//! Payment inputs are reformatted on every keystroke so the stored value is
//! always in display form: the card number grouped in fours, the expiry as
//! `MM/YY`, the CVV digits only.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Maximum length of a grouped card number (16 digits + 3 separators).
pub const CARD_NUMBER_MAX_LEN: usize = 19;

/// Maximum length of an expiry date (`MM/YY`).
pub const EXPIRY_MAX_LEN: usize = 5;

/// Maximum length of a CVV.
pub const CVV_MAX_LEN: usize = 4;

/// A text field on the checkout form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CheckoutField {
    FirstName,
    LastName,
    Email,
    Phone,
    Address,
    City,
    ZipCode,
    CardNumber,
    ExpiryDate,
    Cvv,
}

impl CheckoutField {
    /// Every field, in form order.
    pub const ALL: [Self; 10] = [
        Self::FirstName,
        Self::LastName,
        Self::Email,
        Self::Phone,
        Self::Address,
        Self::City,
        Self::ZipCode,
        Self::CardNumber,
        Self::ExpiryDate,
        Self::Cvv,
    ];

    /// Fields collected on the shipping step.
    pub const SHIPPING: [Self; 7] = [
        Self::FirstName,
        Self::LastName,
        Self::Email,
        Self::Phone,
        Self::Address,
        Self::City,
        Self::ZipCode,
    ];

    /// Fields collected on the payment step.
    pub const PAYMENT: [Self; 3] = [Self::CardNumber, Self::ExpiryDate, Self::Cvv];

    /// Form field name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Address => "address",
            Self::City => "city",
            Self::ZipCode => "zipCode",
            Self::CardNumber => "cardNumber",
            Self::ExpiryDate => "expiryDate",
            Self::Cvv => "cvv",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::FirstName => "First name",
            Self::LastName => "Last name",
            Self::Email => "Email",
            Self::Phone => "Phone number",
            Self::Address => "Address",
            Self::City => "City",
            Self::ZipCode => "ZIP code",
            Self::CardNumber => "Card number",
            Self::ExpiryDate => "Expiry date",
            Self::Cvv => "CVV",
        }
    }

    /// Normalize raw input for this field.
    #[must_use]
    pub fn normalize(&self, raw: &str) -> String {
        match self {
            Self::CardNumber => normalize_card_number(raw),
            Self::ExpiryDate => normalize_expiry(raw),
            Self::Cvv => normalize_cvv(raw),
            _ => raw.to_string(),
        }
    }
}

impl fmt::Display for CheckoutField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CheckoutField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| format!("unknown checkout field: {s}"))
    }
}

fn digits(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Strip non-digits, group in fours separated by spaces, cap at 19 characters.
///
/// ```
/// use shopfront::checkout::normalize_card_number;
///
/// assert_eq!(normalize_card_number("4111-1111-1111-1111"), "4111 1111 1111 1111");
/// ```
#[must_use]
pub fn normalize_card_number(raw: &str) -> String {
    let mut grouped = String::with_capacity(CARD_NUMBER_MAX_LEN);
    for (i, digit) in digits(raw).chars().enumerate() {
        if i > 0 && i % 4 == 0 {
            grouped.push(' ');
        }
        grouped.push(digit);
    }
    grouped.chars().take(CARD_NUMBER_MAX_LEN).collect()
}

/// Strip non-digits; after the second digit insert `/`; cap at 5 characters.
#[must_use]
pub fn normalize_expiry(raw: &str) -> String {
    let digits = digits(raw);
    if digits.len() <= 2 {
        return digits;
    }
    let (month, year) = digits.split_at(2);
    format!("{month}/{year}").chars().take(EXPIRY_MAX_LEN).collect()
}

/// Strip non-digits; cap at 4 characters.
#[must_use]
pub fn normalize_cvv(raw: &str) -> String {
    digits(raw).chars().take(CVV_MAX_LEN).collect()
}

/// Card number with group separators removed.
#[must_use]
pub fn card_digits(card_number: &str) -> String {
    card_number.chars().filter(|c| !c.is_whitespace()).collect()
}
