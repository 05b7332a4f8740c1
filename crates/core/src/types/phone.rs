//! Mobile phone number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// The input string is empty.
    #[error("phone number cannot be empty")]
    Empty,
    /// The number does not start with `+964` or `0`.
    #[error("phone number must start with +964 or 0")]
    MissingPrefix,
    /// The subscriber part is not exactly ten digits.
    #[error("phone number must have exactly {expected} digits after the prefix")]
    WrongLength {
        /// Required number of subscriber digits.
        expected: usize,
    },
    /// The subscriber part contains something other than ASCII digits.
    #[error("phone number may only contain digits after the prefix")]
    NonDigit,
}

/// A mobile phone number accepted for delivery contact.
///
/// ## Constraints
///
/// - Prefix: `+964` (international) or `0` (national)
/// - Followed by exactly 10 ASCII digits
/// - Surrounding whitespace is trimmed; nothing else is normalized, the
///   number is sent to the store as entered
///
/// ## Examples
///
/// ```
/// use souq_core::Phone;
///
/// assert!(Phone::parse("07701234567").is_ok());
/// assert!(Phone::parse("+9647701234567").is_ok());
///
/// assert!(Phone::parse("").is_err());              // empty
/// assert!(Phone::parse("7701234567").is_err());    // no prefix
/// assert!(Phone::parse("0770123456").is_err());    // too short
/// assert!(Phone::parse("0770-123-4567").is_err()); // separators
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Phone(String);

impl Phone {
    /// Number of digits after the prefix.
    pub const SUBSCRIBER_DIGITS: usize = 10;

    /// Parse a `Phone` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input:
    /// - Is empty
    /// - Does not start with `+964` or `0`
    /// - Is not followed by exactly ten digits
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PhoneError::Empty);
        }

        let subscriber = s
            .strip_prefix("+964")
            .or_else(|| s.strip_prefix('0'))
            .ok_or(PhoneError::MissingPrefix)?;

        if !subscriber.chars().all(|c| c.is_ascii_digit()) {
            return Err(PhoneError::NonDigit);
        }

        if subscriber.len() != Self::SUBSCRIBER_DIGITS {
            return Err(PhoneError::WrongLength {
                expected: Self::SUBSCRIBER_DIGITS,
            });
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl core::str::FromStr for Phone {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Phone {
    type Error = PhoneError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Phone> for String {
    fn from(phone: Phone) -> Self {
        phone.0
    }
}

impl AsRef<str> for Phone {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
