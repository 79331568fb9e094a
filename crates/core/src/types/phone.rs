//! Mobile number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`MobileNumber`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MobileNumberError {
    /// The number does not have exactly ten digits.
    #[error("mobile number must be exactly {expected} digits (got {actual} characters)")]
    WrongLength {
        /// Required number of digits.
        expected: usize,
        /// Length of the rejected input.
        actual: usize,
    },
    /// The number contains something other than ASCII digits.
    #[error("mobile number may only contain digits")]
    NonDigit,
}

/// A ten-digit mobile number, e.g. `"1234567890"`.
///
/// No separators, country prefix or whitespace are accepted.
///
/// ```
/// use threadline_core::MobileNumber;
///
/// assert!(MobileNumber::parse("1234567890").is_ok());
/// assert!(MobileNumber::parse("12345").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MobileNumber(String);

impl MobileNumber {
    /// Required number of digits.
    pub const DIGITS: usize = 10;

    /// Parse a `MobileNumber` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error unless the input is exactly ten ASCII digits.
    pub fn parse(s: &str) -> Result<Self, MobileNumberError> {
        if !s.chars().all(|c| c.is_ascii_digit()) {
            return Err(MobileNumberError::NonDigit);
        }
        if s.len() != Self::DIGITS {
            return Err(MobileNumberError::WrongLength {
                expected: Self::DIGITS,
                actual: s.len(),
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

impl fmt::Display for MobileNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for MobileNumber {
    type Error = MobileNumberError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<MobileNumber> for String {
    fn from(number: MobileNumber) -> Self {
        number.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ten_digits_accepted() {
        assert!(MobileNumber::parse("1234567890").is_ok());
        assert!(MobileNumber::parse("0000000000").is_ok());
    }

    #[test]
    fn test_wrong_length_rejected() {
        assert_eq!(
            MobileNumber::parse("12345"),
            Err(MobileNumberError::WrongLength {
                expected: 10,
                actual: 5
            })
        );
        assert!(MobileNumber::parse("12345678901").is_err());
        assert!(MobileNumber::parse("").is_err());
    }

    #[test]
    fn test_non_digits_rejected() {
        assert_eq!(
            MobileNumber::parse("123-456-78"),
            Err(MobileNumberError::NonDigit)
        );
        assert_eq!(
            MobileNumber::parse("123456789 "),
            Err(MobileNumberError::NonDigit)
        );
        // Non-ASCII digits do not count.
        assert_eq!(
            MobileNumber::parse("١٢٣٤٥٦٧٨٩٠"),
            Err(MobileNumberError::NonDigit)
        );
    }
}
