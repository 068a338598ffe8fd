//! Sign-in email address.
//!
//! Both the login form and `dvs-cli` parse the operator's address before
//! anything is sent. A string that can never be an address is refused
//! locally, so it never reaches `loginSuperAdmin` and never shows up in the
//! API's failed-login records. Everything else, including whether the
//! account exists, is the API's call.

use core::fmt;

/// Why a sign-in address was refused.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    #[error("email cannot be empty")]
    Empty,
    #[error("email must be at most {max} characters")]
    TooLong { max: usize },
    /// Zero or several `@`.
    #[error("email must contain exactly one @")]
    AtSymbol,
    #[error("email cannot contain spaces")]
    Whitespace,
    /// Nothing before or after the `@`.
    #[error("email needs a name before the @ and a domain after it")]
    MissingPart,
}

/// A trimmed address that passed the local checks.
///
/// ```
/// use dvs_core::Email;
///
/// assert_eq!(Email::parse(" owner@school.in ").unwrap().as_str(), "owner@school.in");
/// assert!(Email::parse("owner@school@in").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Email(String);

impl Email {
    /// RFC 5321 path limit.
    pub const MAX_LENGTH: usize = 254;

    /// Trim and check `input`.
    ///
    /// # Errors
    ///
    /// Returns the first [`EmailError`] the input trips.
    pub fn parse(input: &str) -> Result<Self, EmailError> {
        let address = input.trim();
        if address.is_empty() {
            return Err(EmailError::Empty);
        }
        if address.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if address.chars().any(char::is_whitespace) {
            return Err(EmailError::Whitespace);
        }

        let mut parts = address.split('@');
        let (Some(name), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(EmailError::AtSymbol);
        };
        if name.is_empty() || domain.is_empty() {
            return Err(EmailError::MissingPart);
        }

        Ok(Self(address.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
