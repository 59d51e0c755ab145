//! Validated string identifiers shared by the review domain.
//!
//! Teams, users and pull requests are keyed by caller-supplied strings. Each
//! key gets its own newtype so a team name can never be passed where a user
//! id is expected.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Maximum accepted length, in characters, for any identifier.
pub const IDENTIFIER_MAX: usize = 255;

/// Validation errors returned when constructing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentifierValidationError {
    /// The value is empty or whitespace only.
    #[error("{kind} must not be empty")]
    Empty {
        /// Human-readable identifier kind.
        kind: &'static str,
    },
    /// The value carries leading or trailing whitespace.
    #[error("{kind} must not contain surrounding whitespace")]
    SurroundingWhitespace {
        /// Human-readable identifier kind.
        kind: &'static str,
    },
    /// The value is longer than [`IDENTIFIER_MAX`] characters.
    #[error("{kind} must be at most {max} characters")]
    TooLong {
        /// Human-readable identifier kind.
        kind: &'static str,
        /// Maximum length in characters.
        max: usize,
    },
}

fn validate(kind: &'static str, raw: &str) -> Result<(), IdentifierValidationError> {
    if raw.trim().is_empty() {
        return Err(IdentifierValidationError::Empty { kind });
    }
    if raw.trim() != raw {
        return Err(IdentifierValidationError::SurroundingWhitespace { kind });
    }
    if raw.chars().count() > IDENTIFIER_MAX {
        return Err(IdentifierValidationError::TooLong {
            kind,
            max: IDENTIFIER_MAX,
        });
    }
    Ok(())
}

macro_rules! string_identifier {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Validate and construct the identifier.
            pub fn new(value: impl Into<String>) -> Result<Self, IdentifierValidationError> {
                let raw = value.into();
                validate($kind, &raw)?;
                Ok(Self(raw))
            }

            /// Borrow the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdentifierValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }
    };
}

string_identifier!(
    /// Stable user identifier supplied by the source-control system.
    UserId,
    "user id"
);

string_identifier!(
    /// Human-readable user handle.
    Username,
    "username"
);

string_identifier!(
    /// Unique team name; also the team's primary key.
    TeamName,
    "team name"
);

string_identifier!(
    /// Stable pull request identifier.
    PullRequestId,
    "pull request id"
);

string_identifier!(
    /// Pull request title.
    PullRequestName,
    "pull request name"
);
