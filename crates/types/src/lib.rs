//! Validated primitive types shared across the blood bank workspace.
//!
//! These types guarantee their invariants at construction time so the core
//! crate never has to re-check them at use sites:
//! - [`NonEmptyText`]: free text that is guaranteed non-blank (reasons,
//!   notes, staff names).
//! - [`UnitNumber`]: the human-readable label printed on a blood bag.

use uuid::Uuid;

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("text cannot be empty")]
    Empty,
}

/// Errors that can occur when parsing a unit number.
#[derive(Debug, thiserror::Error)]
pub enum UnitNumberError {
    /// The label did not match the `BU-XXXXXXXX` layout.
    #[error("invalid unit number '{0}': expected BU- followed by 8 hex characters")]
    Malformed(String),
}

/// A string type that guarantees non-empty content.
///
/// Wraps a `String` and ensures it contains at least one non-whitespace
/// character. Input is trimmed of leading and trailing whitespace during
/// construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// The input is trimmed of leading and trailing whitespace. If the
    /// trimmed result is empty, an error is returned.
    ///
    /// # Errors
    ///
    /// Returns `TextError::Empty` if the trimmed input is empty.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper and returns the inner `String`.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// The label printed on a blood bag: `BU-` followed by 8 uppercase hex
/// characters.
///
/// Unit numbers are derived from the unit's UUID so they stay unique without
/// a central counter, while remaining short enough to read over the phone.
/// The canonical form is always uppercase; parsing accepts lowercase input
/// and normalises it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UnitNumber(String);

impl UnitNumber {
    /// Derives the unit number for a freshly allocated unit id.
    pub fn from_uuid(id: &Uuid) -> Self {
        let hex = id.simple().to_string();
        Self(format!("BU-{}", hex[..8].to_uppercase()))
    }

    /// Parses a unit number label, normalising the hex part to uppercase.
    ///
    /// # Errors
    ///
    /// Returns `UnitNumberError::Malformed` if the label is not `BU-`
    /// followed by exactly 8 hex characters.
    pub fn parse(raw: &str) -> Result<Self, UnitNumberError> {
        let rest = raw
            .strip_prefix("BU-")
            .ok_or_else(|| UnitNumberError::Malformed(raw.to_string()))?;

        if rest.len() != 8 || !rest.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(UnitNumberError::Malformed(raw.to_string()));
        }

        Ok(Self(format!("BU-{}", rest.to_uppercase())))
    }

    /// Returns the canonical label.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UnitNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl serde::Serialize for UnitNumber {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for UnitNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        UnitNumber::parse(&s).map_err(serde::de::Error::custom)
    }
}
