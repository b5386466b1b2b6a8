use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Why a string cannot be used as a record id.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum IdError {
    #[error("Invalid id: ids cannot be empty")]
    Empty,
    #[error("Invalid id {0:?}: '.' and '..' are reserved")]
    Reserved(String),
    #[error("Invalid id {value:?}: contains {found:?}")]
    ForbiddenChar { value: String, found: char },
}

/// Identifier for a customer, transaction, goal or challenge.
///
/// A customer's id doubles as its directory name under `customers/`, so ids
/// handed in from the outside go through [`Id::from_string_checked`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id(String);

impl Default for Id {
    fn default() -> Self {
        Self::new()
    }
}

impl Id {
    /// Random v4 id.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// `{prefix}-{n}`, as produced for seeded demo data.
    pub fn sequential(prefix: &str, n: u64) -> Self {
        Self(format!("{prefix}-{n}"))
    }

    /// Wrap a trusted value (stored documents, generated ids).
    pub fn from_string(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn from_string_checked(value: impl Into<String>) -> Result<Self, IdError> {
        let value = value.into();
        Self::check(&value)?;
        Ok(Self(value))
    }

    fn check(value: &str) -> Result<(), IdError> {
        match value {
            "" => Err(IdError::Empty),
            "." | ".." => Err(IdError::Reserved(value.to_string())),
            _ => match value.chars().find(|c| matches!(c, '/' | '\\' | '\0')) {
                Some(found) => Err(IdError::ForbiddenChar {
                    value: value.to_string(),
                    found,
                }),
                None => Ok(()),
            },
        }
    }

    pub fn is_path_safe(value: &str) -> bool {
        Self::check(value).is_ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Id {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
