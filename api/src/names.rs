//! Validated names for scopes, operations, options and validators.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::NameError;

/// Lowercase latin letters, digits and underscores; starts with a letter,
/// ends with a letter or digit.
static NAME_FORMAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z](?:[a-z0-9_]*[a-z0-9])?$").expect("name format regex is valid")
});

/// Names taken by the DSL and by container navigation.
pub const RESERVED: &[&str] = &[
    "base_url",
    "basic_auth",
    "body",
    "call",
    "default",
    "format",
    "headers",
    "http_method",
    "key_auth",
    "logger",
    "member",
    "middleware",
    "new",
    "operation",
    "operations",
    "options",
    "path",
    "query",
    "request",
    "response",
    "schema",
    "scope",
    "scopes",
    "security",
    "settings",
    "token_auth",
];

/// A validated DSL name.
///
/// ## Examples
///
/// ```rust
/// use scoped_api::Name;
///
/// assert!(Name::new("user_id").is_ok());
/// assert!(Name::new("UserId").is_err());
/// assert!(Name::new("settings").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name(String);

impl Name {
    /// Validates and wraps a name.
    pub fn new<S: Into<String>>(name: S) -> Result<Self, NameError> {
        let name = name.into();
        validate(&name)?;
        Ok(Self(name))
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Checks a name against the identifier format and the reserved words.
pub fn validate(name: &str) -> Result<(), NameError> {
    if !NAME_FORMAT.is_match(name) {
        return Err(NameError::InvalidFormat {
            name: name.to_string(),
        });
    }
    if RESERVED.contains(&name) {
        return Err(NameError::Reserved {
            name: name.to_string(),
        });
    }
    Ok(())
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Name {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<Name> for String {
    fn from(name: Name) -> Self {
        name.0
    }
}

impl TryFrom<&str> for Name {
    type Error = NameError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<String> for Name {
    type Error = NameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
