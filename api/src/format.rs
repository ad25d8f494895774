//! Payload formats an operation can declare.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Wire format of an operation's body.
///
/// Definitions that do not declare a format use [`Format::Json`].
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Format {
    /// `application/json`
    #[default]
    Json,
    /// `application/yaml`
    Yaml,
    /// `application/x-www-form-urlencoded`
    Form,
    /// `text/plain`
    Text,
    /// `multipart/form-data`
    Multipart,
}

impl Format {
    /// Returns the Content-Type for this format.
    ///
    /// Multipart bodies also need a boundary parameter, which `reqwest` adds.
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Yaml => "application/yaml",
            Self::Form => "application/x-www-form-urlencoded",
            Self::Text => "text/plain",
            Self::Multipart => "multipart/form-data",
        }
    }
}
