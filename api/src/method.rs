//! HTTP method types for operation definitions.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// HTTP methods an operation can be sent with.
///
/// ## Examples
///
/// ```rust
/// use scoped_api::RestMethod;
///
/// let parsed: RestMethod = "POST".parse().unwrap();
/// assert_eq!(parsed, RestMethod::Post);
/// assert_eq!(RestMethod::parse_loose("patch"), Some(RestMethod::Patch));
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum RestMethod {
    /// HTTP GET - Retrieve a resource.
    Get,
    /// HTTP POST - Create a resource or trigger an action.
    Post,
    /// HTTP PUT - Replace a resource entirely.
    Put,
    /// HTTP PATCH - Partially update a resource.
    Patch,
    /// HTTP DELETE - Remove a resource.
    Delete,
    /// HTTP HEAD - Retrieve headers only.
    Head,
    /// HTTP OPTIONS - Query supported methods.
    Options,
    /// HTTP TRACE - Echo the request for debugging.
    Trace,
}

impl RestMethod {
    /// Parses a method name regardless of its case.
    ///
    /// Definitions may spell methods as `get`, `Get` or `GET`.
    pub fn parse_loose(value: &str) -> Option<Self> {
        Self::from_str(&value.trim().to_ascii_uppercase()).ok()
    }

    /// Converts to the equivalent `reqwest::Method`.
    pub fn to_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Patch => reqwest::Method::PATCH,
            Self::Delete => reqwest::Method::DELETE,
            Self::Head => reqwest::Method::HEAD,
            Self::Options => reqwest::Method::OPTIONS,
            Self::Trace => reqwest::Method::TRACE,
        }
    }
}

impl From<RestMethod> for reqwest::Method {
    fn from(method: RestMethod) -> Self {
        method.to_reqwest()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_display() {
        assert_eq!(RestMethod::Get.to_string(), "GET");
        assert_eq!(RestMethod::Delete.to_string(), "DELETE");
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        assert_eq!("GET".parse::<RestMethod>().unwrap(), RestMethod::Get);
        assert!("get".parse::<RestMethod>().is_err());
    }

    #[test]
    fn test_parse_loose() {
        assert_eq!(RestMethod::parse_loose("get"), Some(RestMethod::Get));
        assert_eq!(RestMethod::parse_loose(" Put "), Some(RestMethod::Put));
        assert_eq!(RestMethod::parse_loose("fetch"), None);
        assert_eq!(RestMethod::parse_loose(""), None);
    }

    #[test]
    fn test_serde_uppercase() {
        assert_eq!(serde_json::to_string(&RestMethod::Post).unwrap(), "\"POST\"");
        let parsed: RestMethod = serde_json::from_str("\"OPTIONS\"").unwrap();
        assert_eq!(parsed, RestMethod::Options);
    }

    #[test]
    fn test_enum_iteration() {
        assert_eq!(RestMethod::iter().count(), 8);
    }

    #[test]
    fn test_to_reqwest() {
        assert_eq!(RestMethod::Get.to_reqwest(), reqwest::Method::GET);
        assert_eq!(reqwest::Method::from(RestMethod::Patch), reqwest::Method::PATCH);
    }
}
