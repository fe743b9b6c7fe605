//! API base URL type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::{Error, InvalidInputError};

/// A validated backend base URL.
///
/// The URL must be absolute, use `http` or `https`, and have a host. A
/// trailing slash is stripped so endpoint paths can be appended directly.
///
/// # Example
///
/// ```
/// use docapi_core::ApiUrl;
///
/// let api = ApiUrl::new("https://stage.document.no:3790/").unwrap();
/// assert_eq!(api.endpoint("/api/v1/login"),
///            "https://stage.document.no:3790/api/v1/login");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ApiUrl {
    url: Url,
    base: String,
}

impl ApiUrl {
    /// Create a new API URL from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not valid or doesn't meet requirements.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();
        let url = Url::parse(s).map_err(|e| InvalidInputError::ApiUrl {
            value: s.to_string(),
            reason: e.to_string(),
        })?;

        Self::validate(&url, s)?;

        // The URL crate always renders a root path as "/", so keep a
        // slash-free copy for joining.
        let base = url.as_str().trim_end_matches('/').to_string();

        Ok(Self { url, base })
    }

    /// Returns the absolute URL for a command path.
    ///
    /// This is plain concatenation: `command` is expected to start with `/`.
    pub fn endpoint(&self, command: &str) -> String {
        format!("{}{}", self.base, command)
    }

    /// Returns the base URL without a trailing slash.
    pub fn as_str(&self) -> &str {
        &self.base
    }

    /// Returns the parsed URL.
    pub fn as_url(&self) -> &Url {
        &self.url
    }

    /// Returns the host string.
    pub fn host(&self) -> Option<&str> {
        self.url.host_str()
    }

    fn validate(url: &Url, original: &str) -> Result<(), Error> {
        if url.cannot_be_a_base() {
            return Err(InvalidInputError::ApiUrl {
                value: original.to_string(),
                reason: "must be an absolute URL".to_string(),
            }
            .into());
        }

        if !matches!(url.scheme(), "http" | "https") {
            return Err(InvalidInputError::ApiUrl {
                value: original.to_string(),
                reason: "must use http or https".to_string(),
            }
            .into());
        }

        if url.host_str().is_none() {
            return Err(InvalidInputError::ApiUrl {
                value: original.to_string(),
                reason: "must have a host".to_string(),
            }
            .into());
        }

        if url.query().is_some() || url.fragment().is_some() {
            return Err(InvalidInputError::ApiUrl {
                value: original.to_string(),
                reason: "must not carry a query or fragment".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

impl fmt::Display for ApiUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base)
    }
}

impl FromStr for ApiUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for ApiUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.base)
    }
}

impl<'de> Deserialize<'de> for ApiUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ApiUrl::new(&s).map_err(serde::de::Error::custom)
    }
}

impl AsRef<str> for ApiUrl {
    fn as_ref(&self) -> &str {
        &self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_https_url() {
        let api = ApiUrl::new("https://stage.document.no:3790").unwrap();
        assert_eq!(api.host(), Some("stage.document.no"));
        assert_eq!(api.as_str(), "https://stage.document.no:3790");
    }

    #[test]
    fn valid_plain_http() {
        let api = ApiUrl::new("http://127.0.0.1:8080").unwrap();
        assert_eq!(api.endpoint("/api/v1/whoami"), "http://127.0.0.1:8080/api/v1/whoami");
    }

    #[test]
    fn strips_trailing_slash() {
        let api = ApiUrl::new("https://api.example.com/").unwrap();
        assert_eq!(api.as_str(), "https://api.example.com");
        assert_eq!(
            api.endpoint("/api/v1/login"),
            "https://api.example.com/api/v1/login"
        );
    }

    #[test]
    fn keeps_path_prefix() {
        let api = ApiUrl::new("https://example.com/backend/").unwrap();
        assert_eq!(
            api.endpoint("/api/v1/refresh"),
            "https://example.com/backend/api/v1/refresh"
        );
    }

    #[test]
    fn invalid_scheme() {
        assert!(ApiUrl::new("ftp://example.com").is_err());
    }

    #[test]
    fn invalid_relative_url() {
        assert!(ApiUrl::new("/api/v1/login").is_err());
    }

    #[test]
    fn rejects_query() {
        assert!(ApiUrl::new("https://example.com/?x=1").is_err());
    }

    #[test]
    fn deserializes_with_validation() {
        let api: ApiUrl = serde_json::from_str("\"https://example.com/\"").unwrap();
        assert_eq!(api.to_string(), "https://example.com");
        assert!(serde_json::from_str::<ApiUrl>("\"mailto:x@y\"").is_err());
    }
}
