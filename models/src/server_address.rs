use crate::error::model_error::ModelError;
use crate::ErrorLocation;

use std::fmt::{Display, Formatter, Result as FormatResult};
use std::panic::Location;
use std::str::FromStr;

use serde::Serialize;
use url::Url;

const SCHEME_SEPARATOR: &str = "://";
const BARE_ADDRESS_SCHEME: &str = "http://";
const SUPPORTED_SCHEMES: [&str; 2] = ["http", "https"];

/// Address of the robotic-arm server the tracking script forwards data to.
///
/// Accepts `host`, `host:port`, or an `http(s)://` URL. The trimmed text is kept
/// verbatim because it is handed to the script unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ServerAddress(String);

impl ServerAddress {
    #[track_caller]
    pub fn parse(raw: &str) -> Result<Self, ModelError> {
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(invalid("Server address cannot be empty"));
        }

        if trimmed.chars().any(char::is_whitespace) {
            return Err(invalid(format!(
                "Server address cannot contain whitespace: '{trimmed}'"
            )));
        }

        if trimmed.starts_with('-') {
            return Err(invalid(format!(
                "Server address cannot start with '-': '{trimmed}'"
            )));
        }

        if trimmed.ends_with(':') {
            return Err(invalid(format!(
                "Server address is missing a port after ':': '{trimmed}'"
            )));
        }

        if trimmed.contains(SCHEME_SEPARATOR) {
            let url = parse_url(trimmed, trimmed)?;

            if !SUPPORTED_SCHEMES.contains(&url.scheme()) {
                return Err(invalid(format!(
                    "Unsupported scheme '{}' in server address (expected http or https)",
                    url.scheme()
                )));
            }

            if url.host_str().is_none_or(str::is_empty) {
                return Err(invalid(format!("Server address has no host: '{trimmed}'")));
            }
        } else {
            let url = parse_url(&format!("{BARE_ADDRESS_SCHEME}{trimmed}"), trimmed)?;

            let has_extra_parts = url.path() != "/"
                || url.query().is_some()
                || url.fragment().is_some()
                || !url.username().is_empty()
                || url.password().is_some();

            if has_extra_parts || url.host_str().is_none_or(str::is_empty) {
                return Err(invalid(format!(
                    "Server address must be 'host', 'host:port' or an http(s) URL: '{trimmed}'"
                )));
            }
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[track_caller]
fn parse_url(candidate: &str, original: &str) -> Result<Url, ModelError> {
    Url::parse(candidate).map_err(|e| ModelError::Validation {
        message: format!("Invalid server address '{original}': {e}"),
        location: ErrorLocation::from(Location::caller()),
    })
}

#[track_caller]
fn invalid(message: impl Into<String>) -> ModelError {
    ModelError::Validation {
        message: message.into(),
        location: ErrorLocation::from(Location::caller()),
    }
}

impl FromStr for ServerAddress {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for ServerAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for ServerAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> FormatResult {
        f.write_str(&self.0)
    }
}
