use crate::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

const MAX_DOMAIN_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

/// Normalized domain name used as the lookup and cache key.
///
/// Normalization trims surrounding whitespace, strips a single trailing root
/// label (`example.com.` → `example.com`) and lowercases the name, so two
/// captures of the same name in different case collapse to one lookup.
/// Backed by `Arc<str>` so clones across engine → task → cache are cheap.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Domain(Arc<str>);

impl Domain {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim();
        let name = trimmed.strip_suffix('.').unwrap_or(trimmed);

        if name.is_empty() {
            return Err(DomainError::InvalidDomainName(
                "domain name cannot be empty".to_string(),
            ));
        }
        if name.len() > MAX_DOMAIN_LEN {
            return Err(DomainError::InvalidDomainName(format!(
                "'{}' exceeds {} characters",
                name, MAX_DOMAIN_LEN
            )));
        }

        for label in name.split('.') {
            if label.is_empty() {
                return Err(DomainError::InvalidDomainName(format!(
                    "'{}' contains an empty label",
                    name
                )));
            }
            if label.len() > MAX_LABEL_LEN {
                return Err(DomainError::InvalidDomainName(format!(
                    "label '{}' exceeds {} characters",
                    label, MAX_LABEL_LEN
                )));
            }
            if label.chars().any(|c| c.is_whitespace() || c.is_control()) {
                return Err(DomainError::InvalidDomainName(format!(
                    "'{}' contains whitespace or control characters",
                    name
                )));
            }
        }

        Ok(Self(Arc::from(name.to_lowercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Domain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Domain {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Domain {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Domain> for String {
    fn from(domain: Domain) -> Self {
        domain.0.to_string()
    }
}
