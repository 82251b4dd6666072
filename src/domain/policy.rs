//! Header conflict policies
//!
//! A domain's default headers are merged into each outgoing request. When the
//! request already carries a header of the same name, the header's
//! [`ConflictPolicy`] decides what happens. Presence is always judged against
//! the request's original headers, never against headers added earlier in the
//! same merge, so the order in which defaults are applied does not matter.

use crate::error::{Error, Result};
use http::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a default header interacts with a header already on the request
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// Keep the request's own header; add ours only when it is absent
    #[default]
    Ignore,
    /// Set ours, discarding every existing value
    Replace,
    /// Append ours next to any existing values
    Add,
    /// Fail the request when the header is already present
    Abort,
}

impl ConflictPolicy {
    /// Merge `name: value` into `target` according to this policy
    pub fn apply(
        self,
        original: &HeaderMap,
        target: &mut HeaderMap,
        name: &HeaderName,
        value: &HeaderValue,
    ) -> Result<()> {
        match self {
            Self::Ignore => {
                if !carries(original, name) {
                    target.append(name.clone(), value.clone());
                }
            }
            Self::Replace => {
                target.insert(name.clone(), value.clone());
            }
            Self::Add => {
                target.append(name.clone(), value.clone());
            }
            Self::Abort => {
                if carries(original, name) {
                    return Err(Error::HeaderConflict {
                        key: name.to_string(),
                        value: String::from_utf8_lossy(value.as_bytes()).into_owned(),
                    });
                }
                target.insert(name.clone(), value.clone());
            }
        }
        Ok(())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ignore => "ignore",
            Self::Replace => "replace",
            Self::Add => "add",
            Self::Abort => "abort",
        }
    }
}

impl fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An empty value does not count as carrying the header
fn carries(headers: &HeaderMap, name: &HeaderName) -> bool {
    headers.get_all(name).iter().any(|value| !value.is_empty())
}

/// A default header configured on a domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultHeader {
    pub name: HeaderName,
    pub value: HeaderValue,
    pub policy: ConflictPolicy,
}

impl DefaultHeader {
    /// Validate `key` and `value` as HTTP header tokens
    pub fn new(key: &str, value: &str, policy: ConflictPolicy) -> Result<Self> {
        let name = HeaderName::try_from(key).map_err(|e| Error::invalid_header(key, e))?;
        let value = HeaderValue::try_from(value).map_err(|e| Error::invalid_header(key, e))?;
        Ok(Self {
            name,
            value,
            policy,
        })
    }

    pub fn apply(&self, original: &HeaderMap, target: &mut HeaderMap) -> Result<()> {
        self.policy.apply(original, target, &self.name, &self.value)
    }
}
