use thiserror::Error;

/// Domain rewrite error types
///
/// Configuration errors (`NotInitialized`, `AlreadyInitialized`, `AlreadyBound`,
/// `EmptyBaseUrl`, `InvalidDomainName`, `InvalidHeader`, and `DomainNotFound` on
/// an administrative call) are programmer errors. The remaining variants fail a
/// single request's rewrite and leave the registry untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Domain registry is not initialized; bind or initialize it with a main base URL first")]
    NotInitialized,

    #[error("Domain registry is already initialized")]
    AlreadyInitialized,

    #[error("Domain registry is already bound to {bound}, cannot rebind to {requested}")]
    AlreadyBound { bound: String, requested: String },

    #[error("Base URL must not be empty")]
    EmptyBaseUrl,

    #[error("Invalid domain name: {0:?}")]
    InvalidDomainName(String),

    #[error("Domain not found: {0}; call set_domain before using it")]
    DomainNotFound(String),

    #[error("Invalid header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("Only one Domain-Name header is allowed per request, found {count}")]
    AmbiguousDomainTag { count: usize },

    #[error("Header conflict: {key}={value} already present on the request and policy is abort")]
    HeaderConflict { key: String, value: String },

    #[error("Invalid rewritten URL: {0}")]
    InvalidUrl(String),
}

impl Error {
    pub fn invalid_header(name: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidHeader {
            name: name.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_converts_to_message() {
        let err: Error = config::ConfigError::Message("missing main.base_url".to_string()).into();
        assert_eq!(err, Error::Config("missing main.base_url".to_string()));
    }

    #[test]
    fn test_header_conflict_names_key_and_value() {
        let message = Error::HeaderConflict {
            key: "abort_key".to_string(),
            value: "v1".to_string(),
        }
        .to_string();
        assert!(message.contains("abort_key=v1"));
    }
}
