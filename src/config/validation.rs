//! Configuration validation.
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function: ReqlogConfig → Result<(), Vec<ValidationError>>

use axum::http::{HeaderName, Uri};
use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::ReqlogConfig;
use crate::logger::DetailLevel;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a socket address")]
    BindAddress(String),

    #[error("logging.level {0:?} is not one of none|minimal|normal|verbose|debug")]
    Level(String),

    #[error("logging.output must not be empty")]
    Output,

    #[error("logging.redacted_headers contains invalid header name {0:?}")]
    HeaderName(String),

    #[error("control.base_path {0:?} must start with '/' and must not end with '/'")]
    BasePath(String),

    #[error("upstream.url {0:?} must be an absolute http URL")]
    UpstreamUrl(String),
}

pub fn validate_config(config: &ReqlogConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if config.logging.level.parse::<DetailLevel>().is_err() {
        errors.push(ValidationError::Level(config.logging.level.clone()));
    }

    if config.logging.output.trim().is_empty() {
        errors.push(ValidationError::Output);
    }

    for name in &config.logging.redacted_headers {
        if HeaderName::from_bytes(name.as_bytes()).is_err() {
            errors.push(ValidationError::HeaderName(name.clone()));
        }
    }

    let base = &config.control.base_path;
    if config.control.enabled && (!base.starts_with('/') || base.len() < 2 || base.ends_with('/')) {
        errors.push(ValidationError::BasePath(base.clone()));
    }

    if let Some(url) = &config.upstream.url {
        let valid = url
            .parse::<Uri>()
            .map(|uri| uri.scheme_str() == Some("http") && uri.authority().is_some())
            .unwrap_or(false);
        if !valid {
            errors.push(ValidationError::UpstreamUrl(url.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(validate_config(&ReqlogConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = ReqlogConfig::default();
        config.logging.level = "chatty".into();
        config.logging.redacted_headers.push("bad header".into());
        config.control.base_path = "logging/".into();
        config.upstream.url = Some("/relative".into());

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::Level("chatty".into()),
                ValidationError::HeaderName("bad header".into()),
                ValidationError::BasePath("logging/".into()),
                ValidationError::UpstreamUrl("/relative".into()),
            ]
        );
    }

    #[test]
    fn test_base_path_ignored_when_control_disabled() {
        let mut config = ReqlogConfig::default();
        config.control.enabled = false;
        config.control.base_path = String::new();
        assert!(validate_config(&config).is_ok());
    }
}
