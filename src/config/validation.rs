//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that the negotiation header, pattern and status code are usable
//! - Validate listener and metrics addresses
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Field parsers are shared with [`Negotiation::configure`](crate::config::Negotiation::configure),
//!   which falls back to defaults where this module reports an error

use std::net::SocketAddr;

use axum::http::{HeaderName, StatusCode};
use regex::Regex;
use thiserror::Error;

use crate::config::schema::{AppConfig, NegotiationOptions};

/// A single configuration problem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("negotiation.header: {0:?} is not a valid HTTP header name")]
    InvalidHeader(String),

    #[error("negotiation.grab: invalid pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("negotiation.grab: pattern {0:?} has no capture group for the version")]
    MissingCaptureGroup(String),

    #[error("negotiation.error: {0} is not a valid HTTP status code")]
    InvalidStatus(u16),

    #[error("server.bind_address: {0:?} is not a socket address")]
    InvalidBindAddress(String),

    #[error("server.request_timeout_secs must be greater than zero")]
    ZeroTimeout,

    #[error("observability.metrics_address: {0:?} is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Parse a header name. The result is always lower-case.
pub fn parse_header(raw: &str) -> Result<HeaderName, ValidationError> {
    let lowered = raw.trim().to_ascii_lowercase();
    if lowered.is_empty() {
        return Err(ValidationError::InvalidHeader(raw.to_string()));
    }
    HeaderName::from_bytes(lowered.as_bytes())
        .map_err(|_| ValidationError::InvalidHeader(raw.to_string()))
}

/// Compile an extraction pattern. Group 1 must exist; further groups are ignored.
pub fn compile_grab(raw: &str) -> Result<Regex, ValidationError> {
    let regex = Regex::new(raw).map_err(|e| ValidationError::InvalidPattern {
        pattern: raw.to_string(),
        reason: e.to_string(),
    })?;
    // captures_len counts the implicit whole-match group
    if regex.captures_len() < 2 {
        return Err(ValidationError::MissingCaptureGroup(raw.to_string()));
    }
    Ok(regex)
}

pub fn parse_status(code: u16) -> Result<StatusCode, ValidationError> {
    StatusCode::from_u16(code).map_err(|_| ValidationError::InvalidStatus(code))
}

/// Validate the negotiation options, collecting every problem.
pub fn validate_negotiation(options: &NegotiationOptions) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Some(header) = &options.header {
        if let Err(e) = parse_header(header) {
            errors.push(e);
        }
    }
    if let Some(grab) = &options.grab {
        if let Err(e) = compile_grab(grab) {
            errors.push(e);
        }
    }
    if let Some(code) = options.error {
        if let Err(e) = parse_status(code) {
            errors.push(e);
        }
    }

    errors
}

/// Validate a whole configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = validate_negotiation(&config.negotiation);

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.server.bind_address.clone(),
        ));
    }
    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
