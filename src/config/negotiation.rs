//! Compiled version negotiation settings.
//!
//! [`Negotiation`] is the configuration every dispatcher reads: which header
//! carries the version, how to pull the token out of it, and which status to
//! answer with when no version fits. It is built once with
//! [`Negotiation::configure`] and shared behind an `Arc`; there is no global
//! instance, so reconfiguring means building a new dispatcher.

use std::num::IntErrorKind;
use std::sync::LazyLock;

use axum::http::{header, HeaderMap, HeaderName, StatusCode};
use regex::Regex;

use crate::config::schema::NegotiationOptions;
use crate::config::validation::{compile_grab, parse_header, parse_status};

/// Header inspected when none is configured.
pub const DEFAULT_HEADER: &str = "accept";

/// Pattern applied when none is configured: a vendor media type carrying `version=<digits>`.
pub const DEFAULT_GRAB: &str = r"vnd.mycompany.com\+json; version=(\d+)(,|$)";

/// Status returned when a route exists but no registered version satisfies the request.
pub const DEFAULT_ERROR: StatusCode = StatusCode::NOT_ACCEPTABLE;

static DEFAULT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DEFAULT_GRAB).expect("default version pattern compiles"));

/// Header name, extraction pattern and fallback status used to negotiate versions.
#[derive(Debug, Clone)]
pub struct Negotiation {
    header: HeaderName,
    grab: Regex,
    error: StatusCode,
}

impl Negotiation {
    /// Compile options into a negotiation, substituting defaults for anything
    /// missing or unusable. Never fails; rejected values are logged.
    pub fn configure(options: &NegotiationOptions) -> Self {
        let header = match options.header.as_deref().map(parse_header) {
            Some(Ok(header)) => header,
            Some(Err(e)) => {
                tracing::warn!(error = %e, default = DEFAULT_HEADER, "Falling back to default version header");
                header::ACCEPT
            }
            None => header::ACCEPT,
        };

        let grab = match options.grab.as_deref().map(compile_grab) {
            Some(Ok(grab)) => grab,
            Some(Err(e)) => {
                tracing::warn!(error = %e, default = DEFAULT_GRAB, "Falling back to default version pattern");
                DEFAULT_PATTERN.clone()
            }
            None => DEFAULT_PATTERN.clone(),
        };

        let error = match options.error.map(parse_status) {
            Some(Ok(status)) => status,
            Some(Err(e)) => {
                tracing::warn!(error = %e, default = %DEFAULT_ERROR, "Falling back to default error status");
                DEFAULT_ERROR
            }
            None => DEFAULT_ERROR,
        };

        Self { header, grab, error }
    }

    pub fn header(&self) -> &HeaderName {
        &self.header
    }

    pub fn grab(&self) -> &Regex {
        &self.grab
    }

    pub fn error(&self) -> StatusCode {
        self.error
    }

    /// Extract the requested version from the request headers.
    ///
    /// Repeated headers are joined with `", "` before matching. Returns `None`
    /// when the header is absent, not valid text, the pattern does not match,
    /// or the captured text is not an unsigned integer. Values too large for
    /// `u64` saturate so they still outrank every registered version.
    pub fn version_token(&self, headers: &HeaderMap) -> Option<u64> {
        let values: Vec<&str> = headers
            .get_all(&self.header)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect();
        if values.is_empty() {
            return None;
        }
        let value = values.join(", ");

        let captures = self.grab.captures(&value)?;
        let token = captures.get(1)?.as_str();
        match token.parse::<u64>() {
            Ok(version) => Some(version),
            Err(e) if *e.kind() == IntErrorKind::PosOverflow => Some(u64::MAX),
            Err(_) => None,
        }
    }
}

impl Default for Negotiation {
    fn default() -> Self {
        Self::configure(&NegotiationOptions::default())
    }
}
