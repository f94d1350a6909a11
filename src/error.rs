use reqwest::StatusCode;
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// Which acquisition phase an outcome belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Http,
    Browser,
}

impl Display for Phase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Http => write!(f, "http"),
            Phase::Browser => write!(f, "browser"),
        }
    }
}

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("http error {status}")]
    Http { status: StatusCode },

    #[error("non-html content-type: {0}")]
    NonHtml(String),

    #[error("response body exceeds size cap")]
    OversizeHtml,

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("{phase} phase deadline elapsed")]
    Timeout { phase: Phase },

    #[error("blocked by {provider} challenge on {domain}")]
    Blocked { provider: String, domain: String },

    #[error("all alternate urls failed or were challenged")]
    AllAlternatesFailed,

    #[error("no recognizable article content")]
    ExtractionFailed,

    #[error("browser failure: {0}")]
    Browser(String),
}

impl From<url::ParseError> for ScrapeError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

impl ScrapeError {
    /// Whether a primary-fetch failure qualifies for the alternate-URL race.
    /// Only client-blocked statuses, server errors, and detected challenges
    /// do; everything else short-circuits.
    pub fn triggers_alternates(&self) -> bool {
        match self {
            Self::Http { status } => {
                matches!(status.as_u16(), 403 | 406 | 451) || status.is_server_error()
            }
            Self::Blocked { .. } => true,
            _ => false,
        }
    }

    /// Whether a phase-A failure qualifies for the browser fallback.
    pub fn triggers_browser(&self) -> bool {
        match self {
            Self::Http { status } => {
                matches!(status.as_u16(), 403 | 406 | 451) || status.is_server_error()
            }
            Self::NonHtml(_) => true,
            Self::Transport(_) => true,
            Self::Blocked { .. } => true,
            Self::AllAlternatesFailed => true,
            // The phase clock ran out but the request deadline may still
            // leave room for a render.
            Self::Timeout { phase: Phase::Http } => true,
            _ => false,
        }
    }

    /// HTTP status the gateway maps this error to.
    pub fn gateway_status(&self) -> StatusCode {
        match self {
            Self::InvalidUrl(_) => StatusCode::BAD_REQUEST,
            Self::Blocked { .. } => StatusCode::UNAVAILABLE_FOR_LEGAL_REASONS,
            Self::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Map a reqwest failure onto our kinds. Anything without an HTTP status
    /// (DNS, connect, reset, redirect loop, read timeout) is a transport
    /// failure.
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            Self::Http { status }
        } else {
            Self::Transport(err.to_string())
        }
    }
}
