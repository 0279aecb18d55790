use chrono::NaiveTime;
use thiserror::Error;

/// Everything that can go wrong while trying to secure one desired booking.
///
/// Variants carry owned strings only so results can be cloned into reports
/// and persisted as the booking's last failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
    #[error("invalid time range {start}-{end}")]
    InvalidRange { start: NaiveTime, end: NaiveTime },

    #[error("availability unknown: {0}")]
    AvailabilityUnknown(String),

    #[error("signup page is missing the {0}")]
    TokenExtractionFailed(String),

    #[error("verification link not found (checked redirect, signup reply and thank-you page)")]
    VerificationLinkNotFound,

    #[error("platform session expired")]
    SessionExpired,

    #[error("ambiguous booking reply: {excerpt}")]
    AmbiguousResponse { excerpt: String },

    #[error("guest identity has no reservations left")]
    QuotaExhausted,

    #[error("platform request failed: {0}")]
    Transport(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl BookingError {
    /// Pipeline stage the error belongs to, as recorded in `last_failure`.
    pub fn stage(&self) -> &'static str {
        match self {
            BookingError::InvalidRange { .. } => "chunking",
            BookingError::AvailabilityUnknown(_) => "availability",
            BookingError::TokenExtractionFailed(_)
            | BookingError::VerificationLinkNotFound
            | BookingError::InvalidConfig(_) => "provisioning",
            BookingError::SessionExpired
            | BookingError::AmbiguousResponse { .. }
            | BookingError::QuotaExhausted
            | BookingError::Transport(_) => "booking",
        }
    }

    /// Errors after which the same booking must not be retried in this pass.
    pub fn is_fatal_for_booking(&self) -> bool {
        matches!(self, BookingError::InvalidRange { .. })
    }
}
