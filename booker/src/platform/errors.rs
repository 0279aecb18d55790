use thiserror::Error;

use crate::error::BookingError;

#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid response from platform: {0}")]
    InvalidResponse(String),
}

impl From<PlatformError> for BookingError {
    fn from(e: PlatformError) -> Self {
        BookingError::Transport(e.to_string())
    }
}
