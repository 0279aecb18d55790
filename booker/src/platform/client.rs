//! The request/response capability the booking engine needs from the platform.
//!
//! Implementations must follow redirects transparently and keep one isolated
//! cookie jar per session; the engine never looks below this seam.

use async_trait::async_trait;

use crate::platform::errors::PlatformError;

/// What the engine gets back from one request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlatformResponse {
    pub status: u16,

    /// URL after redirects were followed.
    pub final_url: String,

    pub body: String,
}

/// One cookie-bearing conversation with the platform.
#[async_trait]
pub trait PlatformSession: Send + Sync {
    async fn get(&self, url: &str, referer: &str) -> Result<PlatformResponse, PlatformError>;

    async fn post_form(
        &self,
        url: &str,
        referer: &str,
        form: &[(String, String)],
    ) -> Result<PlatformResponse, PlatformError>;
}

/// Factory for fresh sessions. Every guest identity gets its own.
pub trait ReservationPlatform: Send + Sync {
    fn open_session(&self) -> Result<Box<dyn PlatformSession>, PlatformError>;
}
