pub mod client;
pub mod errors;
pub mod http;

pub use client::{PlatformResponse, PlatformSession, ReservationPlatform};
pub use errors::PlatformError;
pub use http::HttpPlatform;

#[cfg(test)]
pub(crate) mod testing;
