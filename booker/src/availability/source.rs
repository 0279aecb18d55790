use chrono::NaiveDate;
use tracing::{debug, instrument};

use crate::availability::snapshot::AvailabilitySnapshot;
use crate::config::PlatformConfig;
use crate::error::BookingError;
use crate::platform::PlatformSession;

/// Fetch the reservations/blackout feed for `date`.
///
/// Any transport or decoding problem is `AvailabilityUnknown`: a slot is
/// never assumed free because the feed could not be read.
#[instrument(skip(session, cfg), fields(%date), level = "debug")]
pub async fn fetch_snapshot(
    session: &dyn PlatformSession,
    cfg: &PlatformConfig,
    date: NaiveDate,
) -> Result<AvailabilitySnapshot, BookingError> {
    let url = format!(
        "{}?location={}&type={}&date={}",
        cfg.url(&cfg.availability_path),
        cfg.location,
        cfg.reservation_type,
        date.format("%Y-%m-%d")
    );

    let resp = session
        .post_form(&url, &cfg.reservation_referer(), &[])
        .await
        .map_err(|e| BookingError::AvailabilityUnknown(e.to_string()))?;

    let snapshot: AvailabilitySnapshot = serde_json::from_str(&resp.body)
        .map_err(|e| BookingError::AvailabilityUnknown(format!("malformed feed: {e}")))?;

    debug!(
        reservations = snapshot.reservations.len(),
        blocks = snapshot.blocks.as_ref().map(Vec::len),
        "availability snapshot fetched"
    );

    Ok(snapshot)
}
