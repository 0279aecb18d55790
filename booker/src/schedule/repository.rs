use anyhow::Result;
use async_trait::async_trait;

use crate::schedule::model::DesiredBooking;

/// Persistence seam for desired bookings.
#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    async fn load_all(&self) -> Result<Vec<DesiredBooking>>;

    /// Replace the stored record with the same `id`.
    async fn update(&self, booking: &DesiredBooking) -> Result<()>;
}
