use anyhow::{Result, bail};
use async_trait::async_trait;
use parking_lot::Mutex;

use crate::schedule::model::DesiredBooking;
use crate::schedule::repository::ScheduleRepository;

/// Schedule kept in process memory. Counts writes so callers can assert on
/// write-back behaviour.
#[derive(Default)]
pub struct InMemoryScheduleStore {
    bookings: Mutex<Vec<DesiredBooking>>,
    writes: Mutex<usize>,
}

impl InMemoryScheduleStore {
    pub fn new(bookings: Vec<DesiredBooking>) -> Self {
        Self {
            bookings: Mutex::new(bookings),
            writes: Mutex::new(0),
        }
    }

    pub fn snapshot(&self) -> Vec<DesiredBooking> {
        self.bookings.lock().clone()
    }

    pub fn get(&self, id: &str) -> Option<DesiredBooking> {
        self.bookings.lock().iter().find(|b| b.id == id).cloned()
    }

    pub fn write_count(&self) -> usize {
        *self.writes.lock()
    }
}

#[async_trait]
impl ScheduleRepository for InMemoryScheduleStore {
    async fn load_all(&self) -> Result<Vec<DesiredBooking>> {
        Ok(self.snapshot())
    }

    async fn update(&self, booking: &DesiredBooking) -> Result<()> {
        let mut guard = self.bookings.lock();
        let Some(slot) = guard.iter_mut().find(|b| b.id == booking.id) else {
            bail!("no booking with id {}", booking.id);
        };
        *slot = booking.clone();
        *self.writes.lock() += 1;
        Ok(())
    }
}
