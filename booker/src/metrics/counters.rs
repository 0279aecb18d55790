use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::info;

/// Pass-level counters for operational visibility.
#[derive(Clone, Default)]
pub struct Counters {
    pub bookings_due: Arc<AtomicU64>,
    pub bookings_completed: Arc<AtomicU64>,
    pub bookings_partial: Arc<AtomicU64>,
    pub bookings_unbooked: Arc<AtomicU64>,

    pub attempts: Arc<AtomicU64>,
    pub slots_booked: Arc<AtomicU64>,
    pub identities_provisioned: Arc<AtomicU64>,

    // failure reasons
    pub fail_availability: Arc<AtomicU64>,
    pub fail_provisioning: Arc<AtomicU64>,
    pub fail_booking: Arc<AtomicU64>,
}

impl Counters {
    pub fn bump(c: &AtomicU64) {
        c.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add(c: &AtomicU64, n: u64) {
        c.fetch_add(n, Ordering::Relaxed);
    }

    pub fn log_summary(&self) {
        let get = |c: &Arc<AtomicU64>| c.load(Ordering::Relaxed);
        info!(
            target: "metrics",
            due = get(&self.bookings_due),
            completed = get(&self.bookings_completed),
            partial = get(&self.bookings_partial),
            unbooked = get(&self.bookings_unbooked),
            attempts = get(&self.attempts),
            slots_booked = get(&self.slots_booked),
            identities = get(&self.identities_provisioned),
            fail_availability = get(&self.fail_availability),
            fail_provisioning = get(&self.fail_provisioning),
            fail_booking = get(&self.fail_booking),
            "pass counters"
        );
    }
}
