//! One pass of the pipeline over one desired booking:
//! chunk → availability → quota batches → provision + book per batch.
//!
//! Slot-level failures are recorded in the report and never abort sibling
//! slots or later batches. Only `InvalidRange` and an unreadable
//! availability feed end the attempt early, as an `Err`.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use common::logger::warn_if_slow;
use tracing::{debug, info, instrument, warn};

use crate::availability::{Availability, evaluate_slot, source::fetch_snapshot};
use crate::config::{PacingConfig, PlatformConfig};
use crate::error::BookingError;
use crate::execution::executor::BookingExecutor;
use crate::execution::types::{AttemptReport, AttemptResult, SlotOutcome};
use crate::identity::IdentityProvisioner;
use crate::planner::chunker::chunk_range;
use crate::planner::quota::partition_by_quota;
use crate::planner::types::{SlotWindow, TimeSlot};
use crate::platform::ReservationPlatform;
use crate::schedule::model::DesiredBooking;

const SLOW_PROVISIONING: Duration = Duration::from_secs(15);

pub struct AttemptRunner {
    platform: Arc<dyn ReservationPlatform>,
    provisioner: IdentityProvisioner,
    executor: BookingExecutor,
    cfg: Arc<PlatformConfig>,
    pacing: PacingConfig,
}

impl AttemptRunner {
    pub fn new(
        platform: Arc<dyn ReservationPlatform>,
        cfg: Arc<PlatformConfig>,
        pacing: PacingConfig,
    ) -> Result<Self, BookingError> {
        Ok(Self {
            platform,
            provisioner: IdentityProvisioner::from_config(cfg.clone())?,
            executor: BookingExecutor::new(cfg.clone(), pacing.clone()),
            cfg,
            pacing,
        })
    }

    /// Split the booking into platform-sized slots.
    pub fn plan(&self, booking: &DesiredBooking) -> Result<Vec<TimeSlot>, BookingError> {
        chunk_range(
            booking.target_date,
            booking.start,
            booking.end,
            &booking.resource,
            self.cfg.max_slot_length,
        )
    }

    /// Slot batches an attempt would try if every slot were available.
    pub fn preview(&self, booking: &DesiredBooking) -> Result<Vec<Vec<TimeSlot>>, BookingError> {
        let slots = self.plan(booking)?;
        Ok(partition_by_quota(&slots, self.cfg.identity_quota))
    }

    #[instrument(
        skip(self, booking),
        target = "attempt",
        fields(booking_id = %booking.id, date = %booking.target_date)
    )]
    pub async fn run(&self, booking: &DesiredBooking) -> Result<AttemptReport, BookingError> {
        let slots = self.plan(booking)?;
        let secured: HashSet<SlotWindow> = booking.secured_slots.iter().copied().collect();

        let snapshot = {
            let session = self
                .platform
                .open_session()
                .map_err(|e| BookingError::AvailabilityUnknown(e.to_string()))?;
            fetch_snapshot(session.as_ref(), &self.cfg, booking.target_date).await?
        };

        let mut report = AttemptReport::default();
        let mut to_book = Vec::new();

        for slot in slots {
            if secured.contains(&slot.window()) {
                // Our own earlier booking shows up as a reservation.
                report.outcomes.push(SlotOutcome {
                    slot,
                    result: AttemptResult::Booked,
                    previously_secured: true,
                });
                continue;
            }

            match evaluate_slot(&slot, &snapshot, &self.cfg.reservation_type) {
                Availability::Available => to_book.push(slot),
                Availability::Occupied => {
                    debug!(slot = %slot, "slot occupied");
                    report
                        .outcomes
                        .push(SlotOutcome::new(slot, AttemptResult::Occupied));
                }
                Availability::Blocked { reason } => {
                    debug!(slot = %slot, reason = %reason, "slot blocked");
                    report
                        .outcomes
                        .push(SlotOutcome::new(slot, AttemptResult::Blocked { reason }));
                }
            }
        }

        let batches = partition_by_quota(&to_book, self.cfg.identity_quota);
        info!(
            available = to_book.len(),
            already_secured = secured.len(),
            batches = batches.len(),
            "attempt planned"
        );

        for (i, batch) in batches.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.pacing.identity_switch_pause).await;
            }
            let outcomes = self.serve_batch(batch).await;
            report.identities_used += 1;
            report.outcomes.extend(outcomes);
        }

        report
            .outcomes
            .sort_by(|a, b| a.slot.starts_at().cmp(&b.slot.starts_at()));

        Ok(report)
    }

    /// Provision one identity and spend it on `batch`.
    async fn serve_batch(&self, batch: &[TimeSlot]) -> Vec<SlotOutcome> {
        let provisioned = warn_if_slow("provision_identity", SLOW_PROVISIONING, async {
            let session = self.platform.open_session()?;
            self.provisioner.provision(session).await
        })
        .await;

        match provisioned {
            Ok(mut identity) => self.executor.book_batch(&mut identity, batch).await,
            Err(e) => {
                warn!(error = %e, slots = batch.len(), "guest identity could not be provisioned");
                batch
                    .iter()
                    .map(|slot| {
                        SlotOutcome::new(
                            slot.clone(),
                            AttemptResult::AccountCreationFailed(e.clone()),
                        )
                    })
                    .collect()
            }
        }
    }
}
