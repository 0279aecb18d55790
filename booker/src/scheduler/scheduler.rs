//! One scheduling pass over the schedule store.
//!
//! Responsibilities:
//! - Decide which enabled bookings are due and whether the release window
//!   is critical right now.
//! - Drive the bounded attempt loop for each due booking, sequentially.
//! - Roll slot outcomes up into completed / partially booked / unbooked and
//!   write each record back exactly once.
//!
//! Non-responsibilities:
//! - Talking to the platform (the attempt runner does this).
//! - Waking up on a timer: every invocation is one independent pass.

use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use common::logger::{TraceId, annotate_span, pass_span};
use tokio::time::Instant;
use tracing::{Instrument, debug, info, instrument, warn};

use crate::execution::attempt::AttemptRunner;
use crate::metrics::counters::Counters;
use crate::schedule::model::DesiredBooking;
use crate::schedule::repository::ScheduleRepository;
use crate::scheduler::policy::{AttemptPolicy, SchedulerConfig};
use crate::scheduler::window::DueState;
use crate::time::Clock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    Completed,
    PartiallyBooked { secured: usize, total: usize },
    Unbooked { stage: String, reason: String },
    DryRun,
}

#[derive(Debug, Clone)]
pub struct BookingReport {
    pub id: String,
    pub due: DueState,
    pub attempts: u32,
    pub outcome: PassOutcome,
}

#[derive(Debug, Clone)]
pub struct PassReport {
    pub today: NaiveDate,
    pub bookings: Vec<BookingReport>,
}

impl PassReport {
    /// Due bookings that are not fully booked after this pass.
    pub fn unbooked_count(&self) -> usize {
        self.bookings
            .iter()
            .filter(|b| {
                matches!(
                    b.outcome,
                    PassOutcome::Unbooked { .. } | PassOutcome::PartiallyBooked { .. }
                )
            })
            .count()
    }

    pub fn outcome_of(&self, id: &str) -> Option<&PassOutcome> {
        self.bookings.iter().find(|b| b.id == id).map(|b| &b.outcome)
    }
}

pub struct RetryScheduler<S: ScheduleRepository> {
    store: Arc<S>,
    runner: AttemptRunner,
    clock: Arc<dyn Clock>,
    cfg: SchedulerConfig,

    /// Observability counters (does not affect behavior).
    counters: Counters,

    /// Plan and log only: no platform calls, no store writes.
    dry_run: bool,
}

impl<S: ScheduleRepository> RetryScheduler<S> {
    pub fn new(
        store: Arc<S>,
        runner: AttemptRunner,
        clock: Arc<dyn Clock>,
        cfg: SchedulerConfig,
        counters: Counters,
        dry_run: bool,
    ) -> Self {
        Self {
            store,
            runner,
            clock,
            cfg,
            counters,
            dry_run,
        }
    }

    /// Run one pass. `today` overrides the calendar date (the wall clock is
    /// still used for the release window).
    pub async fn run_pass(&self, today: Option<NaiveDate>) -> anyhow::Result<PassReport> {
        let today = today.unwrap_or_else(|| self.clock.now().date_naive());
        let span = pass_span(&TraceId::default(), &today.to_string(), self.dry_run);
        self.pass(today).instrument(span).await
    }

    async fn pass(&self, today: NaiveDate) -> anyhow::Result<PassReport> {
        let bookings = self
            .store
            .load_all()
            .await
            .context("loading schedule")?;

        let mut report = PassReport {
            today,
            bookings: Vec::new(),
        };

        for mut booking in bookings.into_iter().filter(DesiredBooking::is_active) {
            booking.reconcile();
            let due = self
                .cfg
                .window
                .classify(today, booking.target_date, &self.clock.now());

            let Some(policy) = self.cfg.policy_for(due).cloned() else {
                debug!(booking_id = %booking.id, target = %booking.target_date, "not due");
                continue;
            };

            annotate_span(&booking.id, None);
            Counters::bump(&self.counters.bookings_due);

            if self.dry_run {
                self.log_plan(&booking, due);
                report.bookings.push(BookingReport {
                    id: booking.id.clone(),
                    due,
                    attempts: 0,
                    outcome: PassOutcome::DryRun,
                });
                continue;
            }

            let (attempts, outcome) = self.process(&mut booking, due, &policy).await;

            self.store
                .update(&booking)
                .await
                .with_context(|| format!("writing back booking {}", booking.id))?;

            report.bookings.push(BookingReport {
                id: booking.id.clone(),
                due,
                attempts,
                outcome,
            });
        }

        info!(
            due = report.bookings.len(),
            unbooked = report.unbooked_count(),
            "pass finished"
        );
        self.counters.log_summary();

        Ok(report)
    }

    /// Bounded attempt loop for one booking. Mutates only the booking's
    /// state fields.
    #[instrument(
        skip_all,
        target = "scheduler",
        fields(booking_id = %booking.id, due = ?due)
    )]
    async fn process(
        &self,
        booking: &mut DesiredBooking,
        due: DueState,
        policy: &AttemptPolicy,
    ) -> (u32, PassOutcome) {
        let started = Instant::now();
        let mut attempts = 0u32;
        let mut total_slots = 0usize;
        let mut last_failure: Option<(String, String)> = None;

        loop {
            attempts += 1;
            Counters::bump(&self.counters.attempts);

            match self.runner.run(booking).await {
                Ok(report) => {
                    total_slots = report.outcomes.len();
                    let newly: Vec<_> = report.newly_booked().collect();
                    Counters::add(&self.counters.slots_booked, newly.len() as u64);
                    Counters::add(
                        &self.counters.identities_provisioned,
                        report.identities_used as u64,
                    );
                    booking.secure(newly);

                    if report.is_complete() {
                        info!(attempts, slots = total_slots, "booking complete");
                        booking.mark_completed(self.now_utc());
                        Counters::bump(&self.counters.bookings_completed);
                        return (attempts, PassOutcome::Completed);
                    }

                    last_failure = report.failure_summary();
                    if let Some((stage, _)) = &last_failure {
                        self.count_failure(stage);
                    }
                    info!(
                        attempt = attempts,
                        booked = report.booked_count(),
                        total = total_slots,
                        "attempt incomplete"
                    );
                }
                Err(e) => {
                    warn!(attempt = attempts, stage = e.stage(), error = %e, "attempt failed");
                    self.count_failure(e.stage());
                    last_failure = Some((e.stage().to_string(), e.to_string()));
                    if e.is_fatal_for_booking() {
                        break;
                    }
                }
            }

            if attempts >= policy.max_attempts {
                debug!("attempt budget spent");
                break;
            }

            tokio::time::sleep(policy.spacing).await;

            if let Some(max) = policy.max_elapsed {
                if started.elapsed() >= max {
                    debug!(elapsed_s = started.elapsed().as_secs(), "time budget spent");
                    break;
                }
            }

            if policy.stop_outside_window && !self.cfg.window.is_critical(&self.clock.now()) {
                info!(attempts, "release window closed; stopping");
                break;
            }
        }

        let (stage, reason) =
            last_failure.unwrap_or_else(|| ("booking".to_string(), "no attempt succeeded".into()));
        booking.mark_failed(self.now_utc(), &stage, reason.clone());

        if booking.secured_slots.is_empty() {
            Counters::bump(&self.counters.bookings_unbooked);
            (attempts, PassOutcome::Unbooked { stage, reason })
        } else {
            Counters::bump(&self.counters.bookings_partial);
            (
                attempts,
                PassOutcome::PartiallyBooked {
                    secured: booking.secured_slots.len(),
                    total: total_slots.max(booking.secured_slots.len()),
                },
            )
        }
    }

    fn now_utc(&self) -> DateTime<Utc> {
        self.clock.now().with_timezone(&Utc)
    }

    fn count_failure(&self, stage: &str) {
        match stage {
            "availability" => Counters::bump(&self.counters.fail_availability),
            "provisioning" => Counters::bump(&self.counters.fail_provisioning),
            _ => Counters::bump(&self.counters.fail_booking),
        }
    }

    fn log_plan(&self, booking: &DesiredBooking, due: DueState) {
        match self.runner.preview(booking) {
            Ok(batches) => {
                for (i, batch) in batches.iter().enumerate() {
                    let slots: Vec<String> = batch.iter().map(|s| s.window().to_string()).collect();
                    info!(
                        due = ?due,
                        identity = i + 1,
                        slots = %slots.join(", "),
                        "dry run: would book"
                    );
                }
            }
            Err(e) => warn!(error = %e, "dry run: booking cannot be planned"),
        }
    }
}
