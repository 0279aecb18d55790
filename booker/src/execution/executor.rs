//! Submits reservations with a verified guest identity.
//!
//! The platform answers in free text, so replies are classified into three
//! values. Only an explicit success phrase counts as booked; anything that is
//! neither success nor session expiry is `AmbiguousResponse` and handled as a
//! failure.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::{debug, info, instrument, warn};

use crate::config::{PacingConfig, PlatformConfig};
use crate::error::BookingError;
use crate::execution::types::{AttemptResult, SlotOutcome};
use crate::identity::GuestIdentity;
use crate::planner::types::TimeSlot;

static SUCCESS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)bevestig|geslaagd|gelukt|success|aangemaakt").unwrap());

static EXPIRED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)sessie\s*is\s*verlopen").unwrap());

const EXCERPT_CHARS: usize = 200;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplyClass {
    Success,
    SessionExpired,
    Ambiguous,
}

/// Expiry is checked first: an expiry page that happens to contain a
/// success word must never count as booked.
pub fn classify_reply(text: &str) -> ReplyClass {
    if EXPIRED_RE.is_match(text) {
        ReplyClass::SessionExpired
    } else if SUCCESS_RE.is_match(text) {
        ReplyClass::Success
    } else {
        ReplyClass::Ambiguous
    }
}

/// Whitespace-collapsed prefix of a reply, for logs and failure records.
pub fn excerpt(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(EXCERPT_CHARS)
        .collect()
}

pub struct BookingExecutor {
    cfg: Arc<PlatformConfig>,
    pacing: PacingConfig,
}

impl BookingExecutor {
    pub fn new(cfg: Arc<PlatformConfig>, pacing: PacingConfig) -> Self {
        Self { cfg, pacing }
    }

    /// Submit one reservation. `Ok(())` only for a confirmed booking.
    ///
    /// Quota is consumed before the request goes out, whatever the reply.
    #[instrument(skip_all, fields(slot = %slot, email = %identity.email()))]
    pub async fn submit(
        &self,
        identity: &mut GuestIdentity,
        slot: &TimeSlot,
    ) -> Result<(), BookingError> {
        if !identity.try_consume() {
            return Err(BookingError::QuotaExhausted);
        }

        let form = vec![
            ("location".to_string(), self.cfg.location.clone()),
            ("type".to_string(), self.cfg.reservation_type.clone()),
            ("date".to_string(), slot.date().format("%Y-%m-%d").to_string()),
            ("start".to_string(), slot.start().format("%H:%M").to_string()),
            ("end".to_string(), slot.end().format("%H:%M").to_string()),
            ("resource".to_string(), slot.resource().to_string()),
        ];

        let reply = identity
            .session()
            .post_form(
                &self.cfg.url(&self.cfg.reservation_path),
                &self.cfg.reservation_referer(),
                &form,
            )
            .await?;

        match classify_reply(&reply.body) {
            ReplyClass::Success => {
                info!(status = reply.status, "reservation confirmed");
                Ok(())
            }
            ReplyClass::SessionExpired => {
                warn!(status = reply.status, "platform reports session expired");
                Err(BookingError::SessionExpired)
            }
            ReplyClass::Ambiguous => {
                let excerpt = excerpt(&reply.body);
                warn!(
                    status = reply.status,
                    excerpt = %excerpt,
                    "ambiguous booking reply; treating as failure"
                );
                Err(BookingError::AmbiguousResponse { excerpt })
            }
        }
    }

    /// Book `slots` in order with one identity.
    ///
    /// Once the session has expired the remaining slots are failed without
    /// being submitted; the next attempt provisions a new identity.
    pub async fn book_batch(
        &self,
        identity: &mut GuestIdentity,
        slots: &[TimeSlot],
    ) -> Vec<SlotOutcome> {
        let mut out = Vec::with_capacity(slots.len());
        let mut expired = false;

        for (i, slot) in slots.iter().enumerate() {
            if expired {
                out.push(SlotOutcome::new(
                    slot.clone(),
                    AttemptResult::BookingFailed(BookingError::SessionExpired),
                ));
                continue;
            }

            if i > 0 {
                tokio::time::sleep(self.pacing.same_identity_pause).await;
            }

            let result = match self.submit(identity, slot).await {
                Ok(()) => AttemptResult::Booked,
                Err(e) => {
                    expired = e == BookingError::SessionExpired;
                    AttemptResult::BookingFailed(e)
                }
            };

            debug!(slot = %slot, result = %result, "slot processed");
            out.push(SlotOutcome::new(slot.clone(), result));
        }

        out
    }
}
