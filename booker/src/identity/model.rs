use std::fmt;

use chrono::{DateTime, Utc};

use crate::platform::PlatformSession;

/// A verified, disposable guest session.
///
/// Lives for exactly one batch of slots and is dropped afterwards; it is
/// never reused across desired bookings.
pub struct GuestIdentity {
    session: Box<dyn PlatformSession>,
    email: String,
    created_at: DateTime<Utc>,
    remaining_quota: usize,
}

impl GuestIdentity {
    pub fn new(session: Box<dyn PlatformSession>, email: String, quota: usize) -> Self {
        Self {
            session,
            email,
            created_at: Utc::now(),
            remaining_quota: quota,
        }
    }

    pub fn session(&self) -> &dyn PlatformSession {
        self.session.as_ref()
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn remaining_quota(&self) -> usize {
        self.remaining_quota
    }

    /// Take one unit of quota for a submission. Usage counts whether or not
    /// the platform accepts the booking.
    pub fn try_consume(&mut self) -> bool {
        if self.remaining_quota == 0 {
            return false;
        }
        self.remaining_quota -= 1;
        true
    }
}

impl fmt::Debug for GuestIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuestIdentity")
            .field("email", &self.email)
            .field("created_at", &self.created_at)
            .field("remaining_quota", &self.remaining_quota)
            .finish()
    }
}
