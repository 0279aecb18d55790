use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use chrono::TimeDelta;
use chrono_tz::Tz;

use crate::scheduler::policy::SchedulerConfig;

/// Fixed identifiers and endpoints of the reservation platform.
///
/// Threaded explicitly through every component constructor; nothing reads
/// the environment after `AppConfig::from_env` returns.
#[derive(Clone, Debug)]
pub struct PlatformConfig {
    /// Scheme + host of the platform, without trailing slash.
    pub base_url: String,

    /// Guest signup form (first page of the identity protocol).
    pub signup_path: String,

    /// Generic confirmation page that may carry the verification link.
    pub thank_you_path: String,

    /// Path fragment identifying the verification link in redirects and markup.
    pub verification_marker: String,

    /// Availability feed (existing reservations + blackout blocks) for one date.
    pub availability_path: String,

    /// Reservation submission endpoint.
    pub reservation_path: String,

    /// Referer the platform expects on availability and reservation calls.
    pub reservation_referer_path: String,

    /// Location code sent with every reservation.
    pub location: String,

    /// Reservation type code; also used to match typed blackout blocks.
    pub reservation_type: String,

    /// Address the per-identity aliases are derived from (`local+token@domain`).
    pub base_email: String,

    /// Form-urlencoded base body for the signup submission. Tokens and the
    /// e-mail field are overridden per attempt.
    pub signup_template: String,

    /// E-mail input name used when the signup markup does not expose one.
    pub fallback_email_field: String,

    /// Bookings one guest identity may place before it must be replaced.
    pub identity_quota: usize,

    /// Longest sub-range the platform accepts in one reservation.
    pub max_slot_length: TimeDelta,

    /// Per-request timeout.
    pub request_timeout: Duration,

    pub user_agent: String,
}

impl PlatformConfig {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Resolve a link found in markup against the platform base.
    pub fn absolutize(&self, link: &str) -> String {
        if link.starts_with("http://") || link.starts_with("https://") {
            link.to_string()
        } else if link.starts_with('/') {
            self.url(link)
        } else {
            format!("{}/{}", self.base_url, link)
        }
    }

    pub fn signup_url(&self) -> String {
        self.url(&self.signup_path)
    }

    pub fn reservation_referer(&self) -> String {
        self.url(&self.reservation_referer_path)
    }
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            base_url: "https://bibliotheekutrecht.crmplatform.nl".into(),
            signup_path: "/werkplekreserveren-aanmelden?reserveren=true".into(),
            thank_you_path: "/formulieren/bedankpaginaBiebWerkt.vm".into(),
            verification_marker: "/reserveringen/werkplekkenVerificatie.vm".into(),
            availability_path: "/reserveringen/page/js/reservations.vm".into(),
            reservation_path: "/reserveringen/page/makereservation.vm".into(),
            reservation_referer_path: "/reserveringen/page/reservering.vm?".into(),
            location: "41".into(),
            reservation_type: "36".into(),
            base_email: "guest@example.com".into(),
            signup_template: String::new(),
            fallback_email_field: "form:D1930".into(),
            identity_quota: 2,
            max_slot_length: TimeDelta::hours(3),
            request_timeout: Duration::from_secs(20),
            user_agent: "guest-reservation/1.3 (+rust)".into(),
        }
    }
}

/// Deliberate waits between platform calls.
#[derive(Clone, Debug)]
pub struct PacingConfig {
    /// Pause between consecutive bookings on the same identity.
    pub same_identity_pause: Duration,

    /// Pause before provisioning each identity after the first one.
    pub identity_switch_pause: Duration,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            same_identity_pause: Duration::from_secs(1),
            identity_switch_pause: Duration::from_secs(2),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub platform: PlatformConfig,
    pub pacing: PacingConfig,
    pub scheduler: SchedulerConfig,

    /// Zone in which "today" and the release window are evaluated.
    pub timezone: Tz,

    /// JSON schedule file holding the desired bookings.
    pub schedule_file: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = PlatformConfig::default();

        let platform = PlatformConfig {
            base_url: env_or("BOOKER_BASE_URL", &defaults.base_url)
                .trim_end_matches('/')
                .to_string(),
            location: env_or("BOOKER_LOCATION", &defaults.location),
            reservation_type: env_or("BOOKER_TYPE", &defaults.reservation_type),
            base_email: env_or("BOOKER_BASE_EMAIL", &defaults.base_email),
            signup_template: env_or("BOOKER_SIGNUP_TEMPLATE", &defaults.signup_template),
            ..defaults
        };

        let tz_name = env_or("BOOKER_TIMEZONE", "Europe/Amsterdam");
        let timezone: Tz = tz_name
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid BOOKER_TIMEZONE '{tz_name}': {e}"))?;

        let cfg = Self {
            platform,
            pacing: PacingConfig::default(),
            scheduler: SchedulerConfig::default(),
            timezone,
            schedule_file: PathBuf::from(env_or("BOOKER_SCHEDULE_FILE", "booking-config.json")),
        };

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let (local, domain) = self
            .platform
            .base_email
            .split_once('@')
            .context("BOOKER_BASE_EMAIL must contain '@'")?;
        if local.is_empty() || domain.is_empty() {
            anyhow::bail!("BOOKER_BASE_EMAIL must have a local part and a domain");
        }
        if self.platform.identity_quota == 0 {
            anyhow::bail!("identity quota must be at least 1");
        }
        if self.platform.max_slot_length <= TimeDelta::zero() {
            anyhow::bail!("maximum slot length must be positive");
        }
        Ok(())
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
