//! In-process stand-in for the reservation platform.
//!
//! Requests are routed by URL; all sessions share one state so tests can
//! inspect what the engine did across identities and passes.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use booker::config::PlatformConfig;
use booker::platform::{PlatformError, PlatformResponse, PlatformSession, ReservationPlatform};
use parking_lot::Mutex;
use serde_json::json;

pub const BASE: &str = "https://p.test";

pub const SIGNUP_PAGE: &str = r#"
    <form action="/engine?service=recordmanager:form:guest&amp;cmd=asksave">
      <input type="hidden" name="csrf-key" value="c5rf">
      <input type="hidden" name="form-id" value="F-77">
      <input type="email" name="form:EMAIL">
    </form>
"#;

pub const CONFIRMED: &str = "<p>Uw reservering is aangemaakt.</p>";
pub const EXPIRED: &str = "<p>Uw sessie is verlopen.</p>";

#[derive(Default)]
pub struct MockState {
    /// (resource, date, start, end) as the feed reports them.
    pub reservations: Vec<(String, String, String, String)>,

    /// Replies to reservation submissions, in order. Empty means confirm.
    pub booking_replies: VecDeque<&'static str>,

    pub feed_down: bool,
    pub signup_without_tokens: bool,
    /// The next N signup pages come back without tokens.
    pub broken_signups: usize,

    pub sessions_opened: usize,
    pub accounts_verified: usize,
    pub feed_calls: usize,
    /// (email of the session, date, start, end)
    pub submissions: Vec<(String, String, String, String)>,
}

#[derive(Clone, Default)]
pub struct MockPlatform {
    pub state: Arc<Mutex<MockState>>,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reserve(&self, resource: &str, date: &str, start: &str, end: &str) {
        self.state
            .lock()
            .reservations
            .push((resource.into(), date.into(), start.into(), end.into()));
    }

    pub fn script_replies(&self, replies: &[&'static str]) {
        self.state.lock().booking_replies.extend(replies.iter().copied());
    }

    pub fn submitted_windows(&self) -> Vec<(String, String)> {
        self.state
            .lock()
            .submissions
            .iter()
            .map(|(_, _, s, e)| (s.clone(), e.clone()))
            .collect()
    }
}

pub fn platform_config() -> PlatformConfig {
    PlatformConfig {
        base_url: BASE.into(),
        signup_template: "form%3AFIRST=Guest&newsletter=no".into(),
        ..PlatformConfig::default()
    }
}

impl ReservationPlatform for MockPlatform {
    fn open_session(&self) -> Result<Box<dyn PlatformSession>, PlatformError> {
        self.state.lock().sessions_opened += 1;
        Ok(Box::new(MockSession {
            state: self.state.clone(),
            email: Mutex::new(String::new()),
        }))
    }
}

struct MockSession {
    state: Arc<Mutex<MockState>>,
    email: Mutex<String>,
}

fn reply(final_url: &str, body: impl Into<String>) -> PlatformResponse {
    PlatformResponse {
        status: 200,
        final_url: final_url.into(),
        body: body.into(),
    }
}

fn field<'a>(form: &'a [(String, String)], name: &str) -> &'a str {
    form.iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
        .unwrap_or_default()
}

#[async_trait]
impl PlatformSession for MockSession {
    async fn get(&self, url: &str, _referer: &str) -> Result<PlatformResponse, PlatformError> {
        let mut st = self.state.lock();
        if url.contains("werkplekreserveren-aanmelden") {
            let broken = st.signup_without_tokens || st.broken_signups > 0;
            st.broken_signups = st.broken_signups.saturating_sub(1);
            let body = if broken {
                "<p>Formulier tijdelijk niet beschikbaar</p>"
            } else {
                SIGNUP_PAGE
            };
            return Ok(reply(url, body));
        }
        if url.contains("werkplekkenVerificatie.vm") {
            st.accounts_verified += 1;
            return Ok(reply(url, "<p>Account geverifieerd</p>"));
        }
        Ok(reply(url, ""))
    }

    async fn post_form(
        &self,
        url: &str,
        _referer: &str,
        form: &[(String, String)],
    ) -> Result<PlatformResponse, PlatformError> {
        let mut st = self.state.lock();

        if url.contains("reservations.vm") {
            st.feed_calls += 1;
            if st.feed_down {
                return Err(PlatformError::InvalidResponse("feed unavailable".into()));
            }
            let reservations: Vec<_> = st
                .reservations
                .iter()
                .map(|(r, d, s, e)| json!({ "resource": r, "start": format!("{d}T{s}:00"), "end": format!("{d}T{e}:00") }))
                .collect();
            return Ok(reply(url, json!({ "reservations": reservations, "blocks": [] }).to_string()));
        }

        if url.contains("engine?service=recordmanager") {
            *self.email.lock() = field(form, "form:EMAIL").to_string();
            let link = format!(
                "{BASE}/reserveringen/werkplekkenVerificatie.vm?t={}",
                st.sessions_opened
            );
            return Ok(reply(&link, ""));
        }

        if url.contains("makereservation.vm") {
            let (date, start, end) = (
                field(form, "date").to_string(),
                field(form, "start").to_string(),
                field(form, "end").to_string(),
            );
            let resource = field(form, "resource").to_string();
            st.submissions
                .push((self.email.lock().clone(), date.clone(), start.clone(), end.clone()));

            let body = st.booking_replies.pop_front().unwrap_or(CONFIRMED);
            if body == CONFIRMED {
                st.reservations.push((resource, date, start, end));
            }
            return Ok(reply(url, body));
        }

        Err(PlatformError::InvalidResponse(format!("unrouted POST {url}")))
    }
}
