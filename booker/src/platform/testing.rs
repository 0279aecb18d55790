//! Scripted session used by unit tests across the crate.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::platform::{PlatformError, PlatformResponse, PlatformSession};

pub(crate) type RequestLog = Arc<Mutex<Vec<(String, Vec<(String, String)>)>>>;

/// Replies are served in order; every request (URL + form) is recorded.
#[derive(Default)]
pub(crate) struct ScriptedSession {
    replies: Mutex<VecDeque<Result<PlatformResponse, String>>>,
    pub requests: RequestLog,
}

impl ScriptedSession {
    pub fn with(replies: Vec<PlatformResponse>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(Ok).collect()),
            ..Default::default()
        }
    }

    /// Queue a transport failure (e.g. a timeout) as the next reply.
    pub fn then_fail(self, reason: &str) -> Self {
        self.replies.lock().push_back(Err(reason.to_string()));
        self
    }

    fn next(
        &self,
        url: &str,
        form: &[(String, String)],
    ) -> Result<PlatformResponse, PlatformError> {
        self.requests.lock().push((url.to_string(), form.to_vec()));
        match self.replies.lock().pop_front() {
            Some(Ok(resp)) => Ok(resp),
            Some(Err(reason)) => Err(PlatformError::InvalidResponse(reason)),
            None => Err(PlatformError::InvalidResponse(format!(
                "unscripted request {url}"
            ))),
        }
    }
}

pub(crate) fn page(body: &str) -> PlatformResponse {
    PlatformResponse {
        status: 200,
        final_url: "https://p.test/somewhere".into(),
        body: body.into(),
    }
}

#[async_trait]
impl PlatformSession for ScriptedSession {
    async fn get(&self, url: &str, _: &str) -> Result<PlatformResponse, PlatformError> {
        self.next(url, &[])
    }

    async fn post_form(
        &self,
        url: &str,
        _: &str,
        form: &[(String, String)],
    ) -> Result<PlatformResponse, PlatformError> {
        self.next(url, form)
    }
}
