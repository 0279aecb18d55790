use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue, ORIGIN, REFERER};
use tracing::{debug, instrument};

use crate::config::PlatformConfig;
use crate::platform::client::{PlatformResponse, PlatformSession, ReservationPlatform};
use crate::platform::errors::PlatformError;

/// `reqwest`-backed platform access: a new client (and cookie jar) per session.
#[derive(Clone)]
pub struct HttpPlatform {
    cfg: Arc<PlatformConfig>,
}

impl HttpPlatform {
    pub fn new(cfg: Arc<PlatformConfig>) -> Self {
        Self { cfg }
    }
}

impl ReservationPlatform for HttpPlatform {
    fn open_session(&self) -> Result<Box<dyn PlatformSession>, PlatformError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "X-Requested-With",
            HeaderValue::from_static("XMLHttpRequest"),
        );
        headers.insert(
            ORIGIN,
            HeaderValue::from_str(&self.cfg.base_url)
                .map_err(|e| PlatformError::InvalidResponse(format!("bad origin: {e}")))?,
        );

        let http = Client::builder()
            .cookie_store(true)
            .timeout(self.cfg.request_timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(self.cfg.user_agent.clone())
            .default_headers(headers)
            .build()?;

        Ok(Box::new(HttpSession { http }))
    }
}

struct HttpSession {
    http: Client,
}

impl HttpSession {
    async fn read(resp: reqwest::Response) -> Result<PlatformResponse, PlatformError> {
        let resp = resp.error_for_status()?;
        let status = resp.status().as_u16();
        let final_url = resp.url().to_string();
        let body = resp.text().await?;

        debug!(status, final_url = %final_url, bytes = body.len(), "platform response");

        Ok(PlatformResponse {
            status,
            final_url,
            body,
        })
    }
}

#[async_trait]
impl PlatformSession for HttpSession {
    #[instrument(skip(self, referer), level = "debug")]
    async fn get(&self, url: &str, referer: &str) -> Result<PlatformResponse, PlatformError> {
        let resp = self.http.get(url).header(REFERER, referer).send().await?;
        Self::read(resp).await
    }

    #[instrument(skip(self, referer, form), fields(fields = form.len()), level = "debug")]
    async fn post_form(
        &self,
        url: &str,
        referer: &str,
        form: &[(String, String)],
    ) -> Result<PlatformResponse, PlatformError> {
        let resp = self
            .http
            .post(url)
            .header(REFERER, referer)
            .form(form)
            .send()
            .await?;
        Self::read(resp).await
    }
}
