//! Creates and verifies one disposable guest identity.
//!
//! Protocol (strictly ordered, one fresh session per identity):
//!   1. GET the signup page and scrape its page-scoped tokens.
//!   2. Fill the configured form template with those tokens and a unique alias.
//!   3. POST the form and locate the verification link (redirect → reply body →
//!      thank-you page).
//!   4. GET the verification link, which turns the session into a verified guest.
//!
//! Errors stay local to the batch being served; nothing here touches
//! booking state.

use std::sync::Arc;

use rand::Rng;
use tracing::{debug, info, instrument, warn};

use crate::config::PlatformConfig;
use crate::error::BookingError;
use crate::identity::model::GuestIdentity;
use crate::identity::tokens::{MarkupTokenExtractor, PageTokenExtractor};
use crate::platform::{PlatformResponse, PlatformSession};

const ALIAS_TOKEN_LEN: usize = 6;
const ALIAS_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

pub struct IdentityProvisioner<E: PageTokenExtractor = MarkupTokenExtractor> {
    cfg: Arc<PlatformConfig>,
    extractor: E,
}

impl IdentityProvisioner<MarkupTokenExtractor> {
    pub fn from_config(cfg: Arc<PlatformConfig>) -> Result<Self, BookingError> {
        let extractor = MarkupTokenExtractor::new(&cfg.verification_marker)
            .map_err(|e| BookingError::InvalidConfig(format!("verification marker: {e}")))?;
        Ok(Self::new(cfg, extractor))
    }
}

impl<E: PageTokenExtractor> IdentityProvisioner<E> {
    pub fn new(cfg: Arc<PlatformConfig>, extractor: E) -> Self {
        Self { cfg, extractor }
    }

    #[instrument(skip_all, target = "identity")]
    pub async fn provision(
        &self,
        session: Box<dyn PlatformSession>,
    ) -> Result<GuestIdentity, BookingError> {
        let signup_url = self.cfg.signup_url();

        // 1) fresh, page-scoped tokens
        let page = session.get(&signup_url, &signup_url).await?;
        let tokens = self
            .extractor
            .signup_tokens(&page.body)
            .map_err(|missing| BookingError::TokenExtractionFailed(missing.to_string()))?;

        // 2) form body
        let email = self.fresh_alias()?;
        let email_field = tokens
            .email_field
            .clone()
            .unwrap_or_else(|| self.cfg.fallback_email_field.clone());

        let mut form = parse_template(&self.cfg.signup_template);
        set_field(&mut form, "csrf-key", &tokens.csrf);
        set_field(&mut form, "form-id", &tokens.form_id);
        set_field(&mut form, &email_field, &email);

        let endpoint = self.cfg.absolutize(&tokens.endpoint);
        debug!(endpoint = %endpoint, email_field = %email_field, "submitting guest signup");

        // 3) submit and locate the verification link
        let reply = session.post_form(&endpoint, &signup_url, &form).await?;
        let link = self
            .find_verification_link(session.as_ref(), &reply)
            .await?;

        // 4) verify; the session is now the verified guest
        session.get(&link, &signup_url).await?;

        info!(email = %email, "guest identity verified");

        Ok(GuestIdentity::new(session, email, self.cfg.identity_quota))
    }

    async fn find_verification_link(
        &self,
        session: &dyn PlatformSession,
        reply: &PlatformResponse,
    ) -> Result<String, BookingError> {
        if self.extractor.is_verification_url(&reply.final_url) {
            debug!("verification link taken from redirect");
            return Ok(reply.final_url.clone());
        }

        if let Some(link) = self.extractor.verification_link(&reply.body) {
            debug!("verification link taken from signup reply");
            return Ok(self.cfg.absolutize(&link));
        }

        let thank_you = self.cfg.url(&self.cfg.thank_you_path);
        let page = session.get(&thank_you, &self.cfg.signup_url()).await?;
        if let Some(link) = self.extractor.verification_link(&page.body) {
            debug!("verification link taken from thank-you page");
            return Ok(self.cfg.absolutize(&link));
        }

        warn!(final_url = %reply.final_url, "no verification link in any signal");
        Err(BookingError::VerificationLinkNotFound)
    }

    fn fresh_alias(&self) -> Result<String, BookingError> {
        email_alias(&self.cfg.base_email, &random_token(ALIAS_TOKEN_LEN)).ok_or_else(|| {
            BookingError::InvalidConfig(format!("base e-mail '{}'", self.cfg.base_email))
        })
    }
}

/// `user@domain` + `tok` → `user+tok@domain`.
pub fn email_alias(base: &str, token: &str) -> Option<String> {
    let (user, domain) = base.split_once('@')?;
    if user.is_empty() || domain.is_empty() {
        return None;
    }
    Some(format!("{user}+{token}@{domain}"))
}

fn random_token(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| ALIAS_CHARSET[rng.gen_range(0..ALIAS_CHARSET.len())] as char)
        .collect()
}

fn parse_template(template: &str) -> Vec<(String, String)> {
    url::form_urlencoded::parse(template.trim_start_matches('?').as_bytes())
        .into_owned()
        .collect()
}

/// Replace every occurrence of `key` with a single `key=value` pair.
fn set_field(form: &mut Vec<(String, String)>, key: &str, value: &str) {
    form.retain(|(k, _)| k != key);
    form.push((key.to_string(), value.to_string()));
}
