//! Markup scraping for the guest signup protocol.
//!
//! The platform has no account API, so the tokens live in its HTML. All of
//! that fragility is kept behind `PageTokenExtractor`; a markup change should
//! only ever touch this file.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Page-scoped values needed to submit one signup form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignupTokens {
    pub csrf: String,
    pub form_id: String,

    /// Submission endpoint for this page instance; may be relative.
    pub endpoint: String,

    /// Name of the e-mail input, when the markup exposes one.
    pub email_field: Option<String>,
}

/// Which required token a signup page lacked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MissingToken {
    Csrf,
    FormId,
    Endpoint,
}

impl fmt::Display for MissingToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MissingToken::Csrf => "CSRF token",
            MissingToken::FormId => "form id",
            MissingToken::Endpoint => "submission endpoint",
        })
    }
}

pub trait PageTokenExtractor: Send + Sync {
    fn signup_tokens(&self, markup: &str) -> Result<SignupTokens, MissingToken>;

    /// Verification link embedded in a page, if any. May be relative.
    fn verification_link(&self, markup: &str) -> Option<String>;

    /// Whether a URL (e.g. a redirect target) is itself the verification link.
    fn is_verification_url(&self, url: &str) -> bool;
}

static CSRF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<input[^>]*name=["']csrf-key["'][^>]*value=["']([^"']+)["']"#).unwrap()
});

static FORM_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<input[^>]*name=["']form-id["'][^>]*value=["']([^"']+)["']"#).unwrap()
});

static EMAIL_FIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<input[^>]*type=["']email["'][^>]*name=["']([^"']+)["']"#).unwrap()
});

static DATA_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)data-urlIfModified=["']([^"']*engine\?service=recordmanager:form:[^"']+)["']"#,
    )
    .unwrap()
});

static FORM_ACTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<form[^>]*action=["']([^"']*engine\?service=recordmanager:form:[^"']+)["']"#)
        .unwrap()
});

static ASKSAVE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)cmd=asksave").unwrap());

static META_REFRESH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)http-equiv=["']refresh["'][^>]*content=["'][^"']*url=([^"'>\s]+)"#).unwrap()
});

static JS_REDIRECT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)location\.(?:href|assign)\s*[=(]\s*['"]([^'"]+)['"]"#).unwrap()
});

/// Regex-based extractor for the platform's current signup markup.
#[derive(Clone, Debug)]
pub struct MarkupTokenExtractor {
    marker: String,
    link_re: Regex,
}

impl MarkupTokenExtractor {
    /// `marker` is the path fragment every verification link contains.
    pub fn new(marker: &str) -> Result<Self, regex::Error> {
        let link_re = Regex::new(&format!(
            r#"(?i){}\?[^"'<> \n\r]+"#,
            regex::escape(marker)
        ))?;
        Ok(Self {
            marker: marker.to_ascii_lowercase(),
            link_re,
        })
    }

    fn capture(re: &Regex, markup: &str) -> Option<String> {
        re.captures(markup)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    }
}

impl PageTokenExtractor for MarkupTokenExtractor {
    fn signup_tokens(&self, markup: &str) -> Result<SignupTokens, MissingToken> {
        let csrf = Self::capture(&CSRF_RE, markup).ok_or(MissingToken::Csrf)?;
        let form_id = Self::capture(&FORM_ID_RE, markup).ok_or(MissingToken::FormId)?;

        let raw_endpoint = Self::capture(&DATA_URL_RE, markup)
            .or_else(|| Self::capture(&FORM_ACTION_RE, markup))
            .ok_or(MissingToken::Endpoint)?;
        // The page renders the "ask" variant; submitting it only re-renders the form.
        let endpoint = ASKSAVE_RE
            .replace(&decode_amp(&raw_endpoint), "cmd=save")
            .into_owned();

        Ok(SignupTokens {
            csrf,
            form_id,
            endpoint,
            email_field: Self::capture(&EMAIL_FIELD_RE, markup),
        })
    }

    fn verification_link(&self, markup: &str) -> Option<String> {
        if let Some(m) = self.link_re.find(markup) {
            return Some(decode_amp(m.as_str()));
        }

        [&*META_REFRESH_RE, &*JS_REDIRECT_RE]
            .into_iter()
            .filter_map(|re| Self::capture(re, markup))
            .find(|link| self.is_verification_url(link))
            .map(|link| decode_amp(&link))
    }

    fn is_verification_url(&self, url: &str) -> bool {
        url.to_ascii_lowercase().contains(&self.marker)
    }
}

fn decode_amp(s: &str) -> String {
    s.replace("&amp;", "&")
}
