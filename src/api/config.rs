//! Purpose: Resolve where requests go and which credential they carry.
//! Exports: `ApiConfig`, env variable names, `parse_duration`.
//! Role: Environment-first configuration; CLI flags layer on top via `with_*`.
//! Invariants: The credential is only ever read from the environment or a caller.
//! Invariants: The api root is an http(s) URL without query or fragment.
use std::fmt;
use std::time::Duration;

use url::Url;

use crate::core::error::{Error, ErrorKind};

pub const TOKEN_ENV: &str = "APIO_GITHUB_TOKEN";
pub const FALLBACK_TOKEN_ENV: &str = "GITHUB_TOKEN";
pub const API_ROOT_ENV: &str = "APIO_API_ROOT";
pub const ORG_ENV: &str = "APIO_GITHUB_ORG";

pub const DEFAULT_API_ROOT: &str = "https://api.github.com";
pub const DEFAULT_ORG: &str = "FPGAwars";

#[derive(Clone)]
pub struct ApiConfig {
    api_root: Url,
    org: String,
    token: Option<String>,
    tls_skip_verify: bool,
    timeout: Option<Duration>,
}

impl ApiConfig {
    pub fn new(api_root: &str, org: impl Into<String>) -> Result<Self, Error> {
        Ok(Self {
            api_root: normalize_api_root(api_root)?,
            org: org.into(),
            token: None,
            tls_skip_verify: true,
            timeout: None,
        })
    }

    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from an arbitrary variable source; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let api_root = get(API_ROOT_ENV).unwrap_or_else(|| DEFAULT_API_ROOT.to_string());
        let org = get(ORG_ENV).unwrap_or_else(|| DEFAULT_ORG.to_string());
        let mut config = Self::new(&api_root, org)?;
        config.token = get(TOKEN_ENV).or_else(|| get(FALLBACK_TOKEN_ENV));
        Ok(config)
    }

    pub fn with_api_root(mut self, api_root: &str) -> Result<Self, Error> {
        self.api_root = normalize_api_root(api_root)?;
        Ok(self)
    }

    pub fn with_org(mut self, org: impl Into<String>) -> Self {
        self.org = org.into();
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_tls_skip_verify(mut self, skip: bool) -> Self {
        self.tls_skip_verify = skip;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn org(&self) -> &str {
        &self.org
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn tls_skip_verify(&self) -> bool {
        self.tls_skip_verify
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// `<api-root>/repos/<org>/`, the prefix every request path is appended to.
    pub fn base_url(&self) -> String {
        let root = self.api_root.as_str().trim_end_matches('/');
        format!("{root}/repos/{}/", self.org)
    }

    pub fn auth_header(&self) -> Option<(String, String)> {
        self.token
            .as_ref()
            .map(|token| ("Authorization".to_string(), format!("token {token}")))
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("api_root", &self.api_root.as_str())
            .field("org", &self.org)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("tls_skip_verify", &self.tls_skip_verify)
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn normalize_api_root(raw: &str) -> Result<Url, Error> {
    let mut url = Url::parse(raw.trim()).map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message("invalid api root url")
            .with_url(raw)
            .with_source(err)
    })?;
    let scheme = url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(Error::new(ErrorKind::Usage)
            .with_message("api root url must use http or https scheme")
            .with_url(raw));
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

pub fn parse_duration(input: &str) -> Result<Duration, Error> {
    let invalid = || {
        Error::new(ErrorKind::Usage)
            .with_message(format!("invalid duration: {input:?}"))
            .with_hint("Use a number plus ms|s|m|h (e.g. 10s).")
    };
    let trimmed = input.trim();
    let split = trimmed
        .char_indices()
        .find(|(_, ch)| !ch.is_ascii_digit())
        .map(|(idx, _)| idx)
        .ok_or_else(invalid)?;
    let (num_str, unit) = trimmed.split_at(split);
    let value: u64 = num_str.parse().map_err(|_| invalid())?;
    let millis = match unit {
        "ms" => value,
        "s" => value.saturating_mul(1_000),
        "m" => value.saturating_mul(60_000),
        "h" => value.saturating_mul(3_600_000),
        _ => return Err(invalid()),
    };
    Ok(Duration::from_millis(millis))
}
