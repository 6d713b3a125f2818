//! Purpose: Fetch one JSON document from the GitHub repos API.
//! Exports: `RequestExecutor`, `RequestDescriptor`, `CONNECTIVITY_MESSAGE`.
//! Role: Builds the request, runs it through a `Transport`, translates failures.
//! Invariants: The path suffix is appended to the base URL verbatim.
//! Invariants: The body is decoded as JSON before the status is checked.
//! Invariants: The response is owned by `fetch` and released when it returns.
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::config::ApiConfig;
use super::transport::{HttpResponse, Transport, UreqTransport};
use crate::core::error::{Error, ErrorKind};

pub const CONNECTIVITY_MESSAGE: &str =
    "Could not connect to GitHub API.\nCheck your internet connection and try again";

const ACCEPT: &str = "application/vnd.github+json";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub base_url: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
}

impl RequestDescriptor {
    pub fn url(&self) -> String {
        format!("{}{}", self.base_url, self.path)
    }
}

pub struct RequestExecutor<T = UreqTransport> {
    base_url: String,
    headers: Vec<(String, String)>,
    transport: T,
}

impl RequestExecutor<UreqTransport> {
    pub fn from_config(config: &ApiConfig) -> Self {
        Self::with_transport(config, UreqTransport::new(config))
    }
}

impl<T: Transport> RequestExecutor<T> {
    pub fn with_transport(config: &ApiConfig, transport: T) -> Self {
        let mut headers = vec![
            ("Accept".to_string(), ACCEPT.to_string()),
            (
                "User-Agent".to_string(),
                concat!("apio-api/", env!("CARGO_PKG_VERSION")).to_string(),
            ),
        ];
        headers.extend(config.auth_header());
        Self {
            base_url: config.base_url(),
            headers,
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn descriptor(&self, path: &str) -> RequestDescriptor {
        RequestDescriptor {
            base_url: self.base_url.clone(),
            path: path.to_string(),
            headers: self.headers.clone(),
        }
    }

    pub fn fetch(&self, path: &str) -> Result<Value, Error> {
        let request = self.descriptor(path);
        let url = request.url();
        debug!(url = %url, "GET");

        let mut response = self
            .transport
            .get(&url, &request.headers)
            .map_err(|err| err.with_url(url.clone()))?;
        debug!(status = response.status(), "response received");

        let result = decode_json(&mut response, &url)?;
        if response.is_error() {
            return Err(status_error(&response, &url));
        }
        Ok(result)
    }

    pub fn fetch_as<R>(&self, path: &str) -> Result<R, Error>
    where
        R: DeserializeOwned,
    {
        let value = self.fetch(path)?;
        serde_json::from_value(value).map_err(|err| {
            Error::new(ErrorKind::Request)
                .with_message(err.to_string())
                .with_url(self.descriptor(path).url())
                .with_source(err)
        })
    }
}

fn decode_json(response: &mut HttpResponse, url: &str) -> Result<Value, Error> {
    let body = response
        .read_body()
        .map_err(|err| err.with_url(url))?;
    serde_json::from_slice(&body).map_err(|err| {
        Error::new(ErrorKind::Request)
            .with_message(err.to_string())
            .with_status(response.status())
            .with_url(url)
            .with_source(err)
    })
}

fn status_error(response: &HttpResponse, url: &str) -> Error {
    let status = response.status();
    let class = if status < 500 { "Client" } else { "Server" };
    Error::new(ErrorKind::Request)
        .with_message(format!(
            "{status} {class} Error: {} for url: {url}",
            response.reason()
        ))
        .with_status(status)
        .with_url(url)
}
