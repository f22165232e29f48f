//! HTTP transport for signed Akamai requests
//!
//! The dispatcher hands a fully signed request to a [`Transport`]; the
//! production transport is a blocking reqwest client.

use anyhow::{anyhow, Result};
use std::fmt;
use tracing::{debug, trace};
use url::Url;

/// HTTP methods the module can send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Patch,
    Post,
    Put,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Patch => "PATCH",
            Method::Post => "POST",
            Method::Put => "PUT",
        }
    }

    /// Whether a successful call counts as a change on the remote side
    pub fn is_write(&self) -> bool {
        !matches!(self, Method::Get)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request that already carries its `Authorization` header
#[derive(Debug, Clone)]
pub struct SignedRequest {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl SignedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Status and raw body of a response
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Sends one signed request and returns the response
pub trait Transport {
    fn send(&self, request: SignedRequest) -> Result<HttpResponse>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: SignedRequest) -> Result<HttpResponse> {
        (**self).send(request)
    }
}

/// Blocking reqwest transport
pub struct ReqwestTransport {
    http_client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        let http_client = reqwest::blocking::Client::builder()
            .user_agent(concat!("ansible-akamai/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| anyhow!("Failed to build HTTP client: {}", e))?;
        Ok(Self { http_client })
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: SignedRequest) -> Result<HttpResponse> {
        let url = request.url.as_str();
        let mut builder = match request.method {
            Method::Get => self.http_client.get(url),
            Method::Patch => self.http_client.patch(url),
            Method::Post => self.http_client.post(url),
            Method::Put => self.http_client.put(url),
        };

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        trace!("Sending {} request to {}", request.method, url);
        let response = builder
            .send()
            .map_err(|e| anyhow!("{} {} failed: {}", request.method, url, e))?;
        let status = response.status().as_u16();
        let body = response.text()?;

        debug!("Response status: {}", status);
        trace!(
            "Response body (first 2000 chars): {}",
            body.chars().take(2000).collect::<String>()
        );

        Ok(HttpResponse { status, body })
    }
}
