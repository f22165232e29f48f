//! EdgeGrid (EG1-HMAC-SHA256) request signing
//!
//! Produces the `Authorization` header value for one request:
//! `EG1-HMAC-SHA256 client_token=..;access_token=..;timestamp=..;nonce=..;signature=..`

use anyhow::{anyhow, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use tracing::trace;
use url::Url;

use super::edgerc::{mask_credential, Credentials};

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "EG1-HMAC-SHA256";
const TIMESTAMP_FORMAT: &str = "%Y%m%dT%H:%M:%S+0000";

/// Format a timestamp the way EdgeGrid expects it
pub fn edgegrid_timestamp(now: DateTime<Utc>) -> String {
    now.format(TIMESTAMP_FORMAT).to_string()
}

fn base64_hmac_sha256(key: &[u8], data: &[u8]) -> Result<String> {
    let mut mac =
        HmacSha256::new_from_slice(key).map_err(|e| anyhow!("Invalid HMAC key: {}", e))?;
    mac.update(data);
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Signs requests with one client's credentials
pub struct EdgeGridSigner<'a> {
    credentials: &'a Credentials,
}

impl<'a> EdgeGridSigner<'a> {
    pub fn new(credentials: &'a Credentials) -> Self {
        Self { credentials }
    }

    /// Sign with the current time and a fresh nonce
    pub fn sign(&self, method: &str, url: &Url, body: &[u8]) -> Result<String> {
        let timestamp = edgegrid_timestamp(Utc::now());
        let nonce = uuid::Uuid::new_v4().to_string();
        self.sign_with(method, url, body, &timestamp, &nonce)
    }

    /// Sign with an explicit timestamp and nonce
    pub fn sign_with(
        &self,
        method: &str,
        url: &Url,
        body: &[u8],
        timestamp: &str,
        nonce: &str,
    ) -> Result<String> {
        let auth_header = self.auth_prefix(timestamp, nonce);
        let signing_key = base64_hmac_sha256(
            self.credentials.client_secret.as_bytes(),
            timestamp.as_bytes(),
        )?;
        let data_to_sign = self.data_to_sign(method, url, body, &auth_header)?;
        trace!("EdgeGrid data to sign: {:?}", self.masked(&data_to_sign));

        let signature = base64_hmac_sha256(signing_key.as_bytes(), data_to_sign.as_bytes())?;
        Ok(format!("{}signature={}", auth_header, signature))
    }

    /// Copy of signing input with the client and access tokens masked
    fn masked(&self, data: &str) -> String {
        let creds = self.credentials;
        data.replace(&creds.client_token, &mask_credential(&creds.client_token))
            .replace(&creds.access_token, &mask_credential(&creds.access_token))
    }

    fn auth_prefix(&self, timestamp: &str, nonce: &str) -> String {
        format!(
            "{} client_token={};access_token={};timestamp={};nonce={};",
            ALGORITHM,
            self.credentials.client_token,
            self.credentials.access_token,
            timestamp,
            nonce
        )
    }

    fn data_to_sign(
        &self,
        method: &str,
        url: &Url,
        body: &[u8],
        auth_header: &str,
    ) -> Result<String> {
        let host = url.host_str().ok_or_else(|| anyhow!("URL has no host: {}", url))?;
        let netloc = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        let path_and_query = match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        };

        // No headers are designated for signing
        let canonical_headers = "";

        Ok([
            method.to_uppercase().as_str(),
            url.scheme(),
            netloc.as_str(),
            path_and_query.as_str(),
            canonical_headers,
            self.content_hash(method, body).as_str(),
            auth_header,
        ]
        .join("\t"))
    }

    /// Only POST bodies are hashed, truncated to `max_body`
    fn content_hash(&self, method: &str, body: &[u8]) -> String {
        if !method.eq_ignore_ascii_case("POST") || body.is_empty() {
            return String::new();
        }
        let end = body.len().min(self.credentials.max_body);
        STANDARD.encode(Sha256::digest(&body[..end]))
    }
}
