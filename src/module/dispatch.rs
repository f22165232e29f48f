//! Request dispatcher
//!
//! One invocation: load credentials, resolve the target URL and body,
//! sign, send exactly once, and map the status onto an [`Outcome`].

use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};
use url::Url;

use super::outcome::{parse_payload, Outcome};
use super::params::RequestSpec;
use crate::akamai::edgerc::{load_credentials, mask_credential, Credentials};
use crate::akamai::{EdgeGridSigner, Method, SignedRequest, Transport};

const CONTENT_TYPE_JSON: &str = "application/json";

/// Headers the signature depends on; user values for these are dropped
const PROTECTED_HEADERS: [&str; 2] = ["authorization", "host"];

/// Join `https://{host}` with the endpoint using URL-join semantics
pub fn target_url(host: &str, endpoint: &str) -> Result<Url> {
    let base = Url::parse(&format!("https://{}", host))
        .with_context(|| format!("Invalid host '{}'", host))?;
    base.join(endpoint)
        .with_context(|| format!("Invalid endpoint '{}'", endpoint))
}

/// Read and parse the JSON body file
pub fn load_body(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Could not read body file {:?}", path))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Body file {:?} is not valid JSON", path))
}

pub struct RequestDispatcher<T: Transport> {
    transport: T,
}

impl<T: Transport> RequestDispatcher<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Run one request described by `spec`
    pub fn dispatch(&self, spec: &RequestSpec) -> Result<Outcome> {
        let credentials = load_credentials(&spec.edge_config, &spec.section)?;
        self.dispatch_with(spec, &credentials)
    }

    /// Run one request with already loaded credentials
    pub fn dispatch_with(
        &self,
        spec: &RequestSpec,
        credentials: &Credentials,
    ) -> Result<Outcome> {
        let url = target_url(&credentials.host, &spec.endpoint)?;
        debug!(
            "{} {} (section '{}', client_token {})",
            spec.method,
            url,
            spec.section,
            mask_credential(&credentials.client_token)
        );

        let request = self.build_request(spec, credentials, url)?;
        let response = self.transport.send(request)?;

        let outcome = Outcome::from_response(
            spec.method,
            spec.status_policy,
            response.status,
            parse_payload(&response.body),
        );
        if outcome.is_error {
            warn!(
                "Akamai API returned {} for {} {}",
                outcome.status, spec.method, spec.endpoint
            );
        }
        Ok(outcome)
    }

    fn build_request(
        &self,
        spec: &RequestSpec,
        credentials: &Credentials,
        url: Url,
    ) -> Result<SignedRequest> {
        let body = match (&spec.body, spec.method) {
            (Some(path), method) if method.is_write() => {
                let json = load_body(path)?;
                Some(serde_json::to_vec(&json)?)
            }
            (Some(path), _) => {
                debug!("Ignoring body file {:?} for {}", path, spec.method);
                None
            }
            (None, _) => None,
        };

        let payload = body.as_deref().unwrap_or_default();
        let authorization = EdgeGridSigner::new(credentials)
            .sign(spec.method.as_str(), &url, payload)
            .map_err(|e| anyhow!("Failed to sign request: {}", e))?;

        let mut headers = vec![("authorization".to_string(), authorization)];
        if spec.method != Method::Get {
            headers.push(("content-type".to_string(), CONTENT_TYPE_JSON.to_string()));
        }
        for (name, value) in &spec.headers {
            if PROTECTED_HEADERS.iter().any(|h| name.eq_ignore_ascii_case(h)) {
                warn!("Ignoring user supplied {} header", name.to_lowercase());
                continue;
            }
            // User values replace defaults of the same name
            headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
            headers.push((name.clone(), value.clone()));
        }

        Ok(SignedRequest {
            method: spec.method,
            url,
            headers,
            body,
        })
    }
}
