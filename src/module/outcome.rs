//! Outcome of one module invocation and its JSON result form

use serde::Serialize;
use serde_json::Value;

use crate::akamai::Method;

/// Status codes reported as errors under the default policy
pub const LEGACY_ERROR_STATUSES: [u16; 3] = [400, 401, 404];

/// Which HTTP statuses count as a failed call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusPolicy {
    /// Only 400, 401 and 404 fail; anything else (500 included) succeeds
    #[default]
    Legacy,
    /// Every status >= 400 fails
    Strict,
}

impl StatusPolicy {
    pub fn is_error(&self, status: u16) -> bool {
        match self {
            StatusPolicy::Legacy => LEGACY_ERROR_STATUSES.contains(&status),
            StatusPolicy::Strict => status >= 400,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub is_error: bool,
    pub changed: bool,
    pub status: u16,
    pub payload: Value,
}

impl Outcome {
    /// Map a response status and payload onto the changed/error outcome
    pub fn from_response(
        method: Method,
        policy: StatusPolicy,
        status: u16,
        payload: Value,
    ) -> Self {
        let is_error = policy.is_error(status);
        Self {
            is_error,
            changed: !is_error && method.is_write(),
            status,
            payload,
        }
    }

    pub fn to_result(&self) -> ModuleResult {
        if self.is_error {
            ModuleResult::failed(self.payload.clone())
        } else {
            ModuleResult::exit(self.changed, self.payload.clone())
        }
    }
}

/// Parse a response body: JSON when possible, raw text otherwise
pub fn parse_payload(body: &str) -> Value {
    if body.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
}

/// The JSON object written to stdout for the host
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleResult {
    pub changed: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub failed: bool,
    pub msg: Value,
}

impl ModuleResult {
    pub fn exit(changed: bool, msg: Value) -> Self {
        Self {
            changed,
            failed: false,
            msg,
        }
    }

    pub fn failed(msg: Value) -> Self {
        Self {
            changed: false,
            failed: true,
            msg,
        }
    }

    /// Failure carrying an error chain as text
    pub fn from_error(err: &anyhow::Error) -> Self {
        Self::failed(Value::String(format!("{:#}", err)))
    }

    pub fn exit_code(&self) -> u8 {
        if self.failed {
            1
        } else {
            0
        }
    }
}
