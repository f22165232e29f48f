//! Module parameters
//!
//! Binary modules receive their arguments unvalidated, so everything the
//! host would normally coerce (defaults, booleans, the method choice) is
//! checked here.

use anyhow::Context;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

use super::outcome::StatusPolicy;
use crate::akamai::edgerc::DEFAULT_EDGERC;
use crate::akamai::Method;

/// Environment override for the default edgerc location
pub const EDGERC_ENV: &str = "AKAMAI_EDGERC";

pub const DEFAULT_SECTION: &str = "default";

#[derive(Debug, Error, PartialEq)]
pub enum ParamsError {
    #[error("missing required arguments: {0}")]
    MissingRequired(String),

    #[error("unsupported method '{0}' (expected one of GET, PATCH, POST, PUT)")]
    UnsupportedMethod(String),

    #[error("headers must be a JSON object of string values: {0}")]
    InvalidHeaders(String),
}

impl FromStr for Method {
    type Err = ParamsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "PATCH" => Ok(Method::Patch),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            _ => Err(ParamsError::UnsupportedMethod(s.to_string())),
        }
    }
}

/// Raw arguments as written by the host into the args file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModuleArgs {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub headers: Option<Value>,
    #[serde(default)]
    pub edge_config: Option<String>,
    #[serde(default, deserialize_with = "deserialize_bool_like")]
    pub strict_status: Option<bool>,
}

impl ModuleArgs {
    /// Read the JSON args file the host passes as the first argument
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read module args {:?}", path))?;
        let args: Self = serde_json::from_str(&content)
            .with_context(|| format!("Module args {:?} are not a JSON object", path))?;
        debug!("Loaded module args from {:?}", path);
        Ok(args)
    }
}

/// Accepts real booleans plus the strings the host treats as booleans
fn deserialize_bool_like<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(b)),
        Some(Value::Number(n)) => Ok(Some(n.as_f64() != Some(0.0))),
        Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "yes" | "on" | "true" | "1" | "y" | "t" => Ok(Some(true)),
            "no" | "off" | "false" | "0" | "n" | "f" | "" => Ok(Some(false)),
            other => Err(serde::de::Error::custom(format!(
                "'{}' is not a valid boolean",
                other
            ))),
        },
        Some(other) => Err(serde::de::Error::custom(format!(
            "'{}' is not a valid boolean",
            other
        ))),
    }
}

/// Validated request description for one invocation
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    pub endpoint: String,
    pub method: Method,
    pub section: String,
    pub body: Option<PathBuf>,
    pub headers: Vec<(String, String)>,
    pub edge_config: String,
    pub status_policy: StatusPolicy,
}

impl RequestSpec {
    /// Validate raw args, applying defaults and the `AKAMAI_EDGERC` override
    pub fn from_args(args: ModuleArgs) -> Result<Self, ParamsError> {
        let env_edgerc = std::env::var(EDGERC_ENV).ok().filter(|v| !v.is_empty());
        Self::from_args_with_env(args, env_edgerc)
    }

    fn from_args_with_env(
        args: ModuleArgs,
        env_edgerc: Option<String>,
    ) -> Result<Self, ParamsError> {
        let mut missing = Vec::new();
        if args.endpoint.is_none() {
            missing.push("endpoint");
        }
        if args.method.is_none() {
            missing.push("method");
        }
        let (Some(endpoint), Some(method)) = (args.endpoint, args.method) else {
            return Err(ParamsError::MissingRequired(missing.join(", ")));
        };

        let method = method.parse::<Method>()?;
        let headers = match args.headers {
            Some(raw) => parse_headers(raw)?,
            None => Vec::new(),
        };

        let edge_config = args
            .edge_config
            .or(env_edgerc)
            .unwrap_or_else(|| DEFAULT_EDGERC.to_string());

        let status_policy = if args.strict_status.unwrap_or(false) {
            StatusPolicy::Strict
        } else {
            StatusPolicy::Legacy
        };

        Ok(Self {
            endpoint,
            method,
            section: args.section.unwrap_or_else(|| DEFAULT_SECTION.to_string()),
            body: args.body.filter(|b| !b.is_empty()).map(PathBuf::from),
            headers,
            edge_config,
            status_policy,
        })
    }
}

/// `headers` arrives either as a JSON object or as a string holding one
fn parse_headers(raw: Value) -> Result<Vec<(String, String)>, ParamsError> {
    let object = match raw {
        Value::Null => return Ok(Vec::new()),
        Value::String(s) if s.trim().is_empty() => return Ok(Vec::new()),
        Value::String(s) => serde_json::from_str::<Value>(&s)
            .map_err(|e| ParamsError::InvalidHeaders(e.to_string()))?,
        other => other,
    };

    let map = match object {
        Value::Object(map) => map,
        other => return Err(ParamsError::InvalidHeaders(format!("got {}", other))),
    };

    map.into_iter()
        .map(|(name, value)| match value {
            Value::String(v) => Ok((name, v)),
            other => Err(ParamsError::InvalidHeaders(format!(
                "value for '{}' is {}",
                name, other
            ))),
        })
        .collect()
}
