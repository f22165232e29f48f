//! EdgeGrid credentials loading from `.edgerc` files
//!
//! Supports:
//! - `~` / `~/...` expansion against the caller's home directory
//! - INI-style sections (`[default]`, `[papi]`, ...)
//! - `key = value` and `key: value` pairs, `#` / `;` comments, quoted values

use anyhow::anyhow;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, trace};

/// Default location of the credentials file
pub const DEFAULT_EDGERC: &str = "~/.edgerc";

/// Default cap on the number of body bytes covered by the content hash
pub const DEFAULT_MAX_BODY: usize = 131072;

/// Errors raised while reading an edgerc section
#[derive(Debug, Error)]
pub enum EdgercError {
    #[error("Could not read edgerc file {path:?}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Section '{section}' not found in {path:?} (available: {})", .available.join(", "))]
    SectionNotFound {
        section: String,
        path: PathBuf,
        available: Vec<String>,
    },

    #[error("'{key}' not found in section '{section}'")]
    MissingKey { key: &'static str, section: String },

    #[error("Invalid max_body '{value}' in section '{section}'")]
    InvalidMaxBody { value: String, section: String },

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// EdgeGrid client credentials for one edgerc section
#[derive(Clone)]
pub struct Credentials {
    pub host: String,
    pub client_token: String,
    pub client_secret: String,
    pub access_token: String,
    pub max_body: usize,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("host", &self.host)
            .field("client_token", &mask_credential(&self.client_token))
            .field("client_secret", &mask_credential(&self.client_secret))
            .field("access_token", &mask_credential(&self.access_token))
            .field("max_body", &self.max_body)
            .finish()
    }
}

/// Mask sensitive credential values for logging
pub fn mask_credential(value: &str) -> String {
    let count = value.chars().count();
    if count <= 8 {
        "*".repeat(count)
    } else {
        let head: String = value.chars().take(4).collect();
        let tail: String = value.chars().skip(count - 4).collect();
        format!("{}...{}", head, tail)
    }
}

/// Resolve the edgerc path, expanding a leading `~` to the home directory
pub fn resolve_path(raw: &str) -> Result<PathBuf, EdgercError> {
    if !is_home_relative(raw) {
        return Ok(PathBuf::from(raw));
    }
    let home = dirs::home_dir().ok_or_else(|| anyhow!("Could not find home directory"))?;
    Ok(expand_home(raw, &home))
}

fn is_home_relative(raw: &str) -> bool {
    raw == "~" || raw.starts_with("~/")
}

/// Expand `~` / `~/rest` against `home`; other paths come back unchanged
fn expand_home(raw: &str, home: &Path) -> PathBuf {
    if raw == "~" {
        return home.to_path_buf();
    }
    match raw.strip_prefix("~/") {
        Some(rest) => home.join(rest),
        None => PathBuf::from(raw),
    }
}

/// Parse an INI-style file into sections
fn parse_ini_file(content: &str) -> HashMap<String, HashMap<String, String>> {
    let mut sections: HashMap<String, HashMap<String, String>> = HashMap::new();
    let mut current_section = String::new();

    for line in content.lines() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            current_section = line[1..line.len() - 1].trim().to_string();
            sections.entry(current_section.clone()).or_default();
            continue;
        }

        // Whichever delimiter comes first wins, so URLs in values survive
        let split = match (line.find('='), line.find(':')) {
            (Some(eq), Some(colon)) => Some(eq.min(colon)),
            (Some(eq), None) => Some(eq),
            (None, Some(colon)) => Some(colon),
            (None, None) => None,
        };

        if let Some(pos) = split {
            if !current_section.is_empty() {
                let key = line[..pos].trim().to_lowercase();
                let value = unquote(line[pos + 1..].trim()).to_string();
                sections
                    .entry(current_section.clone())
                    .or_default()
                    .insert(key, value);
            }
        }
    }

    sections
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Strip scheme and trailing slashes so the host can be reused in `https://{host}`
fn normalize_host(host: &str) -> String {
    let host = host
        .strip_prefix("https://")
        .or_else(|| host.strip_prefix("http://"))
        .unwrap_or(host);
    host.trim_end_matches('/').to_string()
}

/// Load credentials for `section` from the edgerc file at `raw_path`
pub fn load_credentials(raw_path: &str, section: &str) -> Result<Credentials, EdgercError> {
    let path = resolve_path(raw_path)?;
    debug!("Reading edgerc {:?} (section '{}')", path, section);

    let content = fs::read_to_string(&path).map_err(|source| EdgercError::Unreadable {
        path: path.clone(),
        source,
    })?;

    let credentials = credentials_from_str(&content, section).map_err(|e| match e {
        EdgercError::SectionNotFound {
            section, available, ..
        } => EdgercError::SectionNotFound {
            section,
            path: path.clone(),
            available,
        },
        other => other,
    })?;

    trace!("Loaded credentials: {:?}", credentials);
    Ok(credentials)
}

/// Extract one section's credentials from edgerc text
pub fn credentials_from_str(content: &str, section: &str) -> Result<Credentials, EdgercError> {
    let sections = parse_ini_file(content);

    let values = sections.get(section).ok_or_else(|| {
        let mut available: Vec<String> = sections.keys().cloned().collect();
        available.sort();
        EdgercError::SectionNotFound {
            section: section.to_string(),
            path: PathBuf::new(),
            available,
        }
    })?;

    let required = |key: &'static str| -> Result<String, EdgercError> {
        values
            .get(key)
            .filter(|v| !v.is_empty())
            .cloned()
            .ok_or_else(|| EdgercError::MissingKey {
                key,
                section: section.to_string(),
            })
    };

    let max_body = match values.get("max_body") {
        Some(raw) => raw
            .parse::<usize>()
            .map_err(|_| EdgercError::InvalidMaxBody {
                value: raw.clone(),
                section: section.to_string(),
            })?,
        None => DEFAULT_MAX_BODY,
    };

    Ok(Credentials {
        host: normalize_host(&required("host")?),
        client_token: required("client_token")?,
        client_secret: required("client_secret")?,
        access_token: required("access_token")?,
        max_body,
    })
}
