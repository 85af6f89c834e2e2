//! Package descriptor loading and validation.
//!
//! A descriptor is a single JSON document describing how to fetch,
//! install, and smoke-test one package:
//!
//! ```json
//! {
//!   "name": "yada",
//!   "version": "1.0.0",
//!   "desc": "Yet Another Dev Assistant",
//!   "homepage": "https://github.com/alapp87/yet-another-dev-assistant",
//!   "url": "https://example.com/my-python-app-1.0.0.tar.gz",
//!   "sha256": "0f6a...",
//!   "dependencies": ["python3"],
//!   "install": ["install -D -m 755 yada \"$STEEP_PREFIX/bin/yada\""],
//!   "test": { "command": "yada --version" }
//! }
//! ```
//!
//! Loading is pure: no side effects beyond reading the file. All
//! validation failures surface as [`SteepError::MalformedDescriptor`]
//! naming the offending field, so a bad descriptor can be fixed without
//! re-running the install.

use crate::error::{Result, SteepError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level keys a descriptor may carry. Anything else is rejected,
/// with a suggestion when the key is close to a known one.
const KNOWN_KEYS: &[&str] = &[
    "name",
    "version",
    "desc",
    "homepage",
    "url",
    "sha256",
    "dependencies",
    "install",
    "test",
];

/// Post-install smoke test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestSpec {
    /// Command run via `sh -c` with the install prefix's bin on PATH.
    pub command: String,
    /// Literal the command's output must contain. Defaults to the
    /// descriptor version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expect: Option<String>,
}

impl TestSpec {
    /// The literal the test output must contain.
    pub fn expectation<'a>(&'a self, version: &'a str) -> &'a str {
        self.expect.as_deref().unwrap_or(version)
    }
}

/// Immutable install descriptor, created once at load time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descriptor {
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    /// Source archive URL (tar.gz).
    pub url: String,
    /// Hex SHA-256 of the source archive.
    pub sha256: String,
    /// Executables linked into the isolated runtime environment, in
    /// declared order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
    /// Shell install steps, executed in declared order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub install: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test: Option<TestSpec>,
}

impl Descriptor {
    /// Load and validate a descriptor file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            SteepError::MalformedDescriptor(format!(
                "cannot read {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::parse(&text)
    }

    /// Parse and validate descriptor text.
    pub fn parse(text: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(text)?;

        let object = value
            .as_object()
            .ok_or_else(|| SteepError::MalformedDescriptor("not a JSON object".into()))?;

        for key in object.keys() {
            if !KNOWN_KEYS.contains(&key.as_str()) {
                return Err(SteepError::MalformedDescriptor(unknown_key_message(key)));
            }
        }

        let descriptor: Descriptor = serde_json::from_value(value)
            .map_err(|e| SteepError::MalformedDescriptor(e.to_string()))?;

        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Serialize back to descriptor text. Round-trips: parsing the
    /// output yields a record equal to `self`.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(malformed("name", "must not be empty"));
        }
        if self
            .name
            .chars()
            .any(|c| c == '/' || c.is_whitespace())
        {
            return Err(malformed("name", "must not contain '/' or whitespace"));
        }
        if self.version.is_empty() {
            return Err(malformed("version", "must not be empty"));
        }
        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err(malformed("url", "must be an http(s) URL"));
        }
        if self.sha256.len() != 64 {
            return Err(malformed(
                "sha256",
                &format!("must be 64 hex digits, got {}", self.sha256.len()),
            ));
        }
        if !self.sha256.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(malformed("sha256", "must be hex digits only"));
        }
        if let Some(test) = &self.test {
            if test.command.is_empty() {
                return Err(malformed("test.command", "must not be empty"));
            }
        }
        Ok(())
    }

    /// Filename the source archive is stored under.
    pub fn archive_filename(&self) -> String {
        format!("{}--{}.tar.gz", self.name, self.version)
    }
}

fn malformed(field: &str, reason: &str) -> SteepError {
    SteepError::MalformedDescriptor(format!("field `{}` {}", field, reason))
}

fn unknown_key_message(key: &str) -> String {
    let suggestion = KNOWN_KEYS
        .iter()
        .map(|known| (known, strsim::jaro_winkler(key, known)))
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .filter(|(_, score)| *score > 0.8)
        .map(|(known, _)| known);

    match suggestion {
        Some(known) => format!("unknown field `{}` (did you mean `{}`?)", key, known),
        None => format!("unknown field `{}`", key),
    }
}
