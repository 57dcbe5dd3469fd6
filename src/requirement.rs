//! Requirement line parsing
//!
//! Turns one line of a `requirements.txt` file into a [`DependencyRecord`].
//! The accepted grammar is the part of PEP 508 (plus pip's line conventions)
//! that shows up in real requirement files:
//!
//! ```text
//! flask==1.0
//! requests[security,socks] >= 2.8.1, < 3 ; python_version < "3.12"
//! mylib @ git+https://github.com/org/mylib.git@v1.2
//! git+https://github.com/org/other.git@main#egg=other
//! https://files.example.org/pkg-1.0-py3-none-any.whl
//! numpy==1.26.4 --hash=sha256:abc... \
//! ```
//!
//! Comparison operators are kept exactly as written with whitespace removed,
//! so `flask == 1.0` yields the version `==1.0`.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// One dependency parsed from a requirements line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyRecord {
    /// Package name, lowercased
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extras: Vec<String>,
    /// PEP 508 environment marker expression
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markers: Option<String>,
    /// Direct reference (archive or wheel URL)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// VCS repository URL, without the `git+` prefix
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
}

impl DependencyRecord {
    pub fn new(name: impl Into<String>) -> Self {
        DependencyRecord {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_version(name: impl Into<String>, version: impl Into<String>) -> Self {
        DependencyRecord {
            name: name.into(),
            version: Some(version.into()),
            ..Default::default()
        }
    }

    /// True when nothing usable was parsed.
    pub fn is_empty(&self) -> bool {
        self.name.trim().is_empty()
            && self.version.as_deref().map_or(true, |v| v.trim().is_empty())
            && self.extras.is_empty()
            && self.markers.is_none()
            && self.url.is_none()
            && self.git.is_none()
            && self.rev.is_none()
    }

    /// Carries more than a name and a version.
    pub fn has_details(&self) -> bool {
        !self.extras.is_empty()
            || self.markers.is_some()
            || self.url.is_some()
            || self.git.is_some()
            || self.rev.is_some()
    }

    /// Pinned to a URL or a VCS checkout; constraints do not apply.
    pub fn is_pinned(&self) -> bool {
        self.url.is_some() || self.git.is_some()
    }

    pub fn canonical_name(&self) -> String {
        canonical_name(&self.name)
    }
}

/// Normalize a package name for comparisons: lowercase, with every run of
/// `-`, `_` and `.` collapsed to a single `-`.
pub fn canonical_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_separator = false;
    for c in name.trim().chars() {
        if matches!(c, '-' | '_' | '.') {
            if !in_separator {
                out.push('-');
            }
            in_separator = true;
        } else {
            out.extend(c.to_lowercase());
            in_separator = false;
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequirementError {
    #[error("invalid requirement: `{0}`")]
    InvalidName(String),

    #[error("invalid version specifier `{spec}` in `{line}`")]
    InvalidSpecifier { spec: String, line: String },

    #[error("cannot infer a package name from URL `{0}`")]
    UnnamedUrl(String),
}

fn name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([A-Za-z0-9](?:[A-Za-z0-9._-]*[A-Za-z0-9])?)\s*(?:\[([^\]]*)\])?\s*(.*)$")
            .expect("valid requirement name regex")
    })
}

fn clause_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(~=|===|==|!=|<=|>=|<|>|=|\^|~)?[A-Za-z0-9.*+!_-]+$")
            .expect("valid specifier regex")
    })
}

fn url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*://").expect("valid url regex"))
}

/// Parse one requirements line.
///
/// Returns `Ok(None)` for lines that hold no requirement (blank, comment only).
pub fn parse_requirement(line: &str) -> Result<Option<DependencyRecord>, RequirementError> {
    let line = strip_line_noise(line);
    if line.is_empty() {
        return Ok(None);
    }

    let (body, markers) = match line.split_once(';') {
        Some((body, markers)) => (body.trim(), non_empty(markers)),
        None => (line, None),
    };

    let mut record = if url_regex().is_match(body) {
        parse_bare_url(body)?
    } else {
        parse_named(body, line)?
    };
    record.markers = markers;

    if record.is_empty() {
        return Ok(None);
    }
    Ok(Some(record))
}

/// Drop inline comments, pip per-requirement options and line continuations.
fn strip_line_noise(line: &str) -> &str {
    let mut line = line.trim();
    if line.starts_with('#') {
        return "";
    }
    for marker in [" #", "\t#", " --", "\t--"] {
        if let Some(idx) = line.find(marker) {
            line = &line[..idx];
        }
    }
    line.trim_end_matches('\\').trim()
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

fn parse_named(body: &str, line: &str) -> Result<DependencyRecord, RequirementError> {
    let caps = name_regex()
        .captures(body)
        .ok_or_else(|| RequirementError::InvalidName(line.to_string()))?;

    let mut record = DependencyRecord::new(caps[1].to_lowercase());
    if let Some(extras) = caps.get(2) {
        record.extras = extras
            .as_str()
            .split(',')
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(String::from)
            .collect();
    }

    let rest = caps.get(3).map_or("", |m| m.as_str()).trim();
    if let Some(url) = rest.strip_prefix('@') {
        apply_direct_reference(&mut record, url.trim());
    } else if !rest.is_empty() {
        record.version = Some(parse_specifiers(rest, line)?);
    }
    Ok(record)
}

fn parse_specifiers(spec: &str, line: &str) -> Result<String, RequirementError> {
    let spec = spec
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .unwrap_or(spec);
    let compact: String = spec.chars().filter(|c| !c.is_whitespace()).collect();

    let invalid = || RequirementError::InvalidSpecifier {
        spec: spec.trim().to_string(),
        line: line.to_string(),
    };
    if compact.is_empty() {
        return Err(invalid());
    }
    for clause in compact.split(',') {
        if !clause_regex().is_match(clause) {
            return Err(invalid());
        }
    }
    Ok(compact)
}

fn apply_direct_reference(record: &mut DependencyRecord, url: &str) {
    let url = strip_egg_fragment(url);
    match url.strip_prefix("git+") {
        Some(repo) => {
            let (repo, rev) = split_vcs_rev(repo);
            record.git = Some(repo.to_string());
            record.rev = rev.map(String::from);
        }
        None => record.url = Some(url.to_string()),
    }
}

fn strip_egg_fragment(url: &str) -> &str {
    match url.find("#egg=") {
        Some(idx) => &url[..idx],
        None => url,
    }
}

/// `https://host/org/repo.git@v1.0` -> (`https://host/org/repo.git`, `v1.0`).
/// Only an `@` in the last path segment counts, so `ssh://git@host/...` keeps
/// its user part.
fn split_vcs_rev(repo: &str) -> (&str, Option<&str>) {
    let segment_start = repo.rfind('/').map_or(0, |i| i + 1);
    match repo[segment_start..].rfind('@') {
        Some(at) => {
            let at = segment_start + at;
            let rev = &repo[at + 1..];
            (&repo[..at], if rev.is_empty() { None } else { Some(rev) })
        }
        None => (repo, None),
    }
}

fn parse_bare_url(url: &str) -> Result<DependencyRecord, RequirementError> {
    let name = egg_name(url)
        .or_else(|| name_from_path(url))
        .ok_or_else(|| RequirementError::UnnamedUrl(url.to_string()))?;
    let mut record = DependencyRecord::new(name.to_lowercase());
    apply_direct_reference(&mut record, url);
    Ok(record)
}

fn egg_name(url: &str) -> Option<String> {
    let fragment = url.split_once('#')?.1;
    fragment
        .split('&')
        .find_map(|part| part.strip_prefix("egg="))
        .and_then(non_empty)
}

fn name_from_path(url: &str) -> Option<String> {
    let path = url.split(['#', '?']).next()?;
    let (_, after_scheme) = path.split_once("://")?;
    let (_, path) = after_scheme.split_once('/')?;
    let segment = path.trim_end_matches('/').rsplit('/').next()?;
    let segment = segment.split('@').next()?;

    let name = if let Some(wheel) = segment.strip_suffix(".whl") {
        wheel.split('-').next()?
    } else if let Some(stem) = [".tar.gz", ".tar.bz2", ".zip"]
        .iter()
        .find_map(|ext| segment.strip_suffix(ext))
    {
        stem.rsplit_once('-').map_or(stem, |(name, _)| name)
    } else {
        segment.strip_suffix(".git").unwrap_or(segment)
    };

    if name_regex().captures(name).is_some_and(|c| c[1].len() == name.len()) {
        Some(name.to_string())
    } else {
        None
    }
}
