//! Format auto-detection.
//!
//! Candidates are tried strict-first: JSON, then YAML, then TOML, then the
//! ENV heuristic. The order is load-bearing: stored documents and
//! round-tripped exports depend on which format ambiguous content resolves
//! to, so it must not change without a migration story.
//!
//! YAML is a near-universal fallback — its grammar accepts any JSON value
//! and folds consecutive plain lines (`A=1\nB=2`) into a single string
//! scalar, so most ENV-like and single-line TOML input detects as YAML.
//! Known, accepted imprecision; the tests below pin the observed behavior.
//!
//! Detection accepts any document of a format (including bare scalars),
//! while `parse_config` additionally requires a top-level mapping. The
//! asymmetry is historical and relied upon by existing stored content.

use super::{ConfigFormat, DetectError};

pub fn detect_format(content: &str) -> Result<ConfigFormat, DetectError> {
    let content = content.trim();

    if content.is_empty() {
        return Err(DetectError::EmptyContent);
    }

    if serde_json::from_str::<serde_json::Value>(content).is_ok() {
        return Ok(ConfigFormat::Json);
    }

    if serde_yaml::from_str::<serde_yaml::Value>(content).is_ok() {
        return Ok(ConfigFormat::Yaml);
    }

    if content.parse::<::toml::Table>().is_ok() {
        return Ok(ConfigFormat::Toml);
    }

    if looks_like_env(content) {
        return Ok(ConfigFormat::Env);
    }

    Err(DetectError::Unrecognized)
}

/// Every non-blank, non-comment line must contain `=`, and at least one
/// such line must exist.
fn looks_like_env(content: &str) -> bool {
    let mut qualifying = 0;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.contains('=') {
            qualifying += 1;
        } else {
            return false;
        }
    }

    qualifying > 0
}
