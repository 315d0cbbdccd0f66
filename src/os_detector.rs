use std::path::Path;
use std::sync::LazyLock;

use super::error::Result;
use super::matcher::CompiledRuleSet;
use super::rules::{RuleMap, BUILTIN_RULES};
use super::types::*;

/// Classifies User-Agent signals into [`OsClass`] with an ordered rule table.
pub struct OsDetector {
    rules: CompiledRuleSet,
}

impl OsDetector {
    /// Build the detector from the built-in rule table.
    pub fn new() -> Result<Self> {
        Self::from_yaml_str(BUILTIN_RULES)
    }

    /// Load a rule table from a YAML file.
    ///
    /// See `config/os_rules.yml` for the format. Rule order in the file is
    /// precedence.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let rules: RuleMap = load_yaml(path)?;
        let detector = Self::from_rules(rules)?;
        tracing::info!(
            path = %path.display(),
            rules = detector.rule_count(),
            "loaded OS rule table"
        );
        Ok(detector)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let rules: RuleMap = serde_yaml::from_str(yaml)?;
        Self::from_rules(rules)
    }

    fn from_rules(rules: RuleMap) -> Result<Self> {
        Ok(Self {
            rules: CompiledRuleSet::build(rules)?,
        })
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Classify a User-Agent signal.
    ///
    /// Accepts a string, several header values, or nothing at all. Never
    /// fails: anything no rule recognizes is [`OsClass::Other`].
    pub fn detect(&self, ua: impl Into<UaSignal>) -> OsClass {
        let signal = ua.into();
        if signal.is_empty() {
            return OsClass::Other;
        }
        let class = self
            .rules
            .match_first(signal.as_str())
            .unwrap_or(OsClass::Other);
        tracing::debug!(os = %class, "classified user agent");
        class
    }
}

static DEFAULT_DETECTOR: LazyLock<Option<OsDetector>> = LazyLock::new(|| match OsDetector::new() {
    Ok(detector) => Some(detector),
    Err(e) => {
        tracing::error!(error = %e, "built-in OS rule table failed to compile");
        None
    }
});

/// Classify with the built-in rule table.
pub fn detect(ua: impl Into<UaSignal>) -> OsClass {
    match DEFAULT_DETECTOR.as_ref() {
        Some(detector) => detector.detect(ua),
        None => OsClass::Other,
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&content)?)
}
