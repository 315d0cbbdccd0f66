use indexmap::IndexMap;
use serde::Deserialize;

use crate::types::OsClass;

/// Rule table shipped with the crate (`config/os_rules.yml`).
pub(crate) const BUILTIN_RULES: &str = include_str!("../config/os_rules.yml");

// ---------------------------------------------------------------------------
// OS rules  (config/os_rules.yml)
//
// Format: top-level mapping  class → RuleEntry
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RuleEntry {
    #[serde(default)]
    pub contains: Vec<String>,
    #[serde(default)]
    pub contains_all: Vec<Vec<String>>,
    #[serde(default)]
    pub regex: Option<String>,
}

/// Raw deserialization target for a rule file.
/// Uses IndexMap to preserve YAML insertion order (first-match-wins).
pub(crate) type RuleMap = IndexMap<OsClass, RuleEntry>;
