use aho_corasick::AhoCorasick;

use crate::error::{Error, Result};
use crate::rules::{RuleEntry, RuleMap};
use crate::types::OsClass;

/// Helper: compile a rule regex case-insensitively using fancy_regex
/// (rule files may use lookaround).
pub(crate) fn compile_regex(pattern: &str) -> Result<fancy_regex::Regex> {
    Ok(fancy_regex::Regex::new(&format!("(?i){}", pattern))?)
}

// ---------------------------------------------------------------------------
// CompiledRule — one class with its substring and regex checks
// ---------------------------------------------------------------------------

pub(crate) struct CompiledRule {
    pub class: OsClass,
    /// Multi-pattern automaton over the `contains` substrings.
    any: Option<AhoCorasick>,
    /// Groups where every substring has to be present.
    all: Vec<Vec<String>>,
    regex: Option<fancy_regex::Regex>,
}

impl CompiledRule {
    fn build(class: OsClass, entry: RuleEntry) -> Result<Self> {
        let contains: Vec<String> = entry
            .contains
            .into_iter()
            .map(|s| s.to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        let any = if contains.is_empty() {
            None
        } else {
            Some(AhoCorasick::new(&contains)?)
        };

        let all = entry
            .contains_all
            .into_iter()
            .map(|group| group.into_iter().map(|s| s.to_lowercase()).collect::<Vec<_>>())
            .filter(|group| !group.is_empty())
            .collect();

        let regex = entry.regex.as_deref().map(compile_regex).transpose()?;

        Ok(Self {
            class,
            any,
            all,
            regex,
        })
    }

    /// `ua` must already be lower-cased.
    pub fn matches(&self, ua: &str) -> bool {
        if let Some(ac) = &self.any {
            if ac.is_match(ua) {
                return true;
            }
        }
        if self
            .all
            .iter()
            .any(|group| group.iter().all(|needle| ua.contains(needle.as_str())))
        {
            return true;
        }
        // A backtracking-limit error counts as no match.
        self.regex
            .as_ref()
            .map_or(false, |re| re.is_match(ua).unwrap_or(false))
    }
}

// ---------------------------------------------------------------------------
// CompiledRuleSet — ordered rules, first match wins
// ---------------------------------------------------------------------------

pub(crate) struct CompiledRuleSet {
    rules: Vec<CompiledRule>,
}

impl CompiledRuleSet {
    /// Build from a rule map, preserving its order. A rule keyed `other`
    /// is rejected: `other` is what "no rule matched" means.
    pub fn build(rules: RuleMap) -> Result<Self> {
        let rules = rules
            .into_iter()
            .map(|(class, entry)| {
                if class == OsClass::Other {
                    return Err(Error::InvalidRule(class.as_str().to_string()));
                }
                CompiledRule::build(class, entry)
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(rules = rules.len(), "compiled OS rule table");

        Ok(Self { rules })
    }

    pub fn match_first(&self, ua: &str) -> Option<OsClass> {
        self.rules
            .iter()
            .find(|rule| rule.matches(ua))
            .map(|rule| rule.class)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }
}
