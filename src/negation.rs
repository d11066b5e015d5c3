//! Inference of an action's opposite ("undo") action.
//!
//! Explicit negatives always win. Otherwise the name is matched against the
//! prefix table, then the postfix table, and the first candidate that names a
//! registered action is memoized in both directions.

use std::collections::HashMap;

use crate::types::{AffixRule, AffixRules};

#[derive(Debug, Clone)]
pub struct NegationResolver {
    affixes: AffixRules,
    negatives: HashMap<String, String>,
    affix_searches: usize,
}

impl NegationResolver {
    #[must_use]
    pub fn new(affixes: AffixRules) -> Self {
        Self {
            affixes,
            negatives: HashMap::new(),
            affix_searches: 0,
        }
    }

    /// Declare `negative` as the opposite of `action`, in both directions.
    pub fn register(&mut self, action: &str, negative: &str) {
        self.negatives.insert(action.to_owned(), negative.to_owned());
        self.negatives.insert(negative.to_owned(), action.to_owned());
    }

    /// The explicitly registered or memoized negative of `action`.
    #[must_use]
    pub fn known(&self, action: &str) -> Option<&str> {
        self.negatives
            .get(action)
            .map(String::as_str)
            .filter(|n| !n.is_empty())
    }

    /// Resolve the negative of `action`. `exists` tells whether a candidate
    /// name is a registered action.
    pub fn resolve(&mut self, action: &str, exists: impl Fn(&str) -> bool) -> Option<String> {
        if let Some(negative) = self.known(action) {
            return Some(negative.to_owned());
        }

        self.affix_searches += 1;
        let found = search(self.affixes.prefixes(), action, &exists, prefix_candidates)
            .or_else(|| search(self.affixes.postfixes(), action, &exists, postfix_candidates));

        match &found {
            Some(negative) => {
                tracing::trace!(action, negative = negative.as_str(), "negative inferred");
                self.register(action, negative);
            }
            None => tracing::debug!(action, "no negative found"),
        }
        found
    }

    /// Number of resolutions that had to search the affix tables.
    #[must_use]
    pub fn affix_searches(&self) -> usize {
        self.affix_searches
    }
}

/// Try every rule in both directions; the first existing candidate wins.
fn search(
    rules: &[AffixRule],
    action: &str,
    exists: &impl Fn(&str) -> bool,
    candidates: fn(&str, &str, &str) -> Option<[String; 2]>,
) -> Option<String> {
    rules.iter().find_map(|rule| {
        [
            (rule.affix.as_str(), rule.negative.as_str()),
            (rule.negative.as_str(), rule.affix.as_str()),
        ]
        .into_iter()
        .find_map(|(affix, opposite)| {
            candidates(action, affix, opposite)?
                .into_iter()
                .find(|candidate| exists(candidate.as_str()))
        })
    })
}

/// `addClass` with `add → remove` gives `removeclass`, `removeClass`.
fn prefix_candidates(action: &str, prefix: &str, opposite: &str) -> Option<[String; 2]> {
    let rest = action.strip_prefix(prefix)?;
    Some([
        format!("{opposite}{}", lcfirst(rest)),
        format!("{opposite}{}", ucfirst(rest)),
    ])
}

/// `fadeIn` with `in → out` gives `fadeout`, `fadeOut`. The suffix's first
/// letter is compared case-insensitively; an empty postfix never matches.
fn postfix_candidates(action: &str, postfix: &str, opposite: &str) -> Option<[String; 2]> {
    if postfix.is_empty() || action.len() < postfix.len() {
        return None;
    }
    let split = action.len() - postfix.len();
    if !action.is_char_boundary(split) {
        return None;
    }
    let (stem, suffix) = action.split_at(split);
    if lcfirst(suffix) != lcfirst(postfix) {
        return None;
    }
    Some([
        format!("{stem}{}", lcfirst(opposite)),
        format!("{stem}{}", ucfirst(opposite)),
    ])
}

pub(crate) fn lcfirst(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub(crate) fn ucfirst(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
