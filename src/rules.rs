use crate::client::TagMask;
use serde::Deserialize;

/// Matches newly managed windows by class, instance and title substrings.
/// Absent patterns match everything.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Rule {
    pub class: Option<String>,
    pub instance: Option<String>,
    pub title: Option<String>,
    pub tags: TagMask,
    pub is_floating: bool,
    pub is_global: bool,
    pub is_no_border: bool,
    pub monitor: Option<usize>,
}

impl Rule {
    pub fn matches(&self, class: &str, instance: &str, title: &str) -> bool {
        let pattern_matches = |pattern: &Option<String>, candidate: &str| {
            pattern
                .as_deref()
                .is_none_or(|pattern| candidate.contains(pattern))
        };

        pattern_matches(&self.title, title)
            && pattern_matches(&self.class, class)
            && pattern_matches(&self.instance, instance)
    }
}

/// Combined effect of every rule that matched a window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleOutcome {
    pub tags: TagMask,
    pub is_floating: bool,
    pub is_global: bool,
    pub is_no_border: bool,
    pub is_scratchpad: bool,
    pub monitor: Option<usize>,
}

/// Applies `rules` in order. Flags and the monitor follow the last matching
/// rule while tag masks accumulate. A window titled exactly
/// `scratchpad_name` becomes the global scratchpad whatever the rules say.
pub fn apply_rules(
    rules: &[Rule],
    class: &str,
    instance: &str,
    title: &str,
    scratchpad_name: &str,
) -> RuleOutcome {
    let mut outcome = RuleOutcome::default();

    for rule in rules.iter().filter(|rule| rule.matches(class, instance, title)) {
        outcome.is_floating = rule.is_floating;
        outcome.is_global = rule.is_global;
        outcome.is_no_border = rule.is_no_border;
        outcome.tags |= rule.tags;
        if rule.monitor.is_some() {
            outcome.monitor = rule.monitor;
        }
    }

    if title == scratchpad_name {
        outcome.is_scratchpad = true;
        outcome.is_global = true;
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(class: Option<&str>, title: Option<&str>, tags: TagMask, is_floating: bool) -> Rule {
        Rule {
            class: class.map(String::from),
            title: title.map(String::from),
            tags,
            is_floating,
            ..Rule::default()
        }
    }

    #[test]
    fn patterns_match_as_substrings() {
        let rule = rule(Some("fire"), None, 0, false);
        assert!(rule.matches("Firefox firefox", "Navigator", "Mozilla"));
        assert!(!rule.matches("Chromium", "chromium", "fire"));
    }

    #[test]
    fn tags_accumulate_and_last_flag_wins() {
        let rules = vec![
            rule(Some("term"), None, 1 << 1, true),
            rule(None, Some("vim"), 1 << 3, false),
        ];
        let outcome = apply_rules(&rules, "xterm", "xterm", "vim notes.md", "scratchpad");
        assert_eq!(outcome.tags, (1 << 1) | (1 << 3));
        assert!(!outcome.is_floating);
    }

    #[test]
    fn no_match_leaves_tags_empty() {
        let rules = vec![rule(Some("Gimp"), None, 1 << 4, true)];
        let outcome = apply_rules(&rules, "st", "st-256color", "zsh", "scratchpad");
        assert_eq!(outcome, RuleOutcome::default());
    }

    #[test]
    fn scratchpad_title_forces_global() {
        let outcome = apply_rules(&[], "st", "st", "scratchpad", "scratchpad");
        assert!(outcome.is_scratchpad);
        assert!(outcome.is_global);

        let outcome = apply_rules(&[], "st", "st", "scratchpad 2", "scratchpad");
        assert!(!outcome.is_scratchpad);
    }

    #[test]
    fn monitor_comes_from_the_last_rule_naming_one() {
        let rules = vec![
            Rule {
                monitor: Some(1),
                ..Rule::default()
            },
            Rule::default(),
        ];
        assert_eq!(apply_rules(&rules, "a", "b", "c", "s").monitor, Some(1));
    }
}
