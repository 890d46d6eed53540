//! Gitignore-style matching over root-relative paths.
//!
//! Rules are compiled in declaration order and the last matching rule decides,
//! so a later `!pattern` re-includes whatever an earlier rule excluded. A line
//! that fails to compile is reported and dropped; it never matches anything
//! and never fails the whole rule set.

use crate::rules::RuleSet;
use ignore::Match;
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use log;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct IgnoreMatcher {
    gitignore: Gitignore,
    accepted: usize,
    rejected: usize,
}

impl IgnoreMatcher {
    pub fn compile(project_root: &Path, rule_set: &RuleSet) -> Self {
        let mut builder = GitignoreBuilder::new(project_root);
        let mut accepted = 0;
        let mut rejected = 0;

        for rule in rule_set.iter() {
            let line = rule.pattern.as_str();
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            match builder.add_line(Some(PathBuf::from(&rule.origin)), line) {
                Ok(_) => accepted += 1,
                Err(e) => {
                    log::warn!(
                        "Ignoring malformed rule \"{}\" from {}: {}",
                        line,
                        rule.origin,
                        e
                    );
                    rejected += 1;
                }
            }
        }

        let gitignore = builder.build().unwrap_or_else(|e| {
            log::warn!("Failed to build ignore matcher, no rules will apply: {}", e);
            Gitignore::empty()
        });
        log::debug!(
            "Compiled ignore matcher ({} rules, {} rejected)",
            accepted,
            rejected
        );

        Self {
            gitignore,
            accepted,
            rejected,
        }
    }

    /// A path is excluded when it or any of its parent directories is.
    pub fn matches(&self, relative_path: &Path, is_dir: bool) -> bool {
        self.gitignore
            .matched_path_or_any_parents(relative_path, is_dir)
            .is_ignore()
    }

    /// The rule that excludes the path, rendered as `pattern (origin)`.
    pub fn explain(&self, relative_path: &Path, is_dir: bool) -> Option<String> {
        match self
            .gitignore
            .matched_path_or_any_parents(relative_path, is_dir)
        {
            Match::Ignore(glob) => Some(match glob.from() {
                Some(origin) => format!("{} ({})", glob.original(), origin.display()),
                None => glob.original().to_string(),
            }),
            Match::Whitelist(_) | Match::None => None,
        }
    }

    pub fn accepted(&self) -> usize {
        self.accepted
    }

    pub fn rejected(&self) -> usize {
        self.rejected
    }
}
