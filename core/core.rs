pub mod classify;
pub mod config;
pub mod emit;
pub mod error;
pub mod matcher;
pub mod pack;
pub mod rules;
pub mod sniff;
pub mod tree;
pub mod walk;

pub use classify::{TextDecision, TextReason, classify, is_text};
pub use config::{Config, ReadErrorPolicy, TreeMode};
pub use emit::{DocumentEmitter, clean_content};
pub use error::{AppError, Result};
pub use matcher::IgnoreMatcher;
pub use pack::{PackSummary, PlannedFile, pack_project, plan_project};
pub use rules::{RuleSet, default_rules, init_ignore_file, load_rules};
pub use tree::{DirectoryLister, ExternalLister, NativeLister, lister_for};
pub use walk::{WalkEntry, WalkStats, walk};
