use crate::config::{Config, GITIGNORE_FILE};
use crate::error::{AppError, Result};
use log;
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

pub const BUILTIN_ORIGIN: &str = "<builtin>";

#[derive(Debug, Deserialize)]
pub struct RuleCategory {
    pub name: String,
    pub rules: Vec<String>,
}

static DEFAULT_RULE_CATEGORIES: Lazy<Vec<RuleCategory>> = Lazy::new(|| {
    let yaml_content = include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../data/default_rules.yaml"
    ));
    serde_yml::from_str(yaml_content).expect("Failed to parse embedded data/default_rules.yaml")
});

pub fn get_default_rule_categories() -> &'static [RuleCategory] {
    &DEFAULT_RULE_CATEGORIES
}

/// One ignore line together with the file it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub origin: String,
    pub pattern: String,
}

/// Ordered ignore rules. Later rules win over earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_patterns<I, S>(origin: &str, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::new();
        set.extend(origin, patterns);
        set
    }

    pub fn extend<I, S>(&mut self, origin: &str, patterns: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rules.extend(patterns.into_iter().map(|p| Rule {
            origin: origin.to_string(),
            pattern: p.into(),
        }));
    }

    pub fn extend_from_text(&mut self, origin: &str, text: &str) {
        self.extend(origin, text.lines());
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Built-in deny-list followed by the tool's own files.
pub fn default_rules(output_rule: &str, ignore_file_name: &str) -> Vec<String> {
    get_default_rule_categories()
        .iter()
        .flat_map(|category| category.rules.iter().cloned())
        .chain([output_rule.to_string(), ignore_file_name.to_string()])
        .collect()
}

fn render_ignore_file(config: &Config, project_root: &Path) -> String {
    let mut content = String::new();
    content.push_str("# Rules for codepack, in .gitignore syntax.\n");
    content.push_str("# Delete a line to include what it matches, or add '!pattern' to re-include.\n");

    if config.general.enable_builtin_rules {
        for category in get_default_rule_categories() {
            content.push_str(&format!("\n# {}\n", category.name));
            for rule in &category.rules {
                content.push_str(rule);
                content.push('\n');
            }
        }
    }

    content.push_str("\n# Files written by codepack itself\n");
    content.push_str(&config.output_rule(project_root));
    content.push('\n');
    content.push_str(&config.general.ignore_file);
    content.push('\n');
    content
}

/// Writes the ignore file with the default rules unless it already exists.
/// Returns whether a new file was created.
pub fn init_ignore_file(project_root: &Path, config: &Config) -> Result<bool> {
    let ignore_path = config.ignore_file_path(project_root);
    match fs::metadata(&ignore_path) {
        Ok(_) => {
            log::debug!("Ignore file already present: {}", ignore_path.display());
            return Ok(false);
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => {
            return Err(AppError::FileRead {
                path: ignore_path,
                source: e,
            });
        }
    }

    let content = render_ignore_file(config, project_root);
    fs::write(&ignore_path, content).map_err(|e| AppError::FileWrite {
        path: ignore_path.clone(),
        source: e,
    })?;
    log::info!("Created default ignore file: {}", ignore_path.display());
    Ok(true)
}

fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(AppError::FileRead {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Default rules first (the ignore file, or the built-in list when the file
/// is missing), then `.gitignore`.
pub fn load_rules(project_root: &Path, config: &Config) -> Result<RuleSet> {
    let mut rule_set = RuleSet::new();

    let ignore_path = config.ignore_file_path(project_root);
    match read_optional(&ignore_path)? {
        Some(content) => {
            log::debug!("Loading ignore rules from {}", ignore_path.display());
            rule_set.extend_from_text(&config.general.ignore_file, &content);
        }
        None if config.general.enable_builtin_rules => {
            log::debug!(
                "No {} found, using built-in default rules",
                config.general.ignore_file
            );
            rule_set.extend(
                BUILTIN_ORIGIN,
                default_rules(
                    &config.output_rule(project_root),
                    &config.general.ignore_file,
                ),
            );
        }
        None => log::debug!("No {} found and built-in rules disabled", config.general.ignore_file),
    }

    if config.general.use_gitignore {
        let gitignore_path = project_root.join(GITIGNORE_FILE);
        if let Some(content) = read_optional(&gitignore_path)? {
            log::debug!("Loading ignore rules from {}", gitignore_path.display());
            rule_set.extend_from_text(GITIGNORE_FILE, &content);
        }
    }

    log::debug!("Loaded {} ignore rule lines", rule_set.len());
    Ok(rule_set)
}
