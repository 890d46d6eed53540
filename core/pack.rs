use crate::classify::{self, TextDecision};
use crate::config::{Config, ReadErrorPolicy};
use crate::emit::DocumentEmitter;
use crate::error::{AppError, Result};
use crate::matcher::IgnoreMatcher;
use crate::rules;
use crate::tree;
use crate::walk::{self, WalkEntry};
use log;
use serde::Serialize;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackSummary {
    pub output_path: PathBuf,
    pub ignore_file_created: bool,
    pub tree_lister: Option<&'static str>,
    pub rules_loaded: usize,
    pub rules_rejected: usize,
    pub files_included: usize,
    pub files_not_text: usize,
    pub files_too_large: usize,
    pub files_unreadable: usize,
    pub files_ignored: usize,
    pub dirs_pruned: usize,
    pub bytes_written: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedFile {
    pub path: String,
    pub size: u64,
    pub included: bool,
    pub too_large: bool,
    pub decision: TextDecision,
}

fn header_path(entry: &WalkEntry, relative: bool) -> String {
    if relative {
        entry.relative_path.to_string_lossy().replace('\\', "/")
    } else {
        entry.path.display().to_string()
    }
}

fn compile_matcher(project_root: &Path, config: &Config) -> Result<IgnoreMatcher> {
    let rule_set = rules::load_rules(project_root, config)?;
    Ok(IgnoreMatcher::compile(project_root, &rule_set))
}

/// Writes the tree listing and every included text file into the configured
/// output file.
pub fn pack_project(project_root: &Path, config: &Config) -> Result<PackSummary> {
    let max_file_size = config.get_max_file_size()?;
    let output_path = config.output_path(project_root);
    let mut summary = PackSummary {
        output_path: output_path.clone(),
        ..PackSummary::default()
    };

    if config.general.generate_ignore_file {
        summary.ignore_file_created = rules::init_ignore_file(project_root, config)?;
    }

    let write_err = |e: std::io::Error| AppError::FileWrite {
        path: output_path.clone(),
        source: e,
    };
    let output_file = File::create(&output_path).map_err(write_err)?;
    let mut emitter = DocumentEmitter::new(output_file);

    if let Some(lister) = tree::lister_for(config.tree.mode) {
        log::debug!("Listing directory tree with the {} lister", lister.name());
        let listing = lister.list(project_root)?;
        emitter.emit_tree(&listing).map_err(write_err)?;
        summary.tree_lister = Some(lister.name());
    }

    let matcher = compile_matcher(project_root, config)?;
    summary.rules_loaded = matcher.accepted();
    summary.rules_rejected = matcher.rejected();

    let walk_stats = walk::walk(project_root, &matcher, |entry| {
        if entry.path == output_path {
            log::debug!("Skipping the output file itself: {}", entry.path.display());
            return Ok(());
        }
        if max_file_size.is_some_and(|max| entry.size > max) {
            log::warn!(
                "Skipping {} ({} bytes exceeds the size limit)",
                entry.relative_path.display(),
                entry.size
            );
            summary.files_too_large += 1;
            return Ok(());
        }

        let decision = classify::classify(&entry.path);
        if !decision.is_text {
            log::debug!(
                "Skipping non-text file {} ({})",
                entry.relative_path.display(),
                decision.reason
            );
            summary.files_not_text += 1;
            return Ok(());
        }

        let content = match fs::read(&entry.path) {
            Ok(content) => content,
            Err(e) => match config.files.on_read_error {
                ReadErrorPolicy::Skip => {
                    log::warn!("Skipping unreadable file {}: {}", entry.path.display(), e);
                    summary.files_unreadable += 1;
                    return Ok(());
                }
                ReadErrorPolicy::Abort => {
                    return Err(AppError::FileRead {
                        path: entry.path.clone(),
                        source: e,
                    });
                }
            },
        };

        log::trace!("Emitting {}", entry.relative_path.display());
        emitter
            .emit_file(&header_path(entry, config.output.relative_paths), &content)
            .map_err(write_err)?;
        summary.files_included += 1;
        Ok(())
    })?;

    summary.files_ignored = walk_stats.files_ignored;
    summary.dirs_pruned = walk_stats.dirs_pruned;
    summary.bytes_written = emitter.bytes_written();
    emitter.finish().map_err(write_err)?;

    log::info!(
        "Packed {} files into {}",
        summary.files_included,
        output_path.display()
    );
    Ok(summary)
}

/// Runs the filters without writing anything, reporting what `pack_project`
/// would do with each file that survives the ignore rules.
pub fn plan_project(project_root: &Path, config: &Config) -> Result<Vec<PlannedFile>> {
    let max_file_size = config.get_max_file_size()?;
    let output_path = config.output_path(project_root);
    let matcher = compile_matcher(project_root, config)?;

    let mut planned = Vec::new();
    walk::walk(project_root, &matcher, |entry| {
        if entry.path == output_path {
            return Ok(());
        }
        let too_large = max_file_size.is_some_and(|max| entry.size > max);
        let decision = classify::classify(&entry.path);
        planned.push(PlannedFile {
            path: entry.relative_path.to_string_lossy().replace('\\', "/"),
            size: entry.size,
            included: decision.is_text && !too_large,
            too_large,
            decision,
        });
        Ok(())
    })?;
    Ok(planned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TreeMode;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str, content: &[u8]) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn quiet_config() -> Config {
        let mut config = Config::default();
        config.tree.mode = TreeMode::Off;
        config.output.relative_paths = true;
        config
    }

    fn headers(output: &str) -> Vec<&str> {
        output
            .lines()
            .filter_map(|l| l.strip_prefix("### "))
            .collect()
    }

    fn sample_project() -> TempDir {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "src/main.rs", b"fn main() {}\n");
        touch(dir.path(), "src/data.bin", b"\x00\x01\x02binary");
        touch(dir.path(), "node_modules/pkg/index.js", b"module.exports = 1;\n");
        touch(dir.path(), "notes", b"plain text notes\n");
        touch(dir.path(), "debug.log", b"noise\n");
        dir
    }

    #[test]
    fn test_pack_emits_only_included_text_files() {
        let dir = sample_project();
        let config = quiet_config();
        let summary = pack_project(dir.path(), &config).unwrap();

        let output = fs::read_to_string(dir.path().join("codebase.md")).unwrap();
        assert_eq!(headers(&output), vec!["notes", "src/main.rs"]);
        assert!(output.contains("```\nfn main() {}\n```\n\n"));
        assert!(!output.contains("module.exports"));

        assert!(summary.ignore_file_created);
        assert_eq!(summary.files_included, 2);
        assert_eq!(summary.files_not_text, 1);
        assert!(summary.dirs_pruned >= 1);
        assert!(summary.files_ignored >= 1);
        assert!(dir.path().join(".cpignore").exists());
    }

    #[test]
    fn test_pack_is_idempotent() {
        let dir = sample_project();
        let mut config = quiet_config();
        config.tree.mode = TreeMode::Native;
        config.output.relative_paths = false;

        pack_project(dir.path(), &config).unwrap();
        let first = fs::read(dir.path().join("codebase.md")).unwrap();
        let first_plan = plan_project(dir.path(), &config).unwrap();
        pack_project(dir.path(), &config).unwrap();
        let second = fs::read(dir.path().join("codebase.md")).unwrap();
        assert_eq!(first, second);
        assert_eq!(first_plan, plan_project(dir.path(), &config).unwrap());
    }

    #[test]
    fn test_tree_section_precedes_files() {
        let dir = sample_project();
        let mut config = quiet_config();
        config.tree.mode = TreeMode::Native;
        let summary = pack_project(dir.path(), &config).unwrap();

        let output = fs::read_to_string(dir.path().join("codebase.md")).unwrap();
        assert!(output.starts_with("### Project Structure\n- "));
        assert!(output.contains("- └── src\n") || output.contains("- ├── src\n"));
        assert_eq!(summary.tree_lister, Some("native"));
    }

    #[test]
    fn test_user_gitignore_can_reinclude_defaults() {
        let dir = sample_project();
        touch(dir.path(), ".gitignore", b"!debug.log\n");
        let config = quiet_config();
        pack_project(dir.path(), &config).unwrap();

        let output = fs::read_to_string(dir.path().join("codebase.md")).unwrap();
        assert!(headers(&output).contains(&"debug.log"));
    }

    #[test]
    fn test_output_file_never_packs_itself() {
        let dir = sample_project();
        let mut config = quiet_config();
        config.general.enable_builtin_rules = false;
        config.general.generate_ignore_file = false;
        pack_project(dir.path(), &config).unwrap();
        pack_project(dir.path(), &config).unwrap();

        let output = fs::read_to_string(dir.path().join("codebase.md")).unwrap();
        assert!(!headers(&output).contains(&"codebase.md"));
        assert!(headers(&output).contains(&"node_modules/pkg/index.js"));
    }

    #[test]
    fn test_max_file_size_skips_large_files() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "small.txt", b"tiny");
        touch(dir.path(), "big.txt", &[b'a'; 4096]);
        let mut config = quiet_config();
        config.files.max_file_size = Some("1KB".to_string());
        let summary = pack_project(dir.path(), &config).unwrap();

        let output = fs::read_to_string(dir.path().join("codebase.md")).unwrap();
        assert_eq!(headers(&output), vec!["small.txt"]);
        assert_eq!(summary.files_too_large, 1);
    }

    #[test]
    fn test_unwritable_output_is_an_error() {
        let dir = sample_project();
        let mut config = quiet_config();
        config.output.file = dir.path().join("missing-dir").join("out.md");
        let result = pack_project(dir.path(), &config);
        assert!(matches!(result, Err(AppError::FileWrite { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_read_error_policy() {
        use std::os::unix::fs::symlink;

        let dir = TempDir::new().unwrap();
        touch(dir.path(), "ok.txt", b"fine");
        // A dangling link has a text suffix, so it reaches the read step.
        symlink(dir.path().join("nowhere"), dir.path().join("broken.txt")).unwrap();

        let mut config = quiet_config();
        let summary = pack_project(dir.path(), &config).unwrap();
        assert_eq!(summary.files_unreadable, 1);
        assert_eq!(summary.files_included, 1);

        config.files.on_read_error = ReadErrorPolicy::Abort;
        let result = pack_project(dir.path(), &config);
        assert!(matches!(result, Err(AppError::FileRead { .. })));
    }

    #[test]
    fn test_plan_reports_decisions_without_writing() {
        let dir = sample_project();
        let config = quiet_config();
        let plan = plan_project(dir.path(), &config).unwrap();

        let included: Vec<&str> = plan
            .iter()
            .filter(|p| p.included)
            .map(|p| p.path.as_str())
            .collect();
        assert_eq!(included, vec!["notes", "src/main.rs"]);
        assert!(plan.iter().any(|p| p.path == "src/data.bin" && !p.included));
        assert!(!dir.path().join("codebase.md").exists());
        assert!(!dir.path().join(".cpignore").exists());
    }
}
