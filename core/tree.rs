//! Directory listings for the "Project Structure" section.
//!
//! The listing is cosmetic: it is embedded as opaque text and never used for
//! filtering. Hidden entries are left out, as `tree -I '.*'` would.

use crate::config::TreeMode;
use crate::error::{AppError, Result};
use log;
use std::env;
use std::path::{Component, Path, PathBuf};
use std::process::Command;
use walkdir::WalkDir;

pub trait DirectoryLister {
    fn name(&self) -> &'static str;
    fn list(&self, project_root: &Path) -> Result<String>;
}

pub fn lister_for(mode: TreeMode) -> Option<Box<dyn DirectoryLister>> {
    match mode {
        TreeMode::Native => Some(Box::new(NativeLister)),
        TreeMode::External => Some(Box::new(ExternalLister)),
        TreeMode::Off => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    name: String,
    is_dir: bool,
    children: Vec<TreeNode>,
}

/// Renders the tree in process, in the style of the `tree` command.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeLister;

impl DirectoryLister for NativeLister {
    fn name(&self) -> &'static str {
        "native"
    }

    fn list(&self, project_root: &Path) -> Result<String> {
        let mut paths = Vec::<(PathBuf, bool)>::new();
        let walker = WalkDir::new(project_root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()));
        for entry_result in walker {
            let entry = match entry_result {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("Leaving unreadable entry out of the tree listing: {}", e);
                    continue;
                }
            };
            if entry.depth() == 0 {
                continue;
            }
            if let Some(relative_path) = pathdiff::diff_paths(entry.path(), project_root) {
                paths.push((relative_path, entry.file_type().is_dir()));
            }
        }

        let nodes = build_tree_from_paths(&paths);
        let (dirs, files) = count_nodes(&nodes);
        let mut out = format!("{}\n", project_root.display());
        render_nodes(&nodes, "", &mut out);
        out.push_str(&format!(
            "\n{} {}, {} {}\n",
            dirs,
            if dirs == 1 { "directory" } else { "directories" },
            files,
            if files == 1 { "file" } else { "files" }
        ));
        Ok(out)
    }
}

/// Delegates to `tree` (or `find` when `tree` is not installed).
#[derive(Debug, Clone, Copy, Default)]
pub struct ExternalLister;

impl DirectoryLister for ExternalLister {
    fn name(&self) -> &'static str {
        "external"
    }

    fn list(&self, project_root: &Path) -> Result<String> {
        let mut command = external_command(project_root);
        let program = command.get_program().to_string_lossy().into_owned();
        log::debug!("Running tree listing command: {:?}", command);

        let output = command
            .output()
            .map_err(|e| AppError::TreeCommand(format!("Failed to run '{}': {}", program, e)))?;
        if !output.status.success() {
            return Err(AppError::TreeCommand(format!(
                "'{}' exited with {}: {}",
                program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

fn external_command(project_root: &Path) -> Command {
    if cfg!(windows) {
        let mut command = Command::new("cmd");
        command.args(["/C", "tree", "/F"]).arg(project_root);
        command
    } else if find_on_path("tree").is_some() {
        let mut command = Command::new("tree");
        command.args(["-I", ".*"]).arg(project_root);
        command
    } else {
        log::debug!("'tree' not found on PATH, falling back to 'find'");
        let mut command = Command::new("find");
        command
            .args([".", "-not", "-path", "*/.*", "-print"])
            .current_dir(project_root);
        command
    }
}

fn find_on_path(program: &str) -> Option<PathBuf> {
    let paths = env::var_os("PATH")?;
    env::split_paths(&paths)
        .map(|dir| dir.join(program))
        .find(|candidate| candidate.is_file())
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

pub fn build_tree_from_paths(relative_path_types: &[(PathBuf, bool)]) -> Vec<TreeNode> {
    let mut root_nodes: Vec<TreeNode> = Vec::new();

    for (rel_path, is_dir) in relative_path_types {
        let components: Vec<String> = rel_path
            .components()
            .filter_map(|c| match c {
                Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();

        if !components.is_empty() {
            insert_node(&mut root_nodes, &components, *is_dir);
        }
    }
    root_nodes
}

fn insert_node(current_level_nodes: &mut Vec<TreeNode>, components: &[String], is_dir_at_end: bool) {
    let Some((component_name, remaining_components)) = components.split_first() else {
        return;
    };
    let is_last_component = remaining_components.is_empty();

    let index = match current_level_nodes.binary_search_by(|node| node.name.cmp(component_name)) {
        Ok(index) => index,
        Err(insertion_point) => {
            current_level_nodes.insert(
                insertion_point,
                TreeNode {
                    name: component_name.clone(),
                    is_dir: !is_last_component || is_dir_at_end,
                    children: Vec::new(),
                },
            );
            insertion_point
        }
    };

    let node = &mut current_level_nodes[index];
    if !is_last_component || is_dir_at_end {
        node.is_dir = true;
    }
    if !is_last_component {
        insert_node(&mut node.children, remaining_components, is_dir_at_end);
    }
}

fn count_nodes(nodes: &[TreeNode]) -> (usize, usize) {
    nodes.iter().fold((0, 0), |(dirs, files), node| {
        let (child_dirs, child_files) = count_nodes(&node.children);
        if node.is_dir {
            (dirs + 1 + child_dirs, files + child_files)
        } else {
            (dirs + child_dirs, files + 1 + child_files)
        }
    })
}

fn render_nodes(nodes: &[TreeNode], prefix: &str, out: &mut String) {
    for (i, node) in nodes.iter().enumerate() {
        let is_last = i + 1 == nodes.len();
        let connector = if is_last { "└── " } else { "├── " };
        out.push_str(prefix);
        out.push_str(connector);
        out.push_str(&node.name);
        out.push('\n');
        if !node.children.is_empty() {
            let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });
            render_nodes(&node.children, &child_prefix, out);
        }
    }
}
