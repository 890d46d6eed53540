use crate::sniff::{self, SNIFF_LEN};
use log;
use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

// Matched against the end of the lowercased file name.
const TEXT_FILE_SUFFIXES: &[&str] = &[
    ".asm", ".asp", ".aspx", ".awk", ".bat", ".c", ".cfg", ".cfm", ".cgi", ".clj", ".cls", ".cmd",
    ".coffee", ".conf", ".cpp", ".cs", ".css", ".csv", ".dart", ".diff", ".dockerfile", ".elm",
    ".erl", ".ex", ".exs", ".f", ".f90", ".f95", ".fs", ".go", ".gradle", ".groovy", ".h", ".haml",
    ".handlebars", ".hbs", ".hpp", ".hs", ".htm", ".html", ".ini", ".java", ".jl", ".js", ".json",
    ".jsp", ".jsx", ".kt", ".kts", ".less", ".log", ".lua", ".m", ".makefile", ".md", ".ml", ".mm",
    ".mod", ".nix", ".pas", ".patch", ".php", ".pl", ".pm", ".po", ".properties", ".ps", ".ps1",
    ".py", ".r", ".rb", ".rdf", ".rs", ".rst", ".rtf", ".s", ".sass", ".scala", ".sch", ".scss",
    ".sh", ".shtml", ".sql", ".svg", ".swift", ".tcl", ".tex", ".tf", ".ts", ".tsx",
    ".ttl", ".txt", ".vb", ".vba", ".vbs", ".vhdl", ".vim", ".vue", ".wasm", ".wiki", ".xhtml",
    ".xml", ".xsl", ".yaml", ".yml", ".zsh",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "detail")]
pub enum TextReason {
    /// Known text suffix, decided without touching the file.
    Extension(&'static str),
    /// Decided by sniffing the leading bytes; holds the detected MIME type.
    Sniffed(&'static str),
    /// The file could not be opened or read.
    ProbeFailed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextDecision {
    pub is_text: bool,
    pub reason: TextReason,
}

impl fmt::Display for TextReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextReason::Extension(suffix) => write!(f, "extension {}", suffix),
            TextReason::Sniffed(mime) => write!(f, "sniffed {}", mime),
            TextReason::ProbeFailed => f.write_str("unreadable"),
        }
    }
}

pub fn text_suffix(path: &Path) -> Option<&'static str> {
    let name = path.file_name()?.to_string_lossy().to_lowercase();
    TEXT_FILE_SUFFIXES
        .iter()
        .copied()
        .find(|suffix| name.ends_with(suffix))
}

pub fn classify(path: &Path) -> TextDecision {
    if let Some(suffix) = text_suffix(path) {
        return TextDecision {
            is_text: true,
            reason: TextReason::Extension(suffix),
        };
    }

    match read_head(path) {
        Ok(head) => {
            let mime = sniff::detect_content_type(&head);
            log::trace!("Sniffed {} as {}", path.display(), mime);
            TextDecision {
                is_text: sniff::top_level_type(mime) == "text",
                reason: TextReason::Sniffed(mime),
            }
        }
        Err(e) => {
            log::debug!("Could not probe {}: {}", path.display(), e);
            TextDecision {
                is_text: false,
                reason: TextReason::ProbeFailed,
            }
        }
    }
}

pub fn is_text(path: &Path) -> bool {
    classify(path).is_text
}

fn read_head(path: &Path) -> std::io::Result<Vec<u8>> {
    let file = File::open(path)?;
    let mut head = Vec::with_capacity(SNIFF_LEN);
    file.take(SNIFF_LEN as u64).read_to_end(&mut head)?;
    Ok(head)
}
