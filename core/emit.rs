use std::io::{self, BufWriter, Write};

pub const TREE_HEADER: &str = "### Project Structure";
const FENCE: &str = "```";

/// Drops every byte outside printable ASCII (32..=126).
pub fn clean_content(content: &[u8]) -> Vec<u8> {
    content
        .iter()
        .copied()
        .filter(|b| (32..=126).contains(b))
        .collect()
}

/// Append-only writer for the output document.
///
/// Output is buffered. `finish` flushes and surfaces write errors; when the
/// emitter is dropped early (an error path) the buffer is still flushed on a
/// best-effort basis, so everything emitted so far reaches the sink.
pub struct DocumentEmitter<W: Write> {
    writer: BufWriter<W>,
    bytes_written: u64,
}

impl<W: Write> DocumentEmitter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: BufWriter::new(sink),
            bytes_written: 0,
        }
    }

    pub fn emit_tree(&mut self, listing: &str) -> io::Result<()> {
        writeln!(self.writer, "{}", TREE_HEADER)?;
        for line in listing.lines().filter(|l| !l.trim().is_empty()) {
            writeln!(self.writer, "- {}", line)?;
        }
        self.writer.write_all(b"\n\n")?;
        Ok(())
    }

    pub fn emit_file(&mut self, header_path: &str, content: &[u8]) -> io::Result<()> {
        let cleaned = clean_content(content);
        writeln!(self.writer, "### {}", header_path)?;
        writeln!(self.writer, "{}", FENCE)?;
        self.writer.write_all(&cleaned)?;
        write!(self.writer, "\n{}\n\n", FENCE)?;
        self.bytes_written += cleaned.len() as u64;
        Ok(())
    }

    /// Cleaned content bytes emitted so far, excluding headers and fences.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn finish(self) -> io::Result<W> {
        self.writer.into_inner().map_err(|e| e.into_error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_drops_non_printable() {
        assert_eq!(clean_content(b"a\tb\r\nc\x00d~\x7f"), b"abcd~".to_vec());
        assert_eq!(clean_content("caf\u{e9} ok".as_bytes()), b"caf ok".to_vec());
    }

    #[test]
    fn test_clean_is_idempotent_and_printable() {
        let input: Vec<u8> = (0u8..=255).collect();
        let once = clean_content(&input);
        assert_eq!(clean_content(&once), once);
        assert!(once.iter().all(|b| (32..=126).contains(b)));
        assert_eq!(once.len(), 95);
    }

    #[test]
    fn test_emit_tree_prefixes_lines() {
        let mut emitter = DocumentEmitter::new(Vec::new());
        emitter.emit_tree("root\n├── a\n\n   \n└── b\n").unwrap();
        let out = String::from_utf8(emitter.finish().unwrap()).unwrap();
        assert_eq!(out, "### Project Structure\n- root\n- ├── a\n- └── b\n\n\n");
    }

    #[test]
    fn test_emit_file_wraps_cleaned_content() {
        let mut emitter = DocumentEmitter::new(Vec::new());
        emitter.emit_file("src/main.rs", b"fn main() {}\n").unwrap();
        emitter.emit_file("b.txt", b"x\x00y").unwrap();
        assert_eq!(emitter.bytes_written(), 14);
        let out = String::from_utf8(emitter.finish().unwrap()).unwrap();
        assert_eq!(
            out,
            "### src/main.rs\n```\nfn main() {}\n```\n\n### b.txt\n```\nxy\n```\n\n"
        );
    }

    #[test]
    fn test_drop_flushes_buffered_output() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("out.md");
        {
            let file = std::fs::File::create(&path).unwrap();
            let mut emitter = DocumentEmitter::new(file);
            emitter.emit_file("a", b"partial").unwrap();
        }
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("partial"));
    }
}
