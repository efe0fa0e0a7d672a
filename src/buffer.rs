//! Buffer representation - the lines of an open document and where it came from

use std::fs;
use std::path::{Component, Path, PathBuf};

/// An open document
#[derive(Debug)]
pub struct Buffer {
    /// Lines of text, without terminators
    lines: Vec<String>,
    /// Associated file on disk (None for in-memory buffers)
    filename: Option<PathBuf>,
    /// Path used for configuration scoping, `/`-separated
    path: String,
}

impl Buffer {
    /// Create a buffer from text, addressed by a relative path
    pub fn from_text(path: &str, text: &str) -> Self {
        Self {
            lines: split_lines(text),
            filename: None,
            path: path.replace('\\', "/"),
        }
    }

    /// Create a buffer from file contents
    ///
    /// The scoping path is taken relative to `root` when the file lies
    /// inside it. Invalid UTF-8 is replaced, not rejected.
    pub fn from_file(path: &Path, root: Option<&Path>) -> std::io::Result<Self> {
        Ok(Self {
            lines: read_lines(path)?,
            filename: Some(path.to_path_buf()),
            path: relative_path(path, root),
        })
    }

    /// Re-read the file backing this buffer
    ///
    /// Returns true if the text changed. In-memory buffers never change.
    pub fn reload(&mut self) -> std::io::Result<bool> {
        let Some(filename) = &self.filename else {
            return Ok(false);
        };

        let lines = read_lines(filename)?;
        if lines == self.lines {
            return Ok(false);
        }
        self.lines = lines;
        Ok(true)
    }

    /// Replace the whole text
    pub fn set_text(&mut self, text: &str) {
        self.lines = split_lines(text);
    }

    /// Get filename if set
    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    /// Get the scoping path
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Get number of lines
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Get a line by index
    pub fn line(&self, idx: usize) -> Option<&str> {
        self.lines.get(idx).map(String::as_str)
    }
}

fn read_lines(path: &Path) -> std::io::Result<Vec<String>> {
    let bytes = fs::read(path)?;
    Ok(split_lines(&String::from_utf8_lossy(&bytes)))
}

// Always at least one line, like an editor shows an empty document.
fn split_lines(text: &str) -> Vec<String> {
    let lines: Vec<String> = text.lines().map(str::to_string).collect();
    if lines.is_empty() {
        vec![String::new()]
    } else {
        lines
    }
}

/// `/`-separated path of `path` relative to `root` (or as given)
pub fn relative_path(path: &Path, root: Option<&Path>) -> String {
    let relative = root
        .and_then(|root| path.strip_prefix(root).ok())
        .unwrap_or(path);

    let parts: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            _ => None,
        })
        .collect();
    parts.join("/")
}
