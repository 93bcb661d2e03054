//! Loaded files: identity, the binary/text split, and the save path.
//!
//! A [`FileRecord`] wraps the raw bytes of one file. Text files get a
//! [`LineBuffer`]; binary files keep their bytes untouched and only support
//! load/save passthrough.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::buffer::{LineBuffer, DEFAULT_MAX_LINE_LEN};
use crate::error::EditError;

/// Decide whether raw bytes look like text.
///
/// A file is text unless more than 10% of its bytes are non-printable,
/// where non-printable means a byte value below 32 other than `\n`, `\r`,
/// or `\t`. Empty files are text.
pub fn is_text_data(data: &[u8]) -> bool {
    let threshold = data.len() / 10;
    let mut non_printable = 0usize;
    for &byte in data {
        if byte < 32 && byte != b'\n' && byte != b'\r' && byte != b'\t' {
            non_printable += 1;
            if non_printable > threshold {
                return false;
            }
        }
    }
    true
}

/// Content of a loaded file.
#[derive(Debug, Clone)]
enum Content {
    /// Raw bytes, passed through untouched on save.
    Binary(Vec<u8>),
    /// Line-split text.
    Text(LineBuffer),
}

/// A loaded file: identity plus content.
#[derive(Debug, Clone)]
pub struct FileRecord {
    name: String,
    path: PathBuf,
    size: u64,
    content: Content,
}

impl FileRecord {
    /// Load `path`, classify it as text or binary, and split text content
    /// into lines capped at [`DEFAULT_MAX_LINE_LEN`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EditError> {
        Self::load_with_max_line_len(path, DEFAULT_MAX_LINE_LEN)
    }

    /// Load with an explicit line-length cap.
    pub fn load_with_max_line_len(
        path: impl AsRef<Path>,
        max_line_len: usize,
    ) -> Result<Self, EditError> {
        let path = path.as_ref();
        let raw = fs::read(path)?;
        let size = raw.len() as u64;
        let name = path.file_name().map_or_else(
            || path.display().to_string(),
            |name| name.to_string_lossy().into_owned(),
        );
        let binary = !is_text_data(&raw);
        debug!(path = %path.display(), size, binary, "loaded file");
        let content = if binary {
            Content::Binary(raw)
        } else {
            Content::Text(LineBuffer::with_max_line_len(&raw, max_line_len))
        };
        Ok(Self {
            name,
            path: path.to_path_buf(),
            size,
            content,
        })
    }

    /// Build a record directly from bytes, for callers that already hold
    /// the file content.
    pub fn from_bytes(name: &str, path: impl Into<PathBuf>, raw: &[u8]) -> Self {
        let content = if is_text_data(raw) {
            Content::Text(LineBuffer::from_bytes(raw))
        } else {
            Content::Binary(raw.to_vec())
        };
        Self {
            name: name.to_string(),
            path: path.into(),
            size: raw.len() as u64,
            content,
        }
    }

    /// The file's base name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The path the record was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size of the file at load time, in bytes.
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// Whether the file was classified as binary.
    pub const fn is_binary(&self) -> bool {
        matches!(self.content, Content::Binary(_))
    }

    /// The line buffer of a text file.
    ///
    /// # Errors
    /// Fails with [`EditError::NotText`] for binary files.
    pub fn buffer(&self) -> Result<&LineBuffer, EditError> {
        match &self.content {
            Content::Text(buffer) => Ok(buffer),
            Content::Binary(_) => Err(EditError::NotText),
        }
    }

    /// Mutable access to the line buffer of a text file.
    ///
    /// # Errors
    /// Fails with [`EditError::NotText`] for binary files.
    pub fn buffer_mut(&mut self) -> Result<&mut LineBuffer, EditError> {
        match &mut self.content {
            Content::Text(buffer) => Ok(buffer),
            Content::Binary(_) => Err(EditError::NotText),
        }
    }

    /// Serialize current content: raw bytes untouched for binary files,
    /// rendered lines with their original terminators for text files.
    pub fn to_bytes(&self) -> Vec<u8> {
        match &self.content {
            Content::Binary(raw) => raw.clone(),
            Content::Text(buffer) => buffer.to_bytes(),
        }
    }

    /// Write current content to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), EditError> {
        let path = path.as_ref();
        fs::write(path, self.to_bytes())?;
        debug!(path = %path.display(), binary = self.is_binary(), "saved file");
        Ok(())
    }

    /// The INFO listing: identity, type, and for text files one row per
    /// line with position, byte offset, kind, and content.
    pub fn info(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "File: {}", self.name);
        let _ = writeln!(out, "Path: {}", self.path.display());
        let _ = writeln!(out, "Size: {} bytes", self.size);
        let _ = writeln!(
            out,
            "Type: {}",
            if self.is_binary() { "Binary" } else { "Text" }
        );
        if let Content::Text(buffer) = &self.content {
            let _ = writeln!(out, "Lines: {}", buffer.len());
            let mut offset = 0;
            for (position, line) in buffer.iter() {
                let _ = writeln!(
                    out,
                    "{position:>4} (@{offset:08x}): [{}] {}",
                    line.kind().label(),
                    line.text()
                );
                offset += line.rendered_len();
            }
        }
        out
    }
}
