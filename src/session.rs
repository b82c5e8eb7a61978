//! Editor state - bounded in-memory files and the session that owns them
//!
//! Every file lives in a fixed number of slots. Slots are only ever appended,
//! never reused or removed; the session ends with the process.

use crate::error::SessionError;
use std::fs;
use std::path::{Path, PathBuf};

/// Default number of file slots
pub const DEFAULT_MAX_FILES: usize = 10;
/// Default buffer capacity, counting one reserved terminator slot
pub const DEFAULT_BUFFER_CAPACITY: usize = 1024;
/// Longest accepted file name in bytes
pub const MAX_NAME_LEN: usize = 255;

/// Single-line ASCII text with a hard length limit.
///
/// `capacity` follows the C layout of a terminated char array, so a buffer of
/// capacity N holds at most N - 1 characters.
#[derive(Clone, Debug)]
pub struct TextBuffer {
    text: String,
    limit: usize,
}

impl TextBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        let limit = capacity.saturating_sub(1);
        Self {
            text: String::with_capacity(limit),
            limit,
        }
    }

    /// Append one character. Returns false when full or the character isn't ASCII.
    pub fn push(&mut self, ch: char) -> bool {
        if self.is_full() || !ch.is_ascii() || ch == '\n' {
            return false;
        }
        self.text.push(ch);
        true
    }

    /// Remove the last character, if any
    pub fn pop(&mut self) -> Option<char> {
        self.text.pop()
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.text.len() >= self.limit
    }

    /// Maximum number of characters this buffer accepts
    pub fn limit(&self) -> usize {
        self.limit
    }
}

/// One in-memory document
#[derive(Clone, Debug)]
pub struct SourceFile {
    name: String,
    buffer: TextBuffer,
    modified: bool,
}

impl SourceFile {
    fn new(name: &str, capacity: usize) -> Self {
        Self {
            name: name.to_string(),
            buffer: TextBuffer::with_capacity(capacity),
            modified: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        self.buffer.as_str()
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Empty the buffer and forget about unsaved edits
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.modified = false;
    }

    /// Append a character, marking the file modified on success
    pub fn insert_char(&mut self, ch: char) -> bool {
        let inserted = self.buffer.push(ch);
        if inserted {
            self.modified = true;
        }
        inserted
    }

    /// Remove the last character, marking the file modified on success
    pub fn backspace(&mut self) -> bool {
        let removed = self.buffer.pop().is_some();
        if removed {
            self.modified = true;
        }
        removed
    }

    /// Write the buffer verbatim to `dir/name`, replacing existing content.
    /// The modified flag is only cleared once the write succeeds.
    pub fn save_to(&mut self, dir: &Path) -> Result<PathBuf, SessionError> {
        let path = dir.join(&self.name);
        fs::write(&path, self.buffer.as_str()).map_err(|source| SessionError::Save {
            path: path.clone(),
            source,
        })?;
        self.modified = false;
        Ok(path)
    }
}

/// Process-wide editor state, passed by reference through input and rendering
#[derive(Debug)]
pub struct EditorSession {
    files: Vec<SourceFile>,
    max_files: usize,
    buffer_capacity: usize,
    current: Option<usize>,
    root: PathBuf,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FILES, DEFAULT_BUFFER_CAPACITY)
    }
}

impl EditorSession {
    /// Empty session saving into the working directory
    pub fn new(max_files: usize, buffer_capacity: usize) -> Self {
        Self {
            files: Vec::with_capacity(max_files),
            max_files,
            buffer_capacity,
            current: None,
            root: PathBuf::from("."),
        }
    }

    /// Resolve save paths against `root` instead of the working directory
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Append a fresh, empty file and make it current
    pub fn open_new_file(&mut self, name: &str) -> Result<usize, SessionError> {
        if self.is_full() {
            tracing::warn!(name, max = self.max_files, "cannot open more files, limit reached");
            return Err(SessionError::CapacityExceeded {
                max: self.max_files,
            });
        }
        if name.len() > MAX_NAME_LEN {
            tracing::warn!(len = name.len(), "file name too long");
            return Err(SessionError::NameTooLong {
                len: name.len(),
                max: MAX_NAME_LEN,
            });
        }

        let index = self.files.len();
        self.files.push(SourceFile::new(name, self.buffer_capacity));
        self.current = Some(index);
        tracing::info!(name, index, "opened new file");
        Ok(index)
    }

    /// Save the active file into the session root
    pub fn save_current_file(&mut self) -> Result<PathBuf, SessionError> {
        let root = self.root.clone();
        let file = self.current_file_mut().ok_or(SessionError::NoActiveFile)?;
        match file.save_to(&root) {
            Ok(path) => {
                tracing::info!(path = %path.display(), "saved file");
                Ok(path)
            }
            Err(err) => {
                tracing::warn!(%err, "save failed");
                Err(err)
            }
        }
    }

    /// Make slot `index` current. Returns true if the active file changed.
    pub fn switch_to(&mut self, index: usize) -> bool {
        if index >= self.files.len() || self.current == Some(index) {
            return false;
        }
        self.current = Some(index);
        tracing::info!(name = self.files[index].name(), index, "switched file");
        true
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_file(&self) -> Option<&SourceFile> {
        self.current.and_then(|i| self.files.get(i))
    }

    pub fn current_file_mut(&mut self) -> Option<&mut SourceFile> {
        self.current.and_then(move |i| self.files.get_mut(i))
    }

    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    pub fn get(&self, index: usize) -> Option<&SourceFile> {
        self.files.get(index)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.files.len() >= self.max_files
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_keeps_room_for_terminator() {
        let mut buffer = TextBuffer::with_capacity(4);
        assert_eq!(buffer.limit(), 3);
        assert!(buffer.push('a'));
        assert!(buffer.push('b'));
        assert!(buffer.push('c'));
        assert!(!buffer.push('d'));
        assert_eq!(buffer.as_str(), "abc");
        assert!(buffer.is_full());
    }

    #[test]
    fn test_buffer_rejects_non_ascii_and_newline() {
        let mut buffer = TextBuffer::with_capacity(16);
        assert!(!buffer.push('é'));
        assert!(!buffer.push('\n'));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_zero_capacity_buffer_accepts_nothing() {
        let mut buffer = TextBuffer::with_capacity(0);
        assert_eq!(buffer.limit(), 0);
        assert!(!buffer.push('x'));
    }

    #[test]
    fn test_backspace_on_empty_is_noop() {
        let mut session = EditorSession::default();
        session.open_new_file("main.c").unwrap();
        let file = session.current_file_mut().unwrap();
        assert!(!file.backspace());
        assert!(!file.backspace());
        assert!(!file.is_modified());
        assert_eq!(file.text(), "");
    }

    #[test]
    fn test_clear_resets_modified() {
        let mut session = EditorSession::default();
        session.open_new_file("main.c").unwrap();
        let file = session.current_file_mut().unwrap();
        file.insert_char('x');
        assert!(file.is_modified());
        file.clear();
        assert!(!file.is_modified());
        assert!(file.text().is_empty());
    }

    #[test]
    fn test_open_sets_current_and_appends() {
        let mut session = EditorSession::default();
        assert_eq!(session.current_index(), None);
        assert_eq!(session.open_new_file("a.c").unwrap(), 0);
        assert_eq!(session.open_new_file("b.c").unwrap(), 1);
        assert_eq!(session.current_index(), Some(1));
        assert_eq!(session.len(), 2);
        assert_eq!(session.get(0).unwrap().name(), "a.c");
    }

    #[test]
    fn test_open_rejects_long_name() {
        let mut session = EditorSession::default();
        let name = "x".repeat(MAX_NAME_LEN + 1);
        assert!(matches!(
            session.open_new_file(&name),
            Err(SessionError::NameTooLong { .. })
        ));
        assert!(session.is_empty());
    }

    #[test]
    fn test_switch_to_out_of_range() {
        let mut session = EditorSession::default();
        session.open_new_file("a.c").unwrap();
        assert!(!session.switch_to(3));
        assert!(!session.switch_to(0));
        assert_eq!(session.current_index(), Some(0));
    }

    #[test]
    fn test_save_without_file() {
        let mut session = EditorSession::default();
        assert!(matches!(
            session.save_current_file(),
            Err(SessionError::NoActiveFile)
        ));
    }
}
