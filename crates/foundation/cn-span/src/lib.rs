//! Source file spans, locations and source identity

use derive_more::Display;
use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use std::ops::Range;
use std::path::{Path, PathBuf};

/// A unique identifier for a source file
#[derive(Copy, Clone, Debug, Display, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[display("file#{_0}")]
pub struct FileId(pub u32);

impl FileId {
    /// Creates a file id from its raw index
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

/// A byte offset span in a source file
#[derive(Copy, Clone, Debug, Default, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// Inclusive start offset
    pub start: u32,
    /// Exclusive end offset
    pub end: u32,
}

impl Span {
    /// Creates a span from its bounds
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Converts a `usize` range (as produced by lexers) into a span
    pub fn from_range(range: Range<usize>) -> Self {
        Self::new(range.start as u32, range.end as u32)
    }

    /// The span as a `usize` range, for slicing source text
    pub fn range(&self) -> Range<usize> {
        self.start as usize..self.end as usize
    }
}

/// Maps byte offsets to 1-based line and column numbers
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineIndex {
    line_starts: Vec<u32>,
    len: u32,
}

impl LineIndex {
    /// Indexes the line starts of `text`
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        for (offset, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(offset as u32 + 1);
            }
        }
        Self {
            line_starts,
            len: text.len() as u32,
        }
    }

    /// 1-based line containing `offset`
    pub fn line_of(&self, offset: u32) -> u32 {
        let offset = offset.min(self.len);
        match self.line_starts.binary_search(&offset) {
            Ok(line) => line as u32 + 1,
            Err(next) => next as u32,
        }
    }

    /// 1-based byte column of `offset` within its line
    pub fn column_of(&self, offset: u32) -> u32 {
        let line = self.line_of(offset);
        offset.min(self.len) - self.line_starts[line as usize - 1] + 1
    }
}

/// Stable identity of one revision of a source file, used as a cache key
#[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct SourceKey {
    /// Path the text was loaded from
    pub path: PathBuf,
    /// Content hash of the text
    pub revision: u64,
}

impl SourceKey {
    /// Builds the key for `text` loaded from `path`
    pub fn for_text(path: impl AsRef<Path>, text: &str) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            revision: content_hash(text),
        }
    }
}

/// 64-bit content hash shared by source keys and canonical signatures
pub fn content_hash(text: &str) -> u64 {
    let mut hasher = FxHasher::default();
    text.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_index() {
        let index = LineIndex::new("<?php\n$a = 1;\n\n$b = 2;");
        assert_eq!(index.line_of(0), 1);
        assert_eq!(index.line_of(5), 1);
        assert_eq!(index.line_of(6), 2);
        assert_eq!(index.line_of(14), 3);
        assert_eq!(index.line_of(15), 4);
        assert_eq!(index.column_of(9), 4);
        assert_eq!(index.line_of(99), 4);
    }

    #[test]
    fn test_span_ranges() {
        let span = Span::from_range(10..40);
        assert_eq!(span, Span::new(10, 40));
        assert_eq!(span.range(), 10..40);
    }

    #[test]
    fn test_source_key_tracks_content() {
        let first = SourceKey::for_text("a.php", "<?php echo 1;");
        let same = SourceKey::for_text("a.php", "<?php echo 1;");
        let edited = SourceKey::for_text("a.php", "<?php echo 2;");
        assert_eq!(first, same);
        assert_ne!(first, edited);
    }

    #[test]
    fn test_span_serializes() {
        let json = serde_json::to_string(&Span::new(1, 2)).unwrap();
        assert_eq!(json, r#"{"start":1,"end":2}"#);
    }
}
