//! Line/column ↔ byte offset conversion.
//!
//! Lines and columns are zero-based. Columns count UTF-16 code units, which
//! is what editor protocols send by default.

use crate::span::Span;

/// Zero-based line and UTF-16 column.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, PartialOrd, Ord)]
pub struct LineCol {
    pub line: u32,
    pub character: u32,
}

impl LineCol {
    #[inline]
    pub const fn new(line: u32, character: u32) -> Self {
        LineCol { line, character }
    }
}

/// Line start table over a borrowed text.
#[derive(Clone, Debug)]
pub struct LineIndex<'a> {
    text: &'a str,
    /// Byte offset of the first character of every line.
    line_starts: Vec<u32>,
}

impl<'a> LineIndex<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(to_u32(i + 1));
            }
        }
        LineIndex { text, line_starts }
    }

    #[inline]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Byte offset of `pos`.
    ///
    /// Returns `None` when the line does not exist. A column past the end of
    /// its line clamps to the line end (before any `\r\n`).
    pub fn offset(&self, pos: LineCol) -> Option<u32> {
        let line = pos.line as usize;
        let start = *self.line_starts.get(line)?;
        let end = self.line_content_end(line);
        let content = &self.text[start as usize..end as usize];

        let mut units = 0u32;
        for (i, ch) in content.char_indices() {
            if units >= pos.character {
                return Some(start + to_u32(i));
            }
            units += to_u32(ch.len_utf16());
        }
        Some(end)
    }

    /// Line and column of a byte offset. Offsets past the end clamp to the
    /// end of the text.
    pub fn line_col(&self, offset: u32) -> LineCol {
        let offset = offset.min(to_u32(self.text.len()));
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let start = self.line_starts[line] as usize;
        let prefix = self.text.get(start..offset as usize).unwrap_or("");
        let character = prefix.chars().map(|c| to_u32(c.len_utf16())).sum();
        LineCol {
            line: to_u32(line),
            character,
        }
    }

    /// Start and end positions of a span.
    pub fn range(&self, span: Span) -> (LineCol, LineCol) {
        (self.line_col(span.start), self.line_col(span.end))
    }

    /// Byte offset where the visible content of `line` ends.
    fn line_content_end(&self, line: usize) -> u32 {
        let mut end = self
            .line_starts
            .get(line + 1)
            .map_or(to_u32(self.text.len()), |next| next - 1);
        let bytes = self.text.as_bytes();
        let start = self.line_starts[line];
        if end > start && bytes.get(end as usize - 1) == Some(&b'\r') {
            end -= 1;
        }
        end
    }
}

#[inline]
fn to_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
