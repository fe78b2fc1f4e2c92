use serde::Serialize;

/// A byte offset within a text document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ByteOffset(u32);

impl ByteOffset {
    #[must_use]
    pub fn new(offset: u32) -> Self {
        Self(offset)
    }

    #[must_use]
    pub fn offset(&self) -> u32 {
        self.0
    }
}

/// A zero-based line and character column within a text document.
///
/// The column counts Unicode scalar values, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct LineCol {
    line: u32,
    column: u32,
}

impl LineCol {
    #[must_use]
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// The same position with both components counted from 1.
    #[must_use]
    pub fn one_based(self) -> (u32, u32) {
        (self.line + 1, self.column + 1)
    }
}

/// Byte offsets of every line start in a document.
///
/// Lines end at `\n`, `\r\n` or a lone `\r`, as in Python source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    line_starts: Vec<u32>,
    length: u32,
}

impl LineIndex {
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let mut line_starts = vec![0];
        let bytes = text.as_bytes();

        for (pos, &byte) in bytes.iter().enumerate() {
            let ends_line = match byte {
                b'\n' => true,
                b'\r' => bytes.get(pos + 1) != Some(&b'\n'),
                _ => false,
            };
            if ends_line {
                line_starts.push(u32::try_from(pos + 1).unwrap_or(u32::MAX));
            }
        }

        Self {
            line_starts,
            length: u32::try_from(text.len()).unwrap_or(u32::MAX),
        }
    }

    /// Convert a byte offset into a zero-based line and character column.
    ///
    /// Offsets past the end of the document clamp to the last position.
    #[must_use]
    pub fn to_line_col(&self, text: &str, offset: ByteOffset) -> LineCol {
        let offset = offset.offset().min(self.length);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(line) => line.saturating_sub(1),
        };

        let line_start = self.line_starts[line] as usize;
        let column = text
            .get(line_start..offset as usize)
            .map_or(offset as usize - line_start, |prefix| prefix.chars().count());

        LineCol::new(
            u32::try_from(line).unwrap_or(u32::MAX),
            u32::try_from(column).unwrap_or(u32::MAX),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_line() {
        let text = "abc\ndef\n";
        let index = LineIndex::from_text(text);
        assert_eq!(index.to_line_col(text, ByteOffset::new(2)), LineCol::new(0, 2));
    }

    #[test]
    fn later_lines() {
        let text = "abc\ndef\nghi";
        let index = LineIndex::from_text(text);
        assert_eq!(index.to_line_col(text, ByteOffset::new(4)), LineCol::new(1, 0));
        assert_eq!(index.to_line_col(text, ByteOffset::new(9)), LineCol::new(2, 1));
    }

    #[test]
    fn carriage_returns_end_lines() {
        let text = "a\rb\r\nc\n\rd";
        let index = LineIndex::from_text(text);
        assert_eq!(index.to_line_col(text, ByteOffset::new(2)), LineCol::new(1, 0));
        assert_eq!(index.to_line_col(text, ByteOffset::new(5)), LineCol::new(2, 0));
        assert_eq!(index.to_line_col(text, ByteOffset::new(8)), LineCol::new(4, 0));
    }

    #[test]
    fn clamps_past_end() {
        let text = "ab";
        let index = LineIndex::from_text(text);
        assert_eq!(index.to_line_col(text, ByteOffset::new(99)), LineCol::new(0, 2));
    }

    #[test]
    fn one_based_conversion() {
        assert_eq!(LineCol::new(0, 4).one_based(), (1, 5));
    }
}
