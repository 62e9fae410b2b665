//! Byte offset ↔ line/column mapping.
//!
//! The lexer records the offset of every `\n` it consumes; lookups binary-search that list.
//! Lines and columns are 0-based. Byte columns are used inside the core; editor columns are
//! UTF-16 code units and are only produced by [`LineIndex::from_position`] and consumed by
//! [`LineIndex::to_position`].

use crate::span::Position;

/// Line and byte column, both 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LineCol {
    pub line: u32,
    pub col: u32,
}

/// Editor coordinates: 0-based line and UTF-16 code-unit column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Utf16LineCol {
    pub line: u32,
    pub character: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineIndex {
    /// Offsets of every `\n`, strictly increasing.
    line_breaks: Vec<Position>,
    len: Position,
}

impl LineIndex {
    pub(crate) fn new(line_breaks: Vec<Position>, len: Position) -> Self {
        debug_assert!(line_breaks.windows(2).all(|w| w[0] < w[1]));
        Self { line_breaks, len }
    }

    pub fn from_source(source: &str) -> Self {
        let line_breaks = source
            .bytes()
            .enumerate()
            .filter(|(_, b)| *b == b'\n')
            .map(|(i, _)| i as Position)
            .collect();
        Self::new(line_breaks, source.len() as Position)
    }

    pub fn line_breaks(&self) -> &[Position] {
        &self.line_breaks
    }

    pub fn line_count(&self) -> u32 {
        self.line_breaks.len() as u32 + 1
    }

    /// Byte offset of the first character on `line`.
    pub fn line_start(&self, line: u32) -> Option<Position> {
        match line {
            0 => Some(0),
            _ => self.line_breaks.get(line as usize - 1).map(|b| b + 1),
        }
    }

    /// Byte offset of the `\n` ending `line`, or the source length for the last line.
    pub fn line_end(&self, line: u32) -> Option<Position> {
        if line >= self.line_count() {
            return None;
        }
        Some(
            self.line_breaks
                .get(line as usize)
                .copied()
                .unwrap_or(self.len),
        )
    }

    pub fn line_col(&self, pos: Position) -> Option<LineCol> {
        if pos > self.len {
            return None;
        }
        let line = self.line_breaks.partition_point(|&b| b < pos) as u32;
        let start = self.line_start(line)?;
        Some(LineCol {
            line,
            col: pos - start,
        })
    }

    pub fn offset(&self, lc: LineCol) -> Option<Position> {
        let start = self.line_start(lc.line)?;
        let end = self.line_end(lc.line)?;
        let pos = start.checked_add(lc.col)?;
        (pos <= end).then_some(pos)
    }

    /// Converts a byte offset into editor coordinates.
    ///
    /// An offset inside a multi-byte character is rounded down to that character's start.
    pub fn from_position(&self, source: &str, pos: Position) -> Option<Utf16LineCol> {
        let lc = self.line_col(pos)?;
        let start = self.line_start(lc.line)? as usize;
        let mut end = pos as usize;
        while end > start && !source.is_char_boundary(end) {
            end -= 1;
        }
        let character = source.get(start..end)?.encode_utf16().count() as u32;
        Some(Utf16LineCol {
            line: lc.line,
            character,
        })
    }

    /// Converts editor coordinates into a byte offset.
    ///
    /// Columns past the end of the line clamp to the line end, matching editor-protocol
    /// behavior. Returns `None` only when `line` does not exist.
    pub fn to_position(&self, source: &str, at: Utf16LineCol) -> Option<Position> {
        let start = self.line_start(at.line)?;
        let end = self.line_end(at.line)?;
        let line_text = source.get(start as usize..end as usize)?;

        let target = at.character as usize;
        let mut units = 0usize;
        for (byte_idx, ch) in line_text.char_indices() {
            if units >= target {
                return Some(start + byte_idx as Position);
            }
            units += ch.len_utf16();
        }
        Some(end)
    }
}
