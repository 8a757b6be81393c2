//! Line/column positions computed from byte offsets.

use serde::Serialize;

/// Zero-based line and column of a byte offset.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Diagnostics are reported one-based.
        write!(f, "({},{})", self.line + 1, self.column + 1)
    }
}

/// Table of line start offsets for a source text.
#[derive(Clone, Debug, Default)]
pub struct LineMap {
    line_starts: Vec<u32>,
}

impl LineMap {
    /// Build a line map, treating `\n`, `\r\n` and lone `\r` as line breaks.
    #[must_use]
    pub fn build(text: &str) -> Self {
        let bytes = text.as_bytes();
        let mut line_starts = vec![0];
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\r' => {
                    if i + 1 < bytes.len() && bytes[i + 1] == b'\n' {
                        i += 1;
                    }
                    line_starts.push((i + 1) as u32);
                }
                b'\n' => line_starts.push((i + 1) as u32),
                _ => {}
            }
            i += 1;
        }
        Self { line_starts }
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Convert a byte offset into a location. Offsets past the end clamp to the last line.
    #[must_use]
    pub fn location(&self, offset: u32) -> Location {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next.saturating_sub(1),
        };
        let start = self.line_starts.get(line).copied().unwrap_or(0);
        Location {
            line: line as u32,
            column: offset - start,
        }
    }
}

#[cfg(test)]
#[path = "../tests/position.rs"]
mod tests;
