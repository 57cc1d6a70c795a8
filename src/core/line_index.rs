/// Line start offsets of a text, for offset -> line/column lookups.
///
/// Line 0 starts at offset 0, line 1 starts after the first `'\n'`, etc.
#[derive(Debug, Clone)]
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut starts = vec![0];
        for (i, c) in text.char_indices() {
            if c == '\n' {
                starts.push(i + 1);
            }
        }
        Self { starts }
    }

    /// Zero-based `(line, column)` of a byte offset, via binary search.
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let line = match self.starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        (line, offset - self.starts[line])
    }

    pub fn line_count(&self) -> usize {
        self.starts.len()
    }
}
