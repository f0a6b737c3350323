/// Raw file contents. No path, no mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub data: Vec<u8>,
}

impl Blob {
    /// Create a blob from raw bytes.
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Count the lines in this blob, tolerating a missing final newline.
    ///
    /// Used for commit statistics on added and deleted files.
    pub fn line_count(&self) -> usize {
        if self.data.is_empty() {
            return 0;
        }
        let newlines = self.data.iter().filter(|&&b| b == b'\n').count();
        if self.data.ends_with(b"\n") {
            newlines
        } else {
            newlines + 1
        }
    }
}
