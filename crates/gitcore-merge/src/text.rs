//! Line-indexed text sequences for merge results.

use bstr::BStr;

/// A text buffer split into lines.
///
/// Line ranges exclude the trailing `'\n'`; a final line without a newline
/// still counts as a line. Content bytes are never reinterpreted, so binary
/// line content survives untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawText {
    data: Vec<u8>,
    lines: Vec<(usize, usize)>,
}

impl RawText {
    pub fn new(data: Vec<u8>) -> Self {
        let mut lines = Vec::new();
        let mut start = 0;
        for (i, &b) in data.iter().enumerate() {
            if b == b'\n' {
                lines.push((start, i));
                start = i + 1;
            }
        }
        if start < data.len() {
            lines.push((start, data.len()));
        }
        Self { data, lines }
    }

    /// Number of lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Content of line `index`, without its line terminator.
    pub fn line(&self, index: usize) -> &BStr {
        let (start, end) = self.lines[index];
        BStr::new(&self.data[start..end])
    }

    /// The underlying bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

impl From<&[u8]> for RawText {
    fn from(data: &[u8]) -> Self {
        Self::new(data.to_vec())
    }
}

impl From<&str> for RawText {
    fn from(data: &str) -> Self {
        Self::new(data.as_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_has_no_lines() {
        assert_eq!(RawText::from("").line_count(), 0);
    }

    #[test]
    fn lines_exclude_terminator() {
        let text = RawText::from("one\ntwo\n");
        assert_eq!(text.line_count(), 2);
        assert_eq!(text.line(0), "one");
        assert_eq!(text.line(1), "two");
    }

    #[test]
    fn final_line_without_newline() {
        let text = RawText::from("one\ntwo");
        assert_eq!(text.line_count(), 2);
        assert_eq!(text.line(1), "two");
    }

    #[test]
    fn blank_lines_are_lines() {
        let text = RawText::from("a\n\nb\n");
        assert_eq!(text.line_count(), 3);
        assert_eq!(text.line(1), "");
    }

    #[test]
    fn carriage_returns_are_content() {
        let text = RawText::from("a\r\nb\n");
        assert_eq!(text.line(0), "a\r");
    }
}
