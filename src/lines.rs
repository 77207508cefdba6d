//! Line splitting and line-of-code classification

use crate::comments::CommentsAnalyzer;

/// Split text into lines on LF, CRLF or lone CR. A trailing line break does
/// not open an extra empty line, and empty text has no lines.
pub fn split_lines(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let (mut start, mut i) = (0, 0);
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push(&text[start..i]);
                i += 1;
                start = i;
            }
            b'\r' => {
                lines.push(&text[start..i]);
                i += if bytes.get(i + 1) == Some(&b'\n') { 2 } else { 1 };
                start = i;
            }
            _ => i += 1,
        }
    }
    if start < bytes.len() {
        lines.push(&text[start..]);
    }
    lines
}

/// Decides whether a line counts as a line of code
pub trait LineClassifier {
    /// `line_number` is 1-based.
    fn is_code(&self, line_number: usize, line: &str, comments: &CommentsAnalyzer) -> bool;
}

/// Default policy: a line is code when it is not blank and not made up of comments only.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodeLines;

impl LineClassifier for CodeLines {
    fn is_code(&self, line_number: usize, line: &str, comments: &CommentsAnalyzer) -> bool {
        !line.trim().is_empty() && !comments.is_comment_only(line_number, line)
    }
}

impl<F> LineClassifier for F
where
    F: Fn(usize, &str, &CommentsAnalyzer) -> bool,
{
    fn is_code(&self, line_number: usize, line: &str, comments: &CommentsAnalyzer) -> bool {
        self(line_number, line, comments)
    }
}

pub struct LinesAnalyzer<'a, C: LineClassifier + ?Sized> {
    lines: &'a [&'a str],
    comments: &'a CommentsAnalyzer,
    classifier: &'a C,
}

impl<'a, C: LineClassifier + ?Sized> LinesAnalyzer<'a, C> {
    pub fn new(lines: &'a [&'a str], comments: &'a CommentsAnalyzer, classifier: &'a C) -> Self {
        Self { lines, comments, classifier }
    }

    pub fn count_lines(&self) -> usize {
        self.lines.len()
    }

    pub fn count_lines_of_code(&self) -> usize {
        self.lines
            .iter()
            .enumerate()
            .filter(|(i, line)| self.classifier.is_code(i + 1, line, self.comments))
            .count()
    }
}
