//! Comment-based metrics

use crate::lexer::Comment;
use crate::lines::split_lines;
use std::collections::{BTreeSet, HashMap};

/// Answers comment questions for one file: how many lines carry commentary,
/// and which byte ranges of a given line are covered by comments.
pub struct CommentsAnalyzer {
    comments: Vec<Comment>,
    /// line number -> covered [start, end) byte ranges on that line
    coverage: HashMap<usize, Vec<(usize, usize)>>,
}

impl CommentsAnalyzer {
    pub fn new(comments: Vec<Comment>) -> Self {
        let mut coverage: HashMap<usize, Vec<(usize, usize)>> = HashMap::new();
        for c in &comments {
            for line in c.start.line..=c.end.line {
                let from = if line == c.start.line { c.start.column } else { 0 };
                let to = if line == c.end.line { c.end.column } else { usize::MAX };
                coverage.entry(line).or_default().push((from, to));
            }
        }
        Self { comments, coverage }
    }

    /// Lines on which a non-header comment carries text. Delimiters and
    /// decoration (`/`, `*`) alone do not make a comment line, and a line
    /// holding two comments counts once.
    pub fn count_comment_lines(&self) -> usize {
        self.lines_with_text(|c| !c.header).len()
    }

    fn lines_with_text(&self, include: impl Fn(&Comment) -> bool) -> BTreeSet<usize> {
        let mut lines = BTreeSet::new();
        for c in self.comments.iter().filter(|c| include(c)) {
            for (offset, text) in split_lines(&c.text).into_iter().enumerate() {
                let content =
                    text.trim_matches(|ch: char| ch == '*' || ch == '/' || ch.is_whitespace());
                if !content.is_empty() {
                    lines.insert(c.start.line + offset);
                }
            }
        }
        lines
    }

    /// True when `line` has content and every non-whitespace byte of it lies inside a comment.
    pub fn is_comment_only(&self, line_number: usize, line: &str) -> bool {
        let Some(ranges) = self.coverage.get(&line_number) else { return false };
        let mut has_content = false;
        for (i, b) in line.bytes().enumerate() {
            if b.is_ascii_whitespace() {
                continue;
            }
            has_content = true;
            if !ranges.iter().any(|&(from, to)| i >= from && i < to) {
                return false;
            }
        }
        has_content
    }
}
