//! Per-file source analysis
//!
//! [`SourceAnalyzer`] turns the text of one source file into a [`FileMetrics`]
//! record. [`ScalaAnalyzer`] is the built-in implementation: it tokenizes the
//! text once and feeds the tokens to the comment, line and code counters.

use crate::comments::CommentsAnalyzer;
use crate::defaults;
use crate::distribution::MetricDistribution;
use crate::lexer::{comments, Lexer};
use crate::lines::{split_lines, CodeLines, LineClassifier, LinesAnalyzer};
use crate::scala_metrics;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileMetrics {
    pub lines: usize,
    pub lines_of_code: usize,
    pub comment_lines: usize,
    pub classes: usize,
    pub statements: usize,
    pub functions: usize,
    pub complexity: usize,
    pub public_api: usize,
    pub undocumented_public_api: usize,
    pub function_complexity: MetricDistribution,
}

pub trait SourceAnalyzer {
    fn analyze(&self, source: &str) -> FileMetrics;
}

pub struct ScalaAnalyzer<C: LineClassifier = CodeLines> {
    classifier: C,
    function_limits: Vec<u32>,
}

impl ScalaAnalyzer {
    pub fn new(function_limits: &[u32]) -> Self {
        Self::with_classifier(CodeLines, function_limits)
    }
}

impl Default for ScalaAnalyzer {
    fn default() -> Self {
        Self::new(defaults::complexity::FUNCTION_LIMITS)
    }
}

impl<C: LineClassifier> ScalaAnalyzer<C> {
    /// Use a custom line-of-code policy.
    pub fn with_classifier(classifier: C, function_limits: &[u32]) -> Self {
        Self { classifier, function_limits: function_limits.to_vec() }
    }
}

impl<C: LineClassifier> SourceAnalyzer for ScalaAnalyzer<C> {
    fn analyze(&self, source: &str) -> FileMetrics {
        let tokens = Lexer::new(source).tokenize();
        let comment_info = CommentsAnalyzer::new(comments(&tokens));
        let lines = split_lines(source);
        let line_info = LinesAnalyzer::new(&lines, &comment_info, &self.classifier);
        let code = scala_metrics::measure(&tokens);

        FileMetrics {
            lines: line_info.count_lines(),
            lines_of_code: line_info.count_lines_of_code(),
            comment_lines: comment_info.count_comment_lines(),
            classes: code.types,
            statements: code.statements,
            functions: code.functions,
            complexity: code.complexity,
            public_api: code.public_api,
            undocumented_public_api: code.undocumented_public_api,
            function_complexity: MetricDistribution::from_values(
                &self.function_limits,
                code.function_complexities.iter().copied(),
            ),
        }
    }
}
