//! Heuristic Scala code metrics over the token stream
//!
//! One pass over the tokens tracks a stack of open delimiters, the functions
//! currently open, and the modifiers/doc comment that precede a declaration.
//!
//! - **Types**: `class`, `object`, `trait`.
//! - **Functions**: `def`.
//! - **Complexity**: each function contributes 1, plus 1 per `if`, `while`,
//!   `for`, `case` clause, `&&` and `||`. Decision points belong to the
//!   innermost open function, or to the file when outside any function.
//! - **Statements**: the first expression token after `;`, `{`, a case arrow,
//!   or a line break that does not follow a continuation token.
//! - **Public API**: declarations at top level or directly inside a
//!   class/object/trait body that are not `private`/`protected`; documented
//!   when a doc comment precedes them (modifiers and annotations may sit in
//!   between).

use crate::lexer::{CommentKind, Token, TokenKind};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CodeMetrics {
    pub types: usize,
    pub statements: usize,
    pub functions: usize,
    pub complexity: usize,
    /// Complexity of each function, in the order the functions end
    pub function_complexities: Vec<u32>,
    pub public_api: usize,
    pub undocumented_public_api: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    /// Body of a class, object or trait
    Template,
    Block,
    Paren,
}

struct OpenFunction {
    depth: usize,
    decisions: u32,
}

const MODIFIERS: &[&str] = &[
    "private", "protected", "override", "final", "abstract", "sealed", "implicit", "lazy",
];

const DECLARATIONS: &[&str] = &["def", "val", "var", "type", "class", "object", "trait"];

const STATEMENT_KEYWORDS: &[&str] = &[
    "val", "var", "if", "while", "for", "do", "try", "return", "throw", "new", "this", "super",
    "null", "true", "false",
];

const CONTINUATION_KEYWORDS: &[&str] =
    &["if", "while", "for", "match", "new", "return", "throw", "extends", "with"];

pub fn measure(tokens: &[Token<'_>]) -> CodeMetrics {
    Scanner::new(tokens).run()
}

struct Scanner<'t, 'a> {
    tokens: &'t [Token<'a>],
    metrics: CodeMetrics,
    frames: Vec<Frame>,
    functions: Vec<OpenFunction>,
    outside_decisions: usize,
    pending_template: bool,
    prev: Option<Token<'a>>,
    modifiers: Vec<&'a str>,
    doc_pending: bool,
    case_pattern_depth: Option<usize>,
    after_case_arrow: bool,
}

impl<'t, 'a> Scanner<'t, 'a> {
    fn new(tokens: &'t [Token<'a>]) -> Self {
        Self {
            tokens,
            metrics: CodeMetrics::default(),
            frames: Vec::new(),
            functions: Vec::new(),
            outside_decisions: 0,
            pending_template: false,
            prev: None,
            modifiers: Vec::new(),
            doc_pending: false,
            case_pattern_depth: None,
            after_case_arrow: false,
        }
    }

    fn run(mut self) -> CodeMetrics {
        let mut i = 0;
        while i < self.tokens.len() {
            i = self.step(i);
        }
        while !self.functions.is_empty() {
            self.close_function();
        }
        self.metrics.complexity += self.outside_decisions;
        self.metrics
    }

    /// Process the token at `i` and return the index of the next one to look at.
    fn step(&mut self, i: usize) -> usize {
        let tok = self.tokens[i];
        match tok.kind {
            TokenKind::Comment(kind) => {
                if kind == CommentKind::Doc {
                    self.doc_pending = true;
                }
                return i + 1;
            }
            TokenKind::Punct if tok.text == "@" => return self.skip_annotation(i),
            TokenKind::Keyword if MODIFIERS.contains(&tok.text) => {
                self.modifiers.push(tok.text);
                let next = self.next_code(i + 1);
                if matches!(tok.text, "private" | "protected")
                    && next.is_some_and(|n| self.tokens[n].is_punct("["))
                {
                    return next.map_or(i + 1, |n| self.skip_group(n, "[", "]"));
                }
                return i + 1;
            }
            TokenKind::Keyword if tok.text == "case" && self.next_is_type_keyword(i) => {
                return i + 1;
            }
            _ => {}
        }

        if self.starts_statement(&tok) {
            self.metrics.statements += 1;
            // A statement at a function's own level means its unbraced body has ended
            self.close_functions_from(self.frames.len());
        }
        let mut after_case_arrow = false;
        match tok.kind {
            TokenKind::Punct => self.punct(tok.text),
            TokenKind::Operator => match tok.text {
                "&&" | "||" => self.decision(),
                "=" if self.frames.last() != Some(&Frame::Paren) => self.pending_template = false,
                "=>" if self.case_pattern_depth == Some(self.frames.len()) => {
                    self.case_pattern_depth = None;
                    after_case_arrow = true;
                }
                _ => {}
            },
            TokenKind::Keyword => self.keyword(&tok),
            _ => {}
        }
        self.after_case_arrow = after_case_arrow;
        self.modifiers.clear();
        self.doc_pending = false;
        self.prev = Some(tok);
        i + 1
    }

    fn punct(&mut self, text: &str) {
        match text {
            "{" => {
                let frame = if self.pending_template { Frame::Template } else { Frame::Block };
                self.pending_template = false;
                self.frames.push(frame);
            }
            "(" | "[" => self.frames.push(Frame::Paren),
            "}" | ")" | "]" => {
                self.frames.pop();
                while self.functions.last().is_some_and(|f| f.depth > self.frames.len()) {
                    self.close_function();
                }
            }
            _ => {}
        }
    }

    fn keyword(&mut self, tok: &Token<'a>) {
        let after_dot = self.prev.is_some_and(|p| p.is_punct("."));
        match tok.text {
            "if" | "while" | "for" => self.decision(),
            "case" => {
                self.decision();
                self.case_pattern_depth = Some(self.frames.len());
            }
            kw if DECLARATIONS.contains(&kw) && !after_dot => self.declaration(kw),
            _ => {}
        }
    }

    fn declaration(&mut self, keyword: &str) {
        // Class parameters and pattern bindings
        if self.frames.last() == Some(&Frame::Paren) {
            return;
        }
        let depth = self.frames.len();
        // A new declaration ends unbraced sibling functions
        self.close_functions_from(depth);
        match keyword {
            "def" => {
                self.metrics.functions += 1;
                self.functions.push(OpenFunction { depth, decisions: 0 });
                self.pending_template = false;
            }
            "class" | "object" | "trait" => {
                self.metrics.types += 1;
                self.pending_template = true;
            }
            _ => self.pending_template = false,
        }
        let member_level = self.frames.iter().all(|f| *f == Frame::Template);
        let hidden = self.modifiers.iter().any(|m| matches!(*m, "private" | "protected"));
        if member_level && !hidden {
            self.metrics.public_api += 1;
            if !self.doc_pending {
                self.metrics.undocumented_public_api += 1;
            }
        }
    }

    fn decision(&mut self) {
        match self.functions.last_mut() {
            Some(f) => f.decisions += 1,
            None => self.outside_decisions += 1,
        }
    }

    fn close_functions_from(&mut self, depth: usize) {
        while self.functions.last().is_some_and(|f| f.depth >= depth) {
            self.close_function();
        }
    }

    fn close_function(&mut self) {
        if let Some(f) = self.functions.pop() {
            let complexity = 1 + f.decisions;
            self.metrics.function_complexities.push(complexity);
            self.metrics.complexity += complexity as usize;
        }
    }

    fn starts_statement(&self, tok: &Token<'_>) -> bool {
        if self.frames.last() == Some(&Frame::Paren) {
            return false;
        }
        let boundary = match self.prev {
            None => true,
            Some(p) => {
                p.is_punct(";")
                    || p.is_punct("{")
                    || self.after_case_arrow
                    || (tok.start.line > p.end.line && !is_continuation(&p))
            }
        };
        boundary && can_start_statement(tok)
    }

    fn next_code(&self, from: usize) -> Option<usize> {
        (from..self.tokens.len()).find(|&j| !self.tokens[j].is_comment())
    }

    fn next_is_type_keyword(&self, i: usize) -> bool {
        self.next_code(i + 1)
            .is_some_and(|n| {
                self.tokens[n].is_keyword("class") || self.tokens[n].is_keyword("object")
            })
    }

    /// Index just past the group opened at `open_idx`, honoring nesting.
    fn skip_group(&self, open_idx: usize, open: &str, close: &str) -> usize {
        let mut depth = 0usize;
        for j in open_idx..self.tokens.len() {
            let t = &self.tokens[j];
            if t.is_punct(open) {
                depth += 1;
            } else if t.is_punct(close) {
                depth -= 1;
                if depth == 0 {
                    return j + 1;
                }
            }
        }
        self.tokens.len()
    }

    /// Skip `@name`, `@a.b.c` and an argument list that starts on the same line.
    fn skip_annotation(&self, at: usize) -> usize {
        let n = self.tokens.len();
        let is_name = |j: usize| {
            j < n && matches!(self.tokens[j].kind, TokenKind::Ident | TokenKind::Keyword)
        };
        let mut j = at + 1;
        if !is_name(j) {
            return j;
        }
        j += 1;
        while j + 1 < n && self.tokens[j].is_punct(".") && is_name(j + 1) {
            j += 2;
        }
        if j < n
            && self.tokens[j].is_punct("(")
            && self.tokens[j].start.line == self.tokens[j - 1].end.line
        {
            return self.skip_group(j, "(", ")");
        }
        j
    }
}

fn is_continuation(tok: &Token<'_>) -> bool {
    match tok.kind {
        TokenKind::Operator => tok.text != "=>",
        TokenKind::Punct => matches!(tok.text, "," | "." | "(" | "["),
        TokenKind::Keyword => CONTINUATION_KEYWORDS.contains(&tok.text),
        _ => false,
    }
}

fn can_start_statement(tok: &Token<'_>) -> bool {
    match tok.kind {
        TokenKind::Ident | TokenKind::Number | TokenKind::StringLit | TokenKind::CharLit => true,
        TokenKind::Keyword => STATEMENT_KEYWORDS.contains(&tok.text),
        TokenKind::Punct => tok.text == "(",
        _ => false,
    }
}
