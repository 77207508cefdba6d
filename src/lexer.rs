//! Lexical scan of Scala source
//!
//! Produces a flat token stream (comments included) that the comment, line and
//! code counters work from. The scanner is byte oriented: every delimiter it
//! looks for is ASCII and all non-ASCII bytes are folded into identifiers, so
//! token boundaries always fall on UTF-8 character boundaries.
//!
//! Line breaks are LF, CRLF or a lone CR. Columns are byte offsets within the
//! line; a token's `end` is exclusive.

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    /// 1-based line number
    pub line: usize,
    /// 0-based byte column
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentKind {
    Line,
    Block,
    Doc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    Keyword,
    Number,
    StringLit,
    CharLit,
    Operator,
    Punct,
    Comment(CommentKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub start: Position,
    pub end: Position,
}

impl Token<'_> {
    pub fn is_comment(&self) -> bool {
        matches!(self.kind, TokenKind::Comment(_))
    }

    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.kind == TokenKind::Keyword && self.text == keyword
    }

    pub fn is_punct(&self, punct: &str) -> bool {
        self.kind == TokenKind::Punct && self.text == punct
    }
}

/// A comment span extracted from the token stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub kind: CommentKind,
    pub text: String,
    pub start: Position,
    pub end: Position,
    /// A plain block comment that precedes all code (licence headers)
    pub header: bool,
}

const KEYWORDS: &[&str] = &[
    "abstract", "case", "catch", "class", "def", "do", "else", "extends", "false", "final",
    "finally", "for", "forSome", "if", "implicit", "import", "lazy", "match", "new", "null",
    "object", "override", "package", "private", "protected", "return", "sealed", "super",
    "this", "throw", "trait", "try", "true", "type", "val", "var", "while", "with", "yield",
];

pub struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self { src, bytes: src.as_bytes(), pos: 0, line: 1, column: 0 }
    }

    pub fn tokenize(mut self) -> Vec<Token<'a>> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token() {
            tokens.push(token);
        }
        tokens
    }

    fn peek(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn position(&self) -> Position {
        Position { line: self.line, column: self.column }
    }

    fn bump(&mut self) {
        let Some(b) = self.peek(0) else { return };
        self.pos += 1;
        match b {
            b'\n' => {
                self.line += 1;
                self.column = 0;
            }
            // CRLF: the LF that follows ends the line
            b'\r' if self.peek(0) == Some(b'\n') => self.column += 1,
            b'\r' => {
                self.line += 1;
                self.column = 0;
            }
            _ => self.column += 1,
        }
    }

    fn bump_while(&mut self, pred: impl Fn(u8) -> bool) {
        while self.peek(0).is_some_and(&pred) {
            self.bump();
        }
    }

    fn next_token(&mut self) -> Option<Token<'a>> {
        self.bump_while(|b| matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0c));
        let start_pos = self.pos;
        let start = self.position();
        let b = self.peek(0)?;
        let kind = match b {
            b'/' if self.peek(1) == Some(b'/') => {
                self.bump_while(|b| b != b'\n' && b != b'\r');
                TokenKind::Comment(CommentKind::Line)
            }
            b'/' if self.peek(1) == Some(b'*') => {
                let doc = self.peek(2) == Some(b'*') && self.peek(3) != Some(b'/');
                self.block_comment();
                TokenKind::Comment(if doc { CommentKind::Doc } else { CommentKind::Block })
            }
            b'"' => {
                self.string_literal();
                TokenKind::StringLit
            }
            b'\'' => self.quote(),
            b'`' => {
                self.bump();
                self.bump_while(|b| b != b'`' && b != b'\n' && b != b'\r');
                if self.peek(0) == Some(b'`') {
                    self.bump();
                }
                TokenKind::Ident
            }
            b'0'..=b'9' => {
                self.number();
                TokenKind::Number
            }
            b if is_ident_start(b) => {
                self.bump_while(is_ident_part);
                if KEYWORDS.contains(&&self.src[start_pos..self.pos]) {
                    TokenKind::Keyword
                } else {
                    TokenKind::Ident
                }
            }
            b'{' | b'}' | b'(' | b')' | b'[' | b']' | b';' | b',' | b'.' | b'@' => {
                self.bump();
                TokenKind::Punct
            }
            b if is_operator_char(b) => {
                self.bump();
                while self.peek(0).is_some_and(is_operator_char) && !self.at_comment_start() {
                    self.bump();
                }
                TokenKind::Operator
            }
            _ => {
                self.bump();
                TokenKind::Punct
            }
        };
        Some(Token { kind, text: &self.src[start_pos..self.pos], start, end: self.position() })
    }

    fn at_comment_start(&self) -> bool {
        self.peek(0) == Some(b'/') && matches!(self.peek(1), Some(b'/' | b'*'))
    }

    /// Block comments nest in Scala.
    fn block_comment(&mut self) {
        self.bump();
        self.bump();
        let mut depth = 1usize;
        while let Some(b) = self.peek(0) {
            if b == b'/' && self.peek(1) == Some(b'*') {
                depth += 1;
                self.bump();
                self.bump();
            } else if b == b'*' && self.peek(1) == Some(b'/') {
                depth -= 1;
                self.bump();
                self.bump();
                if depth == 0 {
                    return;
                }
            } else {
                self.bump();
            }
        }
    }

    fn string_literal(&mut self) {
        if self.peek(1) == Some(b'"') && self.peek(2) == Some(b'"') {
            for _ in 0..3 {
                self.bump();
            }
            while self.peek(0).is_some() {
                if self.peek(0) == Some(b'"')
                    && self.peek(1) == Some(b'"')
                    && self.peek(2) == Some(b'"')
                {
                    // A run of more than three quotes closes on its last three
                    self.bump_while(|b| b == b'"');
                    return;
                }
                self.bump();
            }
            return;
        }
        self.bump();
        while let Some(b) = self.peek(0) {
            match b {
                b'\\' => {
                    self.bump();
                    self.bump();
                }
                b'"' => {
                    self.bump();
                    return;
                }
                b'\n' | b'\r' => return,
                _ => self.bump(),
            }
        }
    }

    /// Character literal, or a lone quote (symbol literal prefix).
    fn quote(&mut self) -> TokenKind {
        if self.peek(1) == Some(b'\\') {
            self.bump();
            self.bump();
            self.bump();
            self.bump_while(|b| b != b'\'' && b != b'\n' && b != b'\r');
            if self.peek(0) == Some(b'\'') {
                self.bump();
            }
            return TokenKind::CharLit;
        }
        let char_len = self.src[self.pos + 1..].chars().next().map_or(0, char::len_utf8);
        let is_char = char_len > 0
            && !matches!(self.peek(1), Some(b'\n' | b'\r' | b'\''))
            && self.peek(1 + char_len) == Some(b'\'');
        if is_char {
            for _ in 0..char_len + 2 {
                self.bump();
            }
            TokenKind::CharLit
        } else {
            self.bump();
            TokenKind::Punct
        }
    }

    fn number(&mut self) {
        while let Some(b) = self.peek(0) {
            let fraction_dot = b == b'.' && self.peek(1).is_some_and(|n| n.is_ascii_digit());
            if b.is_ascii_alphanumeric() || b == b'_' || fraction_dot {
                self.bump();
            } else {
                break;
            }
        }
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$' || b >= 0x80
}

fn is_ident_part(b: u8) -> bool {
    is_ident_start(b) || b.is_ascii_digit()
}

fn is_operator_char(b: u8) -> bool {
    matches!(
        b,
        b'!' | b'#' | b'%' | b'&' | b'*' | b'+' | b'-' | b'/' | b':' | b'<' | b'=' | b'>' | b'?'
            | b'\\' | b'^' | b'|' | b'~'
    )
}

/// Comments of a token stream, with header comments flagged.
pub fn comments(tokens: &[Token<'_>]) -> Vec<Comment> {
    let mut seen_code = false;
    let mut out = Vec::new();
    for token in tokens {
        match token.kind {
            TokenKind::Comment(kind) => out.push(Comment {
                kind,
                text: token.text.to_string(),
                start: token.start,
                end: token.end,
                header: !seen_code && kind == CommentKind::Block,
            }),
            _ => seen_code = true,
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<(TokenKind, &str)> {
        Lexer::new(src).tokenize().into_iter().map(|t| (t.kind, t.text)).collect()
    }

    #[test]
    fn test_identifiers_and_keywords() {
        let toks = kinds("object Foo extends Bar");
        assert_eq!(
            toks,
            vec![
                (TokenKind::Keyword, "object"),
                (TokenKind::Ident, "Foo"),
                (TokenKind::Keyword, "extends"),
                (TokenKind::Ident, "Bar"),
            ]
        );
    }

    #[test]
    fn test_line_comment_stops_at_line_end() {
        let toks = Lexer::new("val x = 1 // one\nval y").tokenize();
        let c = toks.iter().find(|t| t.is_comment()).unwrap();
        assert_eq!(c.text, "// one");
        assert_eq!(c.start, Position { line: 1, column: 10 });
        assert_eq!(toks.last().unwrap().start.line, 2);
    }

    #[test]
    fn test_nested_block_comment() {
        let toks = kinds("/* a /* b */ c */ def");
        assert_eq!(toks[0], (TokenKind::Comment(CommentKind::Block), "/* a /* b */ c */"));
        assert_eq!(toks[1], (TokenKind::Keyword, "def"));
    }

    #[test]
    fn test_doc_comment_versus_empty_block() {
        let toks = kinds("/** doc */ /**/");
        assert_eq!(toks[0].0, TokenKind::Comment(CommentKind::Doc));
        assert_eq!(toks[1].0, TokenKind::Comment(CommentKind::Block));
    }

    #[test]
    fn test_comment_markers_inside_strings_are_ignored() {
        let toks = kinds(r#"val url = "http://x/*y*/" "#);
        assert!(toks.iter().all(|(k, _)| !matches!(k, TokenKind::Comment(_))));
        assert_eq!(toks[3], (TokenKind::StringLit, r#""http://x/*y*/""#));
    }

    #[test]
    fn test_escaped_quote_in_string() {
        let toks = kinds(r#""a\"b" c"#);
        assert_eq!(toks[0], (TokenKind::StringLit, r#""a\"b""#));
        assert_eq!(toks[1], (TokenKind::Ident, "c"));
    }

    #[test]
    fn test_triple_quoted_string_spans_lines() {
        let toks = Lexer::new("val s = \"\"\"a\n// not a comment\nb\"\"\"\nval t").tokenize();
        let s = toks.iter().find(|t| t.kind == TokenKind::StringLit).unwrap();
        assert_eq!(s.start.line, 1);
        assert_eq!(s.end.line, 3);
        assert!(toks.iter().all(|t| !t.is_comment()));
    }

    #[test]
    fn test_char_literals_and_symbols() {
        let toks = kinds(r"'a' '\n' 'é' 'sym");
        assert_eq!(toks[0], (TokenKind::CharLit, "'a'"));
        assert_eq!(toks[1], (TokenKind::CharLit, r"'\n'"));
        assert_eq!(toks[2], (TokenKind::CharLit, "'é'"));
        assert_eq!(toks[3], (TokenKind::Punct, "'"));
        assert_eq!(toks[4], (TokenKind::Ident, "sym"));
    }

    #[test]
    fn test_operators_stop_before_comments() {
        let toks = kinds("a =>// c");
        assert_eq!(toks[1], (TokenKind::Operator, "=>"));
        assert_eq!(toks[2].0, TokenKind::Comment(CommentKind::Line));
    }

    #[test]
    fn test_numbers() {
        let toks = kinds("1.5 0xFF 10L xs.length");
        assert_eq!(toks[0], (TokenKind::Number, "1.5"));
        assert_eq!(toks[1], (TokenKind::Number, "0xFF"));
        assert_eq!(toks[2], (TokenKind::Number, "10L"));
        assert_eq!(toks[3], (TokenKind::Ident, "xs"));
        assert_eq!(toks[4], (TokenKind::Punct, "."));
    }

    #[test]
    fn test_line_endings_crlf_and_cr() {
        let toks = Lexer::new("a\r\nb\rc\nd").tokenize();
        let lines: Vec<_> = toks.iter().map(|t| t.start.line).collect();
        assert_eq!(lines, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_unterminated_block_comment_runs_to_end() {
        let toks = kinds("val a /* never closed\nval b");
        assert_eq!(toks.len(), 3);
        assert_eq!(toks[2].0, TokenKind::Comment(CommentKind::Block));
    }

    #[test]
    fn test_backquoted_identifier() {
        let toks = kinds("`type` = 1");
        assert_eq!(toks[0], (TokenKind::Ident, "`type`"));
    }

    #[test]
    fn test_non_ascii_identifier() {
        let toks = kinds("val größe = 1");
        assert_eq!(toks[1], (TokenKind::Ident, "größe"));
    }

    #[test]
    fn test_comments_flag_headers() {
        let tokens = Lexer::new("/* licence */\n// note\npackage a\n/* body */").tokenize();
        let cs = comments(&tokens);
        assert_eq!(cs.len(), 3);
        assert!(cs[0].header);
        assert!(!cs[1].header, "line comments are never headers");
        assert!(!cs[2].header, "comments after code are never headers");
    }
}
