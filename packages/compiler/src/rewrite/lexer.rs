//! Expression Scanner
//!
//! Tokenizes the JS-flavored expression text embedded in bindings. Tokens
//! carry byte spans into the original source, so rewrite passes splice
//! replacement text at exact offsets and everything between tokens
//! (whitespace, comments) survives untouched.
//!
//! This is a scanner, not a parser: it understands strings, template
//! literals (including nested interpolations), regular expressions,
//! numbers, identifiers and operators, and nothing about grammar.

use crate::chars;
use crate::error::RewriteError;

/// Token kinds in embedded expression code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Punctuation that never merges: `( ) [ ] { } , : ; .`
    Character,
    Identifier,
    Keyword,
    String,
    /// One raw text segment of a template literal, interpolations excluded.
    TemplateString,
    Operator,
    Number,
    /// A regular expression literal, flags included.
    RegExp,
}

/// Token with raw text and byte span into the scanned source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub start: usize,
    pub end: usize,
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    fn new(start: usize, end: usize, kind: TokenKind, text: impl Into<String>) -> Self {
        Token {
            start,
            end,
            kind,
            text: text.into(),
        }
    }

    pub fn is_identifier(&self) -> bool {
        self.kind == TokenKind::Identifier
    }

    pub fn is_character(&self, ch: char) -> bool {
        self.kind == TokenKind::Character && self.text.len() == ch.len_utf8() && self.text.starts_with(ch)
    }

    pub fn is_operator(&self, op: &str) -> bool {
        self.kind == TokenKind::Operator && self.text == op
    }

    /// String or template-string segment; rewrite passes treat these as
    /// opaque.
    pub fn is_string_like(&self) -> bool {
        matches!(self.kind, TokenKind::String | TokenKind::TemplateString)
    }
}

/// Operators that assign to their left-hand side.
pub fn is_assignment_operator(op: &str) -> bool {
    matches!(
        op,
        "=" | "+="
            | "-="
            | "*="
            | "/="
            | "%="
            | "**="
            | "<<="
            | ">>="
            | ">>>="
            | "&="
            | "|="
            | "^="
            | "&&="
            | "||="
            | "??="
    )
}

/// Increment/decrement operators.
pub fn is_update_operator(op: &str) -> bool {
    op == "++" || op == "--"
}

// Words that can never be reference roots.
const KEYWORDS: &[&str] = &[
    "var", "let", "const", "as", "null", "undefined", "true", "false", "if", "else", "this",
    "typeof", "void", "in", "of", "new", "function", "return", "async", "await", "delete",
    "instanceof",
];

/// Expression lexer over raw binding code.
#[derive(Default)]
pub struct Lexer;

impl Lexer {
    pub fn new() -> Self {
        Lexer
    }

    pub fn tokenize(&self, text: &str) -> Result<Vec<Token>, RewriteError> {
        Scanner::new(text).scan()
    }
}

/// Scanner for tokenizing input
struct Scanner<'a> {
    input: &'a str,
    length: usize,
    index: usize,
    peek: char,
    tokens: Vec<Token>,
    // Track brace depth for template interpolation
    interpolation_brace_stack: Vec<i32>,
    brace_depth: i32,
    resume_template: bool,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        let peek = input.chars().next().unwrap_or(chars::EOF);
        Scanner {
            input,
            length: input.len(),
            index: 0,
            peek,
            tokens: Vec::new(),
            interpolation_brace_stack: Vec::new(),
            brace_depth: 0,
            resume_template: false,
        }
    }

    fn scan(mut self) -> Result<Vec<Token>, RewriteError> {
        while let Some(token) = self.scan_token()? {
            self.tokens.push(token);
        }
        Ok(self.tokens)
    }

    fn advance(&mut self) {
        self.index += self.peek.len_utf8();
        self.peek = if self.index < self.length {
            self.input[self.index..].chars().next().unwrap_or(chars::EOF)
        } else {
            chars::EOF
        };
    }

    fn peek_next(&self) -> Option<char> {
        let next_index = self.index + self.peek.len_utf8();
        if next_index < self.length {
            self.input[next_index..].chars().next()
        } else {
            None
        }
    }

    fn raw(&self, start: usize) -> &'a str {
        &self.input[start..self.index]
    }

    fn scan_token(&mut self) -> Result<Option<Token>, RewriteError> {
        if self.resume_template {
            self.resume_template = false;
            let start = self.index;
            return self.scan_template_part(start).map(Some);
        }

        // Skip whitespace and comments
        loop {
            while self.index < self.length && chars::is_whitespace(self.peek) {
                self.advance();
            }
            if self.peek == chars::SLASH && self.peek_next() == Some(chars::SLASH) {
                while self.index < self.length && self.peek != chars::LF && self.peek != chars::CR {
                    self.advance();
                }
                continue;
            }
            if self.peek == chars::SLASH && self.peek_next() == Some(chars::STAR) {
                self.advance();
                self.advance();
                while self.index < self.length
                    && !(self.peek == chars::STAR && self.peek_next() == Some(chars::SLASH))
                {
                    self.advance();
                }
                if self.index < self.length {
                    self.advance();
                    self.advance();
                }
                continue;
            }
            break;
        }

        if self.index >= self.length {
            return Ok(None);
        }

        let start = self.index;
        let ch = self.peek;

        // `${` resumes expression scanning inside a template literal
        if ch == chars::DOLLAR && self.peek_next() == Some(chars::LBRACE) {
            self.advance();
            self.advance();
            self.interpolation_brace_stack.push(self.brace_depth);
            self.brace_depth += 1;
            return Ok(Some(Token::new(start, self.index, TokenKind::Operator, "${")));
        }

        if chars::is_identifier_start(ch) {
            return Ok(Some(self.scan_identifier(start)));
        }

        if chars::is_digit(ch) {
            return Ok(Some(self.scan_number(start)));
        }

        match ch {
            chars::PERIOD => {
                self.advance();
                if chars::is_digit(self.peek) {
                    return Ok(Some(self.scan_number(start)));
                }
                Ok(Some(Token::new(start, self.index, TokenKind::Character, ".")))
            }
            chars::LPAREN
            | chars::RPAREN
            | chars::LBRACKET
            | chars::RBRACKET
            | chars::COMMA
            | chars::COLON
            | chars::SEMICOLON => Ok(Some(self.scan_character(start, ch))),
            chars::LBRACE => {
                self.brace_depth += 1;
                Ok(Some(self.scan_character(start, ch)))
            }
            chars::RBRACE => {
                self.brace_depth -= 1;
                let token = self.scan_character(start, ch);
                if let Some(&target_depth) = self.interpolation_brace_stack.last() {
                    if self.brace_depth == target_depth {
                        self.interpolation_brace_stack.pop();
                        self.resume_template = true;
                    }
                }
                Ok(Some(token))
            }
            chars::SQ | chars::DQ => self.scan_string(start, ch).map(Some),
            chars::BT => {
                self.advance();
                self.scan_template_part(start).map(Some)
            }
            '#' => {
                self.advance();
                if !chars::is_identifier_start(self.peek) {
                    return Err(RewriteError::UnexpectedCharacter { ch, offset: start });
                }
                Ok(Some(self.scan_identifier(start)))
            }
            chars::PLUS => Ok(Some(self.scan_operator_family(start, '+'))),
            chars::MINUS => Ok(Some(self.scan_operator_family(start, '-'))),
            chars::STAR => {
                self.advance();
                if self.peek == chars::EQ {
                    self.advance();
                    return Ok(Some(self.operator(start)));
                }
                if self.peek == chars::STAR {
                    self.advance();
                    if self.peek == chars::EQ {
                        self.advance();
                    }
                }
                Ok(Some(self.operator(start)))
            }
            chars::SLASH => {
                if self.regex_allowed() {
                    self.advance();
                    return self.scan_regexp(start).map(Some);
                }
                self.advance();
                if self.peek == chars::EQ {
                    self.advance();
                }
                Ok(Some(self.operator(start)))
            }
            chars::PERCENT | chars::CARET => {
                self.advance();
                if self.peek == chars::EQ {
                    self.advance();
                }
                Ok(Some(self.operator(start)))
            }
            chars::AMPERSAND => Ok(Some(self.scan_logical_family(start, chars::AMPERSAND))),
            chars::BAR => Ok(Some(self.scan_logical_family(start, chars::BAR))),
            chars::LT => {
                self.advance();
                if self.peek == chars::EQ {
                    self.advance();
                } else if self.peek == chars::LT {
                    self.advance();
                    if self.peek == chars::EQ {
                        self.advance();
                    }
                }
                Ok(Some(self.operator(start)))
            }
            chars::GT => {
                self.advance();
                if self.peek == chars::EQ {
                    self.advance();
                } else if self.peek == chars::GT {
                    self.advance();
                    if self.peek == chars::GT {
                        self.advance();
                    }
                    if self.peek == chars::EQ {
                        self.advance();
                    }
                }
                Ok(Some(self.operator(start)))
            }
            chars::QUESTION => {
                self.advance();
                if self.peek == chars::PERIOD {
                    self.advance();
                } else if self.peek == chars::QUESTION {
                    self.advance();
                    if self.peek == chars::EQ {
                        self.advance();
                    }
                }
                Ok(Some(self.operator(start)))
            }
            chars::BANG => {
                self.advance();
                if self.peek == chars::EQ {
                    self.advance();
                    if self.peek == chars::EQ {
                        self.advance();
                    }
                }
                Ok(Some(self.operator(start)))
            }
            chars::EQ => {
                self.advance();
                if self.peek == chars::EQ {
                    self.advance();
                    if self.peek == chars::EQ {
                        self.advance();
                    }
                } else if self.peek == chars::GT {
                    // Arrow `=>`
                    self.advance();
                }
                Ok(Some(self.operator(start)))
            }
            chars::TILDA => {
                self.advance();
                Ok(Some(self.operator(start)))
            }
            _ => Err(RewriteError::UnexpectedCharacter { ch, offset: start }),
        }
    }

    fn operator(&self, start: usize) -> Token {
        Token::new(start, self.index, TokenKind::Operator, self.raw(start))
    }

    fn scan_character(&mut self, start: usize, ch: char) -> Token {
        self.advance();
        Token::new(start, self.index, TokenKind::Character, ch.to_string())
    }

    fn scan_identifier(&mut self, start: usize) -> Token {
        self.advance();
        while self.index < self.length && chars::is_identifier_part(self.peek) {
            self.advance();
        }
        let text = self.raw(start);
        let kind = if KEYWORDS.contains(&text) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        };
        Token::new(start, self.index, kind, text)
    }

    fn scan_number(&mut self, start: usize) -> Token {
        while self.index < self.length {
            if chars::is_digit(self.peek)
                || self.peek == chars::PERIOD
                || self.peek == chars::UNDERSCORE
            {
                self.advance();
            } else if self.peek == 'e' || self.peek == 'E' {
                self.advance();
                if self.peek == chars::PLUS || self.peek == chars::MINUS {
                    self.advance();
                }
            } else {
                break;
            }
        }
        Token::new(start, self.index, TokenKind::Number, self.raw(start))
    }

    /// `+` and `-` each combine with themselves (update) or `=` (compound
    /// assignment).
    fn scan_operator_family(&mut self, start: usize, ch: char) -> Token {
        self.advance();
        if self.peek == ch || self.peek == chars::EQ {
            self.advance();
        }
        self.operator(start)
    }

    /// `&` and `|` scan to `&&`, `&&=`, `&=` and the `|` equivalents.
    fn scan_logical_family(&mut self, start: usize, ch: char) -> Token {
        self.advance();
        if self.peek == ch {
            self.advance();
            if self.peek == chars::EQ {
                self.advance();
            }
        } else if self.peek == chars::EQ {
            self.advance();
        }
        self.operator(start)
    }

    fn scan_string(&mut self, start: usize, quote: char) -> Result<Token, RewriteError> {
        self.advance();
        while self.index < self.length {
            let ch = self.peek;
            if ch == chars::BACKSLASH {
                self.advance();
                if self.index < self.length {
                    self.advance();
                }
            } else if ch == quote {
                self.advance();
                return Ok(Token::new(start, self.index, TokenKind::String, self.raw(start)));
            } else {
                self.advance();
            }
        }
        Err(RewriteError::UnterminatedString(start))
    }

    /// One raw segment of a template literal: from the opening backtick (or
    /// the `}` closing an interpolation) up to the closing backtick or the
    /// next `${`.
    fn scan_template_part(&mut self, start: usize) -> Result<Token, RewriteError> {
        while self.index < self.length {
            let ch = self.peek;
            if ch == chars::BACKSLASH {
                self.advance();
                if self.index < self.length {
                    self.advance();
                }
            } else if ch == chars::BT {
                self.advance();
                return Ok(Token::new(
                    start,
                    self.index,
                    TokenKind::TemplateString,
                    self.raw(start),
                ));
            } else if ch == chars::DOLLAR && self.peek_next() == Some(chars::LBRACE) {
                // Leave `${` for the expression scanner
                return Ok(Token::new(
                    start,
                    self.index,
                    TokenKind::TemplateString,
                    self.raw(start),
                ));
            } else {
                self.advance();
            }
        }
        Err(RewriteError::UnterminatedTemplate(start))
    }

    /// Whether a `/` at the current position starts a regular expression
    /// rather than a division, judged from the previous token.
    fn regex_allowed(&self) -> bool {
        match self.tokens.last() {
            None => true,
            Some(last) => match last.kind {
                TokenKind::Identifier
                | TokenKind::Number
                | TokenKind::String
                | TokenKind::TemplateString
                | TokenKind::RegExp => false,
                TokenKind::Character => {
                    let s = last.text.as_str();
                    s != ")" && s != "]" && s != "}"
                }
                TokenKind::Operator => true,
                TokenKind::Keyword => last.text != "this",
            },
        }
    }

    fn scan_regexp(&mut self, start: usize) -> Result<Token, RewriteError> {
        let mut in_class = false;
        while self.index < self.length {
            let ch = self.peek;
            if ch == chars::BACKSLASH {
                self.advance();
                if self.index < self.length {
                    self.advance();
                }
            } else if ch == chars::LF || ch == chars::CR {
                return Err(RewriteError::UnterminatedRegExp(start));
            } else if in_class {
                if ch == chars::RBRACKET {
                    in_class = false;
                }
                self.advance();
            } else if ch == chars::LBRACKET {
                in_class = true;
                self.advance();
            } else if ch == chars::SLASH {
                self.advance();
                // Flags
                while self.index < self.length && chars::is_identifier_part(self.peek) {
                    self.advance();
                }
                return Ok(Token::new(start, self.index, TokenKind::RegExp, self.raw(start)));
            } else {
                self.advance();
            }
        }
        Err(RewriteError::UnterminatedRegExp(start))
    }
}
