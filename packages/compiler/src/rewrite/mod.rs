//! Binding Rewriter
//!
//! Narrow, parser-agnostic rewrite operations over the expression code
//! embedded in bindings. Generators depend only on the
//! [`ExpressionRewriter`] trait; [`LexicalRewriter`] is the built-in
//! implementation, a token scanner plus span splicing. A full JS parser
//! can be slotted in behind the same trait without touching any emitter.
//!
//! All operations are best-effort syntactic rewrites: they understand
//! strings, template literals, comments and nesting, but not grammar.
//! Malformed input (an unterminated literal, an illegal character) fails
//! the whole operation.

pub mod lexer;

use crate::error::RewriteError;

use lexer::{is_assignment_operator, is_update_operator, Lexer, Token, TokenKind};

/// Rewrite operations a generator needs over embedded expression code.
pub trait ExpressionRewriter: Send + Sync {
    /// Replace each root-level occurrence of `root` followed by `.` with
    /// `replace_with`, dot included. `rewrite_reference_roots(code,
    /// "state", "this.")` turns `state.count` into `this.count`; an empty
    /// `replace_with` strips the prefix entirely. Occurrences preceded by
    /// `.` or `?.` are member accesses, not roots, and string contents are
    /// never touched.
    fn rewrite_reference_roots(
        &self,
        code: &str,
        root: &str,
        replace_with: &str,
    ) -> Result<String, RewriteError>;

    /// Insert `marker` (a complete call expression) after every statement
    /// containing an increment, decrement or assignment whose left-hand
    /// root is `root`. One marker per statement. Statements assigning to a
    /// `_temp`-prefixed identifier are synthetic splices from an earlier
    /// rewrite and are skipped.
    fn insert_after_mutations(
        &self,
        code: &str,
        root: &str,
        marker: &str,
    ) -> Result<String, RewriteError>;

    /// Rewrite single-level writes through `root` into setter calls built
    /// by `to_setter(field, value_expression)`. Handles `root.f = v`,
    /// `root.f += v`, `root.f -= v`, `root.f++` and `root.f--`; nested
    /// paths, computed members and other compound operators are left
    /// unchanged with a warning.
    fn rewrite_state_setters(
        &self,
        code: &str,
        root: &str,
        to_setter: &dyn Fn(&str, &str) -> String,
    ) -> Result<String, RewriteError>;
}

/// Built-in [`ExpressionRewriter`] over the token scanner in
/// [`lexer`].
#[derive(Debug, Default, Clone, Copy)]
pub struct LexicalRewriter;

impl LexicalRewriter {
    pub fn new() -> Self {
        LexicalRewriter
    }
}

/// One pending text replacement; `at == remove_to` is a pure insertion.
struct Splice {
    at: usize,
    remove_to: usize,
    text: String,
}

fn apply_splices(source: &str, mut splices: Vec<Splice>) -> String {
    splices.sort_by_key(|splice| splice.at);
    let mut out = String::with_capacity(source.len() + splices.len() * 16);
    let mut cursor = 0;
    for splice in splices {
        out.push_str(&source[cursor..splice.at]);
        out.push_str(&splice.text);
        cursor = splice.remove_to;
    }
    out.push_str(&source[cursor..]);
    out
}

/// Whether the token at `index` is reached through `.` or `?.`, making it
/// a member name rather than a reference root.
fn member_access_before(tokens: &[Token], index: usize) -> bool {
    index > 0 && {
        let prev = &tokens[index - 1];
        prev.is_character('.') || prev.is_operator("?.")
    }
}

/// A member path starting at a root identifier: `root.a.b`, `root[expr]`.
struct MemberPath {
    /// Token index one past the path.
    end_index: usize,
    /// Byte offset one past the path text.
    end_offset: usize,
    /// Member steps taken; 0 means a bare root reference.
    steps: usize,
    /// First `.name` member, if the path starts with a plain member.
    first_field: Option<String>,
    /// True when any step is a computed `[expr]` member.
    computed: bool,
}

/// Skip a balanced `[...]` group starting at `open`; returns the index one
/// past the matching close, or `tokens.len()` when unbalanced.
fn skip_balanced(tokens: &[Token], open: usize) -> usize {
    let mut depth = 0i32;
    let mut i = open;
    while i < tokens.len() {
        let t = &tokens[i];
        if t.is_character('[') || t.is_character('(') || t.is_character('{') {
            depth += 1;
        } else if t.is_character(']') || t.is_character(')') || t.is_character('}') {
            depth -= 1;
            if depth == 0 {
                return i + 1;
            }
        }
        i += 1;
    }
    tokens.len()
}

/// Match a member path rooted at `root` starting at token `index`.
fn member_path(tokens: &[Token], index: usize, root: &str) -> Option<MemberPath> {
    let head = tokens.get(index)?;
    if !head.is_identifier() || head.text != root || member_access_before(tokens, index) {
        return None;
    }

    let mut i = index + 1;
    let mut end_offset = head.end;
    let mut steps = 0;
    let mut first_field = None;
    let mut computed = false;

    loop {
        match tokens.get(i) {
            Some(dot) if dot.is_character('.') => match tokens.get(i + 1) {
                Some(name)
                    if name.kind == TokenKind::Identifier || name.kind == TokenKind::Keyword =>
                {
                    if steps == 0 {
                        first_field = Some(name.text.clone());
                    }
                    steps += 1;
                    end_offset = name.end;
                    i += 2;
                }
                _ => break,
            },
            Some(open) if open.is_character('[') => {
                computed = true;
                steps += 1;
                i = skip_balanced(tokens, i);
                end_offset = tokens
                    .get(i.saturating_sub(1))
                    .map(|t| t.end)
                    .unwrap_or(end_offset);
            }
            _ => break,
        }
    }

    Some(MemberPath {
        end_index: i,
        end_offset,
        steps,
        first_field,
        computed,
    })
}

/// Whether a mutation of `root` starts at token `index`: a member path
/// followed by an assignment or update operator, or a prefix update
/// operator followed by a member path.
fn mutation_at(tokens: &[Token], index: usize, root: &str) -> bool {
    if let Some(path) = member_path(tokens, index, root) {
        if path.steps > 0 {
            if let Some(next) = tokens.get(path.end_index) {
                if next.kind == TokenKind::Operator
                    && (is_assignment_operator(&next.text) || is_update_operator(&next.text))
                {
                    return true;
                }
            }
        }
    }

    let t = &tokens[index];
    if t.kind == TokenKind::Operator && is_update_operator(&t.text) {
        let prefix_position = index == 0 || {
            let prev = &tokens[index - 1];
            !(prev.kind == TokenKind::Identifier
                || prev.kind == TokenKind::Number
                || prev.is_string_like()
                || prev.is_character(')')
                || prev.is_character(']'))
        };
        if prefix_position {
            if let Some(path) = member_path(tokens, index + 1, root) {
                return path.steps > 0;
            }
        }
    }

    false
}

/// Whether a `{` at token `index` opens a block (as opposed to an object
/// literal), judged from the previous token.
fn brace_starts_block(tokens: &[Token], index: usize) -> bool {
    match index.checked_sub(1).and_then(|i| tokens.get(i)) {
        None => true,
        Some(prev) => {
            if prev.is_operator("=>") {
                return true;
            }
            if prev.is_character(')')
                || prev.is_character(';')
                || prev.is_character('{')
                || prev.is_character('}')
            {
                return true;
            }
            matches!(prev.kind, TokenKind::Keyword)
                && matches!(prev.text.as_str(), "else" | "do" | "try" | "finally")
        }
    }
}

/// Whether the statement suspended around a just-closed block continues
/// after the `}` at token `index`.
fn statement_continues_after(tokens: &[Token], index: usize) -> bool {
    match tokens.get(index + 1) {
        None => false,
        Some(next) => {
            next.kind == TokenKind::Operator
                || next.is_character('.')
                || next.is_character('(')
                || next.is_character('[')
                || next.is_character(',')
                || next.is_character(';')
                || next.is_character(')')
                || next.is_character(']')
        }
    }
}

/// Per-block-frame statement bookkeeping for the marker pass.
struct StmtFrame {
    at_start: bool,
    temp_guard: bool,
    has_mutation: bool,
    last_end: usize,
    paren_depth: i32,
}

impl StmtFrame {
    fn fresh() -> Self {
        StmtFrame {
            at_start: true,
            temp_guard: false,
            has_mutation: false,
            last_end: 0,
            paren_depth: 0,
        }
    }

    fn reset_statement(&mut self) {
        self.at_start = true;
        self.temp_guard = false;
        self.has_mutation = false;
    }

    fn note(&mut self, tokens: &[Token], index: usize) {
        let t = &tokens[index];
        if self.at_start {
            self.at_start = false;
            self.temp_guard = t.is_identifier()
                && t.text.starts_with("_temp")
                && tokens.get(index + 1).map_or(false, |n| n.is_operator("="));
        }
        self.last_end = t.end;
    }

    fn pending_marker(&self) -> bool {
        self.has_mutation && !self.temp_guard
    }
}

impl ExpressionRewriter for LexicalRewriter {
    fn rewrite_reference_roots(
        &self,
        code: &str,
        root: &str,
        replace_with: &str,
    ) -> Result<String, RewriteError> {
        let tokens = Lexer::new().tokenize(code)?;
        let mut splices = Vec::new();

        for (i, token) in tokens.iter().enumerate() {
            if !token.is_identifier() || token.text != root || member_access_before(&tokens, i) {
                continue;
            }
            if let Some(dot) = tokens.get(i + 1) {
                if dot.is_character('.') {
                    splices.push(Splice {
                        at: token.start,
                        remove_to: dot.end,
                        text: replace_with.to_string(),
                    });
                }
            }
        }

        Ok(apply_splices(code, splices))
    }

    fn insert_after_mutations(
        &self,
        code: &str,
        root: &str,
        marker: &str,
    ) -> Result<String, RewriteError> {
        let tokens = Lexer::new().tokenize(code)?;
        let mut splices = Vec::new();
        let mut frames = vec![StmtFrame::fresh()];
        // true = block scope, false = object literal
        let mut brace_kinds: Vec<bool> = Vec::new();

        for i in 0..tokens.len() {
            let is_block_open = tokens[i].is_character('{') && brace_starts_block(&tokens, i);

            if is_block_open {
                brace_kinds.push(true);
                frames.push(StmtFrame::fresh());
                continue;
            }

            if tokens[i].is_character('{') {
                brace_kinds.push(false);
                if let Some(frame) = frames.last_mut() {
                    frame.paren_depth += 1;
                    frame.note(&tokens, i);
                }
                continue;
            }

            if tokens[i].is_character('}') {
                match brace_kinds.pop() {
                    Some(true) => {
                        // Close the block: flush its trailing statement.
                        if let Some(inner) = frames.pop() {
                            if inner.pending_marker() {
                                splices.push(Splice {
                                    at: inner.last_end,
                                    remove_to: inner.last_end,
                                    text: format!("; {}", marker),
                                });
                            }
                        }
                        if let Some(outer) = frames.last_mut() {
                            outer.note(&tokens, i);
                            if !statement_continues_after(&tokens, i) {
                                if outer.pending_marker() {
                                    splices.push(Splice {
                                        at: tokens[i].end,
                                        remove_to: tokens[i].end,
                                        text: format!("; {}", marker),
                                    });
                                }
                                outer.reset_statement();
                            }
                        }
                    }
                    _ => {
                        if let Some(frame) = frames.last_mut() {
                            frame.paren_depth -= 1;
                            frame.note(&tokens, i);
                        }
                    }
                }
                continue;
            }

            let frame = match frames.last_mut() {
                Some(frame) => frame,
                None => break,
            };

            if tokens[i].is_character('(') || tokens[i].is_character('[') {
                frame.paren_depth += 1;
                frame.note(&tokens, i);
                continue;
            }
            if tokens[i].is_character(')') || tokens[i].is_character(']') {
                frame.paren_depth -= 1;
                frame.note(&tokens, i);
                continue;
            }

            if tokens[i].is_character(';') && frame.paren_depth == 0 {
                if frame.pending_marker() {
                    splices.push(Splice {
                        at: tokens[i].end,
                        remove_to: tokens[i].end,
                        text: format!(" {};", marker),
                    });
                }
                frame.reset_statement();
                continue;
            }

            frame.note(&tokens, i);
            if mutation_at(&tokens, i, root) {
                frame.has_mutation = true;
            }
        }

        // Flush whatever is still open at end of input.
        while let Some(frame) = frames.pop() {
            if frame.pending_marker() {
                splices.push(Splice {
                    at: frame.last_end,
                    remove_to: frame.last_end,
                    text: format!("; {}", marker),
                });
            }
        }

        Ok(apply_splices(code, splices))
    }

    fn rewrite_state_setters(
        &self,
        code: &str,
        root: &str,
        to_setter: &dyn Fn(&str, &str) -> String,
    ) -> Result<String, RewriteError> {
        let tokens = Lexer::new().tokenize(code)?;
        let mut splices = Vec::new();
        let mut consumed_until = 0usize;

        for i in 0..tokens.len() {
            if tokens[i].start < consumed_until {
                continue;
            }

            // Prefix update: ++root.field
            if tokens[i].kind == TokenKind::Operator && is_update_operator(&tokens[i].text) {
                if let Some(path) = member_path(&tokens, i + 1, root) {
                    if path.steps == 1 && !path.computed {
                        if let Some(field) = path.first_field.as_deref() {
                            let value = update_value(field, &tokens[i].text);
                            splices.push(Splice {
                                at: tokens[i].start,
                                remove_to: path.end_offset,
                                text: to_setter(field, &value),
                            });
                            consumed_until = path.end_offset;
                            continue;
                        }
                    }
                }
            }

            let path = match member_path(&tokens, i, root) {
                Some(path) if path.steps > 0 => path,
                _ => continue,
            };
            let next = match tokens.get(path.end_index) {
                Some(next) if next.kind == TokenKind::Operator => next,
                _ => continue,
            };
            let path_text = &code[tokens[i].start..path.end_offset];

            if is_update_operator(&next.text) {
                if path.steps == 1 && !path.computed {
                    if let Some(field) = path.first_field.as_deref() {
                        let value = update_value(field, &next.text);
                        splices.push(Splice {
                            at: tokens[i].start,
                            remove_to: next.end,
                            text: to_setter(field, &value),
                        });
                        consumed_until = next.end;
                    }
                } else {
                    log::warn!("cannot rewrite update of `{}` to a setter", path_text);
                }
                continue;
            }

            if !is_assignment_operator(&next.text) {
                continue;
            }

            if path.steps > 1 || path.computed {
                log::warn!("cannot rewrite assignment to `{}` to a setter", path_text);
                continue;
            }
            if !matches!(next.text.as_str(), "=" | "+=" | "-=") {
                log::warn!(
                    "cannot rewrite `{} {}` to a setter",
                    path_text,
                    next.text
                );
                continue;
            }

            let (rhs_text, rhs_end) = match value_span(code, &tokens, path.end_index + 1) {
                Some(span) => span,
                None => {
                    log::warn!("assignment to `{}` has no right-hand side", path_text);
                    continue;
                }
            };
            let field = match path.first_field.as_deref() {
                Some(field) => field,
                None => continue,
            };
            let value = match next.text.as_str() {
                "+=" => format!("{} + ({})", field, rhs_text),
                "-=" => format!("{} - ({})", field, rhs_text),
                _ => rhs_text.to_string(),
            };
            splices.push(Splice {
                at: tokens[i].start,
                remove_to: rhs_end,
                text: to_setter(field, &value),
            });
            consumed_until = rhs_end;
        }

        Ok(apply_splices(code, splices))
    }
}

fn update_value(field: &str, op: &str) -> String {
    if op == "++" {
        format!("{} + 1", field)
    } else {
        format!("{} - 1", field)
    }
}

/// The right-hand-side span of an assignment: from token `from` to the end of
/// the statement (a top-level `;` or `,`, an unbalanced closer, or end of
/// input). Returns the trimmed source text and its end offset.
fn value_span<'a>(code: &'a str, tokens: &[Token], from: usize) -> Option<(&'a str, usize)> {
    let mut depth = 0i32;
    let mut last_end = None;
    let mut i = from;
    while i < tokens.len() {
        let t = &tokens[i];
        if t.is_character('(') || t.is_character('[') || t.is_character('{') {
            depth += 1;
        } else if t.is_character(')') || t.is_character(']') || t.is_character('}') {
            if depth == 0 {
                break;
            }
            depth -= 1;
        } else if depth == 0 && (t.is_character(';') || t.is_character(',')) {
            break;
        }
        last_end = Some(t.end);
        i += 1;
    }
    let end = last_end?;
    let start = tokens.get(from)?.start;
    Some((code[start..end].trim(), end))
}
