//! Function source recovery.
//!
//! A behavior's script is kept as the source text of a function expression.
//! Export needs its parameter list and body separately so it can re-declare
//! the function under an ordinal name, so the text is split here once, at
//! registration time.
//!
//! Accepted forms:
//!
//! ```text
//! (a, b) => { ... }        (a) => expr        a => expr
//! function (a) { ... }     function name(a) { ... }
//! async (a) => { ... }     async function (a) { ... }
//! ```
//!
//! The body is normalized: comments are removed, each line is trimmed, blank
//! lines are dropped and the rest is joined with single spaces. Tokens and
//! string literals survive untouched; formatting and comments do not.

use crate::error::{PageError, Result};

/// Parameter list and normalized body of a function expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSource {
    is_async: bool,
    params: String,
    body: String,
}

impl FunctionSource {
    /// Split a function expression into parameters and body.
    ///
    /// Returns [`PageError::NotAFunction`] for anything that is not one of
    /// the accepted forms (a call expression, a bare statement, ...).
    pub fn parse(source: &str) -> Result<Self> {
        let text = source.trim();
        let not_a_function = || PageError::NotAFunction {
            source_text: text.to_string(),
        };

        let mut rest = text;
        let mut is_async = false;
        if let Some(after) = strip_keyword(rest, "async") {
            rest = after.trim_start();
            is_async = true;
        }

        let (params, after_params, keyword_form) = if let Some(after) = strip_keyword(rest, "function") {
            let after = after.trim_start();
            let name_len = identifier_len(after);
            let after = after[name_len..].trim_start();
            let close = matching_paren(after).ok_or_else(not_a_function)?;
            (&after[1..close], &after[close + 1..], true)
        } else if rest.starts_with('(') {
            let close = matching_paren(rest).ok_or_else(not_a_function)?;
            (&rest[1..close], &rest[close + 1..], false)
        } else {
            let name_len = identifier_len(rest);
            if name_len == 0 {
                return Err(not_a_function());
            }
            (&rest[..name_len], &rest[name_len..], false)
        };

        let after_params = after_params.trim_start();
        let body = if keyword_form {
            if !after_params.starts_with('{') {
                return Err(not_a_function());
            }
            after_params
        } else {
            after_params.strip_prefix("=>").ok_or_else(not_a_function)?.trim_start()
        };

        let body = match body.strip_prefix('{') {
            Some(inner) => {
                let close = matching_brace(body).ok_or_else(not_a_function)?;
                let trailing = body[close + 1..].trim();
                if !trailing.is_empty() && trailing != ";" {
                    return Err(not_a_function());
                }
                &inner[..close - 1]
            }
            None => body.trim_end().trim_end_matches(';'),
        };

        Ok(Self {
            is_async,
            params: params.trim().to_string(),
            body: normalize_body(body),
        })
    }

    /// Parameter list without the surrounding parentheses.
    pub fn params(&self) -> &str {
        &self.params
    }

    /// Normalized single-line body, without braces.
    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn is_async(&self) -> bool {
        self.is_async
    }

    /// `(params)=>{body}`, prefixed with `async ` for async functions.
    pub fn to_arrow(&self) -> String {
        let prefix = if self.is_async { "async " } else { "" };
        format!("{prefix}({})=>{{{}}}", self.params, self.body)
    }

    /// Body as a standalone statement list, always `;`-terminated.
    pub fn to_statements(&self) -> String {
        if self.body.is_empty() || self.body.ends_with(';') {
            self.body.clone()
        } else {
            format!("{};", self.body)
        }
    }
}

fn normalize_body(body: &str) -> String {
    strip_comments(body)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Remove `//` and `/* */` comments outside of string and regex literals.
///
/// A `/` starts a regex literal when the previous significant character
/// cannot end an operand (an operator, an opening bracket, `,`, `;` or the
/// start of the body).
fn strip_comments(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    let mut quote: Option<char> = None;
    let mut in_class = false;

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            out.push(c);
            if c == '\\' {
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            } else if q == '/' && c == '[' {
                in_class = true;
            } else if q == '/' && c == ']' {
                in_class = false;
            } else if c == q && !in_class {
                quote = None;
            }
            continue;
        }
        match (c, chars.peek()) {
            ('/', Some('/')) => {
                // Keep the newline so the statement on the next line stays separate.
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = ' ';
                for skipped in chars.by_ref() {
                    if prev == '*' && skipped == '/' {
                        break;
                    }
                    prev = skipped;
                }
                out.push(' ');
            }
            ('/', _) if regex_allowed(&out) => {
                quote = Some('/');
                out.push(c);
            }
            _ => {
                if matches!(c, '\'' | '"' | '`') {
                    quote = Some(c);
                }
                out.push(c);
            }
        }
    }
    out
}

/// Whether a `/` following `before` opens a regex literal rather than
/// dividing.
fn regex_allowed(before: &str) -> bool {
    let trimmed = before.trim_end();
    match trimmed.chars().last() {
        None => true,
        Some(c) if is_identifier_part(c) => {
            let word_start = trimmed
                .char_indices()
                .rev()
                .take_while(|&(_, c)| is_identifier_part(c))
                .last()
                .map_or(0, |(i, _)| i);
            matches!(&trimmed[word_start..], "return" | "typeof" | "case" | "do" | "else" | "in" | "of" | "void")
        }
        Some(c) => !matches!(c, ')' | ']' | '}' | '\'' | '"' | '`'),
    }
}

/// Words that cannot name a script binding.
const RESERVED_WORDS: &[&str] = &[
    "await", "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete", "do",
    "else", "enum", "export", "extends", "false", "finally", "for", "function", "if", "implements", "import",
    "in", "instanceof", "interface", "let", "new", "null", "package", "private", "protected", "public",
    "return", "static", "super", "switch", "this", "throw", "true", "try", "typeof", "var", "void", "while",
    "with", "yield", "arguments", "eval", "undefined", "NaN", "Infinity",
];

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_identifier_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Byte length of the identifier at the start of `text` (0 if none).
fn identifier_len(text: &str) -> usize {
    let mut chars = text.char_indices();
    match chars.next() {
        Some((_, c)) if is_identifier_start(c) => {}
        _ => return 0,
    }
    chars
        .find(|&(_, c)| !is_identifier_part(c))
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

/// Whether `name` can be used as a script binding: identifier characters
/// only, and not a reserved word.
pub fn is_identifier(name: &str) -> bool {
    !name.is_empty() && identifier_len(name) == name.len() && !RESERVED_WORDS.contains(&name)
}

fn strip_keyword<'a>(text: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = text.strip_prefix(keyword)?;
    match rest.chars().next() {
        Some(c) if is_identifier_part(c) => None,
        _ => Some(rest),
    }
}

/// Index of the `)` closing the `(` at the start of `text`.
///
/// Quotes are honored so a parenthesis inside a default-value string does
/// not end the list early.
fn matching_paren(text: &str) -> Option<usize> {
    if !text.starts_with('(') {
        return None;
    }
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' | '`' => quote = Some(c),
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Index of the `}` closing the `{` at the start of `text`.
///
/// Braces inside string literals, regex literals and comments are skipped.
fn matching_brace(text: &str) -> Option<usize> {
    if !text.starts_with('{') {
        return None;
    }
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut in_class = false;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if q == '/' && c == '[' {
                in_class = true;
            } else if q == '/' && c == ']' {
                in_class = false;
            } else if c == q && !in_class {
                quote = None;
            }
            continue;
        }
        match (c, chars.peek().map(|&(_, next)| next)) {
            ('/', Some('/')) => {
                while chars.next_if(|&(_, c)| c != '\n').is_some() {}
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = ' ';
                for (_, skipped) in chars.by_ref() {
                    if prev == '*' && skipped == '/' {
                        break;
                    }
                    prev = skipped;
                }
            }
            ('/', _) if regex_allowed(&text[..i]) => quote = Some('/'),
            ('\'' | '"' | '`', _) => quote = Some(c),
            ('{', _) => depth += 1,
            ('}', _) => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}
