//! Grammar-light CSS tokenizer, rule parser and serializer.
//!
//! This is not a CSS parser in the specification sense. Stylesheet text is
//! cut into free text and the three structural characters `{`, `}` and `;`,
//! with comments removed and quoted strings kept opaque. Rules are rebuilt
//! from that flat token stream as `selector { declaration; ... }` blocks.
//!
//! There is no nesting: at-rules with their own blocks (`@media`,
//! `@supports`) misparse into a rule whose first "declarations" are the
//! inner selectors. Statements without a block (`@import`, `@charset`) are
//! dropped.

use alloc::string::String;
use alloc::vec::Vec;

/// Structural token produced by [`tokenize_css`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    /// Trimmed, non-empty free text between structural characters.
    Text(String),
    /// `{`
    OpenBrace,
    /// `}`
    CloseBrace,
    /// `;`
    Semicolon,
}

/// One `selector { ... }` block.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Rule {
    /// Selector text as written (text tokens joined with single spaces).
    pub selector: String,
    /// Raw declaration strings in source order, without trailing `;`.
    pub declarations: Vec<String>,
}

impl Rule {
    /// Create a rule from a selector and declarations.
    pub fn new(selector: impl Into<String>, declarations: Vec<String>) -> Self {
        Self {
            selector: selector.into(),
            declarations,
        }
    }
}

/// Remove `/* ... */` comments.
///
/// An unterminated comment swallows the rest of the input.
pub fn strip_comments(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut rest = css;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            None => return out,
        }
    }
    out.push_str(rest);
    out
}

/// Tokenize stylesheet text into free text and structural punctuation.
///
/// Inside a `"` or `'` string, braces and semicolons are plain text; a quote
/// preceded by a backslash does not close the string.
pub fn tokenize_css(css: &str) -> Vec<Token> {
    let stripped = strip_comments(css);
    let mut tokens = Vec::with_capacity(32);
    let mut current = String::with_capacity(64);
    let mut in_string: Option<char> = None;
    let mut prev: Option<char> = None;

    for ch in stripped.chars() {
        if let Some(quote) = in_string {
            current.push(ch);
            if ch == quote && prev != Some('\\') {
                in_string = None;
            }
            prev = Some(ch);
            continue;
        }
        match ch {
            '"' | '\'' => {
                in_string = Some(ch);
                current.push(ch);
            }
            '{' | '}' | ';' => {
                flush_text(&mut current, &mut tokens);
                tokens.push(match ch {
                    '{' => Token::OpenBrace,
                    '}' => Token::CloseBrace,
                    _ => Token::Semicolon,
                });
            }
            _ => current.push(ch),
        }
        prev = Some(ch);
    }
    flush_text(&mut current, &mut tokens);
    tokens
}

fn flush_text(current: &mut String, tokens: &mut Vec<Token>) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        tokens.push(Token::Text(String::from(trimmed)));
    }
    current.clear();
}

/// Group a token stream into rules.
///
/// A run of text tokens followed by `{` opens a rule; every text token up to
/// the next `}` becomes one declaration. Text not followed by `{` is skipped
/// together with the token after it.
pub fn parse_rules(tokens: &[Token]) -> Vec<Rule> {
    let mut rules = Vec::with_capacity(16);
    let mut i = 0usize;
    while i < tokens.len() {
        if !matches!(tokens[i], Token::Text(_)) {
            i += 1;
            continue;
        }
        let mut selector = String::new();
        while let Some(Token::Text(text)) = tokens.get(i) {
            if !selector.is_empty() {
                selector.push(' ');
            }
            selector.push_str(text);
            i += 1;
        }
        if tokens.get(i) != Some(&Token::OpenBrace) {
            i += 1;
            continue;
        }
        i += 1;
        let mut declarations = Vec::with_capacity(8);
        while let Some(token) = tokens.get(i) {
            match token {
                Token::CloseBrace => break,
                Token::Text(text) => declarations.push(text.clone()),
                Token::OpenBrace | Token::Semicolon => {}
            }
            i += 1;
        }
        // step over the closing brace (or the end of input)
        i += 1;
        rules.push(Rule {
            selector,
            declarations,
        });
    }
    rules
}

/// Tokenize and parse stylesheet text in one step.
pub fn parse_stylesheet(css: &str) -> Vec<Rule> {
    parse_rules(&tokenize_css(css))
}

/// Split an inline `style` attribute value into raw declarations.
///
/// Uses the stylesheet tokenizer so semicolons inside quoted strings do not
/// split a declaration. Stray braces are treated as separators.
pub fn split_inline_declarations(style: &str) -> Vec<String> {
    tokenize_css(style)
        .into_iter()
        .filter_map(|token| match token {
            Token::Text(text) => Some(text),
            _ => None,
        })
        .collect()
}

/// Serialize rules back to stylesheet text.
///
/// Each rule renders as `selector {`, one indented `declaration;` line per
/// declaration, and a closing `}` line.
pub fn serialize_stylesheet(rules: &[Rule]) -> String {
    let mut out = String::with_capacity(rules.len() * 48);
    for (idx, rule) in rules.iter().enumerate() {
        if idx > 0 {
            out.push('\n');
        }
        out.push_str(&rule.selector);
        out.push_str(" {\n");
        for decl in &rule.declarations {
            out.push_str("    ");
            out.push_str(decl);
            out.push_str(";\n");
        }
        out.push('}');
    }
    out
}

/// Join declarations into a single inline `style` attribute value.
pub fn serialize_inline<S: AsRef<str>>(declarations: &[S]) -> String {
    let mut out = String::with_capacity(declarations.len() * 24);
    for (idx, decl) in declarations.iter().enumerate() {
        if idx > 0 {
            out.push_str("; ");
        }
        out.push_str(decl.as_ref());
    }
    out
}
