//! Wildcard patterns used by the `match` operator.
//!
//! `*` matches any run of characters and `?` exactly one. A backslash escapes
//! `*`, `?` or another backslash; every other character matches itself.

use regex::{Regex, RegexBuilder};

#[derive(Debug, Clone, PartialEq)]
enum GlobToken<'a> {
    Literal(&'a str),
    Escaped(char),
    AnyRun,
    AnyChar,
}

fn tokenize(pattern: &str) -> Vec<GlobToken<'_>> {
    let mut tokens = Vec::new();
    let mut literal_start = 0;
    let mut chars = pattern.char_indices().peekable();

    while let Some((i, ch)) = chars.next() {
        let token = match ch {
            '\\' => match chars.peek() {
                Some(&(_, next @ ('\\' | '*' | '?'))) => {
                    chars.next();
                    Some((GlobToken::Escaped(next), 2))
                }
                _ => None,
            },
            '*' => Some((GlobToken::AnyRun, 1)),
            '?' => Some((GlobToken::AnyChar, 1)),
            _ => None,
        };

        if let Some((token, len)) = token {
            if literal_start < i {
                tokens.push(GlobToken::Literal(&pattern[literal_start..i]));
            }
            tokens.push(token);
            literal_start = i + len;
        }
    }

    if literal_start < pattern.len() {
        tokens.push(GlobToken::Literal(&pattern[literal_start..]));
    }
    tokens
}

/// Translates a wildcard pattern to an unanchored regular expression.
///
/// ```
/// use rql_engine::glob::glob_to_regex;
///
/// assert_eq!(glob_to_regex("*foo?"), ".*foo.");
/// assert_eq!(glob_to_regex(r"a\*b"), r"a\*b");
/// assert_eq!(glob_to_regex("1.5"), r"1\.5");
/// ```
pub fn glob_to_regex(pattern: &str) -> String {
    tokenize(pattern)
        .into_iter()
        .map(|token| match token {
            GlobToken::Literal(text) => regex::escape(text),
            GlobToken::Escaped(ch) => regex::escape(&ch.to_string()),
            GlobToken::AnyRun => ".*".to_string(),
            GlobToken::AnyChar => ".".to_string(),
        })
        .collect()
}

/// Compiles a wildcard pattern into a regex anchored at both ends,
/// case-insensitive unless `case_sensitive` is set.
pub fn compile(pattern: &str, case_sensitive: bool) -> Result<Regex, regex::Error> {
    RegexBuilder::new(&format!("^{}$", glob_to_regex(pattern)))
        .case_insensitive(!case_sensitive)
        .build()
}
