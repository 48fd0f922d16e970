//! Compiled glob pattern sets.
//!
//! Patterns follow shell path-matching rules: `*` matches any run of
//! characters and `?` matches one character, neither crossing a `/`.
//! `[abc]`, `[a-z]` and the negated `[!x]` / `[^x]` match one character from
//! a class, and `\` makes the next character literal.

use glob::{MatchOptions, Pattern};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Rewrite a shell path pattern into the syntax `glob` parses.
///
/// `glob` reads `**` as a wildcard that crosses `/` and rejects `a**`, so a
/// run of stars collapses to one. A leading `^` in a class negates like `!`,
/// and a backslash outside a class makes the next character literal.
/// Returns `None` for a dangling escape.
fn shell_to_glob(pattern: &str) -> Option<String> {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '*' => {
                while chars.peek() == Some(&'*') {
                    chars.next();
                }
                out.push('*');
            }
            '\\' => match chars.next()? {
                special @ ('*' | '?' | '[' | ']') => {
                    out.push('[');
                    out.push(special);
                    out.push(']');
                }
                other => out.push(other),
            },
            '[' => {
                out.push('[');
                if matches!(chars.peek(), Some('^') | Some('!')) {
                    chars.next();
                    out.push('!');
                }
                // The first member is literal, even `]`.
                if let Some(first) = chars.next() {
                    out.push(first);
                }
                for member in chars.by_ref() {
                    out.push(member);
                    if member == ']' {
                        break;
                    }
                }
            }
            other => out.push(other),
        }
    }

    Some(out)
}

#[derive(Debug, Clone)]
enum Entry {
    Valid(Pattern),
    /// Kept so the defect stays visible; never matches.
    Malformed(String),
}

/// An ordered set of glob patterns, compiled once.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    entries: Vec<Entry>,
}

impl PatternSet {
    /// Compile `patterns`. `scope` names the grant the patterns came from
    /// and only appears in log output.
    ///
    /// A malformed pattern is logged as a configuration defect and treated
    /// as never matching; it does not affect the other patterns.
    pub fn compile<S: AsRef<str>>(scope: &str, patterns: &[S]) -> Self {
        let entries = patterns
            .iter()
            .map(|p| {
                let p = p.as_ref();
                let compiled = shell_to_glob(p)
                    .ok_or_else(|| "trailing backslash".to_string())
                    .and_then(|g| Pattern::new(&g).map_err(|e| e.to_string()));
                match compiled {
                    Ok(pattern) => Entry::Valid(pattern),
                    Err(e) => {
                        tracing::warn!(
                            scope,
                            pattern = p,
                            error = e.as_str(),
                            "malformed grant pattern, it will never match"
                        );
                        Entry::Malformed(p.to_string())
                    }
                }
            })
            .collect();

        Self { entries }
    }

    /// Whether any pattern in the set matches `path`.
    pub fn matches(&self, path: &str) -> bool {
        self.entries.iter().any(|entry| match entry {
            Entry::Valid(pattern) => pattern.matches_with(path, MATCH_OPTIONS),
            Entry::Malformed(_) => false,
        })
    }

    /// Number of patterns that failed to compile.
    pub fn malformed_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e, Entry::Malformed(_)))
            .count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
