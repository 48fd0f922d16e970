//! Proptest generators for property-based testing.
//!
//! Paths are drawn from the prefixes named in the fixture grant table so
//! that generated cases land on every rule, not just the deny branch.

use proptest::prelude::*;

use dss_core::{SecretPath, Token};
use dss_perms::GrantTable;

use crate::fixtures;

/// Top-level directories that fixture and generated grants refer to.
pub const PREFIXES: &[&str] = &["/app", "/shared", "/tmp", "/pub", "/other"];

/// A single path segment.
pub fn segment() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_-]{0,11}".prop_map(String::from)
}

/// A path of the form `/<prefix>/<segment>`.
pub fn secret_path() -> impl Strategy<Value = SecretPath> {
    (prop::sample::select(PREFIXES), segment())
        .prop_map(|(prefix, name)| SecretPath::new(format!("{prefix}/{name}")))
}

/// A path that is one segment deeper, `/<prefix>/<segment>/<segment>`.
///
/// Single-star patterns never match these.
pub fn nested_path() -> impl Strategy<Value = SecretPath> {
    (prop::sample::select(PREFIXES), segment(), segment())
        .prop_map(|(prefix, a, b)| SecretPath::new(format!("{prefix}/{a}/{b}")))
}

/// One of the fixture tokens.
pub fn fixture_token() -> impl Strategy<Value = Token> {
    prop_oneof![
        Just(fixtures::alice()),
        Just(fixtures::bob()),
        Just(fixtures::mallory()),
    ]
}

/// A fixture token or an arbitrary non-empty one.
pub fn token() -> impl Strategy<Value = Token> {
    prop_oneof![
        3 => fixture_token(),
        1 => "[A-Za-z0-9]{1,24}".prop_map(Token::new),
    ]
}

/// Plaintext bytes up to `max_len` long.
pub fn plaintext(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// A glob pattern over [`PREFIXES`].
pub fn pattern() -> impl Strategy<Value = String> {
    (prop::sample::select(PREFIXES), prop::bool::ANY, segment()).prop_map(
        |(prefix, star, name)| {
            if star {
                format!("{prefix}/*")
            } else {
                format!("{prefix}/{name}")
            }
        },
    )
}

fn token_grants() -> impl Strategy<Value = Vec<(Token, String)>> {
    prop::collection::vec((fixture_token(), pattern()), 0..6)
}

/// A grant table over the fixture tokens.
pub fn grant_table() -> impl Strategy<Value = GrantTable> {
    (
        token_grants(),
        token_grants(),
        prop::collection::vec(pattern(), 0..3),
        prop::collection::vec(pattern(), 0..3),
    )
        .prop_map(|(write, read, write_global, read_global)| {
            let mut table = GrantTable::new();
            for (token, pattern) in write {
                table = table.grant_write(token.as_str(), pattern);
            }
            for (token, pattern) in read {
                table = table.grant_read(token.as_str(), pattern);
            }
            for pattern in write_global {
                table = table.global_write(pattern);
            }
            for pattern in read_global {
                table = table.global_read(pattern);
            }
            table
        })
}
