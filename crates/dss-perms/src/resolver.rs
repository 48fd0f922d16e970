//! The privilege resolver.
//!
//! A pure decision function over (path, token, current owner, grants). It
//! never touches storage; callers supply the ownership fact.

use std::collections::HashMap;

use dss_core::{SecretPath, Token};

use crate::grant::GrantTable;
use crate::pattern::PatternSet;

/// Why access was allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    /// The token owns the secret.
    Owner,
    /// A grant configured for this specific token matched.
    TokenGrant,
    /// A global grant matched.
    GlobalGrant,
}

/// Outcome of a privilege check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow(Reason),
    Deny,
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow(_))
    }
}

/// Decides read and write access from a compiled [`GrantTable`].
///
/// Built once at startup and shared; all methods take `&self`.
#[derive(Debug, Clone, Default)]
pub struct PrivilegeResolver {
    write: HashMap<String, PatternSet>,
    write_global: PatternSet,
    read: HashMap<String, PatternSet>,
    read_global: PatternSet,
}

impl PrivilegeResolver {
    /// Compile a grant table.
    pub fn new(grants: &GrantTable) -> Self {
        let write = grants
            .write
            .iter()
            .map(|(token, patterns)| (token.clone(), PatternSet::compile("write", patterns)))
            .collect();
        let read = grants
            .read
            .iter()
            .map(|(token, patterns)| (token.clone(), PatternSet::compile("read", patterns)))
            .collect();

        let resolver = Self {
            write,
            write_global: PatternSet::compile("write_global", &grants.write_global),
            read,
            read_global: PatternSet::compile("read_global", &grants.read_global),
        };

        tracing::debug!(
            patterns = grants.pattern_count(),
            malformed = resolver.malformed_patterns(),
            "compiled privilege grants"
        );

        resolver
    }

    /// Decide whether `token` may write (or delete) `path`.
    ///
    /// `owner` is the current owner of the path, `None` if unclaimed.
    pub fn check_write(&self, path: &SecretPath, token: &Token, owner: Option<&Token>) -> Decision {
        let decision = if owner == Some(token) {
            Decision::Allow(Reason::Owner)
        } else if Self::token_matches(&self.write, token, path) {
            Decision::Allow(Reason::TokenGrant)
        } else if owner.is_none() && self.write_global.matches(path.as_str()) {
            // Global write only claims unclaimed paths.
            Decision::Allow(Reason::GlobalGrant)
        } else {
            Decision::Deny
        };

        tracing::debug!(%path, %token, ?decision, "write privilege check");
        decision
    }

    /// Decide whether `token` may read `path`.
    pub fn check_read(&self, path: &SecretPath, token: &Token, owner: Option<&Token>) -> Decision {
        let decision = if self.read_global.matches(path.as_str()) {
            Decision::Allow(Reason::GlobalGrant)
        } else if Self::token_matches(&self.read, token, path) {
            Decision::Allow(Reason::TokenGrant)
        } else if owner == Some(token) {
            Decision::Allow(Reason::Owner)
        } else {
            Decision::Deny
        };

        tracing::debug!(%path, %token, ?decision, "read privilege check");
        decision
    }

    pub fn can_write(&self, path: &SecretPath, token: &Token, owner: Option<&Token>) -> bool {
        self.check_write(path, token, owner).is_allowed()
    }

    pub fn can_read(&self, path: &SecretPath, token: &Token, owner: Option<&Token>) -> bool {
        self.check_read(path, token, owner).is_allowed()
    }

    /// Number of configured patterns that failed to compile.
    pub fn malformed_patterns(&self) -> usize {
        self.write.values().map(PatternSet::malformed_count).sum::<usize>()
            + self.read.values().map(PatternSet::malformed_count).sum::<usize>()
            + self.write_global.malformed_count()
            + self.read_global.malformed_count()
    }

    fn token_matches(grants: &HashMap<String, PatternSet>, token: &Token, path: &SecretPath) -> bool {
        grants
            .get(token.as_str())
            .map(|set| set.matches(path.as_str()))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn t(s: &str) -> Token {
        Token::from(s)
    }

    fn p(s: &str) -> SecretPath {
        SecretPath::from(s)
    }

    fn resolver() -> PrivilegeResolver {
        PrivilegeResolver::new(
            &GrantTable::new()
                .grant_write("T1", "/app/*")
                .grant_read("R1", "/app/*")
                .global_write("/tmp/*")
                .global_read("/pub/*"),
        )
    }

    // ─────────────────────────────────────────────────────────────────────
    // Write
    // ─────────────────────────────────────────────────────────────────────

    #[test]
    fn test_owner_can_always_write() {
        let r = PrivilegeResolver::new(&GrantTable::new());
        assert_eq!(
            r.check_write(&p("/anywhere"), &t("T9"), Some(&t("T9"))),
            Decision::Allow(Reason::Owner)
        );
    }

    #[test]
    fn test_token_grant_allows_write_on_claimed_and_unclaimed() {
        let r = resolver();

        assert_eq!(
            r.check_write(&p("/app/db-pass"), &t("T1"), None),
            Decision::Allow(Reason::TokenGrant)
        );
        assert_eq!(
            r.check_write(&p("/app/db-pass"), &t("T1"), Some(&t("T2"))),
            Decision::Allow(Reason::TokenGrant)
        );
    }

    #[test]
    fn test_token_grant_is_per_token() {
        let r = resolver();
        assert_eq!(r.check_write(&p("/app/db-pass"), &t("T2"), None), Decision::Deny);
    }

    #[test]
    fn test_global_write_only_on_unclaimed_path() {
        let r = resolver();

        assert_eq!(
            r.check_write(&p("/tmp/x"), &t("anyone"), None),
            Decision::Allow(Reason::GlobalGrant)
        );
        assert_eq!(
            r.check_write(&p("/tmp/x"), &t("anyone"), Some(&t("first"))),
            Decision::Deny
        );
        assert_eq!(
            r.check_write(&p("/tmp/x"), &t("first"), Some(&t("first"))),
            Decision::Allow(Reason::Owner)
        );
    }

    #[test]
    fn test_global_read_does_not_grant_write() {
        let r = resolver();
        assert!(!r.can_write(&p("/pub/x"), &t("anyone"), None));
    }

    #[test]
    fn test_read_grant_does_not_grant_write() {
        let r = resolver();
        assert!(!r.can_write(&p("/app/x"), &t("R1"), None));
    }

    #[test]
    fn test_default_deny() {
        let r = resolver();
        assert_eq!(r.check_write(&p("/other/x"), &t("T1"), None), Decision::Deny);
        assert_eq!(r.check_read(&p("/other/x"), &t("T1"), None), Decision::Deny);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Read
    // ─────────────────────────────────────────────────────────────────────

    #[test]
    fn test_global_read_is_unconditional() {
        let r = resolver();

        assert_eq!(
            r.check_read(&p("/pub/x"), &t("nobody"), Some(&t("T1"))),
            Decision::Allow(Reason::GlobalGrant)
        );
        assert_eq!(
            r.check_read(&p("/pub/x"), &t("nobody"), None),
            Decision::Allow(Reason::GlobalGrant)
        );
    }

    #[test]
    fn test_global_read_takes_precedence_over_owner() {
        let r = resolver();
        assert_eq!(
            r.check_read(&p("/pub/x"), &t("T1"), Some(&t("T1"))),
            Decision::Allow(Reason::GlobalGrant)
        );
    }

    #[test]
    fn test_token_read_grant() {
        let r = resolver();

        assert_eq!(
            r.check_read(&p("/app/db-pass"), &t("R1"), Some(&t("T1"))),
            Decision::Allow(Reason::TokenGrant)
        );
        assert_eq!(
            r.check_read(&p("/app/db-pass"), &t("R2"), Some(&t("T1"))),
            Decision::Deny
        );
    }

    #[test]
    fn test_owner_can_read() {
        let r = resolver();
        assert_eq!(
            r.check_read(&p("/mine"), &t("T5"), Some(&t("T5"))),
            Decision::Allow(Reason::Owner)
        );
        assert_eq!(r.check_read(&p("/mine"), &t("T6"), Some(&t("T5"))), Decision::Deny);
    }

    #[test]
    fn test_write_grant_does_not_grant_read() {
        let r = resolver();
        assert!(!r.can_read(&p("/app/db-pass"), &t("T1"), Some(&t("T2"))));
    }

    // ─────────────────────────────────────────────────────────────────────
    // Configuration defects
    // ─────────────────────────────────────────────────────────────────────

    #[test]
    fn test_malformed_pattern_does_not_deny_other_grants() {
        let r = PrivilegeResolver::new(
            &GrantTable::new()
                .grant_write("T1", "/bad/[")
                .grant_write("T1", "/app/*")
                .global_read("[")
                .global_read("/pub/*"),
        );

        assert_eq!(r.malformed_patterns(), 2);
        assert!(r.can_write(&p("/app/x"), &t("T1"), None));
        assert!(!r.can_write(&p("/bad/["), &t("T1"), None));
        assert!(r.can_read(&p("/pub/x"), &t("T2"), None));
    }

    #[test]
    fn test_segment_boundary_respected() {
        let r = resolver();
        assert!(!r.can_write(&p("/app/nested/secret"), &t("T1"), None));
        assert!(!r.can_write(&p("/tmp/a/b"), &t("anyone"), None));
    }

    #[test]
    fn test_double_star_grant_stays_within_segment() {
        let r = PrivilegeResolver::new(&GrantTable::new().grant_write("T1", "/app/**"));

        assert_eq!(r.malformed_patterns(), 0);
        assert!(r.can_write(&p("/app/x"), &t("T1"), None));
        assert!(!r.can_write(&p("/app/x/y"), &t("T1"), None));
        assert!(!r.can_write(&p("/app/x/y/z"), &t("T1"), None));
    }

    #[test]
    fn test_star_run_grant_compiles() {
        let r = PrivilegeResolver::new(&GrantTable::new().grant_write("T1", "/app/a**"));

        assert_eq!(r.malformed_patterns(), 0);
        assert!(r.can_write(&p("/app/abc"), &t("T1"), None));
        assert!(!r.can_write(&p("/app/bcd"), &t("T1"), None));
    }

    #[test]
    fn test_caret_class_grant_is_negated() {
        let r = PrivilegeResolver::new(&GrantTable::new().grant_read("T1", "/app/[^x]"));

        assert!(!r.can_read(&p("/app/x"), &t("T1"), None));
        assert!(r.can_read(&p("/app/a"), &t("T1"), None));
    }

    proptest! {
        #[test]
        fn owner_always_writes_and_reads(
            path in "/[a-z]{1,8}(/[a-z]{1,8}){0,3}",
            token in "[A-Za-z0-9]{1,16}",
        ) {
            let r = resolver();
            let token = Token::new(token);
            let path = SecretPath::new(path);

            prop_assert!(r.can_write(&path, &token, Some(&token)));
            prop_assert!(r.can_read(&path, &token, Some(&token)));
        }

        #[test]
        fn global_read_allows_every_token(
            name in "[a-z0-9-]{1,12}",
            token in "[A-Za-z0-9]{1,16}",
            owner in proptest::option::of("[A-Za-z0-9]{1,16}"),
        ) {
            let r = resolver();
            let owner = owner.map(Token::new);
            let path = SecretPath::new(format!("/pub/{}", name));

            prop_assert!(r.can_read(&path, &Token::new(token), owner.as_ref()));
        }

        #[test]
        fn global_write_never_overrides_another_owner(
            name in "[a-z0-9-]{1,12}",
            token in "[A-Z]{1,8}",
            owner in "[a-z]{1,8}",
        ) {
            // Disjoint alphabets: token never equals owner, and neither is T1.
            let r = resolver();
            let path = SecretPath::new(format!("/tmp/{}", name));
            let token = Token::new(format!("x{}", token));

            prop_assert!(r.can_write(&path, &token, None));
            prop_assert!(!r.can_write(&path, &token, Some(&Token::new(owner))));
        }
    }
}
