//! # dss Permissions
//!
//! Privilege grants and the decision engine that answers "may this token
//! read or write this path?".
//!
//! ## Overview
//!
//! Access is decided from three facts: the configured [`GrantTable`], the
//! presenting [`Token`](dss_core::Token), and the current owner of the path
//! (if the path has been claimed). The [`PrivilegeResolver`] is a pure
//! function over those facts; it performs no I/O and can be tested without
//! a database.
//!
//! ## Rules
//!
//! Write:
//! 1. The owner may always update its own secret.
//! 2. A token-specific write grant matching the path allows.
//! 3. A global write grant matching the path allows only while the path is
//!    unclaimed (first writer becomes owner).
//!
//! Read:
//! 1. A global read grant matching the path allows unconditionally.
//! 2. A token-specific read grant matching the path allows.
//! 3. The owner may read its own secret.
//!
//! Anything else is denied. There is no explicit deny list.
//!
//! ## Usage
//!
//! ```rust
//! use dss_core::{SecretPath, Token};
//! use dss_perms::{GrantTable, PrivilegeResolver};
//!
//! let grants = GrantTable::new().grant_write("T1", "/app/*");
//! let resolver = PrivilegeResolver::new(&grants);
//!
//! let path = SecretPath::from("/app/db-pass");
//! assert!(resolver.can_write(&path, &Token::from("T1"), None));
//! assert!(!resolver.can_write(&path, &Token::from("T2"), None));
//! ```

pub mod error;
pub mod grant;
pub mod pattern;
pub mod resolver;

pub use error::{PermsError, Result};
pub use grant::GrantTable;
pub use pattern::PatternSet;
pub use resolver::{Decision, PrivilegeResolver, Reason};
