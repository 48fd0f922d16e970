//! # dss testkit
//!
//! Testing utilities for the secret store crates.
//!
//! This crate provides:
//!
//! - **Fixtures**: a deterministic key, a standard grant table and the
//!   tokens it names, plus tracing setup for tests
//! - **Generators**: Proptest strategies for paths, tokens, plaintexts and
//!   grant tables
//!
//! ```rust
//! use dss_testkit::fixtures::{self, TestFixture};
//!
//! let fixture = TestFixture::new();
//! let resolver = fixture.resolver();
//! assert!(resolver.can_write(&"/app/db".into(), &fixtures::alice(), None));
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::{init_tracing, TestFixture};
