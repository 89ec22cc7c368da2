//! # LexChain Testkit
//!
//! Testing utilities for the LexChain registry.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: a registry on a manual clock with named identities
//! - **Generators**: Proptest strategies for property-based testing
//! - **Tracing**: a test-writer subscriber so operation logs show up in
//!   failing test output
//!
//! ## Test Fixtures
//!
//! ```rust
//! use lexchain_testkit::TestFixture;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let fixture = TestFixture::new();
//! let doc = fixture.alice_uploads("lease").await;
//! fixture.registry.grant_access(&fixture.alice, &doc, &fixture.bob, 3600).await.unwrap();
//! fixture.advance(3600);
//! assert!(!fixture.registry.has_access(&doc, &fixture.bob).await.unwrap());
//! # });
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use lexchain_testkit::generators::GrantParams;
//!
//! proptest! {
//!     #[test]
//!     fn grant_expires_on_time(params: GrantParams) {
//!         // upload, grant params.duration, advance params.elapsed,
//!         // then check has_access == params.expect_active()
//!     }
//! }
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::{content_hash, identity, init_tracing, TestFixture, FIXTURE_EPOCH};
pub use generators::GrantParams;
