//! # Atlas Test Utilities
//!
//! Shared test utilities for the Atlas spatial data server.
//!
//! This crate provides:
//! - Deterministic Ed25519 keypairs (fixed seeds for reproducible tests)
//! - A signed-token builder (TestTokenBuilder)
//! - Wiremock fixtures for the catalogue service
//!
//! ## Usage
//!
//! ```rust,ignore
//! use atlas_test_utils::tokens::{TestKeypair, TestTokenBuilder};
//!
//! let keypair = TestKeypair::new(1);
//! let token = keypair.sign(
//!     &TestTokenBuilder::new()
//!         .subject("u1")
//!         .role("consumer")
//!         .build(),
//! );
//! ```

pub mod catalogue;
pub mod tokens;

pub use catalogue::MockCatalogue;
pub use tokens::{TestKeypair, TestTokenBuilder};
