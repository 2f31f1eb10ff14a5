//! Nullable infrastructure for deterministic testing.
//!
//! The wire transport is abstracted behind a trait; this crate provides a
//! test-friendly implementation that:
//! - records every request for assertions
//! - serves pull requests from seeded in-memory data
//! - can be scripted to fail or to respond slowly
//! - never touches the network
//!
//! Usage: swap the real transport for the nullable one in tests.

pub mod transport;

pub use transport::NullTransport;
