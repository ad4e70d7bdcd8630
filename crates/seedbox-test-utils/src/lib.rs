#![deny(unsafe_code)]

//! Shared test utilities for the seedbox workspace.
//!
//! Provides a scriptable fake daemon, config builders, and tracing helpers so
//! that individual crate tests stay concise and consistent.
//!
//! Add this crate as a `[dev-dependency]` in any workspace member:
//!
//! ```toml
//! [dev-dependencies]
//! seedbox-test-utils = { workspace = true }
//! ```

pub mod config;
pub mod daemon;
pub mod tracing_setup;

pub use config::TestConfigBuilder;
pub use daemon::{FakeDaemon, RecordedRequest, ScriptedResponse};
