//! # Router Testing Utils
//!
//! Shared testing utilities for the task router workspace.
//!
//! ## Features
//!
//! - **Scripted Workers**: a [`WorkerFactory`](router_core::WorkerFactory) whose workers
//!   succeed, fail, stay silent or answer twice on demand, and record every command they receive
//! - **Test Data Builders**: utilities for creating tasks and task batches
//! - **Test Helpers**: polling helpers and tracing setup for async tests
//!
//! ## Usage
//!
//! ```toml
//! [dev-dependencies]
//! router-testing-utils = { path = "../testing-utils" }
//! ```

pub mod builders;
pub mod helpers;
pub mod mocks;

pub use builders::*;
pub use helpers::*;
pub use mocks::*;
