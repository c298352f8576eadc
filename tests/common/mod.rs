//! Common test utilities and helpers
//!
//! This module provides shared functionality used across integration tests:
//! - Binary invocation (via `extbind_command`)
//! - Project fixtures (via `helpers`)

pub(crate) mod helpers;

pub(crate) use helpers::extbind_command;
