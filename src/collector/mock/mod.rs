//! Mock server implementations for testing.
//!
//! This module provides `MockServer` and pre-built scenarios for testing
//! the engine without requiring a running MySQL server.

mod scenarios;
mod server;

pub use server::MockServer;
