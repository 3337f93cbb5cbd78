//! Integration test utilities for the accounts server
//!
//! Spawns the server on an ephemeral port with in-memory backends and drives
//! it over HTTP the way a browser would: cookies kept, redirects followed.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
