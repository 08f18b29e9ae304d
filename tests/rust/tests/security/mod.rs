//! Security tests
//!
//! Token codec and per-request authentication, exercised through the
//! public gateway API.

mod tokens;
