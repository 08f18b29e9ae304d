//! Streamable HTTP tests
//!
//! A real server on a random port, driven by an rmcp client over HTTP.
