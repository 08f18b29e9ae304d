//! Request correlation for HTTP logging
//!
//! Every HTTP request gets a short trace id, carried in the request
//! extensions so the auth middleware and MCP handler can tag their logs.

mod trace_context;

pub use trace_context::{generate_trace_id, RequestSpan, TraceContext};
