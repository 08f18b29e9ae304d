pub mod mcp;
pub mod send;
pub mod token;
