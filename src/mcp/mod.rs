//! Model Context Protocol (MCP) request handling over JSON-RPC
//!
//! Provides request decoding, method routing, response formatting and the
//! per-connection message loop.

pub mod rpc;
pub mod server;
pub mod session;
