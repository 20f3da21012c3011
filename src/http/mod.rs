//! HTTP transport layer for the Model Context Protocol
//!
//! Provides the external API routing, including the `/mcp` WebSocket listener
//! and the stateless tool endpoints.

pub mod handlers;
