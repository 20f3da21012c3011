//! Per-connection MCP message loop
//!
//! A session owns one duplex channel. Frames are handled strictly one at a
//! time, so responses leave in the order requests arrived.

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::errors::ProtocolError;
use crate::mcp::{
    rpc::{json_rpc_error, UNKNOWN_REQUEST_ID},
    server::handle_text_message,
};
use crate::AppState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundFrame {
    Text(String),
    Binary(Vec<u8>),
    /// Ping/pong; answered by the transport itself.
    Control,
    Close,
}

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("websocket transport failed: {0}")]
    Transport(String),
}

/// The duplex channel a session runs over.
#[async_trait]
pub trait FrameChannel: Send {
    /// `None` once the peer is gone.
    async fn next_frame(&mut self) -> Option<Result<InboundFrame, ChannelError>>;

    async fn send_text(&mut self, text: String) -> Result<(), ChannelError>;
}

#[async_trait]
impl FrameChannel for WebSocket {
    async fn next_frame(&mut self) -> Option<Result<InboundFrame, ChannelError>> {
        let message = match self.recv().await? {
            Ok(message) => message,
            Err(err) => return Some(Err(ChannelError::Transport(err.to_string()))),
        };

        Some(Ok(match message {
            Message::Text(text) => InboundFrame::Text(text.as_str().to_string()),
            Message::Binary(bytes) => InboundFrame::Binary(bytes.to_vec()),
            Message::Ping(_) | Message::Pong(_) => InboundFrame::Control,
            Message::Close(_) => InboundFrame::Close,
        }))
    }

    async fn send_text(&mut self, text: String) -> Result<(), ChannelError> {
        self.send(Message::Text(text.into()))
            .await
            .map_err(|err| ChannelError::Transport(err.to_string()))
    }
}

/// Runs the receive loop until the peer disconnects. Only transport events end
/// a session; every request-level failure becomes an error response.
pub async fn run_session<C: FrameChannel>(mut channel: C, state: AppState) {
    let guard = state.connections.register();
    info!(
        connection_id = %guard.id(),
        active_connections = state.connections.len(),
        "mcp connection established"
    );

    while let Some(next) = channel.next_frame().await {
        let frame = match next {
            Ok(frame) => frame,
            Err(err) => {
                warn!(connection_id = %guard.id(), error = %err, "mcp receive failed");
                break;
            }
        };

        let response = match frame {
            InboundFrame::Text(text) => {
                debug!(connection_id = %guard.id(), frame = %text, "received mcp frame");
                handle_text_message(&state, &text).await
            }
            InboundFrame::Binary(bytes) => match String::from_utf8(bytes) {
                Ok(text) => handle_text_message(&state, &text).await,
                Err(_) => json_rpc_error(UNKNOWN_REQUEST_ID, &ProtocolError::Parse),
            },
            InboundFrame::Control => continue,
            InboundFrame::Close => break,
        };

        let payload = response.to_string();
        debug!(connection_id = %guard.id(), frame = %payload, "sending mcp response");
        if let Err(err) = channel.send_text(payload).await {
            warn!(connection_id = %guard.id(), error = %err, "mcp send failed");
            break;
        }
    }

    let connection_id = guard.id();
    let duration_ms = (Utc::now() - guard.info().connected_at).num_milliseconds();
    drop(guard);
    info!(
        connection_id = %connection_id,
        duration_ms,
        active_connections = state.connections.len(),
        "mcp connection closed"
    );
}
