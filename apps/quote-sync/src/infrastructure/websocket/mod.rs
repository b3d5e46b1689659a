//! WebSocket Feed Adapter
//!
//! Implements `FeedConnector` and `FeedChannel` with `tokio-tungstenite`.
//! The quote service pushes text frames, each holding the complete quote
//! list as a JSON array.
//!
//! # Frame Handling
//!
//! - Text: handed to the caller as-is
//! - Ping: answered with a pong carrying the same payload
//! - Binary, Pong: ignored
//! - Close or end of stream: reported as a normal close

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::application::ports::{ChannelError, FeedChannel, FeedConnector};

/// Path of the push endpoint relative to the host.
pub const FEED_PATH: &str = "/ws";

/// Opens a new WebSocket to a fixed URL on every call.
#[derive(Debug, Clone)]
pub struct WebSocketConnector {
    url: String,
}

impl WebSocketConnector {
    /// Create a connector for a full `ws://` or `wss://` URL.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait]
impl FeedConnector for WebSocketConnector {
    async fn connect(&self) -> Result<Box<dyn FeedChannel>, ChannelError> {
        let (stream, _response) = tokio_tungstenite::connect_async(self.url.as_str())
            .await
            .map_err(|e| ChannelError::Connect(e.to_string()))?;

        Ok(Box::new(WebSocketChannel { stream }))
    }

    fn endpoint(&self) -> &str {
        &self.url
    }
}

/// One open WebSocket connection.
pub struct WebSocketChannel {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl FeedChannel for WebSocketChannel {
    async fn recv(&mut self) -> Result<Option<String>, ChannelError> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Some(text.as_str().to_owned())),
                Some(Ok(Message::Ping(data))) => {
                    self.stream
                        .send(Message::Pong(data))
                        .await
                        .map_err(|e| ChannelError::Transport(e.to_string()))?;
                }
                Some(Ok(Message::Close(frame))) => {
                    tracing::debug!(?frame, "Server sent close frame");
                    // Flush the queued close reply so the handshake completes.
                    if let Err(e) = self.stream.close(None).await {
                        tracing::debug!(error = %e, "Close reply not sent");
                    }
                    return Ok(None);
                }
                Some(Ok(Message::Binary(data))) => {
                    tracing::debug!(len = data.len(), "Ignoring binary frame");
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(ChannelError::Transport(e.to_string())),
                None => return Ok(None),
            }
        }
    }

    async fn close(&mut self) {
        if let Err(e) = self.stream.close(None).await {
            tracing::debug!(error = %e, "WebSocket close failed");
        }
    }
}
