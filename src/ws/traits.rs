//! Seams between the stream state machine and its collaborators.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::connection::ConnectRequest;
use crate::Result;
use crate::events::DecodeError;

/// Message parser trait for converting raw frame payloads to messages.
///
/// # Example
///
/// ```ignore
/// pub struct SimpleParser;
///
/// impl MessageParser<MyMessage> for SimpleParser {
///     fn parse(&self, bytes: &[u8]) -> Result<MyMessage, DecodeError> {
///         serde_json::from_slice(bytes).map_err(|e| DecodeError::new(bytes, e))
///     }
/// }
/// ```
pub trait MessageParser<M>: Send + Sync + 'static {
    /// Parse one frame payload. A failure is local to this frame.
    fn parse(&self, bytes: &[u8]) -> std::result::Result<M, DecodeError>;
}

/// Establishes transport connections.
#[async_trait]
pub trait Dialer: Send + Sync + 'static {
    type Connection: Connection;

    /// Open a connection for `request`.
    ///
    /// Implementations should give up early once `cancel` fires when the underlying transport
    /// allows it; the caller also stops waiting on cancellation.
    async fn dial(
        &self,
        request: &ConnectRequest,
        cancel: &CancellationToken,
    ) -> Result<Self::Connection>;
}

/// An open, exclusively owned message stream.
#[async_trait]
pub trait Connection: Send {
    /// Read the next data frame payload.
    ///
    /// Must be cancel safe: dropping the returned future before it completes must not lose a
    /// frame that has not been returned yet. Any error ends the session.
    async fn read_message(&mut self) -> Result<Vec<u8>>;

    /// Release the connection. Must be idempotent and safe after a failed read.
    async fn close(&mut self);
}

/// Receives decoded messages, in arrival order, one at a time.
///
/// The stream worker awaits each call before reading the next frame, so a slow sink slows the
/// stream down instead of queueing messages.
#[async_trait]
pub trait EventSink<M: Send + 'static>: Send {
    async fn on_message(&mut self, message: M);

    /// Called for a frame that could not be decoded. The session continues afterwards.
    async fn on_decode_error(&mut self, error: DecodeError) {
        let _ = error;
    }
}

/// Item type for channel-backed sinks.
pub type StreamItem<M> = std::result::Result<M, DecodeError>;

/// Forwards into a bounded channel; a full channel applies back-pressure to the stream.
#[async_trait]
impl<M: Send + 'static> EventSink<M> for mpsc::Sender<StreamItem<M>> {
    async fn on_message(&mut self, message: M) {
        _ = self.send(Ok(message)).await;
    }

    async fn on_decode_error(&mut self, error: DecodeError) {
        _ = self.send(Err(error)).await;
    }
}

