//! Core WebSocket infrastructure.
//!
//! This module keeps a stream of messages flowing across dropped connections. It is generic over
//! the transport, the message type and the consumer; [`crate::events`] specializes it for ARI.
//!
//! # Architecture
//!
//! - [`StreamClient`]: connect, receive and reconnect state machine with exponential backoff
//! - [`Dialer`] / [`Connection`]: transport seam, implemented by [`TungsteniteDialer`]
//! - [`MessageParser`]: Trait for parsing incoming WebSocket messages
//! - [`EventSink`]: Trait for consuming decoded messages
//!
//! # Example
//!
//! ```ignore
//! let config = Config::default();
//! let request = ConnectRequest::new(Url::parse("ws://pbx:8088/ari/events?app=demo")?);
//! let client = StreamClient::new(TungsteniteDialer::new(&config), request, config, SimpleParser);
//!
//! let (tx, mut rx) = tokio::sync::mpsc::channel(64);
//! let cancel = CancellationToken::new();
//! client.spawn(tx, cancel.clone());
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod traits;
pub mod transport;

pub use config::{Config, ReconnectConfig};
pub use connection::{ConnectRequest, ConnectionState, Lifecycle, StreamClient};
#[expect(
    clippy::module_name_repetitions,
    reason = "WsError includes module name for clarity when used outside this module"
)]
pub use error::WsError;
pub use traits::*;
pub use transport::{TungsteniteConnection, TungsteniteDialer};
