//! `tokio-tungstenite` implementation of [`Dialer`] and [`Connection`].

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt as _, StreamExt as _};
use tokio::net::TcpStream;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at, timeout};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest as _;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tokio_util::sync::CancellationToken;

use super::config::Config;
use super::connection::ConnectRequest;
use super::error::WsError;
use super::traits::{Connection, Dialer};
use crate::Result;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Dials `ws://` and `wss://` endpoints. TLS uses the platform's native roots.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub struct TungsteniteDialer {
    heartbeat_interval: Duration,
    heartbeat_timeout: Duration,
    dial_timeout: Duration,
}

impl TungsteniteDialer {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            heartbeat_interval: config.heartbeat_interval,
            heartbeat_timeout: config.heartbeat_timeout,
            dial_timeout: config.dial_timeout,
        }
    }
}

#[async_trait]
impl Dialer for TungsteniteDialer {
    type Connection = TungsteniteConnection;

    async fn dial(
        &self,
        request: &ConnectRequest,
        _cancel: &CancellationToken,
    ) -> Result<TungsteniteConnection> {
        let mut handshake = request.url.as_str().into_client_request()?;
        handshake.headers_mut().extend(request.headers.clone());

        let (stream, response) = timeout(self.dial_timeout, connect_async(handshake))
            .await
            .map_err(|_elapsed| WsError::DialTimeout(self.dial_timeout))??;

        #[cfg(feature = "tracing")]
        tracing::debug!(status = %response.status(), "WebSocket handshake completed");
        #[cfg(not(feature = "tracing"))]
        let _ = &response;

        Ok(TungsteniteConnection::new(
            stream,
            self.heartbeat_interval,
            self.heartbeat_timeout,
        ))
    }
}

/// An established WebSocket session.
///
/// While a read is waiting, a PING is sent every heartbeat interval. If nothing at all arrives
/// from the server for the interval plus the heartbeat timeout, the read fails with
/// [`WsError::Timeout`]. Time spent outside `read_message` (in a slow sink, say) does not count as
/// silence. A zero interval disables both.
pub struct TungsteniteConnection {
    stream: WsStream,
    heartbeat: Option<Interval>,
    last_seen: Instant,
    silence_limit: Duration,
    closed: bool,
}

impl TungsteniteConnection {
    fn new(stream: WsStream, period: Duration, grace: Duration) -> Self {
        let heartbeat = (!period.is_zero()).then(|| {
            let mut heartbeat = interval_at(Instant::now() + period, period);
            heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);
            heartbeat
        });

        Self {
            stream,
            heartbeat,
            last_seen: Instant::now(),
            silence_limit: period + grace,
            closed: false,
        }
    }
}

async fn tick(heartbeat: &mut Option<Interval>) {
    match heartbeat {
        Some(heartbeat) => {
            heartbeat.tick().await;
        }
        None => std::future::pending().await,
    }
}

#[async_trait]
impl Connection for TungsteniteConnection {
    async fn read_message(&mut self) -> Result<Vec<u8>> {
        let Self {
            stream,
            heartbeat,
            last_seen,
            silence_limit,
            ..
        } = self;

        // Silence is only measured while this read waits on the socket
        *last_seen = Instant::now();
        if let Some(heartbeat) = heartbeat.as_mut() {
            heartbeat.reset();
        }

        loop {
            let next = tokio::select! {
                frame = stream.next() => Some(frame),
                () = tick(heartbeat) => None,
            };

            let Some(frame) = next else {
                if last_seen.elapsed() >= *silence_limit {
                    return Err(WsError::Timeout.into());
                }
                stream.send(Message::Ping(Vec::new().into())).await?;
                continue;
            };

            match frame {
                Some(Ok(message)) => {
                    *last_seen = Instant::now();
                    match message {
                        Message::Text(text) => return Ok(text.as_str().as_bytes().to_vec()),
                        Message::Binary(data) => return Ok(data.to_vec()),
                        Message::Close(frame) => {
                            #[cfg(feature = "tracing")]
                            tracing::debug!(?frame, "Server closed the WebSocket");
                            #[cfg(not(feature = "tracing"))]
                            let _ = &frame;
                            return Err(WsError::ConnectionClosed.into());
                        }
                        // Control frames are answered by tungstenite itself
                        Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
                    }
                }
                Some(Err(e)) => return Err(e.into()),
                None => return Err(WsError::ConnectionClosed.into()),
            }
        }
    }

    async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        if let Err(e) = self.stream.close(None).await {
            #[cfg(feature = "tracing")]
            tracing::debug!(error = %e, "Error while closing WebSocket");
            #[cfg(not(feature = "tracing"))]
            let _ = &e;
        }
    }
}

impl fmt::Debug for TungsteniteConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TungsteniteConnection")
            .field("heartbeat", &self.heartbeat.as_ref().map(Interval::period))
            .field("silence_limit", &self.silence_limit)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}
