#![expect(
    clippy::module_name_repetitions,
    reason = "Connection types expose their domain in the name for clarity"
)]

use std::fmt;
use std::marker::PhantomData;
use std::time::{Duration, Instant};

use backoff::ExponentialBackoff;
use backoff::backoff::Backoff as _;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_tungstenite::tungstenite::http::{HeaderMap, HeaderName, HeaderValue};
use tokio_util::sync::CancellationToken;
use url::Url;

use super::config::Config;
use super::traits::{Connection, Dialer, EventSink, MessageParser};
use crate::Result;

/// Broadcast channel capacity for lifecycle notifications.
const LIFECYCLE_CAPACITY: usize = 1024;

/// Query parameters that carry secrets and are masked in logs.
const SENSITIVE_PARAMS: &[&str] = &["api_key"];

const REDACTED: &str = "********";

/// Everything a [`Dialer`] needs to open the stream: the URL and the handshake headers.
#[non_exhaustive]
#[derive(Clone)]
pub struct ConnectRequest {
    pub url: Url,
    pub headers: HeaderMap,
}

impl ConnectRequest {
    #[must_use]
    pub fn new(url: Url) -> Self {
        Self {
            url,
            headers: HeaderMap::new(),
        }
    }

    /// Adds a handshake header, replacing any existing value for `name`.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self> {
        let name = HeaderName::from_bytes(name.as_bytes())?;
        let value = HeaderValue::from_str(value)?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// The URL with secret query parameters masked, suitable for logging.
    #[must_use]
    pub fn redacted_url(&self) -> String {
        let mut url = self.url.clone();
        let pairs: Vec<(String, String)> = self
            .url
            .query_pairs()
            .map(|(key, value)| {
                let value = if SENSITIVE_PARAMS.contains(&key.as_ref()) {
                    REDACTED.to_owned()
                } else {
                    value.into_owned()
                };
                (key.into_owned(), value)
            })
            .collect();

        if !pairs.is_empty() {
            url.query_pairs_mut().clear().extend_pairs(pairs);
        }

        url.to_string()
    }
}

impl fmt::Debug for ConnectRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectRequest")
            .field("url", &self.redacted_url())
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Connection state tracking.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not started yet
    Idle,
    /// Dialing the server
    Connecting {
        /// Attempt number since the last successful connection, starting at 1
        attempt: u32,
    },
    /// Successfully connected
    Connected {
        /// When the connection was established
        since: Instant,
    },
    /// Waiting before the next dial
    BackingOff {
        /// How long this wait lasts
        delay: Duration,
    },
    /// Cancelled; no further connections will be made
    Terminated,
}

impl ConnectionState {
    /// Check if the connection is currently active.
    #[must_use]
    pub const fn is_connected(self) -> bool {
        matches!(self, Self::Connected { .. })
    }

    /// Check if the stream has stopped for good.
    #[must_use]
    pub const fn is_terminated(self) -> bool {
        matches!(self, Self::Terminated)
    }
}

/// Notifications emitted by the stream worker, in the order things happen.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lifecycle {
    /// A dial attempt is starting
    Dialing { attempt: u32 },
    /// A dial attempt failed
    DialFailed { attempt: u32, reason: String },
    /// A dial attempt succeeded
    Connected,
    /// Reading from an established connection failed; the connection has been closed
    ReadFailed { reason: String },
    /// One frame could not be decoded; the session continues
    DecodeFailed { reason: String },
    /// Waiting before the next dial
    BackingOff { delay: Duration },
    /// Cancellation observed; the worker has stopped
    Terminated,
}

/// How a connected session ended.
enum SessionEnd {
    Cancelled,
    ReadFailed(crate::error::Error),
}

/// Keeps an event stream running until cancelled.
///
/// The client dials through its [`Dialer`], reads frames one at a time, decodes each with its
/// [`MessageParser`] and hands the result to an [`EventSink`] before reading the next frame.
/// Dial and read failures are followed by an exponential backoff wait and a fresh dial; decode
/// failures are reported and skipped. Only the [`CancellationToken`] stops it.
///
/// # Type Parameters
///
/// - `D`: transport dialer
/// - `P`: parser type that implements [`MessageParser<M>`]
/// - `M`: decoded message type
///
/// # Example
///
/// ```ignore
/// let client = StreamClient::new(TungsteniteDialer::new(&config), request, config, EnvelopeParser);
/// let mut lifecycle = client.lifecycle();
///
/// let cancel = CancellationToken::new();
/// let handle = client.spawn(router, cancel.clone());
///
/// // Later...
/// cancel.cancel();
/// let router = handle.await?;
/// ```
pub struct StreamClient<D, P, M>
where
    D: Dialer,
    P: MessageParser<M>,
{
    dialer: D,
    request: ConnectRequest,
    config: Config,
    parser: P,
    /// Watch channel sender for state changes
    state_tx: watch::Sender<ConnectionState>,
    /// Watch channel receiver for state changes (for use in checking the current state)
    state_rx: watch::Receiver<ConnectionState>,
    /// Broadcast sender for lifecycle notifications
    lifecycle_tx: broadcast::Sender<Lifecycle>,
    _phantom: PhantomData<fn() -> M>,
}

impl<D, P, M> StreamClient<D, P, M>
where
    D: Dialer,
    P: MessageParser<M>,
    M: Send + 'static,
{
    /// Create a stream client. Nothing happens until [`Self::run`] or [`Self::spawn`].
    pub fn new(dialer: D, request: ConnectRequest, config: Config, parser: P) -> Self {
        let (state_tx, state_rx) = watch::channel(ConnectionState::Idle);
        let (lifecycle_tx, _) = broadcast::channel(LIFECYCLE_CAPACITY);

        Self {
            dialer,
            request,
            config,
            parser,
            state_tx,
            state_rx,
            lifecycle_tx,
            _phantom: PhantomData,
        }
    }

    /// Run the connect/receive/reconnect loop until `cancel` fires.
    ///
    /// Cancellation is observed before every dial and while dialing, reading or backing off. A
    /// held connection is closed before this returns.
    pub async fn run<S>(&self, sink: &mut S, cancel: &CancellationToken)
    where
        S: EventSink<M> + ?Sized,
    {
        let mut backoff: ExponentialBackoff = self.config.reconnect.clone().into();
        let mut attempt = 0_u32;

        while !cancel.is_cancelled() {
            attempt = attempt.saturating_add(1);
            self.transition(ConnectionState::Connecting { attempt });
            self.notify(Lifecycle::Dialing { attempt });

            #[cfg(feature = "tracing")]
            tracing::debug!(attempt, url = %self.request.redacted_url(), "Dialing WebSocket");

            let dialed = tokio::select! {
                biased;

                () = cancel.cancelled() => break,
                result = self.dialer.dial(&self.request, cancel) => result,
            };

            match dialed {
                Ok(mut connection) => {
                    attempt = 0;
                    backoff.reset();
                    self.transition(ConnectionState::Connected {
                        since: Instant::now(),
                    });
                    self.notify(Lifecycle::Connected);

                    let ended = self.receive(&mut connection, sink, cancel).await;
                    connection.close().await;

                    match ended {
                        SessionEnd::Cancelled => break,
                        SessionEnd::ReadFailed(e) => {
                            #[cfg(feature = "tracing")]
                            tracing::warn!(error = %e, "Read error, reconnecting");
                            self.notify(Lifecycle::ReadFailed {
                                reason: e.to_string(),
                            });
                        }
                    }
                }
                Err(e) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(attempt, error = %e, "Unable to connect");
                    self.notify(Lifecycle::DialFailed {
                        attempt,
                        reason: e.to_string(),
                    });
                }
            }

            // `max_elapsed_time` is unset, so the policy always yields a delay
            let delay = backoff
                .next_backoff()
                .unwrap_or(self.config.reconnect.max_backoff);
            self.transition(ConnectionState::BackingOff { delay });
            self.notify(Lifecycle::BackingOff { delay });

            #[cfg(feature = "tracing")]
            tracing::info!("Reconnecting in {delay:?}");

            tokio::select! {
                biased;

                () = cancel.cancelled() => break,
                () = sleep(delay) => {}
            }
        }

        self.transition(ConnectionState::Terminated);
        self.notify(Lifecycle::Terminated);

        #[cfg(feature = "tracing")]
        tracing::debug!("Cancellation requested, event stream terminated");
    }

    /// Read and dispatch frames until the connection fails or `cancel` fires.
    async fn receive<C, S>(
        &self,
        connection: &mut C,
        sink: &mut S,
        cancel: &CancellationToken,
    ) -> SessionEnd
    where
        C: Connection,
        S: EventSink<M> + ?Sized,
    {
        loop {
            let frame = tokio::select! {
                biased;

                () = cancel.cancelled() => return SessionEnd::Cancelled,
                frame = connection.read_message() => frame,
            };

            let bytes = match frame {
                Ok(bytes) => bytes,
                Err(e) => return SessionEnd::ReadFailed(e),
            };

            #[cfg(feature = "tracing")]
            tracing::trace!(payload = %String::from_utf8_lossy(&bytes), "Received frame");

            match self.parser.parse(&bytes) {
                Ok(message) => sink.on_message(message).await,
                Err(e) => {
                    #[cfg(feature = "tracing")]
                    tracing::error!(payload = %e.payload, error = %e, "Failed to decode event");
                    self.notify(Lifecycle::DecodeFailed {
                        reason: e.to_string(),
                    });
                    sink.on_decode_error(e).await;
                }
            }
        }
    }

    fn transition(&self, state: ConnectionState) {
        #[cfg(feature = "tracing")]
        tracing::debug!(?state, "Connection state changed");
        _ = self.state_tx.send(state);
    }

    fn notify(&self, event: Lifecycle) {
        // No subscribers is fine
        _ = self.lifecycle_tx.send(event);
    }

    /// Run on a new tokio task. The sink is handed back once the stream terminates.
    pub fn spawn<S>(self, mut sink: S, cancel: CancellationToken) -> JoinHandle<S>
    where
        S: EventSink<M> + 'static,
    {
        tokio::spawn(async move {
            self.run(&mut sink, &cancel).await;
            sink
        })
    }

    /// Get the current connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    /// Subscribe to connection state changes.
    #[must_use]
    pub fn state_receiver(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    /// Subscribe to lifecycle notifications.
    ///
    /// Only notifications sent after this call are received, so subscribe before running.
    #[must_use]
    pub fn lifecycle(&self) -> broadcast::Receiver<Lifecycle> {
        self.lifecycle_tx.subscribe()
    }
}

impl<D, P, M> fmt::Debug for StreamClient<D, P, M>
where
    D: Dialer,
    P: MessageParser<M>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamClient")
            .field("request", &self.request)
            .field("config", &self.config)
            .field("state", &*self.state_rx.borrow())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        reason = "Do not need additional syntax for setting up tests"
    )]

    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use tokio::sync::mpsc;
    use tokio::time::Instant as TokioInstant;
    use tokio_tungstenite::tungstenite::http::StatusCode;

    use super::*;
    use crate::events::{DecodeError, Envelope, EnvelopeParser};
    use crate::ws::config::ReconnectConfig;
    use crate::ws::error::WsError;
    use crate::ws::traits::StreamItem;

    #[derive(Debug)]
    enum Step {
        Refuse,
        Accept {
            frames: Vec<&'static str>,
            then: Then,
        },
    }

    #[derive(Debug, Clone, Copy)]
    enum Then {
        Fail,
        Hang,
    }

    /// Shared observations made by the scripted transport.
    #[derive(Default, Clone)]
    struct Counters {
        /// Time of each dial and the number of `close()` calls made before it
        dials: Arc<Mutex<Vec<(TokioInstant, usize)>>>,
        closes: Arc<AtomicUsize>,
        reads: Arc<AtomicUsize>,
    }

    impl Counters {
        fn dial_count(&self) -> usize {
            self.dials.lock().unwrap().len()
        }

        fn gaps(&self) -> Vec<Duration> {
            let dials = self.dials.lock().unwrap();
            dials.windows(2).map(|w| w[1].0 - w[0].0).collect()
        }
    }

    /// Plays back `script` one step per dial; once exhausted it cancels `done` and never returns.
    struct ScriptedDialer {
        script: Mutex<VecDeque<Step>>,
        counters: Counters,
        done: CancellationToken,
    }

    #[async_trait]
    impl Dialer for ScriptedDialer {
        type Connection = ScriptedConnection;

        async fn dial(
            &self,
            _request: &ConnectRequest,
            _cancel: &CancellationToken,
        ) -> Result<ScriptedConnection> {
            let closes = self.counters.closes.load(Ordering::SeqCst);
            self.counters
                .dials
                .lock()
                .unwrap()
                .push((TokioInstant::now(), closes));

            let step = self.script.lock().unwrap().pop_front();
            match step {
                Some(Step::Refuse) => Err(WsError::Rejected {
                    status: StatusCode::SERVICE_UNAVAILABLE,
                    body: None,
                }
                .into()),
                Some(Step::Accept { frames, then }) => Ok(ScriptedConnection {
                    frames: frames.into_iter().collect(),
                    then,
                    counters: self.counters.clone(),
                }),
                None => {
                    self.done.cancel();
                    std::future::pending().await
                }
            }
        }
    }

    struct ScriptedConnection {
        frames: VecDeque<&'static str>,
        then: Then,
        counters: Counters,
    }

    #[async_trait]
    impl Connection for ScriptedConnection {
        async fn read_message(&mut self) -> Result<Vec<u8>> {
            self.counters.reads.fetch_add(1, Ordering::SeqCst);
            match (self.frames.pop_front(), self.then) {
                (Some(frame), _) => Ok(frame.as_bytes().to_vec()),
                (None, Then::Fail) => Err(WsError::ConnectionClosed.into()),
                (None, Then::Hang) => std::future::pending().await,
            }
        }

        async fn close(&mut self) {
            self.counters.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Records what it receives, and how many reads had started when each message arrived.
    #[derive(Default)]
    struct Recorder {
        seen: Vec<String>,
        reads_at_delivery: Vec<usize>,
        reads: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl EventSink<Envelope> for Recorder {
        async fn on_message(&mut self, message: Envelope) {
            self.reads_at_delivery
                .push(self.reads.load(Ordering::SeqCst));
            self.seen.push(message.application.unwrap_or_default());
            // A slow sink must hold back the next read
            sleep(Duration::from_millis(10)).await;
        }

        async fn on_decode_error(&mut self, error: DecodeError) {
            self.seen.push(format!("error:{}", error.payload));
        }
    }

    fn frame(application: &'static str) -> &'static str {
        match application {
            "f1" => r#"{"type":"StasisStart","application":"f1","timestamp":"2024-01-02T03:04:05.123+0000"}"#,
            "f2" => r#"{"type":"ChannelVarset","application":"f2","variable":"X","value":"1"}"#,
            "f3" => r#"{"type":"StasisEnd","application":"f3"}"#,
            _ => r#"{"type":"StasisStart","timestamp":"2024-01-02 03:04:05"}"#,
        }
    }

    fn harness(
        script: Vec<Step>,
        initial_backoff: Duration,
    ) -> (
        StreamClient<ScriptedDialer, EnvelopeParser, Envelope>,
        Counters,
        CancellationToken,
    ) {
        let counters = Counters::default();
        let cancel = CancellationToken::new();
        let dialer = ScriptedDialer {
            script: Mutex::new(script.into()),
            counters: counters.clone(),
            done: cancel.clone(),
        };
        let mut config = Config::default();
        config.reconnect = ReconnectConfig {
            initial_backoff,
            max_backoff: initial_backoff * 60,
            ..ReconnectConfig::default()
        };
        let request = ConnectRequest::new(Url::parse("ws://asterisk.test/ari/events").unwrap());

        (
            StreamClient::new(dialer, request, config, EnvelopeParser),
            counters,
            cancel,
        )
    }

    fn drain(rx: &mut broadcast::Receiver<Lifecycle>) -> Vec<Lifecycle> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn label(event: &Lifecycle) -> Option<String> {
        match event {
            Lifecycle::Dialing { .. } => None,
            Lifecycle::DialFailed { .. } => Some("dial-fail".to_owned()),
            Lifecycle::Connected => Some("dial-success".to_owned()),
            Lifecycle::ReadFailed { .. } => Some("read-fail".to_owned()),
            Lifecycle::DecodeFailed { .. } => Some("decode-fail".to_owned()),
            Lifecycle::BackingOff { delay } => Some(format!("wait {}ms", delay.as_millis())),
            Lifecycle::Terminated => Some("terminated".to_owned()),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn reconnect_scenario_resets_backoff_after_successful_dial() {
        let d0 = Duration::from_millis(100);
        let (client, counters, cancel) = harness(
            vec![
                Step::Refuse,
                Step::Refuse,
                Step::Accept {
                    frames: vec![],
                    then: Then::Fail,
                },
            ],
            d0,
        );
        let mut lifecycle = client.lifecycle();

        client.run(&mut Recorder::default(), &cancel).await;

        let labels: Vec<String> = drain(&mut lifecycle).iter().filter_map(label).collect();
        assert_eq!(
            labels,
            vec![
                "dial-fail",
                "wait 100ms",
                "dial-fail",
                "wait 200ms",
                "dial-success",
                "read-fail",
                "wait 100ms",
                "terminated",
            ]
        );
        assert_eq!(counters.gaps(), vec![d0, d0 * 2, d0]);
        assert_eq!(client.state(), ConnectionState::Terminated);
    }

    #[tokio::test(start_paused = true)]
    async fn backoff_doubles_and_saturates_at_ceiling() {
        let d0 = Duration::from_secs(1);
        let script = (0..9).map(|_| Step::Refuse).collect();
        let (client, counters, cancel) = harness(script, d0);

        client.run(&mut Recorder::default(), &cancel).await;

        let gaps: Vec<u64> = counters.gaps().iter().map(Duration::as_secs).collect();
        assert_eq!(gaps, vec![1, 2, 4, 8, 16, 32, 60, 60, 60]);
    }

    #[tokio::test(start_paused = true)]
    async fn dial_attempts_are_numbered_per_failure_streak() {
        let (client, _counters, cancel) = harness(
            vec![
                Step::Refuse,
                Step::Accept {
                    frames: vec![],
                    then: Then::Fail,
                },
            ],
            Duration::from_millis(10),
        );
        let mut lifecycle = client.lifecycle();

        client.run(&mut Recorder::default(), &cancel).await;

        let attempts: Vec<u32> = drain(&mut lifecycle)
            .iter()
            .filter_map(|event| match event {
                Lifecycle::Dialing { attempt } => Some(*attempt),
                _ => None,
            })
            .collect();
        assert_eq!(attempts, vec![1, 2, 1]);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_during_backoff_terminates_without_dialing() {
        let delay = Duration::from_secs(60);
        let (client, counters, cancel) = harness(
            vec![
                Step::Refuse,
                Step::Accept {
                    frames: vec![],
                    then: Then::Hang,
                },
            ],
            delay,
        );
        let mut lifecycle = client.lifecycle();
        let mut states = client.state_receiver();
        let start = TokioInstant::now();
        let handle = client.spawn(Recorder::default(), cancel.clone());

        loop {
            if let Lifecycle::BackingOff { .. } = lifecycle.recv().await.unwrap() {
                break;
            }
        }
        cancel.cancel();
        handle.await.unwrap();

        assert!(start.elapsed() < delay, "backoff wait must be interrupted");
        assert_eq!(counters.dial_count(), 1);
        assert_eq!(drain(&mut lifecycle), vec![Lifecycle::Terminated]);
        assert!(states.borrow_and_update().is_terminated());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_while_connected_closes_connection_once() {
        let (client, counters, cancel) = harness(
            vec![Step::Accept {
                frames: vec![frame("f1")],
                then: Then::Hang,
            }],
            Duration::from_millis(100),
        );
        let (tx, mut rx) = mpsc::channel::<StreamItem<Envelope>>(8);
        let handle = client.spawn(tx, cancel.clone());

        let first = rx.recv().await.unwrap().unwrap();
        assert_eq!(first.application.as_deref(), Some("f1"));

        cancel.cancel();
        handle.await.unwrap();

        assert_eq!(counters.closes.load(Ordering::SeqCst), 1);
        assert_eq!(counters.dial_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn every_session_is_closed_before_the_next_dial() {
        let session = || Step::Accept {
            frames: vec![frame("f1")],
            then: Then::Fail,
        };
        let (client, counters, cancel) =
            harness(vec![session(), session(), session()], Duration::from_millis(5));

        client.run(&mut Recorder::default(), &cancel).await;

        let closes_before_dial: Vec<usize> =
            counters.dials.lock().unwrap().iter().map(|d| d.1).collect();
        assert_eq!(closes_before_dial, vec![0, 1, 2, 3]);
        assert_eq!(counters.closes.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn frames_are_delivered_in_order_one_at_a_time() {
        let (client, counters, cancel) = harness(
            vec![Step::Accept {
                frames: vec![frame("f1"), frame("f2"), frame("f3")],
                then: Then::Fail,
            }],
            Duration::from_millis(5),
        );
        let mut sink = Recorder {
            reads: Arc::clone(&counters.reads),
            ..Recorder::default()
        };

        client.run(&mut sink, &cancel).await;

        assert_eq!(sink.seen, vec!["f1", "f2", "f3"]);
        assert_eq!(sink.reads_at_delivery, vec![1, 2, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn decode_error_does_not_end_session() {
        let (client, counters, cancel) = harness(
            vec![Step::Accept {
                frames: vec![frame("f1"), frame("bad"), frame("f2")],
                then: Then::Hang,
            }],
            Duration::from_millis(5),
        );
        let mut lifecycle = client.lifecycle();
        let (tx, mut rx) = mpsc::channel::<StreamItem<Envelope>>(8);
        let handle = client.spawn(tx, cancel.clone());

        let mut received = Vec::new();
        for _ in 0..3 {
            received.push(rx.recv().await.unwrap());
        }
        cancel.cancel();
        handle.await.unwrap();

        assert!(received[0].is_ok(), "first frame decodes");
        let err = received[1].as_ref().unwrap_err();
        assert!(err.payload.contains("2024-01-02 03:04:05"), "{err}");
        assert_eq!(
            received[2].as_ref().unwrap().application.as_deref(),
            Some("f2")
        );

        let labels: Vec<String> = drain(&mut lifecycle).iter().filter_map(label).collect();
        assert_eq!(labels, vec!["dial-success", "decode-fail", "terminated"]);
        assert_eq!(counters.dial_count(), 1);
    }

    #[tokio::test]
    async fn cancelled_before_start_never_dials() {
        let (client, counters, cancel) = harness(vec![Step::Refuse], Duration::from_millis(5));
        cancel.cancel();

        client.run(&mut Recorder::default(), &cancel).await;

        assert_eq!(counters.dial_count(), 0);
        assert_eq!(client.state(), ConnectionState::Terminated);
    }

    #[test]
    fn state_starts_idle() {
        let (client, _counters, _cancel) = harness(vec![], Duration::from_millis(5));

        assert_eq!(client.state(), ConnectionState::Idle);
        assert!(!client.state().is_connected());
    }

    #[test]
    fn redacted_url_masks_api_key() {
        let request = ConnectRequest::new(
            Url::parse("ws://pbx:8088/ari/events?app=demo&api_key=user%3Apass").unwrap(),
        );

        let redacted = request.redacted_url();

        assert!(redacted.contains("app=demo"), "{redacted}");
        assert!(redacted.contains("api_key=********"), "{redacted}");
        assert!(!redacted.contains("pass"), "{redacted}");
        assert!(!format!("{request:?}").contains("pass"));
    }

    #[test]
    fn with_header_rejects_invalid_values() {
        let request = ConnectRequest::new(Url::parse("ws://pbx/ari/events").unwrap());

        assert!(request.clone().with_header("X-Ok", "yes").is_ok());
        assert!(request.clone().with_header("bad header", "x").is_err());
        assert!(request.with_header("X-Bad", "line\nbreak").is_err());
    }
}
