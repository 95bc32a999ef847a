use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::endpoint::Endpoint;
use super::parser::EnvelopeParser;
use super::types::Envelope;
use crate::Result;
use crate::auth::Credentials;
use crate::ws::{
    Config, ConnectionState, EventSink, Lifecycle, StreamClient, TungsteniteDialer,
};

/// ARI event stream client.
///
/// Stays connected to the Asterisk events WebSocket until cancelled, decoding each frame into an
/// [`Envelope`] and handing it to an [`EventSink`] such as [`super::EventRouter`].
///
/// # Example
///
/// ```rust, no_run
/// use ari_events::auth::Credentials;
/// use ari_events::events::{Client, Endpoint, EventRouter, EventType};
/// use ari_events::ws::Config;
/// use tokio_util::sync::CancellationToken;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let endpoint = Endpoint::builder()
///         .host("localhost:8088")
///         .applications(vec!["demo".to_owned()])
///         .build();
///     let client = Client::new(&endpoint, &Credentials::new("asterisk", "asterisk"), Config::default())?;
///
///     let mut router = EventRouter::new().on(EventType::StasisStart, |event| {
///         println!("{:?} entered", event.channel_id());
///     });
///
///     let cancel = CancellationToken::new();
///     client.run(&mut router, &cancel).await;
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct Client {
    inner: StreamClient<TungsteniteDialer, EnvelopeParser, Envelope>,
}

impl Client {
    /// Validates the endpoint and prepares the client. No connection is made yet.
    pub fn new(endpoint: &Endpoint, credentials: &Credentials, config: Config) -> Result<Self> {
        let request = endpoint.events_request(credentials)?;
        let dialer = TungsteniteDialer::new(&config);

        Ok(Self {
            inner: StreamClient::new(dialer, request, config, EnvelopeParser),
        })
    }

    /// Streams events into `sink` until `cancel` fires.
    pub async fn run<S>(&self, sink: &mut S, cancel: &CancellationToken)
    where
        S: EventSink<Envelope> + ?Sized,
    {
        self.inner.run(sink, cancel).await;
    }

    /// Streams on a new tokio task and hands the sink back once cancelled.
    pub fn spawn<S>(self, sink: S, cancel: CancellationToken) -> JoinHandle<S>
    where
        S: EventSink<Envelope> + 'static,
    {
        self.inner.spawn(sink, cancel)
    }

    #[must_use]
    pub fn connection_state(&self) -> ConnectionState {
        self.inner.state()
    }

    #[must_use]
    pub fn state_receiver(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state_receiver()
    }

    #[must_use]
    pub fn lifecycle(&self) -> broadcast::Receiver<Lifecycle> {
        self.inner.lifecycle()
    }
}
