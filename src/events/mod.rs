//! Asterisk ARI event stream.
//!
//! Connects to `{base_path}/events` on an ARI server and turns every frame into a typed
//! [`Envelope`]. Envelopes are delivered in arrival order to an [`crate::ws::EventSink`]; the
//! [`EventRouter`] sink dispatches them by [`EventType`].
//!
//! # Example
//!
//! ```rust, no_run
//! use ari_events::auth::Credentials;
//! use ari_events::events::{Client, Endpoint, EventRouter, EventType};
//! use ari_events::ws::Config;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> ari_events::Result<()> {
//! let endpoint = Endpoint::builder()
//!     .host("localhost:8088")
//!     .applications(vec!["demo".to_owned()])
//!     .build();
//! let client = Client::new(&endpoint, &Credentials::new("asterisk", "asterisk"), Config::default())?;
//!
//! let router = EventRouter::new()
//!     .on(EventType::StasisStart, |event| println!("start {:?}", event.channel_id()))
//!     .on(EventType::StasisEnd, |event| println!("end {:?}", event.channel_id()));
//!
//! let cancel = CancellationToken::new();
//! let handle = client.spawn(router, cancel.clone());
//!
//! // Later...
//! cancel.cancel();
//! let _router = handle.await;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod endpoint;
pub mod parser;
pub mod router;
pub mod timestamp;
pub mod types;

pub use client::Client;
pub use endpoint::Endpoint;
pub use parser::{DecodeError, EnvelopeParser, decode};
pub use router::EventRouter;
pub use types::{Envelope, EventType};
