use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;

use super::parser::DecodeError;
use super::types::{Envelope, EventType};
use crate::ws::traits::EventSink;

type Handler = Box<dyn FnMut(&Envelope) + Send>;
type ErrorHandler = Box<dyn FnMut(&DecodeError) + Send>;

/// Sink that dispatches each envelope to the handler registered for its event type.
///
/// Handlers run inline on the stream worker, so a slow handler delays the next read.
///
/// ```
/// use ari_events::events::{EventRouter, EventType};
///
/// let router = EventRouter::new()
///     .on(EventType::StasisStart, |event| {
///         println!("call entered {:?}", event.application);
///     })
///     .on(EventType::StasisEnd, |event| {
///         println!("call left {:?}", event.application);
///     })
///     .fallback(|event| println!("unhandled {}", event.event_type));
/// ```
#[derive(Default)]
pub struct EventRouter {
    handlers: HashMap<EventType, Handler>,
    fallback: Option<Handler>,
    on_decode_error: Option<ErrorHandler>,
}

impl EventRouter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `event_type`, replacing any previous handler for it.
    #[must_use]
    pub fn on<F>(mut self, event_type: EventType, handler: F) -> Self
    where
        F: FnMut(&Envelope) + Send + 'static,
    {
        self.handlers.insert(event_type, Box::new(handler));
        self
    }

    /// Registers the handler for event types without a dedicated handler.
    #[must_use]
    pub fn fallback<F>(mut self, handler: F) -> Self
    where
        F: FnMut(&Envelope) + Send + 'static,
    {
        self.fallback = Some(Box::new(handler));
        self
    }

    /// Registers a handler for payloads that failed to decode.
    #[must_use]
    pub fn on_error<F>(mut self, handler: F) -> Self
    where
        F: FnMut(&DecodeError) + Send + 'static,
    {
        self.on_decode_error = Some(Box::new(handler));
        self
    }

    /// Dispatches one envelope. Returns `false` when no handler accepted it.
    pub fn dispatch(&mut self, envelope: &Envelope) -> bool {
        if let Some(handler) = self.handlers.get_mut(&envelope.event_type) {
            handler(envelope);
            return true;
        }

        if let Some(fallback) = self.fallback.as_mut() {
            fallback(envelope);
            return true;
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(event_type = %envelope.event_type, "unhandled event type");
        false
    }
}

impl fmt::Debug for EventRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventRouter")
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .field("fallback", &self.fallback.is_some())
            .field("on_decode_error", &self.on_decode_error.is_some())
            .finish()
    }
}

#[async_trait]
impl EventSink<Envelope> for EventRouter {
    async fn on_message(&mut self, message: Envelope) {
        self.dispatch(&message);
    }

    async fn on_decode_error(&mut self, error: DecodeError) {
        if let Some(handler) = self.on_decode_error.as_mut() {
            handler(&error);
        }
    }
}
