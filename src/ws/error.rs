#![expect(
    clippy::module_name_repetitions,
    reason = "Error types include the module name to indicate their scope"
)]

use std::error::Error as StdError;
use std::fmt;

use tokio_tungstenite::tungstenite::http::StatusCode;

/// WebSocket error variants.
#[non_exhaustive]
#[derive(Debug)]
pub enum WsError {
    /// Error connecting to or communicating with the WebSocket server
    Connection(tokio_tungstenite::tungstenite::Error),
    /// The server answered the upgrade request with a non-101 response
    Rejected {
        /// HTTP status of the rejection
        status: StatusCode,
        /// Response body, if the server sent one
        body: Option<String>,
    },
    /// WebSocket connection was closed
    ConnectionClosed,
    /// No frame arrived within the heartbeat window
    Timeout,
    /// Connect and handshake did not finish within the dial timeout
    DialTimeout(std::time::Duration),
}

impl fmt::Display for WsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connection(e) => write!(f, "WebSocket connection error: {e}"),
            Self::Rejected {
                status,
                body: Some(body),
            } => write!(f, "WebSocket upgrade rejected with {status}: {body}"),
            Self::Rejected { status, body: None } => {
                write!(f, "WebSocket upgrade rejected with {status}")
            }
            Self::ConnectionClosed => write!(f, "WebSocket connection closed"),
            Self::Timeout => write!(f, "WebSocket heartbeat timed out"),
            Self::DialTimeout(after) => write!(f, "WebSocket dial timed out after {after:?}"),
        }
    }
}

impl StdError for WsError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Connection(e) => Some(e),
            _ => None,
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for WsError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        use tokio_tungstenite::tungstenite::Error as TungsteniteError;

        match e {
            TungsteniteError::Http(response) => Self::Rejected {
                status: response.status(),
                body: response
                    .body()
                    .as_ref()
                    .map(|body| String::from_utf8_lossy(body).into_owned()),
            },
            TungsteniteError::ConnectionClosed | TungsteniteError::AlreadyClosed => {
                Self::ConnectionClosed
            }
            other => Self::Connection(other),
        }
    }
}

// Integration with main Error type
impl From<WsError> for crate::error::Error {
    fn from(e: WsError) -> Self {
        crate::error::Error::with_source(crate::error::Kind::WebSocket, e)
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for crate::error::Error {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        WsError::from(e).into()
    }
}
