use bon::Builder;
use url::Url;

use crate::Result;
use crate::auth::Credentials;
use crate::error::Error;
use crate::ws::ConnectRequest;

const DEFAULT_SCHEME: &str = "ws";
const DEFAULT_BASE_PATH: &str = "/ari";
const DEFAULT_USER_AGENT: &str = concat!("ari-events/", env!("CARGO_PKG_VERSION"));

/// Location of an Asterisk ARI server and the Stasis applications to subscribe to.
///
/// # Example
///
/// ```
/// use ari_events::auth::Credentials;
/// use ari_events::events::Endpoint;
///
/// let endpoint = Endpoint::builder()
///     .host("pbx.example.com:8088")
///     .applications(vec!["ivr".to_owned()])
///     .build();
///
/// let request = endpoint
///     .events_request(&Credentials::new("asterisk", "secret"))
///     .unwrap();
/// assert_eq!(request.url.path(), "/ari/events");
/// ```
#[derive(Debug, Clone, Builder)]
#[non_exhaustive]
pub struct Endpoint {
    /// `ws` or `wss`.
    #[builder(into, default = String::from(DEFAULT_SCHEME))]
    pub scheme: String,
    /// Host, optionally with a port, e.g. `pbx.example.com:8088`.
    #[builder(into)]
    pub host: String,
    /// Path prefix of the ARI HTTP server.
    #[builder(into, default = String::from(DEFAULT_BASE_PATH))]
    pub base_path: String,
    /// Stasis application names; at least one is required.
    #[builder(default)]
    pub applications: Vec<String>,
    /// Ask for all events on the system, not only those of the applications' resources.
    #[builder(default)]
    pub subscribe_all: bool,
    #[builder(into)]
    pub user_agent: Option<String>,
    /// Extra headers sent with the upgrade request.
    #[builder(default)]
    pub headers: Vec<(String, String)>,
}

impl Endpoint {
    /// Builds the upgrade request for `{scheme}://{host}{base_path}/events`.
    pub fn events_request(&self, credentials: &Credentials) -> Result<ConnectRequest> {
        if !matches!(self.scheme.as_str(), "ws" | "wss") {
            return Err(Error::validation(format!(
                "unsupported scheme {:?}, expected ws or wss",
                self.scheme
            )));
        }
        if self.host.trim().is_empty() {
            return Err(Error::validation("ARI host must not be empty"));
        }
        let applications: Vec<&str> = self
            .applications
            .iter()
            .map(|app| app.trim())
            .filter(|app| !app.is_empty())
            .collect();
        if applications.is_empty() {
            return Err(Error::validation(
                "at least one Stasis application is required",
            ));
        }

        let base_path = self.base_path.trim_matches('/');
        let path = if base_path.is_empty() {
            "/events".to_owned()
        } else {
            format!("/{base_path}/events")
        };

        let mut url = Url::parse(&format!("{}://{}{path}", self.scheme, self.host))?;
        url.query_pairs_mut()
            .append_pair("app", &applications.join(","))
            .append_pair("api_key", &credentials.api_key());
        if self.subscribe_all {
            url.query_pairs_mut().append_pair("subscribeAll", "true");
        }

        let mut request = ConnectRequest::new(url);
        for (name, value) in &self.headers {
            request = request.with_header(name, value)?;
        }
        request.with_header(
            "User-Agent",
            self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT),
        )
    }
}
