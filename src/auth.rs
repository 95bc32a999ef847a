/// Secret string types that redact values in debug output for security.
pub use secrecy::{ExposeSecret, SecretString};

/// ARI user credentials.
///
/// Asterisk accepts these on the event WebSocket as a single `api_key` query parameter of the
/// form `username:password`. The password is held as a [`SecretString`] so it never shows up in
/// `Debug` output or logs.
#[derive(Clone, Debug)]
pub struct Credentials {
    pub(crate) username: String,
    pub(crate) password: SecretString,
}

impl Credentials {
    #[must_use]
    pub fn new<U: Into<String>, P: Into<String>>(username: U, password: P) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }

    /// Returns the username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the password.
    #[must_use]
    pub fn password(&self) -> &SecretString {
        &self.password
    }

    /// The `username:password` pair sent as the `api_key` query parameter.
    #[must_use]
    pub fn api_key(&self) -> String {
        format!("{}:{}", self.username, self.password.expose_secret())
    }
}
