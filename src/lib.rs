#![cfg_attr(doc, doc = include_str!("../README.md"))]

pub mod auth;
pub mod error;
pub mod events;
pub(crate) mod serde_helpers;
pub mod ws;

use crate::error::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Environment variable holding the ARI server `host[:port]`
pub const HOST_VAR: &str = "ARI_HOST";

/// Environment variable holding the ARI username
pub const USER_VAR: &str = "ARI_USER";

/// Environment variable holding the ARI password
pub const PASS_VAR: &str = "ARI_PASS";

/// Environment variable holding the Stasis application name
pub const APP_VAR: &str = "APP_NAME";
