//! Remote platform access
//!
//! [`Transport`] moves raw requests; [`HttpTransport`] is the production
//! implementation. [`RemoteClient`] layers the typed ruleset/rule/tag
//! operations and the retry rules on top of any transport.

mod client;
mod error;
mod http;
mod retry;
mod shutdown;
mod transport;

pub use client::RemoteClient;
pub use error::RemoteError;
pub use http::{Credentials, HttpTransport};
pub use retry::RetryPolicy;
pub use shutdown::{Interrupted, Shutdown, ShutdownTrigger, shutdown_channel};
pub use transport::{Method, RemoteRequest, RemoteResponse, Transport, TransportError};

use std::sync::Arc;

use crate::config::Settings;
use crate::workspace::Workspace;
use crate::{Error, Result};

/// Build an HTTP-backed client for `workspace` from settings.
///
/// # Errors
///
/// Returns [`Error::Config`] if credentials are missing or the HTTP client
/// cannot be created.
pub fn connect(settings: &Settings, workspace: &Workspace, shutdown: Shutdown) -> Result<RemoteClient> {
    let credentials = settings.credentials()?;
    let transport = HttpTransport::new(
        settings.api_url.clone(),
        credentials,
        workspace.org_id(),
        settings.request_timeout(),
    )
    .map_err(|e| Error::Config { message: e.message })?;

    Ok(RemoteClient::new(
        Arc::new(transport),
        settings.retry.policy(),
        shutdown,
    ))
}
