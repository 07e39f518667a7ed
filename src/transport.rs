//! HTTP transport setup for mutual TLS

use crate::credentials::SecureChannel;
use crate::{Result, SwishError};
use reqwest::{Client, ClientBuilder};

/// User agent sent by the default transport
pub const USER_AGENT: &str = concat!("swish-rs/", env!("CARGO_PKG_VERSION"));

/// The HTTP transport a [`crate::SwishClient`] sends its requests through.
///
/// TLS settings can only be installed on a client that has not been built
/// yet, so only the `Builder` variant is usable. Passing an already built
/// [`Client`] fails with [`SwishError::UnsupportedTransport`] instead of
/// silently talking to Swish without a client certificate.
#[derive(Debug)]
pub enum HttpTransport {
    /// A client builder the secure channel is installed on
    Builder(ClientBuilder),
    /// An already built client, which cannot take TLS settings
    Client(Client),
}

impl HttpTransport {
    /// Install the channel's TLS configuration and build the client.
    ///
    /// Only the TLS configuration of the builder is replaced; timeouts,
    /// proxies and other settings chosen by the caller are kept.
    pub fn install(self, channel: &SecureChannel) -> Result<Client> {
        match self {
            HttpTransport::Builder(builder) => builder
                .use_preconfigured_tls(channel.tls_config())
                .build()
                .map_err(|e| SwishError::config(format!("Failed to create HTTP client: {}", e))),
            HttpTransport::Client(_) => Err(SwishError::UnsupportedTransport),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        HttpTransport::Builder(Client::builder().user_agent(USER_AGENT))
    }
}

impl From<ClientBuilder> for HttpTransport {
    fn from(builder: ClientBuilder) -> Self {
        HttpTransport::Builder(builder)
    }
}

impl From<Client> for HttpTransport {
    fn from(client: Client) -> Self {
        HttpTransport::Client(client)
    }
}
