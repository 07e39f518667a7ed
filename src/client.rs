//! Swish API client and request dispatch

use crate::config::ClientConfig;
use crate::credentials::SecureChannel;
use crate::types::{ApiErrorBody, Environment};
use crate::{Result, SwishError};
use reqwest::header::{ACCEPT, CONTENT_TYPE, LOCATION};
use reqwest::{Client, Method, Response, StatusCode};
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// How much of an unread response body is drained before the response is dropped
pub const DRAIN_LIMIT: usize = 512;

/// Client for the Swish payment API.
///
/// Cloning is cheap; clones share the connection pool and the client
/// certificate. Every call takes a [`CancellationToken`] the caller can use to
/// abort it.
#[derive(Debug, Clone)]
pub struct SwishClient {
    environment: Environment,
    base_url: String,
    http: Client,
    channel: Arc<SecureChannel>,
}

impl SwishClient {
    /// Create a new Swish client.
    ///
    /// Loads the certificate material and installs it on the configured (or a
    /// default) HTTP transport. Nothing is returned unless both steps succeed.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let channel = SecureChannel::from_sources(&config.p12, &config.passphrase, &config.root)?;
        let base_url = config.resolved_base_url();
        let http = config.transport.unwrap_or_default().install(&channel)?;

        tracing::debug!(
            "Swish client ready for {} environment at {}",
            config.environment,
            base_url
        );

        Ok(Self {
            environment: config.environment,
            base_url,
            http,
            channel: Arc::new(channel),
        })
    }

    /// Get the environment this client was created for
    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Get the base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the mutual TLS material this client presents
    pub fn secure_channel(&self) -> &SecureChannel {
        &self.channel
    }

    /// Send a request to `base_url + path` and check the response status.
    ///
    /// Returns the response for 200 and 201 only. Any other status is turned
    /// into [`SwishError::Api`] when the body holds Swish error objects and
    /// into [`SwishError::Status`] otherwise.
    pub(crate) async fn dispatch<T>(
        &self,
        cancel: &CancellationToken,
        method: Method,
        path: &str,
        payload: Option<&T>,
    ) -> Result<Response>
    where
        T: Serialize + ?Sized,
    {
        if cancel.is_cancelled() {
            return Err(SwishError::Cancelled);
        }

        let url = format!("{}{}", self.base_url, path);
        let mut request = self
            .http
            .request(method.clone(), &url)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json");

        if let Some(payload) = payload {
            request = request.body(serde_json::to_vec(payload)?);
        }

        tracing::debug!("Sending {} request to: {}", method, url);

        let sent = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(SwishError::Cancelled),
            sent = request.send() => sent,
        };
        let response = sent.map_err(|e| send_error(e, cancel))?;

        let status = response.status();
        if status == StatusCode::OK || status == StatusCode::CREATED {
            return Ok(response);
        }

        tracing::warn!("Swish API responded to {} {} with status: {}", method, url, status);
        Err(status_error(response).await)
    }

    /// Send a create request and return the identifier from its `Location` header
    pub(crate) async fn dispatch_create<T>(
        &self,
        cancel: &CancellationToken,
        collection: &str,
        payload: &T,
    ) -> Result<String>
    where
        T: Serialize + ?Sized,
    {
        let response = self
            .dispatch(cancel, Method::POST, collection, Some(payload))
            .await?;

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        drain(response).await;

        location
            .and_then(|location| self.identifier_from_location(collection, &location))
            .ok_or(SwishError::NoLocationHeader)
    }

    /// Send a GET request and decode the JSON body
    pub(crate) async fn dispatch_get<R>(&self, cancel: &CancellationToken, path: &str) -> Result<R>
    where
        R: serde::de::DeserializeOwned,
    {
        let response = self.dispatch::<()>(cancel, Method::GET, path, None).await?;
        let body = response.bytes().await.map_err(|e| send_error(e, cancel))?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Strip `base_url + collection + "/"` from a `Location` value.
    ///
    /// A location on a different host still yields the part after the
    /// collection path, and a location without the collection path is taken
    /// as the identifier unchanged. Empty identifiers count as missing.
    fn identifier_from_location(&self, collection: &str, location: &str) -> Option<String> {
        let prefix = format!("{}{}/", self.base_url, collection);
        let collection_path = format!("{}/", collection);

        let id = location
            .strip_prefix(&prefix)
            .or_else(|| location.rsplit_once(&collection_path).map(|(_, id)| id))
            .unwrap_or(location);

        (!id.is_empty()).then(|| id.to_string())
    }
}

/// A failed send is reported as cancellation when the caller has cancelled
fn send_error(error: reqwest::Error, cancel: &CancellationToken) -> SwishError {
    if cancel.is_cancelled() {
        SwishError::Cancelled
    } else {
        SwishError::Transport(error)
    }
}

/// Read the whole body of a non-success response and turn it into an error
async fn status_error(response: Response) -> SwishError {
    let status = response.status().as_u16();

    let body = match response.bytes().await {
        Ok(body) => body,
        Err(e) => {
            tracing::debug!("Failed to read error body: {}", e);
            return SwishError::Status { status };
        }
    };

    match serde_json::from_slice::<Vec<ApiErrorBody>>(&body) {
        Ok(errors) => match errors.into_iter().next() {
            Some(first) => first.into(),
            None => SwishError::Status { status },
        },
        Err(_) => SwishError::Status { status },
    }
}

/// Drain up to [`DRAIN_LIMIT`] bytes so the connection can go back to the pool
async fn drain(mut response: Response) {
    let mut drained = 0;
    while drained < DRAIN_LIMIT {
        match response.chunk().await {
            Ok(Some(chunk)) => drained += chunk.len(),
            Ok(None) | Err(_) => break,
        }
    }
}
