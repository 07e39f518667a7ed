//! Client configuration

use crate::credentials::CredentialSource;
use crate::transport::HttpTransport;
use crate::types::Environment;
use crate::{Result, SwishError};
use std::fmt;

/// Environment variable selecting `production` or the sandbox
pub const ENV_ENVIRONMENT: &str = "SWISH_ENVIRONMENT";
/// Environment variable holding the path to the PKCS#12 archive
pub const ENV_P12: &str = "SWISH_P12";
/// Environment variable holding the PKCS#12 passphrase
pub const ENV_PASSPHRASE: &str = "SWISH_PASSPHRASE";
/// Environment variable holding the path to the PEM root bundle
pub const ENV_ROOT_CA: &str = "SWISH_ROOT_CA";
/// Environment variable overriding the API base URL
pub const ENV_BASE_URL: &str = "SWISH_BASE_URL";

/// Everything needed to build a [`crate::SwishClient`]
pub struct ClientConfig {
    /// Which Swish host to talk to
    pub environment: Environment,
    /// Merchant certificate and key as a PKCS#12 archive
    pub p12: CredentialSource,
    /// Passphrase protecting the PKCS#12 archive
    pub passphrase: String,
    /// PEM bundle with the roots the Swish server certificate chains to
    pub root: CredentialSource,
    /// Base URL used instead of the environment's host
    pub base_url: Option<String>,
    /// HTTP transport to install the client certificate on
    pub transport: Option<HttpTransport>,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("environment", &self.environment)
            .field("p12", &self.p12)
            .field("passphrase", &"<redacted>")
            .field("root", &self.root)
            .field("base_url", &self.base_url)
            .field("transport", &self.transport)
            .finish()
    }
}

impl ClientConfig {
    /// Create a new client config
    pub fn new(
        environment: impl Into<Environment>,
        p12: CredentialSource,
        passphrase: impl Into<String>,
        root: CredentialSource,
    ) -> Self {
        Self {
            environment: environment.into(),
            p12,
            passphrase: passphrase.into(),
            root,
            base_url: None,
            transport: None,
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let required = |name: &str| {
            std::env::var(name)
                .ok()
                .filter(|value| !value.is_empty())
                .ok_or_else(|| SwishError::config(format!("{} is required", name)))
        };

        let environment = std::env::var(ENV_ENVIRONMENT).unwrap_or_default();
        let p12 = required(ENV_P12)?;
        let root = required(ENV_ROOT_CA)?;
        let passphrase = std::env::var(ENV_PASSPHRASE).unwrap_or_default();

        let mut config = Self::new(
            environment.as_str(),
            CredentialSource::path(p12),
            passphrase,
            CredentialSource::path(root),
        );

        if let Ok(base_url) = std::env::var(ENV_BASE_URL) {
            if !base_url.is_empty() {
                config.base_url = Some(base_url);
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if let Some(base_url) = &self.base_url {
            let parsed = url::Url::parse(base_url)
                .map_err(|e| SwishError::config(format!("Invalid base URL: {}", e)))?;

            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(SwishError::config(
                    "Base URL must start with http:// or https://",
                ));
            }
        }

        for (name, source) in [("p12", &self.p12), ("root", &self.root)] {
            if matches!(source, CredentialSource::Path(path) if path.as_os_str().is_empty()) {
                return Err(SwishError::config(format!("{} path cannot be empty", name)));
            }
        }

        Ok(())
    }

    /// Use a custom base URL instead of the environment's host
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Use a caller supplied HTTP transport
    pub fn with_transport(mut self, transport: impl Into<HttpTransport>) -> Self {
        self.transport = Some(transport.into());
        self
    }

    /// The base URL requests are sent to, without a trailing slash
    pub fn resolved_base_url(&self) -> String {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.environment.base_url())
            .trim_end_matches('/')
            .to_string()
    }
}
