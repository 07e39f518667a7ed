//! # swish - Swish payment API client
//!
//! A Rust client for the Swish merchant API. Swish authenticates merchants
//! with mutual TLS: the merchant certificate comes as a passphrase protected
//! PKCS#12 archive and the Swish server certificate chains to a separately
//! delivered root. This library turns that material into a TLS configured
//! HTTP client and exposes the payment request and refund endpoints on top of
//! it.
//!
//! ```no_run
//! use swish::{Amount, ClientConfig, CredentialSource, PaymentRecord, SwishClient};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> swish::Result<()> {
//! let client = SwishClient::new(ClientConfig::new(
//!     "test",
//!     CredentialSource::path("./certs/test.p12"),
//!     "swish",
//!     CredentialSource::path("./certs/root.pem"),
//! ))?;
//!
//! let cancel = CancellationToken::new();
//! let created = client
//!     .create_payment(
//!         &cancel,
//!         PaymentRecord::payment("100.00".parse::<Amount>()?, "SEK", "1231181189", "https://example.com/callback")
//!             .with_payee_payment_reference("0123456789")
//!             .with_message("Kingston USB Flash Drive 8 GB"),
//!     )
//!     .await?;
//!
//! let status = client.get_payment(&cancel, created.id.as_deref().unwrap_or_default()).await?;
//! println!("Payment status: {:?}", status.status);
//! # Ok(())
//! # }
//! ```
//!
//! Errors from every layer (certificate loading, transport, HTTP status and
//! Swish error bodies) come back as a single [`SwishError`].

pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod payments;
pub mod transport;
pub mod types;

// Re-exports for convenience
pub use client::SwishClient;
pub use config::ClientConfig;
pub use credentials::{CredentialSource, SecureChannel};
pub use error::{CredentialFailure, Result, SwishError};
pub use transport::HttpTransport;
pub use types::*;

/// Current version of the swish library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
