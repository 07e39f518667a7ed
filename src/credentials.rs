//! Client certificate loading for mutual TLS
//!
//! Swish authenticates merchants with a client certificate delivered as a
//! passphrase protected PKCS#12 archive, and signs its own server certificate
//! with a private root that is delivered separately as PEM. This module turns
//! both into a [`SecureChannel`]: one certificate chain with its private key,
//! plus the set of roots the server certificate must chain to.
//!
//! Credentials can be given as a filesystem path or as bytes already in
//! memory. Paths are read fully before decoding, so both forms go through the
//! exact same code and produce equal channels.

use crate::error::CredentialFailure;
use crate::{Result, SwishError};
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::{ClientConfig, RootCertStore};
use std::borrow::Cow;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Where a piece of certificate material comes from
#[derive(Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Read the file at this path when the client is built
    Path(PathBuf),
    /// Use these bytes as-is
    Bytes(Vec<u8>),
}

impl fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Self::Bytes(bytes) => write!(f, "Bytes(<{} bytes>)", bytes.len()),
        }
    }
}

impl CredentialSource {
    /// Create a source backed by a file
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    /// Create a source backed by in-memory bytes
    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(bytes.into())
    }

    /// Load the full contents of this source
    pub fn read(&self) -> Result<Cow<'_, [u8]>> {
        let bytes = match self {
            Self::Path(path) => Cow::Owned(std::fs::read(path).map_err(|e| {
                SwishError::credential(
                    CredentialFailure::SourceUnreadable,
                    format!("Failed to read {}: {}", path.display(), e),
                )
            })?),
            Self::Bytes(bytes) => Cow::Borrowed(bytes.as_slice()),
        };

        if bytes.is_empty() {
            return Err(SwishError::credential(
                CredentialFailure::SourceUnreadable,
                "Credential source is empty",
            ));
        }

        Ok(bytes)
    }
}

/// Decrypt a PKCS#12 archive and re-encode its contents as PEM.
///
/// Key bags come out as `PRIVATE KEY` blocks and certificate bags as
/// `CERTIFICATE` blocks; certificates keep their archive order so the leaf
/// stays first.
pub fn pkcs12_to_pem(archive: &[u8], passphrase: &str) -> Result<String> {
    let pfx = p12::PFX::parse(archive).map_err(|e| decrypt_failed("Malformed PKCS#12 archive", e))?;

    if !pfx.verify_mac(passphrase) {
        return Err(SwishError::credential(
            CredentialFailure::DecryptFailed,
            "PKCS#12 integrity check failed, wrong passphrase?",
        ));
    }

    let keys = pfx
        .key_bags(passphrase)
        .map_err(|e| decrypt_failed("Failed to decrypt private key", e))?;
    let certs = pfx
        .cert_x509_bags(passphrase)
        .map_err(|e| decrypt_failed("Failed to decrypt certificates", e))?;

    let blocks: Vec<pem::Pem> = keys
        .into_iter()
        .map(|der| pem::Pem::new("PRIVATE KEY", der))
        .chain(certs.into_iter().map(|der| pem::Pem::new("CERTIFICATE", der)))
        .collect();

    let config = pem::EncodeConfig::new().set_line_ending(pem::LineEnding::LF);
    Ok(pem::encode_many_config(&blocks, config))
}

fn decrypt_failed(context: &str, error: impl fmt::Debug) -> SwishError {
    SwishError::credential(
        CredentialFailure::DecryptFailed,
        format!("{}: {:?}", context, error),
    )
}

/// Parse concatenated PEM as one certificate chain and its private key
pub fn parse_key_pair(
    pem_data: &[u8],
) -> Result<(Vec<CertificateDer<'static>>, PrivateKeyDer<'static>)> {
    let invalid = |message: String| SwishError::credential(CredentialFailure::KeyPairInvalid, message);

    let certificates = rustls_pemfile::certs(&mut &pem_data[..])
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| invalid(format!("Unreadable certificate block: {}", e)))?;
    if certificates.is_empty() {
        return Err(invalid("No certificate found in PKCS#12 archive".to_string()));
    }

    let private_key = rustls_pemfile::private_key(&mut &pem_data[..])
        .map_err(|e| invalid(format!("Unreadable private key block: {}", e)))?
        .ok_or_else(|| invalid("No private key found in PKCS#12 archive".to_string()))?;

    Ok((certificates, private_key))
}

/// Decrypt a PKCS#12 archive into the client certificate chain and its key
pub fn load_client_identity(
    archive: &[u8],
    passphrase: &str,
) -> Result<(Vec<CertificateDer<'static>>, PrivateKeyDer<'static>)> {
    let pem_data = pkcs12_to_pem(archive, passphrase)?;
    parse_key_pair(pem_data.as_bytes())
}

/// Parse a PEM root bundle into trusted root certificates.
///
/// Certificates the TLS stack cannot use are skipped. The bundle must still be
/// valid PEM and yield at least one root.
pub fn load_trusted_roots(bundle: &[u8]) -> Result<Vec<CertificateDer<'static>>> {
    let parsed = rustls_pemfile::certs(&mut &bundle[..])
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| {
            SwishError::credential(
                CredentialFailure::RootBundleInvalid,
                format!("Malformed root certificate bundle: {}", e),
            )
        })?;

    let mut store = RootCertStore::empty();
    let mut roots = Vec::with_capacity(parsed.len());
    for cert in parsed {
        match store.add(cert.clone()) {
            Ok(()) => roots.push(cert),
            Err(e) => tracing::warn!("Ignoring unusable root certificate: {}", e),
        }
    }

    if roots.is_empty() {
        return Err(SwishError::credential(
            CredentialFailure::RootBundleInvalid,
            "No usable certificate in root bundle",
        ));
    }

    Ok(roots)
}

/// Mutual TLS material for talking to Swish.
///
/// Holds the client certificate chain and key presented to the server and the
/// roots the server certificate is checked against. Both are non-empty, and
/// the rustls configuration built from them is validated when the channel is
/// created.
#[derive(Clone)]
pub struct SecureChannel {
    certificate_chain: Vec<CertificateDer<'static>>,
    private_key: Arc<PrivateKeyDer<'static>>,
    trusted_roots: Vec<CertificateDer<'static>>,
    tls_config: Arc<ClientConfig>,
}

impl SecureChannel {
    /// Build a channel from a PKCS#12 archive, its passphrase and a PEM root bundle
    pub fn from_pkcs12(archive: &[u8], passphrase: &str, root_bundle: &[u8]) -> Result<Self> {
        let (certificate_chain, private_key) = load_client_identity(archive, passphrase)?;
        let trusted_roots = load_trusted_roots(root_bundle)?;

        let tls_config = build_tls_config(&certificate_chain, &private_key, &trusted_roots)?;

        tracing::debug!(
            "Loaded client certificate chain of {} certificate(s) and {} trusted root(s)",
            certificate_chain.len(),
            trusted_roots.len()
        );

        Ok(Self {
            certificate_chain,
            private_key: Arc::new(private_key),
            trusted_roots,
            tls_config: Arc::new(tls_config),
        })
    }

    /// Build a channel from credential sources, reading paths into memory first
    pub fn from_sources(
        p12: &CredentialSource,
        passphrase: &str,
        root: &CredentialSource,
    ) -> Result<Self> {
        let archive = p12.read()?;
        let root_bundle = root.read()?;
        Self::from_pkcs12(&archive, passphrase, &root_bundle)
    }

    /// The client certificate chain, leaf first
    pub fn certificate_chain(&self) -> &[CertificateDer<'static>] {
        &self.certificate_chain
    }

    /// The roots the server certificate must chain to
    pub fn trusted_roots(&self) -> &[CertificateDer<'static>] {
        &self.trusted_roots
    }

    /// A copy of the rustls configuration for this channel
    pub fn tls_config(&self) -> ClientConfig {
        self.tls_config.as_ref().clone()
    }
}

fn build_tls_config(
    certificate_chain: &[CertificateDer<'static>],
    private_key: &PrivateKeyDer<'static>,
    trusted_roots: &[CertificateDer<'static>],
) -> Result<ClientConfig> {
    let mut store = RootCertStore::empty();
    store.add_parsable_certificates(trusted_roots.iter().cloned());

    let provider = Arc::new(rustls::crypto::ring::default_provider());
    ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| SwishError::config(format!("Failed to configure TLS: {}", e)))?
        .with_root_certificates(store)
        .with_client_auth_cert(certificate_chain.to_vec(), private_key.clone_key())
        .map_err(|e| {
            SwishError::credential(
                CredentialFailure::KeyPairInvalid,
                format!("Client certificate rejected: {}", e),
            )
        })
}

impl PartialEq for SecureChannel {
    fn eq(&self, other: &Self) -> bool {
        self.certificate_chain == other.certificate_chain
            && self.private_key.secret_der() == other.private_key.secret_der()
            && self.trusted_roots == other.trusted_roots
    }
}

impl Eq for SecureChannel {}

impl fmt::Debug for SecureChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureChannel")
            .field("certificate_chain", &self.certificate_chain.len())
            .field("private_key", &"<redacted>")
            .field("trusted_roots", &self.trusted_roots.len())
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Credentials generated on the fly so tests need no checked-in fixtures.

    pub const PASSPHRASE: &str = "swish";

    pub struct TestCredentials {
        pub p12: Vec<u8>,
        pub root_pem: Vec<u8>,
    }

    pub fn generate() -> TestCredentials {
        let client = rcgen::generate_simple_self_signed(vec!["merchant.example".to_string()])
            .expect("client certificate");
        let root = rcgen::generate_simple_self_signed(vec!["swish.example".to_string()])
            .expect("root certificate");

        let pfx = p12::PFX::new(
            client.cert.der(),
            &client.key_pair.serialize_der(),
            None,
            PASSPHRASE,
            "merchant",
        )
        .expect("pkcs12 archive");

        TestCredentials {
            p12: pfx.to_der(),
            root_pem: root.cert.pem().into_bytes(),
        }
    }
}
