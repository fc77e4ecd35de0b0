//! TLS configuration and certificate loading.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum_server::tls_rustls::RustlsConfig;
use rustls::crypto::CryptoProvider;
use rustls::server::{ClientHello, ResolvesServerCert, ResolvesServerCertUsingSni};
use rustls::sign::CertifiedKey;
use rustls::ServerConfig;
use thiserror::Error;

/// Errors raised while turning PEM files into a TLS server configuration.
#[derive(Debug, Error)]
pub enum TlsError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("no certificates found in {0:?}")]
    NoCertificates(PathBuf),

    #[error("no private key found in {0:?}")]
    NoPrivateKey(PathBuf),

    #[error("unsupported private key in {path:?}: {source}")]
    UnsupportedKey {
        path: PathBuf,
        source: rustls::Error,
    },

    #[error("TLS configuration rejected: {0}")]
    Config(#[from] rustls::Error),
}

/// The crypto provider every listener uses.
pub fn provider() -> Arc<CryptoProvider> {
    Arc::new(rustls::crypto::ring::default_provider())
}

/// Load a certificate chain and its private key from PEM files.
pub async fn load_certified_key(
    provider: &CryptoProvider,
    cert_path: &Path,
    key_path: &Path,
) -> Result<CertifiedKey, TlsError> {
    let cert_pem = read(cert_path).await?;
    let key_pem = read(key_path).await?;

    let certs = rustls_pemfile::certs(&mut cert_pem.as_slice())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| TlsError::Read {
            path: cert_path.to_path_buf(),
            source,
        })?;
    if certs.is_empty() {
        return Err(TlsError::NoCertificates(cert_path.to_path_buf()));
    }

    let key = rustls_pemfile::private_key(&mut key_pem.as_slice())
        .map_err(|source| TlsError::Read {
            path: key_path.to_path_buf(),
            source,
        })?
        .ok_or_else(|| TlsError::NoPrivateKey(key_path.to_path_buf()))?;

    let signing_key = provider
        .key_provider
        .load_private_key(key)
        .map_err(|source| TlsError::UnsupportedKey {
            path: key_path.to_path_buf(),
            source,
        })?;

    Ok(CertifiedKey::new(certs, signing_key))
}

/// Build the listener's rustls configuration from already loaded keys.
///
/// `keys` must be non-empty and is kept in registration order, which decides
/// the fallback certificate.
pub fn load_tls_config(
    provider: Arc<CryptoProvider>,
    keys: Vec<CertifiedKey>,
) -> Result<RustlsConfig, TlsError> {
    let resolver = CertificateResolver::new(keys);

    let mut config = ServerConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()?
        .with_no_client_auth()
        .with_cert_resolver(Arc::new(resolver));
    config.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];

    Ok(RustlsConfig::from_config(Arc::new(config)))
}

async fn read(path: &Path) -> Result<Vec<u8>, TlsError> {
    tokio::fs::read(path).await.map_err(|source| TlsError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Picks a certificate by SNI so several domains can share one port.
///
/// The first registered certificate valid for the requested server name wins;
/// clients without SNI, or with a name no certificate covers, get the first one.
#[derive(Debug)]
pub struct CertificateResolver {
    keys: Vec<Arc<CertifiedKey>>,
}

impl CertificateResolver {
    pub fn new(keys: Vec<CertifiedKey>) -> Self {
        Self {
            keys: keys.into_iter().map(Arc::new).collect(),
        }
    }

    /// Certificate served for `server_name`.
    pub fn select(&self, server_name: Option<&str>) -> Option<Arc<CertifiedKey>> {
        server_name
            .and_then(|name| self.keys.iter().find(|key| covers(key, name)))
            .or_else(|| self.keys.first())
            .cloned()
    }
}

impl ResolvesServerCert for CertificateResolver {
    fn resolve(&self, client_hello: ClientHello<'_>) -> Option<Arc<CertifiedKey>> {
        self.select(client_hello.server_name())
    }
}

// rustls' SNI resolver refuses a key whose end-entity certificate does not cover the name.
fn covers(key: &CertifiedKey, name: &str) -> bool {
    ResolvesServerCertUsingSni::new()
        .add(name, key.clone())
        .is_ok()
}
