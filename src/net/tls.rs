//! TLS configuration and certificate loading.
//!
//! Key material is validated eagerly so a bad certificate/key pair fails
//! at startup rather than at the first handshake. Handshakes themselves
//! run inside `axum-server`; a failed handshake drops that connection
//! only and never reaches the HTTP layer (there is no client to answer
//! at that point).

use std::path::{Path, PathBuf};

use axum_server::tls_rustls::RustlsConfig;
use thiserror::Error;

/// Key material could not be loaded or does not form a usable pair.
/// Fatal at startup.
#[derive(Debug, Error)]
pub enum CertificateError {
    #[error("failed to read certificate file {path}: {source}")]
    ReadCert {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read private key file {path}: {source}")]
    ReadKey {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("no certificates found in {0}")]
    NoCertificates(PathBuf),

    #[error("no usable private key found in {0}")]
    NoPrivateKey(PathBuf),

    #[error("certificate/key pair rejected: {0}")]
    Rejected(std::io::Error),
}

/// Load TLS configuration from certificate and key files (PEM).
pub async fn load_tls_config(
    cert_path: &Path,
    key_path: &Path,
) -> Result<RustlsConfig, CertificateError> {
    let cert_pem = tokio::fs::read(cert_path)
        .await
        .map_err(|source| CertificateError::ReadCert {
            path: cert_path.to_path_buf(),
            source,
        })?;
    let key_pem = tokio::fs::read(key_path)
        .await
        .map_err(|source| CertificateError::ReadKey {
            path: key_path.to_path_buf(),
            source,
        })?;

    // Eager validation: parse both PEM blobs before handing them to the
    // server so the diagnostics name the offending file.
    let certs: Vec<_> = rustls_pemfile::certs(&mut cert_pem.as_slice())
        .collect::<Result<_, _>>()
        .map_err(|_| CertificateError::NoCertificates(cert_path.to_path_buf()))?;
    if certs.is_empty() {
        return Err(CertificateError::NoCertificates(cert_path.to_path_buf()));
    }

    let key = rustls_pemfile::private_key(&mut key_pem.as_slice())
        .map_err(|_| CertificateError::NoPrivateKey(key_path.to_path_buf()))?;
    if key.is_none() {
        return Err(CertificateError::NoPrivateKey(key_path.to_path_buf()));
    }

    RustlsConfig::from_pem(cert_pem, key_pem)
        .await
        .map_err(CertificateError::Rejected)
}
