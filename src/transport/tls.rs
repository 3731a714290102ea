//! TLS setup for both peers.
//!
//! The server presents a certificate chain loaded from PEM. The client does
//! not use a CA store: it pins the certificate(s) found in its trust file and
//! accepts the server only if its leaf certificate is byte-for-byte one of
//! them. Host names are not checked. This fits a single known server whose
//! certificate has been handed to the client out of band, and nothing else.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;
use std::sync::Arc;

use tokio_rustls::rustls::client::danger::{
    HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier,
};
use tokio_rustls::rustls::crypto::{CryptoProvider, ring, verify_tls12_signature, verify_tls13_signature};
use tokio_rustls::rustls::pki_types::{CertificateDer, PrivateKeyDer, ServerName, UnixTime};
use tokio_rustls::rustls::{
    self, CertificateError, ClientConfig as TlsClientConfig, DigitallySignedStruct,
    ServerConfig as TlsServerConfig, SignatureScheme,
};
use tokio_rustls::{TlsAcceptor, TlsConnector};
use tracing::debug;

use super::error::TlsError;

fn provider() -> Arc<CryptoProvider> {
    Arc::new(ring::default_provider())
}

fn open(path: &Path) -> Result<BufReader<File>, TlsError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| TlsError::Read {
            path: path.to_path_buf(),
            source,
        })
}

/// Load every certificate from a PEM file.
pub fn load_certificates(path: &Path) -> Result<Vec<CertificateDer<'static>>, TlsError> {
    let mut reader = open(path)?;
    let certs = rustls_pemfile::certs(&mut reader)
        .collect::<Result<Vec<_>, io::Error>>()
        .map_err(|source| TlsError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    if certs.is_empty() {
        return Err(TlsError::NoCertificates(path.to_path_buf()));
    }
    debug!("Loaded {} certificate(s) from {}", certs.len(), path.display());
    Ok(certs)
}

/// Load the first private key (PKCS#8, PKCS#1 or SEC1) from a PEM file.
pub fn load_private_key(path: &Path) -> Result<PrivateKeyDer<'static>, TlsError> {
    let mut reader = open(path)?;
    rustls_pemfile::private_key(&mut reader)
        .map_err(|source| TlsError::Read {
            path: path.to_path_buf(),
            source,
        })?
        .ok_or_else(|| TlsError::NoPrivateKey(path.to_path_buf()))
}

/// Build the server acceptor from a certificate chain and its private key.
pub fn acceptor(cert_path: &Path, key_path: &Path) -> Result<TlsAcceptor, TlsError> {
    let certs = load_certificates(cert_path)?;
    let key = load_private_key(key_path)?;

    let config = TlsServerConfig::builder_with_provider(provider())
        .with_safe_default_protocol_versions()?
        .with_no_client_auth()
        .with_single_cert(certs, key)?;

    Ok(TlsAcceptor::from(Arc::new(config)))
}

/// Build the client connector that trusts only the certificates in `trust_path`.
pub fn connector(trust_path: &Path) -> Result<TlsConnector, TlsError> {
    let pinned = load_certificates(trust_path)?;
    let provider = provider();
    let verifier = PinnedServerCert::new(pinned, Arc::clone(&provider));

    let config = TlsClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()?
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(verifier))
        .with_no_client_auth();

    Ok(TlsConnector::from(Arc::new(config)))
}

/// Convert a configured host into the name sent in the TLS handshake.
pub fn server_name(host: &str) -> Result<ServerName<'static>, TlsError> {
    ServerName::try_from(host.to_string()).map_err(|_| TlsError::InvalidServerName(host.to_string()))
}

/// Check if a handshake I/O error is a certificate verification failure.
pub fn is_certificate_error(err: &io::Error) -> bool {
    matches!(
        err.get_ref()
            .and_then(|inner| inner.downcast_ref::<rustls::Error>()),
        Some(rustls::Error::InvalidCertificate(_)) | Some(rustls::Error::NoCertificatesPresented)
    )
}

/// Server certificate verifier that accepts exactly the pinned certificates.
///
/// Handshake signatures are still verified against the presented leaf, so
/// the peer must hold the matching private key.
#[derive(Debug)]
pub struct PinnedServerCert {
    pinned: Vec<CertificateDer<'static>>,
    provider: Arc<CryptoProvider>,
}

impl PinnedServerCert {
    /// Create a verifier pinned to `pinned`.
    pub fn new(pinned: Vec<CertificateDer<'static>>, provider: Arc<CryptoProvider>) -> Self {
        Self { pinned, provider }
    }

    /// Check if `cert` is one of the pinned certificates.
    pub fn is_pinned(&self, cert: &CertificateDer<'_>) -> bool {
        self.pinned.iter().any(|p| p.as_ref() == cert.as_ref())
    }
}

impl ServerCertVerifier for PinnedServerCert {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        if self.is_pinned(end_entity) {
            Ok(ServerCertVerified::assertion())
        } else {
            Err(rustls::Error::InvalidCertificate(
                CertificateError::UnknownIssuer,
            ))
        }
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls12_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls13_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_self_signed(dir: &Path) -> (std::path::PathBuf, std::path::PathBuf) {
        let rcgen::CertifiedKey { cert, key_pair } =
            rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
        let cert_path = dir.join("server.crt");
        let key_path = dir.join("server.key");
        std::fs::write(&cert_path, cert.pem()).unwrap();
        std::fs::write(&key_path, key_pair.serialize_pem()).unwrap();
        (cert_path, key_path)
    }

    #[test]
    fn test_load_generated_material() {
        let dir = tempfile::tempdir().unwrap();
        let (cert_path, key_path) = write_self_signed(dir.path());

        assert_eq!(load_certificates(&cert_path).unwrap().len(), 1);
        assert!(load_private_key(&key_path).is_ok());
        assert!(acceptor(&cert_path, &key_path).is_ok());
        assert!(connector(&cert_path).is_ok());
    }

    #[test]
    fn test_missing_file() {
        let err = load_certificates(Path::new("/nonexistent/server.crt")).unwrap_err();
        assert!(matches!(err, TlsError::Read { .. }));
    }

    #[test]
    fn test_file_without_pem_blocks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.pem");
        std::fs::write(&path, "not a certificate\n").unwrap();

        assert!(matches!(
            load_certificates(&path),
            Err(TlsError::NoCertificates(_))
        ));
        assert!(matches!(
            load_private_key(&path),
            Err(TlsError::NoPrivateKey(_))
        ));
    }

    #[test]
    fn test_pinned_verifier() {
        let first = rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
        let second = rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
        let pinned = first.cert.der().clone();
        let other = second.cert.der().clone();

        let verifier = PinnedServerCert::new(vec![pinned.clone()], provider());
        // Pinning does not check the host name.
        let name = server_name("some-other-host").unwrap();

        assert!(
            verifier
                .verify_server_cert(&pinned, &[], &name, &[], UnixTime::now())
                .is_ok()
        );
        let err = verifier
            .verify_server_cert(&other, &[], &name, &[], UnixTime::now())
            .unwrap_err();
        assert!(matches!(err, rustls::Error::InvalidCertificate(_)));
    }

    #[test]
    fn test_server_name_accepts_ip_and_dns() {
        assert!(server_name("localhost").is_ok());
        assert!(server_name("127.0.0.1").is_ok());
        assert!(matches!(
            server_name("not a host"),
            Err(TlsError::InvalidServerName(_))
        ));
    }

    #[test]
    fn test_is_certificate_error() {
        let cert_err = io::Error::new(
            io::ErrorKind::InvalidData,
            rustls::Error::InvalidCertificate(CertificateError::UnknownIssuer),
        );
        assert!(is_certificate_error(&cert_err));

        let refused = io::Error::from(io::ErrorKind::ConnectionRefused);
        assert!(!is_certificate_error(&refused));
    }
}
