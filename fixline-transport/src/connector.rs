/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Connection establishment.
//!
//! A [`Connector`] turns a `host:port` address into a byte stream. The
//! engine only sees [`BoxedStream`], so plain TCP and TLS are
//! interchangeable and tests can point the engine at a local listener.

use async_trait::async_trait;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{CryptoProvider, verify_tls12_signature, verify_tls13_signature};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{DigitallySignedStruct, RootCertStore, SignatureScheme};
use std::fmt;
use std::io;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tracing::debug;

/// Byte stream carrying a FIX session.
pub trait FixStream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> FixStream for T {}

/// Type-erased connection stream.
pub type BoxedStream = Box<dyn FixStream>;

/// Opens connections to the venue.
#[async_trait]
pub trait Connector: Send + Sync + fmt::Debug {
    /// Connects to `address` (`host:port`).
    ///
    /// # Errors
    /// Returns the underlying I/O or handshake error.
    async fn connect(&self, address: &str) -> io::Result<BoxedStream>;
}

/// Plain TCP connector.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

impl TcpConnector {
    /// Creates a new TCP connector.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

async fn open_tcp(address: &str) -> io::Result<TcpStream> {
    let stream = TcpStream::connect(address).await?;
    stream.set_nodelay(true)?;
    debug!(address, "tcp connection established");
    Ok(stream)
}

#[async_trait]
impl Connector for TcpConnector {
    async fn connect(&self, address: &str) -> io::Result<BoxedStream> {
        Ok(Box::new(open_tcp(address).await?))
    }
}

/// TLS connector over TCP using rustls.
#[derive(Clone)]
pub struct TlsConnector {
    inner: tokio_rustls::TlsConnector,
    server_name: ServerName<'static>,
    verify_certificates: bool,
}

impl fmt::Debug for TlsConnector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TlsConnector")
            .field("server_name", &self.server_name)
            .field("verify_certificates", &self.verify_certificates)
            .finish()
    }
}

impl TlsConnector {
    /// Creates a TLS connector for `host`.
    ///
    /// With `verify_certificates` off the server certificate is accepted
    /// without validation; handshake signatures are still checked.
    ///
    /// # Errors
    /// Returns `InvalidInput` if `host` is not a valid server name.
    pub fn new(host: &str, verify_certificates: bool) -> io::Result<Self> {
        let server_name = ServerName::try_from(host.to_owned())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let builder = rustls::ClientConfig::builder_with_provider(Arc::clone(&provider))
            .with_safe_default_protocol_versions()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

        let config = if verify_certificates {
            let roots = RootCertStore {
                roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
            };
            builder.with_root_certificates(roots).with_no_client_auth()
        } else {
            builder
                .dangerous()
                .with_custom_certificate_verifier(Arc::new(AcceptAnyCertificate { provider }))
                .with_no_client_auth()
        };

        Ok(Self {
            inner: tokio_rustls::TlsConnector::from(Arc::new(config)),
            server_name,
            verify_certificates,
        })
    }

    /// Returns whether server certificates are validated.
    #[must_use]
    pub const fn verifies_certificates(&self) -> bool {
        self.verify_certificates
    }
}

#[async_trait]
impl Connector for TlsConnector {
    async fn connect(&self, address: &str) -> io::Result<BoxedStream> {
        let tcp = open_tcp(address).await?;
        let tls = self.inner.connect(self.server_name.clone(), tcp).await?;
        debug!(address, "tls handshake complete");
        Ok(Box::new(tls))
    }
}

/// Certificate verifier that trusts every server certificate.
#[derive(Debug)]
struct AcceptAnyCertificate {
    provider: Arc<CryptoProvider>,
}

impl ServerCertVerifier for AcceptAnyCertificate {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
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
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_tcp_connector_round_trip() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 5];
            socket.read_exact(&mut buf).await.unwrap();
            socket.write_all(&buf).await.unwrap();
        });

        let mut stream = TcpConnector::new().connect(&addr).await.unwrap();
        stream.write_all(b"hello").await.unwrap();
        let mut echoed = [0u8; 5];
        stream.read_exact(&mut echoed).await.unwrap();
        assert_eq!(&echoed, b"hello");
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_tcp_connector_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        assert!(TcpConnector::new().connect(&addr).await.is_err());
    }

    #[test]
    fn test_tls_connector_new() {
        let connector = TlsConnector::new("fix.example.com", false).unwrap();
        assert!(!connector.verifies_certificates());

        let connector = TlsConnector::new("fix.example.com", true).unwrap();
        assert!(connector.verifies_certificates());
    }

    #[test]
    fn test_tls_connector_invalid_host() {
        let err = TlsConnector::new("not a host!", false).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
