//! IMAP connect helpers.
//!
//! Dials the server over plain TCP or implicit TLS and waits for the
//! greeting, yielding an unauthenticated [`async_imap::Client`].

/// An IMAP transport stream, plaintext or TLS.
pub trait Io: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin + Send + std::fmt::Debug {}

impl<T> Io for T where T: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin + Send + std::fmt::Debug {}

/// The effective data stream type we use.
pub type Stream = Box<dyn Io>;

/// The effective client type we use.
pub type Client = async_imap::Client<Stream>;

/// Errors returned while connecting to an IMAP server.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    /// TCP connection error.
    #[error("TCP connection error: {0}")]
    TcpConnect(#[source] std::io::Error),

    /// Failed to load system root certificates.
    #[error("failed to load system root certificates: {0}")]
    RootCerts(#[source] rustls_native_certs::Error),

    /// Invalid DNS name for TLS verification.
    #[error("invalid DNS name: {0}")]
    InvalidDnsName(String),

    /// TLS handshake error.
    #[error("TLS handshake error: {0}")]
    TlsHandshake(#[source] std::io::Error),

    /// IMAP protocol error.
    #[error("IMAP error: {0}")]
    Imap(#[source] async_imap::error::Error),

    /// The server did not send the expected greeting.
    #[error("IMAP server sent no greeting")]
    MissingGreeting,
}

/// Build a rustls connector configured with system root certificates.
pub fn connector() -> Result<tokio_rustls::TlsConnector, ConnectError> {
    let mut root_store = rustls::RootCertStore::empty();
    let rustls_native_certs::CertificateResult { certs, errors, .. } =
        rustls_native_certs::load_native_certs();
    if let Some(err) = errors.into_iter().next() {
        return Err(ConnectError::RootCerts(err));
    }
    let _ = root_store.add_parsable_certificates(certs);
    let config = rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();
    Ok(tokio_rustls::TlsConnector::from(std::sync::Arc::new(
        config,
    )))
}

/// Connect to an IMAP server and read its greeting.
pub async fn connect(host: &str, port: u16, use_tls: bool) -> Result<Client, ConnectError> {
    tracing::debug!(
        imap_host = %host,
        imap_port = port,
        imap_use_tls = use_tls,
        "connecting to an IMAP server"
    );

    let tcp_stream = tokio::net::TcpStream::connect((host, port))
        .await
        .map_err(ConnectError::TcpConnect)?;

    let stream: Stream = if use_tls {
        let server_name = rustls::pki_types::ServerName::try_from(host.to_owned())
            .map_err(|_| ConnectError::InvalidDnsName(host.to_owned()))?;
        let tls_stream = connector()?
            .connect(server_name, tcp_stream)
            .await
            .map_err(ConnectError::TlsHandshake)?;
        Box::new(tls_stream)
    } else {
        Box::new(tcp_stream)
    };

    let mut client = async_imap::Client::new(stream);
    client
        .read_response()
        .await
        .ok_or(ConnectError::MissingGreeting)?
        .map_err(|err| ConnectError::Imap(err.into()))?;

    Ok(client)
}
