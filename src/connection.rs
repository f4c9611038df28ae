//! Tokio driver for a [`Network`].
//!
//! [`Connection::run`] opens the socket (TCP, optionally TLS), feeds
//! received lines to the network, ticks its timers and writes the send
//! queue at the configured spacing. Events go to the caller's closure in
//! order, together with `&mut Network` so it can answer right away.
//!
//! ```no_run
//! use slirc_client::{Connection, Event, Network, NetworkConfig, ServerAddress};
//!
//! # async fn demo() -> Result<(), slirc_client::ConnectionError> {
//! let network = Network::new(NetworkConfig::default());
//! let address: ServerAddress = "ircs://irc.libera.chat".parse().unwrap();
//! let mut connection = Connection::new(network, address);
//! connection
//!     .run(|network, event| {
//!         if let Event::Welcome { .. } = event {
//!             let _ = network.join("#rust", None);
//!         }
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::time::MissedTickBehavior;
use tokio_rustls::rustls::client::danger::{
    HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier,
};
use tokio_rustls::rustls::client::WebPkiServerVerifier;
use tokio_rustls::rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use tokio_rustls::rustls::{
    self, ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme,
};
use tokio_rustls::TlsConnector;
use tokio_util::codec::Framed;
use tracing::{debug, info, warn};

use crate::codec::LineCodec;
use crate::error::ConnectionError;
use crate::network::{ConnectionState, DisconnectReason, Event, Network};
use crate::outbound::SendQueue;
use crate::server_address::ServerAddress;

/// How often timers are checked and the queue is polled.
const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Decides whether to continue despite a certificate error. Receives the
/// host name and the error text.
pub type CertificatePrompt = dyn Fn(&str, &str) -> bool + Send + Sync;

/// A [`Network`] bound to a server address.
pub struct Connection {
    network: Network,
    address: ServerAddress,
    prompt: Option<Arc<CertificatePrompt>>,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("address", &self.address)
            .field("state", &self.network.state())
            .finish_non_exhaustive()
    }
}

impl Connection {
    pub fn new(network: Network, address: ServerAddress) -> Self {
        Self {
            network,
            address,
            prompt: None,
        }
    }

    /// Ask `prompt` before failing on an invalid certificate. Without one,
    /// every certificate error is fatal.
    pub fn on_certificate_error<F>(mut self, prompt: F) -> Self
    where
        F: Fn(&str, &str) -> bool + Send + Sync + 'static,
    {
        self.prompt = Some(Arc::new(prompt));
        self
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn network_mut(&mut self) -> &mut Network {
        &mut self.network
    }

    pub fn address(&self) -> &ServerAddress {
        &self.address
    }

    pub fn into_network(self) -> Network {
        self.network
    }

    /// Connect and process until the connection ends without a pending
    /// [`Network::reconnect`] request.
    ///
    /// Channel and user state stay in the network afterwards. A transport
    /// failure is reported to the handler as [`Event::Disconnected`] before
    /// the error is returned.
    pub async fn run<F>(&mut self, mut handler: F) -> Result<(), ConnectionError>
    where
        F: FnMut(&mut Network, Event),
    {
        loop {
            let result = self.session(&mut handler).await;
            if let Err(error) = &result {
                self.network
                    .transport_closed(DisconnectReason::Transport(error.to_string()));
                self.deliver(&mut handler);
            }
            if !self.network.take_reconnect_request() {
                return result;
            }
            info!(address = %self.address, "reconnecting");
        }
    }

    async fn session<F>(&mut self, handler: &mut F) -> Result<(), ConnectionError>
    where
        F: FnMut(&mut Network, Event),
    {
        self.network.begin_connect();
        let stream = self.open_tcp().await?;

        if self.address.tls {
            self.network.tls_started();
            let stream = self.tls_handshake(stream).await?;
            self.drive(Framed::new(stream, LineCodec::new()), handler).await
        } else {
            self.drive(Framed::new(stream, LineCodec::new()), handler).await
        }
    }

    async fn open_tcp(&self) -> Result<TcpStream, ConnectionError> {
        let target = self.address.socket_addr_string();
        let mut addrs = tokio::net::lookup_host(target.as_str())
            .await
            .map_err(|e| ConnectionError::Dns(format!("{}: {}", target, e)))?
            .peekable();
        if addrs.peek().is_none() {
            return Err(ConnectionError::Dns(target.clone()));
        }

        let mut last_error = None;
        for addr in addrs {
            debug!(%addr, "connecting");
            match TcpStream::connect(addr).await {
                Ok(stream) => {
                    if let Err(e) = enable_keepalive(&stream) {
                        warn!("failed to enable TCP keepalive: {}", e);
                    }
                    return Ok(stream);
                }
                Err(e) => last_error = Some(e),
            }
        }
        Err(last_error.map_or(ConnectionError::Closed, ConnectionError::Io))
    }

    async fn tls_handshake(
        &self,
        stream: TcpStream,
    ) -> Result<tokio_rustls::client::TlsStream<TcpStream>, ConnectionError> {
        let host = self.address.host.clone();
        let verifier = PromptingVerifier::new(&host, self.prompt.clone())?;
        let config = ClientConfig::builder()
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(verifier))
            .with_no_client_auth();

        let server_name = ServerName::try_from(host.clone())
            .map_err(|e| ConnectionError::InvalidAddress(format!("{}: {}", host, e)))?;
        let stream = TlsConnector::from(Arc::new(config))
            .connect(server_name, stream)
            .await
            .map_err(|e| ConnectionError::Tls(e.to_string()))?;
        info!(%host, "TLS handshake completed");
        Ok(stream)
    }

    async fn drive<S, F>(
        &mut self,
        mut framed: Framed<S, LineCodec>,
        handler: &mut F,
    ) -> Result<(), ConnectionError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
        F: FnMut(&mut Network, Event),
    {
        self.network.transport_connected(Instant::now());
        let queue = self.network.send_queue();
        let mut ticker = tokio::time::interval(TICK_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            self.deliver(handler);
            self.flush(&mut framed, &queue).await?;

            if self.network.state() == ConnectionState::Disconnected {
                // QUIT, if any, went out with the flush above.
                framed.close().await?;
                return Ok(());
            }

            tokio::select! {
                frame = framed.next() => match frame {
                    Some(Ok(bytes)) => self.network.feed_bytes(&bytes, Instant::now()),
                    Some(Err(error)) => return Err(error),
                    None => {
                        self.network.transport_closed(DisconnectReason::RemoteClosed);
                        self.deliver(handler);
                        return Ok(());
                    }
                },
                _ = ticker.tick() => self.network.tick(Instant::now()),
            }
        }
    }

    fn deliver<F>(&mut self, handler: &mut F)
    where
        F: FnMut(&mut Network, Event),
    {
        while self.network.has_pending_events() {
            for event in self.network.drain_events() {
                handler(&mut self.network, event);
            }
        }
    }

    /// Write real-time lines, then whatever the throttle allows.
    async fn flush<S>(
        &self,
        framed: &mut Framed<S, LineCodec>,
        queue: &SendQueue,
    ) -> Result<(), ConnectionError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let encoding = self.network.encoding();
        let spacing = Duration::from_millis(self.network.config().send_delay_ms);
        let mut wrote = false;

        for line in queue.drain_realtime() {
            framed.feed(encoding.encode(&line)).await?;
            wrote = true;
        }
        let now = Instant::now();
        while let Some(line) = queue.pop_due(now, spacing) {
            framed.feed(encoding.encode(&line)).await?;
            wrote = true;
        }
        if wrote {
            framed.flush().await?;
        }
        Ok(())
    }
}

fn enable_keepalive(stream: &TcpStream) -> std::io::Result<()> {
    use socket2::{SockRef, TcpKeepalive};

    let sock = SockRef::from(stream);
    let keepalive = TcpKeepalive::new()
        .with_time(Duration::from_secs(120))
        .with_interval(Duration::from_secs(30));
    sock.set_tcp_keepalive(&keepalive)
}

fn native_roots() -> RootCertStore {
    let mut roots = RootCertStore::empty();
    let certs = rustls_native_certs::load_native_certs();
    for cert in certs.certs {
        if let Err(e) = roots.add(cert) {
            warn!("failed to add root cert: {}", e);
        }
    }
    for e in &certs.errors {
        warn!("error loading native certs: {}", e);
    }
    roots
}

/// Web PKI verification against the native roots, with a second chance
/// from the caller on failure.
struct PromptingVerifier {
    inner: Arc<WebPkiServerVerifier>,
    host: String,
    prompt: Option<Arc<CertificatePrompt>>,
}

impl std::fmt::Debug for PromptingVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptingVerifier")
            .field("host", &self.host)
            .field("prompt", &self.prompt.is_some())
            .finish()
    }
}

impl PromptingVerifier {
    fn new(host: &str, prompt: Option<Arc<CertificatePrompt>>) -> Result<Self, ConnectionError> {
        let inner = WebPkiServerVerifier::builder(Arc::new(native_roots()))
            .build()
            .map_err(|e| ConnectionError::Tls(e.to_string()))?;
        Ok(Self {
            inner,
            host: host.to_string(),
            prompt,
        })
    }
}

impl ServerCertVerifier for PromptingVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        server_name: &ServerName<'_>,
        ocsp_response: &[u8],
        now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        match self
            .inner
            .verify_server_cert(end_entity, intermediates, server_name, ocsp_response, now)
        {
            Ok(verified) => Ok(verified),
            Err(error @ rustls::Error::InvalidCertificate(_)) => match &self.prompt {
                Some(prompt) if prompt(&self.host, &error.to_string()) => {
                    warn!(host = %self.host, %error, "certificate accepted by caller");
                    Ok(ServerCertVerified::assertion())
                }
                _ => Err(error),
            },
            Err(error) => Err(error),
        }
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        self.inner.verify_tls12_signature(message, cert, dss)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        self.inner.verify_tls13_signature(message, cert, dss)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.inner.supported_verify_schemes()
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::net::TcpListener;

    use super::*;
    use crate::config::NetworkConfig;

    #[tokio::test]
    async fn test_registers_and_answers_ping() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let (read, mut write) = socket.into_split();
            let mut lines = BufReader::new(read).lines();
            let mut received = Vec::new();
            while let Some(line) = lines.next_line().await.unwrap() {
                if line.starts_with("NICK") {
                    write
                        .write_all(b":irc.test 001 ferris :Welcome\r\nPING :token\r\n")
                        .await
                        .unwrap();
                }
                let done = line.starts_with("PONG");
                received.push(line);
                if done {
                    write.write_all(b"ERROR :Closing link\r\n").await.unwrap();
                    break;
                }
            }
            received
        });

        let config = NetworkConfig {
            nick: "ferris".into(),
            enable_ircv3: false,
            send_delay_ms: 0,
            ..NetworkConfig::default()
        };
        let mut connection =
            Connection::new(Network::new(config), ServerAddress::new("127.0.0.1", port, false));
        let mut names = Vec::new();
        connection
            .run(|_, event| names.push(event.name()))
            .await
            .unwrap();

        let received = server.await.unwrap();
        assert!(received.iter().any(|l| l == "NICK ferris"));
        assert!(received.iter().any(|l| l == "PONG :token"));
        assert!(names.contains(&"welcome"));
        assert_eq!(names.last(), Some(&"disconnected"));
        assert_eq!(connection.network().state(), ConnectionState::Disconnected);
    }
}
