//! UDP Transport for DNS queries (RFC 1035 §4.2.1)
//!
//! Messages are sent as-is (no framing). A reply with the TC bit set is
//! handed back unchanged; there is no TCP retry.

use super::{io_error, timeout_error, DnsTransport, TransportResponse};
use async_trait::async_trait;
use cascade_dns_domain::{DomainError, UpstreamTimeouts};
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use tokio::net::UdpSocket;
use tracing::debug;

/// Maximum UDP DNS response size with EDNS(0)
const MAX_UDP_RESPONSE_SIZE: usize = 4096;

pub struct UdpTransport {
    server_addr: SocketAddr,
}

impl UdpTransport {
    pub fn new(server_addr: SocketAddr) -> Self {
        Self { server_addr }
    }

    fn bind_addr(&self) -> SocketAddr {
        if self.server_addr.is_ipv4() {
            SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))
        } else {
            SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0))
        }
    }

    /// Binds an ephemeral socket connected to the server, so only datagrams
    /// from the server are received.
    async fn dial(&self, timeouts: &UpstreamTimeouts) -> Result<UdpSocket, DomainError> {
        let server = self.server_addr.to_string();

        tokio::time::timeout(timeouts.dial, async {
            let socket = UdpSocket::bind(self.bind_addr())
                .await
                .map_err(|e| io_error(&server, "bind UDP socket for", e))?;
            socket
                .connect(self.server_addr)
                .await
                .map_err(|e| io_error(&server, "connect UDP socket to", e))?;
            Ok::<_, DomainError>(socket)
        })
        .await
        .map_err(|_| timeout_error(&server))?
    }
}

#[async_trait]
impl DnsTransport for UdpTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeouts: &UpstreamTimeouts,
    ) -> Result<TransportResponse, DomainError> {
        let server = self.server_addr.to_string();
        let socket = self.dial(timeouts).await?;

        let bytes_sent = tokio::time::timeout(timeouts.write, socket.send(message_bytes))
            .await
            .map_err(|_| timeout_error(&server))?
            .map_err(|e| io_error(&server, "send UDP query to", e))?;

        debug!(server = %server, bytes_sent = bytes_sent, "UDP query sent");

        let mut recv_buf = vec![0u8; MAX_UDP_RESPONSE_SIZE];
        let bytes_received = tokio::time::timeout(timeouts.read, socket.recv(&mut recv_buf))
            .await
            .map_err(|_| timeout_error(&server))?
            .map_err(|e| io_error(&server, "receive UDP response from", e))?;

        recv_buf.truncate(bytes_received);

        debug!(
            server = %server,
            bytes_received = bytes_received,
            "UDP response received"
        );

        Ok(TransportResponse {
            bytes: recv_buf,
            protocol_used: "UDP",
        })
    }
}
