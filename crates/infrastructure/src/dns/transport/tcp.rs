use super::{io_error, timeout_error, DnsTransport, TransportResponse};
use async_trait::async_trait;
use cascade_dns_domain::{DomainError, UpstreamTimeouts};
use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

pub const MAX_TCP_MESSAGE_SIZE: usize = 65535;

/// DNS over TCP (RFC 1035 §4.2.2), one connection per exchange.
pub struct TcpTransport {
    server_addr: SocketAddr,
}

impl TcpTransport {
    pub fn new(server_addr: SocketAddr) -> Self {
        Self { server_addr }
    }

    async fn connect(&self, timeouts: &UpstreamTimeouts) -> Result<TcpStream, DomainError> {
        let server = self.server_addr.to_string();

        let stream = tokio::time::timeout(timeouts.dial, TcpStream::connect(self.server_addr))
            .await
            .map_err(|_| timeout_error(&server))?
            .map_err(|e| io_error(&server, "connect to TCP server", e))?;

        stream
            .set_nodelay(true)
            .map_err(|e| io_error(&server, "set TCP_NODELAY on", e))?;

        Ok(stream)
    }
}

#[async_trait]
impl DnsTransport for TcpTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeouts: &UpstreamTimeouts,
    ) -> Result<TransportResponse, DomainError> {
        let server = self.server_addr.to_string();
        let mut stream = self.connect(timeouts).await?;

        tokio::time::timeout(
            timeouts.write,
            send_with_length_prefix(&mut stream, message_bytes),
        )
        .await
        .map_err(|_| timeout_error(&server))?
        .map_err(|e| io_error(&server, "send TCP query to", e))?;

        debug!(
            server = %server,
            message_len = message_bytes.len(),
            "TCP query sent"
        );

        let response_bytes =
            tokio::time::timeout(timeouts.read, read_with_length_prefix(&mut stream))
                .await
                .map_err(|_| timeout_error(&server))?
                .map_err(|e| io_error(&server, "read TCP response from", e))?;

        debug!(
            server = %server,
            response_len = response_bytes.len(),
            "TCP response received"
        );

        Ok(TransportResponse {
            bytes: response_bytes,
            protocol_used: "TCP",
        })
    }
}

/// Writes one message with its two-byte big-endian length prefix.
pub async fn send_with_length_prefix<S>(
    stream: &mut S,
    message_bytes: &[u8],
) -> std::io::Result<()>
where
    S: AsyncWriteExt + Unpin,
{
    let length = u16::try_from(message_bytes.len()).map_err(|_| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("DNS message too large for TCP: {} bytes", message_bytes.len()),
        )
    })?;

    let mut frame = Vec::with_capacity(message_bytes.len() + 2);
    frame.extend_from_slice(&length.to_be_bytes());
    frame.extend_from_slice(message_bytes);

    stream.write_all(&frame).await?;
    stream.flush().await
}

/// Reads one length-prefixed message.
pub async fn read_with_length_prefix<S>(stream: &mut S) -> std::io::Result<Vec<u8>>
where
    S: AsyncReadExt + Unpin,
{
    let mut len_buf = [0u8; 2];
    stream.read_exact(&mut len_buf).await?;

    let message_len = u16::from_be_bytes(len_buf) as usize;
    let mut message = vec![0u8; message_len];
    stream.read_exact(&mut message).await?;

    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_length_prefix_framing() {
        let (mut client, mut server) = tokio::io::duplex(1024);

        send_with_length_prefix(&mut client, b"hello dns").await.unwrap();

        let mut raw = [0u8; 2];
        server.read_exact(&mut raw).await.unwrap();
        assert_eq!(u16::from_be_bytes(raw), 9);

        let mut body = [0u8; 9];
        server.read_exact(&mut body).await.unwrap();
        assert_eq!(&body, b"hello dns");
    }

    #[tokio::test]
    async fn test_read_back_framed_message() {
        let (mut client, mut server) = tokio::io::duplex(1024);
        send_with_length_prefix(&mut client, &[1, 2, 3]).await.unwrap();
        assert_eq!(read_with_length_prefix(&mut server).await.unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_truncated_frame_is_an_error() {
        let (mut client, mut server) = tokio::io::duplex(1024);
        client.write_all(&[0, 10, 1, 2]).await.unwrap();
        drop(client);
        assert!(read_with_length_prefix(&mut server).await.is_err());
    }

    #[tokio::test]
    async fn test_refused_connection_is_classified() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = TcpTransport::new(addr);
        let timeouts = UpstreamTimeouts::uniform(std::time::Duration::from_millis(500));
        let err = transport.send(&[0u8; 12], &timeouts).await.unwrap_err();
        assert!(matches!(err, DomainError::TransportConnectionRefused { .. }));
    }
}
