pub mod resolver;
pub mod tcp;
pub mod udp;

use async_trait::async_trait;
use cascade_dns_domain::{DomainError, UpstreamEndpoint, UpstreamTimeouts};
use std::io;

#[derive(Debug)]
pub struct TransportResponse {
    pub bytes: Vec<u8>,

    pub protocol_used: &'static str,
}

#[async_trait]
pub trait DnsTransport: Send + Sync {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeouts: &UpstreamTimeouts,
    ) -> Result<TransportResponse, DomainError>;
}

pub enum Transport {
    Udp(udp::UdpTransport),
    Tcp(tcp::TcpTransport),
}

impl Transport {
    pub async fn send(
        &self,
        message_bytes: &[u8],
        timeouts: &UpstreamTimeouts,
    ) -> Result<TransportResponse, DomainError> {
        match self {
            Self::Udp(t) => DnsTransport::send(t, message_bytes, timeouts).await,
            Self::Tcp(t) => DnsTransport::send(t, message_bytes, timeouts).await,
        }
    }

    pub fn protocol_name(&self) -> &'static str {
        match self {
            Self::Udp(_) => "UDP",
            Self::Tcp(_) => "TCP",
        }
    }
}

/// Builds the transport for an endpoint whose address is already resolved.
pub fn create_transport(endpoint: &UpstreamEndpoint) -> Result<Transport, DomainError> {
    let addr = endpoint.socket_addr().ok_or_else(|| {
        DomainError::ConfigError(format!(
            "Upstream {} must be resolved before creating a transport",
            endpoint
        ))
    })?;

    match endpoint {
        UpstreamEndpoint::Udp { .. } => Ok(Transport::Udp(udp::UdpTransport::new(addr))),
        UpstreamEndpoint::Tcp { .. } => Ok(Transport::Tcp(tcp::TcpTransport::new(addr))),
    }
}

/// Maps a socket error to the transport error taxonomy.
pub(crate) fn io_error(server: &str, action: &str, e: io::Error) -> DomainError {
    match e.kind() {
        io::ErrorKind::ConnectionRefused => DomainError::TransportConnectionRefused {
            server: server.to_string(),
        },
        io::ErrorKind::ConnectionReset | io::ErrorKind::ConnectionAborted => {
            DomainError::TransportConnectionReset {
                server: server.to_string(),
            }
        }
        io::ErrorKind::TimedOut => DomainError::TransportTimeout {
            server: server.to_string(),
        },
        _ => DomainError::TransportError(format!("{} {}: {}", action, server, e)),
    }
}

pub(crate) fn timeout_error(server: &str) -> DomainError {
    DomainError::TransportTimeout {
        server: server.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_transport_picks_protocol() {
        let udp: UpstreamEndpoint = "udp://192.0.2.53:53".parse().unwrap();
        let tcp: UpstreamEndpoint = "tcp://192.0.2.53:53".parse().unwrap();
        assert_eq!(create_transport(&udp).unwrap().protocol_name(), "UDP");
        assert_eq!(create_transport(&tcp).unwrap().protocol_name(), "TCP");
    }

    #[test]
    fn test_create_transport_rejects_unresolved_host() {
        let endpoint: UpstreamEndpoint = "dns.example.net:53".parse().unwrap();
        assert!(create_transport(&endpoint).is_err());
    }

    #[test]
    fn test_io_error_mapping() {
        let refused = io_error("s", "connect", io::Error::from(io::ErrorKind::ConnectionRefused));
        assert!(matches!(refused, DomainError::TransportConnectionRefused { .. }));

        let reset = io_error("s", "read", io::Error::from(io::ErrorKind::ConnectionReset));
        assert!(matches!(reset, DomainError::TransportConnectionReset { .. }));

        let other = io_error("s", "send", io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(other, DomainError::TransportError(_)));
        assert!(other.is_transport_error());
    }
}
