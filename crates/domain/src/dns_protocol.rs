use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

/// Represents an upstream server address that may or may not be resolved to an IP.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UpstreamAddr {
    Resolved(SocketAddr),
    Unresolved { hostname: Arc<str>, port: u16 },
}

impl UpstreamAddr {
    pub fn socket_addr(&self) -> Option<SocketAddr> {
        match self {
            UpstreamAddr::Resolved(addr) => Some(*addr),
            UpstreamAddr::Unresolved { .. } => None,
        }
    }

    pub fn port(&self) -> u16 {
        match self {
            UpstreamAddr::Resolved(addr) => addr.port(),
            UpstreamAddr::Unresolved { port, .. } => *port,
        }
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self, UpstreamAddr::Unresolved { .. })
    }

    /// Returns (hostname, port) if this address is unresolved.
    pub fn unresolved_parts(&self) -> Option<(&str, u16)> {
        match self {
            UpstreamAddr::Unresolved { hostname, port } => Some((hostname, *port)),
            UpstreamAddr::Resolved(_) => None,
        }
    }
}

impl fmt::Display for UpstreamAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpstreamAddr::Resolved(addr) => write!(f, "{}", addr),
            UpstreamAddr::Unresolved { hostname, port } => write!(f, "{}:{}", hostname, port),
        }
    }
}

/// Where and how queries are forwarded on a local miss.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UpstreamEndpoint {
    Udp { addr: UpstreamAddr },
    Tcp { addr: UpstreamAddr },
}

impl UpstreamEndpoint {
    pub fn addr(&self) -> &UpstreamAddr {
        match self {
            UpstreamEndpoint::Udp { addr } | UpstreamEndpoint::Tcp { addr } => addr,
        }
    }

    pub fn socket_addr(&self) -> Option<SocketAddr> {
        self.addr().socket_addr()
    }

    pub fn protocol_name(&self) -> &'static str {
        match self {
            UpstreamEndpoint::Udp { .. } => "UDP",
            UpstreamEndpoint::Tcp { .. } => "TCP",
        }
    }

    pub fn needs_resolution(&self) -> bool {
        self.addr().is_unresolved()
    }

    /// Creates a copy of this endpoint bound to a concrete `SocketAddr`.
    pub fn with_resolved_addr(&self, resolved: SocketAddr) -> Self {
        let addr = UpstreamAddr::Resolved(resolved);
        match self {
            UpstreamEndpoint::Udp { .. } => UpstreamEndpoint::Udp { addr },
            UpstreamEndpoint::Tcp { .. } => UpstreamEndpoint::Tcp { addr },
        }
    }
}

fn parse_host_port(s: &str) -> Option<(&str, u16)> {
    if s.starts_with('[') {
        let end = s.find(']')?;
        let host = &s[1..end];
        let rest = &s[end + 1..];
        let port_str = rest.strip_prefix(':')?;
        let port = port_str.parse::<u16>().ok()?;
        Some((host, port))
    } else {
        let (host, port_str) = s.rsplit_once(':')?;
        if host.is_empty() {
            return None;
        }
        let port = port_str.parse::<u16>().ok()?;
        Some((host, port))
    }
}

fn parse_upstream_addr(addr_str: &str) -> Result<UpstreamAddr, String> {
    if let Ok(addr) = addr_str.parse::<SocketAddr>() {
        return Ok(UpstreamAddr::Resolved(addr));
    }
    if let Some((host, port)) = parse_host_port(addr_str) {
        return Ok(UpstreamAddr::Unresolved {
            hostname: host.into(),
            port,
        });
    }
    Err(format!("Invalid address '{}'", addr_str))
}

impl FromStr for UpstreamEndpoint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(addr_str) = s.strip_prefix("udp://") {
            let addr = parse_upstream_addr(addr_str)
                .map_err(|_| format!("Invalid UDP address '{}'", addr_str))?;
            return Ok(UpstreamEndpoint::Udp { addr });
        }
        if let Some(addr_str) = s.strip_prefix("tcp://") {
            let addr = parse_upstream_addr(addr_str)
                .map_err(|_| format!("Invalid TCP address '{}'", addr_str))?;
            return Ok(UpstreamEndpoint::Tcp { addr });
        }
        if s.contains("://") {
            return Err(format!(
                "Unsupported upstream scheme in '{}'. Expected udp://HOST:PORT, tcp://HOST:PORT or HOST:PORT",
                s
            ));
        }
        parse_upstream_addr(s)
            .map(|addr| UpstreamEndpoint::Udp { addr })
            .map_err(|_| {
                format!(
                    "Invalid upstream endpoint '{}'. Expected udp://HOST:PORT, tcp://HOST:PORT or HOST:PORT",
                    s
                )
            })
    }
}

impl fmt::Display for UpstreamEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpstreamEndpoint::Udp { addr } => write!(f, "udp://{}", addr),
            UpstreamEndpoint::Tcp { addr } => write!(f, "tcp://{}", addr),
        }
    }
}
