use cascade_dns_domain::{DomainError, UpstreamEndpoint};
use std::net::SocketAddr;
use std::time::Duration;
use tracing::info;

/// Resolves a hostname to all its IP addresses (IPv4 + IPv6).
pub async fn resolve_all(
    hostname: &str,
    port: u16,
    timeout: Duration,
) -> Result<Vec<SocketAddr>, DomainError> {
    let target = format!("{}:{}", hostname, port);

    let addrs_iter = tokio::time::timeout(timeout, tokio::net::lookup_host(&target))
        .await
        .map_err(|_| DomainError::TransportTimeout {
            server: target.clone(),
        })?
        .map_err(|e| {
            DomainError::InvalidDomainName(format!("DNS resolution failed for {}: {}", target, e))
        })?;

    let addrs: Vec<SocketAddr> = addrs_iter.collect();

    if addrs.is_empty() {
        return Err(DomainError::InvalidDomainName(format!(
            "No addresses found for {}",
            target
        )));
    }

    Ok(addrs)
}

/// Returns `endpoint` bound to a concrete address, resolving a hostname
/// through the system resolver when needed. The first address wins.
pub async fn resolve_endpoint(
    endpoint: &UpstreamEndpoint,
    timeout: Duration,
) -> Result<UpstreamEndpoint, DomainError> {
    let Some((hostname, port)) = endpoint.addr().unresolved_parts() else {
        return Ok(endpoint.clone());
    };

    let addrs = resolve_all(hostname, port, timeout).await?;
    let chosen = addrs[0];
    info!(
        hostname = %hostname,
        resolved = %chosen,
        candidates = addrs.len(),
        "Resolved upstream hostname"
    );
    Ok(endpoint.with_resolved_addr(chosen))
}
