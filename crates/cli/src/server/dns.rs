use cascade_dns_infrastructure::dns::transport::tcp::{
    read_with_length_prefix, send_with_length_prefix,
};
use cascade_dns_infrastructure::dns::{DnsRequestHandler, Protocol};
use socket2::{Domain, Protocol as SocketProtocol, Socket, Type};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, UdpSocket};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

const UDP_RECV_BUFFER: usize = 4096;
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

pub async fn start_dns_server(
    socket_addr: SocketAddr,
    handler: Arc<DnsRequestHandler>,
    tcp_idle_timeout: Duration,
) -> anyhow::Result<()> {
    let domain = if socket_addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let udp_socket = Arc::new(create_udp_socket(domain, socket_addr)?);
    let tcp_listener = create_tcp_listener(domain, socket_addr)?;

    info!(bind_address = %socket_addr, "DNS server listening on UDP and TCP");

    let mut join_set: JoinSet<()> = JoinSet::new();

    let handler_udp = handler.clone();
    join_set.spawn(async move {
        run_udp_worker(udp_socket, handler_udp).await;
    });

    join_set.spawn(async move {
        run_tcp_acceptor(tcp_listener, handler, tcp_idle_timeout).await;
    });

    while join_set.join_next().await.is_some() {}
    Ok(())
}

async fn run_udp_worker(socket: Arc<UdpSocket>, handler: Arc<DnsRequestHandler>) {
    let mut recv_buf = [0u8; UDP_RECV_BUFFER];

    loop {
        let (n, from) = match socket.recv_from(&mut recv_buf).await {
            Ok(received) => received,
            Err(e) if is_transient(&e) => continue,
            Err(e) => {
                error!(error = %e, "UDP recv error");
                continue;
            }
        };

        let query: Arc<[u8]> = Arc::from(&recv_buf[..n]);
        let handler = handler.clone();
        let socket = socket.clone();
        tokio::spawn(async move {
            if let Some(response) = handler.handle_raw(&query, from, Protocol::Udp).await {
                if let Err(e) = socket.send_to(&response, from).await {
                    warn!(client = %from, error = %e, "Failed to send UDP response");
                }
            }
        });
    }
}

async fn run_tcp_acceptor(
    listener: TcpListener,
    handler: Arc<DnsRequestHandler>,
    idle_timeout: Duration,
) {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                if let Err(e) = stream.set_nodelay(true) {
                    debug!(client = %peer, error = %e, "Failed to set TCP_NODELAY");
                }
                let handler = handler.clone();
                tokio::spawn(async move {
                    serve_tcp_connection(stream, peer, handler, idle_timeout).await;
                });
            }
            Err(e) => {
                error!(error = %e, "TCP accept error");
                tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
            }
        }
    }
}

/// Serves length-prefixed requests until the client disconnects, is idle
/// longer than `idle_timeout`, or leaves a reply unread for that long.
async fn serve_tcp_connection<S>(
    mut stream: S,
    peer: SocketAddr,
    handler: Arc<DnsRequestHandler>,
    idle_timeout: Duration,
) where
    S: AsyncRead + AsyncWrite + Unpin,
{
    loop {
        let request = match tokio::time::timeout(idle_timeout, read_with_length_prefix(&mut stream))
            .await
        {
            Ok(Ok(request)) => request,
            Ok(Err(e)) => {
                if e.kind() != io::ErrorKind::UnexpectedEof {
                    debug!(client = %peer, error = %e, "TCP read failed");
                }
                break;
            }
            Err(_) => {
                debug!(client = %peer, "Closing idle TCP connection");
                break;
            }
        };

        let Some(response) = handler.handle_raw(&request, peer, Protocol::Tcp).await else {
            continue;
        };

        match tokio::time::timeout(idle_timeout, send_with_length_prefix(&mut stream, &response))
            .await
        {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                debug!(client = %peer, error = %e, "TCP write failed");
                break;
            }
            Err(_) => {
                debug!(client = %peer, "TCP client stopped reading, closing connection");
                break;
            }
        }
    }
}

fn is_transient(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock | io::ErrorKind::ConnectionReset
    )
}

fn create_udp_socket(domain: Domain, socket_addr: SocketAddr) -> anyhow::Result<UdpSocket> {
    let socket = Socket::new(domain, Type::DGRAM, Some(SocketProtocol::UDP))?;
    if socket_addr.is_ipv6() {
        socket.set_only_v6(false)?;
    }
    socket.set_reuse_address(true)?;
    socket.set_recv_buffer_size(512 * 1024)?;
    socket.set_send_buffer_size(512 * 1024)?;
    socket.bind(&socket_addr.into())?;
    socket.set_nonblocking(true)?;
    let std_socket: std::net::UdpSocket = socket.into();
    Ok(UdpSocket::from_std(std_socket)?)
}

fn create_tcp_listener(domain: Domain, socket_addr: SocketAddr) -> anyhow::Result<TcpListener> {
    let socket = Socket::new(domain, Type::STREAM, Some(SocketProtocol::TCP))?;
    if socket_addr.is_ipv6() {
        socket.set_only_v6(false)?;
    }
    socket.set_reuse_address(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;
    socket.set_nonblocking(true)?;
    let std_listener: std::net::TcpListener = socket.into();
    Ok(TcpListener::from_std(std_listener)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cascade_dns_application::use_cases::{ResolutionPolicy, ResolveQueryUseCase};
    use cascade_dns_domain::{RecordType, StaticRecordStore, UpstreamAddr, UpstreamEndpoint};
    use cascade_dns_infrastructure::dns::UpstreamForwarder;
    use hickory_proto::op::{Message, Query};
    use hickory_proto::rr::{Name, RecordType as WireRecordType};
    use std::str::FromStr;
    use tokio::net::TcpStream;

    fn handler_with(store: StaticRecordStore) -> Arc<DnsRequestHandler> {
        // Never contacted: every test query is answered from static records.
        let upstream = UpstreamEndpoint::Udp {
            addr: UpstreamAddr::Resolved("127.0.0.1:9".parse().unwrap()),
        };
        let forwarder = Arc::new(UpstreamForwarder::new(upstream).unwrap());
        let use_case =
            ResolveQueryUseCase::new(Arc::new(store), forwarder, ResolutionPolicy::default());
        Arc::new(DnsRequestHandler::new(Arc::new(use_case)))
    }

    fn query_bytes(id: u16, name: &str, record_type: WireRecordType) -> Vec<u8> {
        let mut message = Message::new();
        message.set_id(id);
        message.set_recursion_desired(true);
        message.add_query(Query::query(Name::from_str(name).unwrap(), record_type));
        message.to_vec().unwrap()
    }

    #[tokio::test]
    async fn test_tcp_listener_answers_framed_query() {
        let handler = handler_with(
            StaticRecordStore::builder()
                .record("example.com", RecordType::A, "93.184.216.34")
                .build(),
        );
        let listener =
            create_tcp_listener(Domain::IPV4, "127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let acceptor = tokio::spawn(run_tcp_acceptor(listener, handler, Duration::from_secs(5)));

        let mut client = TcpStream::connect(addr).await.unwrap();
        let request = query_bytes(0x5150, "example.com.", WireRecordType::A);
        send_with_length_prefix(&mut client, &request).await.unwrap();
        let reply_bytes = tokio::time::timeout(
            Duration::from_secs(2),
            read_with_length_prefix(&mut client),
        )
        .await
        .expect("reply must arrive")
        .unwrap();

        let reply = Message::from_vec(&reply_bytes).unwrap();
        assert_eq!(reply.id(), 0x5150);
        assert_eq!(reply.answers().len(), 1);
        assert_eq!(reply.answers()[0].data().to_string(), "93.184.216.34");

        acceptor.abort();
    }

    #[tokio::test]
    async fn test_client_that_stops_reading_is_disconnected() {
        let segment = format!("\"{}\"", "x".repeat(200));
        let mut builder = StaticRecordStore::builder();
        for _ in 0..20 {
            builder = builder.record("big.example.com", RecordType::TXT, &segment);
        }
        let handler = handler_with(builder.build());

        // The reply is far larger than the pipe, so the write stalls once
        // the buffer fills and the client never drains it.
        let (mut client, server) = tokio::io::duplex(256);
        let connection = tokio::spawn(serve_tcp_connection(
            server,
            "127.0.0.1:40000".parse().unwrap(),
            handler,
            Duration::from_millis(200),
        ));

        let request = query_bytes(7, "big.example.com.", WireRecordType::TXT);
        send_with_length_prefix(&mut client, &request).await.unwrap();

        tokio::time::timeout(Duration::from_secs(3), connection)
            .await
            .expect("connection must close when its reply is never read")
            .unwrap();
        drop(client);
    }
}
