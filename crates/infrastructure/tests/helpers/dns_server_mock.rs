#![allow(dead_code)]
use cascade_dns_infrastructure::dns::transport::tcp::{
    read_with_length_prefix, send_with_length_prefix,
};
use hickory_proto::op::{Message, MessageType, Query, ResponseCode};
use hickory_proto::rr::rdata::A;
use hickory_proto::rr::{Name, RData, Record, RecordType};
use std::net::{Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::{TcpListener, UdpSocket};
use tokio::sync::oneshot;

/// How the mock upstream answers each query.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// NOERROR with one A record for the question name.
    Address(Ipv4Addr),
    /// A bare reply carrying the given rcode.
    Code(ResponseCode),
    /// A valid reply whose id differs from the request.
    WrongId,
    /// Bytes that do not decode as DNS.
    Garbage,
    /// Never reply.
    Silent,
}

pub struct MockDnsServer {
    udp_addr: SocketAddr,
    tcp_addr: SocketAddr,
    queries: Arc<AtomicUsize>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockDnsServer {
    /// Binds ephemeral UDP and TCP listeners on loopback.
    pub async fn start(reply: MockReply) -> Result<Self, std::io::Error> {
        let udp = UdpSocket::bind("127.0.0.1:0").await?;
        let tcp = TcpListener::bind("127.0.0.1:0").await?;
        let udp_addr = udp.local_addr()?;
        let tcp_addr = tcp.local_addr()?;
        let queries = Arc::new(AtomicUsize::new(0));

        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();
        let counter = Arc::clone(&queries);

        tokio::spawn(async move {
            let mut buf = vec![0u8; 4096];

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        break;
                    }
                    result = udp.recv_from(&mut buf) => {
                        if let Ok((len, peer)) = result {
                            counter.fetch_add(1, Ordering::SeqCst);
                            if let Some(response) = Self::build_response(&buf[..len], &reply) {
                                let _ = udp.send_to(&response, peer).await;
                            }
                        }
                    }
                    accepted = tcp.accept() => {
                        if let Ok((mut stream, _)) = accepted {
                            let reply = reply.clone();
                            let counter = Arc::clone(&counter);
                            tokio::spawn(async move {
                                while let Ok(request) = read_with_length_prefix(&mut stream).await {
                                    counter.fetch_add(1, Ordering::SeqCst);
                                    match Self::build_response(&request, &reply) {
                                        Some(response) => {
                                            if send_with_length_prefix(&mut stream, &response).await.is_err() {
                                                break;
                                            }
                                        }
                                        None => std::future::pending::<()>().await,
                                    }
                                }
                            });
                        }
                    }
                }
            }
        });

        Ok(Self {
            udp_addr,
            tcp_addr,
            queries,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn udp_addr(&self) -> SocketAddr {
        self.udp_addr
    }

    pub fn tcp_addr(&self) -> SocketAddr {
        self.tcp_addr
    }

    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    fn build_response(query: &[u8], reply: &MockReply) -> Option<Vec<u8>> {
        let request = Message::from_vec(query).ok()?;

        let mut response = Message::new();
        response.set_id(request.id());
        response.set_message_type(MessageType::Response);
        response.set_recursion_desired(request.recursion_desired());
        response.set_recursion_available(true);
        response.add_queries(request.queries().to_vec());

        match reply {
            MockReply::Address(ip) => {
                let name = request
                    .queries()
                    .first()
                    .map(|q| q.name().clone())
                    .unwrap_or_else(Name::root);
                response.add_answer(Record::from_rdata(name, 60, RData::A(A(*ip))));
            }
            MockReply::Code(rcode) => {
                response.set_response_code(*rcode);
            }
            MockReply::WrongId => {
                response.set_id(request.id().wrapping_add(1));
            }
            MockReply::Garbage => return Some(vec![0xde, 0xad]),
            MockReply::Silent => return None,
        }

        response.to_vec().ok()
    }

    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockDnsServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

pub fn query_message(id: u16, name: &str, record_type: RecordType) -> Message {
    let mut message = Message::new();
    message.set_id(id);
    message.set_recursion_desired(true);
    message.add_query(Query::query(Name::from_str(name).unwrap(), record_type));
    message
}
