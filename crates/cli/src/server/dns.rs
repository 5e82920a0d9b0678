use dnsrelay_infrastructure::dns::{
    request_queue, DnsServerHandler, InboundRequest, RequestConsumer, RequestProducer,
};
use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

const RECV_BUFFER_SIZE: usize = 4096;

pub async fn start_dns_server(
    bind_addr: String,
    handler: DnsServerHandler,
    num_workers: usize,
    queue_capacity: usize,
) -> anyhow::Result<()> {
    let socket_addr: SocketAddr = bind_addr.parse()?;
    let socket = Arc::new(create_udp_socket(socket_addr)?);

    info!(bind_address = %socket_addr, num_workers, queue_capacity, "Starting DNS server");

    let handler = Arc::new(handler);
    let (producer, consumer) = request_queue(queue_capacity);
    let mut join_set: JoinSet<()> = JoinSet::new();

    for worker_id in 0..num_workers {
        let socket = Arc::clone(&socket);
        let handler = Arc::clone(&handler);
        let consumer = consumer.clone();
        join_set.spawn(async move {
            run_worker(socket, handler, consumer, worker_id).await;
        });
    }
    drop(consumer);

    let listener_socket = Arc::clone(&socket);
    join_set.spawn(async move {
        run_listener(listener_socket, producer).await;
    });

    info!("DNS server ready, {} workers on {}", num_workers, socket_addr);

    while join_set.join_next().await.is_some() {}
    Ok(())
}

async fn run_listener(socket: Arc<UdpSocket>, producer: RequestProducer) {
    let mut recv_buf = [0u8; RECV_BUFFER_SIZE];

    loop {
        match socket.recv_from(&mut recv_buf).await {
            Ok((n, client)) => {
                producer.push(InboundRequest {
                    bytes: recv_buf[..n].to_vec(),
                    client,
                });
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            // ICMP port-unreachable from an earlier reply surfaces here on some platforms.
            Err(e) if e.kind() == io::ErrorKind::ConnectionReset => {
                debug!(error = %e, "UDP recv reset");
            }
            Err(e) => {
                error!(error = %e, "UDP recv error");
                break;
            }
        }
    }
}

async fn run_worker(
    socket: Arc<UdpSocket>,
    handler: Arc<DnsServerHandler>,
    consumer: RequestConsumer,
    worker_id: usize,
) {
    debug!(worker = worker_id, "DNS worker started");

    while let Some(request) = consumer.pop().await {
        let Some(response) = handler
            .handle(&request.bytes, request.client, worker_id)
            .await
        else {
            continue;
        };

        if let Err(e) = socket.send_to(&response, request.client).await {
            warn!(worker = worker_id, client = %request.client, error = %e, "Failed to send reply");
        }
    }

    debug!(worker = worker_id, "DNS worker stopped");
}

fn create_udp_socket(socket_addr: SocketAddr) -> anyhow::Result<UdpSocket> {
    let domain = if socket_addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };
    let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;
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
