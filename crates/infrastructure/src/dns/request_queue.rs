use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, Mutex};
use tracing::warn;

/// A datagram waiting for a worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundRequest {
    pub bytes: Vec<u8>,
    pub client: SocketAddr,
}

/// Bounded queue between the listener and the workers. Workers share one
/// receiver and suspend while the queue is empty.
pub fn request_queue(capacity: usize) -> (RequestProducer, RequestConsumer) {
    let (sender, receiver) = mpsc::channel(capacity.max(1));
    (
        RequestProducer { sender },
        RequestConsumer {
            receiver: Arc::new(Mutex::new(receiver)),
        },
    )
}

#[derive(Clone)]
pub struct RequestProducer {
    sender: mpsc::Sender<InboundRequest>,
}

impl RequestProducer {
    /// Enqueues without waiting. A full or closed queue drops the request.
    pub fn push(&self, request: InboundRequest) -> bool {
        match self.sender.try_send(request) {
            Ok(()) => true,
            Err(TrySendError::Full(dropped)) => {
                warn!(client = %dropped.client, "Request queue full, dropping query");
                false
            }
            Err(TrySendError::Closed(dropped)) => {
                warn!(client = %dropped.client, "Request queue closed, dropping query");
                false
            }
        }
    }
}

#[derive(Clone)]
pub struct RequestConsumer {
    receiver: Arc<Mutex<mpsc::Receiver<InboundRequest>>>,
}

impl RequestConsumer {
    /// Next request, or `None` once every producer is gone and the queue is
    /// drained.
    pub async fn pop(&self) -> Option<InboundRequest> {
        self.receiver.lock().await.recv().await
    }
}
