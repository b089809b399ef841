use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{watch, Mutex};
use zeromq::{ReqSocket, Socket, SocketRecv, SocketSend, ZmqMessage};

use crate::error::{ClipwiseError, Result};

use super::{preview, Transport};

const PREVIEW_CHARS: usize = 120;

/// ZeroMQ REQ client for the text-generation backend.
///
/// One instance per process. The socket sits behind an async mutex that is
/// held for the whole send/receive pair, so at most one request is ever
/// outstanding. A socket that failed mid-exchange is discarded and the next
/// exchange reconnects.
pub struct ZmqTransport {
    address: String,
    retry_interval: Duration,
    socket: Mutex<Option<ReqSocket>>,
    closed: watch::Sender<bool>,
}

impl ZmqTransport {
    pub fn new(address: impl Into<String>, retry_interval: Duration) -> Self {
        let (closed, _) = watch::channel(false);
        Self {
            address: address.into(),
            retry_interval,
            socket: Mutex::new(None),
            closed,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    /// Connect to the backend, retrying until it is reachable or `close()` is called.
    pub async fn connect(&self) -> Result<()> {
        let mut guard = self.socket.lock().await;
        if guard.is_some() {
            return Ok(());
        }
        let socket = self.connect_with_retry().await?;
        *guard = Some(socket);
        Ok(())
    }

    /// Close the connection and wake anything blocked in connect or receive.
    pub async fn close(&self) {
        self.closed.send_replace(true);
        // An exchange in flight still owns the lock; it observes the flag
        // and drops its socket on the way out.
        let socket = match self.socket.try_lock() {
            Ok(mut guard) => guard.take(),
            Err(_) => None,
        };
        if let Some(socket) = socket {
            let errors = socket.close().await;
            for e in errors {
                tracing::debug!("error while closing socket: {}", e);
            }
        }
        tracing::info!("transport to {} closed", self.address);
    }

    async fn connect_with_retry(&self) -> Result<ReqSocket> {
        let mut closed = self.closed.subscribe();
        let mut attempt: u64 = 0;

        loop {
            if *closed.borrow() {
                return Err(self.cancelled());
            }
            attempt += 1;

            let mut socket = ReqSocket::new();
            let outcome = tokio::select! {
                r = socket.connect(&self.address) => r,
                _ = closed.wait_for(|c| *c) => return Err(self.cancelled()),
            };

            match outcome {
                Ok(()) => {
                    tracing::info!("connected to backend at {}", self.address);
                    return Ok(socket);
                }
                Err(e) if attempt == 1 => {
                    tracing::warn!(
                        "backend at {} unreachable ({}), retrying every {}ms",
                        self.address,
                        e,
                        self.retry_interval.as_millis()
                    );
                }
                Err(e) => {
                    tracing::debug!("connect attempt {} to {} failed: {}", attempt, self.address, e);
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(self.retry_interval) => {}
                _ = closed.wait_for(|c| *c) => return Err(self.cancelled()),
            }
        }
    }

    fn cancelled(&self) -> ClipwiseError {
        ClipwiseError::ConnectCancelled {
            address: self.address.clone(),
        }
    }
}

#[async_trait]
impl Transport for ZmqTransport {
    async fn exchange(&self, payload: Vec<u8>) -> Result<Vec<u8>> {
        let mut guard = self.socket.lock().await;
        if self.is_closed() {
            return Err(ClipwiseError::TransportClosed);
        }

        let mut socket = match guard.take() {
            Some(socket) => socket,
            None => self.connect_with_retry().await?,
        };

        tracing::debug!("sending {}", preview(&payload, PREVIEW_CHARS));
        if let Err(e) = socket.send(ZmqMessage::from(payload)).await {
            return Err(ClipwiseError::SendFailed {
                reason: e.to_string(),
            });
        }

        let mut closed = self.closed.subscribe();
        let received = tokio::select! {
            r = socket.recv() => r,
            _ = closed.wait_for(|c| *c) => return Err(ClipwiseError::TransportClosed),
        };

        match received {
            Ok(message) => {
                let mut reply = Vec::new();
                for frame in message.into_vec() {
                    reply.extend_from_slice(&frame);
                }
                tracing::debug!("received {}", preview(&reply, PREVIEW_CHARS));
                *guard = Some(socket);
                Ok(reply)
            }
            Err(e) => Err(ClipwiseError::RecvFailed {
                reason: e.to_string(),
            }),
        }
    }
}
