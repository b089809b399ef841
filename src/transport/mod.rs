pub mod zmq_client;

pub use zmq_client::ZmqTransport;

use async_trait::async_trait;

use crate::error::Result;

/// Default backend endpoint.
pub const DEFAULT_ADDRESS: &str = "tcp://localhost:5555";

/// A strict request/reply channel to the backend.
///
/// Implementations must never let two exchanges overlap on the same
/// connection: one payload goes out, one reply comes back, then the next.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one payload and wait for exactly one reply.
    async fn exchange(&self, payload: Vec<u8>) -> Result<Vec<u8>>;
}

/// Shorten a payload for log lines.
pub fn preview(bytes: &[u8], max: usize) -> String {
    let text = String::from_utf8_lossy(bytes);
    if text.chars().count() <= max {
        text.into_owned()
    } else {
        let truncated: String = text.chars().take(max).collect();
        format!("{}...", truncated)
    }
}
