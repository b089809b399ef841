use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{json, Value};
use tokio::sync::Notify;
use zeromq::{RepSocket, Socket, SocketRecv, SocketSend, ZmqMessage};

use crate::error::{ClipwiseError, Result};
use crate::transport::preview;

use super::{EchoResponder, PromptError, PromptLibrary, Responder};

/// REP socket server answering one request at a time.
pub struct BackendServer {
    socket: RepSocket,
    endpoint: String,
    prompts: PromptLibrary,
    responder: Box<dyn Responder>,
    shutdown_signal: Arc<Notify>,
}

impl BackendServer {
    /// Bind the reply socket. `tcp://127.0.0.1:0` picks a free port; see [`Self::endpoint`].
    pub async fn bind(address: &str, prompts: PromptLibrary) -> Result<Self> {
        let mut socket = RepSocket::new();
        let endpoint = socket
            .bind(address)
            .await
            .map_err(|e| ClipwiseError::Backend {
                reason: format!("failed to bind {}: {}", address, e),
            })?;
        Ok(Self {
            socket,
            endpoint: endpoint.to_string(),
            prompts,
            responder: Box::new(EchoResponder),
            shutdown_signal: Arc::new(Notify::new()),
        })
    }

    pub fn with_responder(mut self, responder: Box<dyn Responder>) -> Self {
        self.responder = responder;
        self
    }

    /// The bound endpoint, with the actual port.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Notify this to stop `serve` after the current request.
    pub fn shutdown_handle(&self) -> Arc<Notify> {
        self.shutdown_signal.clone()
    }

    /// Serve until shut down.
    pub async fn serve(mut self) -> Result<()> {
        tracing::info!("backend listening on {}", self.endpoint);
        let shutdown = self.shutdown_signal.clone();

        loop {
            let message = tokio::select! {
                received = self.socket.recv() => received.map_err(|e| ClipwiseError::Backend {
                    reason: format!("receive failed: {}", e),
                })?,
                _ = shutdown.notified() => {
                    tracing::info!("backend shutting down");
                    break;
                }
            };

            let mut request = Vec::new();
            for frame in message.into_vec() {
                request.extend_from_slice(&frame);
            }
            tracing::debug!("received request: {}", preview(&request, 120));

            let response = self.handle(&request).to_string();
            self.socket
                .send(ZmqMessage::from(response))
                .await
                .map_err(|e| ClipwiseError::Backend {
                    reason: format!("send failed: {}", e),
                })?;
        }

        for e in self.socket.close().await {
            tracing::debug!("error while closing backend socket: {}", e);
        }
        Ok(())
    }

    /// Turn one raw request into its reply object.
    pub fn handle(&self, message: &[u8]) -> Value {
        let payload: Value = match serde_json::from_slice(message) {
            Ok(v) => v,
            Err(_) => return json!({ "error": "invalid json" }),
        };

        let (Some(template), Some(params)) = (
            payload.get("template").and_then(Value::as_str),
            payload.get("params").and_then(Value::as_object),
        ) else {
            return json!({ "error": "invalid payload" });
        };

        let params: BTreeMap<String, String> = params
            .iter()
            .map(|(k, v)| {
                let value = match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (k.clone(), value)
            })
            .collect();

        let prompt = match self.prompts.render(template, &params) {
            Ok(prompt) => prompt,
            Err(PromptError::NotFound) => return json!({ "error": "template does not exist" }),
            Err(PromptError::MissingParam(name)) => {
                tracing::debug!("template '{}' missing param '{}'", template, name);
                return json!({ "error": "template param missing" });
            }
        };

        match self.responder.complete(&prompt) {
            Ok(completion) => json!({ "completion": completion }),
            Err(e) => {
                tracing::error!("responder failed for template '{}': {}", template, e);
                json!({ "error": "internal error" })
            }
        }
    }
}
