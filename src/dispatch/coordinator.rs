use std::sync::Arc;
use std::time::Instant;

use tokio::sync::watch;

use crate::capture::ClipboardAccess;
use crate::config::CaptureConfig;
use crate::error::{ClipwiseError, Result};
use crate::request::{self, Reply, TemplateRequest, CONTENT_PARAM};
use crate::transport::Transport;
use crate::ui::{UiHandle, HOME_ELEMENT, OUTPUT_ELEMENT};

use super::{DispatchJob, DispatchState, DispatchStatus, Submission};

const NOTIFY_TITLE: &str = "clipwise";

/// Runs capture and submission jobs through build, exchange and output.
///
/// Every job ends in `Idle` with the clipboard and the output element set,
/// whether the exchange succeeded or not. Transport failures become error
/// replies and are not retried here.
pub struct DispatchCoordinator {
    transport: Arc<dyn Transport>,
    clipboard: Arc<dyn ClipboardAccess>,
    ui: UiHandle,
    capture: CaptureConfig,
    last_capture: Option<String>,
    status: watch::Sender<DispatchStatus>,
}

impl DispatchCoordinator {
    pub fn new(
        transport: Arc<dyn Transport>,
        clipboard: Arc<dyn ClipboardAccess>,
        ui: UiHandle,
        capture: CaptureConfig,
    ) -> Self {
        let (status, _) = watch::channel(DispatchStatus::default());
        Self {
            transport,
            clipboard,
            ui,
            capture,
            last_capture: None,
            status,
        }
    }

    pub fn status(&self) -> watch::Receiver<DispatchStatus> {
        self.status.subscribe()
    }

    /// The text of the most recent capture, used by submissions without content.
    pub fn last_capture(&self) -> Option<&str> {
        self.last_capture.as_deref()
    }

    /// Run one full cycle and return the reply that was routed to the outputs.
    pub async fn dispatch(&mut self, job: DispatchJob) -> Reply {
        let started = Instant::now();
        self.set_state(DispatchState::Building);

        let built = self.request_for(job).and_then(|r| {
            tracing::debug!("dispatching template '{}'", r.template());
            request::build(&r)
        });

        let reply = match built {
            Ok(payload) => {
                self.set_state(DispatchState::AwaitingReply);
                match self.transport.exchange(payload).await {
                    Ok(bytes) => Reply::parse(&bytes),
                    Err(e) => {
                        tracing::warn!("exchange failed: {}", e);
                        Reply::Error(exchange_error_message(&e))
                    }
                }
            }
            Err(e) => {
                tracing::warn!("could not build request: {}", e);
                Reply::Error(e.to_string())
            }
        };

        self.set_state(DispatchState::UpdatingOutputs);
        self.update_outputs(&reply);

        self.status.send_modify(|s| {
            s.state = DispatchState::Idle;
            s.completed += 1;
        });
        tracing::info!(
            "dispatch finished in {}ms ({})",
            started.elapsed().as_millis(),
            if reply.is_error() { "error" } else { "ok" }
        );
        reply
    }

    fn request_for(&mut self, job: DispatchJob) -> Result<TemplateRequest> {
        match job {
            DispatchJob::Capture(event) => {
                self.ui.set_text(HOME_ELEMENT, &event.text);
                self.ui.show();
                let mut params = self.capture.params.clone();
                params.insert(CONTENT_PARAM.into(), event.text.clone());
                self.last_capture = Some(event.text);
                TemplateRequest::from_parts(&self.capture.template, &params)
            }
            DispatchJob::Submit(Submission {
                template,
                mut params,
            }) => {
                if !params.contains_key(CONTENT_PARAM) {
                    let content =
                        self.last_capture
                            .clone()
                            .ok_or_else(|| ClipwiseError::InvalidRequest {
                                reason: "no captured text to submit".into(),
                            })?;
                    params.insert(CONTENT_PARAM.into(), content);
                }
                TemplateRequest::from_parts(&template, &params)
            }
        }
    }

    fn update_outputs(&self, reply: &Reply) {
        let text = reply.output_text();
        if let Err(e) = self.clipboard.write_text(&text) {
            tracing::warn!("failed to write reply to clipboard: {}", e);
        }
        self.ui.set_text(OUTPUT_ELEMENT, &text);
        self.ui.show();
        match reply.error() {
            None => self.ui.notify(NOTIFY_TITLE, "Reply copied to clipboard"),
            Some(e) => self
                .ui
                .notify(NOTIFY_TITLE, &format!("Request failed: {}", e)),
        }
    }

    fn set_state(&self, state: DispatchState) {
        self.status.send_modify(|s| s.state = state);
    }
}

/// User-facing error text for a failed exchange.
fn exchange_error_message(error: &ClipwiseError) -> String {
    match error {
        ClipwiseError::SendFailed { .. } => "client send error".into(),
        ClipwiseError::RecvFailed { .. } => "client receive error".into(),
        ClipwiseError::TransportClosed => "client connection closed".into(),
        ClipwiseError::Connect { .. } | ClipwiseError::ConnectCancelled { .. } => {
            "client connect error".into()
        }
        other => other.to_string(),
    }
}
