use std::sync::Arc;
use std::time::Duration;

use crate::capture::{ClipboardAccess, MemoryClipboard, SystemClipboard};
use crate::config::AppConfig;
use crate::dispatch::{DispatchCoordinator, DispatchJob, Submission};
use crate::error::{ClipwiseError, Result};
use crate::request::CONTENT_PARAM;
use crate::transport::ZmqTransport;
use crate::ui::{ConsoleSink, UiLoop};

/// Options for a one-shot manual submission.
pub struct SendOptions {
    pub submission: Submission,
    /// Use an in-process clipboard instead of the system one.
    pub no_clipboard: bool,
    /// Give up after this long. No limit when `None`.
    pub timeout: Option<Duration>,
}

/// Submit one request through the dispatch path and print the reply.
///
/// Without explicit content, the current clipboard text is used. Returns
/// whether the reply was a success.
pub async fn run_send(config: &AppConfig, options: SendOptions) -> Result<bool> {
    let clipboard: Arc<dyn ClipboardAccess> = if options.no_clipboard {
        Arc::new(MemoryClipboard::new())
    } else {
        Arc::new(SystemClipboard::new()?)
    };

    let mut submission = options.submission;
    if !submission.params.contains_key(CONTENT_PARAM) {
        let content = clipboard
            .read_text()?
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ClipwiseError::InvalidRequest {
                reason: "no --content given and the clipboard holds no text".into(),
            })?;
        submission.params.insert(CONTENT_PARAM.into(), content);
    }

    let transport = Arc::new(ZmqTransport::new(
        config.backend.address.clone(),
        config.backend.retry_interval(),
    ));
    let (ui, mut ui_loop) = UiLoop::channel();
    let mut coordinator =
        DispatchCoordinator::new(transport.clone(), clipboard, ui, config.capture.clone());

    let dispatch = coordinator.dispatch(DispatchJob::Submit(submission));
    let reply = match options.timeout {
        Some(limit) => match tokio::time::timeout(limit, dispatch).await {
            Ok(reply) => Some(reply),
            Err(_) => None,
        },
        None => Some(dispatch.await),
    };
    transport.close().await;

    let Some(reply) = reply else {
        eprintln!(
            "clipwise: no reply from {} within {}s",
            config.backend.address,
            options.timeout.map(|t| t.as_secs()).unwrap_or_default()
        );
        return Ok(false);
    };

    ui_loop.pump(&mut ConsoleSink::new());
    Ok(!reply.is_error())
}
