pub mod clipboard;
pub mod combination;
pub mod hotkey;

pub use clipboard::{ClipboardAccess, MemoryClipboard, SystemClipboard};
pub use combination::HotkeyCombination;

use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::thread::JoinHandle;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use crate::dispatch::DispatchJob;
use crate::error::{ClipwiseError, Result};

/// Clipboard text snapshot taken when the hotkey fired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureEvent {
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// One press of the registered hotkey.
#[derive(Debug, Clone, Copy)]
pub struct Activation {
    pub at: DateTime<Utc>,
}

impl Activation {
    pub fn now() -> Self {
        Self { at: Utc::now() }
    }
}

/// Turns hotkey activations into capture events for the dispatcher.
///
/// Runs on its own listener thread. Events go into the dispatcher's bounded
/// queue; when it is full this thread waits, which never stalls the OS
/// hotkey callback and never drops an activation.
pub struct CaptureTrigger {
    clipboard: Arc<dyn ClipboardAccess>,
    jobs: mpsc::Sender<DispatchJob>,
}

impl CaptureTrigger {
    pub fn new(clipboard: Arc<dyn ClipboardAccess>, jobs: mpsc::Sender<DispatchJob>) -> Self {
        Self { clipboard, jobs }
    }

    /// Snapshot the clipboard. `None` when there is no usable text.
    pub fn capture(&self, activation: Activation) -> Result<Option<CaptureEvent>> {
        let text = match self.clipboard.read_text()? {
            Some(text) if !text.trim().is_empty() => text,
            _ => return Ok(None),
        };
        Ok(Some(CaptureEvent {
            text,
            timestamp: activation.at,
        }))
    }

    /// Handle one activation. Returns whether an event was queued.
    ///
    /// Blocks while the dispatch queue is full; must not be called from
    /// inside the async runtime.
    pub fn on_activation(&self, activation: Activation) -> Result<bool> {
        let Some(event) = self.capture(activation)? else {
            return Ok(false);
        };
        tracing::debug!("captured {} chars from clipboard", event.text.chars().count());
        self.jobs
            .blocking_send(DispatchJob::Capture(event))
            .map_err(|_| ClipwiseError::DispatcherStopped)?;
        Ok(true)
    }

    /// Consume activations on a dedicated thread until the source or the
    /// dispatcher goes away.
    pub fn spawn(self, activations: Receiver<Activation>) -> std::io::Result<JoinHandle<()>> {
        std::thread::Builder::new()
            .name("clipwise-capture".into())
            .spawn(move || {
                for activation in activations.iter() {
                    match self.on_activation(activation) {
                        Ok(true) => {}
                        Ok(false) => {
                            tracing::debug!("clipboard holds no text, activation ignored")
                        }
                        Err(ClipwiseError::DispatcherStopped) => {
                            tracing::info!("dispatcher stopped, capture listener exiting");
                            break;
                        }
                        Err(e) => tracing::warn!("capture failed: {}", e),
                    }
                }
            })
    }
}
