use std::sync::Mutex;

use crate::error::{ClipwiseError, Result};

/// Text access to a clipboard.
pub trait ClipboardAccess: Send + Sync {
    /// Current text content, or `None` when the clipboard holds no text.
    fn read_text(&self) -> Result<Option<String>>;

    fn write_text(&self, text: &str) -> Result<()>;
}

/// The OS clipboard, via arboard.
pub struct SystemClipboard {
    inner: Mutex<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Result<Self> {
        let clipboard = arboard::Clipboard::new().map_err(|e| ClipwiseError::Clipboard {
            reason: format!("failed to initialize clipboard: {}", e),
        })?;
        Ok(Self {
            inner: Mutex::new(clipboard),
        })
    }
}

impl ClipboardAccess for SystemClipboard {
    fn read_text(&self) -> Result<Option<String>> {
        let mut clipboard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        match clipboard.get_text() {
            Ok(text) => Ok(Some(text)),
            // Images and other non-text payloads land here.
            Err(arboard::Error::ContentNotAvailable) => Ok(None),
            Err(e) => Err(ClipwiseError::Clipboard {
                reason: format!("read failed: {}", e),
            }),
        }
    }

    fn write_text(&self, text: &str) -> Result<()> {
        let mut clipboard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        clipboard
            .set_text(text.to_string())
            .map_err(|e| ClipwiseError::Clipboard {
                reason: format!("write failed: {}", e),
            })
    }
}

/// In-process clipboard.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    text: Mutex<Option<String>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: Mutex::new(Some(text.into())),
        }
    }

    /// Drop the text payload, as if the clipboard now held an image.
    pub fn clear(&self) {
        *self.text.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }

    pub fn contents(&self) -> Option<String> {
        self.text.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl ClipboardAccess for MemoryClipboard {
    fn read_text(&self) -> Result<Option<String>> {
        Ok(self.contents())
    }

    fn write_text(&self, text: &str) -> Result<()> {
        *self.text.lock().unwrap_or_else(|e| e.into_inner()) = Some(text.to_string());
        Ok(())
    }
}
