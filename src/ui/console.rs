use std::io::Write;

use super::{UiSink, OUTPUT_ELEMENT};

/// Terminal stand-in for a window: replies go to stdout, the rest to the log.
#[derive(Debug, Default)]
pub struct ConsoleSink {
    visible: bool,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UiSink for ConsoleSink {
    fn set_text(&mut self, element: &str, value: &str) {
        if element == OUTPUT_ELEMENT {
            let mut stdout = std::io::stdout().lock();
            if let Err(e) = writeln!(stdout, "{}", value).and_then(|_| stdout.flush()) {
                tracing::warn!("failed to write output: {}", e);
            }
        } else {
            tracing::info!("[{}] {}", element, crate::transport::preview(value.as_bytes(), 120));
        }
    }

    fn show(&mut self) {
        if !self.visible {
            tracing::debug!("window shown");
            self.visible = true;
        }
    }

    fn notify(&mut self, title: &str, body: &str) {
        tracing::info!("{}: {}", title, body);
    }
}
