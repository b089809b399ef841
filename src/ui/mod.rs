pub mod console;

pub use console::ConsoleSink;

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;

/// Element showing the most recent captured text.
pub const HOME_ELEMENT: &str = "home";
/// Element showing the most recent reply.
pub const OUTPUT_ELEMENT: &str = "output";

/// Presentation layer. Only ever called on the UI-owning thread.
pub trait UiSink {
    fn set_text(&mut self, element: &str, value: &str);
    fn show(&mut self);
    fn notify(&mut self, title: &str, body: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiCommand {
    SetText { element: String, value: String },
    Show,
    Notify { title: String, body: String },
}

type Waker = Arc<dyn Fn() + Send + Sync>;

/// Cloneable handle that background workers use to reach the UI thread.
#[derive(Clone)]
pub struct UiHandle {
    tx: mpsc::UnboundedSender<UiCommand>,
    wake: Option<Waker>,
}

impl fmt::Debug for UiHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UiHandle")
            .field("wakes", &self.wake.is_some())
            .finish()
    }
}

impl UiHandle {
    pub fn set_text(&self, element: &str, value: &str) {
        self.send(UiCommand::SetText {
            element: element.to_string(),
            value: value.to_string(),
        });
    }

    pub fn show(&self) {
        self.send(UiCommand::Show);
    }

    pub fn notify(&self, title: &str, body: &str) {
        self.send(UiCommand::Notify {
            title: title.to_string(),
            body: body.to_string(),
        });
    }

    fn send(&self, command: UiCommand) {
        if self.tx.send(command).is_err() {
            tracing::debug!("ui loop gone, dropping ui command");
            return;
        }
        if let Some(wake) = &self.wake {
            wake();
        }
    }
}

/// Receiving end of the UI channel, owned by the UI thread.
pub struct UiLoop {
    rx: mpsc::UnboundedReceiver<UiCommand>,
}

impl UiLoop {
    pub fn channel() -> (UiHandle, UiLoop) {
        let (tx, rx) = mpsc::unbounded_channel();
        (UiHandle { tx, wake: None }, UiLoop { rx })
    }

    /// Like [`Self::channel`], but `wake` runs after every queued command so
    /// a sleeping host event loop knows to call [`Self::pump`].
    pub fn with_waker(wake: impl Fn() + Send + Sync + 'static) -> (UiHandle, UiLoop) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = UiHandle {
            tx,
            wake: Some(Arc::new(wake)),
        };
        (handle, UiLoop { rx })
    }

    /// Apply everything queued so far without blocking. Returns the number
    /// of commands applied. Meant to be called from a host event loop.
    pub fn pump(&mut self, sink: &mut dyn UiSink) -> usize {
        let mut applied = 0;
        while let Ok(command) = self.rx.try_recv() {
            apply(sink, command);
            applied += 1;
        }
        applied
    }
}

fn apply(sink: &mut dyn UiSink, command: UiCommand) {
    match command {
        UiCommand::SetText { element, value } => sink.set_text(&element, &value),
        UiCommand::Show => sink.show(),
        UiCommand::Notify { title, body } => sink.notify(&title, &body),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[derive(Default)]
    struct Recorder(Vec<UiCommand>);

    impl UiSink for Recorder {
        fn set_text(&mut self, element: &str, value: &str) {
            self.0.push(UiCommand::SetText {
                element: element.into(),
                value: value.into(),
            });
        }
        fn show(&mut self) {
            self.0.push(UiCommand::Show);
        }
        fn notify(&mut self, title: &str, body: &str) {
            self.0.push(UiCommand::Notify {
                title: title.into(),
                body: body.into(),
            });
        }
    }

    #[test]
    fn pump_applies_in_order() {
        let (handle, mut ui) = UiLoop::channel();
        handle.set_text(OUTPUT_ELEMENT, "x");
        handle.show();
        handle.notify("t", "b");

        let mut sink = Recorder::default();
        assert_eq!(ui.pump(&mut sink), 3);
        assert_eq!(
            sink.0,
            vec![
                UiCommand::SetText {
                    element: OUTPUT_ELEMENT.into(),
                    value: "x".into()
                },
                UiCommand::Show,
                UiCommand::Notify {
                    title: "t".into(),
                    body: "b".into()
                },
            ]
        );
        assert_eq!(ui.pump(&mut sink), 0);
    }

    #[test]
    fn waker_fires_once_per_command() {
        let wakes = Arc::new(AtomicUsize::new(0));
        let counter = wakes.clone();
        let (handle, mut ui) = UiLoop::with_waker(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let worker = std::thread::spawn(move || {
            handle.set_text(HOME_ELEMENT, "captured");
            handle.show();
        });
        worker.join().unwrap();

        assert_eq!(wakes.load(Ordering::SeqCst), 2);
        let mut sink = Recorder::default();
        assert_eq!(ui.pump(&mut sink), 2);
    }

    #[test]
    fn closed_loop_does_not_wake() {
        let wakes = Arc::new(AtomicUsize::new(0));
        let counter = wakes.clone();
        let (handle, ui) = UiLoop::with_waker(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        drop(ui);
        handle.notify("t", "b");
        assert_eq!(wakes.load(Ordering::SeqCst), 0);
    }
}
