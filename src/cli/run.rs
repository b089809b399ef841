use std::sync::{Arc, Mutex};

use tokio::runtime::Runtime;
use winit::event::Event;
use winit::event_loop::{ControlFlow, EventLoop, EventLoopBuilder};

use crate::capture::hotkey::HotkeyRegistration;
use crate::capture::{CaptureTrigger, ClipboardAccess, SystemClipboard};
use crate::config::AppConfig;
use crate::dispatch::{DispatchCoordinator, Dispatcher};
use crate::error::{ClipwiseError, Result};
use crate::transport::ZmqTransport;
use crate::ui::{ConsoleSink, UiLoop, UiSink};

/// Wake-ups delivered to the main-thread event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HelperEvent {
    /// UI commands are queued.
    Ui,
    Shutdown,
}

/// Run the hotkey helper. The calling thread must be the main thread: it
/// runs the OS event loop that delivers hotkey presses, and applies UI
/// commands from there. Returns after Ctrl+C.
///
/// Clipboard, event loop and hotkey setup failures are returned before
/// anything else starts; the helper is useless without them.
pub fn run_helper(runtime: &Runtime, config: AppConfig) -> Result<()> {
    let clipboard: Arc<dyn ClipboardAccess> = Arc::new(SystemClipboard::new()?);
    let event_loop = build_event_loop()?;
    let (registration, activations) = HotkeyRegistration::register(&config.hotkey.combination)?;

    let transport = Arc::new(ZmqTransport::new(
        config.backend.address.clone(),
        config.backend.retry_interval(),
    ));
    let ui_proxy = Mutex::new(event_loop.create_proxy());
    let (ui, mut ui_loop) = UiLoop::with_waker(move || {
        let proxy = ui_proxy.lock().unwrap_or_else(|e| e.into_inner());
        if proxy.send_event(HelperEvent::Ui).is_err() {
            tracing::debug!("event loop gone, ui wake-up dropped");
        }
    });
    let coordinator = DispatchCoordinator::new(
        transport.clone(),
        clipboard.clone(),
        ui,
        config.capture.clone(),
    );

    let dispatcher = {
        let _guard = runtime.enter();
        Dispatcher::spawn(coordinator, config.dispatch.queue_capacity)
    };
    CaptureTrigger::new(clipboard, dispatcher.sender()).spawn(activations)?;

    let connector = transport.clone();
    runtime.spawn(async move {
        if let Err(e) = connector.connect().await {
            tracing::debug!("background connect ended: {}", e);
        }
    });

    let shutdown_proxy = event_loop.create_proxy();
    runtime.spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {}", e);
            return;
        }
        tracing::info!("shutting down");
        transport.close().await;
        dispatcher.abort();
        if shutdown_proxy.send_event(HelperEvent::Shutdown).is_err() {
            tracing::debug!("event loop already closed");
        }
    });

    eprintln!(
        "clipwise: press {} to send the clipboard to {} (template '{}'), Ctrl+C to quit",
        registration.combination(),
        config.backend.address,
        config.capture.template
    );

    let mut sink = ConsoleSink::new();
    event_loop
        .run(|event, elwt| match event {
            Event::UserEvent(helper_event) => {
                if on_helper_event(helper_event, &mut ui_loop, &mut sink) {
                    elwt.exit();
                }
            }
            Event::AboutToWait => elwt.set_control_flow(ControlFlow::Wait),
            _ => {}
        })
        .map_err(|e| ClipwiseError::EventLoop {
            reason: e.to_string(),
        })?;

    drop(registration);
    Ok(())
}

fn build_event_loop() -> Result<EventLoop<HelperEvent>> {
    #[cfg_attr(not(target_os = "macos"), allow(unused_mut))]
    let mut builder = EventLoopBuilder::<HelperEvent>::with_user_event();
    #[cfg(target_os = "macos")]
    {
        use winit::platform::macos::{ActivationPolicy, EventLoopBuilderExtMacOS};
        // No dock icon; this is a background helper.
        builder.with_activation_policy(ActivationPolicy::Accessory);
    }
    builder.build().map_err(|e| ClipwiseError::EventLoop {
        reason: e.to_string(),
    })
}

/// Apply one wake-up. Returns whether the loop should exit.
fn on_helper_event(event: HelperEvent, ui_loop: &mut UiLoop, sink: &mut dyn UiSink) -> bool {
    ui_loop.pump(sink);
    event == HelperEvent::Shutdown
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;
    use crate::ui::OUTPUT_ELEMENT;

    #[derive(Default)]
    struct Outputs(Vec<String>);

    impl UiSink for Outputs {
        fn set_text(&mut self, element: &str, value: &str) {
            if element == OUTPUT_ELEMENT {
                self.0.push(value.to_string());
            }
        }
        fn show(&mut self) {}
        fn notify(&mut self, _title: &str, _body: &str) {}
    }

    #[test]
    fn worker_updates_reach_sink_through_wake_ups() {
        // Stands in for the event loop proxy and its queue.
        let (events, wake_ups) = mpsc::channel();
        let waker = Mutex::new(events);
        let (ui, mut ui_loop) = UiLoop::with_waker(move || {
            let _ = waker.lock().unwrap().send(HelperEvent::Ui);
        });

        std::thread::spawn(move || ui.set_text(OUTPUT_ELEMENT, "reply"))
            .join()
            .unwrap();

        let mut sink = Outputs::default();
        let event = wake_ups.try_recv().unwrap();
        assert!(!on_helper_event(event, &mut ui_loop, &mut sink));
        assert_eq!(sink.0, vec!["reply".to_string()]);
    }

    #[test]
    fn shutdown_drains_then_exits() {
        let (ui, mut ui_loop) = UiLoop::channel();
        ui.set_text(OUTPUT_ELEMENT, "last");

        let mut sink = Outputs::default();
        assert!(on_helper_event(HelperEvent::Shutdown, &mut ui_loop, &mut sink));
        assert_eq!(sink.0, vec!["last".to_string()]);
    }
}
