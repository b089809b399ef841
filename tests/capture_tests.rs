//! Capture trigger: activations to capture events.

use std::sync::Arc;

use tokio::sync::mpsc;

use clipwise::capture::{Activation, CaptureTrigger, MemoryClipboard};
use clipwise::dispatch::DispatchJob;
use clipwise::error::ClipwiseError;

fn captured_text(job: DispatchJob) -> String {
    match job {
        DispatchJob::Capture(event) => event.text,
        other => panic!("expected a capture, got {:?}", other),
    }
}

#[test]
fn activation_queues_clipboard_snapshot() {
    let clipboard = Arc::new(MemoryClipboard::with_text("need more time"));
    let (jobs, mut rx) = mpsc::channel(4);
    let trigger = CaptureTrigger::new(clipboard, jobs);

    let activation = Activation::now();
    assert!(trigger.on_activation(activation).unwrap());

    match rx.try_recv().unwrap() {
        DispatchJob::Capture(event) => {
            assert_eq!(event.text, "need more time");
            assert_eq!(event.timestamp, activation.at);
        }
        other => panic!("expected a capture, got {:?}", other),
    }
}

#[test]
fn captured_text_is_not_trimmed() {
    let clipboard = Arc::new(MemoryClipboard::with_text("  padded\n"));
    let (jobs, mut rx) = mpsc::channel(1);
    let trigger = CaptureTrigger::new(clipboard, jobs);

    assert!(trigger.on_activation(Activation::now()).unwrap());
    assert_eq!(captured_text(rx.try_recv().unwrap()), "  padded\n");
}

#[test]
fn no_text_means_no_event() {
    let clipboard = Arc::new(MemoryClipboard::new());
    let (jobs, mut rx) = mpsc::channel(4);
    let trigger = CaptureTrigger::new(clipboard.clone(), jobs);

    assert!(!trigger.on_activation(Activation::now()).unwrap());

    clipboard.clear();
    assert!(!trigger.on_activation(Activation::now()).unwrap());

    let whitespace = Arc::new(MemoryClipboard::with_text(" \n\t "));
    let (jobs, mut ws_rx) = mpsc::channel(4);
    let trigger = CaptureTrigger::new(whitespace, jobs);
    assert!(!trigger.on_activation(Activation::now()).unwrap());

    assert!(rx.try_recv().is_err());
    assert!(ws_rx.try_recv().is_err());
}

#[test]
fn cleared_clipboard_stops_producing_events() {
    let clipboard = Arc::new(MemoryClipboard::with_text("first"));
    let (jobs, mut rx) = mpsc::channel(4);
    let trigger = CaptureTrigger::new(clipboard.clone(), jobs);

    assert!(trigger.on_activation(Activation::now()).unwrap());
    clipboard.clear();
    assert!(!trigger.on_activation(Activation::now()).unwrap());

    assert_eq!(captured_text(rx.try_recv().unwrap()), "first");
    assert!(rx.try_recv().is_err());
}

#[test]
fn stopped_dispatcher_is_reported() {
    let clipboard = Arc::new(MemoryClipboard::with_text("text"));
    let (jobs, rx) = mpsc::channel(1);
    drop(rx);
    let trigger = CaptureTrigger::new(clipboard, jobs);

    let err = trigger.on_activation(Activation::now()).unwrap_err();
    assert!(matches!(err, ClipwiseError::DispatcherStopped));
}

#[test]
fn listener_thread_waits_instead_of_dropping_when_queue_is_full() {
    let clipboard = Arc::new(MemoryClipboard::with_text("same"));
    let (jobs, mut rx) = mpsc::channel(1);
    let (activations, activation_rx) = std::sync::mpsc::channel();
    let listener = CaptureTrigger::new(clipboard, jobs)
        .spawn(activation_rx)
        .unwrap();

    for _ in 0..5 {
        activations.send(Activation::now()).unwrap();
    }
    drop(activations);

    for _ in 0..5 {
        let job = tokio_test::block_on(rx.recv()).expect("activation was dropped");
        assert_eq!(captured_text(job), "same");
    }
    listener.join().unwrap();
    assert!(tokio_test::block_on(rx.recv()).is_none());
}
