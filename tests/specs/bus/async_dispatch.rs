//! Async dispatch specs
//!
//! Verify deliveries handed off by `publish_async` and the box lifecycle.

use crate::prelude::*;
use std::sync::mpsc;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn async_publish_is_delivered_off_the_calling_thread() {
    let bus = MessageBox::new();
    let (tx, rx) = mpsc::channel();
    let tx = Mutex::new(tx);
    let _sub = bus
        .subscribe("channel", "topic", move |env: &Envelope| {
            let _ = tx
                .lock()
                .unwrap()
                .send((std::thread::current().id(), env.as_str().map(String::from)));
        })
        .unwrap();

    let caller = std::thread::current().id();
    bus.publish_async("channel", "topic", "X").unwrap();

    let (thread, text) = tokio::task::spawn_blocking(move || {
        rx.recv_timeout(Duration::from_secs(5))
    })
    .await
    .unwrap()
    .unwrap();
    assert_ne!(thread, caller);
    assert_eq!(text.as_deref(), Some("X"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn shutdown_waits_for_pending_deliveries() {
    let bus = MessageBox::new();
    let inbox = Inbox::new();
    let record = inbox.callback();
    let _sub = bus
        .subscribe("c", "t", move |env: &Envelope| {
            std::thread::sleep(Duration::from_millis(10));
            record(env);
        })
        .unwrap();

    for _ in 0..5 {
        bus.publish_async("c", "t", ()).unwrap();
    }
    bus.shutdown().await.unwrap();

    assert_eq!(inbox.len(), 5);
    assert!(matches!(
        bus.publish("c", "t", ()),
        Err(PublishError::Closed)
    ));
}

#[test]
fn async_publish_needs_a_runtime() {
    let bus = MessageBox::new();
    assert!(matches!(
        bus.publish_async("c", "t", ()),
        Err(PublishError::NoRuntime)
    ));
}
