//! Failure isolation specs
//!
//! Verify that one failing subscriber never hides another.

use crate::prelude::*;

#[test]
fn failures_are_collected_after_every_subscriber_ran() {
    let bus = MessageBox::new();
    let inbox = Inbox::new();
    let _first = bus
        .subscribe("c", "t", |_env: &Envelope| Err::<(), _>("first failed"))
        .unwrap();
    let _second = bus
        .subscribe("c", "t", |_env: &Envelope| -> () { panic!("second panicked") })
        .unwrap();
    let _ok = bus.subscribe("c", "t", inbox.callback()).unwrap();

    let err = bus.publish("c", "t", "payload").unwrap_err();

    assert_eq!(inbox.len(), 1);
    assert_eq!(err.failures().len(), 2);
}

#[test]
fn first_failure_mode_reports_one() {
    let config = BoxConfig::from_toml_str(r#"failure_report = "first""#).unwrap();
    let bus = MessageBox::with_config(config);
    let inbox = Inbox::new();
    let _first = bus
        .subscribe("c", "t", |_env: &Envelope| Err::<(), _>("one"))
        .unwrap();
    let _second = bus
        .subscribe("c", "t", |_env: &Envelope| Err::<(), _>("two"))
        .unwrap();
    let _ok = bus.subscribe("c", "t", inbox.callback()).unwrap();

    let err = bus.publish("c", "t", ()).unwrap_err();

    assert_eq!(err.failures().len(), 1);
    assert_eq!(inbox.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn async_failures_are_reported_out_of_band() {
    let sink = Arc::new(MemorySink::new());
    let bus = MessageBox::with_deps(
        BoxConfig::default(),
        BoxDeps::default().with_sink(sink.clone()),
    );
    let inbox = Inbox::new();
    let _bad = bus
        .subscribe("c", "t", |_env: &Envelope| Err::<(), _>("async failure"))
        .unwrap();
    let _ok = bus.subscribe("c", "t", inbox.callback()).unwrap();

    bus.publish_async("c", "t", "x").unwrap();
    bus.drain().await;

    assert_eq!(inbox.len(), 1);
    let failures = sink.take();
    assert_eq!(failures.len(), 1);
    assert!(matches!(failures[0].error, HandlerError::Failed(_)));
}
