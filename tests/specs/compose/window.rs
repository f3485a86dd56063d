//! Composition window specs
//!
//! Verify `in_time` bounds the time between the first and last entry.
//! Tokio's paused clock advances instantly across sleeps.

use crate::prelude::*;

#[tokio::test(start_paused = true)]
async fn late_entry_does_not_fire() {
    let bus = MessageBox::new();
    let inbox = Inbox::new();
    let sub = bus
        .when("c1", "t1")
        .and("c2", "t2")
        .in_time(Duration::from_secs(5))
        .subscribe(inbox.callback())
        .unwrap();

    bus.publish("c1", "t1", "a").unwrap();
    tokio::time::sleep(Duration::from_secs(6)).await;
    bus.publish("c2", "t2", "b").unwrap();

    assert!(inbox.is_empty());
    assert_eq!(sub.status().resets, 1);
}

#[tokio::test(start_paused = true)]
async fn entries_inside_the_window_fire() {
    let bus = MessageBox::new();
    let inbox = Inbox::new();
    let _sub = bus
        .when("c1", "t1")
        .and("c2", "t2")
        .in_time(Duration::from_secs(5))
        .subscribe(inbox.callback())
        .unwrap();

    bus.publish("c1", "t1", "a").unwrap();
    tokio::time::sleep(Duration::from_secs(4)).await;
    bus.publish("c2", "t2", "b").unwrap();

    similar_asserts::assert_eq!(inbox.texts(), vec!["b".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn expiry_allows_a_fresh_attempt() {
    let bus = MessageBox::new();
    let inbox = Inbox::new();
    let _sub = bus
        .when("c1", "t1")
        .and("c2", "t2")
        .in_time(Duration::from_secs(5))
        .subscribe(inbox.callback())
        .unwrap();

    bus.publish("c1", "t1", "stale").unwrap();
    tokio::time::sleep(Duration::from_secs(10)).await;
    bus.publish("c1", "t1", "a").unwrap();
    bus.publish("c2", "t2", "b").unwrap();

    similar_asserts::assert_eq!(inbox.texts(), vec!["b".to_string()]);
}
