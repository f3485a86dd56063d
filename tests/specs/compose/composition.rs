//! Composition specs
//!
//! Verify composite subscriptions fire once every entry was seen.

use crate::prelude::*;

#[test]
fn composite_fires_with_the_last_envelope() {
    let bus = MessageBox::new();
    let inbox = Inbox::new();
    let _sub = bus
        .when("c1", "t1")
        .and("c2", "t2")
        .subscribe(inbox.callback())
        .unwrap();

    bus.publish("c1", "t1", "a").unwrap();
    bus.publish("c2", "t2", "b").unwrap();

    similar_asserts::assert_eq!(inbox.texts(), vec!["b".to_string()]);
}

#[test]
fn unrelated_event_interrupts_the_composite() {
    let bus = MessageBox::new();
    let inbox = Inbox::new();
    let _sub = bus
        .when("c1", "t1")
        .and("c2", "t2")
        .subscribe(inbox.callback())
        .unwrap();

    bus.publish("c1", "t1", "a").unwrap();
    bus.publish("c3", "t3", "z").unwrap();
    bus.publish("c2", "t2", "b").unwrap();

    assert!(inbox.is_empty());
}

#[test]
fn conditional_entry_fires_for_an_int() {
    let bus = MessageBox::new();
    let inbox = Inbox::new();
    let _sub = bus
        .when_if("c1", "t1", |env| env.is::<i32>())
        .and("c2", "t2")
        .subscribe(inbox.callback())
        .unwrap();

    bus.publish("c1", "t1", 1_i32).unwrap();
    bus.publish("c2", "t2", "x").unwrap();

    similar_asserts::assert_eq!(inbox.texts(), vec!["x".to_string()]);
}

#[test]
fn conditional_entry_ignores_other_values() {
    let bus = MessageBox::new();
    let inbox = Inbox::new();
    let _sub = bus
        .when_if("c1", "t1", |env| env.is::<i32>())
        .and("c2", "t2")
        .subscribe(inbox.callback())
        .unwrap();

    bus.publish("c1", "t1", "not-an-int").unwrap();
    bus.publish("c2", "t2", "x").unwrap();

    assert!(inbox.is_empty());
}

#[test]
fn three_entries_need_all_three() {
    let bus = MessageBox::new();
    let inbox = Inbox::new();
    let sub = bus
        .when("c1", "t1")
        .and("c2", "t2")
        .and("c3", "t3")
        .subscribe(inbox.callback())
        .unwrap();

    bus.publish("c3", "t3", "c").unwrap();
    bus.publish("c1", "t1", "a").unwrap();
    assert_eq!(sub.status().satisfied, 2);
    assert!(inbox.is_empty());

    bus.publish("c2", "t2", "b").unwrap();
    similar_asserts::assert_eq!(inbox.texts(), vec!["b".to_string()]);
}

#[test]
fn duplicate_entries_take_one_publish_each() {
    let bus = MessageBox::new();
    let inbox = Inbox::new();
    let _sub = bus
        .when("c", "t")
        .and("c", "t")
        .subscribe(inbox.callback())
        .unwrap();

    bus.publish("c", "t", "first").unwrap();
    assert!(inbox.is_empty());

    bus.publish("c", "t", "second").unwrap();
    similar_asserts::assert_eq!(inbox.texts(), vec!["second".to_string()]);
}

#[test]
fn single_entry_composition_is_rejected() {
    let bus = MessageBox::new();
    let inbox = Inbox::new();

    let err = bus.when("c1", "t1").subscribe(inbox.callback()).unwrap_err();
    assert_eq!(err, CompositionError::TooFewEntries { found: 1 });
}

#[test]
fn disposed_composite_never_fires() {
    let bus = MessageBox::new();
    let inbox = Inbox::new();
    let sub = bus
        .when("c1", "t1")
        .and("c2", "t2")
        .subscribe(inbox.callback())
        .unwrap();

    bus.publish("c1", "t1", "a").unwrap();
    sub.dispose();
    sub.dispose();
    bus.publish("c2", "t2", "b").unwrap();

    assert!(inbox.is_empty());
    assert_eq!(sub.status().phase, CompositePhase::Disposed);
}
