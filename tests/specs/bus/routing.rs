//! Routing specs
//!
//! Verify which subscribers a publish reaches.

use crate::prelude::*;

const CHANNELS: [&str; 4] = ["channel", "cart", "orders", "c"];
const TOPICS: [&str; 4] = ["topic", "total", "created", "t"];

#[test]
fn exact_subscription_receives_matching_publish() {
    let bus = MessageBox::new();
    let inbox = Inbox::new();
    let _sub = bus.subscribe("channel", "topic", inbox.callback()).unwrap();

    bus.publish("channel", "topic", "Hello, World!").unwrap();
    bus.publish("channel", "other", "missed").unwrap();

    similar_asserts::assert_eq!(inbox.texts(), vec!["Hello, World!".to_string()]);
}

#[test]
fn catch_all_receives_every_publish() {
    let bus = MessageBox::new();
    let inbox = Inbox::new();
    let _sub = bus.subscribe("*", "*", inbox.callback()).unwrap();

    for channel in CHANNELS {
        for topic in TOPICS {
            bus.publish(channel, topic, ()).unwrap();
        }
    }

    assert_eq!(inbox.len(), CHANNELS.len() * TOPICS.len());
}

#[test]
fn prefix_subscription_receives_only_prefixed_addresses() {
    let bus = MessageBox::new();
    let inbox = Inbox::new();
    let _sub = bus.subscribe("c*", "t*", inbox.callback()).unwrap();

    let mut expected = Vec::new();
    for channel in CHANNELS {
        for topic in TOPICS {
            bus.publish(channel, topic, ()).unwrap();
            if channel.starts_with('c') && topic.starts_with('t') {
                expected.push(format!("{}/{}", channel, topic));
            }
        }
    }

    similar_asserts::assert_eq!(inbox.addresses(), expected);
}

#[test]
fn patterns_are_case_sensitive() {
    let bus = MessageBox::new();
    let inbox = Inbox::new();
    let _sub = bus.subscribe("Channel", "topic", inbox.callback()).unwrap();

    bus.publish("channel", "topic", ()).unwrap();
    assert!(inbox.is_empty());
}

#[test]
fn disposed_subscription_is_never_invoked_again() {
    let bus = MessageBox::new();
    let inbox = Inbox::new();
    let sub = bus.subscribe("channel", "topic", inbox.callback()).unwrap();

    sub.dispose();
    bus.publish("channel", "topic", "X").unwrap();

    assert_eq!(inbox.len(), 0);
}

#[test]
fn filter_admits_only_numbers() {
    let bus = MessageBox::new();
    let inbox = Inbox::new();
    let _sub = bus
        .subscribe_if("channel", "topic", |env| env.is::<i32>(), inbox.callback())
        .unwrap();

    bus.publish("channel", "topic", "Does not show!").unwrap();
    bus.publish("channel", "topic", 12345_i32).unwrap();

    similar_asserts::assert_eq!(inbox.texts(), vec!["12345".to_string()]);
}

#[test]
fn empty_patterns_are_rejected_when_subscribing() {
    let bus = MessageBox::new();
    let inbox = Inbox::new();

    assert!(bus.subscribe("", "topic", inbox.callback()).is_err());
    assert!(bus.subscribe("channel", "", inbox.callback()).is_err());
}

#[test]
fn separate_boxes_are_isolated() {
    let left = MessageBox::new();
    let right = MessageBox::new();
    let inbox = Inbox::new();
    let _sub = left.subscribe("*", "*", inbox.callback()).unwrap();

    right.publish("channel", "topic", ()).unwrap();
    assert!(inbox.is_empty());
}

#[test]
fn fluent_routes_reach_the_same_subscribers() {
    let bus = MessageBox::new();
    let inbox = Inbox::new();
    let _sub = bus
        .channel("channel")
        .topic("topic")
        .subscribe(inbox.callback())
        .unwrap();

    bus.channel("channel").topic("topic").publish("fluent").unwrap();
    bus.publish("channel", "topic", "plain").unwrap();

    similar_asserts::assert_eq!(
        inbox.texts(),
        vec!["fluent".to_string(), "plain".to_string()]
    );
}
