//! Conventions specs
//!
//! Verify values are addressed by the conventions of their type.

use crate::prelude::*;

#[test]
fn string_conventions_round_trip() {
    let bus = MessageBox::new();
    let conventions = bus
        .with_conventions()
        .add_channel_convention::<String, _>(|s| s.clone())
        .add_topic_convention::<String, _>(|s| s.clone());
    let inbox = Inbox::new();
    let _plain = bus.subscribe("*", "*", inbox.callback()).unwrap();

    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&received);
    let _typed = conventions
        .subscribe::<String, _, _>(move |s: &String| sink.lock().unwrap().push(s.clone()))
        .unwrap();

    conventions.publish("Hello, World!".to_string()).unwrap();

    similar_asserts::assert_eq!(
        inbox.addresses(),
        vec!["Hello, World!/Hello, World!".to_string()]
    );
    similar_asserts::assert_eq!(
        *received.lock().unwrap(),
        vec!["Hello, World!".to_string()]
    );
}

mod shop {
    pub struct OrderPlaced;
}

#[test]
fn default_conventions_use_module_and_type_name() {
    let bus = MessageBox::new();
    let inbox = Inbox::new();
    let _sub = bus.subscribe("*", "*", inbox.callback()).unwrap();

    bus.with_default_conventions()
        .publish(shop::OrderPlaced)
        .unwrap();

    similar_asserts::assert_eq!(
        inbox.addresses(),
        vec!["specs::conventions_addressing::shop/OrderPlaced".to_string()]
    );
}
