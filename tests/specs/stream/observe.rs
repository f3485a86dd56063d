//! Stream specs
//!
//! Verify the `Stream` view over a subscription.

use crate::prelude::*;
use tokio_stream::StreamExt;

#[tokio::test]
async fn stream_buffers_matching_envelopes() {
    let bus = MessageBox::new();
    let stream = bus.observe("channel", "topic").unwrap().subscribe();

    for n in 0..5_i32 {
        bus.publish("channel", "topic", n).unwrap();
    }

    let batch: Vec<i32> = stream
        .take(5)
        .map(|env| *env.data::<i32>().unwrap())
        .collect()
        .await;
    similar_asserts::assert_eq!(batch, vec![0, 1, 2, 3, 4]);
}

#[tokio::test]
async fn dropping_the_stream_unsubscribes() {
    let bus = MessageBox::new();
    let observable = bus.observe("*", "*").unwrap();

    let first = observable.subscribe();
    let second = observable.subscribe();
    assert_eq!(bus.subscriber_count(), 2);

    drop(first);
    assert_eq!(bus.subscriber_count(), 1);
    drop(second);
    assert_eq!(bus.subscriber_count(), 0);
}
