//! Shared helpers for the behavioral specs

#![allow(dead_code, unused_imports)]

pub use pb_bus::{
    BoxConfig, BoxDeps, Envelope, FailureReport, HandlerError, MemorySink, MessageBox,
    PublishError,
};
pub use pb_conventions::ConventionsExt;
pub use pb_correlate::{CompositePhase, CompositionError, Correlate};
pub use std::sync::{Arc, Mutex};
pub use std::time::Duration;

/// Records every envelope handed to its callback
#[derive(Clone, Default)]
pub struct Inbox {
    seen: Arc<Mutex<Vec<Envelope>>>,
}

impl Inbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Callback appending to this inbox; may be handed out many times
    pub fn callback(&self) -> impl Fn(&Envelope) + Send + Sync + 'static {
        let seen = Arc::clone(&self.seen);
        move |env: &Envelope| seen.lock().unwrap().push(env.clone())
    }

    pub fn len(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Payloads rendered as text: strings as-is, integers in decimal
    pub fn texts(&self) -> Vec<String> {
        self.seen.lock().unwrap().iter().map(render).collect()
    }

    pub fn addresses(&self) -> Vec<String> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .map(|env| format!("{}/{}", env.channel(), env.topic()))
            .collect()
    }
}

fn render(env: &Envelope) -> String {
    if let Some(text) = env.as_str() {
        return text.to_string();
    }
    if let Some(n) = env.data::<i32>() {
        return n.to_string();
    }
    format!("{:?}", env)
}
