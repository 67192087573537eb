//! Pushes the valid-entries aggregate to the parent form.

use std::fmt;

use tokio::sync::watch;

pub type AggregateCallback = Box<dyn FnMut(&[String]) + Send>;

pub struct AggregateNotifier {
    callback: AggregateCallback,
    published: u64,
}

impl AggregateNotifier {
    pub fn new(callback: impl FnMut(&[String]) + Send + 'static) -> Self {
        Self {
            callback: Box::new(callback),
            published: 0,
        }
    }

    pub fn noop() -> Self {
        Self::new(|_| {})
    }

    /// A notifier that mirrors every published aggregate into a watch channel.
    pub fn channel() -> (Self, watch::Receiver<Vec<String>>) {
        let (tx, rx) = watch::channel(Vec::new());
        let notifier = Self::new(move |aggregate| {
            tx.send_replace(aggregate.to_vec());
        });
        (notifier, rx)
    }

    pub fn notify(&mut self, aggregate: &[String]) {
        self.published += 1;
        (self.callback)(aggregate);
    }

    /// Number of aggregates published so far.
    pub fn published(&self) -> u64 {
        self.published
    }
}

impl fmt::Debug for AggregateNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AggregateNotifier")
            .field("published", &self.published)
            .finish_non_exhaustive()
    }
}
