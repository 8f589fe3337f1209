// ── Subscription change streams ──

use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::watch;
use tokio_stream::Stream;
use tokio_stream::wrappers::WatchStream;

use crate::model::Subscription;

/// A handle on the session's subscription record.
///
/// Offers the snapshot taken at creation, the latest value, and change
/// notification via [`changed`](Self::changed) or as a `Stream`.
pub struct SubscriptionWatch {
    current: Subscription,
    receiver: watch::Receiver<Subscription>,
}

impl SubscriptionWatch {
    pub(crate) fn new(receiver: watch::Receiver<Subscription>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    pub fn current(&self) -> &Subscription {
        &self.current
    }

    /// Wait for the next published record. `None` once the session is
    /// dropped.
    pub async fn changed(&mut self) -> Option<Subscription> {
        self.receiver.changed().await.ok()?;
        let next = self.receiver.borrow_and_update().clone();
        self.current = next.clone();
        Some(next)
    }

    pub fn into_stream(self) -> SubscriptionStream {
        SubscriptionStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` of subscription records, starting with the current one.
pub struct SubscriptionStream {
    inner: WatchStream<Subscription>,
}

impl Stream for SubscriptionStream {
    type Item = Subscription;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
