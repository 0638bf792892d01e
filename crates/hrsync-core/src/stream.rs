// ── Mirror subscriptions ──
//
// Consumers hold a `MirrorStream` to render a collection and be woken
// when the owning store replaces or clears it.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// Shared, ordered collection snapshot.
pub type Snapshot<T> = Arc<Vec<Arc<T>>>;

/// A subscription to one entity mirror.
pub struct MirrorStream<T: Send + Sync + 'static> {
    receiver: watch::Receiver<Snapshot<T>>,
}

impl<T: Send + Sync + 'static> MirrorStream<T> {
    pub(crate) fn new(receiver: watch::Receiver<Snapshot<T>>) -> Self {
        Self { receiver }
    }

    /// The latest snapshot, marking it seen.
    pub fn current(&mut self) -> Snapshot<T> {
        self.receiver.borrow_and_update().clone()
    }

    /// Wait for the next replacement. `None` once the store is gone.
    pub async fn changed(&mut self) -> Option<Snapshot<T>> {
        self.receiver.changed().await.ok()?;
        Some(self.current())
    }

    /// Wait until the snapshot satisfies `pred`, checking the current
    /// value first.
    pub async fn wait_for(&mut self, pred: impl FnMut(&Snapshot<T>) -> bool) -> Option<Snapshot<T>> {
        let snapshot = self.receiver.wait_for(pred).await.ok()?;
        Some(snapshot.clone())
    }

    /// Convert into a `Stream` yielding the current snapshot, then one
    /// item per replacement.
    pub fn into_stream(self) -> MirrorWatchStream<T> {
        MirrorWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter over a mirror's `watch` channel.
pub struct MirrorWatchStream<T: Send + Sync + 'static> {
    inner: WatchStream<Snapshot<T>>,
}

impl<T: Send + Sync + 'static> Stream for MirrorWatchStream<T> {
    type Item = Snapshot<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
