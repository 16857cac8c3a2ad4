use crate::chess::{Promotion, Square};
use parking_lot::Mutex;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::oneshot;
use tracing::{debug, instrument};

#[derive(Debug)]
struct Pending {
    anchor: Square,
    tx: oneshot::Sender<Promotion>,
}

/// The player's pending choice of [`Promotion`].
///
/// Resolves to [`None`] if the choice is cancelled, superseded by another
/// request, or if the [`PromotionResolver`] is dropped.
#[derive(Debug)]
#[must_use = "futures do nothing unless polled"]
pub struct PromotionRequest {
    anchor: Square,
    rx: oneshot::Receiver<Promotion>,
}

impl PromotionRequest {
    /// The square where the pawn promotes.
    pub fn anchor(&self) -> Square {
        self.anchor
    }
}

impl Future for PromotionRequest {
    type Output = Option<Promotion>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(Result::ok)
    }
}

/// A single slot for the player's choice of [`Promotion`].
///
/// Clones share the same slot.
#[derive(Debug, Default, Clone)]
pub struct PromotionResolver {
    slot: Arc<Mutex<Option<Pending>>>,
}

impl PromotionResolver {
    /// Opens the slot for a promotion on the given square.
    ///
    /// A request that is still pending is cancelled.
    #[instrument(level = "trace", skip(self))]
    pub fn request(&self, anchor: Square) -> PromotionRequest {
        let (tx, rx) = oneshot::channel();
        if let Some(stale) = self.slot.lock().replace(Pending { anchor, tx }) {
            debug!(anchor = %stale.anchor, "superseded pending promotion");
        }

        PromotionRequest { anchor, rx }
    }

    /// Settles the pending request with the given choice.
    ///
    /// Returns `false` if nothing was pending.
    #[instrument(level = "trace", skip(self), ret)]
    pub fn resolve(&self, promotion: Promotion) -> bool {
        match self.slot.lock().take() {
            Some(Pending { tx, .. }) => tx.send(promotion).is_ok(),
            None => false,
        }
    }

    /// Settles the pending request without a choice.
    ///
    /// Returns `false` if nothing was pending.
    #[instrument(level = "trace", skip(self), ret)]
    pub fn cancel(&self) -> bool {
        self.slot.lock().take().is_some()
    }

    /// The square anchoring the pending request, if any.
    ///
    /// A request that was dropped is no longer pending.
    pub fn pending(&self) -> Option<Square> {
        let mut slot = self.slot.lock();
        if slot.as_ref().map_or(false, |p| p.tx.is_closed()) {
            *slot = None;
        }

        slot.as_ref().map(|p| p.anchor)
    }
}
