use crate::core::{QuoteRequest, TradeState};
use log::debug;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, RwLock};

/// Re-derives the trade on a fixed interval and publishes the latest
/// state. Every derivation carries the generation current when it began;
/// superseding the inputs bumps the generation, so a slow stale derivation
/// can never overwrite a fresher one (last-input-wins, not
/// last-response-wins).
pub struct QuotePoller {
    generation: AtomicU64,
    request: RwLock<Option<QuoteRequest>>,
    state_tx: watch::Sender<TradeState>,
}

impl QuotePoller {
    pub fn new() -> (Arc<Self>, watch::Receiver<TradeState>) {
        let (state_tx, state_rx) = watch::channel(TradeState::Invalid);
        (
            Arc::new(Self {
                generation: AtomicU64::new(0),
                request: RwLock::new(None),
                state_tx,
            }),
            state_rx,
        )
    }

    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Replaces the inputs. Any in-flight derivation for the previous
    /// inputs becomes stale immediately; its eventual result is discarded.
    pub async fn set_request(&self, request: Option<QuoteRequest>) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let initial = match &request {
            Some(_) => TradeState::Loading,
            None => TradeState::Invalid,
        };
        *self.request.write().await = request;
        let _ = self.state_tx.send(initial);
        generation
    }

    /// Publishes a derivation result, unless its inputs were superseded
    /// while it was in flight.
    pub fn commit(&self, generation: u64, state: TradeState) -> bool {
        if generation != self.generation.load(Ordering::SeqCst) {
            debug!(
                "Discarding stale derivation for generation {} (current {})",
                generation,
                self.generation.load(Ordering::SeqCst)
            );
            return false;
        }
        self.state_tx.send(state).is_ok()
    }

    /// Polling loop: snapshot the inputs and their generation, derive,
    /// commit. Runs until the receiving side is dropped.
    pub async fn run<F, Fut>(self: Arc<Self>, interval: Duration, derive: F)
    where
        F: Fn(QuoteRequest) -> Fut,
        Fut: Future<Output = TradeState>,
    {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            if self.state_tx.is_closed() {
                return;
            }
            let generation = self.current_generation();
            let request = match self.request.read().await.clone() {
                Some(request) => request,
                None => continue,
            };
            let state = derive(request).await;
            self.commit(generation, state);
        }
    }
}
