//! Analysis Loop - streaming prediction worker
//!
//! One worker, one message at a time, in arrival order:
//! IDLE → (message) → PROCESSING → IDLE. A bad message or a failed publish
//! becomes a `MessageOutcome::Dropped` and the loop keeps going.
//!
//! The stop signal is only observed while IDLE, so an in-flight message is
//! always finished before `run` returns its `LoopSummary`. Receive failures
//! never end the loop; they are retried with capped exponential backoff.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;

use crate::logic::features::FeatureVector;
use crate::logic::message::{parse_inbound, payload_preview, PredictionOutput};
use crate::logic::model::{ModelContext, RiskThreshold};
use crate::logic::predictor::assess;
use crate::transport::{MessageSink, MessageSource};

pub const INITIAL_RECEIVE_BACKOFF: Duration = Duration::from_millis(100);
pub const MAX_RECEIVE_BACKOFF: Duration = Duration::from_secs(5);

// ============================================================================
// STATE & OUTCOMES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WorkerState {
    Idle,
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DropReason {
    /// Undecodable JSON, missing city/state, non-numeric pollutant
    Malformed,
    /// Publish failed
    Transport,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MessageOutcome {
    Published(PredictionOutput),
    Dropped(DropReason),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoopSummary {
    pub received: u64,
    pub published: u64,
    pub dropped_malformed: u64,
    pub dropped_transport: u64,
    pub receive_errors: u64,
}

// ============================================================================
// STOP SIGNAL
// ============================================================================

/// Held by whoever decides to shut down (signal handler, tests)
#[derive(Debug)]
pub struct StopHandle {
    tx: watch::Sender<bool>,
}

/// Observed by the worker
#[derive(Debug, Clone)]
pub struct StopSignal {
    rx: watch::Receiver<bool>,
}

pub fn stop_channel() -> (StopHandle, StopSignal) {
    let (tx, rx) = watch::channel(false);
    (StopHandle { tx }, StopSignal { rx })
}

impl StopHandle {
    pub fn stop(&self) {
        // no receivers left means nothing to stop
        let _ = self.tx.send(true);
    }
}

impl StopSignal {
    pub fn is_stopped(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once `stop()` is called. Never resolves if the handle is
    /// dropped without stopping.
    pub async fn stopped(&mut self) {
        if self.rx.wait_for(|stopped| *stopped).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

// ============================================================================
// RECEIVE BACKOFF
// ============================================================================

/// Delay before retrying a failed receive. Doubles per consecutive failure,
/// capped at `max`; reset by the next successful receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiveBackoff {
    initial: Duration,
    max: Duration,
    current: Duration,
}

impl ReceiveBackoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial: initial.min(max),
            max,
            current: Duration::ZERO,
        }
    }

    pub fn next_delay(&mut self) -> Duration {
        self.current = if self.current.is_zero() {
            self.initial
        } else {
            (self.current * 2).min(self.max)
        };
        self.current
    }

    pub fn reset(&mut self) {
        self.current = Duration::ZERO;
    }
}

impl Default for ReceiveBackoff {
    fn default() -> Self {
        Self::new(INITIAL_RECEIVE_BACKOFF, MAX_RECEIVE_BACKOFF)
    }
}

// ============================================================================
// WORKER
// ============================================================================

pub struct StreamWorker<S, K> {
    ctx: Arc<ModelContext>,
    threshold: RiskThreshold,
    source: S,
    sink: K,
    state: WorkerState,
    summary: LoopSummary,
    backoff: ReceiveBackoff,
}

impl<S: MessageSource, K: MessageSink> StreamWorker<S, K> {
    pub fn new(ctx: Arc<ModelContext>, threshold: RiskThreshold, source: S, sink: K) -> Self {
        Self {
            ctx,
            threshold,
            source,
            sink,
            state: WorkerState::Idle,
            summary: LoopSummary::default(),
            backoff: ReceiveBackoff::default(),
        }
    }

    pub fn with_receive_backoff(mut self, backoff: ReceiveBackoff) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    pub fn summary(&self) -> LoopSummary {
        self.summary
    }

    /// Handle one raw payload end to end
    pub async fn process(&mut self, payload: &[u8]) -> MessageOutcome {
        self.state = WorkerState::Processing;
        self.summary.received += 1;

        let outcome = self.handle(payload).await;
        match &outcome {
            MessageOutcome::Published(_) => self.summary.published += 1,
            MessageOutcome::Dropped(DropReason::Malformed) => self.summary.dropped_malformed += 1,
            MessageOutcome::Dropped(DropReason::Transport) => self.summary.dropped_transport += 1,
        }

        self.state = WorkerState::Idle;
        outcome
    }

    async fn handle(&mut self, payload: &[u8]) -> MessageOutcome {
        // 1. Decode
        let input = match parse_inbound(payload) {
            Ok(input) => input,
            Err(e) => {
                log::error!(
                    "Error processing air quality data: {} (payload: {})",
                    e,
                    payload_preview(payload)
                );
                return MessageOutcome::Dropped(DropReason::Malformed);
            }
        };
        log::info!("Received air quality data for {}, {}", input.city, input.state);
        log::debug!("Input features: {}", FeatureVector::from_reading(&input.reading).to_log_entry());
        if !input.missing.is_empty() {
            log::debug!("Zero-filled pollutants: {:?}", input.missing);
        }

        // 2. Score
        let assessment = assess(&self.ctx, &input.reading, self.threshold);
        assessment.log_top();

        // 3. Publish
        let output = input.into_output(assessment.selected_names());
        let bytes = match output.to_bytes() {
            Ok(bytes) => bytes,
            Err(e) => {
                log::error!("Failed to encode prediction for {}, {}: {}", output.city, output.state, e);
                return MessageOutcome::Dropped(DropReason::Malformed);
            }
        };

        match self.sink.publish(&bytes).await {
            Ok(()) => {
                log::info!(
                    "Sent disease prediction for {}, {}: {:?}",
                    output.city,
                    output.state,
                    output.diseases
                );
                MessageOutcome::Published(output)
            }
            Err(e) => {
                log::error!("Failed to publish prediction for {}, {}: {}", output.city, output.state, e);
                MessageOutcome::Dropped(DropReason::Transport)
            }
        }
    }

    /// Consume until the source ends or `stop` fires, then close the sink
    pub async fn run(mut self, mut stop: StopSignal) -> LoopSummary {
        log::info!(
            "Disease prediction worker started (threshold {}, model {})",
            self.threshold,
            self.ctx.metadata().source
        );

        loop {
            if stop.is_stopped() {
                log::info!("Stop requested");
                break;
            }

            let next = tokio::select! {
                biased;
                _ = stop.stopped() => {
                    log::info!("Stop requested");
                    break;
                }
                next = self.source.recv() => next,
            };

            match next {
                Ok(Some(payload)) => {
                    self.backoff.reset();
                    self.process(&payload).await;
                }
                Ok(None) => {
                    log::info!("Input stream ended");
                    break;
                }
                Err(e) => {
                    self.summary.receive_errors += 1;
                    let delay = self.backoff.next_delay();
                    log::error!("Failed to receive message: {} (retrying in {:?})", e, delay);

                    tokio::select! {
                        biased;
                        _ = stop.stopped() => {
                            log::info!("Stop requested");
                            break;
                        }
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }

        if let Err(e) = self.sink.close().await {
            log::error!("Failed to flush pending predictions: {}", e);
        }

        log::info!(
            "Worker stopped: received={} published={} dropped_malformed={} dropped_transport={} receive_errors={}",
            self.summary.received,
            self.summary.published,
            self.summary.dropped_malformed,
            self.summary.dropped_transport,
            self.summary.receive_errors
        );
        self.summary
    }
}
