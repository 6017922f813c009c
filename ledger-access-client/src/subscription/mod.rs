//! # Subscription Engine
//!
//! Turns one server-streaming call into a pair of consumer-facing channels: a
//! bounded channel of decoded values and a single-slot error channel.
//!
//! ## Core Components
//!
//! - [`FrameSource`]: yields raw frames from an open stream, one at a time.
//! - [`FrameConverter`]: turns one frame into one domain value, or fails.
//! - [`spawn`]: starts the background worker that drives a source through a
//!   converter and returns the [`Subscription`] handle.
//! - [`CancelToken`]: the cooperative cancellation signal shared between the
//!   caller and the worker.
//!
//! ## Lifecycle
//!
//! A session ends on cancellation, when the consumer drops the value receiver,
//! on natural end-of-stream, or on the first stream or conversion error. In
//! every case the frame source is dropped and both channels close. On a
//! failure the source is dropped first, before the worker waits for the
//! consumer to take the values sent ahead of the error. At most one
//! error is ever delivered, and only after every value sent before it has been
//! taken from the value channel, so the error is always the last thing a
//! consumer observes. Cancellation never produces an error.

mod converter;
mod request;

pub use converter::{EventsConverter, ExecutionDataConverter};
pub use request::{
    EventsRequest, ExecutionDataRequest, SubscribeOptions, SubscriptionAnchor,
    DEFAULT_CHANNEL_CAPACITY, DEFAULT_HEARTBEAT_INTERVAL,
};

use crate::error::{AccessError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::ReceiverStream;

/// A source of raw frames from an open streaming call.
///
/// `recv` returns `Ok(None)` on a clean end-of-stream. The source is owned by
/// the session worker and dropped on every exit path, which releases the
/// underlying stream.
#[async_trait]
pub trait FrameSource: Send {
    type Frame: Send;

    async fn recv(&mut self) -> Result<Option<Self::Frame>>;
}

#[async_trait]
impl<T: Send + 'static> FrameSource for tonic::Streaming<T> {
    type Frame = T;

    async fn recv(&mut self) -> Result<Option<T>> {
        self.message().await.map_err(AccessError::Stream)
    }
}

#[async_trait]
impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    type Frame = S::Frame;

    async fn recv(&mut self) -> Result<Option<Self::Frame>> {
        (**self).recv().await
    }
}

/// Converts one received frame into one domain value.
///
/// Implementations are pure: a frame either converts completely or the whole
/// frame is rejected.
pub trait FrameConverter: Send + 'static {
    type Frame;
    type Value;

    fn convert(&self, frame: Self::Frame) -> Result<Self::Value>;
}

/// A clonable cancellation signal for subscriptions.
///
/// Cancelling is idempotent and observed by every clone, including workers
/// started with it.
#[derive(Debug, Clone)]
pub struct CancelToken {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Completes once the token is cancelled.
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so this only returns on cancel.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

/// The consumer side of a running session.
///
/// Values arrive in the order their frames were received. When the value
/// channel reports closure, the session is over: a pending error, if any, can
/// then be taken with [`Subscription::recv_error`].
#[derive(Debug)]
pub struct Subscription<V> {
    values: mpsc::Receiver<V>,
    errors: mpsc::Receiver<AccessError>,
}

impl<V> Subscription<V> {
    /// Receives the next value. Returns `None` once the session has ended.
    pub async fn recv(&mut self) -> Option<V> {
        self.values.recv().await
    }

    /// Receives the session's error. Returns `None` when the session ended
    /// without one.
    ///
    /// The error is published only after every value has been taken, so
    /// awaiting this before draining the values can wait indefinitely.
    pub async fn recv_error(&mut self) -> Option<AccessError> {
        self.errors.recv().await
    }

    /// Receives values until the session ends, then yields its error, if any.
    pub async fn next(&mut self) -> Option<Result<V>> {
        match self.values.recv().await {
            Some(value) => Some(Ok(value)),
            None => self.errors.recv().await.map(Err),
        }
    }

    /// Splits the subscription into its raw value and error receivers.
    pub fn into_channels(self) -> (mpsc::Receiver<V>, mpsc::Receiver<AccessError>) {
        (self.values, self.errors)
    }

    /// Returns the values as a `Stream`, along with the error receiver.
    pub fn into_stream(self) -> (ReceiverStream<V>, mpsc::Receiver<AccessError>) {
        (ReceiverStream::new(self.values), self.errors)
    }
}

/// Starts a session worker and returns immediately.
///
/// No value has necessarily been produced when this returns. `capacity` bounds
/// the value channel and is the session's only buffering; a zero capacity is
/// treated as one.
pub fn spawn<S, C>(
    source: S,
    converter: C,
    cancel: CancelToken,
    capacity: usize,
) -> Subscription<C::Value>
where
    S: FrameSource + 'static,
    C: FrameConverter<Frame = S::Frame>,
    C::Value: Send + 'static,
{
    let (values_tx, values_rx) = mpsc::channel(capacity.max(1));
    let (errors_tx, errors_rx) = mpsc::channel(1);

    let worker = Worker {
        converter,
        cancel,
        values: values_tx,
        errors: errors_tx,
    };
    tokio::spawn(worker.run(source));

    Subscription {
        values: values_rx,
        errors: errors_rx,
    }
}

enum Exit {
    Cancelled,
    ConsumerGone,
    EndOfStream,
    Failed(AccessError),
}

struct Worker<C: FrameConverter> {
    converter: C,
    cancel: CancelToken,
    values: mpsc::Sender<C::Value>,
    errors: mpsc::Sender<AccessError>,
}

impl<C> Worker<C>
where
    C: FrameConverter,
    C::Value: Send,
{
    async fn run<S>(mut self, mut source: S)
    where
        S: FrameSource<Frame = C::Frame>,
    {
        tracing::debug!("Subscription worker started.");

        let exit = self.pump(&mut source).await;
        // The stream is released before any wait for the consumer.
        drop(source);

        match exit {
            Exit::Cancelled => tracing::debug!("Subscription cancelled, shutting down."),
            Exit::ConsumerGone => {
                tracing::debug!("Subscription receiver dropped, shutting down.")
            }
            Exit::EndOfStream => tracing::info!("Subscription stream ended."),
            Exit::Failed(err) => {
                if err.is_conversion() {
                    tracing::warn!("Subscription stopped on a malformed frame: {}", err);
                } else {
                    tracing::error!("Subscription stream failed: {}", err);
                }
                self.publish_error(err).await;
            }
        }
        // Dropping `self` closes both channels.
    }

    async fn pump<S>(&mut self, source: &mut S) -> Exit
    where
        S: FrameSource<Frame = C::Frame>,
    {
        let mut received_frames: u64 = 0;
        loop {
            let received = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Exit::Cancelled,
                _ = self.values.closed() => return Exit::ConsumerGone,
                received = source.recv() => received,
            };

            let frame = match received {
                Ok(Some(frame)) => frame,
                Ok(None) => return Exit::EndOfStream,
                // Errors raised by the stream being torn down on cancel are not reported.
                Err(_) if self.cancel.is_cancelled() => return Exit::Cancelled,
                Err(err) => return Exit::Failed(err),
            };
            received_frames += 1;
            tracing::debug!(frame = received_frames, "Received subscription frame.");

            let value = match self.converter.convert(frame) {
                Ok(value) => value,
                Err(err) => return Exit::Failed(err),
            };

            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Exit::Cancelled,
                sent = self.values.send(value) => {
                    if sent.is_err() {
                        return Exit::ConsumerGone;
                    }
                }
            }
        }
    }

    async fn publish_error(&mut self, err: AccessError) {
        // Wait until the consumer has taken every value already sent. A closed
        // value receiver also completes the reservation, with an error.
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                tracing::debug!("Subscription cancelled before its error was delivered.");
                return;
            }
            drained = self.values.reserve_many(self.values.max_capacity()) => drop(drained),
        }

        if self.errors.try_send(err).is_err() {
            tracing::debug!("Subscription error receiver dropped, error discarded.");
        }
    }
}
