//! # One-Shot Settlement
//!
//! The minimal future abstraction through which a build result is handed
//! to the owning initialization sequence: a producer handle that may be
//! settled (resolved or rejected) exactly once, and a consumer handle that
//! can be polled non-blockingly or awaited cooperatively.
//!
//! Built on `tokio::sync::oneshot`. The build pipeline itself never
//! suspends; suspension happens only at the caller boundary, between
//! whatever asynchronous work preceded configuration and the settlement of
//! the result.

use thiserror::Error;
use tokio::sync::oneshot;

/// One-shot settlement protocol violations.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleError {
    /// The producer side was already settled once.
    #[error("settlement already completed")]
    AlreadySettled,

    /// The other side of the channel was dropped before settlement.
    #[error("settlement abandoned before completion")]
    Abandoned,
}

/// Create a linked producer/consumer settlement pair.
pub fn channel<T, E>() -> (Completer<T, E>, Settlement<T, E>) {
    let (tx, rx) = oneshot::channel();
    (
        Completer { tx: Some(tx) },
        Settlement {
            rx: Some(rx),
            outcome: None,
        },
    )
}

/// The producer handle. May be settled exactly once.
#[derive(Debug)]
pub struct Completer<T, E> {
    tx: Option<oneshot::Sender<Result<T, E>>>,
}

impl<T, E> Completer<T, E> {
    /// Settle with a success value.
    ///
    /// # Errors
    ///
    /// [`SettleError::AlreadySettled`] on a second settlement attempt;
    /// [`SettleError::Abandoned`] if the consumer was dropped.
    pub fn resolve(&mut self, value: T) -> Result<(), SettleError> {
        self.settle(Ok(value))
    }

    /// Settle with a failure value.
    ///
    /// # Errors
    ///
    /// Same as [`Completer::resolve`].
    pub fn reject(&mut self, error: E) -> Result<(), SettleError> {
        self.settle(Err(error))
    }

    /// Whether this handle has already been settled.
    pub fn is_settled(&self) -> bool {
        self.tx.is_none()
    }

    fn settle(&mut self, outcome: Result<T, E>) -> Result<(), SettleError> {
        let tx = self.tx.take().ok_or(SettleError::AlreadySettled)?;
        tx.send(outcome).map_err(|_| SettleError::Abandoned)
    }
}

/// The consumer handle. Supports non-blocking polling and cooperative
/// await.
#[derive(Debug)]
pub struct Settlement<T, E> {
    rx: Option<oneshot::Receiver<Result<T, E>>>,
    outcome: Option<Result<T, E>>,
}

impl<T, E> Settlement<T, E> {
    /// Non-blocking completion check. Returns `Ok(true)` once the producer
    /// has settled; the outcome is buffered for [`Settlement::take`].
    ///
    /// # Errors
    ///
    /// [`SettleError::Abandoned`] if the producer was dropped without
    /// settling.
    pub fn poll(&mut self) -> Result<bool, SettleError> {
        if self.outcome.is_some() {
            return Ok(true);
        }
        let Some(rx) = self.rx.as_mut() else {
            // The outcome was already taken.
            return Ok(true);
        };
        match rx.try_recv() {
            Ok(outcome) => {
                self.outcome = Some(outcome);
                self.rx = None;
                Ok(true)
            }
            Err(oneshot::error::TryRecvError::Empty) => Ok(false),
            Err(oneshot::error::TryRecvError::Closed) => Err(SettleError::Abandoned),
        }
    }

    /// Move out the buffered outcome, if [`Settlement::poll`] observed one.
    pub fn take(&mut self) -> Option<Result<T, E>> {
        self.outcome.take()
    }

    /// Suspend until the producer settles, then return the outcome.
    ///
    /// # Errors
    ///
    /// [`SettleError::Abandoned`] if the producer was dropped without
    /// settling.
    pub async fn wait(mut self) -> Result<Result<T, E>, SettleError> {
        if let Some(outcome) = self.outcome.take() {
            return Ok(outcome);
        }
        let rx = self.rx.take().ok_or(SettleError::AlreadySettled)?;
        rx.await.map_err(|_| SettleError::Abandoned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_then_second_settlement_is_an_error() {
        let (mut tx, mut rx) = channel::<u32, String>();
        assert!(!tx.is_settled());
        tx.resolve(7).unwrap();
        assert!(tx.is_settled());
        assert_eq!(tx.resolve(8), Err(SettleError::AlreadySettled));
        assert_eq!(
            tx.reject("late".to_string()),
            Err(SettleError::AlreadySettled)
        );

        assert_eq!(rx.poll(), Ok(true));
        assert_eq!(rx.take(), Some(Ok(7)));
    }

    #[test]
    fn poll_is_pending_until_settled() {
        let (mut tx, mut rx) = channel::<u32, String>();
        assert_eq!(rx.poll(), Ok(false));
        assert_eq!(rx.take(), None);
        tx.reject("bad".to_string()).unwrap();
        assert_eq!(rx.poll(), Ok(true));
        assert_eq!(rx.take(), Some(Err("bad".to_string())));
    }

    #[test]
    fn dropped_producer_is_abandonment() {
        let (tx, mut rx) = channel::<u32, String>();
        drop(tx);
        assert_eq!(rx.poll(), Err(SettleError::Abandoned));
    }

    #[test]
    fn settling_after_consumer_dropped_is_abandonment() {
        let (mut tx, rx) = channel::<u32, String>();
        drop(rx);
        assert_eq!(tx.resolve(1), Err(SettleError::Abandoned));
    }

    #[tokio::test]
    async fn wait_returns_the_outcome() {
        let (mut tx, rx) = channel::<u32, String>();
        tx.resolve(42).unwrap();
        assert_eq!(rx.wait().await, Ok(Ok(42)));
    }

    #[tokio::test]
    async fn wait_after_poll_uses_the_buffered_outcome() {
        let (mut tx, mut rx) = channel::<u32, String>();
        tx.resolve(9).unwrap();
        assert_eq!(rx.poll(), Ok(true));
        assert_eq!(rx.wait().await, Ok(Ok(9)));
    }

    #[tokio::test]
    async fn wait_on_dropped_producer_is_abandonment() {
        let (tx, rx) = channel::<u32, String>();
        drop(tx);
        assert_eq!(rx.wait().await, Err(SettleError::Abandoned));
    }
}
