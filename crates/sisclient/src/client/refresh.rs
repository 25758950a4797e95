//! Single-flight coordination for token refresh.
//!
//! The gate is an explicit state machine, `Idle -> RefreshInFlight -> Idle`.
//! The first request to hit a 401 becomes the initiator; requests arriving
//! while a refresh is outstanding enqueue a continuation and share the
//! initiator's outcome. Waiters are released in arrival order.

use crate::error::ApiError;
use tokio::sync::{oneshot, Mutex};

type RefreshResult = Result<String, ApiError>;

/// Role assigned to a request entering the refresh protocol.
pub(crate) enum RefreshRole {
    /// This request performs the refresh network call.
    Initiator,
    /// A refresh is already in flight; await its outcome.
    Waiter(oneshot::Receiver<RefreshResult>),
}

#[derive(Default)]
struct GateState {
    in_flight: bool,
    waiters: Vec<oneshot::Sender<RefreshResult>>,
}

/// Process-wide guard ensuring at most one refresh call is outstanding.
pub(crate) struct RefreshGate {
    state: Mutex<GateState>,
}

impl RefreshGate {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(GateState::default()),
        }
    }

    /// Enters the protocol, either claiming the initiator role or joining
    /// the FIFO waiter queue.
    pub async fn begin(&self) -> RefreshRole {
        let mut state = self.state.lock().await;
        if state.in_flight {
            let (tx, rx) = oneshot::channel();
            state.waiters.push(tx);
            RefreshRole::Waiter(rx)
        } else {
            state.in_flight = true;
            RefreshRole::Initiator
        }
    }

    /// Settles the in-flight refresh and releases every waiter, in arrival
    /// order, with a clone of the outcome.
    pub async fn finish(&self, outcome: &RefreshResult) {
        let waiters = {
            let mut state = self.state.lock().await;
            state.in_flight = false;
            std::mem::take(&mut state.waiters)
        };
        for waiter in waiters {
            // A waiter may have been cancelled; nothing to do then.
            let _ = waiter.send(outcome.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn second_entrant_becomes_waiter() {
        let gate = RefreshGate::new();
        let first = gate.begin().await;
        assert!(matches!(first, RefreshRole::Initiator));

        let second = gate.begin().await;
        let RefreshRole::Waiter(rx) = second else {
            panic!("expected waiter role while refresh is in flight");
        };

        gate.finish(&Ok("new-token".to_string())).await;
        assert_eq!(rx.await.unwrap().unwrap(), "new-token");
    }

    #[tokio::test]
    async fn gate_reopens_after_finish() {
        let gate = RefreshGate::new();
        let _ = gate.begin().await;
        gate.finish(&Err(ApiError::MissingRefreshToken)).await;
        assert!(matches!(gate.begin().await, RefreshRole::Initiator));
    }

    #[tokio::test]
    async fn waiters_released_in_arrival_order() {
        let gate = RefreshGate::new();
        let _ = gate.begin().await;

        let mut receivers = Vec::new();
        for _ in 0..3 {
            match gate.begin().await {
                RefreshRole::Waiter(rx) => receivers.push(rx),
                RefreshRole::Initiator => panic!("refresh already in flight"),
            }
        }

        gate.finish(&Ok("token".to_string())).await;
        for rx in receivers {
            assert_eq!(rx.await.unwrap().unwrap(), "token");
        }
    }
}
