use std::future::Future;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::Result;

/// Lock a mutex, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Loading/error bookkeeping shared by every async operation of a view.
///
/// `loading` is reference counted, so overlapping operations keep it set until
/// the last one finishes. Each operation also takes a generation number; only
/// the newest generation may commit results or report errors.
#[derive(Debug, Default)]
pub struct AsyncState {
    in_flight: AtomicUsize,
    generation: AtomicU64,
    error: Mutex<Option<String>>,
}

/// Held for the duration of one operation. Dropping it ends the operation,
/// whichever way the operation exits.
#[derive(Debug)]
pub struct Ticket<'a> {
    state: &'a AsyncState,
    generation: u64,
}

impl Ticket<'_> {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self) -> bool {
        self.state.generation.load(Ordering::SeqCst) == self.generation
    }
}

impl Drop for Ticket<'_> {
    fn drop(&mut self) {
        self.state.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

impl AsyncState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start an operation: mark loading, clear the error and supersede every
    /// operation started earlier.
    pub fn begin(&self) -> Ticket<'_> {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *lock(&self.error) = None;
        Ticket {
            state: self,
            generation,
        }
    }

    pub fn loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    pub fn error(&self) -> Option<String> {
        lock(&self.error).clone()
    }

    pub fn set_error(&self, message: impl Into<String>) {
        *lock(&self.error) = Some(message.into());
    }

    pub fn clear_error(&self) {
        *lock(&self.error) = None;
    }

    /// Run `operation` as one tracked operation. Failures land in `error`;
    /// results from a superseded generation are dropped.
    pub async fn execute<T, F>(&self, operation: F) -> Option<T>
    where
        F: Future<Output = Result<T>>,
    {
        let ticket = self.begin();
        let result = operation.await;
        if !ticket.is_current() {
            tracing::debug!(generation = ticket.generation(), "discarding stale result");
            return None;
        }
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.set_error(e.to_string());
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DexError;

    #[tokio::test]
    async fn execute_returns_value_and_clears_loading() {
        let state = AsyncState::new();
        let value = state.execute(async { Ok::<_, DexError>(42) }).await;
        assert_eq!(value, Some(42));
        assert!(!state.loading());
        assert_eq!(state.error(), None);
    }

    #[tokio::test]
    async fn execute_records_error_message() {
        let state = AsyncState::new();
        let value: Option<u8> = state
            .execute(async { Err(DexError::Network("Network error".into())) })
            .await;
        assert_eq!(value, None);
        assert_eq!(state.error().as_deref(), Some("Network error"));
        assert!(!state.loading());
    }

    #[tokio::test]
    async fn begin_clears_previous_error() {
        let state = AsyncState::new();
        state.set_error("boom");
        let _ticket = state.begin();
        assert_eq!(state.error(), None);
        assert!(state.loading());
    }

    #[test]
    fn loading_is_reference_counted() {
        let state = AsyncState::new();
        let first = state.begin();
        let second = state.begin();
        drop(first);
        assert!(state.loading());
        drop(second);
        assert!(!state.loading());
    }

    #[test]
    fn newer_ticket_supersedes_older() {
        let state = AsyncState::new();
        let first = state.begin();
        let second = state.begin();
        assert!(!first.is_current());
        assert!(second.is_current());
    }

    #[test]
    fn clear_error_only_touches_error() {
        let state = AsyncState::new();
        let _ticket = state.begin();
        state.set_error("boom");
        state.clear_error();
        assert_eq!(state.error(), None);
        assert!(state.loading());
    }
}
