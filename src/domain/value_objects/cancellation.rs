//! Cooperative cancellation flag shared by every file of a batch

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared "is cancelling" flag.
///
/// Batches check it once before each file; an in-flight transfer is never
/// interrupted. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of every batch holding this flag
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelling(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Clear the flag so it can be reused for the next operation
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let flag = CancellationFlag::new();
        let other = flag.clone();
        assert!(!other.is_cancelling());

        flag.cancel();
        assert!(other.is_cancelling());

        other.reset();
        assert!(!flag.is_cancelling());
    }
}
