//! Shared types for the feed host.
//!
//! This module defines:
//! - `StopHandle`: a cloneable stop flag shared by adapters and `main`
//! - `MessageSink`: what an adapter hands each raw message to

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use book_core::BookError;

/// Cooperative stop flag.
///
/// Adapters check it between messages; `main` trips it on Ctrl-C.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        StopHandle::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Receiver of raw messages, one call per unit of input.
///
/// An `Err` is scoped to that one message; the adapter logs it and
/// carries on with the next.
pub trait MessageSink {
    fn on_message(&mut self, raw: &str) -> Result<(), BookError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_flag() {
        let handle = StopHandle::new();
        let other = handle.clone();
        assert!(!other.is_stopped());
        handle.stop();
        assert!(other.is_stopped());
    }
}
