//! QuitSignal - one-shot cancellation shared by the main loop and presenters

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Edge-triggered quit request
///
/// Raised by Ctrl+C, a frame or duration limit, or a presenter. Once raised it stays
/// raised; the main loop polls it once per cycle.
#[derive(Debug, Clone, Default)]
pub struct QuitSignal(Arc<AtomicBool>);

impl QuitSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a quit. Returns true for the call that raised it first.
    pub fn raise(&self) -> bool {
        !self.0.swap(true, Ordering::AcqRel)
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raise_is_shared_and_sticky() {
        let quit = QuitSignal::new();
        let other = quit.clone();
        assert!(!other.is_raised());

        assert!(quit.raise());
        assert!(!other.raise());
        assert!(other.is_raised());
        assert!(quit.is_raised());
    }
}
