//! Cooperative cancellation for long per-vertex scans.
//!
//! The pipeline is synchronous, so cancellation is polled: expensive loops
//! call [`CancellationToken::check`] before they start and propagate the
//! [`Cancelled`] error with `?`.
//!
//! # Example
//!
//! ```
//! use rigsmith_core::cancellation::{CancellationToken, Cancelled};
//!
//! fn scan(token: &CancellationToken, data: &[u32]) -> Result<u32, Cancelled> {
//!     token.check()?;
//!     Ok(data.iter().sum())
//! }
//!
//! let token = CancellationToken::new();
//! assert_eq!(scan(&token, &[1, 2, 3]), Ok(6));
//! token.cancel();
//! assert_eq!(scan(&token, &[1, 2, 3]), Err(Cancelled));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Error returned when an operation observes a cancelled token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("operation cancelled")]
pub struct Cancelled;

/// Token that signals cancellation to cooperative operations.
///
/// Cloning a token creates another handle to the same cancellation flag.
/// Calling [`cancel()`](CancellationToken::cancel) on any clone affects all.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a new cancellation token (not cancelled).
    pub fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Signals cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Returns whether cancellation has been signalled.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Returns `Err(Cancelled)` once cancellation has been signalled.
    pub fn check(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Checks an optional token; `None` never cancels.
pub fn checkpoint(token: Option<&CancellationToken>) -> Result<(), Cancelled> {
    match token {
        Some(token) => token.check(),
        None => Ok(()),
    }
}
