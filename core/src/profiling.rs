//! Profiling support via Tracy.
//!
//! Instrumentation is enabled with the `profiling` Cargo feature:
//!
//! ```toml
//! [dependencies]
//! rigsmith-core = { version = "0.1", features = ["profiling"] }
//! ```
//!
//! The split and rig-building passes are instrumented with
//! [`profile_scope!`] and [`profile_function!`]. Connect the Tracy profiler
//! to a running process to see per-mesh timings.
//!
//! When profiling is disabled (the default), all macros compile to no-ops.

#[cfg(feature = "profiling")]
pub use tracy_client::{self, Client, Span, span};

/// Create a profiling span for the current scope.
///
/// The span ends when the scope exits.
///
/// # Example
///
/// ```ignore
/// fn build() {
///     {
///         profile_scope!("remap_scan");
///         // ...
///     }
/// }
/// ```
#[macro_export]
#[cfg(feature = "profiling")]
macro_rules! profile_scope {
    ($name:expr) => {
        let _profile_span = $crate::profiling::span!($name);
    };
}

/// Create a profiling span (no-op when profiling disabled).
#[macro_export]
#[cfg(not(feature = "profiling"))]
macro_rules! profile_scope {
    ($name:expr) => {};
}

/// Create a profiling span for the entire function.
#[macro_export]
#[cfg(feature = "profiling")]
macro_rules! profile_function {
    () => {
        let _profile_span = $crate::profiling::span!();
    };
}

/// Create a profiling span for function (no-op when profiling disabled).
#[macro_export]
#[cfg(not(feature = "profiling"))]
macro_rules! profile_function {
    () => {};
}

/// Start the Tracy client. Does nothing unless profiling is enabled.
pub fn init_profiling() {
    #[cfg(feature = "profiling")]
    {
        Client::start();
        log::info!("Tracy profiling enabled");
    }
}
