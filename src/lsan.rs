//! Allocation-ledger leak diagnostics for Kestrel-compiled programs.
//!
//! The runtime hands heap strings to generated code and never reclaims them
//! on its own; whether they are ever released is the compiler's business.
//! With tracking active, every outgoing allocation is recorded in a ledger
//! and removed again by `__freeString`, so a report at program end shows
//! exactly what generated code leaked.
//!
//! Activated by `__lsan_init()`, which the entrypoint calls before any other
//! runtime call when leak checking is requested at compile time, or from
//! process start under the `debug_runtime` cargo feature.
//!
//! ## Detection capabilities
//!
//! - **Leaks**: outstanding allocations (count and bytes) via `__lsan_report`.
//! - **Double-free / wild free**: `__freeString` on a pointer absent from
//!   the ledger aborts with a diagnostic.

use std::ffi::{c_char, c_int};
use std::io::{self, Write};
use std::process;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashMap;

/// Global flag: tracking is active.
static LSAN_ENABLED: AtomicBool = AtomicBool::new(cfg!(feature = "debug_runtime"));

/// Ledger of outstanding caller-owned allocations: address → byte length.
static LEDGER: LazyLock<DashMap<usize, usize>> = LazyLock::new(DashMap::new);

/// Check whether tracking is currently active.
#[inline]
pub fn is_enabled() -> bool {
    LSAN_ENABLED.load(Ordering::Relaxed)
}

/// Activate allocation tracking.
///
/// Allocations handed out before activation are unknown to the ledger, so
/// this must run before generated code obtains any string it intends to
/// release.
#[unsafe(export_name = "__lsan_init")]
pub extern "C" fn lsan_init() {
    LSAN_ENABLED.store(true, Ordering::SeqCst);
}

/// Write a summary of outstanding allocations to stderr and return their
/// count.
#[unsafe(export_name = "__lsan_report")]
pub extern "C" fn lsan_report() -> c_int {
    let count = outstanding();
    let bytes: usize = LEDGER.iter().map(|entry| *entry.value()).sum();
    let _ = writeln!(
        io::stderr(),
        "==KestrelLSan: {count} outstanding string allocation(s), {bytes} byte(s)"
    );
    count as c_int
}

/// Record an allocation handed to generated code.
pub(crate) fn record(ptr: *const c_char, len: usize) {
    if !is_enabled() {
        return;
    }
    LEDGER.insert(ptr as usize, len);
}

/// Remove a released allocation from the ledger.
///
/// Aborts if tracking is active and the pointer was never recorded: the
/// caller is releasing something this runtime did not hand out, or is
/// releasing it twice.
pub(crate) fn forget(ptr: *const c_char) {
    if !is_enabled() {
        return;
    }
    if LEDGER.remove(&(ptr as usize)).is_none() {
        let _ = writeln!(
            io::stderr(),
            "==ERROR: KestrelLSan: invalid free of {ptr:p} (not a live runtime allocation)"
        );
        process::abort();
    }
}

/// Number of outstanding tracked allocations.
pub(crate) fn outstanding() -> usize {
    LEDGER.len()
}

/// Enable tracking with a clean ledger; the guard restores the build's
/// default state on drop. Tests using this must be serialized.
#[cfg(test)]
pub(crate) fn tests_enable() -> TrackingGuard {
    LEDGER.clear();
    LSAN_ENABLED.store(true, Ordering::SeqCst);
    TrackingGuard
}

#[cfg(test)]
pub(crate) struct TrackingGuard;

#[cfg(test)]
impl Drop for TrackingGuard {
    fn drop(&mut self) {
        LSAN_ENABLED.store(cfg!(feature = "debug_runtime"), Ordering::SeqCst);
        LEDGER.clear();
    }
}
