//! Deduplicated renderer warnings.
//!
//! Used by the tree and paint crates to report unsupported content without
//! spamming the log once per node. Messages go through the `log` facade at
//! `warn` level, so the host decides where they end up.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Global set of warnings we've already emitted (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Record `key`, returning `true` the first time it is seen.
fn first_sighting(key: String) -> bool {
    WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key)
}

/// Warn about an unsupported feature (emits once per unique message)
///
/// # Example
/// ```ignore
/// warn_once("paint", "unsupported border style 'groove', painting as solid");
/// ```
pub fn warn_once(component: &str, message: &str) {
    if first_sighting(format!("[{component}] {message}")) {
        log::warn!(target: "koala", "[Koala {component}] {message}");
    }
}

/// Clear all recorded warnings (call when painting a new document).
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warn_once_deduplicates() {
        let message = "warning-dedup-test-message";
        warn_once("test", message);
        assert!(!first_sighting(format!("[test] {message}")));
        assert!(first_sighting(format!("[other] {message}")));
    }
}
