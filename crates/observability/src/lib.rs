//! Process-wide logging setup.

/// Install the JSON tracing subscriber.
///
/// Safe to call more than once; only the first call installs anything.
pub fn init() {
    tracing::init();
}

/// Subscriber construction and filtering.
pub mod tracing;
