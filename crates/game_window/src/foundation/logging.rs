//! Logging utilities

use std::thread;

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system
///
/// Defaults to `Info` when `RUST_LOG` is unset. Calling this twice is harmless;
/// the second logger is rejected and a warning is emitted through the first.
pub fn init() {
    let result = env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .try_init();
    if let Err(e) = result {
        log::warn!("logger already initialized: {e}");
    }
}

/// Short label for the calling thread, used by the runtime debug messages.
pub fn thread_label() -> String {
    let current = thread::current();
    match current.name() {
        Some(name) => format!("{name} ({:?})", current.id()),
        None => format!("{:?}", current.id()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_label_uses_thread_name() {
        let label = thread::Builder::new()
            .name("label-test".to_string())
            .spawn(thread_label)
            .unwrap()
            .join()
            .unwrap();
        assert!(label.starts_with("label-test ("));
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        init();
        init();
    }
}
