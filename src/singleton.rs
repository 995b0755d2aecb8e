use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::{builder::LogConfig, logger::Logger};

static INSTANCE: RwLock<Option<Arc<Logger>>> = RwLock::new(None);
// held by whoever is building the instance, so it is built once
static INIT: Mutex<()> = Mutex::new(());

/// Returns the process-wide logger, building it from the environment on
/// first use.
///
/// Every caller gets the same instance. Concurrent first callers wait for a
/// single construction to finish. Configuration is read once; later changes
/// to the environment are ignored until [`reset_for_testing`] is called.
pub fn shared() -> Arc<Logger> {
    if let Some(logger) = current() {
        return logger;
    }
    let _init = INIT.lock().unwrap_or_else(PoisonError::into_inner);
    // another caller may have finished while we waited
    if let Some(logger) = current() {
        return logger;
    }
    let logger = Arc::new(Logger::from_config(&LogConfig::from_env()));
    *INSTANCE.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&logger));
    logger
}

/// Drops the shared logger so the next [`shared`] call builds a new one from
/// the current environment.
///
/// For tests only. It does not coordinate with `shared` calls running on
/// other threads, which may still hold or return the old instance.
pub fn reset_for_testing() {
    *INSTANCE.write().unwrap_or_else(PoisonError::into_inner) = None;
}

fn current() -> Option<Arc<Logger>> {
    INSTANCE
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .as_ref()
        .map(Arc::clone)
}
