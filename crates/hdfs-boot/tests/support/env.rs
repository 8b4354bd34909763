#![allow(dead_code)]

use std::env;
use std::sync::{Mutex, MutexGuard, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

/// RAII guard that serialises process environment mutations for tests.
/// Holds the lock for its whole lifetime, so set every variable a test
/// needs through one guard.
pub struct EnvVarGuard {
    originals: Vec<(&'static str, Option<String>)>,
    _lock: MutexGuard<'static, ()>,
}

impl EnvVarGuard {
    fn acquire_lock() -> MutexGuard<'static, ()> {
        ENV_LOCK
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Applies each `(key, Some(value))` as a set and each `(key, None)` as
    /// a removal; the original values come back on drop.
    pub fn apply(vars: &[(&'static str, Option<&str>)]) -> Self {
        let lock = Self::acquire_lock();
        let mut originals = Vec::with_capacity(vars.len());
        for (key, value) in vars {
            originals.push((*key, env::var(key).ok()));
            match value {
                Some(v) => env::set_var(key, v),
                None => env::remove_var(key),
            }
        }
        Self {
            originals,
            _lock: lock,
        }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        for (key, original) in self.originals.iter().rev() {
            match original {
                Some(value) => env::set_var(key, value),
                None => env::remove_var(key),
            }
        }
    }
}
