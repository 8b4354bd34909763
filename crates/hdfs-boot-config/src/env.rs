//! Access to environment variables behind a trait, so resolution logic can
//! be driven from a fixed map in tests.

use std::collections::BTreeMap;

/// Name/value lookup against some environment.
pub trait Environment: Send + Sync {
    /// Raw value of `key`, if set.
    fn raw_var(&self, key: &str) -> Option<String>;

    /// Value of `key`, treating an empty string the same as unset.
    fn var(&self, key: &str) -> Option<String> {
        self.raw_var(key).filter(|v| !v.is_empty())
    }
}

/// The real process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn raw_var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// A fixed set of variables.
#[derive(Debug, Default, Clone)]
pub struct MapEnvironment {
    vars: BTreeMap<String, String>,
}

impl MapEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }
}

impl Environment for MapEnvironment {
    fn raw_var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}
