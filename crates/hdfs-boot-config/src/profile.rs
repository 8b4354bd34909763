//! Deployment profiles.

use std::fmt;
use std::str::FromStr;

use hdfs_boot_types::error::{BootError, Result};

use crate::env::Environment;

/// Environment variable selecting the active profile.
pub const PROFILE_ENV_VAR: &str = "HDFS_BOOT_PROFILE";

/// Which deployment context configuration and credentials come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Profile {
    /// Service catalog in `VCAP_SERVICES`.
    Cloud,
    /// Individual process environment variables plus `HADOOP_PARAMS`.
    EnvironmentDriven,
    /// In-process filesystem for development and tests.
    LocalEmbedded,
}

impl Profile {
    /// Profile named by `HDFS_BOOT_PROFILE`, or [`Profile::LocalEmbedded`]
    /// when it is unset.
    pub fn from_environment(env: &dyn Environment) -> Result<Self> {
        match env.var(PROFILE_ENV_VAR) {
            Some(name) => name.parse(),
            None => Ok(Profile::default()),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Profile::Cloud => "cloud",
            Profile::EnvironmentDriven => "environment",
            Profile::LocalEmbedded => "local",
        }
    }
}

impl Default for Profile {
    fn default() -> Self {
        Profile::LocalEmbedded
    }
}

impl FromStr for Profile {
    type Err = BootError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cloud" => Ok(Profile::Cloud),
            "environment" | "env" | "hdfs-local" => Ok(Profile::EnvironmentDriven),
            "local" | "localfs" | "embedded" | "default" => Ok(Profile::LocalEmbedded),
            other => Err(BootError::Format(format!("unknown profile '{}'", other))),
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
