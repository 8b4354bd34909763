//! Hadoop-style key/value configuration.

use std::collections::BTreeMap;
use std::fmt;

/// Key holding the cluster security mode.
pub const SECURITY_AUTHENTICATION_KEY: &str = "hadoop.security.authentication";
/// Default filesystem URI, used by the secure acquisition path.
pub const DEFAULT_FS_KEY: &str = "fs.defaultFS";
/// Namenode HTTP address (`host:port`) for WebHDFS.
pub const NAMENODE_HTTP_ADDRESS_KEY: &str = "dfs.namenode.http-address";
/// `HTTPS_ONLY` switches WebHDFS requests to https.
pub const HTTP_POLICY_KEY: &str = "dfs.http.policy";
/// Delegation token forwarded on secure WebHDFS requests.
pub const DELEGATION_TOKEN_KEY: &str = "dfs.webhdfs.delegation.token";
/// Base directory of the embedded filesystem.
pub const EMBEDDED_BASEDIR_KEY: &str = "hdfs.minidfs.basedir";

const DEFAULTS: &[(&str, &str)] = &[
    (SECURITY_AUTHENTICATION_KEY, "simple"),
    (DEFAULT_FS_KEY, "file:///"),
];

/// Ordered, immutable mapping of configuration keys to values.
///
/// New configurations are derived with [`RawConfig::merged`] and
/// [`RawConfig::with`]; an existing value is never mutated in place.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RawConfig {
    entries: BTreeMap<String, String>,
}

impl RawConfig {
    /// A configuration with no keys at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in defaults every cluster configuration starts from.
    pub fn defaults() -> Self {
        DEFAULTS.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    /// A new configuration with `overrides` laid on top of `self`.
    /// Overrides win on conflicting keys.
    pub fn merged<I, K, V>(&self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut entries = self.entries.clone();
        for (k, v) in overrides {
            entries.insert(k.into(), v.into());
        }
        RawConfig { entries }
    }

    /// A new configuration with a single key set.
    pub fn with(&self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let (key, value): (String, String) = (key.into(), value.into());
        self.merged([(key, value)])
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawConfig {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        RawConfig::empty().merged(iter)
    }
}

impl fmt::Debug for RawConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}
