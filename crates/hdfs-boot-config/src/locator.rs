//! Named lookups into a deployment's service catalog.

use std::fmt;

/// A single string property published by a bound service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyLocator {
    /// Cluster root URI the application is anchored at.
    HdfsUri,
    /// Identity used against an insecure cluster.
    HdfsUser,
    /// Kerberos principal.
    KrbUser,
    /// Kerberos secret.
    KrbPassword,
    /// Kerberos KDC host.
    KrbKdc,
    /// Kerberos realm.
    KrbRealm,
}

impl PropertyLocator {
    pub const ALL: [PropertyLocator; 6] = [
        PropertyLocator::HdfsUri,
        PropertyLocator::HdfsUser,
        PropertyLocator::KrbUser,
        PropertyLocator::KrbPassword,
        PropertyLocator::KrbKdc,
        PropertyLocator::KrbRealm,
    ];

    /// Name reported in `MissingConfiguration` errors.
    pub fn name(self) -> &'static str {
        match self {
            PropertyLocator::HdfsUri => "HDFS_URI",
            PropertyLocator::HdfsUser => "HDFS_USER",
            PropertyLocator::KrbUser => "KRB_USER",
            PropertyLocator::KrbPassword => "KRB_PASSWORD",
            PropertyLocator::KrbKdc => "KRB_KDC",
            PropertyLocator::KrbRealm => "KRB_REALM",
        }
    }

    /// Service (by catalog key, label or tag) that publishes the property.
    pub fn service(self) -> &'static str {
        match self {
            PropertyLocator::HdfsUri | PropertyLocator::HdfsUser => "hdfs",
            _ => "kerberos",
        }
    }

    /// Field inside that service's `credentials` object.
    pub fn field(self) -> &'static str {
        match self {
            PropertyLocator::HdfsUri => "uri",
            PropertyLocator::HdfsUser => "user",
            PropertyLocator::KrbUser => "kuser",
            PropertyLocator::KrbPassword => "kpassword",
            PropertyLocator::KrbKdc => "kdc",
            PropertyLocator::KrbRealm => "krealm",
        }
    }

    /// Process environment variable carrying the same value outside the
    /// catalog, where the environment-driven profile looks for it.
    pub fn env_var(self) -> &'static str {
        match self {
            PropertyLocator::HdfsUri => "HDFS_URI",
            PropertyLocator::HdfsUser => "HDFS_USER",
            PropertyLocator::KrbUser => "KERBEROS_USER",
            PropertyLocator::KrbPassword => "KERBEROS_PASS",
            PropertyLocator::KrbKdc => "KRB_KDC",
            PropertyLocator::KrbRealm => "KRB_REALM",
        }
    }
}

impl fmt::Display for PropertyLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A block of key/value configuration published by a bound service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigurationLocator {
    Hadoop,
}

impl ConfigurationLocator {
    /// Key of the object inside a service's `credentials`.
    pub fn key(self) -> &'static str {
        match self {
            ConfigurationLocator::Hadoop => "HADOOP_CONFIG_KEY",
        }
    }
}
