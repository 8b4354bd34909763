//! Configuration sources for the filesystem bootstrap.
//!
//! Raw Hadoop-style key/value configuration and credentials are resolved
//! from whichever deployment context is active:
//!
//! - **cloud**: `VCAP_SERVICES` holds a JSON service catalog. The `hdfs`
//!   service supplies the target URI and user plus a `HADOOP_CONFIG_KEY`
//!   block of configuration overrides; the `kerberos` service supplies
//!   principal, secret, KDC and realm.
//! - **environment**: `HADOOP_PARAMS` holds a JSON object of overrides;
//!   `HDFS_URI`, `HDFS_USER`, `KERBEROS_USER`, `KERBEROS_PASS`, `KRB_KDC`
//!   and `KRB_REALM` are read individually.
//! - **local**: nothing external; `FOLDER` optionally pins the directory of
//!   the embedded filesystem.
//!
//! The active profile is chosen by `HDFS_BOOT_PROFILE` (default `local`).

pub mod catalog;
pub mod credentials;
pub mod env;
pub mod locator;
pub mod profile;
pub mod raw_config;
pub mod source;

pub use catalog::ServiceCatalog;
pub use credentials::Credentials;
pub use env::{Environment, MapEnvironment, ProcessEnvironment};
pub use locator::{ConfigurationLocator, PropertyLocator};
pub use profile::Profile;
pub use raw_config::RawConfig;
pub use source::CredentialSource;
