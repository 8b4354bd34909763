//! Bootstrap of an authenticated, directory-anchored filesystem client.
//!
//! ```no_run
//! let handle = hdfs_boot::bootstrap_from_env()?;
//! for entry in handle.file_system().list_status(".")? {
//!     println!("{}", entry.path);
//! }
//! # Ok::<(), hdfs_boot::BootError>(())
//! ```

pub mod resolver;

pub use hdfs_boot_config::{CredentialSource, Credentials, Environment, MapEnvironment, Profile, RawConfig};
pub use hdfs_boot_io::{
    AuthenticationContext, AuthenticationGate, ClientFactory, ClientHandle, FileSystem,
    FileSystemConnector, KerberosLogin,
};
pub use hdfs_boot_types::error::{BootError, BootErrorKind, Result};
pub use resolver::Bootstrapper;

/// Bootstrap `profile` against the real process environment.
pub fn bootstrap(profile: Profile) -> Result<ClientHandle> {
    Bootstrapper::from_process_env().bootstrap(profile)
}

/// Bootstrap the profile named by `HDFS_BOOT_PROFILE`.
pub fn bootstrap_from_env() -> Result<ClientHandle> {
    Bootstrapper::from_process_env().bootstrap_default()
}
