//! Filesystem clients and the authenticated acquisition of them.
//!
//! [`ClientFactory`] is the entry point: it consults the
//! [`AuthenticationGate`], opens a [`FileSystem`] through a
//! [`FileSystemConnector`] and anchors it at the target directory,
//! producing a [`ClientHandle`].

pub mod auth;
pub mod connector;
pub mod embedded;
pub mod factory;
#[cfg(all(test, feature = "webhdfs"))]
mod fake_namenode;
pub mod handle;
pub mod kinit;
pub mod local_fs;
pub mod target;
pub mod vfs;
pub mod webhdfs_fs;

pub use auth::{
    requires_authentication, AuthenticatedIdentity, AuthenticationContext, AuthenticationGate,
    KerberosLogin,
};
pub use connector::{DefaultConnector, FileSystemConnector};
pub use embedded::EmbeddedCluster;
pub use factory::ClientFactory;
pub use handle::ClientHandle;
pub use kinit::KinitLogin;
pub use local_fs::LocalFileSystem;
pub use target::TargetLocation;
pub use vfs::{FileStatus, FileSystem, ReadableFile, WritableFile};
#[cfg(feature = "webhdfs")]
pub use webhdfs_fs::WebHdfsFileSystem;
pub use webhdfs_fs::{WebHdfsAuth, WebHdfsEndpoint};
