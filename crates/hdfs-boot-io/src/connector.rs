//! Client acquisition against a concrete filesystem endpoint.

use hdfs_boot_config::raw_config::{DEFAULT_FS_KEY, DELEGATION_TOKEN_KEY};
use hdfs_boot_config::RawConfig;
use hdfs_boot_types::error::{BootError, Result};
use url::Url;

use crate::auth::AuthenticatedIdentity;
use crate::local_fs::LocalFileSystem;
use crate::target::TargetLocation;
use crate::vfs::FileSystem;
use crate::webhdfs_fs::WebHdfsAuth;

/// Opens filesystem clients. The secure path only ever runs with an
/// identity produced by a successful login.
pub trait FileSystemConnector: Send + Sync {
    /// Client for the configuration's default filesystem, acting as the
    /// authenticated identity.
    fn connect_secure(
        &self,
        config: &RawConfig,
        identity: &AuthenticatedIdentity,
    ) -> Result<Box<dyn FileSystem>>;

    /// Client for the filesystem named by `target`, acting as `user`.
    fn connect_insecure(
        &self,
        target: &TargetLocation,
        config: &RawConfig,
        user: &str,
    ) -> Result<Box<dyn FileSystem>>;
}

/// Dispatches on scheme: `file` to the local filesystem, the HDFS family
/// to WebHDFS.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultConnector;

impl FileSystemConnector for DefaultConnector {
    fn connect_secure(
        &self,
        config: &RawConfig,
        identity: &AuthenticatedIdentity,
    ) -> Result<Box<dyn FileSystem>> {
        let default_fs = config.get(DEFAULT_FS_KEY).unwrap_or("file:///");
        match TargetLocation::parse(default_fs)? {
            TargetLocation::Local(_) => Ok(Box::new(LocalFileSystem::new()?)),
            TargetLocation::Remote(url) => {
                let token = config
                    .get(DELEGATION_TOKEN_KEY)
                    .filter(|t| !t.is_empty())
                    .ok_or_else(|| {
                        log::error!(
                            "Secure WebHDFS access to {} as {} needs {}",
                            url,
                            identity.principal(),
                            DELEGATION_TOKEN_KEY
                        );
                        BootError::ClientAcquisition(format!(
                            "{} is not configured; a kerberos ticket alone cannot authenticate WebHDFS requests",
                            DELEGATION_TOKEN_KEY
                        ))
                    })?;
                let auth = WebHdfsAuth::Kerberos {
                    principal: identity.principal().to_string(),
                    user: identity.short_name().to_string(),
                    delegation: token.to_string(),
                };
                connect_webhdfs(&url, config, auth)
            }
        }
    }

    fn connect_insecure(
        &self,
        target: &TargetLocation,
        config: &RawConfig,
        user: &str,
    ) -> Result<Box<dyn FileSystem>> {
        match target {
            TargetLocation::Local(_) => Ok(Box::new(LocalFileSystem::new()?)),
            TargetLocation::Remote(url) => {
                let auth = WebHdfsAuth::Simple {
                    user: user.to_string(),
                };
                connect_webhdfs(url, config, auth)
            }
        }
    }
}

fn connect_webhdfs(url: &Url, config: &RawConfig, auth: WebHdfsAuth) -> Result<Box<dyn FileSystem>> {
    match url.scheme() {
        "hdfs" | "webhdfs" | "swebhdfs" | "http" | "https" => {}
        other => {
            return Err(BootError::ClientAcquisition(format!(
                "unsupported filesystem scheme '{}'",
                other
            )))
        }
    }

    #[cfg(feature = "webhdfs")]
    {
        let endpoint = crate::webhdfs_fs::WebHdfsEndpoint::resolve(url, config)?;
        Ok(Box::new(crate::webhdfs_fs::WebHdfsFileSystem::connect(
            endpoint, auth,
        )?))
    }

    #[cfg(not(feature = "webhdfs"))]
    {
        let _ = (config, auth);
        Err(BootError::ClientAcquisition(
            "built without the webhdfs feature".to_string(),
        ))
    }
}
