//! Client acquisition: authenticate when the cluster demands it, open the
//! client, anchor it at the target working directory.

use std::path::Path;
use std::sync::Arc;

use hdfs_boot_config::raw_config::EMBEDDED_BASEDIR_KEY;
use hdfs_boot_config::{Credentials, RawConfig};
use hdfs_boot_types::error::{BootError, Result};

use crate::auth::{AuthenticationContext, AuthenticationGate};
use crate::connector::{DefaultConnector, FileSystemConnector};
use crate::embedded::EmbeddedCluster;
use crate::handle::ClientHandle;
use crate::target::TargetLocation;
use crate::vfs::FileSystem;

pub struct ClientFactory {
    gate: AuthenticationGate,
    connector: Box<dyn FileSystemConnector>,
}

impl ClientFactory {
    pub fn new(gate: AuthenticationGate, connector: Box<dyn FileSystemConnector>) -> Self {
        ClientFactory { gate, connector }
    }

    /// `kinit` for authentication, [`DefaultConnector`] for clients.
    pub fn with_defaults() -> Self {
        Self::new(AuthenticationGate::with_kinit(), Box::new(DefaultConnector))
    }

    pub fn gate(&self) -> &AuthenticationGate {
        &self.gate
    }

    /// Authenticate if needed and open a client, without touching the
    /// working directory.
    ///
    /// On a Kerberos cluster the login runs first and the client is opened
    /// from the configuration alone, as the identity installed in `ctx`.
    /// Otherwise the client is opened for `target` as `acting_user`.
    pub fn connect(
        &self,
        config: &RawConfig,
        target: &str,
        acting_user: Option<&str>,
        credentials: Option<&Credentials>,
        ctx: &mut AuthenticationContext,
    ) -> Result<(Box<dyn FileSystem>, TargetLocation)> {
        if self.gate.requires_authentication(config) {
            log::info!("Cluster is secured by kerberos");
            self.gate.login(credentials, ctx)?;
            let location = TargetLocation::parse(target)?;
            let identity = ctx.identity().ok_or_else(|| {
                BootError::ClientAcquisition("no authenticated identity installed".to_string())
            })?;
            let fs = self.connector.connect_secure(config, identity)?;
            if !location.is_served_by(&fs.uri()) {
                log::error!(
                    "Authenticated client for {} cannot serve {}",
                    fs.uri(),
                    location
                );
                return Err(BootError::ClientAcquisition(format!(
                    "wrong filesystem: {} is not served by {}",
                    location,
                    fs.uri()
                )));
            }
            return Ok((fs, location));
        }

        let location = TargetLocation::parse(target)?;
        let user = acting_user.filter(|u| !u.is_empty()).ok_or_else(|| {
            log::error!("Insecure file system needs a valid user name");
            BootError::MissingConfiguration("HDFS_USER".to_string())
        })?;
        log::debug!("Opening {} as {}", location, user);
        let fs = self.connector.connect_insecure(&location, config, user)?;
        Ok((fs, location))
    }

    /// Full acquisition for a cluster endpoint.
    pub fn acquire(
        &self,
        config: &RawConfig,
        target: &str,
        acting_user: Option<&str>,
        credentials: Option<&Credentials>,
        ctx: &mut AuthenticationContext,
    ) -> Result<ClientHandle> {
        let (fs, location) = self.connect(config, target, acting_user, credentials, ctx)?;
        let user = match acting_user.filter(|u| !u.is_empty()) {
            Some(u) => u.to_string(),
            None => ctx
                .identity()
                .map(|id| id.short_name().to_string())
                .unwrap_or_default(),
        };
        anchor(fs, &location, user, None)
    }

    /// Full acquisition against a fresh in-process cluster rooted at
    /// `hdfs.minidfs.basedir`, or at a synthesized temporary directory when
    /// the key is unset.
    pub fn acquire_embedded(
        &self,
        config: &RawConfig,
        acting_user: &str,
        credentials: Option<&Credentials>,
        ctx: &mut AuthenticationContext,
    ) -> Result<ClientHandle> {
        if self.gate.requires_authentication(config) {
            self.gate.login(credentials, ctx)?;
        }
        let folder = config
            .get(EMBEDDED_BASEDIR_KEY)
            .filter(|d| !d.is_empty())
            .map(Path::new);
        let cluster = EmbeddedCluster::start(folder)?;
        let fs = cluster.file_system()?;
        let location = TargetLocation::Local(cluster.base_dir().to_path_buf());
        anchor(
            Box::new(fs),
            &location,
            acting_user.to_string(),
            Some(Arc::new(cluster)),
        )
    }
}

/// Ensure the working directory exists, make it current, wrap it all up.
fn anchor(
    mut fs: Box<dyn FileSystem>,
    location: &TargetLocation,
    acting_user: String,
    service: Option<Arc<EmbeddedCluster>>,
) -> Result<ClientHandle> {
    let dir = location.path();
    if !fs.exists(&dir)? {
        log::info!("Creating working directory {}", location);
        fs.mkdirs(&dir)?;
    }
    fs.set_working_directory(&dir)?;
    Ok(ClientHandle::new(fs, acting_user, location.to_string(), service))
}
