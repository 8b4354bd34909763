//! Profile-driven bootstrap.

use std::sync::Arc;

use hdfs_boot_config::raw_config::EMBEDDED_BASEDIR_KEY;
use hdfs_boot_config::source::EMBEDDED_USER;
use hdfs_boot_config::{CredentialSource, Environment, Profile};
use hdfs_boot_io::{AuthenticationContext, ClientFactory, ClientHandle};
use hdfs_boot_types::error::{BootError, Result};

/// Maps a deployment profile onto the calls against [`CredentialSource`]
/// and [`ClientFactory`] that produce a [`ClientHandle`].
///
/// The bootstrapper owns the process authentication context, so every
/// login it performs lands in one place.
pub struct Bootstrapper {
    source: CredentialSource,
    factory: ClientFactory,
    auth: AuthenticationContext,
}

impl Bootstrapper {
    pub fn new(source: CredentialSource, factory: ClientFactory) -> Self {
        Bootstrapper {
            source,
            factory,
            auth: AuthenticationContext::new(),
        }
    }

    /// Real process environment, `kinit` and the default connectors.
    pub fn from_process_env() -> Self {
        Self::new(CredentialSource::from_process_env(), ClientFactory::with_defaults())
    }

    /// Default connectors over a custom environment.
    pub fn with_environment(env: Arc<dyn Environment>) -> Self {
        Self::new(CredentialSource::new(env), ClientFactory::with_defaults())
    }

    pub fn source(&self) -> &CredentialSource {
        &self.source
    }

    pub fn authentication(&self) -> &AuthenticationContext {
        &self.auth
    }

    /// Profile named by the environment, or local when none is.
    pub fn profile(&self) -> Result<Profile> {
        Profile::from_environment(self.source.environment())
    }

    /// Bootstrap the profile selected by the environment.
    pub fn bootstrap_default(&mut self) -> Result<ClientHandle> {
        let profile = self.profile()?;
        self.bootstrap(profile)
    }

    /// Produce a ready handle for `profile`, or fail without one.
    pub fn bootstrap(&mut self, profile: Profile) -> Result<ClientHandle> {
        log::info!("Bootstrapping filesystem client for profile {}", profile);
        let handle = match profile {
            Profile::Cloud | Profile::EnvironmentDriven => self.bootstrap_remote(profile),
            Profile::LocalEmbedded => self.bootstrap_embedded(),
        }
        .inspect_err(|e| log::error!("Bootstrap for profile {} failed: {}", profile, e))?;
        log::info!(
            "Filesystem client ready at {} as {}",
            handle.working_directory(),
            handle.acting_user()
        );
        Ok(handle)
    }

    fn bootstrap_remote(&mut self, profile: Profile) -> Result<ClientHandle> {
        let config = self.source.resolve(profile)?;
        let target = self
            .source
            .resolve_target(profile)?
            .ok_or_else(|| BootError::MissingConfiguration("HDFS_URI".to_string()))?;
        let user = self.source.acting_user(profile)?;
        let credentials = self.source.resolve_credentials(profile)?;
        log::info!("Target location {}", target);

        self.factory.acquire(
            &config,
            &target,
            user.as_deref(),
            credentials.as_ref(),
            &mut self.auth,
        )
    }

    fn bootstrap_embedded(&mut self) -> Result<ClientHandle> {
        let profile = Profile::LocalEmbedded;
        let mut config = self.source.resolve(profile)?;
        if let Some(dir) = self.source.resolve_target(profile)? {
            log::info!("Embedded filesystem folder {}", dir);
            config = config.with(EMBEDDED_BASEDIR_KEY, dir.as_str());
        }
        let user = self
            .source
            .acting_user(profile)?
            .unwrap_or_else(|| EMBEDDED_USER.to_string());

        self.factory
            .acquire_embedded(&config, &user, None, &mut self.auth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use hdfs_boot_config::MapEnvironment;
    use hdfs_boot_types::error::BootErrorKind;

    fn bootstrapper(env: MapEnvironment) -> Bootstrapper {
        Bootstrapper::with_environment(Arc::new(env))
    }

    #[test]
    fn test_local_profile_without_folder() {
        let mut boot = bootstrapper(MapEnvironment::new());
        let handle = boot.bootstrap(Profile::LocalEmbedded).unwrap();
        let cluster = handle.embedded_cluster().unwrap();
        assert!(cluster.is_ephemeral());
        assert_eq!(handle.acting_user(), "hdfs");
        assert!(Path::new(handle.working_directory()).is_dir());
        assert!(!boot.authentication().is_authenticated());
    }

    #[test]
    fn test_local_profile_with_folder() {
        let scratch = tempfile::tempdir().unwrap();
        let folder = scratch.path().join("data");
        let env = MapEnvironment::new().with("FOLDER", folder.to_str().unwrap());
        let mut boot = bootstrapper(env);

        let handle = boot.bootstrap(Profile::LocalEmbedded).unwrap();
        assert_eq!(handle.working_directory(), folder.to_str().unwrap());
        assert!(folder.is_dir());
        assert!(!handle.embedded_cluster().unwrap().is_ephemeral());
    }

    #[test]
    fn test_environment_profile_requires_uri() {
        let env = MapEnvironment::new().with("HDFS_USER", "bob");
        let err = bootstrapper(env)
            .bootstrap(Profile::EnvironmentDriven)
            .unwrap_err();
        assert!(matches!(err, BootError::MissingConfiguration(ref n) if n == "HDFS_URI"));
    }

    #[test]
    fn test_environment_profile_local_target() {
        let scratch = tempfile::tempdir().unwrap();
        let target = scratch.path().join("space");
        let env = MapEnvironment::new()
            .with("HDFS_URI", target.to_str().unwrap())
            .with("HDFS_USER", "bob");

        let handle = bootstrapper(env)
            .bootstrap(Profile::EnvironmentDriven)
            .unwrap();
        assert_eq!(handle.acting_user(), "bob");
        assert!(handle.embedded_cluster().is_none());
        assert!(target.is_dir());
    }

    #[test]
    fn test_cloud_profile_without_catalog() {
        let err = bootstrapper(MapEnvironment::new())
            .bootstrap(Profile::Cloud)
            .unwrap_err();
        assert!(matches!(err, BootError::MissingConfiguration(ref n) if n == "VCAP_SERVICES"));
    }

    #[test]
    fn test_profile_from_environment() {
        let boot = bootstrapper(MapEnvironment::new().with("HDFS_BOOT_PROFILE", "env"));
        assert_eq!(boot.profile().unwrap(), Profile::EnvironmentDriven);

        let boot = bootstrapper(MapEnvironment::new());
        assert_eq!(boot.profile().unwrap(), Profile::LocalEmbedded);

        let boot = bootstrapper(MapEnvironment::new().with("HDFS_BOOT_PROFILE", "mainframe"));
        assert_eq!(boot.profile().unwrap_err().kind(), BootErrorKind::Format);
    }
}
