//! Resolution of raw configuration, target location, acting user and
//! credentials for a given profile.

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use hdfs_boot_types::error::{BootError, Result};
use serde_json::Value;

use crate::catalog::ServiceCatalog;
use crate::credentials::Credentials;
use crate::env::{Environment, ProcessEnvironment};
use crate::locator::{ConfigurationLocator, PropertyLocator};
use crate::profile::Profile;
use crate::raw_config::RawConfig;

/// Service catalog of the cloud profile.
pub const CATALOG_ENV_VAR: &str = "VCAP_SERVICES";
/// JSON object of configuration overrides for the environment profile.
pub const PARAMS_ENV_VAR: &str = "HADOOP_PARAMS";
/// Directory of the embedded filesystem for the local profile.
pub const FOLDER_ENV_VAR: &str = "FOLDER";
/// Identity the embedded filesystem is operated as.
pub const EMBEDDED_USER: &str = "hdfs";

/// Pulls configuration and secrets out of the active deployment context.
///
/// The parsed service catalog is cached after the first successful lookup;
/// nothing else is retained between calls.
pub struct CredentialSource {
    env: Arc<dyn Environment>,
    catalog: OnceLock<ServiceCatalog>,
}

impl CredentialSource {
    pub fn new(env: Arc<dyn Environment>) -> Self {
        CredentialSource {
            env,
            catalog: OnceLock::new(),
        }
    }

    /// Source reading the real process environment.
    pub fn from_process_env() -> Self {
        Self::new(Arc::new(ProcessEnvironment))
    }

    pub fn environment(&self) -> &dyn Environment {
        self.env.as_ref()
    }

    /// The service catalog, parsed on first use.
    pub fn catalog(&self) -> Result<&ServiceCatalog> {
        if let Some(catalog) = self.catalog.get() {
            return Ok(catalog);
        }
        let json = self.env.var(CATALOG_ENV_VAR).ok_or_else(|| {
            log::error!("{} is not set; no service catalog available", CATALOG_ENV_VAR);
            BootError::MissingConfiguration(CATALOG_ENV_VAR.to_string())
        })?;
        let parsed = ServiceCatalog::from_json(&json)?;
        log::debug!("Service catalog bound instances: {:?}", parsed.instance_names());
        Ok(self.catalog.get_or_init(|| parsed))
    }

    /// Raw configuration for `profile`: defaults with the profile's
    /// overrides merged on top.
    pub fn resolve(&self, profile: Profile) -> Result<RawConfig> {
        match profile {
            Profile::Cloud => {
                let block = self.catalog()?.configuration(ConfigurationLocator::Hadoop);
                Ok(RawConfig::defaults().merged(block))
            }
            Profile::EnvironmentDriven => {
                let overrides = match self.env.var(PARAMS_ENV_VAR) {
                    Some(blob) => parse_params(&blob)?,
                    None => BTreeMap::new(),
                };
                Ok(RawConfig::defaults().merged(overrides))
            }
            Profile::LocalEmbedded => Ok(RawConfig::empty()),
        }
    }

    /// A property that must be present.
    pub fn property(&self, profile: Profile, locator: PropertyLocator) -> Result<String> {
        self.optional_property(profile, locator)?.ok_or_else(|| {
            log::error!("{} not found for profile {}", locator, profile);
            BootError::MissingConfiguration(locator.name().to_string())
        })
    }

    /// A property that may be absent.
    pub fn optional_property(
        &self,
        profile: Profile,
        locator: PropertyLocator,
    ) -> Result<Option<String>> {
        match profile {
            Profile::Cloud => {
                let value = self.catalog()?.property(locator);
                if value.is_none() && falls_back_to_env(locator) {
                    return Ok(self.env.var(locator.env_var()));
                }
                Ok(value)
            }
            Profile::EnvironmentDriven => Ok(self.env.var(locator.env_var())),
            Profile::LocalEmbedded => Ok(None),
        }
    }

    /// Target location the handle will be rooted at. For the local profile
    /// this is the optional `FOLDER`; `None` asks for a fresh directory.
    pub fn resolve_target(&self, profile: Profile) -> Result<Option<String>> {
        match profile {
            Profile::Cloud | Profile::EnvironmentDriven => {
                self.property(profile, PropertyLocator::HdfsUri).map(Some)
            }
            Profile::LocalEmbedded => Ok(self.env.var(FOLDER_ENV_VAR)),
        }
    }

    /// Identity used for insecure acquisition.
    pub fn acting_user(&self, profile: Profile) -> Result<Option<String>> {
        match profile {
            Profile::LocalEmbedded => Ok(Some(EMBEDDED_USER.to_string())),
            _ => self.optional_property(profile, PropertyLocator::HdfsUser),
        }
    }

    /// Credentials for ticket authentication, `None` when the context
    /// publishes none of the Kerberos properties.
    pub fn resolve_credentials(&self, profile: Profile) -> Result<Option<Credentials>> {
        if profile == Profile::LocalEmbedded {
            return Ok(None);
        }
        let principal = self.optional_property(profile, PropertyLocator::KrbUser)?;
        let secret = self.optional_property(profile, PropertyLocator::KrbPassword)?;
        let kdc = self.optional_property(profile, PropertyLocator::KrbKdc)?;
        let realm = self.optional_property(profile, PropertyLocator::KrbRealm)?;

        if principal.is_none() && secret.is_none() && kdc.is_none() && realm.is_none() {
            return Ok(None);
        }
        let creds = Credentials::new(principal.unwrap_or_default(), secret.unwrap_or_default())
            .with_kdc(kdc)
            .with_realm(realm);
        Ok(Some(creds))
    }
}

/// User and Kerberos login may also be supplied as plain environment
/// variables next to a service catalog; the cluster URI may not.
fn falls_back_to_env(locator: PropertyLocator) -> bool {
    matches!(
        locator,
        PropertyLocator::HdfsUser | PropertyLocator::KrbUser | PropertyLocator::KrbPassword
    )
}

fn parse_params(blob: &str) -> Result<BTreeMap<String, String>> {
    let value: Value = serde_json::from_str(blob)
        .map_err(|e| BootError::Format(format!("malformed {}: {}", PARAMS_ENV_VAR, e)))?;
    let Value::Object(map) = value else {
        return Err(BootError::Format(format!(
            "{} must be a JSON object",
            PARAMS_ENV_VAR
        )));
    };
    Ok(map
        .into_iter()
        .filter_map(|(k, v)| match v {
            Value::Null => None,
            Value::String(s) => Some((k, s)),
            other => Some((k, other.to_string())),
        })
        .collect())
}
