//! Decides whether a cluster needs ticket authentication and performs the
//! login when it does.
//!
//! The authenticated identity is installed into an explicit
//! [`AuthenticationContext`] rather than ambient global state. `login`
//! takes the context by `&mut`, so there is exactly one writer at a time;
//! only one identity is active per context.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use hdfs_boot_config::raw_config::SECURITY_AUTHENTICATION_KEY;
use hdfs_boot_config::{Credentials, RawConfig};
use hdfs_boot_types::error::{BootError, Result};
use secrecy::{ExposeSecret, SecretString};
use tempfile::TempDir;

/// Security mode value that demands ticket authentication.
pub const KERBEROS: &str = "kerberos";

/// True iff the security mode is exactly `kerberos`.
pub fn requires_authentication(config: &RawConfig) -> bool {
    config.get(SECURITY_AUTHENTICATION_KEY) == Some(KERBEROS)
}

/// Outcome of a successful login.
#[derive(Debug, Clone)]
pub struct AuthenticatedIdentity {
    principal: String,
    realm: String,
    ticket_cache: Option<PathBuf>,
    // keeps the ticket cache directory alive as long as the identity
    _cache_dir: Option<Arc<TempDir>>,
}

impl AuthenticatedIdentity {
    pub fn new(principal: impl Into<String>, realm: impl Into<String>) -> Self {
        AuthenticatedIdentity {
            principal: principal.into(),
            realm: realm.into(),
            ticket_cache: None,
            _cache_dir: None,
        }
    }

    pub fn with_ticket_cache(mut self, cache: PathBuf, dir: Arc<TempDir>) -> Self {
        self.ticket_cache = Some(cache);
        self._cache_dir = Some(dir);
        self
    }

    /// Fully qualified principal (`user@REALM`).
    pub fn principal(&self) -> &str {
        &self.principal
    }

    pub fn realm(&self) -> &str {
        &self.realm
    }

    /// Principal without instance or realm: `alice/host@R` gives `alice`.
    pub fn short_name(&self) -> &str {
        self.principal
            .split(['/', '@'])
            .next()
            .unwrap_or(&self.principal)
    }

    pub fn ticket_cache(&self) -> Option<&Path> {
        self.ticket_cache.as_deref()
    }
}

/// Slot holding the identity subsequent client acquisitions run as.
#[derive(Debug, Default)]
pub struct AuthenticationContext {
    identity: Option<AuthenticatedIdentity>,
    logins: usize,
}

impl AuthenticationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn identity(&self) -> Option<&AuthenticatedIdentity> {
        self.identity.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// Number of successful logins performed through this context.
    pub fn login_count(&self) -> usize {
        self.logins
    }

    pub fn clear(&mut self) {
        self.identity = None;
    }

    fn install(&mut self, identity: AuthenticatedIdentity) {
        self.identity = Some(identity);
        self.logins += 1;
    }
}

/// Obtains a ticket for a principal. Implementations must never log or
/// persist the secret.
pub trait KerberosLogin: Send + Sync {
    fn login(
        &self,
        kdc: &str,
        realm: &str,
        principal: &str,
        secret: &SecretString,
    ) -> Result<AuthenticatedIdentity>;
}

/// Conditional ticket authentication in front of client acquisition.
pub struct AuthenticationGate {
    login_manager: Box<dyn KerberosLogin>,
}

impl AuthenticationGate {
    pub fn new(login_manager: Box<dyn KerberosLogin>) -> Self {
        AuthenticationGate { login_manager }
    }

    /// Gate backed by the system `kinit`.
    pub fn with_kinit() -> Self {
        Self::new(Box::new(crate::kinit::KinitLogin::default()))
    }

    pub fn requires_authentication(&self, config: &RawConfig) -> bool {
        requires_authentication(config)
    }

    /// Validate `credentials`, log in and install the identity into `ctx`.
    pub fn login(
        &self,
        credentials: Option<&Credentials>,
        ctx: &mut AuthenticationContext,
    ) -> Result<()> {
        let creds = credentials.ok_or_else(|| {
            log::error!("Cluster requires kerberos but no credentials were supplied");
            BootError::InvalidCredentials("KERBEROS_USER not found in configuration".to_string())
        })?;
        if creds.principal().is_empty() {
            log::error!("Kerberos principal is empty");
            return Err(BootError::InvalidCredentials(
                "KERBEROS_USER not found in configuration".to_string(),
            ));
        }
        if creds.secret().expose_secret().is_empty() {
            log::error!("Kerberos secret is empty for {}", creds.principal());
            return Err(BootError::InvalidCredentials(
                "KERBEROS_PASS not found in configuration".to_string(),
            ));
        }
        let kdc = creds
            .kdc()
            .ok_or_else(|| BootError::MissingConfiguration("KRB_KDC".to_string()))?;
        let realm = creds
            .realm()
            .ok_or_else(|| BootError::MissingConfiguration("KRB_REALM".to_string()))?;

        log::info!("Setting kerberos kdc and realm: {}, {}", kdc, realm);
        let identity = self
            .login_manager
            .login(kdc, realm, creds.principal(), creds.secret())
            .inspect_err(|e| log::error!("Kerberos login for {} failed: {}", creds.principal(), e))?;
        log::info!("Logged in as {}", identity.principal());
        ctx.install(identity);
        Ok(())
    }
}
