//! Ticket acquisition through the system `kinit`.
//!
//! SECURITY: the secret is written to `kinit`'s stdin, never passed as a
//! command-line argument, and never logged.

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::Arc;

use hdfs_boot_types::error::{BootError, Result};
use secrecy::{ExposeSecret, SecretString};

use crate::auth::{AuthenticatedIdentity, KerberosLogin};

/// Runs `kinit` against a throwaway `krb5.conf` naming the realm and KDC.
///
/// On success the ticket cache location is exported through `KRB5CCNAME`
/// and `KRB5_CONFIG`, which changes authentication state for the whole
/// process.
#[derive(Debug, Clone)]
pub struct KinitLogin {
    program: PathBuf,
}

impl Default for KinitLogin {
    fn default() -> Self {
        KinitLogin {
            program: PathBuf::from("kinit"),
        }
    }
}

impl KinitLogin {
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        KinitLogin {
            program: program.into(),
        }
    }
}

/// `principal@REALM`, leaving already qualified principals alone.
pub fn qualify_principal(principal: &str, realm: &str) -> String {
    if principal.contains('@') {
        principal.to_string()
    } else {
        format!("{}@{}", principal, realm)
    }
}

fn krb5_conf(kdc: &str, realm: &str) -> String {
    format!(
        "[libdefaults]\n    default_realm = {realm}\n\n[realms]\n    {realm} = {{\n        kdc = {kdc}\n    }}\n"
    )
}

fn auth_err(msg: String) -> BootError {
    BootError::Authentication(msg)
}

impl KerberosLogin for KinitLogin {
    fn login(
        &self,
        kdc: &str,
        realm: &str,
        principal: &str,
        secret: &SecretString,
    ) -> Result<AuthenticatedIdentity> {
        let full = qualify_principal(principal, realm);
        let dir = tempfile::Builder::new()
            .prefix("hdfs-boot-krb5")
            .tempdir()
            .map_err(|e| auth_err(format!("unable to prepare ticket cache: {}", e)))?;
        let conf_path = dir.path().join("krb5.conf");
        fs::write(&conf_path, krb5_conf(kdc, realm))
            .map_err(|e| auth_err(format!("unable to write krb5.conf: {}", e)))?;
        let cache = dir.path().join("krb5cc");
        let cache_name = format!("FILE:{}", cache.display());

        let mut child = Command::new(&self.program)
            .arg(&full)
            .env("KRB5_CONFIG", &conf_path)
            .env("KRB5CCNAME", &cache_name)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| auth_err(format!("unable to run {}: {}", self.program.display(), e)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| auth_err("unable to open kinit stdin".to_string()))?;
        let written = stdin
            .write_all(secret.expose_secret().as_bytes())
            .and_then(|_| stdin.write_all(b"\n"));
        drop(stdin);

        let output = child
            .wait_with_output()
            .map_err(|e| auth_err(format!("kinit did not complete: {}", e)))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(auth_err(format!("kinit rejected {}: {}", full, stderr.trim())));
        }
        written.map_err(|e| auth_err(format!("unable to pass secret to kinit: {}", e)))?;

        std::env::set_var("KRB5_CONFIG", &conf_path);
        std::env::set_var("KRB5CCNAME", &cache_name);
        log::debug!("Ticket cache for {} at {}", full, cache.display());

        Ok(AuthenticatedIdentity::new(full, realm).with_ticket_cache(cache, Arc::new(dir)))
    }
}
