#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use hdfs_boot::{
    AuthenticationGate, BootError, ClientFactory, FileSystem, FileSystemConnector, KerberosLogin,
    RawConfig, Result,
};
use hdfs_boot_io::{AuthenticatedIdentity, LocalFileSystem, TargetLocation};
use secrecy::{ExposeSecret, SecretString};

/// Shared, ordered record of every login and connect call.
pub type CallLog = Arc<Mutex<Vec<String>>>;

pub struct FakeLogin {
    pub accepted_secret: String,
    pub calls: CallLog,
}

impl KerberosLogin for FakeLogin {
    fn login(
        &self,
        _kdc: &str,
        realm: &str,
        principal: &str,
        secret: &SecretString,
    ) -> Result<AuthenticatedIdentity> {
        self.calls.lock().unwrap().push(format!("login:{}", principal));
        if secret.expose_secret() != self.accepted_secret {
            return Err(BootError::Authentication("preauthentication failed".to_string()));
        }
        Ok(AuthenticatedIdentity::new(
            format!("{}@{}", principal, realm),
            realm,
        ))
    }
}

/// Hands out local clients, whatever the target scheme.
pub struct RecordingConnector {
    pub calls: CallLog,
}

impl FileSystemConnector for RecordingConnector {
    fn connect_secure(
        &self,
        _config: &RawConfig,
        identity: &AuthenticatedIdentity,
    ) -> Result<Box<dyn FileSystem>> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("connect_secure:{}", identity.principal()));
        Ok(Box::new(LocalFileSystem::new()?))
    }

    fn connect_insecure(
        &self,
        _target: &TargetLocation,
        _config: &RawConfig,
        user: &str,
    ) -> Result<Box<dyn FileSystem>> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("connect_insecure:{}", user));
        Ok(Box::new(LocalFileSystem::new()?))
    }
}

/// Factory wired to the fakes, plus the log they both write to.
pub fn recording_factory(accepted_secret: &str) -> (ClientFactory, CallLog) {
    let calls: CallLog = Arc::new(Mutex::new(Vec::new()));
    let login = FakeLogin {
        accepted_secret: accepted_secret.to_string(),
        calls: calls.clone(),
    };
    let connector = RecordingConnector {
        calls: calls.clone(),
    };
    let factory = ClientFactory::new(
        AuthenticationGate::new(Box::new(login)),
        Box::new(connector),
    );
    (factory, calls)
}
