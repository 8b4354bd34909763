//! Ticket-authentication credentials.
//!
//! SECURITY: the secret is held in a [`SecretString`]; it is redacted from
//! `Debug` output and only exposed at the single point where it is handed to
//! the login manager.

use secrecy::{ExposeSecret, SecretString};

/// Principal, secret and where to authenticate them.
#[derive(Debug)]
pub struct Credentials {
    principal: String,
    secret: SecretString,
    realm: Option<String>,
    kdc: Option<String>,
}

impl Credentials {
    pub fn new(principal: impl Into<String>, secret: impl Into<String>) -> Self {
        Credentials {
            principal: principal.into(),
            secret: SecretString::from(secret.into()),
            realm: None,
            kdc: None,
        }
    }

    pub fn with_realm(mut self, realm: Option<String>) -> Self {
        self.realm = realm.filter(|r| !r.is_empty());
        self
    }

    pub fn with_kdc(mut self, kdc: Option<String>) -> Self {
        self.kdc = kdc.filter(|k| !k.is_empty());
        self
    }

    pub fn principal(&self) -> &str {
        &self.principal
    }

    pub fn secret(&self) -> &SecretString {
        &self.secret
    }

    pub fn realm(&self) -> Option<&str> {
        self.realm.as_deref()
    }

    pub fn kdc(&self) -> Option<&str> {
        self.kdc.as_deref()
    }

    /// Both principal and secret are non-empty.
    pub fn is_complete(&self) -> bool {
        !self.principal.is_empty() && !self.secret.expose_secret().is_empty()
    }
}
