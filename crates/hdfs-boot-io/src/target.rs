//! Target locations a client handle is rooted at.

use std::fmt;
use std::path::{Path, PathBuf};

use hdfs_boot_types::error::{BootError, Result};
use url::Url;

use crate::local_fs::absolutize;

/// Either a URI naming a cluster endpoint and subtree, or a local path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetLocation {
    Remote(Url),
    Local(PathBuf),
}

impl TargetLocation {
    /// Parse a location. Bare and `file:` paths become absolute local
    /// paths; anything with `scheme://` must be a valid URI with a host.
    pub fn parse(location: &str) -> Result<Self> {
        let trimmed = location.trim();
        if trimmed.is_empty() {
            return Err(BootError::invalid_target(location, "empty location"));
        }

        if trimmed.contains("://") {
            let url = Url::parse(trimmed)
                .map_err(|e| BootError::invalid_target(location, e.to_string()))?;
            if url.scheme() == "file" {
                let path = url
                    .to_file_path()
                    .map_err(|_| BootError::invalid_target(location, "not a local file path"))?;
                return Ok(TargetLocation::Local(absolutize(&path)?));
            }
            if url.host_str().map_or(true, str::is_empty) {
                return Err(BootError::invalid_target(location, "missing host"));
            }
            return Ok(TargetLocation::Remote(url));
        }

        let path = trimmed.strip_prefix("file:").unwrap_or(trimmed);
        if path.is_empty() {
            return Err(BootError::invalid_target(location, "empty path"));
        }
        Ok(TargetLocation::Local(absolutize(Path::new(path))?))
    }

    pub fn scheme(&self) -> &str {
        match self {
            TargetLocation::Remote(url) => url.scheme(),
            TargetLocation::Local(_) => "file",
        }
    }

    pub fn host(&self) -> Option<&str> {
        match self {
            TargetLocation::Remote(url) => url.host_str(),
            TargetLocation::Local(_) => None,
        }
    }

    pub fn port(&self) -> Option<u16> {
        match self {
            TargetLocation::Remote(url) => url.port(),
            TargetLocation::Local(_) => None,
        }
    }

    /// Path component: the subtree inside the filesystem.
    pub fn path(&self) -> String {
        match self {
            TargetLocation::Remote(url) => {
                let p = url.path();
                if p.is_empty() {
                    "/".to_string()
                } else {
                    p.to_string()
                }
            }
            TargetLocation::Local(path) => path.display().to_string(),
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, TargetLocation::Local(_))
    }

    /// Whether a client whose filesystem URI is `fs_uri` serves this
    /// location. `hdfs`, `webhdfs`, `swebhdfs`, `http` and `https` name the
    /// same cluster; ports only have to agree when the schemes do.
    pub fn is_served_by(&self, fs_uri: &str) -> bool {
        let Ok(uri) = Url::parse(fs_uri) else {
            return false;
        };
        match self {
            TargetLocation::Local(_) => uri.scheme() == "file",
            TargetLocation::Remote(target) => {
                if scheme_family(uri.scheme()) != scheme_family(target.scheme()) {
                    return false;
                }
                let same_host = match (uri.host_str(), target.host_str()) {
                    (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
                    _ => false,
                };
                let port_conflict = uri.scheme() == target.scheme()
                    && matches!((uri.port(), target.port()), (Some(a), Some(b)) if a != b);
                same_host && !port_conflict
            }
        }
    }
}

fn scheme_family(scheme: &str) -> &str {
    match scheme {
        "hdfs" | "webhdfs" | "swebhdfs" | "http" | "https" => "hdfs",
        other => other,
    }
}

impl fmt::Display for TargetLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetLocation::Remote(url) => write!(f, "{}", url),
            TargetLocation::Local(path) => write!(f, "{}", path.display()),
        }
    }
}
