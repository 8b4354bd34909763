//! HDFS filesystem backend over the WebHDFS REST API.
//!
//! Enable with the `webhdfs` feature flag (on by default).
//!
//! Requires a NameNode with WebHDFS enabled. Writes use the two-step
//! `noredirect=true` protocol: the NameNode answers with the DataNode
//! location, the payload goes there.

use hdfs_boot_config::raw_config::{HTTP_POLICY_KEY, NAMENODE_HTTP_ADDRESS_KEY};
use hdfs_boot_config::RawConfig;
use hdfs_boot_types::error::{BootError, Result};
use url::Url;

pub const DEFAULT_NAMENODE_HTTP_PORT: u16 = 9870;
pub const DEFAULT_NAMENODE_HTTPS_PORT: u16 = 9871;

/// Where a cluster's WebHDFS endpoint lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebHdfsEndpoint {
    /// Filesystem URI qualified paths are reported under (`hdfs://nn:8020`).
    pub fs_uri: String,
    /// NameNode HTTP(S) base URL (`http://nn:9870`).
    pub namenode_url: Url,
}

impl WebHdfsEndpoint {
    /// Work out the endpoint for a filesystem URI.
    ///
    /// `dfs.namenode.http-address` wins when set; `webhdfs`/`http` style
    /// URIs already name the HTTP port; plain `hdfs` URIs fall back to the
    /// default NameNode HTTP port on the same host.
    pub fn resolve(fs_uri: &Url, config: &RawConfig) -> Result<Self> {
        let host = fs_uri
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| BootError::invalid_target(fs_uri.as_str(), "missing host"))?;
        let https = matches!(fs_uri.scheme(), "swebhdfs" | "https")
            || config.get(HTTP_POLICY_KEY) == Some("HTTPS_ONLY");
        let protocol = if https { "https" } else { "http" };
        let default_port = if https {
            DEFAULT_NAMENODE_HTTPS_PORT
        } else {
            DEFAULT_NAMENODE_HTTP_PORT
        };

        let authority = match config.get(NAMENODE_HTTP_ADDRESS_KEY) {
            Some(addr) => match addr.split_once(':') {
                Some(("0.0.0.0", port)) => format!("{}:{}", host, port),
                Some(_) => addr.to_string(),
                None => format!("{}:{}", addr, default_port),
            },
            None => match fs_uri.scheme() {
                "webhdfs" | "swebhdfs" | "http" | "https" => {
                    format!("{}:{}", host, fs_uri.port().unwrap_or(default_port))
                }
                _ => format!("{}:{}", host, default_port),
            },
        };
        let namenode_url = Url::parse(&format!("{}://{}", protocol, authority))
            .map_err(|e| BootError::invalid_target(authority.as_str(), e.to_string()))?;

        let fs_uri = match fs_uri.port() {
            Some(port) => format!("{}://{}:{}", fs_uri.scheme(), host, port),
            None => format!("{}://{}", fs_uri.scheme(), host),
        };
        Ok(WebHdfsEndpoint {
            fs_uri,
            namenode_url,
        })
    }
}

/// How requests identify themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebHdfsAuth {
    /// Pseudo authentication with `user.name`.
    Simple { user: String },
    /// Authenticated principal presenting a delegation token. WebHDFS
    /// has no other way to carry the ticket without SPNEGO.
    Kerberos {
        principal: String,
        user: String,
        delegation: String,
    },
}

impl WebHdfsAuth {
    fn user(&self) -> &str {
        match self {
            WebHdfsAuth::Simple { user } | WebHdfsAuth::Kerberos { user, .. } => user,
        }
    }

    /// Who requests run as, for logging.
    fn identity(&self) -> &str {
        match self {
            WebHdfsAuth::Simple { user } => user,
            WebHdfsAuth::Kerberos { principal, .. } => principal,
        }
    }

    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        match self {
            WebHdfsAuth::Simple { user } => vec![("user.name", user.clone())],
            WebHdfsAuth::Kerberos { delegation, .. } => vec![("delegation", delegation.clone())],
        }
    }
}

#[cfg(feature = "webhdfs")]
mod inner {
    use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};

    use hdfs_boot_types::error::{BootError, Result};
    use serde::Deserialize;
    use ureq::Agent;
    use url::Url;

    use super::{WebHdfsAuth, WebHdfsEndpoint};
    use crate::vfs::{resolve_posix, FileStatus, FileSystem, ReadableFile, WritableFile};

    #[derive(Deserialize)]
    struct BooleanResponse {
        boolean: bool,
    }

    #[derive(Deserialize)]
    struct LocationResponse {
        #[serde(rename = "Location")]
        location: String,
    }

    #[derive(Deserialize)]
    pub(super) struct ListingResponse {
        #[serde(rename = "FileStatuses")]
        pub(super) file_statuses: Listing,
    }

    #[derive(Deserialize)]
    pub(super) struct Listing {
        #[serde(rename = "FileStatus", default)]
        pub(super) entries: Vec<Entry>,
    }

    #[derive(Deserialize)]
    pub(super) struct Entry {
        #[serde(rename = "pathSuffix")]
        pub(super) path_suffix: String,
        #[serde(rename = "type")]
        pub(super) kind: String,
        #[serde(default)]
        pub(super) length: u64,
    }

    fn remote_err(op: &str, path: &str, err: ureq::Error) -> BootError {
        match err {
            ureq::Error::StatusCode(404) => BootError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not found", path),
            )),
            ureq::Error::StatusCode(code @ (401 | 403)) => {
                BootError::FileSystem(format!("{} {} denied (HTTP {})", op, path, code))
            }
            ureq::Error::StatusCode(code) => {
                BootError::FileSystem(format!("{} {} failed with HTTP {}", op, path, code))
            }
            other => BootError::FileSystem(format!("{} {} failed: {}", op, path, other)),
        }
    }

    fn parse_json<T: for<'de> Deserialize<'de>>(op: &str, body: &str) -> Result<T> {
        serde_json::from_str(body)
            .map_err(|e| BootError::FileSystem(format!("unexpected {} response: {}", op, e)))
    }

    /// WebHDFS client.
    pub struct WebHdfsFileSystem {
        endpoint: WebHdfsEndpoint,
        auth: WebHdfsAuth,
        agent: Agent,
        working_dir: String,
    }

    impl WebHdfsFileSystem {
        /// Connect and verify the NameNode answers.
        pub fn connect(endpoint: WebHdfsEndpoint, auth: WebHdfsAuth) -> Result<Self> {
            let fs = Self::unchecked(endpoint, auth);
            let url = fs.op_url("/", "GETFILESTATUS", &[]);
            fs.agent.get(url.as_str()).call().map_err(|e| {
                log::error!("NameNode {} unreachable: {}", fs.endpoint.namenode_url, e);
                BootError::ClientAcquisition(format!(
                    "unable to reach {}: {}",
                    fs.endpoint.namenode_url, e
                ))
            })?;
            log::debug!(
                "Connected to {} as {}",
                fs.endpoint.namenode_url,
                fs.auth.identity()
            );
            Ok(fs)
        }

        /// Client that has not talked to the NameNode yet.
        pub fn unchecked(endpoint: WebHdfsEndpoint, auth: WebHdfsAuth) -> Self {
            let working_dir = format!("/user/{}", auth.user());
            WebHdfsFileSystem {
                endpoint,
                auth,
                agent: Agent::new_with_defaults(),
                working_dir,
            }
        }

        /// Absolute path inside the filesystem.
        pub fn resolve(&self, path: &str) -> String {
            if path.contains("://") {
                if let Ok(url) = Url::parse(path) {
                    return resolve_posix("/", url.path());
                }
            }
            resolve_posix(&self.working_dir, path)
        }

        pub(super) fn op_url(&self, path: &str, op: &str, extra: &[(&str, &str)]) -> Url {
            let mut url = self.endpoint.namenode_url.clone();
            url.set_path(&format!("/webhdfs/v1{}", self.resolve(path)));
            {
                let mut q = url.query_pairs_mut();
                q.append_pair("op", op);
                for (k, v) in self.auth.query_pairs() {
                    q.append_pair(k, &v);
                }
                for (k, v) in extra {
                    q.append_pair(k, v);
                }
            }
            url
        }

        fn get_string(&self, op: &str, path: &str, extra: &[(&str, &str)]) -> Result<String> {
            let url = self.op_url(path, op, extra);
            self.agent
                .get(url.as_str())
                .call()
                .map_err(|e| remote_err(op, path, e))?
                .into_body()
                .read_to_string()
                .map_err(|e| remote_err(op, path, e))
        }

        fn writer(&self, path: &str, created: bool) -> WebHdfsWritableFile {
            WebHdfsWritableFile {
                agent: self.agent.clone(),
                path: self.resolve(path),
                create_url: self.op_url(
                    path,
                    "CREATE",
                    &[("overwrite", "true"), ("noredirect", "true")],
                ),
                append_url: self.op_url(path, "APPEND", &[("noredirect", "true")]),
                buffer: Vec::new(),
                created,
            }
        }
    }

    impl FileSystem for WebHdfsFileSystem {
        fn scheme(&self) -> &str {
            self.endpoint
                .fs_uri
                .split_once("://")
                .map(|(s, _)| s)
                .unwrap_or("hdfs")
        }

        fn uri(&self) -> String {
            self.endpoint.fs_uri.clone()
        }

        fn working_directory(&self) -> String {
            self.make_qualified(&self.working_dir)
        }

        fn set_working_directory(&mut self, path: &str) -> Result<()> {
            self.working_dir = self.resolve(path);
            Ok(())
        }

        fn make_qualified(&self, path: &str) -> String {
            format!("{}{}", self.endpoint.fs_uri, self.resolve(path))
        }

        fn exists(&self, path: &str) -> Result<bool> {
            match self.get_string("GETFILESTATUS", path, &[]) {
                Ok(_) => Ok(true),
                Err(BootError::Io(e)) if e.kind() == io::ErrorKind::NotFound => Ok(false),
                Err(e) => Err(e),
            }
        }

        fn mkdirs(&self, path: &str) -> Result<()> {
            let url = self.op_url(path, "MKDIRS", &[]);
            let body = self
                .agent
                .put(url.as_str())
                .send_empty()
                .map_err(|e| remote_err("MKDIRS", path, e))?
                .into_body()
                .read_to_string()
                .map_err(|e| remote_err("MKDIRS", path, e))?;
            let resp: BooleanResponse = parse_json("MKDIRS", &body)?;
            if !resp.boolean {
                return Err(BootError::FileSystem(format!(
                    "unable to create directory {}",
                    self.resolve(path)
                )));
            }
            Ok(())
        }

        fn create(&self, path: &str) -> Result<Box<dyn WritableFile>> {
            Ok(Box::new(self.writer(path, false)))
        }

        fn create_new(&self, path: &str) -> Result<bool> {
            if self.exists(path)? {
                return Ok(false);
            }
            let mut file = self.writer(path, false);
            file.flush_all()?;
            Ok(true)
        }

        fn append(&self, path: &str) -> Result<Box<dyn WritableFile>> {
            if !self.exists(path)? {
                return Err(BootError::Io(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("{} not found", self.resolve(path)),
                )));
            }
            Ok(Box::new(self.writer(path, true)))
        }

        fn open_read(&self, path: &str) -> Result<Box<dyn ReadableFile>> {
            let url = self.op_url(path, "OPEN", &[]);
            let body = self
                .agent
                .get(url.as_str())
                .call()
                .map_err(|e| remote_err("OPEN", path, e))?
                .into_body();

            let mut data = Vec::new();
            body.into_reader().read_to_end(&mut data)?;

            let size = data.len() as u64;
            Ok(Box::new(WebHdfsReadableFile {
                cursor: Cursor::new(data),
                size,
            }))
        }

        fn remove(&self, path: &str) -> Result<()> {
            let url = self.op_url(path, "DELETE", &[("recursive", "false")]);
            let body = self
                .agent
                .delete(url.as_str())
                .call()
                .map_err(|e| remote_err("DELETE", path, e))?
                .into_body()
                .read_to_string()
                .map_err(|e| remote_err("DELETE", path, e))?;
            let resp: BooleanResponse = parse_json("DELETE", &body)?;
            if !resp.boolean {
                return Err(BootError::Io(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("{} not found", self.resolve(path)),
                )));
            }
            Ok(())
        }

        fn list_status(&self, path: &str) -> Result<Vec<FileStatus>> {
            let body = self.get_string("LISTSTATUS", path, &[])?;
            let listing: ListingResponse = parse_json("LISTSTATUS", &body)?;
            let dir = self.resolve(path);
            Ok(listing
                .file_statuses
                .entries
                .into_iter()
                .map(|e| FileStatus {
                    path: self.make_qualified(&resolve_posix(&dir, &e.path_suffix)),
                    length: e.length,
                    is_dir: e.kind == "DIRECTORY",
                })
                .collect())
        }
    }

    /// Whole-file download, seekable in memory.
    struct WebHdfsReadableFile {
        cursor: Cursor<Vec<u8>>,
        size: u64,
    }

    impl Read for WebHdfsReadableFile {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.cursor.read(buf)
        }
    }

    impl Seek for WebHdfsReadableFile {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            self.cursor.seek(pos)
        }
    }

    impl ReadableFile for WebHdfsReadableFile {
        fn size(&self) -> Result<u64> {
            Ok(self.size)
        }
    }

    /// Buffers writes and ships them on flush: `CREATE` the first time,
    /// `APPEND` afterwards. Dropping an unflushed file uploads it too, but
    /// errors are only observable through `flush_all`.
    struct WebHdfsWritableFile {
        agent: Agent,
        path: String,
        create_url: Url,
        append_url: Url,
        buffer: Vec<u8>,
        created: bool,
    }

    impl WebHdfsWritableFile {
        fn upload(&mut self) -> Result<()> {
            if self.created && self.buffer.is_empty() {
                return Ok(());
            }
            let (op, url) = if self.created {
                ("APPEND", &self.append_url)
            } else {
                ("CREATE", &self.create_url)
            };
            // step one: the NameNode names the DataNode
            let response = if self.created {
                self.agent.post(url.as_str()).send_empty()
            } else {
                self.agent.put(url.as_str()).send_empty()
            };
            let body = response
                .map_err(|e| remote_err(op, &self.path, e))?
                .into_body()
                .read_to_string()
                .map_err(|e| remote_err(op, &self.path, e))?;
            let location: LocationResponse = parse_json(op, &body)?;

            // step two: the payload goes to the DataNode
            let sent = if self.created {
                self.agent
                    .post(location.location.as_str())
                    .content_type("application/octet-stream")
                    .send(&self.buffer[..])
            } else {
                self.agent
                    .put(location.location.as_str())
                    .content_type("application/octet-stream")
                    .send(&self.buffer[..])
            };
            sent.map_err(|e| remote_err(op, &self.path, e))?;

            self.buffer.clear();
            self.created = true;
            Ok(())
        }
    }

    impl Write for WebHdfsWritableFile {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.buffer.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            self.upload().map_err(io::Error::other)
        }
    }

    impl WritableFile for WebHdfsWritableFile {
        fn flush_all(&mut self) -> Result<()> {
            self.upload()
        }
    }

    impl Drop for WebHdfsWritableFile {
        fn drop(&mut self) {
            if let Err(e) = self.upload() {
                log::error!("Lost unflushed writes to {}: {}", self.path, e);
            }
        }
    }
}

#[cfg(feature = "webhdfs")]
pub use inner::WebHdfsFileSystem;
