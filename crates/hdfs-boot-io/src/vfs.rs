//! Filesystem client abstraction.
//!
//! Every backend a bootstrap can hand out implements [`FileSystem`]:
//! - Local filesystem (`file:`), also backing the embedded cluster
//! - WebHDFS (`hdfs://`, `webhdfs://`, `swebhdfs://`, `http(s)://`)
//!
//! Paths may be absolute (`/a/b`), qualified (`hdfs://nn:8020/a/b`,
//! `file:/a/b`) or relative, in which case they resolve against the
//! client's working directory.

use std::io::{Read, Seek, Write};

use hdfs_boot_types::error::Result;

/// A readable file with seek and size support.
pub trait ReadableFile: Read + Seek + Send {
    /// Total size of the file in bytes.
    fn size(&self) -> Result<u64>;
}

/// A writable file.
pub trait WritableFile: Write + Send {
    /// Flush all buffered data to the underlying storage.
    fn flush_all(&mut self) -> Result<()>;
}

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStatus {
    /// Fully qualified path of the entry.
    pub path: String,
    /// Length in bytes (0 for directories).
    pub length: u64,
    pub is_dir: bool,
}

/// Filesystem client.
pub trait FileSystem: Send + Sync {
    /// URI scheme of qualified paths produced by this client.
    fn scheme(&self) -> &str;

    /// Root URI of the filesystem (`file:///`, `hdfs://nn:8020`).
    fn uri(&self) -> String;

    /// Current working directory, fully qualified.
    fn working_directory(&self) -> String;

    /// Change the directory relative paths resolve against.
    fn set_working_directory(&mut self, path: &str) -> Result<()>;

    /// Fully qualified form of `path`.
    fn make_qualified(&self, path: &str) -> String;

    /// Check if a path exists.
    fn exists(&self, path: &str) -> Result<bool>;

    /// Create directories recursively.
    fn mkdirs(&self, path: &str) -> Result<()>;

    /// Open a file for writing (creates or truncates).
    fn create(&self, path: &str) -> Result<Box<dyn WritableFile>>;

    /// Create an empty file. Returns `false` if it already exists.
    fn create_new(&self, path: &str) -> Result<bool>;

    /// Open an existing file for appending.
    fn append(&self, path: &str) -> Result<Box<dyn WritableFile>>;

    /// Open a file for reading.
    fn open_read(&self, path: &str) -> Result<Box<dyn ReadableFile>>;

    /// Remove a file or an empty directory.
    fn remove(&self, path: &str) -> Result<()>;

    /// Entries of a directory.
    fn list_status(&self, path: &str) -> Result<Vec<FileStatus>>;

    /// Files (not directories) directly inside `path`.
    fn list_files(&self, path: &str) -> Result<Vec<FileStatus>> {
        Ok(self
            .list_status(path)?
            .into_iter()
            .filter(|s| !s.is_dir)
            .collect())
    }

    /// Read the entire contents of a file as a string.
    fn read_to_string(&self, path: &str) -> Result<String> {
        let mut file = self.open_read(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        Ok(contents)
    }
}

/// Join `path` onto `base` unless it is already absolute. `.` and `..`
/// segments are folded away; the result always starts with `/`.
pub fn resolve_posix(base: &str, path: &str) -> String {
    let joined = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("{}/{}", base.trim_end_matches('/'), path)
    };
    let mut parts: Vec<&str> = Vec::new();
    for seg in joined.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            s => parts.push(s),
        }
    }
    format!("/{}", parts.join("/"))
}
