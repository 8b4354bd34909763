//! Local filesystem backend implementing FileSystem.

use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Component, Path, PathBuf};

use hdfs_boot_types::error::Result;

use crate::vfs::{FileStatus, FileSystem, ReadableFile, WritableFile};

/// Absolute, lexically normalized form of `path`, resolved against the
/// process working directory when relative.
pub fn absolutize(path: &Path) -> Result<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    Ok(normalize(&joined))
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Local filesystem implementation of FileSystem.
#[derive(Debug, Clone)]
pub struct LocalFileSystem {
    working_dir: PathBuf,
}

struct LocalReadableFile {
    file: BufReader<File>,
    size: u64,
}

impl Read for LocalReadableFile {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.file.read(buf)
    }
}

impl Seek for LocalReadableFile {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        self.file.seek(pos)
    }
}

impl ReadableFile for LocalReadableFile {
    fn size(&self) -> Result<u64> {
        Ok(self.size)
    }
}

struct LocalWritableFile {
    file: BufWriter<File>,
}

impl Write for LocalWritableFile {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.file.flush()
    }
}

impl WritableFile for LocalWritableFile {
    fn flush_all(&mut self) -> Result<()> {
        self.file.flush()?;
        Ok(())
    }
}

impl LocalFileSystem {
    /// Client whose working directory is the process working directory.
    pub fn new() -> Result<Self> {
        Ok(LocalFileSystem {
            working_dir: absolutize(Path::new("."))?,
        })
    }

    /// Client whose working directory is `dir`.
    pub fn rooted_at(dir: &Path) -> Result<Self> {
        Ok(LocalFileSystem {
            working_dir: absolutize(dir)?,
        })
    }

    /// Native absolute path for `path`.
    pub fn resolve(&self, path: &str) -> PathBuf {
        let stripped = path
            .strip_prefix("file://")
            .or_else(|| path.strip_prefix("file:"))
            .unwrap_or(path);
        let p = Path::new(stripped);
        if p.is_absolute() {
            normalize(p)
        } else {
            normalize(&self.working_dir.join(p))
        }
    }

    fn qualify(path: &Path) -> String {
        format!("file:{}", path.display())
    }
}

impl FileSystem for LocalFileSystem {
    fn scheme(&self) -> &str {
        "file"
    }

    fn uri(&self) -> String {
        "file:///".to_string()
    }

    fn working_directory(&self) -> String {
        Self::qualify(&self.working_dir)
    }

    fn set_working_directory(&mut self, path: &str) -> Result<()> {
        self.working_dir = self.resolve(path);
        Ok(())
    }

    fn make_qualified(&self, path: &str) -> String {
        Self::qualify(&self.resolve(path))
    }

    fn exists(&self, path: &str) -> Result<bool> {
        Ok(self.resolve(path).exists())
    }

    fn mkdirs(&self, path: &str) -> Result<()> {
        fs::create_dir_all(self.resolve(path))?;
        Ok(())
    }

    fn create(&self, path: &str) -> Result<Box<dyn WritableFile>> {
        let file = File::create(self.resolve(path))?;
        Ok(Box::new(LocalWritableFile {
            file: BufWriter::new(file),
        }))
    }

    fn create_new(&self, path: &str) -> Result<bool> {
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(self.resolve(path))
        {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn append(&self, path: &str) -> Result<Box<dyn WritableFile>> {
        let file = OpenOptions::new().append(true).open(self.resolve(path))?;
        Ok(Box::new(LocalWritableFile {
            file: BufWriter::new(file),
        }))
    }

    fn open_read(&self, path: &str) -> Result<Box<dyn ReadableFile>> {
        let file = File::open(self.resolve(path))?;
        let size = file.metadata()?.len();
        Ok(Box::new(LocalReadableFile {
            file: BufReader::new(file),
            size,
        }))
    }

    fn remove(&self, path: &str) -> Result<()> {
        let p = self.resolve(path);
        if p.is_dir() {
            fs::remove_dir(p)?;
        } else {
            fs::remove_file(p)?;
        }
        Ok(())
    }

    fn list_status(&self, path: &str) -> Result<Vec<FileStatus>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(self.resolve(path))? {
            let entry = entry?;
            let meta = entry.metadata()?;
            entries.push(FileStatus {
                path: Self::qualify(&entry.path()),
                length: if meta.is_dir() { 0 } else { meta.len() },
                is_dir: meta.is_dir(),
            });
        }
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fs_in(dir: &Path) -> LocalFileSystem {
        LocalFileSystem::rooted_at(dir).unwrap()
    }

    #[test]
    fn test_write_and_read_relative_file() {
        let dir = tempfile::tempdir().unwrap();
        let fs = fs_in(dir.path());

        let mut wf = fs.create("test.txt").unwrap();
        wf.write_all(b"hello world").unwrap();
        wf.flush_all().unwrap();
        drop(wf);

        assert!(dir.path().join("test.txt").exists());
        assert_eq!(fs.read_to_string("test.txt").unwrap(), "hello world");
    }

    #[test]
    fn test_seek_and_size() {
        let dir = tempfile::tempdir().unwrap();
        let fs = fs_in(dir.path());

        let mut wf = fs.create("data.bin").unwrap();
        wf.write_all(&[7u8; 100]).unwrap();
        wf.flush_all().unwrap();
        drop(wf);

        let mut rf = fs.open_read("data.bin").unwrap();
        assert_eq!(rf.size().unwrap(), 100);
        rf.seek(SeekFrom::Start(90)).unwrap();
        let mut buf = [0u8; 10];
        rf.read_exact(&mut buf).unwrap();
        assert_eq!(buf, [7u8; 10]);
    }

    #[test]
    fn test_create_new_and_exists() {
        let dir = tempfile::tempdir().unwrap();
        let fs = fs_in(dir.path());
        assert!(!fs.exists("nope.txt").unwrap());
        assert!(fs.create_new("nope.txt").unwrap());
        assert!(fs.exists("nope.txt").unwrap());
        assert!(!fs.create_new("nope.txt").unwrap());
    }

    #[test]
    fn test_append() {
        let dir = tempfile::tempdir().unwrap();
        let fs = fs_in(dir.path());
        let mut wf = fs.create("log.txt").unwrap();
        wf.write_all(b"first").unwrap();
        wf.flush_all().unwrap();
        drop(wf);

        let mut wf = fs.append("log.txt").unwrap();
        wf.write_all(b"-second").unwrap();
        wf.flush_all().unwrap();
        drop(wf);

        assert_eq!(fs.read_to_string("log.txt").unwrap(), "first-second");
        assert!(fs.append("missing.txt").is_err());
    }

    #[test]
    fn test_list_files_skips_directories() {
        let dir = tempfile::tempdir().unwrap();
        let fs = fs_in(dir.path());
        for name in ["b.txt", "a.txt"] {
            fs.create_new(name).unwrap();
        }
        fs.mkdirs("sub/dir").unwrap();

        let all = fs.list_status(".").unwrap();
        assert_eq!(all.len(), 3);
        let files = fs.list_files(".").unwrap();
        let names: Vec<&str> = files
            .iter()
            .map(|s| s.path.rsplit('/').next().unwrap())
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
        assert!(files[0].path.starts_with("file:/"));
    }

    #[test]
    fn test_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut fs = fs_in(dir.path());
        fs.mkdirs("nested").unwrap();
        fs.set_working_directory("nested").unwrap();

        let expected = absolutize(&dir.path().join("nested")).unwrap();
        assert_eq!(fs.working_directory(), format!("file:{}", expected.display()));
        assert_eq!(
            fs.make_qualified("f"),
            format!("file:{}", expected.join("f").display())
        );
        // qualified and absolute forms resolve to the same place
        assert_eq!(fs.resolve(&fs.make_qualified("f")), expected.join("f"));
    }

    #[test]
    fn test_remove() {
        let dir = tempfile::tempdir().unwrap();
        let fs = fs_in(dir.path());
        fs.create_new("gone.txt").unwrap();
        fs.mkdirs("empty").unwrap();
        fs.remove("gone.txt").unwrap();
        fs.remove("empty").unwrap();
        assert!(!fs.exists("gone.txt").unwrap());
        assert!(!fs.exists("empty").unwrap());
    }

    #[test]
    fn test_absolutize_folds_dots() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(absolutize(Path::new("./a/../b")).unwrap(), normalize(&cwd.join("b")));
        assert_eq!(absolutize(Path::new("/x/./y")).unwrap(), PathBuf::from("/x/y"));
    }
}
