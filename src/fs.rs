//! Filesystem abstraction for dataset writes.
//!
//! The dataset partitioner only needs directory creation and file
//! creation; going through a trait lets tests capture output and keeps
//! object-store style backends possible without touching the partitioner.

use crate::Result;
use bytes::Bytes;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Target for dataset output.
pub trait FileSystem {
    /// Create a directory and any missing parents; existing directories
    /// are not an error.
    fn mkdirs(&self, path: &str) -> Result<()>;

    /// Create (or truncate) a file for writing.
    fn create(&self, path: &str) -> Result<Box<dyn Write + Send>>;

    /// Read a whole file.
    fn open_read(&self, path: &str) -> Result<Bytes>;

    /// Path separator used when joining segments
    fn sep(&self) -> char {
        '/'
    }

    fn join(&self, segments: &[&str]) -> String {
        segments.join(&self.sep().to_string())
    }
}

/// Local-disk backend. Writes are buffered.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

impl FileSystem for LocalFileSystem {
    fn mkdirs(&self, path: &str) -> Result<()> {
        std::fs::create_dir_all(path)?;
        Ok(())
    }

    fn create(&self, path: &str) -> Result<Box<dyn Write + Send>> {
        let file = File::create(Path::new(path))?;
        Ok(Box::new(BufWriter::new(file)))
    }

    fn open_read(&self, path: &str) -> Result<Bytes> {
        Ok(Bytes::from(std::fs::read(path)?))
    }

    fn sep(&self) -> char {
        std::path::MAIN_SEPARATOR
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let fs = LocalFileSystem;
        let nested = fs.join(&[dir.path().to_str().unwrap(), "a", "b"]);
        fs.mkdirs(&nested).unwrap();
        // Creating an existing directory is fine
        fs.mkdirs(&nested).unwrap();

        let path = fs.join(&[nested.as_str(), "data.bin"]);
        {
            let mut sink = fs.create(&path).unwrap();
            sink.write_all(b"payload").unwrap();
            sink.flush().unwrap();
        }
        assert_eq!(fs.open_read(&path).unwrap().as_ref(), b"payload");
    }

    #[test]
    fn test_join_uses_backend_separator() {
        let fs = LocalFileSystem;
        let joined = fs.join(&["root", "grp=x"]);
        assert_eq!(joined, format!("root{}grp=x", std::path::MAIN_SEPARATOR));
    }
}
