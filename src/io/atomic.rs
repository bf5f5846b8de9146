//! Output files that only appear once they are complete.

use crate::error::{Error, Result};
use crate::io::compression::{FinishWrite, open_writer};
use std::fs::create_dir_all;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::{Builder, NamedTempFile};

/// A file written through a sibling temporary file.
///
/// Data goes to a temp file in the destination directory, compressed according
/// to the destination extension. [`commit`](Self::commit) renames it into place;
/// dropping an uncommitted output deletes the temp file and leaves any existing
/// destination untouched.
pub struct AtomicOutput {
    path: PathBuf,
    tmp: NamedTempFile,
    writer: Option<Box<dyn FinishWrite>>,
}

impl AtomicOutput {
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        create_dir_all(&dir).map_err(|e| Error::at_path("mkdir -p", &dir, e))?;
        let mut builder = Builder::new();
        builder.prefix(".svmlight-");
        #[cfg(unix)]
        {
            use std::fs::Permissions;
            use std::os::unix::fs::PermissionsExt;
            // Same mode `File::create` asks for; the umask still applies.
            builder.permissions(Permissions::from_mode(0o666));
        }
        let tmp = builder
            .tempfile_in(&dir)
            .map_err(|e| Error::at_path("create temporary file in", &dir, e))?;
        let file = tmp
            .reopen()
            .map_err(|e| Error::at_path("reopen temporary file for", &path, e))?;
        let writer = open_writer(file, &path)
            .map_err(|e| Error::at_path("set up compression for", &path, e))?;
        Ok(Self {
            path,
            tmp,
            writer: Some(writer),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Finish the stream (compressor trailer included) and move the file to
    /// its destination. On error the destination is left untouched.
    pub fn commit(mut self) -> Result<PathBuf> {
        if let Some(writer) = self.writer.take() {
            writer
                .finish()
                .map_err(|e| Error::at_path("finish", &self.path, e))?;
        }
        let Self { path, tmp, .. } = self;
        tmp.persist(&path)
            .map_err(|e| Error::at_path("rename into", &path, e.error))?;
        Ok(path)
    }
}

impl Write for AtomicOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.writer.as_mut() {
            Some(w) => w.write(buf),
            None => Err(io::Error::other("output already committed")),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.writer.as_mut() {
            Some(w) => w.flush(),
            None => Ok(()),
        }
    }
}
