//! Opening inputs and outputs.
//!
//! Two-pass operations read their input twice, so they take a [`VectorSource`]
//! that can be reopened instead of a one-shot reader.

pub mod atomic;
pub mod compression;

pub use atomic::AtomicOutput;
pub use compression::{CompressionCodec, FinishWrite, open_reader, open_writer, register_codec};

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufRead, Cursor};
use std::path::{Path, PathBuf};

/// Something that can be opened, from the start, as many times as needed.
pub trait VectorSource {
    fn open(&self) -> Result<Box<dyn BufRead + '_>>;

    /// Label used in log lines and error context.
    fn describe(&self) -> String {
        "<memory>".to_string()
    }
}

impl VectorSource for Path {
    fn open(&self) -> Result<Box<dyn BufRead + '_>> {
        open_path(self)
    }

    fn describe(&self) -> String {
        self.display().to_string()
    }
}

impl VectorSource for PathBuf {
    fn open(&self) -> Result<Box<dyn BufRead + '_>> {
        open_path(self)
    }

    fn describe(&self) -> String {
        self.display().to_string()
    }
}

impl VectorSource for [u8] {
    fn open(&self) -> Result<Box<dyn BufRead + '_>> {
        Ok(Box::new(Cursor::new(self)))
    }
}

impl VectorSource for str {
    fn open(&self) -> Result<Box<dyn BufRead + '_>> {
        Ok(Box::new(Cursor::new(self.as_bytes())))
    }
}

impl VectorSource for Vec<u8> {
    fn open(&self) -> Result<Box<dyn BufRead + '_>> {
        Ok(Box::new(Cursor::new(self.as_slice())))
    }
}

/// Open a (possibly compressed) vector file.
pub fn open_path(path: impl AsRef<Path>) -> Result<Box<dyn BufRead>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::at_path("open", path, e))?;
    open_reader(file, path).map_err(|e| Error::at_path("set up decompression for", path, e))
}
