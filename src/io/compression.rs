//! Transparent compression for vector files.
//!
//! Readers pick a codec from the file extension and fall back to the stream's
//! magic bytes; writers go by extension only. Built-in codecs are enabled by
//! feature flags:
//! - **Gzip** (`.gz`) via `flate2` (feature: `compression-gzip`)
//! - **Bzip2** (`.bz2`) via `bzip2` (feature: `compression-bzip2`)
//! - **Zstd** (`.zst`) via `zstd` (feature: `compression-zstd`)
//! - **Xz** (`.xz`) via `xz2` (feature: `compression-xz`)
//!
//! Further codecs can be added at runtime with [`register_codec`]. Writers
//! must be closed with [`FinishWrite::finish`] for the output to be complete.

use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

static CODEC_REGISTRY: RwLock<Option<Vec<Arc<dyn CompressionCodec>>>> = RwLock::new(None);

/// One row of the built-in codec table.
#[derive(Clone, Copy)]
struct Builtin {
    name: &'static str,
    extensions: &'static [&'static str],
    magic: &'static [u8],
    decoder: fn(Box<dyn Read>) -> io::Result<Box<dyn Read>>,
    encoder: fn(Box<dyn FinishWrite>) -> io::Result<Box<dyn FinishWrite>>,
}

const BUILTINS: &[Builtin] = &[
    #[cfg(feature = "compression-gzip")]
    Builtin {
        name: "gzip",
        extensions: &[".gz", ".gzip"],
        magic: &[0x1f, 0x8b],
        decoder: gzip::decoder,
        encoder: gzip::encoder,
    },
    #[cfg(feature = "compression-zstd")]
    Builtin {
        name: "zstd",
        extensions: &[".zst", ".zstd"],
        magic: &[0x28, 0xb5, 0x2f, 0xfd],
        decoder: zstd_codec::decoder,
        encoder: zstd_codec::encoder,
    },
    #[cfg(feature = "compression-bzip2")]
    Builtin {
        name: "bzip2",
        extensions: &[".bz2", ".bzip2"],
        magic: b"BZh",
        decoder: bz2::decoder,
        encoder: bz2::encoder,
    },
    #[cfg(feature = "compression-xz")]
    Builtin {
        name: "xz",
        extensions: &[".xz"],
        magic: &[0xfd, 0x37, 0x7a, 0x58, 0x5a, 0x00],
        decoder: xz::decoder,
        encoder: xz::encoder,
    },
];

impl CompressionCodec for Builtin {
    fn name(&self) -> &str {
        self.name
    }

    fn extensions(&self) -> &[&str] {
        self.extensions
    }

    fn magic_bytes(&self) -> Option<&[u8]> {
        Some(self.magic)
    }

    fn wrap_reader(&self, reader: Box<dyn Read>) -> io::Result<Box<dyn Read>> {
        (self.decoder)(reader)
    }

    fn wrap_writer(&self, writer: Box<dyn FinishWrite>) -> io::Result<Box<dyn FinishWrite>> {
        (self.encoder)(writer)
    }
}

fn builtin_codecs() -> Vec<Arc<dyn CompressionCodec>> {
    BUILTINS
        .iter()
        .map(|codec| Arc::new(*codec) as Arc<dyn CompressionCodec>)
        .collect()
}

fn registry() -> Vec<Arc<dyn CompressionCodec>> {
    let mut lock = CODEC_REGISTRY.write().unwrap_or_else(PoisonError::into_inner);
    lock.get_or_insert_with(builtin_codecs).clone()
}

/// Make `codec` available to [`open_reader`] and [`open_writer`].
pub fn register_codec(codec: Arc<dyn CompressionCodec>) {
    let mut lock = CODEC_REGISTRY.write().unwrap_or_else(PoisonError::into_inner);
    lock.get_or_insert_with(builtin_codecs).push(codec);
}

/// A stream compression algorithm.
pub trait CompressionCodec: Send + Sync {
    fn name(&self) -> &str;

    /// Lowercase extensions including the leading dot, e.g. `&[".gz"]`.
    fn extensions(&self) -> &[&str];

    fn magic_bytes(&self) -> Option<&[u8]>;

    fn wrap_reader(&self, reader: Box<dyn Read>) -> io::Result<Box<dyn Read>>;

    fn wrap_writer(&self, writer: Box<dyn FinishWrite>) -> io::Result<Box<dyn FinishWrite>>;
}

/// A writer whose output is only complete once [`finish`](Self::finish)
/// returns `Ok`.
///
/// Compressors write their trailer here. Dropping one instead swallows any
/// error from that last write.
pub trait FinishWrite: Write {
    /// Write any trailer, flush, and finish the writers underneath.
    fn finish(self: Box<Self>) -> io::Result<()>;
}

impl<W: Write> FinishWrite for BufWriter<W> {
    fn finish(self: Box<Self>) -> io::Result<()> {
        let mut inner = (*self).into_inner().map_err(io::IntoInnerError::into_error)?;
        inner.flush()
    }
}

/// Codec registered for the extension of `path`, if any.
pub fn codec_for_path(path: impl AsRef<Path>) -> Option<Arc<dyn CompressionCodec>> {
    let name = path.as_ref().to_string_lossy().to_lowercase();
    registry()
        .into_iter()
        .find(|codec| codec.extensions().iter().any(|ext| name.ends_with(ext)))
}

fn codec_for_magic<R: BufRead>(reader: &mut R) -> Option<Arc<dyn CompressionCodec>> {
    let head = reader.fill_buf().ok()?;
    if head.is_empty() {
        return None;
    }
    registry()
        .into_iter()
        .find(|codec| codec.magic_bytes().is_some_and(|m| head.starts_with(m)))
}

/// Wrap `reader` with a decompressor if `path_hint` or the leading bytes call
/// for one. The result is always buffered.
pub fn open_reader<R: Read + 'static>(
    reader: R,
    path_hint: impl AsRef<Path>,
) -> io::Result<Box<dyn BufRead>> {
    if let Some(codec) = codec_for_path(&path_hint) {
        let inner = codec.wrap_reader(Box::new(reader))?;
        return Ok(Box::new(BufReader::new(inner)));
    }

    let mut buffered = BufReader::new(reader);
    if let Some(codec) = codec_for_magic(&mut buffered) {
        let inner = codec.wrap_reader(Box::new(buffered))?;
        return Ok(Box::new(BufReader::new(inner)));
    }
    Ok(Box::new(buffered))
}

/// Wrap `writer` with a compressor chosen by the extension of `path_hint`.
///
/// The result is buffered; call [`FinishWrite::finish`] when done.
pub fn open_writer<W: Write + 'static>(
    writer: W,
    path_hint: impl AsRef<Path>,
) -> io::Result<Box<dyn FinishWrite>> {
    let buffered: Box<dyn FinishWrite> = Box::new(BufWriter::new(writer));
    match codec_for_path(&path_hint) {
        Some(codec) => codec.wrap_writer(buffered),
        None => Ok(buffered),
    }
}

#[cfg(feature = "compression-gzip")]
mod gzip {
    use super::FinishWrite;
    use flate2::Compression;
    use flate2::read::MultiGzDecoder;
    use flate2::write::GzEncoder;
    use std::io::{self, Read};

    // Multi-member files (e.g. `cat a.gz b.gz`) are common for corpora.
    pub(super) fn decoder(reader: Box<dyn Read>) -> io::Result<Box<dyn Read>> {
        Ok(Box::new(MultiGzDecoder::new(reader)))
    }

    pub(super) fn encoder(writer: Box<dyn FinishWrite>) -> io::Result<Box<dyn FinishWrite>> {
        Ok(Box::new(GzEncoder::new(writer, Compression::default())))
    }

    impl FinishWrite for GzEncoder<Box<dyn FinishWrite>> {
        fn finish(self: Box<Self>) -> io::Result<()> {
            let inner = GzEncoder::finish(*self)?;
            inner.finish()
        }
    }
}

#[cfg(feature = "compression-zstd")]
mod zstd_codec {
    use super::FinishWrite;
    use std::io::{self, Read};
    use zstd::stream::read::Decoder;
    use zstd::stream::write::Encoder;

    pub(super) fn decoder(reader: Box<dyn Read>) -> io::Result<Box<dyn Read>> {
        Ok(Box::new(Decoder::new(reader)?))
    }

    pub(super) fn encoder(writer: Box<dyn FinishWrite>) -> io::Result<Box<dyn FinishWrite>> {
        Ok(Box::new(Encoder::new(writer, 3)?))
    }

    impl FinishWrite for Encoder<'static, Box<dyn FinishWrite>> {
        fn finish(self: Box<Self>) -> io::Result<()> {
            let inner = Encoder::finish(*self)?;
            inner.finish()
        }
    }
}

#[cfg(feature = "compression-bzip2")]
mod bz2 {
    use super::FinishWrite;
    use bzip2::Compression;
    use bzip2::read::MultiBzDecoder;
    use bzip2::write::BzEncoder;
    use std::io::{self, Read};

    pub(super) fn decoder(reader: Box<dyn Read>) -> io::Result<Box<dyn Read>> {
        Ok(Box::new(MultiBzDecoder::new(reader)))
    }

    pub(super) fn encoder(writer: Box<dyn FinishWrite>) -> io::Result<Box<dyn FinishWrite>> {
        Ok(Box::new(BzEncoder::new(writer, Compression::default())))
    }

    impl FinishWrite for BzEncoder<Box<dyn FinishWrite>> {
        fn finish(self: Box<Self>) -> io::Result<()> {
            let inner = BzEncoder::finish(*self)?;
            inner.finish()
        }
    }
}

#[cfg(feature = "compression-xz")]
mod xz {
    use super::FinishWrite;
    use std::io::{self, Read};
    use xz2::read::XzDecoder;
    use xz2::write::XzEncoder;

    pub(super) fn decoder(reader: Box<dyn Read>) -> io::Result<Box<dyn Read>> {
        Ok(Box::new(XzDecoder::new(reader)))
    }

    pub(super) fn encoder(writer: Box<dyn FinishWrite>) -> io::Result<Box<dyn FinishWrite>> {
        Ok(Box::new(XzEncoder::new(writer, 6)))
    }

    impl FinishWrite for XzEncoder<Box<dyn FinishWrite>> {
        fn finish(self: Box<Self>) -> io::Result<()> {
            let inner = XzEncoder::finish(*self)?;
            inner.finish()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_matches_features() {
        let names: Vec<&str> = BUILTINS.iter().map(|c| c.name).collect();
        assert_eq!(names.contains(&"gzip"), cfg!(feature = "compression-gzip"));
        assert_eq!(names.contains(&"xz"), cfg!(feature = "compression-xz"));
        for codec in BUILTINS {
            assert!(codec.extensions.iter().all(|e| e.starts_with('.')));
        }
    }

    #[cfg(feature = "compression-gzip")]
    #[test]
    fn finished_gzip_reads_back() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("out.txt.gz");
        let mut writer = open_writer(std::fs::File::create(&path)?, &path)?;
        writer.write_all(b"0 qid:1 # docno:a\n")?;
        writer.finish()?;

        let mut text = String::new();
        open_reader(std::fs::File::open(&path)?, &path)?.read_to_string(&mut text)?;
        assert_eq!(text, "0 qid:1 # docno:a\n");
        Ok(())
    }
}
