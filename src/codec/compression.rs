//! The compression layer wrapped around the row stream.
//!
//! Both directions are streaming adapters over `Write`/`Read`: no compression
//! frame is ever buffered in full, so the codec keeps its one-row memory bound.
//! This module is a thin, panic-free wrapper around the `flate2` and `zstd`
//! crates.

use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use serde::{Deserialize, Serialize};
use std::io::{self, BufReader, Read, Write};

use crate::config::RowSetConfig;

//==================================================================================
// 1. Compression Selection
//==================================================================================

const GZIP_MAGIC: &[u8; 2] = &[0x1f, 0x8b];
const ZSTD_MAGIC: &[u8; 4] = &[0x28, 0xb5, 0x2f, 0xfd];

/// The compression applied to an encoded row stream.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Compression {
    /// Plain UTF-8 text.
    None,
    /// **Default:** gzip, readable by any storage tooling.
    #[default]
    Gzip,
    /// Zstandard, smaller and faster for large batches.
    Zstd,
}

impl Compression {
    /// Sniffs the frame magic at the start of an encoded stream.
    pub fn detect(bytes: &[u8]) -> Self {
        if bytes.starts_with(GZIP_MAGIC) {
            Compression::Gzip
        } else if bytes.starts_with(ZSTD_MAGIC) {
            Compression::Zstd
        } else {
            Compression::None
        }
    }
}

/// Compression choice plus the level for whichever codec is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecOptions {
    pub compression: Compression,
    pub gzip_level: u32,
    pub zstd_level: i32,
}

impl CodecOptions {
    pub fn new(compression: Compression) -> Self {
        Self {
            compression,
            ..Self::default()
        }
    }
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self::from(&RowSetConfig::default())
    }
}

impl From<&RowSetConfig> for CodecOptions {
    fn from(config: &RowSetConfig) -> Self {
        Self {
            compression: config.compression,
            gzip_level: config.gzip_level,
            zstd_level: config.zstd_level,
        }
    }
}

//==================================================================================
// 2. Write Side
//==================================================================================

pub(crate) enum CompressedSink<W: Write> {
    Plain(W),
    Gzip(GzEncoder<W>),
    Zstd(zstd::stream::write::Encoder<'static, W>),
}

impl<W: Write> CompressedSink<W> {
    pub(crate) fn new(inner: W, options: &CodecOptions) -> io::Result<Self> {
        Ok(match options.compression {
            Compression::None => CompressedSink::Plain(inner),
            Compression::Gzip => CompressedSink::Gzip(GzEncoder::new(
                inner,
                flate2::Compression::new(options.gzip_level.min(9)),
            )),
            Compression::Zstd => {
                CompressedSink::Zstd(zstd::stream::write::Encoder::new(inner, options.zstd_level)?)
            }
        })
    }

    /// Finalizes the compression frame and hands back the inner writer.
    /// Dropping a sink without calling this leaves a truncated frame.
    pub(crate) fn finish(self) -> io::Result<W> {
        match self {
            CompressedSink::Plain(mut inner) => {
                inner.flush()?;
                Ok(inner)
            }
            CompressedSink::Gzip(encoder) => encoder.finish(),
            CompressedSink::Zstd(encoder) => encoder.finish(),
        }
    }
}

impl<W: Write> Write for CompressedSink<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            CompressedSink::Plain(inner) => inner.write(buf),
            CompressedSink::Gzip(encoder) => encoder.write(buf),
            CompressedSink::Zstd(encoder) => encoder.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            CompressedSink::Plain(inner) => inner.flush(),
            CompressedSink::Gzip(encoder) => encoder.flush(),
            CompressedSink::Zstd(encoder) => encoder.flush(),
        }
    }
}

//==================================================================================
// 3. Read Side
//==================================================================================

pub(crate) enum CompressedSource<R: Read> {
    Plain(R),
    Gzip(MultiGzDecoder<R>),
    Zstd(zstd::stream::read::Decoder<'static, BufReader<R>>),
}

impl<R: Read> CompressedSource<R> {
    pub(crate) fn new(inner: R, compression: Compression) -> io::Result<Self> {
        Ok(match compression {
            Compression::None => CompressedSource::Plain(inner),
            Compression::Gzip => CompressedSource::Gzip(MultiGzDecoder::new(inner)),
            Compression::Zstd => CompressedSource::Zstd(zstd::stream::read::Decoder::new(inner)?),
        })
    }
}

impl<R: Read> Read for CompressedSource<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            CompressedSource::Plain(inner) => inner.read(buf),
            CompressedSource::Gzip(decoder) => decoder.read(buf),
            CompressedSource::Zstd(decoder) => decoder.read(buf),
        }
    }
}

//==================================================================================
// 4. Unit Tests
//==================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(compression: Compression, payload: &[u8]) -> Vec<u8> {
        let mut sink = CompressedSink::new(Vec::new(), &CodecOptions::new(compression)).unwrap();
        sink.write_all(payload).unwrap();
        let encoded = sink.finish().unwrap();
        assert_eq!(Compression::detect(&encoded), compression);

        let mut decoded = Vec::new();
        CompressedSource::new(encoded.as_slice(), compression)
            .unwrap()
            .read_to_end(&mut decoded)
            .unwrap();
        decoded
    }

    #[test]
    fn test_every_compression_roundtrips() {
        let payload = b"1,10,hello\n2,10,world\n3,10\n".repeat(50);
        for compression in [Compression::None, Compression::Gzip, Compression::Zstd] {
            assert_eq!(roundtrip(compression, &payload), payload);
        }
    }

    #[test]
    fn test_compressed_output_is_smaller_for_repetitive_rows() {
        let payload = b"1,10,the same value again\n".repeat(1_000);
        for compression in [Compression::Gzip, Compression::Zstd] {
            let mut sink =
                CompressedSink::new(Vec::new(), &CodecOptions::new(compression)).unwrap();
            sink.write_all(&payload).unwrap();
            assert!(sink.finish().unwrap().len() < payload.len() / 10);
        }
    }

    #[test]
    fn test_corrupt_gzip_is_an_error() {
        let mut decoded = Vec::new();
        let result = CompressedSource::new(&[0x1f, 0x8b, 1, 2, 3][..], Compression::Gzip)
            .unwrap()
            .read_to_end(&mut decoded);
        assert!(result.is_err());
    }
}
